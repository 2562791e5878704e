//! Membership engine tests on the in-memory store.

mod common;

use common::World;
use trip_core::common::DomainError;
use trip_core::domains::membership::actions::{
    accept_invitation, accept_join_request, decline_invitation, decline_join_request,
    get_qr_code, invite, join_directly, leave, list_invitations, list_join_requests,
    list_members, remove_member, request_join, update_payment_status, update_role,
};
use trip_core::domains::membership::{MemberRole, MemberStatus, PaymentStatus};
use trip_core::kernel::stream_hub::event_topic;

// =============================================================================
// Event creation
// =============================================================================

#[tokio::test]
async fn creator_becomes_active_organizer_with_qr_code() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");

    let event = world.event(&ana).await;

    let member = world.membership(&event, &ana).expect("organizer row");
    assert_eq!(member.role, MemberRole::Organizer);
    assert_eq!(member.status, MemberStatus::Active);
    assert_eq!(member.payment_status, PaymentStatus::Pending);
    let qr = member.qr_code.expect("qr code minted");
    assert!(qr.starts_with("data:image/svg+xml;base64,"));
}

// =============================================================================
// Invitations
// =============================================================================

#[tokio::test]
async fn invite_creates_pending_row_without_qr_code() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;

    let invitation = invite(event.id, ana.id, "+351900000002", &world.deps)
        .await
        .unwrap();

    assert_eq!(invitation.user_id, bo.id);
    assert_eq!(invitation.status, MemberStatus::Pending);
    assert_eq!(invitation.role, MemberRole::Member);
    assert_eq!(invitation.invited_by, Some(ana.id));
    assert!(invitation.qr_code.is_none());

    let view = get_qr_code(event.id, bo.id, &world.deps).await.unwrap();
    assert!(view.qr_code.is_none());
    assert!(view.payload.is_none());
}

#[tokio::test]
async fn reinviting_pending_user_returns_existing_row() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;

    let first = invite(event.id, ana.id, "+351900000002", &world.deps).await.unwrap();
    let second = invite(event.id, ana.id, " +351900000002 ", &world.deps).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(world.store.all_members().len(), 2);
}

#[tokio::test]
async fn invite_rejects_unknown_phone_self_and_active_members() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    world.member(&event, &bo).await;

    let err = invite(event.id, ana.id, "+351999999999", &world.deps).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound("user")));

    let err = invite(event.id, ana.id, "+351900000001", &world.deps).await.unwrap_err();
    assert!(matches!(err, DomainError::SelfInvite));

    let err = invite(event.id, ana.id, "+351900000002", &world.deps).await.unwrap_err();
    assert!(matches!(err, DomainError::AlreadyMember));

    let err = invite(event.id, ana.id, "  ", &world.deps).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn only_organizers_can_invite() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    world.user("+351900000003", "Cy");
    let event = world.event(&ana).await;
    world.member(&event, &bo).await;

    let err = invite(event.id, bo.id, "+351900000003", &world.deps).await.unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));
}

#[tokio::test]
async fn accepting_invitation_activates_and_mints_qr_code() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    let invitation = invite(event.id, ana.id, "+351900000002", &world.deps).await.unwrap();

    let member = accept_invitation(invitation.id, bo.id, &world.deps).await.unwrap();

    assert_eq!(member.id, invitation.id);
    assert_eq!(member.status, MemberStatus::Active);
    assert!(member.qr_code.is_some());

    let view = get_qr_code(event.id, bo.id, &world.deps).await.unwrap();
    let payload: serde_json::Value =
        serde_json::from_str(&view.payload.expect("payload")).unwrap();
    assert_eq!(payload["memberId"], serde_json::json!(member.id));
    assert_eq!(payload["eventId"], serde_json::json!(event.id));

    let err = accept_invitation(invitation.id, bo.id, &world.deps).await.unwrap_err();
    assert!(matches!(err, DomainError::AlreadyProcessed("invitation")));
}

#[tokio::test]
async fn invitation_belongs_to_its_invitee() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    world.user("+351900000002", "Bo");
    let cy = world.user("+351900000003", "Cy");
    let event = world.event(&ana).await;
    let invitation = invite(event.id, ana.id, "+351900000002", &world.deps).await.unwrap();

    let err = accept_invitation(invitation.id, cy.id, &world.deps).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound("invitation")));

    let err = decline_invitation(invitation.id, cy.id, &world.deps).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound("invitation")));
}

#[tokio::test]
async fn declining_invitation_deletes_the_row() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    let invitation = invite(event.id, ana.id, "+351900000002", &world.deps).await.unwrap();

    decline_invitation(invitation.id, bo.id, &world.deps).await.unwrap();

    assert!(world.membership(&event, &bo).is_none());
    assert!(list_invitations(bo.id, &world.deps).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_invitations_includes_event_name() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    invite(event.id, ana.id, "+351900000002", &world.deps).await.unwrap();

    let invitations = list_invitations(bo.id, &world.deps).await.unwrap();

    assert_eq!(invitations.len(), 1);
    assert_eq!(invitations[0].event_name, "Lisbon weekend");
    assert_eq!(invitations[0].member.event_id, event.id);
}

// =============================================================================
// Joining
// =============================================================================

#[tokio::test]
async fn joining_directly_accepts_pending_invitation() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    let invitation = invite(event.id, ana.id, "+351900000002", &world.deps).await.unwrap();

    let member = join_directly(event.id, bo.id, &world.deps).await.unwrap();

    assert_eq!(member.id, invitation.id);
    assert_eq!(member.status, MemberStatus::Active);
    assert_eq!(
        world
            .store
            .all_members()
            .iter()
            .filter(|m| m.user_id == bo.id)
            .count(),
        1
    );
}

#[tokio::test]
async fn joining_twice_is_rejected() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    world.member(&event, &bo).await;

    let err = join_directly(event.id, bo.id, &world.deps).await.unwrap_err();
    assert!(matches!(err, DomainError::AlreadyMember));
}

#[tokio::test]
async fn concurrent_joins_leave_a_single_row() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    world.store.interleave_calls();

    // Both calls see no membership; the unique key turns the loser away
    let (a, b) = tokio::join!(
        join_directly(event.id, bo.id, &world.deps),
        join_directly(event.id, bo.id, &world.deps),
    );

    let (joined, rejected) = if a.is_ok() { (a, b) } else { (b, a) };
    assert!(joined.unwrap().qr_code.is_some());
    assert!(matches!(rejected.unwrap_err(), DomainError::AlreadyMember));
    assert_eq!(
        world
            .store
            .all_members()
            .iter()
            .filter(|m| m.user_id == bo.id)
            .count(),
        1
    );
}

#[tokio::test]
async fn concurrent_invites_return_the_same_row() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    world.store.interleave_calls();

    let (a, b) = tokio::join!(
        invite(event.id, ana.id, "+351900000002", &world.deps),
        invite(event.id, ana.id, "+351900000002", &world.deps),
    );

    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.id, b.id);
    assert_eq!(b.status, MemberStatus::Pending);
    assert_eq!(
        world
            .store
            .all_members()
            .iter()
            .filter(|m| m.user_id == bo.id)
            .count(),
        1
    );
}

#[tokio::test]
async fn joining_missing_event_is_not_found() {
    let world = World::new();
    let bo = world.user("+351900000002", "Bo");

    let err = join_directly(trip_core::common::EventId::new(), bo.id, &world.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound("event")));
}

// =============================================================================
// Join requests
// =============================================================================

#[tokio::test]
async fn request_join_is_rejected_for_members_and_invitees() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let cy = world.user("+351900000003", "Cy");
    let event = world.event(&ana).await;
    world.member(&event, &bo).await;
    invite(event.id, ana.id, "+351900000003", &world.deps).await.unwrap();

    let err = request_join(event.id, bo.id, &world.deps).await.unwrap_err();
    assert!(matches!(err, DomainError::AlreadyMember));

    let err = request_join(event.id, cy.id, &world.deps).await.unwrap_err();
    assert!(matches!(err, DomainError::AlreadyInvited));
}

#[tokio::test]
async fn duplicate_pending_request_is_rejected() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;

    request_join(event.id, bo.id, &world.deps).await.unwrap();
    let err = request_join(event.id, bo.id, &world.deps).await.unwrap_err();

    assert!(matches!(err, DomainError::AlreadyPending));
}

#[tokio::test]
async fn accepting_request_creates_active_member() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    let request = request_join(event.id, bo.id, &world.deps).await.unwrap();

    let pending = list_join_requests(event.id, ana.id, &world.deps).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].profile.first_name, "Bo");

    let member = accept_join_request(event.id, request.id, ana.id, &world.deps)
        .await
        .unwrap();

    assert_eq!(member.user_id, bo.id);
    assert_eq!(member.status, MemberStatus::Active);
    assert!(member.qr_code.is_some());
    assert!(list_join_requests(event.id, ana.id, &world.deps)
        .await
        .unwrap()
        .is_empty());

    let err = accept_join_request(event.id, request.id, ana.id, &world.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::AlreadyProcessed("join request")));
}

#[tokio::test]
async fn concurrent_requests_leave_one_pending() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    world.store.interleave_calls();

    let (a, b) = tokio::join!(
        request_join(event.id, bo.id, &world.deps),
        request_join(event.id, bo.id, &world.deps),
    );

    let (requested, rejected) = if a.is_ok() { (a, b) } else { (b, a) };
    assert!(requested.unwrap().is_pending());
    assert!(matches!(rejected.unwrap_err(), DomainError::AlreadyPending));
    assert_eq!(
        list_join_requests(event.id, ana.id, &world.deps)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn accepting_request_activates_a_pending_invitation() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    let request = request_join(event.id, bo.id, &world.deps).await.unwrap();
    let invitation = invite(event.id, ana.id, "+351900000002", &world.deps)
        .await
        .unwrap();

    let member = accept_join_request(event.id, request.id, ana.id, &world.deps)
        .await
        .unwrap();

    assert_eq!(member.id, invitation.id);
    assert_eq!(member.status, MemberStatus::Active);
    assert!(member.qr_code.is_some());
    assert_eq!(
        world
            .store
            .all_members()
            .iter()
            .filter(|m| m.user_id == bo.id)
            .count(),
        1
    );
    assert!(list_join_requests(event.id, ana.id, &world.deps)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn accepting_request_of_active_member_leaves_membership_alone() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    let request = request_join(event.id, bo.id, &world.deps).await.unwrap();
    let joined = world.member(&event, &bo).await;

    let member = accept_join_request(event.id, request.id, ana.id, &world.deps)
        .await
        .unwrap();

    assert_eq!(member.id, joined.id);
    assert_eq!(member.role, MemberRole::Member);
    assert_eq!(member.qr_code, joined.qr_code);
    assert!(list_join_requests(event.id, ana.id, &world.deps)
        .await
        .unwrap()
        .is_empty());
    let err = accept_join_request(event.id, request.id, ana.id, &world.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::AlreadyProcessed("join request")));
}

#[tokio::test]
async fn declined_request_can_be_reopened() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    let request = request_join(event.id, bo.id, &world.deps).await.unwrap();

    decline_join_request(event.id, request.id, ana.id, &world.deps)
        .await
        .unwrap();
    assert!(world.membership(&event, &bo).is_none());

    let reopened = request_join(event.id, bo.id, &world.deps).await.unwrap();
    assert_eq!(reopened.id, request.id);
    assert!(reopened.is_pending());
}

#[tokio::test]
async fn join_requests_are_organizer_only() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let cy = world.user("+351900000003", "Cy");
    let event = world.event(&ana).await;
    world.member(&event, &bo).await;
    let request = request_join(event.id, cy.id, &world.deps).await.unwrap();

    let err = list_join_requests(event.id, bo.id, &world.deps).await.unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let err = accept_join_request(event.id, request.id, bo.id, &world.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));
}

#[tokio::test]
async fn request_from_another_event_is_not_found() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let lisbon = world.event(&ana).await;
    let porto = world.event(&ana).await;
    let request = request_join(lisbon.id, bo.id, &world.deps).await.unwrap();

    let err = accept_join_request(porto.id, request.id, ana.id, &world.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound("join request")));
}

// =============================================================================
// Roles, payment, removal
// =============================================================================

#[tokio::test]
async fn sole_organizer_cannot_leave_or_be_removed() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let event = world.event(&ana).await;
    let organizer = world.membership(&event, &ana).unwrap();

    let err = leave(event.id, ana.id, &world.deps).await.unwrap_err();
    assert!(matches!(err, DomainError::LastOrganizer));

    let err = remove_member(event.id, organizer.id, ana.id, &world.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::LastOrganizer));

    assert!(world.membership(&event, &ana).is_some());
}

#[tokio::test]
async fn organizer_can_leave_after_promoting_someone() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    let bo_member = world.member(&event, &bo).await;

    let promoted = update_role(event.id, bo_member.id, "organizer", ana.id, &world.deps)
        .await
        .unwrap();
    assert_eq!(promoted.role, MemberRole::Organizer);

    leave(event.id, ana.id, &world.deps).await.unwrap();

    assert!(world.membership(&event, &ana).is_none());
    let err = leave(event.id, bo.id, &world.deps).await.unwrap_err();
    assert!(matches!(err, DomainError::LastOrganizer));
}

#[tokio::test]
async fn organizers_leaving_together_keep_one_behind() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    let bo_member = world.member(&event, &bo).await;
    update_role(event.id, bo_member.id, "organizer", ana.id, &world.deps)
        .await
        .unwrap();
    world.store.interleave_calls();

    // Both read two organizers before either deletes
    let (a, b) = tokio::join!(
        leave(event.id, ana.id, &world.deps),
        leave(event.id, bo.id, &world.deps),
    );

    let (left, refused) = if a.is_ok() { (a, b) } else { (b, a) };
    left.unwrap();
    assert!(matches!(refused.unwrap_err(), DomainError::LastOrganizer));
    assert_eq!(
        world.deps.members.count_active_organizers(event.id).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn organizers_removing_each_other_keep_one_behind() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    let ana_member = world.membership(&event, &ana).unwrap();
    let bo_member = world.member(&event, &bo).await;
    update_role(event.id, bo_member.id, "organizer", ana.id, &world.deps)
        .await
        .unwrap();
    world.store.interleave_calls();

    let (a, b) = tokio::join!(
        remove_member(event.id, bo_member.id, ana.id, &world.deps),
        remove_member(event.id, ana_member.id, bo.id, &world.deps),
    );

    assert!(a.is_ok() != b.is_ok());
    let organizers: Vec<_> = world
        .store
        .all_members()
        .into_iter()
        .filter(|m| m.event_id == event.id && m.is_active_organizer())
        .collect();
    assert_eq!(organizers.len(), 1);
}

#[tokio::test]
async fn sole_organizer_may_still_be_demoted() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let event = world.event(&ana).await;
    let organizer = world.membership(&event, &ana).unwrap();

    // Only removal and leaving guard the organizer count
    let demoted = update_role(event.id, organizer.id, "member", ana.id, &world.deps)
        .await
        .unwrap();

    assert_eq!(demoted.role, MemberRole::Member);
    assert_eq!(
        world.deps.members.count_active_organizers(event.id).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn organizer_removes_member() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    let bo_member = world.member(&event, &bo).await;

    remove_member(event.id, bo_member.id, ana.id, &world.deps)
        .await
        .unwrap();

    assert!(world.membership(&event, &bo).is_none());
    let err = leave(event.id, bo.id, &world.deps).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound("membership")));
}

#[tokio::test]
async fn role_and_payment_values_are_validated() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    let bo_member = world.member(&event, &bo).await;

    let err = update_role(event.id, bo_member.id, "owner", ana.id, &world.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidRole(_)));

    let err = update_payment_status(event.id, bo_member.id, "free", ana.id, &world.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidPaymentStatus(_)));

    let paid = update_payment_status(event.id, bo_member.id, "paid", ana.id, &world.deps)
        .await
        .unwrap();
    assert_eq!(paid.payment_status, PaymentStatus::Paid);
}

#[tokio::test]
async fn members_cannot_change_roles() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    let bo_member = world.member(&event, &bo).await;

    let err = update_role(event.id, bo_member.id, "organizer", bo.id, &world.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));
}

#[tokio::test]
async fn member_list_requires_active_membership() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let cy = world.user("+351900000003", "Cy");
    let event = world.event(&ana).await;
    world.member(&event, &bo).await;
    invite(event.id, ana.id, "+351900000003", &world.deps).await.unwrap();

    let members = list_members(event.id, bo.id, &world.deps).await.unwrap();
    assert_eq!(members.len(), 3);

    let err = list_members(event.id, cy.id, &world.deps).await.unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));
}

// =============================================================================
// Pushes
// =============================================================================

#[tokio::test]
async fn membership_changes_are_pushed_on_the_event_topic() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    let mut rx = world.hub().subscribe(&event_topic(event.id)).await;

    let member = world.member(&event, &bo).await;

    let push = rx.recv().await.unwrap();
    assert_eq!(push["type"], "membership_changed");
    assert_eq!(push["change"], "joined");
    assert_eq!(push["userId"], serde_json::json!(bo.id));
    assert_eq!(push["memberId"], serde_json::json!(member.id));
}
