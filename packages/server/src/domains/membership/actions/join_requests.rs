use tracing::info;

use super::{activate, mint_qr_code, on_conflict, require_event};
use crate::common::{Actor, DomainError, EventCapability, EventId, JoinRequestId, UserId};
use crate::domains::membership::events::{MembershipChange, MembershipChanged};
use crate::domains::membership::models::{
    EventMember, JoinRequest, JoinRequestStatus, JoinRequestWithProfile, MemberStatus, NewMember,
};
use crate::kernel::ServerDeps;

/// Ask the organizers to be admitted.
///
/// A request that was already accepted or declined is reopened rather than
/// duplicated.
pub async fn request_join(
    event_id: EventId,
    user_id: UserId,
    deps: &ServerDeps,
) -> Result<JoinRequest, DomainError> {
    require_event(event_id, deps).await?;

    if let Some(member) = deps.members.find_member_by_user(event_id, user_id).await? {
        return Err(match member.status {
            MemberStatus::Pending => DomainError::AlreadyInvited,
            MemberStatus::Active => DomainError::AlreadyMember,
        });
    }

    let request = match deps.members.find_join_request_by_user(event_id, user_id).await? {
        Some(existing) if existing.is_pending() => return Err(DomainError::AlreadyPending),
        Some(existing) => deps
            .members
            .set_join_request_status(existing.id, JoinRequestStatus::Pending)
            .await?
            .ok_or(DomainError::NotFound("join request"))?,
        None => deps
            .members
            .insert_join_request(event_id, user_id)
            .await
            .map_err(on_conflict(DomainError::AlreadyPending))?,
    };

    info!(event_id = %event_id, user_id = %user_id, request_id = %request.id, "join requested");
    MembershipChanged::new(event_id, user_id, None, MembershipChange::JoinRequested)
        .publish(&deps.stream_hub)
        .await;

    Ok(request)
}

/// Load a still-pending request of this event after the organizer check
async fn pending_request(
    event_id: EventId,
    request_id: JoinRequestId,
    organizer_id: UserId,
    deps: &ServerDeps,
) -> Result<JoinRequest, DomainError> {
    Actor::new(organizer_id)
        .can(EventCapability::ManageMembers)
        .on(event_id)
        .check(deps.members.as_ref())
        .await?;

    let request = deps
        .members
        .find_join_request(request_id)
        .await?
        .filter(|r| r.event_id == event_id)
        .ok_or(DomainError::NotFound("join request"))?;

    if !request.is_pending() {
        return Err(DomainError::AlreadyProcessed("join request"));
    }
    Ok(request)
}

/// Approve a join request, creating or activating the membership.
pub async fn accept_join_request(
    event_id: EventId,
    request_id: JoinRequestId,
    organizer_id: UserId,
    deps: &ServerDeps,
) -> Result<EventMember, DomainError> {
    let request = pending_request(event_id, request_id, organizer_id, deps).await?;

    let member = match deps
        .members
        .find_member_by_user(event_id, request.user_id)
        .await?
    {
        Some(member) if member.is_active() => member,
        Some(invitation) => activate(invitation.id, deps).await?,
        None => {
            let member = deps
                .members
                .insert_member(NewMember::active_member(event_id, request.user_id))
                .await
                .map_err(on_conflict(DomainError::AlreadyMember))?;
            mint_qr_code(member, deps).await?
        }
    };

    deps.members
        .set_join_request_status(request.id, JoinRequestStatus::Accepted)
        .await?;

    info!(
        event_id = %event_id,
        user_id = %request.user_id,
        approved_by = %organizer_id,
        "join request accepted"
    );
    MembershipChanged::new(event_id, request.user_id, Some(member.id), MembershipChange::Joined)
        .publish(&deps.stream_hub)
        .await;

    Ok(member)
}

pub async fn decline_join_request(
    event_id: EventId,
    request_id: JoinRequestId,
    organizer_id: UserId,
    deps: &ServerDeps,
) -> Result<JoinRequest, DomainError> {
    let request = pending_request(event_id, request_id, organizer_id, deps).await?;

    let declined = deps
        .members
        .set_join_request_status(request.id, JoinRequestStatus::Declined)
        .await?
        .ok_or(DomainError::NotFound("join request"))?;

    info!(event_id = %event_id, user_id = %request.user_id, "join request declined");
    MembershipChanged::new(
        event_id,
        request.user_id,
        None,
        MembershipChange::JoinRequestDeclined,
    )
    .publish(&deps.stream_hub)
    .await;

    Ok(declined)
}

/// Pending requests for organizers to review
pub async fn list_join_requests(
    event_id: EventId,
    organizer_id: UserId,
    deps: &ServerDeps,
) -> Result<Vec<JoinRequestWithProfile>, DomainError> {
    Actor::new(organizer_id)
        .can(EventCapability::ManageMembers)
        .on(event_id)
        .check(deps.members.as_ref())
        .await?;

    Ok(deps.members.find_join_requests(event_id).await?)
}
