use serde::Serialize;
use tracing::info;

use super::{activate, require_event};
use crate::common::{Actor, DomainError, EventCapability, EventId, MemberId, UserId};
use crate::domains::membership::events::{MembershipChange, MembershipChanged};
use crate::domains::membership::models::{EventMember, MemberStatus, NewMember};
use crate::kernel::ServerDeps;

/// A pending invitation with the event it is for
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingInvitation {
    #[serde(flatten)]
    pub member: EventMember,
    pub event_name: String,
}

/// Invite a registered user to an event by phone number.
///
/// Re-inviting someone whose invitation is still pending returns the
/// existing row unchanged.
pub async fn invite(
    event_id: EventId,
    organizer_id: UserId,
    phone: &str,
    deps: &ServerDeps,
) -> Result<EventMember, DomainError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(DomainError::validation("phone number is required"));
    }

    require_event(event_id, deps).await?;
    Actor::new(organizer_id)
        .can(EventCapability::ManageMembers)
        .on(event_id)
        .check(deps.members.as_ref())
        .await?;

    let invitee = deps
        .identity
        .resolve_user_by_phone(phone)
        .await?
        .ok_or(DomainError::NotFound("user"))?;

    if invitee == organizer_id {
        return Err(DomainError::SelfInvite);
    }

    if let Some(existing) = deps.members.find_member_by_user(event_id, invitee).await? {
        return existing_invitation(existing);
    }

    let member = match deps
        .members
        .insert_member(NewMember::invitation(event_id, invitee, organizer_id))
        .await
    {
        Ok(member) => member,
        Err(e) if e.is_unique_violation() => {
            // A concurrent invite or join won; answer as if we had seen it
            let existing = deps
                .members
                .find_member_by_user(event_id, invitee)
                .await?
                .ok_or(DomainError::AlreadyMember)?;
            return existing_invitation(existing);
        }
        Err(e) => return Err(e.into()),
    };

    info!(event_id = %event_id, invitee = %invitee, invited_by = %organizer_id, "member invited");
    MembershipChanged::new(event_id, invitee, Some(member.id), MembershipChange::Invited)
        .publish(&deps.stream_hub)
        .await;

    Ok(member)
}

fn existing_invitation(existing: EventMember) -> Result<EventMember, DomainError> {
    match existing.status {
        MemberStatus::Pending => Ok(existing),
        MemberStatus::Active => Err(DomainError::AlreadyMember),
    }
}

/// Load a pending invitation addressed to `user_id`
async fn own_invitation(
    member_id: MemberId,
    user_id: UserId,
    deps: &ServerDeps,
) -> Result<EventMember, DomainError> {
    let member = deps
        .members
        .find_member(member_id)
        .await?
        .filter(|m| m.user_id == user_id)
        .ok_or(DomainError::NotFound("invitation"))?;

    if member.status != MemberStatus::Pending {
        return Err(DomainError::AlreadyProcessed("invitation"));
    }
    Ok(member)
}

pub async fn accept_invitation(
    member_id: MemberId,
    user_id: UserId,
    deps: &ServerDeps,
) -> Result<EventMember, DomainError> {
    let invitation = own_invitation(member_id, user_id, deps).await?;
    let member = activate(invitation.id, deps).await?;

    info!(event_id = %member.event_id, user_id = %user_id, "invitation accepted");
    MembershipChanged::new(member.event_id, user_id, Some(member.id), MembershipChange::Joined)
        .publish(&deps.stream_hub)
        .await;

    Ok(member)
}

pub async fn decline_invitation(
    member_id: MemberId,
    user_id: UserId,
    deps: &ServerDeps,
) -> Result<(), DomainError> {
    let invitation = own_invitation(member_id, user_id, deps).await?;
    deps.members.delete_member(invitation.id).await?;

    info!(event_id = %invitation.event_id, user_id = %user_id, "invitation declined");
    MembershipChanged::new(
        invitation.event_id,
        user_id,
        None,
        MembershipChange::InvitationDeclined,
    )
    .publish(&deps.stream_hub)
    .await;

    Ok(())
}

/// The caller's outstanding invitations
pub async fn list_invitations(
    user_id: UserId,
    deps: &ServerDeps,
) -> Result<Vec<PendingInvitation>, DomainError> {
    let pending = deps.members.find_pending_invitations(user_id).await?;

    let mut invitations = Vec::with_capacity(pending.len());
    for member in pending {
        if let Some(event) = deps.events.find_event(member.event_id).await? {
            invitations.push(PendingInvitation {
                member,
                event_name: event.name,
            });
        }
    }
    Ok(invitations)
}
