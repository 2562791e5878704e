use tracing::info;

use super::require_member_of;
use crate::common::{Actor, DomainError, EventCapability, EventId, MemberId, UserId};
use crate::domains::membership::events::{MembershipChange, MembershipChanged};
use crate::domains::membership::models::{EventMember, MemberRemoval};
use crate::kernel::ServerDeps;

/// Delete the row unless it is the event's only active organizer. Pending
/// rows and plain members always go.
async fn delete_keeping_organizer(
    member: &EventMember,
    deps: &ServerDeps,
) -> Result<(), DomainError> {
    match deps
        .members
        .delete_member_keeping_organizer(member.id)
        .await?
    {
        MemberRemoval::Removed => Ok(()),
        MemberRemoval::NotFound => Err(DomainError::NotFound("membership")),
        MemberRemoval::LastOrganizer => Err(DomainError::LastOrganizer),
    }
}

/// Organizer removes a member (or withdraws an invitation)
pub async fn remove_member(
    event_id: EventId,
    member_id: MemberId,
    organizer_id: UserId,
    deps: &ServerDeps,
) -> Result<(), DomainError> {
    Actor::new(organizer_id)
        .can(EventCapability::ManageMembers)
        .on(event_id)
        .check(deps.members.as_ref())
        .await?;

    let member = require_member_of(event_id, member_id, deps).await?;
    delete_keeping_organizer(&member, deps).await?;

    info!(event_id = %event_id, user_id = %member.user_id, removed_by = %organizer_id, "member removed");
    MembershipChanged::new(event_id, member.user_id, Some(member.id), MembershipChange::Removed)
        .publish(&deps.stream_hub)
        .await;

    Ok(())
}

/// Caller leaves the event
pub async fn leave(event_id: EventId, user_id: UserId, deps: &ServerDeps) -> Result<(), DomainError> {
    let member = deps
        .members
        .find_member_by_user(event_id, user_id)
        .await?
        .ok_or(DomainError::NotFound("membership"))?;

    delete_keeping_organizer(&member, deps).await?;

    info!(event_id = %event_id, user_id = %user_id, "member left");
    MembershipChanged::new(event_id, user_id, Some(member.id), MembershipChange::Left)
        .publish(&deps.stream_hub)
        .await;

    Ok(())
}
