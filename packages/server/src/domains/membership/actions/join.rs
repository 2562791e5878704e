use tracing::info;

use super::{activate, mint_qr_code, on_conflict, require_event};
use crate::common::{DomainError, EventId, UserId};
use crate::domains::membership::events::{MembershipChange, MembershipChanged};
use crate::domains::membership::models::{EventMember, MemberStatus, NewMember};
use crate::kernel::ServerDeps;

/// Join an event without organizer approval.
///
/// A pending invitation is accepted instead of creating a second row.
pub async fn join_directly(
    event_id: EventId,
    user_id: UserId,
    deps: &ServerDeps,
) -> Result<EventMember, DomainError> {
    require_event(event_id, deps).await?;

    let member = match deps.members.find_member_by_user(event_id, user_id).await? {
        Some(existing) if existing.status == MemberStatus::Active => {
            return Err(DomainError::AlreadyMember)
        }
        Some(invitation) => activate(invitation.id, deps).await?,
        None => {
            let member = deps
                .members
                .insert_member(NewMember::active_member(event_id, user_id))
                .await
                .map_err(on_conflict(DomainError::AlreadyMember))?;
            mint_qr_code(member, deps).await?
        }
    };

    info!(event_id = %event_id, user_id = %user_id, "member joined");
    MembershipChanged::new(event_id, user_id, Some(member.id), MembershipChange::Joined)
        .publish(&deps.stream_hub)
        .await;

    Ok(member)
}
