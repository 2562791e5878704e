use crate::common::{Actor, DomainError, EventCapability, EventId, UserId};
use crate::domains::membership::models::MemberProfile;
use crate::kernel::ServerDeps;

/// Everyone attached to the event, invitations included, with display data
pub async fn list_members(
    event_id: EventId,
    viewer_id: UserId,
    deps: &ServerDeps,
) -> Result<Vec<MemberProfile>, DomainError> {
    Actor::new(viewer_id)
        .can(EventCapability::ViewEvent)
        .on(event_id)
        .check(deps.members.as_ref())
        .await?;

    Ok(deps.members.find_member_profiles(event_id).await?)
}
