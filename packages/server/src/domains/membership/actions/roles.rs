use tracing::info;

use super::require_member_of;
use crate::common::{Actor, DomainError, EventCapability, EventId, MemberId, UserId};
use crate::domains::membership::events::{MembershipChange, MembershipChanged};
use crate::domains::membership::models::{EventMember, MemberRole, PaymentStatus};
use crate::kernel::ServerDeps;

/// Change a member's role.
///
/// Demoting the last active organizer is not blocked here; only removal and
/// leaving enforce that invariant.
pub async fn update_role(
    event_id: EventId,
    member_id: MemberId,
    role: &str,
    organizer_id: UserId,
    deps: &ServerDeps,
) -> Result<EventMember, DomainError> {
    let role: MemberRole = role.trim().parse()?;

    Actor::new(organizer_id)
        .can(EventCapability::ManageMembers)
        .on(event_id)
        .check(deps.members.as_ref())
        .await?;

    require_member_of(event_id, member_id, deps).await?;
    let member = deps
        .members
        .set_role(member_id, role)
        .await?
        .ok_or(DomainError::NotFound("member"))?;

    info!(event_id = %event_id, member_id = %member_id, role = %role, "member role updated");
    MembershipChanged::new(event_id, member.user_id, Some(member.id), MembershipChange::RoleChanged)
        .publish(&deps.stream_hub)
        .await;

    Ok(member)
}

/// Record a payment label; no money moves
pub async fn update_payment_status(
    event_id: EventId,
    member_id: MemberId,
    payment_status: &str,
    organizer_id: UserId,
    deps: &ServerDeps,
) -> Result<EventMember, DomainError> {
    let payment_status: PaymentStatus = payment_status.trim().parse()?;

    Actor::new(organizer_id)
        .can(EventCapability::ManageMembers)
        .on(event_id)
        .check(deps.members.as_ref())
        .await?;

    require_member_of(event_id, member_id, deps).await?;
    let member = deps
        .members
        .set_payment_status(member_id, payment_status)
        .await?
        .ok_or(DomainError::NotFound("member"))?;

    info!(
        event_id = %event_id,
        member_id = %member_id,
        payment_status = %payment_status,
        "payment status updated"
    );
    MembershipChanged::new(
        event_id,
        member.user_id,
        Some(member.id),
        MembershipChange::PaymentUpdated,
    )
    .publish(&deps.stream_hub)
    .await;

    Ok(member)
}
