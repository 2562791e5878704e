use tracing::info;

use super::{mint_qr_code, on_conflict};
use crate::common::{DomainError, EventId, UserId};
use crate::domains::membership::models::{EventMember, NewMember};
use crate::kernel::ServerDeps;

/// Make the event's creator its first active organizer.
///
/// The QR code is minted after the row exists since it embeds the member id.
pub async fn create_organizer_membership(
    event_id: EventId,
    user_id: UserId,
    deps: &ServerDeps,
) -> Result<EventMember, DomainError> {
    let member = deps
        .members
        .insert_member(NewMember::organizer(event_id, user_id))
        .await
        .map_err(on_conflict(DomainError::AlreadyMember))?;

    let member = mint_qr_code(member, deps).await?;
    info!(event_id = %event_id, user_id = %user_id, "organizer membership created");
    Ok(member)
}
