pub mod invitations;
pub mod join;
pub mod join_requests;
pub mod members;
pub mod organizer;
pub mod qr_code;
pub mod removal;
pub mod roles;

pub use invitations::{accept_invitation, decline_invitation, invite, list_invitations, PendingInvitation};
pub use join::join_directly;
pub use join_requests::{accept_join_request, decline_join_request, list_join_requests, request_join};
pub use members::list_members;
pub use organizer::create_organizer_membership;
pub use qr_code::{get_qr_code, QrCodeView};
pub use removal::{leave, remove_member};
pub use roles::{update_payment_status, update_role};

use crate::common::{DomainError, EventId, MemberId, StoreError};
use crate::domains::events::models::Event;
use crate::domains::membership::models::EventMember;
use crate::kernel::ServerDeps;

/// Second half of the two-step mint: the row already exists, now store the
/// QR code embedding its id.
pub(crate) async fn mint_qr_code(
    member: EventMember,
    deps: &ServerDeps,
) -> Result<EventMember, DomainError> {
    let qr_code = deps.qr_signer.render(&member)?;
    let member_id = member.id;
    let updated = deps.members.set_qr_code(member_id, qr_code).await?;
    match updated {
        Some(member) => Ok(member),
        // Removed between the two steps; nothing left to mint for
        None => Err(DomainError::NotFound("member")),
    }
}

/// Activate a pending row and mint its QR code
pub(crate) async fn activate(
    member_id: MemberId,
    deps: &ServerDeps,
) -> Result<EventMember, DomainError> {
    let member = deps
        .members
        .activate_member(member_id)
        .await?
        .ok_or(DomainError::NotFound("member"))?;
    mint_qr_code(member, deps).await
}

pub(crate) async fn require_event(event_id: EventId, deps: &ServerDeps) -> Result<Event, DomainError> {
    deps.events
        .find_event(event_id)
        .await?
        .ok_or(DomainError::NotFound("event"))
}

/// Load a member and make sure it belongs to `event_id`
pub(crate) async fn require_member_of(
    event_id: EventId,
    member_id: MemberId,
    deps: &ServerDeps,
) -> Result<EventMember, DomainError> {
    deps.members
        .find_member(member_id)
        .await?
        .filter(|m| m.event_id == event_id)
        .ok_or(DomainError::NotFound("member"))
}

/// Translate a unique violation raised at insert time into `conflict`
pub(crate) fn on_conflict(conflict: DomainError) -> impl FnOnce(StoreError) -> DomainError {
    move |err| {
        if err.is_unique_violation() {
            conflict
        } else {
            DomainError::Store(err)
        }
    }
}
