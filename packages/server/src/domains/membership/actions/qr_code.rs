use serde::Serialize;

use crate::common::{DomainError, EventId, UserId};
use crate::kernel::ServerDeps;

/// The caller's QR code for one event.
///
/// Both fields are `None` while the code is not ready yet (pending
/// invitation, or the second mint step has not landed).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeView {
    pub qr_code: Option<String>,
    pub payload: Option<String>,
}

pub async fn get_qr_code(
    event_id: EventId,
    user_id: UserId,
    deps: &ServerDeps,
) -> Result<QrCodeView, DomainError> {
    let member = deps
        .members
        .find_member_by_user(event_id, user_id)
        .await?
        .ok_or(DomainError::NotFound("membership"))?;

    let view = match member.qr_code.as_deref() {
        Some(qr_code) if member.is_active() && !qr_code.is_empty() => QrCodeView {
            qr_code: Some(qr_code.to_string()),
            payload: Some(deps.qr_signer.payload_for(&member)?.to_json()),
        },
        _ => QrCodeView {
            qr_code: None,
            payload: None,
        },
    };
    Ok(view)
}
