//! QR identity payloads.
//!
//! An active membership carries a QR code encoding
//! `{"eventId", "userId", "memberId", "sig"}`. Organizers scan it to attribute
//! a check-in. `sig` is an HMAC-SHA256 over the three ids keyed with a server
//! secret, so hand-edited payloads are rejected at scan time.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use qrcode::render::svg;
use qrcode::QrCode;
use serde::{Deserialize, Serialize};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::common::{DomainError, EventId, MemberId, UserId};
use crate::domains::membership::models::EventMember;

const QR_MIN_DIMENSION: u32 = 240;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    pub event_id: EventId,
    pub user_id: UserId,
    pub member_id: MemberId,
    pub sig: String,
}

impl QrPayload {
    pub fn to_json(&self) -> String {
        // Four plain fields; serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Mints and verifies QR payloads.
#[derive(Clone)]
pub struct QrSigner {
    secret: String,
}

impl QrSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(
        &self,
        event_id: EventId,
        user_id: UserId,
        member_id: MemberId,
    ) -> Result<HmacSha256, DomainError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid QR signing key: {}", e))?;
        mac.update(event_id.to_string().as_bytes());
        mac.update(b"|");
        mac.update(user_id.to_string().as_bytes());
        mac.update(b"|");
        mac.update(member_id.to_string().as_bytes());
        Ok(mac)
    }

    pub fn payload_for(&self, member: &EventMember) -> Result<QrPayload, DomainError> {
        let mac = self.mac(member.event_id, member.user_id, member.id)?;
        Ok(QrPayload {
            event_id: member.event_id,
            user_id: member.user_id,
            member_id: member.id,
            sig: hex::encode(mac.finalize().into_bytes()),
        })
    }

    /// Render the member's payload as an SVG QR code data URL.
    pub fn render(&self, member: &EventMember) -> Result<String, DomainError> {
        let payload = self.payload_for(member)?.to_json();
        let code = QrCode::new(payload.as_bytes())
            .map_err(|e| anyhow::anyhow!("failed to encode QR payload: {}", e))?;
        let image = code
            .render::<svg::Color>()
            .min_dimensions(QR_MIN_DIMENSION, QR_MIN_DIMENSION)
            .build();
        Ok(format!(
            "data:image/svg+xml;base64,{}",
            STANDARD.encode(image.as_bytes())
        ))
    }

    /// Parse a scanned payload and check its signature.
    pub fn verify(&self, raw: &str) -> Result<QrPayload, DomainError> {
        let payload: QrPayload = serde_json::from_str(raw.trim())
            .map_err(|e| DomainError::InvalidPayload(e.to_string()))?;

        let mismatch = || DomainError::InvalidPayload("signature mismatch".to_string());
        let sig = hex::decode(&payload.sig).map_err(|_| mismatch())?;
        self.mac(payload.event_id, payload.user_id, payload.member_id)?
            .verify_slice(&sig)
            .map_err(|_| mismatch())?;

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::membership::models::{MemberRole, MemberStatus, PaymentStatus};
    use chrono::Utc;

    fn member() -> EventMember {
        EventMember {
            id: MemberId::new(),
            event_id: EventId::new(),
            user_id: UserId::new(),
            role: MemberRole::Member,
            payment_status: PaymentStatus::Pending,
            status: MemberStatus::Active,
            invited_by: None,
            qr_code: None,
            joined_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn minted_payload_verifies() {
        let signer = QrSigner::new("test-secret");
        let member = member();

        let raw = signer.payload_for(&member).unwrap().to_json();
        let payload = signer.verify(&raw).unwrap();

        assert_eq!(payload.event_id, member.event_id);
        assert_eq!(payload.user_id, member.user_id);
        assert_eq!(payload.member_id, member.id);
    }

    #[test]
    fn payload_uses_camel_case_keys() {
        let signer = QrSigner::new("test-secret");
        let json: serde_json::Value =
            serde_json::from_str(&signer.payload_for(&member()).unwrap().to_json()).unwrap();
        assert!(json.get("eventId").is_some());
        assert!(json.get("userId").is_some());
        assert!(json.get("memberId").is_some());
    }

    #[test]
    fn tampered_member_id_is_rejected() {
        let signer = QrSigner::new("test-secret");
        let mut payload = signer.payload_for(&member()).unwrap();
        payload.member_id = MemberId::new();

        let result = signer.verify(&payload.to_json());
        assert!(matches!(result, Err(DomainError::InvalidPayload(_))));
    }

    #[test]
    fn payload_from_another_server_is_rejected() {
        let raw = QrSigner::new("other-secret")
            .payload_for(&member())
            .unwrap()
            .to_json();
        assert!(QrSigner::new("test-secret").verify(&raw).is_err());
    }

    #[test]
    fn garbage_and_unsigned_payloads_are_invalid() {
        let signer = QrSigner::new("test-secret");
        assert!(matches!(
            signer.verify("not json"),
            Err(DomainError::InvalidPayload(_))
        ));

        let m = member();
        let unsigned = serde_json::json!({
            "eventId": m.event_id,
            "userId": m.user_id,
            "memberId": m.id,
        })
        .to_string();
        assert!(matches!(
            signer.verify(&unsigned),
            Err(DomainError::InvalidPayload(_))
        ));
    }

    #[test]
    fn truncated_or_non_hex_signature_is_rejected() {
        let signer = QrSigner::new("test-secret");
        let mut payload = signer.payload_for(&member()).unwrap();

        payload.sig.truncate(10);
        assert!(matches!(
            signer.verify(&payload.to_json()),
            Err(DomainError::InvalidPayload(_))
        ));

        payload.sig = "zz".repeat(32);
        assert!(matches!(
            signer.verify(&payload.to_json()),
            Err(DomainError::InvalidPayload(_))
        ));
    }

    #[test]
    fn render_produces_svg_data_url() {
        let signer = QrSigner::new("test-secret");
        let url = signer.render(&member()).unwrap();
        assert!(url.starts_with("data:image/svg+xml;base64,"));

        let encoded = url.trim_start_matches("data:image/svg+xml;base64,");
        let svg = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert!(svg.contains("<svg"));
    }
}
