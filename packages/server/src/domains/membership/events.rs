//! Membership change pushes.
//!
//! Every successful transition is announced on the event's topic so open
//! member lists can refresh. Pushes are best effort; nobody listening is fine.

use serde::Serialize;

use crate::common::{EventId, MemberId, UserId};
use crate::kernel::StreamHub;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipChange {
    Invited,
    InvitationDeclined,
    Joined,
    JoinRequested,
    JoinRequestDeclined,
    RoleChanged,
    PaymentUpdated,
    Removed,
    Left,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipChanged {
    pub event_id: EventId,
    pub user_id: UserId,
    pub member_id: Option<MemberId>,
    pub change: MembershipChange,
}

impl MembershipChanged {
    pub fn new(
        event_id: EventId,
        user_id: UserId,
        member_id: Option<MemberId>,
        change: MembershipChange,
    ) -> Self {
        Self {
            event_id,
            user_id,
            member_id,
            change,
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        let mut value = serde_json::json!({ "type": "membership_changed" });
        if let (Some(obj), Ok(serde_json::Value::Object(fields))) =
            (value.as_object_mut(), serde_json::to_value(self))
        {
            obj.extend(fields);
        }
        value
    }

    pub async fn publish(self, hub: &StreamHub) {
        let delivered = hub.publish_to_event(self.event_id, self.to_value()).await;
        tracing::debug!(
            event_id = %self.event_id,
            change = ?self.change,
            delivered,
            "membership change published"
        );
    }
}
