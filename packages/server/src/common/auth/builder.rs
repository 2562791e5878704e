use super::{AuthError, EventCapability};
use crate::common::entity_ids::{EventId, UserId};
use crate::domains::membership::models::{EventMember, MemberRole, MemberStatus};
use crate::kernel::BaseMembershipStore;

/// Entry point for authorization checks
pub struct Actor {
    actor_id: UserId,
}

impl Actor {
    pub fn new(actor_id: UserId) -> Self {
        Self { actor_id }
    }

    /// Specify what capability the actor needs
    pub fn can(self, capability: EventCapability) -> CapabilityBuilder {
        CapabilityBuilder {
            actor_id: self.actor_id,
            capability,
        }
    }
}

/// Builder after specifying capability
pub struct CapabilityBuilder {
    actor_id: UserId,
    capability: EventCapability,
}

impl CapabilityBuilder {
    /// Scope the check to one event
    pub fn on(self, event_id: EventId) -> ScopedCheck {
        ScopedCheck {
            actor_id: self.actor_id,
            capability: self.capability,
            event_id,
        }
    }
}

/// Fully specified check, ready to run against the membership store
pub struct ScopedCheck {
    actor_id: UserId,
    capability: EventCapability,
    event_id: EventId,
}

impl ScopedCheck {
    /// Perform the authorization check.
    ///
    /// Returns the actor's active membership so callers don't have to load it
    /// again.
    pub async fn check(self, members: &dyn BaseMembershipStore) -> Result<EventMember, AuthError> {
        let membership = members
            .find_member_by_user(self.event_id, self.actor_id)
            .await?
            .filter(|m| m.status == MemberStatus::Active)
            .ok_or(AuthError::NotAMember)?;

        if self.capability.requires_organizer() && membership.role != MemberRole::Organizer {
            return Err(AuthError::PermissionDenied(format!(
                "only organizers can {}",
                self.capability.describe()
            )));
        }

        Ok(membership)
    }
}
