/// Role checks for event-scoped operations
///
/// Provides a fluent API used by route handlers before calling into domain
/// actions:
///
/// ```rust,ignore
/// use crate::common::auth::{Actor, EventCapability};
///
/// Actor::new(user_id)
///     .can(EventCapability::ManageMembers)
///     .on(event_id)
///     .check(deps.members.as_ref())
///     .await?;
/// ```
///
/// Authorization stops at event roles; there is no global admin concept.

mod builder;
mod capability;
mod errors;

pub use builder::{Actor, CapabilityBuilder, ScopedCheck};
pub use capability::EventCapability;
pub use errors::AuthError;
