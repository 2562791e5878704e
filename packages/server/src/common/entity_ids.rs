//! Typed ID definitions for all domain entities.
//!
//! The marker types only exist to tag `Id<T>`; domain models live under
//! `crate::domains`.

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker for users owned by the identity directory.
pub struct User;

/// Marker for trips/events.
pub struct Event;

/// Marker for a user's membership in an event.
pub struct Membership;

/// Marker for join requests awaiting an organizer decision.
pub struct JoinRequest;

/// Marker for itinerary steps.
pub struct EventStep;

/// Marker for attendance records.
pub struct CheckIn;

/// Marker for persisted reminders.
pub struct Notification;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type UserId = Id<User>;
pub type EventId = Id<Event>;
pub type MemberId = Id<Membership>;
pub type JoinRequestId = Id<JoinRequest>;
pub type StepId = Id<EventStep>;
pub type CheckInId = Id<CheckIn>;
pub type NotificationId = Id<Notification>;
