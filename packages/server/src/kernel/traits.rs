// Trait definitions for dependency injection
//
// These are STORE traits only - no business logic. Membership transitions,
// check-in rules and the reminder sweep are domain functions that use them.
//
// Naming convention: Base* for trait names (e.g., BaseEventStore)

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::common::{
    EventId, JoinRequestId, MemberId, NotificationId, StepId, StoreResult, UserId,
};
use crate::domains::checkins::models::{CheckIn, CheckInEntry};
use crate::domains::events::models::{Event, EventStep, NewEvent, NewStep, StepChanges};
use crate::domains::identity::UserProfile;
use crate::domains::membership::models::{
    EventMember, JoinRequest, JoinRequestStatus, JoinRequestWithProfile, MemberProfile,
    MemberRemoval, MemberRole, NewMember, PaymentStatus,
};
use crate::domains::notifications::models::{NewNotification, Notification};

// =============================================================================
// Identity Directory (consumed, read-only)
// =============================================================================

#[async_trait]
pub trait BaseIdentityDirectory: Send + Sync {
    /// Resolve a phone number to a registered user
    async fn resolve_user_by_phone(&self, phone: &str) -> StoreResult<Option<UserId>>;

    /// Display data for a user
    async fn find_profile(&self, user_id: UserId) -> StoreResult<Option<UserProfile>>;
}

// =============================================================================
// Event Store
// =============================================================================

#[async_trait]
pub trait BaseEventStore: Send + Sync {
    async fn find_event(&self, id: EventId) -> StoreResult<Option<Event>>;

    /// Events where the user is an active member
    async fn find_events_for_user(&self, user_id: UserId) -> StoreResult<Vec<Event>>;

    async fn insert_event(&self, new: NewEvent) -> StoreResult<Event>;

    /// Deletes the event and everything hanging off it
    async fn delete_event(&self, id: EventId) -> StoreResult<bool>;

    async fn find_step(&self, id: StepId) -> StoreResult<Option<EventStep>>;

    /// Steps of an event ordered by scheduled time
    async fn find_steps(&self, event_id: EventId) -> StoreResult<Vec<EventStep>>;

    /// Steps scheduled strictly after `now`, across all events
    async fn find_upcoming_steps(&self, now: DateTime<Utc>) -> StoreResult<Vec<EventStep>>;

    async fn insert_step(&self, new: NewStep) -> StoreResult<EventStep>;

    async fn update_step(&self, id: StepId, changes: StepChanges)
        -> StoreResult<Option<EventStep>>;

    async fn delete_step(&self, id: StepId) -> StoreResult<bool>;
}

// =============================================================================
// Membership Store
// =============================================================================

#[async_trait]
pub trait BaseMembershipStore: Send + Sync {
    async fn find_member(&self, id: MemberId) -> StoreResult<Option<EventMember>>;

    async fn find_member_by_user(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> StoreResult<Option<EventMember>>;

    /// Every member of the event regardless of role or status
    async fn find_members(&self, event_id: EventId) -> StoreResult<Vec<EventMember>>;

    async fn find_member_profiles(&self, event_id: EventId) -> StoreResult<Vec<MemberProfile>>;

    async fn find_pending_invitations(&self, user_id: UserId) -> StoreResult<Vec<EventMember>>;

    /// Fails with `StoreError::UniqueViolation` when `(event_id, user_id)` exists
    async fn insert_member(&self, new: NewMember) -> StoreResult<EventMember>;

    async fn activate_member(&self, id: MemberId) -> StoreResult<Option<EventMember>>;

    async fn set_qr_code(&self, id: MemberId, qr_code: String)
        -> StoreResult<Option<EventMember>>;

    async fn set_role(&self, id: MemberId, role: MemberRole) -> StoreResult<Option<EventMember>>;

    async fn set_payment_status(
        &self,
        id: MemberId,
        payment_status: PaymentStatus,
    ) -> StoreResult<Option<EventMember>>;

    async fn delete_member(&self, id: MemberId) -> StoreResult<bool>;

    /// Check the organizer count and delete in one atomic step
    async fn delete_member_keeping_organizer(&self, id: MemberId)
        -> StoreResult<MemberRemoval>;

    async fn count_active_organizers(&self, event_id: EventId) -> StoreResult<i64>;

    async fn find_join_request(&self, id: JoinRequestId) -> StoreResult<Option<JoinRequest>>;

    async fn find_join_request_by_user(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> StoreResult<Option<JoinRequest>>;

    /// Pending requests with requester display data
    async fn find_join_requests(&self, event_id: EventId)
        -> StoreResult<Vec<JoinRequestWithProfile>>;

    /// Fails with `StoreError::UniqueViolation` when `(event_id, user_id)` exists
    async fn insert_join_request(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> StoreResult<JoinRequest>;

    async fn set_join_request_status(
        &self,
        id: JoinRequestId,
        status: JoinRequestStatus,
    ) -> StoreResult<Option<JoinRequest>>;
}

// =============================================================================
// Check-in Store
// =============================================================================

#[async_trait]
pub trait BaseCheckInStore: Send + Sync {
    async fn find_check_in(
        &self,
        step_id: StepId,
        member_id: MemberId,
    ) -> StoreResult<Option<CheckIn>>;

    async fn find_check_ins(&self, step_id: StepId) -> StoreResult<Vec<CheckIn>>;

    /// Most recent first
    async fn find_check_in_entries(&self, step_id: StepId) -> StoreResult<Vec<CheckInEntry>>;

    /// Fails with `StoreError::UniqueViolation` when `(step_id, member_id)` exists
    async fn insert_check_in(
        &self,
        step_id: StepId,
        member_id: MemberId,
        checked_by: UserId,
    ) -> StoreResult<CheckIn>;
}

// =============================================================================
// Notification Store
// =============================================================================

#[async_trait]
pub trait BaseNotificationStore: Send + Sync {
    async fn notification_exists(&self, user_id: UserId, step_id: StepId) -> StoreResult<bool>;

    /// Fails with `StoreError::UniqueViolation` when `(user_id, step_id)` exists
    async fn insert_notification(&self, new: NewNotification) -> StoreResult<Notification>;

    async fn find_notifications(&self, user_id: UserId) -> StoreResult<Vec<Notification>>;

    async fn mark_read(
        &self,
        id: NotificationId,
        user_id: UserId,
    ) -> StoreResult<Option<Notification>>;

    async fn mark_all_read(&self, user_id: UserId) -> StoreResult<u64>;
}
