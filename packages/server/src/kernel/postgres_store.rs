//! Postgres implementation of the store traits.
//!
//! Each method delegates to the sqlx functions on the domain models, so the
//! SQL stays next to the type it loads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{
    BaseCheckInStore, BaseEventStore, BaseIdentityDirectory, BaseMembershipStore,
    BaseNotificationStore,
};
use crate::common::{
    EventId, JoinRequestId, MemberId, NotificationId, StepId, StoreResult, UserId,
};
use crate::domains::checkins::models::{CheckIn, CheckInEntry};
use crate::domains::events::models::{Event, EventStep, NewEvent, NewStep, StepChanges};
use crate::domains::identity::{User, UserProfile};
use crate::domains::membership::models::{
    EventMember, JoinRequest, JoinRequestStatus, JoinRequestWithProfile, MemberProfile,
    MemberRemoval, MemberRole, NewMember, PaymentStatus,
};
use crate::domains::notifications::models::{NewNotification, Notification};

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BaseIdentityDirectory for PostgresStore {
    async fn resolve_user_by_phone(&self, phone: &str) -> StoreResult<Option<UserId>> {
        Ok(User::find_by_phone(phone, &self.pool).await?.map(|u| u.id))
    }

    async fn find_profile(&self, user_id: UserId) -> StoreResult<Option<UserProfile>> {
        Ok(User::find_by_id(user_id, &self.pool)
            .await?
            .map(|u| UserProfile::from(&u)))
    }
}

#[async_trait]
impl BaseEventStore for PostgresStore {
    async fn find_event(&self, id: EventId) -> StoreResult<Option<Event>> {
        Event::find_by_id(id, &self.pool).await
    }

    async fn find_events_for_user(&self, user_id: UserId) -> StoreResult<Vec<Event>> {
        Event::find_for_user(user_id, &self.pool).await
    }

    async fn insert_event(&self, new: NewEvent) -> StoreResult<Event> {
        Event::insert(&new, &self.pool).await
    }

    async fn delete_event(&self, id: EventId) -> StoreResult<bool> {
        Event::delete(id, &self.pool).await
    }

    async fn find_step(&self, id: StepId) -> StoreResult<Option<EventStep>> {
        EventStep::find_by_id(id, &self.pool).await
    }

    async fn find_steps(&self, event_id: EventId) -> StoreResult<Vec<EventStep>> {
        EventStep::find_by_event(event_id, &self.pool).await
    }

    async fn find_upcoming_steps(&self, now: DateTime<Utc>) -> StoreResult<Vec<EventStep>> {
        EventStep::find_upcoming(now, &self.pool).await
    }

    async fn insert_step(&self, new: NewStep) -> StoreResult<EventStep> {
        EventStep::insert(&new, &self.pool).await
    }

    async fn update_step(
        &self,
        id: StepId,
        changes: StepChanges,
    ) -> StoreResult<Option<EventStep>> {
        EventStep::update(id, &changes, &self.pool).await
    }

    async fn delete_step(&self, id: StepId) -> StoreResult<bool> {
        EventStep::delete(id, &self.pool).await
    }
}

#[async_trait]
impl BaseMembershipStore for PostgresStore {
    async fn find_member(&self, id: MemberId) -> StoreResult<Option<EventMember>> {
        EventMember::find_by_id(id, &self.pool).await
    }

    async fn find_member_by_user(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> StoreResult<Option<EventMember>> {
        EventMember::find_by_event_and_user(event_id, user_id, &self.pool).await
    }

    async fn find_members(&self, event_id: EventId) -> StoreResult<Vec<EventMember>> {
        EventMember::find_by_event(event_id, &self.pool).await
    }

    async fn find_member_profiles(&self, event_id: EventId) -> StoreResult<Vec<MemberProfile>> {
        EventMember::find_profiles_by_event(event_id, &self.pool).await
    }

    async fn find_pending_invitations(&self, user_id: UserId) -> StoreResult<Vec<EventMember>> {
        EventMember::find_pending_for_user(user_id, &self.pool).await
    }

    async fn insert_member(&self, new: NewMember) -> StoreResult<EventMember> {
        EventMember::insert(&new, &self.pool).await
    }

    async fn activate_member(&self, id: MemberId) -> StoreResult<Option<EventMember>> {
        EventMember::activate(id, &self.pool).await
    }

    async fn set_qr_code(
        &self,
        id: MemberId,
        qr_code: String,
    ) -> StoreResult<Option<EventMember>> {
        EventMember::set_qr_code(id, &qr_code, &self.pool).await
    }

    async fn set_role(&self, id: MemberId, role: MemberRole) -> StoreResult<Option<EventMember>> {
        EventMember::set_role(id, role, &self.pool).await
    }

    async fn set_payment_status(
        &self,
        id: MemberId,
        payment_status: PaymentStatus,
    ) -> StoreResult<Option<EventMember>> {
        EventMember::set_payment_status(id, payment_status, &self.pool).await
    }

    async fn delete_member(&self, id: MemberId) -> StoreResult<bool> {
        EventMember::delete(id, &self.pool).await
    }

    async fn delete_member_keeping_organizer(
        &self,
        id: MemberId,
    ) -> StoreResult<MemberRemoval> {
        EventMember::delete_keeping_organizer(id, &self.pool).await
    }

    async fn count_active_organizers(&self, event_id: EventId) -> StoreResult<i64> {
        EventMember::count_active_organizers(event_id, &self.pool).await
    }

    async fn find_join_request(&self, id: JoinRequestId) -> StoreResult<Option<JoinRequest>> {
        JoinRequest::find_by_id(id, &self.pool).await
    }

    async fn find_join_request_by_user(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> StoreResult<Option<JoinRequest>> {
        JoinRequest::find_by_event_and_user(event_id, user_id, &self.pool).await
    }

    async fn find_join_requests(
        &self,
        event_id: EventId,
    ) -> StoreResult<Vec<JoinRequestWithProfile>> {
        JoinRequest::find_pending_by_event(event_id, &self.pool).await
    }

    async fn insert_join_request(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> StoreResult<JoinRequest> {
        JoinRequest::insert(event_id, user_id, &self.pool).await
    }

    async fn set_join_request_status(
        &self,
        id: JoinRequestId,
        status: JoinRequestStatus,
    ) -> StoreResult<Option<JoinRequest>> {
        JoinRequest::set_status(id, status, &self.pool).await
    }
}

#[async_trait]
impl BaseCheckInStore for PostgresStore {
    async fn find_check_in(
        &self,
        step_id: StepId,
        member_id: MemberId,
    ) -> StoreResult<Option<CheckIn>> {
        CheckIn::find_by_step_and_member(step_id, member_id, &self.pool).await
    }

    async fn find_check_ins(&self, step_id: StepId) -> StoreResult<Vec<CheckIn>> {
        CheckIn::find_by_step(step_id, &self.pool).await
    }

    async fn find_check_in_entries(&self, step_id: StepId) -> StoreResult<Vec<CheckInEntry>> {
        CheckIn::find_entries_by_step(step_id, &self.pool).await
    }

    async fn insert_check_in(
        &self,
        step_id: StepId,
        member_id: MemberId,
        checked_by: UserId,
    ) -> StoreResult<CheckIn> {
        CheckIn::insert(step_id, member_id, checked_by, &self.pool).await
    }
}

#[async_trait]
impl BaseNotificationStore for PostgresStore {
    async fn notification_exists(&self, user_id: UserId, step_id: StepId) -> StoreResult<bool> {
        Notification::exists(user_id, step_id, &self.pool).await
    }

    async fn insert_notification(&self, new: NewNotification) -> StoreResult<Notification> {
        Notification::insert(&new, &self.pool).await
    }

    async fn find_notifications(&self, user_id: UserId) -> StoreResult<Vec<Notification>> {
        Notification::find_for_user(user_id, &self.pool).await
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        user_id: UserId,
    ) -> StoreResult<Option<Notification>> {
        Notification::mark_read(id, user_id, &self.pool).await
    }

    async fn mark_all_read(&self, user_id: UserId) -> StoreResult<u64> {
        Notification::mark_all_read(user_id, &self.pool).await
    }
}
