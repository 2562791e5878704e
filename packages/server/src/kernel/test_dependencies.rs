// TestDependencies - in-memory implementations for testing
//
// `InMemoryStore` implements every store trait over plain vectors and enforces
// the same unique keys the migrations declare, so conflict paths behave like
// Postgres without a database.
//
// With `interleave_calls` switched on every store call yields once before it
// touches state. Two actions driven by `tokio::join!` then run in lockstep:
// both read, then both write, the way concurrent requests race on a pool.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{
    BaseCheckInStore, BaseEventStore, BaseIdentityDirectory, BaseMembershipStore,
    BaseNotificationStore, ServerDeps, StreamHub,
};
use crate::common::{
    CheckInId, EventId, JoinRequestId, MemberId, NotificationId, StepId, StoreError, StoreResult,
    UserId,
};
use crate::domains::checkins::models::{CheckIn, CheckInEntry};
use crate::domains::events::models::{Event, EventStep, NewEvent, NewStep, StepChanges};
use crate::domains::identity::models::NewUser;
use crate::domains::identity::{User, UserProfile};
use crate::domains::membership::models::{
    EventMember, JoinRequest, JoinRequestStatus, JoinRequestWithProfile, MemberProfile,
    MemberRemoval, MemberRole, MemberStatus, NewMember, PaymentStatus,
};
use crate::domains::membership::qr::QrSigner;
use crate::domains::notifications::models::{NewNotification, Notification};

pub const TEST_QR_SECRET: &str = "test-qr-secret";

// =============================================================================
// In-memory store
// =============================================================================

#[derive(Default)]
struct State {
    users: Vec<User>,
    events: Vec<Event>,
    steps: Vec<EventStep>,
    members: Vec<EventMember>,
    join_requests: Vec<JoinRequest>,
    check_ins: Vec<CheckIn>,
    notifications: Vec<Notification>,
    failing_notification_users: HashSet<UserId>,
}

impl State {
    fn profile(&self, user_id: UserId) -> Option<UserProfile> {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(UserProfile::from)
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    interleave: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("in-memory store mutex poisoned")
    }

    /// Yield to the scheduler before every store call from now on
    pub fn interleave_calls(&self) {
        self.interleave.store(true, Ordering::SeqCst);
    }

    async fn pause(&self) {
        if self.interleave.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
    }

    /// Register a user in the directory
    pub fn add_user(&self, new: NewUser) -> User {
        let user = User {
            id: UserId::new(),
            phone: new.phone,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            avatar_url: None,
            created_at: Utc::now(),
        };
        self.state().users.push(user.clone());
        user
    }

    /// Seed an event directly, bypassing the create-event action
    pub fn add_event(
        &self,
        created_by: UserId,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Event {
        let now = Utc::now();
        let event = Event {
            id: EventId::new(),
            name: "Test trip".to_string(),
            description: None,
            start_date,
            end_date,
            created_by,
            created_at: now,
            updated_at: now,
        };
        self.state().events.push(event.clone());
        event
    }

    /// Make `insert_notification` fail with a database error for this user
    pub fn fail_notifications_for(&self, user_id: UserId) {
        self.state().failing_notification_users.insert(user_id);
    }

    pub fn clear_notification_failures(&self) {
        self.state().failing_notification_users.clear();
    }

    pub fn all_notifications(&self) -> Vec<Notification> {
        self.state().notifications.clone()
    }

    pub fn all_members(&self) -> Vec<EventMember> {
        self.state().members.clone()
    }

    pub fn all_check_ins(&self) -> Vec<CheckIn> {
        self.state().check_ins.clone()
    }
}

fn touch<T>(item: &mut T, f: impl FnOnce(&mut T)) -> T
where
    T: Clone,
{
    f(item);
    item.clone()
}

#[async_trait]
impl BaseIdentityDirectory for InMemoryStore {
    async fn resolve_user_by_phone(&self, phone: &str) -> StoreResult<Option<UserId>> {
        self.pause().await;
        Ok(self
            .state()
            .users
            .iter()
            .find(|u| u.phone == phone)
            .map(|u| u.id))
    }

    async fn find_profile(&self, user_id: UserId) -> StoreResult<Option<UserProfile>> {
        self.pause().await;
        Ok(self.state().profile(user_id))
    }
}

#[async_trait]
impl BaseEventStore for InMemoryStore {
    async fn find_event(&self, id: EventId) -> StoreResult<Option<Event>> {
        self.pause().await;
        Ok(self.state().events.iter().find(|e| e.id == id).cloned())
    }

    async fn find_events_for_user(&self, user_id: UserId) -> StoreResult<Vec<Event>> {
        self.pause().await;
        let state = self.state();
        Ok(state
            .events
            .iter()
            .filter(|e| {
                state
                    .members
                    .iter()
                    .any(|m| m.event_id == e.id && m.user_id == user_id && m.is_active())
            })
            .cloned()
            .collect())
    }

    async fn insert_event(&self, new: NewEvent) -> StoreResult<Event> {
        self.pause().await;
        let now = Utc::now();
        let event = Event {
            id: EventId::new(),
            name: new.name,
            description: new.description,
            start_date: new.start_date,
            end_date: new.end_date,
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        };
        self.state().events.push(event.clone());
        Ok(event)
    }

    async fn delete_event(&self, id: EventId) -> StoreResult<bool> {
        self.pause().await;
        let mut state = self.state();
        let before = state.events.len();
        state.events.retain(|e| e.id != id);
        if state.events.len() == before {
            return Ok(false);
        }

        let step_ids: HashSet<StepId> = state
            .steps
            .iter()
            .filter(|s| s.event_id == id)
            .map(|s| s.id)
            .collect();
        state.steps.retain(|s| s.event_id != id);
        state.members.retain(|m| m.event_id != id);
        state.join_requests.retain(|r| r.event_id != id);
        state.check_ins.retain(|c| !step_ids.contains(&c.step_id));
        state.notifications.retain(|n| n.event_id != id);
        Ok(true)
    }

    async fn find_step(&self, id: StepId) -> StoreResult<Option<EventStep>> {
        self.pause().await;
        Ok(self.state().steps.iter().find(|s| s.id == id).cloned())
    }

    async fn find_steps(&self, event_id: EventId) -> StoreResult<Vec<EventStep>> {
        self.pause().await;
        let mut steps: Vec<EventStep> = self
            .state()
            .steps
            .iter()
            .filter(|s| s.event_id == event_id)
            .cloned()
            .collect();
        steps.sort_by_key(|s| s.scheduled_time);
        Ok(steps)
    }

    async fn find_upcoming_steps(&self, now: DateTime<Utc>) -> StoreResult<Vec<EventStep>> {
        self.pause().await;
        let mut steps: Vec<EventStep> = self
            .state()
            .steps
            .iter()
            .filter(|s| s.scheduled_time > now)
            .cloned()
            .collect();
        steps.sort_by_key(|s| s.scheduled_time);
        Ok(steps)
    }

    async fn insert_step(&self, new: NewStep) -> StoreResult<EventStep> {
        self.pause().await;
        let now = Utc::now();
        let step = EventStep {
            id: StepId::new(),
            event_id: new.event_id,
            name: new.name,
            description: new.description,
            location: new.location,
            scheduled_time: new.scheduled_time,
            alert_before_minutes: new.alert_before_minutes,
            created_at: now,
            updated_at: now,
        };
        self.state().steps.push(step.clone());
        Ok(step)
    }

    async fn update_step(
        &self,
        id: StepId,
        changes: StepChanges,
    ) -> StoreResult<Option<EventStep>> {
        self.pause().await;
        Ok(self
            .state()
            .steps
            .iter_mut()
            .find(|s| s.id == id)
            .map(|s| {
                touch(s, |s| {
                    s.apply(&changes);
                    s.updated_at = Utc::now();
                })
            }))
    }

    async fn delete_step(&self, id: StepId) -> StoreResult<bool> {
        self.pause().await;
        let mut state = self.state();
        let before = state.steps.len();
        state.steps.retain(|s| s.id != id);
        state.check_ins.retain(|c| c.step_id != id);
        state.notifications.retain(|n| n.step_id != id);
        Ok(state.steps.len() < before)
    }
}

#[async_trait]
impl BaseMembershipStore for InMemoryStore {
    async fn find_member(&self, id: MemberId) -> StoreResult<Option<EventMember>> {
        self.pause().await;
        Ok(self.state().members.iter().find(|m| m.id == id).cloned())
    }

    async fn find_member_by_user(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> StoreResult<Option<EventMember>> {
        self.pause().await;
        Ok(self
            .state()
            .members
            .iter()
            .find(|m| m.event_id == event_id && m.user_id == user_id)
            .cloned())
    }

    async fn find_members(&self, event_id: EventId) -> StoreResult<Vec<EventMember>> {
        self.pause().await;
        Ok(self
            .state()
            .members
            .iter()
            .filter(|m| m.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn find_member_profiles(&self, event_id: EventId) -> StoreResult<Vec<MemberProfile>> {
        self.pause().await;
        let state = self.state();
        Ok(state
            .members
            .iter()
            .filter(|m| m.event_id == event_id)
            .filter_map(|m| {
                state.profile(m.user_id).map(|profile| MemberProfile {
                    member: m.clone(),
                    profile,
                })
            })
            .collect())
    }

    async fn find_pending_invitations(&self, user_id: UserId) -> StoreResult<Vec<EventMember>> {
        self.pause().await;
        Ok(self
            .state()
            .members
            .iter()
            .filter(|m| m.user_id == user_id && m.status == MemberStatus::Pending)
            .cloned()
            .collect())
    }

    async fn insert_member(&self, new: NewMember) -> StoreResult<EventMember> {
        self.pause().await;
        let mut state = self.state();
        if state
            .members
            .iter()
            .any(|m| m.event_id == new.event_id && m.user_id == new.user_id)
        {
            return Err(StoreError::unique("event_members_event_id_user_id_key"));
        }

        let now = Utc::now();
        let member = EventMember {
            id: MemberId::new(),
            event_id: new.event_id,
            user_id: new.user_id,
            role: new.role,
            payment_status: PaymentStatus::Pending,
            status: new.status,
            invited_by: new.invited_by,
            qr_code: None,
            joined_at: now,
            updated_at: now,
        };
        state.members.push(member.clone());
        Ok(member)
    }

    async fn activate_member(&self, id: MemberId) -> StoreResult<Option<EventMember>> {
        self.pause().await;
        Ok(self
            .state()
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .map(|m| {
                touch(m, |m| {
                    m.status = MemberStatus::Active;
                    m.qr_code = None;
                    m.updated_at = Utc::now();
                })
            }))
    }

    async fn set_qr_code(
        &self,
        id: MemberId,
        qr_code: String,
    ) -> StoreResult<Option<EventMember>> {
        self.pause().await;
        Ok(self
            .state()
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .map(|m| {
                touch(m, |m| {
                    m.qr_code = Some(qr_code);
                    m.updated_at = Utc::now();
                })
            }))
    }

    async fn set_role(&self, id: MemberId, role: MemberRole) -> StoreResult<Option<EventMember>> {
        self.pause().await;
        Ok(self
            .state()
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .map(|m| {
                touch(m, |m| {
                    m.role = role;
                    m.updated_at = Utc::now();
                })
            }))
    }

    async fn set_payment_status(
        &self,
        id: MemberId,
        payment_status: PaymentStatus,
    ) -> StoreResult<Option<EventMember>> {
        self.pause().await;
        Ok(self
            .state()
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .map(|m| {
                touch(m, |m| {
                    m.payment_status = payment_status;
                    m.updated_at = Utc::now();
                })
            }))
    }

    async fn delete_member(&self, id: MemberId) -> StoreResult<bool> {
        self.pause().await;
        let mut state = self.state();
        let before = state.members.len();
        state.members.retain(|m| m.id != id);
        state.check_ins.retain(|c| c.member_id != id);
        Ok(state.members.len() < before)
    }

    async fn delete_member_keeping_organizer(
        &self,
        id: MemberId,
    ) -> StoreResult<MemberRemoval> {
        self.pause().await;
        let mut state = self.state();
        let Some(member) = state.members.iter().find(|m| m.id == id).cloned() else {
            return Ok(MemberRemoval::NotFound);
        };
        if member.is_active_organizer() {
            let organizers = state
                .members
                .iter()
                .filter(|m| m.event_id == member.event_id && m.is_active_organizer())
                .count();
            if organizers <= 1 {
                return Ok(MemberRemoval::LastOrganizer);
            }
        }

        state.members.retain(|m| m.id != id);
        state.check_ins.retain(|c| c.member_id != id);
        Ok(MemberRemoval::Removed)
    }

    async fn count_active_organizers(&self, event_id: EventId) -> StoreResult<i64> {
        self.pause().await;
        Ok(self
            .state()
            .members
            .iter()
            .filter(|m| m.event_id == event_id && m.is_active_organizer())
            .count() as i64)
    }

    async fn find_join_request(&self, id: JoinRequestId) -> StoreResult<Option<JoinRequest>> {
        self.pause().await;
        Ok(self
            .state()
            .join_requests
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn find_join_request_by_user(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> StoreResult<Option<JoinRequest>> {
        self.pause().await;
        Ok(self
            .state()
            .join_requests
            .iter()
            .find(|r| r.event_id == event_id && r.user_id == user_id)
            .cloned())
    }

    async fn find_join_requests(
        &self,
        event_id: EventId,
    ) -> StoreResult<Vec<JoinRequestWithProfile>> {
        self.pause().await;
        let state = self.state();
        Ok(state
            .join_requests
            .iter()
            .filter(|r| r.event_id == event_id && r.is_pending())
            .filter_map(|r| {
                state.profile(r.user_id).map(|profile| JoinRequestWithProfile {
                    request: r.clone(),
                    profile,
                })
            })
            .collect())
    }

    async fn insert_join_request(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> StoreResult<JoinRequest> {
        self.pause().await;
        let mut state = self.state();
        if state
            .join_requests
            .iter()
            .any(|r| r.event_id == event_id && r.user_id == user_id)
        {
            return Err(StoreError::unique("event_join_requests_event_id_user_id_key"));
        }

        let now = Utc::now();
        let request = JoinRequest {
            id: JoinRequestId::new(),
            event_id,
            user_id,
            status: JoinRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        state.join_requests.push(request.clone());
        Ok(request)
    }

    async fn set_join_request_status(
        &self,
        id: JoinRequestId,
        status: JoinRequestStatus,
    ) -> StoreResult<Option<JoinRequest>> {
        self.pause().await;
        Ok(self
            .state()
            .join_requests
            .iter_mut()
            .find(|r| r.id == id)
            .map(|r| {
                touch(r, |r| {
                    r.status = status;
                    r.updated_at = Utc::now();
                })
            }))
    }
}

#[async_trait]
impl BaseCheckInStore for InMemoryStore {
    async fn find_check_in(
        &self,
        step_id: StepId,
        member_id: MemberId,
    ) -> StoreResult<Option<CheckIn>> {
        self.pause().await;
        Ok(self
            .state()
            .check_ins
            .iter()
            .find(|c| c.step_id == step_id && c.member_id == member_id)
            .cloned())
    }

    async fn find_check_ins(&self, step_id: StepId) -> StoreResult<Vec<CheckIn>> {
        self.pause().await;
        Ok(self
            .state()
            .check_ins
            .iter()
            .filter(|c| c.step_id == step_id)
            .cloned()
            .collect())
    }

    async fn find_check_in_entries(&self, step_id: StepId) -> StoreResult<Vec<CheckInEntry>> {
        self.pause().await;
        let state = self.state();
        // Newest insert first so equal timestamps still read most recent first
        let mut entries: Vec<CheckInEntry> = state
            .check_ins
            .iter()
            .rev()
            .filter(|c| c.step_id == step_id)
            .filter_map(|c| {
                let member = state.members.iter().find(|m| m.id == c.member_id)?;
                let profile = state.profile(member.user_id)?;
                Some(CheckInEntry {
                    check_in: c.clone(),
                    user_id: member.user_id,
                    profile,
                })
            })
            .collect();
        entries.sort_by(|a, b| b.check_in.checked_in_at.cmp(&a.check_in.checked_in_at));
        Ok(entries)
    }

    async fn insert_check_in(
        &self,
        step_id: StepId,
        member_id: MemberId,
        checked_by: UserId,
    ) -> StoreResult<CheckIn> {
        self.pause().await;
        let mut state = self.state();
        if state
            .check_ins
            .iter()
            .any(|c| c.step_id == step_id && c.member_id == member_id)
        {
            return Err(StoreError::unique("check_ins_step_id_member_id_key"));
        }

        let check_in = CheckIn {
            id: CheckInId::new(),
            step_id,
            member_id,
            checked_in_at: Utc::now(),
            checked_by: Some(checked_by),
        };
        state.check_ins.push(check_in.clone());
        Ok(check_in)
    }
}

#[async_trait]
impl BaseNotificationStore for InMemoryStore {
    async fn notification_exists(&self, user_id: UserId, step_id: StepId) -> StoreResult<bool> {
        self.pause().await;
        Ok(self
            .state()
            .notifications
            .iter()
            .any(|n| n.user_id == user_id && n.step_id == step_id))
    }

    async fn insert_notification(&self, new: NewNotification) -> StoreResult<Notification> {
        self.pause().await;
        let mut state = self.state();
        if state.failing_notification_users.contains(&new.user_id) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        if state
            .notifications
            .iter()
            .any(|n| n.user_id == new.user_id && n.step_id == new.step_id)
        {
            return Err(StoreError::unique("notifications_user_id_step_id_key"));
        }

        let notification = Notification {
            id: NotificationId::new(),
            user_id: new.user_id,
            event_id: new.event_id,
            step_id: new.step_id,
            title: new.title,
            message: new.message,
            is_read: false,
            created_at: Utc::now(),
        };
        state.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn find_notifications(&self, user_id: UserId) -> StoreResult<Vec<Notification>> {
        self.pause().await;
        Ok(self
            .state()
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        user_id: UserId,
    ) -> StoreResult<Option<Notification>> {
        self.pause().await;
        Ok(self
            .state()
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .map(|n| touch(n, |n| n.is_read = true)))
    }

    async fn mark_all_read(&self, user_id: UserId) -> StoreResult<u64> {
        self.pause().await;
        let mut updated = 0;
        for n in self
            .state()
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            n.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub store: Arc<InMemoryStore>,
    pub stream_hub: StreamHub,
    pub qr_signer: QrSigner,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            stream_hub: StreamHub::new(),
            qr_signer: QrSigner::new(TEST_QR_SECRET),
        }
    }

    /// Use a shared store (e.g. one already seeded)
    pub fn with_store(mut self, store: Arc<InMemoryStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_stream_hub(mut self, hub: StreamHub) -> Self {
        self.stream_hub = hub;
        self
    }

    /// Build ServerDeps with every store backed by the in-memory store
    pub fn into_server_deps(self) -> ServerDeps {
        ServerDeps::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store,
            self.stream_hub,
            self.qr_signer,
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
