//! Test fixtures for creating test data.
//!
//! Fixtures go through the domain actions so every row starts out the way
//! production would create it. `World` runs on the in-memory store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use trip_core::domains::events::actions::{create_event, create_step, CreateEventInput, CreateStepInput};
use trip_core::domains::events::models::{Event, EventStep};
use trip_core::domains::identity::models::NewUser;
use trip_core::domains::identity::User;
use trip_core::domains::membership::actions::join_directly;
use trip_core::domains::membership::EventMember;
use trip_core::kernel::{InMemoryStore, ServerDeps, StreamHub, TestDependencies};

pub struct World {
    pub store: Arc<InMemoryStore>,
    pub deps: ServerDeps,
}

impl World {
    pub fn new() -> Self {
        let test_deps = TestDependencies::new();
        let store = test_deps.store.clone();
        Self {
            store,
            deps: test_deps.into_server_deps(),
        }
    }

    pub fn hub(&self) -> &StreamHub {
        &self.deps.stream_hub
    }

    pub fn user(&self, phone: &str, first_name: &str) -> User {
        self.store.add_user(NewUser::new(phone, first_name))
    }

    /// An undated event organized by `organizer`
    pub async fn event(&self, organizer: &User) -> Event {
        self.dated_event(organizer, None, None).await
    }

    pub async fn dated_event(
        &self,
        organizer: &User,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Event {
        create_event(
            CreateEventInput {
                name: "Lisbon weekend".to_string(),
                description: None,
                start_date,
                end_date,
            },
            organizer.id,
            &self.deps,
        )
        .await
        .expect("failed to create event")
    }

    pub async fn step(
        &self,
        event: &Event,
        organizer: &User,
        scheduled_time: DateTime<Utc>,
        alert_before_minutes: Option<i32>,
    ) -> EventStep {
        create_step(
            event.id,
            CreateStepInput {
                name: "Tram 28".to_string(),
                description: None,
                location: Some("Martim Moniz".to_string()),
                scheduled_time,
                alert_before_minutes,
            },
            organizer.id,
            &self.deps,
        )
        .await
        .expect("failed to create step")
    }

    /// Make `user` an active member of `event`
    pub async fn member(&self, event: &Event, user: &User) -> EventMember {
        join_directly(event.id, user.id, &self.deps)
            .await
            .expect("failed to join event")
    }

    /// The membership row of `user` in `event`
    pub fn membership(&self, event: &Event, user: &User) -> Option<EventMember> {
        self.store
            .all_members()
            .into_iter()
            .find(|m| m.event_id == event.id && m.user_id == user.id)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
