use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use crate::common::{Actor, DomainError, EventCapability, EventId, UserId};
use crate::domains::events::models::{Event, NewEvent};
use crate::domains::membership::actions::create_organizer_membership;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateEventInput {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Create an event with the caller as its first organizer
pub async fn create_event(
    input: CreateEventInput,
    user_id: UserId,
    deps: &ServerDeps,
) -> Result<Event, DomainError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("event name is required"));
    }
    if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
        if end < start {
            return Err(DomainError::validation("end date must not be before start date"));
        }
    }

    let event = deps
        .events
        .insert_event(NewEvent {
            name: name.to_string(),
            description: input.description,
            start_date: input.start_date,
            end_date: input.end_date,
            created_by: user_id,
        })
        .await?;

    if let Err(e) = create_organizer_membership(event.id, user_id, deps).await {
        // An event nobody organizes is unusable; take it back out
        warn!(event_id = %event.id, error = %e, "organizer membership failed, deleting event");
        deps.events.delete_event(event.id).await?;
        return Err(e);
    }

    info!(event_id = %event.id, created_by = %user_id, "event created");
    Ok(event)
}

/// Events the caller is an active member of
pub async fn list_events(user_id: UserId, deps: &ServerDeps) -> Result<Vec<Event>, DomainError> {
    Ok(deps.events.find_events_for_user(user_id).await?)
}

pub async fn get_event(
    event_id: EventId,
    viewer_id: UserId,
    deps: &ServerDeps,
) -> Result<Event, DomainError> {
    let event = deps
        .events
        .find_event(event_id)
        .await?
        .ok_or(DomainError::NotFound("event"))?;

    Actor::new(viewer_id)
        .can(EventCapability::ViewEvent)
        .on(event_id)
        .check(deps.members.as_ref())
        .await?;

    Ok(event)
}

/// Delete the event together with its memberships, steps and check-ins
pub async fn delete_event(
    event_id: EventId,
    organizer_id: UserId,
    deps: &ServerDeps,
) -> Result<(), DomainError> {
    Actor::new(organizer_id)
        .can(EventCapability::ManageEvent)
        .on(event_id)
        .check(deps.members.as_ref())
        .await?;

    if !deps.events.delete_event(event_id).await? {
        return Err(DomainError::NotFound("event"));
    }

    info!(event_id = %event_id, deleted_by = %organizer_id, "event deleted");
    Ok(())
}
