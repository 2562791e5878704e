use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use crate::common::{Actor, DomainError, EventCapability, EventId, StepId, UserId};
use crate::domains::events::models::{
    Event, EventStep, NewStep, StepChanges, DEFAULT_ALERT_BEFORE_MINUTES,
};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateStepInput {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub scheduled_time: DateTime<Utc>,
    pub alert_before_minutes: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateStepInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub alert_before_minutes: Option<i32>,
}

fn check_schedule(event: &Event, scheduled_time: DateTime<Utc>) -> Result<(), DomainError> {
    if event.contains(scheduled_time) {
        Ok(())
    } else {
        Err(DomainError::StepOutOfBounds)
    }
}

fn check_alert(minutes: Option<i32>) -> Result<(), DomainError> {
    match minutes {
        Some(m) if m < 0 => Err(DomainError::validation(
            "alertBeforeMinutes must not be negative",
        )),
        _ => Ok(()),
    }
}

async fn require_event(event_id: EventId, deps: &ServerDeps) -> Result<Event, DomainError> {
    deps.events
        .find_event(event_id)
        .await?
        .ok_or(DomainError::NotFound("event"))
}

async fn require_step(step_id: StepId, deps: &ServerDeps) -> Result<EventStep, DomainError> {
    deps.events
        .find_step(step_id)
        .await?
        .ok_or(DomainError::NotFound("step"))
}

pub async fn list_steps(
    event_id: EventId,
    viewer_id: UserId,
    deps: &ServerDeps,
) -> Result<Vec<EventStep>, DomainError> {
    require_event(event_id, deps).await?;
    Actor::new(viewer_id)
        .can(EventCapability::ViewEvent)
        .on(event_id)
        .check(deps.members.as_ref())
        .await?;

    Ok(deps.events.find_steps(event_id).await?)
}

/// Add an itinerary step. The time must fall inside the event's dates;
/// exactly on a bound is fine.
pub async fn create_step(
    event_id: EventId,
    input: CreateStepInput,
    organizer_id: UserId,
    deps: &ServerDeps,
) -> Result<EventStep, DomainError> {
    let event = require_event(event_id, deps).await?;
    Actor::new(organizer_id)
        .can(EventCapability::ManageSteps)
        .on(event_id)
        .check(deps.members.as_ref())
        .await?;

    let name = input.name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("step name is required"));
    }
    check_alert(input.alert_before_minutes)?;
    check_schedule(&event, input.scheduled_time)?;

    let step = deps
        .events
        .insert_step(NewStep {
            event_id,
            name: name.to_string(),
            description: input.description,
            location: input.location,
            scheduled_time: input.scheduled_time,
            alert_before_minutes: Some(
                input
                    .alert_before_minutes
                    .unwrap_or(DEFAULT_ALERT_BEFORE_MINUTES),
            ),
        })
        .await?;

    info!(event_id = %event_id, step_id = %step.id, scheduled_time = %step.scheduled_time, "step created");
    Ok(step)
}

pub async fn update_step(
    step_id: StepId,
    input: UpdateStepInput,
    organizer_id: UserId,
    deps: &ServerDeps,
) -> Result<EventStep, DomainError> {
    let step = require_step(step_id, deps).await?;
    Actor::new(organizer_id)
        .can(EventCapability::ManageSteps)
        .on(step.event_id)
        .check(deps.members.as_ref())
        .await?;

    if let Some(name) = &input.name {
        if name.trim().is_empty() {
            return Err(DomainError::validation("step name is required"));
        }
    }
    check_alert(input.alert_before_minutes)?;
    if let Some(time) = input.scheduled_time {
        let event = require_event(step.event_id, deps).await?;
        check_schedule(&event, time)?;
    }

    let changes = StepChanges {
        name: input.name.map(|n| n.trim().to_string()),
        description: input.description,
        location: input.location,
        scheduled_time: input.scheduled_time,
        alert_before_minutes: input.alert_before_minutes,
    };

    let updated = deps
        .events
        .update_step(step_id, changes)
        .await?
        .ok_or(DomainError::NotFound("step"))?;

    info!(step_id = %step_id, "step updated");
    Ok(updated)
}

pub async fn delete_step(
    step_id: StepId,
    organizer_id: UserId,
    deps: &ServerDeps,
) -> Result<(), DomainError> {
    let step = require_step(step_id, deps).await?;
    Actor::new(organizer_id)
        .can(EventCapability::ManageSteps)
        .on(step.event_id)
        .check(deps.members.as_ref())
        .await?;

    deps.events.delete_step(step_id).await?;
    info!(step_id = %step_id, event_id = %step.event_id, "step deleted");
    Ok(())
}
