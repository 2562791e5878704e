use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{EventId, StepId, StoreResult};

/// Alert lead time applied when a step is created without one.
pub const DEFAULT_ALERT_BEFORE_MINUTES: i32 = 30;

/// A scheduled point in an event's itinerary
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventStep {
    pub id: StepId,
    pub event_id: EventId,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub scheduled_time: DateTime<Utc>,
    pub alert_before_minutes: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewStep {
    pub event_id: EventId,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub scheduled_time: DateTime<Utc>,
    pub alert_before_minutes: Option<i32>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct StepChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub alert_before_minutes: Option<i32>,
}

impl EventStep {
    /// Whether a reminder for this step is due at `now`.
    ///
    /// True when the step is still ahead, has a positive lead time, and
    /// `now + lead >= scheduled_time`.
    pub fn is_within_alert_window(&self, now: DateTime<Utc>) -> bool {
        let minutes = match self.alert_before_minutes {
            Some(minutes) if minutes > 0 => minutes,
            _ => return false,
        };
        self.scheduled_time > now && self.scheduled_time <= now + Duration::minutes(minutes as i64)
    }

    pub fn apply(&mut self, changes: &StepChanges) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(description) = &changes.description {
            self.description = Some(description.clone());
        }
        if let Some(location) = &changes.location {
            self.location = Some(location.clone());
        }
        if let Some(time) = changes.scheduled_time {
            self.scheduled_time = time;
        }
        if let Some(minutes) = changes.alert_before_minutes {
            self.alert_before_minutes = Some(minutes);
        }
    }

    pub async fn find_by_id(id: StepId, pool: &PgPool) -> StoreResult<Option<Self>> {
        let step = sqlx::query_as::<_, Self>("SELECT * FROM event_steps WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(step)
    }

    pub async fn find_by_event(event_id: EventId, pool: &PgPool) -> StoreResult<Vec<Self>> {
        let steps = sqlx::query_as::<_, Self>(
            "SELECT * FROM event_steps WHERE event_id = $1 ORDER BY scheduled_time ASC",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await?;
        Ok(steps)
    }

    /// Steps scheduled strictly after `now`
    pub async fn find_upcoming(now: DateTime<Utc>, pool: &PgPool) -> StoreResult<Vec<Self>> {
        let steps = sqlx::query_as::<_, Self>(
            "SELECT * FROM event_steps WHERE scheduled_time > $1 ORDER BY scheduled_time ASC",
        )
        .bind(now)
        .fetch_all(pool)
        .await?;
        Ok(steps)
    }

    pub async fn insert(new: &NewStep, pool: &PgPool) -> StoreResult<Self> {
        let step = sqlx::query_as::<_, Self>(
            "INSERT INTO event_steps
                (id, event_id, name, description, location, scheduled_time, alert_before_minutes)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(StepId::new())
        .bind(new.event_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.location)
        .bind(new.scheduled_time)
        .bind(new.alert_before_minutes)
        .fetch_one(pool)
        .await?;
        Ok(step)
    }

    pub async fn update(
        id: StepId,
        changes: &StepChanges,
        pool: &PgPool,
    ) -> StoreResult<Option<Self>> {
        let step = sqlx::query_as::<_, Self>(
            "UPDATE event_steps SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                scheduled_time = COALESCE($5, scheduled_time),
                alert_before_minutes = COALESCE($6, alert_before_minutes),
                updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(&changes.location)
        .bind(changes.scheduled_time)
        .bind(changes.alert_before_minutes)
        .fetch_optional(pool)
        .await?;
        Ok(step)
    }

    pub async fn delete(id: StepId, pool: &PgPool) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM event_steps WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
