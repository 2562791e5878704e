use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{EventId, StoreResult, UserId};

/// Event (trip) - read-mostly context for the membership core
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_by: UserId,
}

impl Event {
    /// Whether `time` lies within the event's (inclusive) bounds.
    ///
    /// Unset bounds are open.
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.start_date.map_or(true, |start| time >= start)
            && self.end_date.map_or(true, |end| time <= end)
    }

    pub async fn find_by_id(id: EventId, pool: &PgPool) -> StoreResult<Option<Self>> {
        let event = sqlx::query_as::<_, Self>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(event)
    }

    /// Events where the user holds an active membership
    pub async fn find_for_user(user_id: UserId, pool: &PgPool) -> StoreResult<Vec<Self>> {
        let events = sqlx::query_as::<_, Self>(
            "SELECT e.*
             FROM events e
             JOIN event_members m ON m.event_id = e.id
             WHERE m.user_id = $1 AND m.status = 'active'
             ORDER BY e.start_date ASC NULLS LAST, e.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(events)
    }

    pub async fn insert(new: &NewEvent, pool: &PgPool) -> StoreResult<Self> {
        let event = sqlx::query_as::<_, Self>(
            "INSERT INTO events (id, name, description, start_date, end_date, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(EventId::new())
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.created_by)
        .fetch_one(pool)
        .await?;
        Ok(event)
    }

    /// Delete an event. Memberships, steps, check-ins and notifications go
    /// with it through ON DELETE CASCADE.
    pub async fn delete(id: EventId, pool: &PgPool) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
