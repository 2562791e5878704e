use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{EventId, NotificationId, StepId, StoreResult, UserId};

/// Persisted step reminder; at most one per (user, step)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub event_id: EventId,
    pub step_id: StepId,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: UserId,
    pub event_id: EventId,
    pub step_id: StepId,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub async fn exists(user_id: UserId, step_id: StepId, pool: &PgPool) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM notifications WHERE user_id = $1 AND step_id = $2)",
        )
        .bind(user_id)
        .bind(step_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Insert a reminder. A second row for the same (user, step) violates
    /// `notifications_user_id_step_id_key`.
    pub async fn insert(new: &NewNotification, pool: &PgPool) -> StoreResult<Self> {
        let notification = sqlx::query_as::<_, Self>(
            "INSERT INTO notifications (id, user_id, event_id, step_id, title, message)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(NotificationId::new())
        .bind(new.user_id)
        .bind(new.event_id)
        .bind(new.step_id)
        .bind(&new.title)
        .bind(&new.message)
        .fetch_one(pool)
        .await?;
        Ok(notification)
    }

    pub async fn find_for_user(user_id: UserId, pool: &PgPool) -> StoreResult<Vec<Self>> {
        let notifications = sqlx::query_as::<_, Self>(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC LIMIT 100",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(notifications)
    }

    pub async fn mark_read(
        id: NotificationId,
        user_id: UserId,
        pool: &PgPool,
    ) -> StoreResult<Option<Self>> {
        let notification = sqlx::query_as::<_, Self>(
            "UPDATE notifications SET is_read = TRUE
             WHERE id = $1 AND user_id = $2
             RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
        Ok(notification)
    }

    pub async fn mark_all_read(user_id: UserId, pool: &PgPool) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
