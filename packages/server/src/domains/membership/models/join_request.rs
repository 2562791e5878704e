use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{EventId, JoinRequestId, StoreResult, UserId};
use crate::domains::identity::UserProfile;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "join_request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JoinRequestStatus {
    Pending,
    Accepted,
    Declined,
}

impl std::fmt::Display for JoinRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinRequestStatus::Pending => write!(f, "pending"),
            JoinRequestStatus::Accepted => write!(f, "accepted"),
            JoinRequestStatus::Declined => write!(f, "declined"),
        }
    }
}

/// A user asking organizers to admit them. One row per (event, user);
/// re-requesting after a decision reopens it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub id: JoinRequestId,
    pub event_id: EventId,
    pub user_id: UserId,
    pub status: JoinRequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequestWithProfile {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub request: JoinRequest,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub profile: UserProfile,
}

impl JoinRequest {
    pub fn is_pending(&self) -> bool {
        self.status == JoinRequestStatus::Pending
    }

    pub async fn find_by_id(id: JoinRequestId, pool: &PgPool) -> StoreResult<Option<Self>> {
        let request = sqlx::query_as::<_, Self>("SELECT * FROM event_join_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(request)
    }

    pub async fn find_by_event_and_user(
        event_id: EventId,
        user_id: UserId,
        pool: &PgPool,
    ) -> StoreResult<Option<Self>> {
        let request = sqlx::query_as::<_, Self>(
            "SELECT * FROM event_join_requests WHERE event_id = $1 AND user_id = $2",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
        Ok(request)
    }

    /// Pending requests for an event, oldest first
    pub async fn find_pending_by_event(
        event_id: EventId,
        pool: &PgPool,
    ) -> StoreResult<Vec<JoinRequestWithProfile>> {
        let requests = sqlx::query_as::<_, JoinRequestWithProfile>(
            "SELECT r.*, u.first_name, u.last_name, u.phone, u.avatar_url
             FROM event_join_requests r
             JOIN users u ON u.id = r.user_id
             WHERE r.event_id = $1 AND r.status = 'pending'
             ORDER BY r.created_at ASC",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await?;
        Ok(requests)
    }

    pub async fn insert(event_id: EventId, user_id: UserId, pool: &PgPool) -> StoreResult<Self> {
        let request = sqlx::query_as::<_, Self>(
            "INSERT INTO event_join_requests (id, event_id, user_id)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(JoinRequestId::new())
        .bind(event_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(request)
    }

    pub async fn set_status(
        id: JoinRequestId,
        status: JoinRequestStatus,
        pool: &PgPool,
    ) -> StoreResult<Option<Self>> {
        let request = sqlx::query_as::<_, Self>(
            "UPDATE event_join_requests SET status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await?;
        Ok(request)
    }
}
