use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{DomainError, EventId, MemberId, StoreResult, UserId};
use crate::domains::identity::UserProfile;

/// Role of a member within one event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Organizer,
    Member,
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberRole::Organizer => write!(f, "organizer"),
            MemberRole::Member => write!(f, "member"),
        }
    }
}

impl std::str::FromStr for MemberRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "organizer" => Ok(MemberRole::Organizer),
            "member" => Ok(MemberRole::Member),
            other => Err(DomainError::InvalidRole(other.to_string())),
        }
    }
}

/// `pending` rows are outstanding invitations; everything else is `active`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "member_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Pending,
    Active,
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberStatus::Pending => write!(f, "pending"),
            MemberStatus::Active => write!(f, "active"),
        }
    }
}

/// Stored label only; nothing moves money
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Refunded => write!(f, "refunded"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(DomainError::InvalidPaymentStatus(other.to_string())),
        }
    }
}

/// A user's membership in an event
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventMember {
    pub id: MemberId,
    pub event_id: EventId,
    pub user_id: UserId,
    pub role: MemberRole,
    pub payment_status: PaymentStatus,
    pub status: MemberStatus,
    pub invited_by: Option<UserId>,
    pub qr_code: Option<String>, // data URL; empty until the second mint step lands
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventMember {
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }

    pub fn is_active_organizer(&self) -> bool {
        self.is_active() && self.role == MemberRole::Organizer
    }
}

/// Outcome of a removal that must leave the event an active organizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRemoval {
    Removed,
    NotFound,
    LastOrganizer,
}

/// Member row joined with the user's display data
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub member: EventMember,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub profile: UserProfile,
}

#[derive(Debug, Clone)]
pub struct NewMember {
    pub event_id: EventId,
    pub user_id: UserId,
    pub role: MemberRole,
    pub status: MemberStatus,
    pub invited_by: Option<UserId>,
}

impl NewMember {
    /// Event creator's membership
    pub fn organizer(event_id: EventId, user_id: UserId) -> Self {
        Self {
            event_id,
            user_id,
            role: MemberRole::Organizer,
            status: MemberStatus::Active,
            invited_by: None,
        }
    }

    /// Direct join or approved join request
    pub fn active_member(event_id: EventId, user_id: UserId) -> Self {
        Self {
            event_id,
            user_id,
            role: MemberRole::Member,
            status: MemberStatus::Active,
            invited_by: None,
        }
    }

    pub fn invitation(event_id: EventId, user_id: UserId, invited_by: UserId) -> Self {
        Self {
            event_id,
            user_id,
            role: MemberRole::Member,
            status: MemberStatus::Pending,
            invited_by: Some(invited_by),
        }
    }
}

const PROFILE_COLUMNS: &str = "m.*, u.first_name, u.last_name, u.phone, u.avatar_url";

impl EventMember {
    pub async fn find_by_id(id: MemberId, pool: &PgPool) -> StoreResult<Option<Self>> {
        let member = sqlx::query_as::<_, Self>("SELECT * FROM event_members WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(member)
    }

    pub async fn find_by_event_and_user(
        event_id: EventId,
        user_id: UserId,
        pool: &PgPool,
    ) -> StoreResult<Option<Self>> {
        let member = sqlx::query_as::<_, Self>(
            "SELECT * FROM event_members WHERE event_id = $1 AND user_id = $2",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
        Ok(member)
    }

    /// All memberships of an event, any role or status
    pub async fn find_by_event(event_id: EventId, pool: &PgPool) -> StoreResult<Vec<Self>> {
        let members = sqlx::query_as::<_, Self>(
            "SELECT * FROM event_members WHERE event_id = $1 ORDER BY joined_at ASC",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await?;
        Ok(members)
    }

    pub async fn find_profiles_by_event(
        event_id: EventId,
        pool: &PgPool,
    ) -> StoreResult<Vec<MemberProfile>> {
        let query = format!(
            "SELECT {PROFILE_COLUMNS}
             FROM event_members m
             JOIN users u ON u.id = m.user_id
             WHERE m.event_id = $1
             ORDER BY m.joined_at ASC"
        );
        let members = sqlx::query_as::<_, MemberProfile>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await?;
        Ok(members)
    }

    pub async fn find_pending_for_user(user_id: UserId, pool: &PgPool) -> StoreResult<Vec<Self>> {
        let members = sqlx::query_as::<_, Self>(
            "SELECT * FROM event_members
             WHERE user_id = $1 AND status = 'pending'
             ORDER BY joined_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(members)
    }

    /// Insert a membership row. A concurrent insert for the same
    /// `(event_id, user_id)` surfaces as `StoreError::UniqueViolation`.
    pub async fn insert(new: &NewMember, pool: &PgPool) -> StoreResult<Self> {
        let member = sqlx::query_as::<_, Self>(
            "INSERT INTO event_members (id, event_id, user_id, role, status, invited_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(MemberId::new())
        .bind(new.event_id)
        .bind(new.user_id)
        .bind(new.role)
        .bind(new.status)
        .bind(new.invited_by)
        .fetch_one(pool)
        .await?;
        Ok(member)
    }

    /// Flip a pending row to active and clear any stale QR code
    pub async fn activate(id: MemberId, pool: &PgPool) -> StoreResult<Option<Self>> {
        let member = sqlx::query_as::<_, Self>(
            "UPDATE event_members
             SET status = 'active', qr_code = NULL, updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(member)
    }

    pub async fn set_qr_code(id: MemberId, qr_code: &str, pool: &PgPool) -> StoreResult<Option<Self>> {
        let member = sqlx::query_as::<_, Self>(
            "UPDATE event_members SET qr_code = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(qr_code)
        .fetch_optional(pool)
        .await?;
        Ok(member)
    }

    pub async fn set_role(id: MemberId, role: MemberRole, pool: &PgPool) -> StoreResult<Option<Self>> {
        let member = sqlx::query_as::<_, Self>(
            "UPDATE event_members SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(pool)
        .await?;
        Ok(member)
    }

    pub async fn set_payment_status(
        id: MemberId,
        payment_status: PaymentStatus,
        pool: &PgPool,
    ) -> StoreResult<Option<Self>> {
        let member = sqlx::query_as::<_, Self>(
            "UPDATE event_members SET payment_status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(payment_status)
        .fetch_optional(pool)
        .await?;
        Ok(member)
    }

    pub async fn delete(id: MemberId, pool: &PgPool) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM event_members WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a membership unless it is the event's only active organizer.
    ///
    /// Removals within one event serialize on the `events` row, so two
    /// organizers leaving together cannot both pass the count.
    pub async fn delete_keeping_organizer(
        id: MemberId,
        pool: &PgPool,
    ) -> StoreResult<MemberRemoval> {
        let mut tx = pool.begin().await?;

        let event_id: Option<EventId> = sqlx::query_scalar(
            "SELECT e.id FROM events e
             JOIN event_members m ON m.event_id = e.id
             WHERE m.id = $1
             FOR UPDATE OF e",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(event_id) = event_id else {
            return Ok(MemberRemoval::NotFound);
        };

        // Re-read under the lock; a concurrent removal may have won
        let member = sqlx::query_as::<_, Self>("SELECT * FROM event_members WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(member) = member else {
            return Ok(MemberRemoval::NotFound);
        };

        if member.is_active_organizer() {
            let organizers: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM event_members
                 WHERE event_id = $1 AND role = 'organizer' AND status = 'active'",
            )
            .bind(event_id)
            .fetch_one(&mut *tx)
            .await?;
            if organizers <= 1 {
                return Ok(MemberRemoval::LastOrganizer);
            }
        }

        sqlx::query("DELETE FROM event_members WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(MemberRemoval::Removed)
    }

    pub async fn count_active_organizers(event_id: EventId, pool: &PgPool) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM event_members
             WHERE event_id = $1 AND role = 'organizer' AND status = 'active'",
        )
        .bind(event_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
