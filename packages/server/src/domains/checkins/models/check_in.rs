use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{CheckInId, MemberId, StepId, StoreResult, UserId};
use crate::domains::identity::UserProfile;
use crate::domains::membership::models::{MemberProfile, MemberRole, MemberStatus};

/// Attendance record; unique per (step, member)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    pub id: CheckInId,
    pub step_id: StepId,
    pub member_id: MemberId,
    pub checked_in_at: DateTime<Utc>,
    /// Operator who recorded it; cleared if that account goes away
    pub checked_by: Option<UserId>,
}

/// Check-in joined with the attendee's display data
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CheckInEntry {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub check_in: CheckIn,
    pub user_id: UserId,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub profile: UserProfile,
}

/// One row of a step's presence roster
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberAttendance {
    pub member_id: MemberId,
    pub user_id: UserId,
    pub role: MemberRole,
    pub status: MemberStatus,
    #[serde(flatten)]
    pub profile: UserProfile,
    pub checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
}

/// Presence roster for a step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStatus {
    pub step_id: StepId,
    pub members: Vec<MemberAttendance>,
    pub total: usize,
    pub checked_in: usize,
    pub pending: usize,
}

impl StepStatus {
    /// Build the roster from every member of the step's event and the
    /// check-ins recorded so far.
    pub fn build(step_id: StepId, members: Vec<MemberProfile>, check_ins: &[CheckIn]) -> Self {
        let members: Vec<MemberAttendance> = members
            .into_iter()
            .map(|m| {
                let record = check_ins.iter().find(|c| c.member_id == m.member.id);
                MemberAttendance {
                    member_id: m.member.id,
                    user_id: m.member.user_id,
                    role: m.member.role,
                    status: m.member.status,
                    profile: m.profile,
                    checked_in: record.is_some(),
                    checked_in_at: record.map(|c| c.checked_in_at),
                }
            })
            .collect();

        let total = members.len();
        let checked_in = members.iter().filter(|m| m.checked_in).count();

        Self {
            step_id,
            members,
            total,
            checked_in,
            pending: total - checked_in,
        }
    }
}

impl CheckIn {
    pub async fn find_by_step_and_member(
        step_id: StepId,
        member_id: MemberId,
        pool: &PgPool,
    ) -> StoreResult<Option<Self>> {
        let check_in = sqlx::query_as::<_, Self>(
            "SELECT * FROM check_ins WHERE step_id = $1 AND member_id = $2",
        )
        .bind(step_id)
        .bind(member_id)
        .fetch_optional(pool)
        .await?;
        Ok(check_in)
    }

    pub async fn find_by_step(step_id: StepId, pool: &PgPool) -> StoreResult<Vec<Self>> {
        let check_ins = sqlx::query_as::<_, Self>(
            "SELECT * FROM check_ins WHERE step_id = $1 ORDER BY checked_in_at DESC",
        )
        .bind(step_id)
        .fetch_all(pool)
        .await?;
        Ok(check_ins)
    }

    /// Most recent first, with the attendee's display data
    pub async fn find_entries_by_step(
        step_id: StepId,
        pool: &PgPool,
    ) -> StoreResult<Vec<CheckInEntry>> {
        let entries = sqlx::query_as::<_, CheckInEntry>(
            "SELECT c.*, m.user_id, u.first_name, u.last_name, u.phone, u.avatar_url
             FROM check_ins c
             JOIN event_members m ON m.id = c.member_id
             JOIN users u ON u.id = m.user_id
             WHERE c.step_id = $1
             ORDER BY c.checked_in_at DESC",
        )
        .bind(step_id)
        .fetch_all(pool)
        .await?;
        Ok(entries)
    }

    pub async fn insert(
        step_id: StepId,
        member_id: MemberId,
        checked_by: UserId,
        pool: &PgPool,
    ) -> StoreResult<Self> {
        let check_in = sqlx::query_as::<_, Self>(
            "INSERT INTO check_ins (id, step_id, member_id, checked_by)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(CheckInId::new())
        .bind(step_id)
        .bind(member_id)
        .bind(checked_by)
        .fetch_one(pool)
        .await?;
        Ok(check_in)
    }
}
