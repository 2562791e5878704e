use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::common::{Actor, DomainError, EventCapability, MemberId, StepId, UserId};
use crate::domains::checkins::models::{CheckIn, CheckInEntry, StepStatus};
use crate::domains::events::models::EventStep;
use crate::kernel::ServerDeps;

/// Result of a successful QR scan
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub check_in: CheckIn,
    pub user_id: UserId,
    pub member_name: String,
}

async fn require_step(step_id: StepId, deps: &ServerDeps) -> Result<EventStep, DomainError> {
    deps.events
        .find_step(step_id)
        .await?
        .ok_or(DomainError::NotFound("step"))
}

/// Record that a member is present at a step
pub async fn check_in(
    step_id: StepId,
    member_id: MemberId,
    checked_by: UserId,
    deps: &ServerDeps,
) -> Result<CheckIn, DomainError> {
    let step = require_step(step_id, deps).await?;
    Actor::new(checked_by)
        .can(EventCapability::RecordCheckIns)
        .on(step.event_id)
        .check(deps.members.as_ref())
        .await?;

    record(&step, member_id, checked_by, deps).await
}

async fn record(
    step: &EventStep,
    member_id: MemberId,
    checked_by: UserId,
    deps: &ServerDeps,
) -> Result<CheckIn, DomainError> {
    let member = deps
        .members
        .find_member(member_id)
        .await?
        .ok_or(DomainError::NotFound("member"))?;
    if member.event_id != step.event_id {
        return Err(DomainError::EventMismatch);
    }

    if deps.check_ins.find_check_in(step.id, member_id).await?.is_some() {
        return Err(DomainError::AlreadyCheckedIn);
    }

    let check_in = deps
        .check_ins
        .insert_check_in(step.id, member_id, checked_by)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                DomainError::AlreadyCheckedIn
            } else {
                e.into()
            }
        })?;

    info!(step_id = %step.id, member_id = %member_id, checked_by = %checked_by, "checked in");
    deps.stream_hub
        .publish_to_event(
            step.event_id,
            json!({
                "type": "checked_in",
                "stepId": step.id,
                "memberId": member_id,
                "userId": member.user_id,
            }),
        )
        .await;

    Ok(check_in)
}

/// Check in the member a scanned QR payload identifies
pub async fn scan_qr_code(
    step_id: StepId,
    qr_data: &str,
    checked_by: UserId,
    deps: &ServerDeps,
) -> Result<ScanResult, DomainError> {
    let step = require_step(step_id, deps).await?;
    Actor::new(checked_by)
        .can(EventCapability::RecordCheckIns)
        .on(step.event_id)
        .check(deps.members.as_ref())
        .await?;

    let payload = deps.qr_signer.verify(qr_data)?;
    if payload.event_id != step.event_id {
        return Err(DomainError::EventMismatch);
    }

    // The payload may outlive the membership it was minted for
    let member = deps
        .members
        .find_member(payload.member_id)
        .await?
        .filter(|m| m.user_id == payload.user_id)
        .ok_or(DomainError::NotFound("member"))?;

    let check_in = record(&step, member.id, checked_by, deps).await?;

    let member_name = deps
        .identity
        .find_profile(member.user_id)
        .await?
        .map(|p| p.display_name())
        .unwrap_or_default();

    Ok(ScanResult {
        check_in,
        user_id: member.user_id,
        member_name,
    })
}

/// Check-ins for a step, most recent first
pub async fn get_check_ins(
    step_id: StepId,
    viewer_id: UserId,
    deps: &ServerDeps,
) -> Result<Vec<CheckInEntry>, DomainError> {
    let step = require_step(step_id, deps).await?;
    Actor::new(viewer_id)
        .can(EventCapability::ViewEvent)
        .on(step.event_id)
        .check(deps.members.as_ref())
        .await?;

    Ok(deps.check_ins.find_check_in_entries(step_id).await?)
}

/// Presence roster over every member of the step's event
pub async fn get_status(
    step_id: StepId,
    viewer_id: UserId,
    deps: &ServerDeps,
) -> Result<StepStatus, DomainError> {
    let step = require_step(step_id, deps).await?;
    Actor::new(viewer_id)
        .can(EventCapability::ViewEvent)
        .on(step.event_id)
        .check(deps.members.as_ref())
        .await?;

    let members = deps.members.find_member_profiles(step.event_id).await?;
    let check_ins = deps.check_ins.find_check_ins(step_id).await?;
    Ok(StepStatus::build(step_id, members, &check_ins))
}
