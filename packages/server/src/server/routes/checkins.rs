use axum::{extract::Extension, http::StatusCode, Json};
use serde::Deserialize;

use crate::common::{MemberId, StepId};
use crate::domains::checkins::actions::{self, ScanResult};
use crate::domains::checkins::models::{CheckIn, CheckInEntry, StepStatus};
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::{ValidJson, ValidPath};
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CheckInInput {
    pub member_id: MemberId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScanInput {
    pub qr_data: String,
}

pub async fn check_in(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath(step_id): ValidPath<StepId>,
    ValidJson(input): ValidJson<CheckInInput>,
) -> ApiResult<(StatusCode, Json<CheckIn>)> {
    let check_in = actions::check_in(step_id, input.member_id, auth.user_id, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(check_in)))
}

pub async fn scan_qr_code(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath(step_id): ValidPath<StepId>,
    ValidJson(input): ValidJson<ScanInput>,
) -> ApiResult<(StatusCode, Json<ScanResult>)> {
    let result = actions::scan_qr_code(step_id, &input.qr_data, auth.user_id, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn get_check_ins(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath(step_id): ValidPath<StepId>,
) -> ApiResult<Json<Vec<CheckInEntry>>> {
    Ok(Json(
        actions::get_check_ins(step_id, auth.user_id, &state.deps).await?,
    ))
}

pub async fn get_status(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath(step_id): ValidPath<StepId>,
) -> ApiResult<Json<StepStatus>> {
    Ok(Json(
        actions::get_status(step_id, auth.user_id, &state.deps).await?,
    ))
}
