use axum::{extract::Extension, http::StatusCode, Json};
use serde::Deserialize;

use crate::common::{EventId, MemberId};
use crate::domains::membership::actions::{self, QrCodeView};
use crate::domains::membership::models::{EventMember, MemberProfile};
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::{ValidJson, ValidPath};
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRoleInput {
    pub role: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdatePaymentInput {
    pub payment_status: String,
}

pub async fn list_members(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath(event_id): ValidPath<EventId>,
) -> ApiResult<Json<Vec<MemberProfile>>> {
    Ok(Json(
        actions::list_members(event_id, auth.user_id, &state.deps).await?,
    ))
}

pub async fn join_event(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath(event_id): ValidPath<EventId>,
) -> ApiResult<Json<EventMember>> {
    Ok(Json(
        actions::join_directly(event_id, auth.user_id, &state.deps).await?,
    ))
}

pub async fn leave_event(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath(event_id): ValidPath<EventId>,
) -> ApiResult<StatusCode> {
    actions::leave(event_id, auth.user_id, &state.deps).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_qr_code(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath(event_id): ValidPath<EventId>,
) -> ApiResult<Json<QrCodeView>> {
    Ok(Json(
        actions::get_qr_code(event_id, auth.user_id, &state.deps).await?,
    ))
}

pub async fn remove_member(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath((event_id, member_id)): ValidPath<(EventId, MemberId)>,
) -> ApiResult<StatusCode> {
    actions::remove_member(event_id, member_id, auth.user_id, &state.deps).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_role(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath((event_id, member_id)): ValidPath<(EventId, MemberId)>,
    ValidJson(input): ValidJson<UpdateRoleInput>,
) -> ApiResult<Json<EventMember>> {
    let member =
        actions::update_role(event_id, member_id, &input.role, auth.user_id, &state.deps).await?;
    Ok(Json(member))
}

pub async fn update_payment_status(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath((event_id, member_id)): ValidPath<(EventId, MemberId)>,
    ValidJson(input): ValidJson<UpdatePaymentInput>,
) -> ApiResult<Json<EventMember>> {
    let member = actions::update_payment_status(
        event_id,
        member_id,
        &input.payment_status,
        auth.user_id,
        &state.deps,
    )
    .await?;
    Ok(Json(member))
}
