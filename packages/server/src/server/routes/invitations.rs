use axum::{extract::Extension, http::StatusCode, Json};
use serde::Deserialize;

use crate::common::{EventId, MemberId};
use crate::domains::membership::actions::{self, PendingInvitation};
use crate::domains::membership::models::EventMember;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::{ValidJson, ValidPath};
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InviteInput {
    pub phone: String,
}

pub async fn invite(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath(event_id): ValidPath<EventId>,
    ValidJson(input): ValidJson<InviteInput>,
) -> ApiResult<(StatusCode, Json<EventMember>)> {
    let member = actions::invite(event_id, auth.user_id, &input.phone, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn list_invitations(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<PendingInvitation>>> {
    Ok(Json(
        actions::list_invitations(auth.user_id, &state.deps).await?,
    ))
}

pub async fn accept_invitation(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath(member_id): ValidPath<MemberId>,
) -> ApiResult<Json<EventMember>> {
    Ok(Json(
        actions::accept_invitation(member_id, auth.user_id, &state.deps).await?,
    ))
}

pub async fn decline_invitation(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath(member_id): ValidPath<MemberId>,
) -> ApiResult<StatusCode> {
    actions::decline_invitation(member_id, auth.user_id, &state.deps).await?;
    Ok(StatusCode::NO_CONTENT)
}
