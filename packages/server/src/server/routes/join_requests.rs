use axum::{extract::Extension, http::StatusCode, Json};

use crate::common::{EventId, JoinRequestId};
use crate::domains::membership::actions;
use crate::domains::membership::models::{EventMember, JoinRequest, JoinRequestWithProfile};
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::ValidPath;
use crate::server::middleware::AuthUser;

pub async fn request_join(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath(event_id): ValidPath<EventId>,
) -> ApiResult<(StatusCode, Json<JoinRequest>)> {
    let request = actions::request_join(event_id, auth.user_id, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn list_join_requests(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath(event_id): ValidPath<EventId>,
) -> ApiResult<Json<Vec<JoinRequestWithProfile>>> {
    Ok(Json(
        actions::list_join_requests(event_id, auth.user_id, &state.deps).await?,
    ))
}

pub async fn accept_join_request(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath((event_id, request_id)): ValidPath<(EventId, JoinRequestId)>,
) -> ApiResult<Json<EventMember>> {
    Ok(Json(
        actions::accept_join_request(event_id, request_id, auth.user_id, &state.deps).await?,
    ))
}

pub async fn decline_join_request(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath((event_id, request_id)): ValidPath<(EventId, JoinRequestId)>,
) -> ApiResult<Json<JoinRequest>> {
    Ok(Json(
        actions::decline_join_request(event_id, request_id, auth.user_id, &state.deps).await?,
    ))
}
