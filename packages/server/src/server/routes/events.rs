use axum::{extract::Extension, http::StatusCode, Json};

use crate::common::EventId;
use crate::domains::events::actions::{self, CreateEventInput};
use crate::domains::events::models::Event;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::{ValidJson, ValidPath};
use crate::server::middleware::AuthUser;

pub async fn create_event(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidJson(input): ValidJson<CreateEventInput>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    let event = actions::create_event(input, auth.user_id, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn list_events(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<Event>>> {
    Ok(Json(actions::list_events(auth.user_id, &state.deps).await?))
}

pub async fn get_event(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath(event_id): ValidPath<EventId>,
) -> ApiResult<Json<Event>> {
    Ok(Json(actions::get_event(event_id, auth.user_id, &state.deps).await?))
}

pub async fn delete_event(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath(event_id): ValidPath<EventId>,
) -> ApiResult<StatusCode> {
    actions::delete_event(event_id, auth.user_id, &state.deps).await?;
    Ok(StatusCode::NO_CONTENT)
}
