use axum::{extract::Extension, http::StatusCode, Json};

use crate::common::{EventId, StepId};
use crate::domains::events::actions::{self, CreateStepInput, UpdateStepInput};
use crate::domains::events::models::EventStep;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::{ValidJson, ValidPath};
use crate::server::middleware::AuthUser;

pub async fn list_steps(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath(event_id): ValidPath<EventId>,
) -> ApiResult<Json<Vec<EventStep>>> {
    Ok(Json(actions::list_steps(event_id, auth.user_id, &state.deps).await?))
}

pub async fn create_step(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath(event_id): ValidPath<EventId>,
    ValidJson(input): ValidJson<CreateStepInput>,
) -> ApiResult<(StatusCode, Json<EventStep>)> {
    let step = actions::create_step(event_id, input, auth.user_id, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(step)))
}

pub async fn update_step(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath(step_id): ValidPath<StepId>,
    ValidJson(input): ValidJson<UpdateStepInput>,
) -> ApiResult<Json<EventStep>> {
    Ok(Json(
        actions::update_step(step_id, input, auth.user_id, &state.deps).await?,
    ))
}

pub async fn delete_step(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath(step_id): ValidPath<StepId>,
) -> ApiResult<StatusCode> {
    actions::delete_step(step_id, auth.user_id, &state.deps).await?;
    Ok(StatusCode::NO_CONTENT)
}
