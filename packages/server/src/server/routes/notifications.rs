use axum::{extract::Extension, Json};
use serde_json::{json, Value};

use crate::common::NotificationId;
use crate::domains::notifications::actions;
use crate::domains::notifications::models::Notification;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::ValidPath;
use crate::server::middleware::AuthUser;

pub async fn list_notifications(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<Notification>>> {
    Ok(Json(
        actions::list_notifications(auth.user_id, &state.deps).await?,
    ))
}

pub async fn mark_read(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    ValidPath(notification_id): ValidPath<NotificationId>,
) -> ApiResult<Json<Notification>> {
    Ok(Json(
        actions::mark_read(notification_id, auth.user_id, &state.deps).await?,
    ))
}

pub async fn mark_all_read(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Value>> {
    let updated = actions::mark_all_read(auth.user_id, &state.deps).await?;
    Ok(Json(json!({ "updated": updated })))
}
