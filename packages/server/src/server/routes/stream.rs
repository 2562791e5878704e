//! SSE streaming endpoints.
//!
//! GET /api/streams/user              caller's personal channel
//! GET /api/streams/events/:event_id  membership and check-in pushes
//!
//! EventSource can't send custom headers, so the JWT may also be passed as
//! `?token=`. The Authorization header wins when both are present.

use std::convert::Infallible;

use axum::{
    extract::{Extension, Query},
    response::sse::{Event, Sse},
};
use serde::Deserialize;
use tokio_stream::Stream;

use crate::common::{Actor, DomainError, EventCapability, EventId};
use crate::kernel::sse::into_sse;
use crate::kernel::stream_hub::{event_topic, user_topic};
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};
use crate::server::extract::ValidPath;
use crate::server::middleware::AuthUser;

#[derive(Deserialize)]
pub struct StreamQuery {
    token: Option<String>,
}

/// Caller from the middleware, or from `?token=` as a fallback
fn resolve_caller(
    auth: Option<AuthUser>,
    query: StreamQuery,
    state: &AppState,
) -> Result<AuthUser, ApiError> {
    if let Some(user) = auth {
        return Ok(user);
    }
    let token = query.token.ok_or_else(ApiError::unauthorized)?;
    let claims = state
        .jwt_service
        .verify_token(&token)
        .map_err(|_| ApiError::unauthorized())?;
    Ok(AuthUser {
        user_id: claims.user_id,
        phone_number: claims.phone_number,
    })
}

pub async fn user_stream(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Query(query): Query<StreamQuery>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let caller = resolve_caller(auth, query, &state)?;
    let rx = state
        .deps
        .stream_hub
        .subscribe(&user_topic(caller.user_id))
        .await;

    tracing::debug!(user_id = %caller.user_id, "user stream opened");
    Ok(into_sse(rx))
}

pub async fn event_stream(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    ValidPath(event_id): ValidPath<EventId>,
    Query(query): Query<StreamQuery>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let caller = resolve_caller(auth, query, &state)?;

    Actor::new(caller.user_id)
        .can(EventCapability::ViewEvent)
        .on(event_id)
        .check(state.deps.members.as_ref())
        .await
        .map_err(DomainError::from)?;

    let rx = state.deps.stream_hub.subscribe(&event_topic(event_id)).await;
    Ok(into_sse(rx))
}
