//! Application setup and router assembly.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domains::identity::JwtService;
use crate::kernel::ServerDeps;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{
    checkins, events, health, invitations, join_requests, members, notifications, steps, stream,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
    pub jwt_service: Arc<JwtService>,
    /// Only used by the health probe; absent when running on in-memory stores
    pub db_pool: Option<PgPool>,
}

impl AppState {
    pub fn new(deps: Arc<ServerDeps>, jwt_service: Arc<JwtService>, db_pool: Option<PgPool>) -> Self {
        Self {
            deps,
            jwt_service,
            db_pool,
        }
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        // No origins configured; development mode
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState, allowed_origins: &[String]) -> Router {
    let jwt_service = state.jwt_service.clone();

    Router::new()
        .route("/health", get(health::health_handler))
        // Events
        .route("/events", post(events::create_event).get(events::list_events))
        .route(
            "/events/:event_id",
            get(events::get_event).delete(events::delete_event),
        )
        // Itinerary
        .route(
            "/events/:event_id/steps",
            get(steps::list_steps).post(steps::create_step),
        )
        .route(
            "/steps/:step_id",
            put(steps::update_step).delete(steps::delete_step),
        )
        // Membership
        .route("/events/:event_id/members", get(members::list_members))
        .route("/events/:event_id/join", post(members::join_event))
        .route("/events/:event_id/leave", delete(members::leave_event))
        .route("/events/:event_id/qrcode", get(members::get_qr_code))
        .route(
            "/events/:event_id/members/:member_id",
            delete(members::remove_member),
        )
        .route(
            "/events/:event_id/members/:member_id/role",
            put(members::update_role),
        )
        .route(
            "/events/:event_id/members/:member_id/payment",
            put(members::update_payment_status),
        )
        // Invitations
        .route("/events/:event_id/invitations", post(invitations::invite))
        .route("/invitations", get(invitations::list_invitations))
        .route(
            "/invitations/:member_id/accept",
            post(invitations::accept_invitation),
        )
        .route(
            "/invitations/:member_id/decline",
            post(invitations::decline_invitation),
        )
        // Join requests
        .route(
            "/events/:event_id/requests",
            post(join_requests::request_join).get(join_requests::list_join_requests),
        )
        .route(
            "/events/:event_id/requests/:request_id/accept",
            post(join_requests::accept_join_request),
        )
        .route(
            "/events/:event_id/requests/:request_id/decline",
            post(join_requests::decline_join_request),
        )
        // Check-ins
        .route("/steps/:step_id/checkin", post(checkins::check_in))
        .route("/steps/:step_id/scan", post(checkins::scan_qr_code))
        .route("/steps/:step_id/checkins", get(checkins::get_check_ins))
        .route("/steps/:step_id/status", get(checkins::get_status))
        // Notifications
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/read-all", put(notifications::mark_all_read))
        .route("/notifications/:notification_id/read", put(notifications::mark_read))
        // Realtime relay
        .route("/api/streams/user", get(stream::user_stream))
        .route("/api/streams/events/:event_id", get(stream::event_stream))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(state))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
