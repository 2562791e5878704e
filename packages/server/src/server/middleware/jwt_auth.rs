use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::common::UserId;
use crate::domains::identity::JwtService;
use crate::server::error::ApiError;

/// Authenticated caller, taken from a verified bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: UserId,
    pub phone_number: String,
}

/// JWT authentication middleware
///
/// Verifies the bearer token if one is present and stores `AuthUser` in the
/// request extensions. Requests without a valid token continue anonymously;
/// handlers that need a caller extract `AuthUser` and answer 401 otherwise.
pub async fn jwt_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    match extract_auth_user(&request, &jwt_service) {
        Some(user) => {
            debug!(user_id = %user.user_id, "authenticated request");
            request.extensions_mut().insert(user);
        }
        None => debug!("no valid authentication token"),
    }

    next.run(request).await
}

/// Extract and verify the JWT from the Authorization header
fn extract_auth_user(
    request: &axum::http::Request<axum::body::Body>,
    jwt_service: &JwtService,
) -> Option<AuthUser> {
    let auth_str = request.headers().get("authorization")?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str);
    let claims = jwt_service.verify_token(token).ok()?;

    Some(AuthUser {
        user_id: claims.user_id,
        phone_number: claims.phone_number,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(ApiError::unauthorized)
    }
}
