//! HTTP mapping for domain errors.
//!
//! Every failure leaves the server as `{"error": "..."}`. Conflicts and
//! invariant violations are reported as 400 like validation errors;
//! unexpected failures are logged and redacted to a generic 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::common::{DomainError, ErrorKind};

/// Convenient result alias for handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "authentication required")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub(crate) fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation | ErrorKind::Conflict | ErrorKind::Invariant => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let status = status_for(err.kind());
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %err, "request failed");
            return Self::new(status, "internal server error");
        }
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::StoreError;

    #[test]
    fn last_organizer_is_a_bad_request_with_its_message() {
        let err = ApiError::from(DomainError::LastOrganizer);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "cannot remove the last organizer of an event");
    }

    #[test]
    fn not_found_and_forbidden_keep_their_codes() {
        assert_eq!(
            ApiError::from(DomainError::NotFound("step")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(DomainError::Forbidden("nope".into())).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(DomainError::Unauthenticated).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn internal_errors_are_redacted() {
        let err = ApiError::from(DomainError::Store(StoreError::Database(
            sqlx::Error::PoolTimedOut,
        )));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "internal server error");
    }
}
