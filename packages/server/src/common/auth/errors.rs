use thiserror::Error;

use crate::common::errors::StoreError;

/// Authorization errors for event role checks
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("You are not a member of this event")]
    NotAMember,

    #[error(transparent)]
    Store(#[from] StoreError),
}
