//! Error taxonomy shared by the membership engine, check-in ledger and
//! notification sweep.
//!
//! Domain code returns [`DomainError`]; the HTTP layer only looks at
//! [`DomainError::kind`] to pick a status code, so adding a variant never
//! requires touching the routes.

use thiserror::Error;

use crate::common::auth::AuthError;

/// Result alias for store implementations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures raised by a store implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique constraint rejected the write. Concurrent requests that both
    /// passed a pre-check end up here; callers translate it into a conflict.
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    pub fn unique(constraint: impl Into<String>) -> Self {
        Self::UniqueViolation {
            constraint: constraint.into(),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::UniqueViolation {
                    constraint: db_err.constraint().unwrap_or("unknown").to_string(),
                };
            }
        }
        Self::Database(err)
    }
}

/// Coarse classification used for status codes and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Invariant,
    Validation,
    Unauthenticated,
    Forbidden,
    Internal,
}

/// Errors surfaced by domain actions.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("user is already a member of this event")]
    AlreadyMember,

    #[error("user already has a pending invitation to this event")]
    AlreadyInvited,

    #[error("a join request for this event is already pending")]
    AlreadyPending,

    #[error("this {0} has already been processed")]
    AlreadyProcessed(&'static str),

    #[error("member has already checked in to this step")]
    AlreadyCheckedIn,

    #[error("you cannot invite yourself")]
    SelfInvite,

    #[error("cannot remove the last organizer of an event")]
    LastOrganizer,

    #[error("invalid role '{0}', expected 'organizer' or 'member'")]
    InvalidRole(String),

    #[error("invalid payment status '{0}', expected 'pending', 'paid' or 'refunded'")]
    InvalidPaymentStatus(String),

    #[error("invalid QR code: {0}")]
    InvalidPayload(String),

    #[error("QR code belongs to a different event")]
    EventMismatch,

    #[error("step time must fall within the event dates")]
    StepOutOfBounds,

    #[error("{0}")]
    Validation(String),

    #[error("authentication required")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyMember
            | Self::AlreadyInvited
            | Self::AlreadyPending
            | Self::AlreadyProcessed(_)
            | Self::AlreadyCheckedIn
            | Self::SelfInvite => ErrorKind::Conflict,
            Self::LastOrganizer => ErrorKind::Invariant,
            Self::InvalidRole(_)
            | Self::InvalidPaymentStatus(_)
            | Self::InvalidPayload(_)
            | Self::EventMismatch
            | Self::StepOutOfBounds
            | Self::Validation(_) => ErrorKind::Validation,
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Store(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationRequired | AuthError::InvalidToken => Self::Unauthenticated,
            AuthError::PermissionDenied(reason) => Self::Forbidden(reason),
            AuthError::NotAMember => Self::Forbidden(err.to_string()),
            AuthError::Store(store) => Self::Store(store),
        }
    }
}
