// Common types and utilities shared across the application

pub mod auth;
pub mod entity_ids;
pub mod errors;
pub mod id;

pub use auth::{Actor, AuthError, EventCapability};
pub use entity_ids::*;
pub use errors::{DomainError, ErrorKind, StoreError, StoreResult};
pub use id::Id;
