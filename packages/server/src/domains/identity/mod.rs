//! Identity domain - the slice of the user directory the core consumes
//!
//! Users, credentials and token issuance are owned elsewhere; this module only
//! reads user records (phone lookup, display data) and verifies bearer tokens.

pub mod jwt;
pub mod models;

pub use jwt::{Claims, JwtService};
pub use models::{User, UserProfile};
