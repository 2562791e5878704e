// HTTP server setup (Axum + JSON routes)
pub mod app;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;

pub use app::*;
pub use error::{ApiError, ApiResult};
