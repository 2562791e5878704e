//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod postgres_store;
pub mod scheduled_tasks;
pub mod sse;
pub mod stream_hub;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use postgres_store::PostgresStore;
pub use stream_hub::StreamHub;
pub use test_dependencies::{InMemoryStore, TestDependencies};
pub use traits::*;
