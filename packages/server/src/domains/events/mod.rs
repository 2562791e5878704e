//! Events domain - trips and their itinerary steps

pub mod actions;
pub mod models;

pub use models::{Event, EventStep};
