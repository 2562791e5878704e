//! Notifications domain - step reminders and the user's notification log

pub mod actions;
pub mod models;
pub mod sweep;

pub use models::Notification;
pub use sweep::{NotificationSweep, SweepReport};
