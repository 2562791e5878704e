//! Check-in ledger - at most one attendance record per (step, member)

pub mod actions;
pub mod models;

pub use models::{CheckIn, CheckInEntry, StepStatus};
