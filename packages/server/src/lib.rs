// Group trip coordination - API core
//
// Events, their members and itineraries. The membership engine keeps every
// event with at least one active organizer, the check-in ledger records
// attendance per step, and a scheduled sweep sends step reminders.
//
// Domains live in domains/*/{models,actions}; infrastructure in kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
