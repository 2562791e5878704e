// Business domains
pub mod checkins;
pub mod events;
pub mod identity;
pub mod membership;
pub mod notifications;
