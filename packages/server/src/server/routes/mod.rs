// HTTP routes
pub mod checkins;
pub mod events;
pub mod health;
pub mod invitations;
pub mod join_requests;
pub mod members;
pub mod notifications;
pub mod steps;
pub mod stream;
