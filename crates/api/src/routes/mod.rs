//! HTTP route handlers.

pub mod auth;
pub mod boards;
pub mod campaigns;
pub mod candidates;
pub mod dashboard;
pub mod events;
pub mod expenses;
pub mod health;
pub mod mission;
pub mod notices;
pub mod payments;
pub mod recommendations;
pub mod settings;
