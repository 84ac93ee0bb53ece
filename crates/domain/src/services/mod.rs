//! Pure domain services.

pub mod dashboard;
pub mod listing;
pub mod recommendation;
