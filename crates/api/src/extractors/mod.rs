//! Custom Axum extractors.

pub mod payload;
pub mod session;

pub use payload::EntityPayload;
pub use session::{AdminSession, Session};
