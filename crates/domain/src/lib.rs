//! Domain layer for the BPJP backend.
//!
//! This crate contains:
//! - Entity models (campaigns, payments, expenses, notices, events, boards,
//!   election candidates, mission content)
//! - Request and patch DTOs with their validation rules
//! - Pure services: list-view derivation, dashboard aggregation and the
//!   campaign recommendation catalogue

pub mod models;
pub mod services;
