//! Shared utilities and common types for the BPJP backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Content hashing for stored attachments
//! - Password hashing with Argon2id
//! - Session token signing and validation
//! - Page slicing and text search used by list views
//! - Common validation logic

pub mod crypto;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod search;
pub mod validation;
