//! Persistence layer for the BPJP backend.
//!
//! This crate contains:
//! - The document store abstraction and its backends
//! - Object storage for attachments
//! - Typed collection repositories
//! - Store metrics

pub mod blob;
pub mod db;
pub mod error;
pub mod metrics;
pub mod repositories;
pub mod store;

pub use blob::{BlobConfig, BlobError, BlobStorage, StoredBlob};
pub use error::StoreError;
pub use store::{CollectionPath, Direction, Document, DocumentQuery, DocumentStore};
