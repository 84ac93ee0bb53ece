//! Typed access to document collections.

pub mod collection;
pub mod collections;

pub use collection::{to_fields, CollectionRepository};
