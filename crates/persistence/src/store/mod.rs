//! Document store abstraction.
//!
//! Collections hold schemaless JSON documents keyed by a string id. Stores
//! support equality filters, a single order-by field and a limit; nothing
//! richer is needed by the entity services.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;

use crate::error::StoreError;

pub mod firestore;
pub mod google_auth;
pub mod memory;
pub mod postgres;

pub use firestore::{FirestoreConfig, FirestoreDocumentStore};
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Path of a collection: either a root collection or a subcollection
/// below a document (`electionCandidates/<id>/voters`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

impl CollectionPath {
    pub fn root(name: &str) -> Self {
        Self(name.trim_matches('/').to_string())
    }

    /// Subcollection `name` under document `id` of this collection.
    pub fn child(&self, id: &str, name: &str) -> Self {
        Self(format!("{}/{}/{}", self.0, id, name.trim_matches('/')))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of one document in this collection.
    pub fn document(&self, id: &str) -> String {
        format!("{}/{}", self.0, id)
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// Equality filter on a top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Query over one collection. An empty query returns every document in
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    pub filters: Vec<FieldFilter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl DocumentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(FieldFilter {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when a filter and an ordering on a different field are combined.
    /// Firestore needs a composite index for such queries.
    pub fn is_composite(&self) -> bool {
        match &self.order_by {
            Some(order) => self.filters.iter().any(|f| f.field != order.field),
            None => self.filters.len() > 1,
        }
    }
}

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Map<String, Value>,
}

impl Document {
    /// The document body with its id merged in under `id`.
    pub fn into_value(self) -> Value {
        let mut data = self.data;
        data.insert("id".to_string(), Value::String(self.id));
        Value::Object(data)
    }
}

/// A document database.
///
/// Writes replace or merge top-level fields only; nested objects are
/// stored as opaque values.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs and metrics.
    fn backend(&self) -> &'static str;

    async fn list(
        &self,
        collection: &CollectionPath,
        query: &DocumentQuery,
    ) -> Result<Vec<Document>, StoreError>;

    async fn get(&self, collection: &CollectionPath, id: &str)
        -> Result<Option<Document>, StoreError>;

    /// Creates a document. A missing `id` is generated by the store.
    /// Fails if a document with the given id exists.
    async fn insert(
        &self,
        collection: &CollectionPath,
        id: Option<&str>,
        data: Map<String, Value>,
    ) -> Result<Document, StoreError>;

    /// Creates or fully replaces a document.
    async fn set(
        &self,
        collection: &CollectionPath,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Document, StoreError>;

    /// Merges `fields` into an existing document. `NotFound` if absent.
    async fn patch(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Document, StoreError>;

    /// Deletes a document, returning whether it existed.
    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<bool, StoreError>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Generates a 20 character document id.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..20].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subcollection_path() {
        let candidates = CollectionPath::root("electionCandidates");
        let voters = candidates.child("cand-1", "voters");
        assert_eq!(voters.as_str(), "electionCandidates/cand-1/voters");
        assert_eq!(voters.document("v1"), "electionCandidates/cand-1/voters/v1");
    }

    #[test]
    fn test_query_builder() {
        let query = DocumentQuery::new()
            .where_eq("active", true)
            .order_by("updated_at", Direction::Descending)
            .limit(1);

        assert_eq!(query.filters[0].value, json!(true));
        assert_eq!(query.limit, Some(1));
        assert!(query.is_composite());
        assert!(!DocumentQuery::new().where_eq("status", "active").is_composite());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = generate_id();
        let b = generate_id();
        assert_eq!(a.len(), 20);
        assert_ne!(a, b);
    }

    #[test]
    fn test_document_into_value_merges_id() {
        let mut data = Map::new();
        data.insert("title".to_string(), json!("Relief"));
        let value = Document {
            id: "abc".to_string(),
            data,
        }
        .into_value();
        assert_eq!(value, json!({ "id": "abc", "title": "Relief" }));
    }
}
