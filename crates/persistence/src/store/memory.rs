//! Process-local document store for tests and local development.
//!
//! Can emulate two remote failure modes: collections denied by security
//! rules and composite queries lacking an index.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use super::{generate_id, CollectionPath, Direction, Document, DocumentQuery, DocumentStore};
use crate::error::{classify_backend_message, StoreError};
use crate::metrics::StoreTimer;

const BACKEND: &str = "memory";

#[derive(Default)]
pub struct MemoryDocumentStore {
    // Documents per collection, in insertion order.
    collections: RwLock<HashMap<String, Vec<Document>>>,
    denied: HashSet<String>,
    require_composite_indexes: bool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every access to `collection` (and its subcollections) with a
    /// permission error.
    pub fn deny_access(mut self, collection: &str) -> Self {
        self.denied.insert(collection.trim_matches('/').to_string());
        self
    }

    /// Fails composite queries with a missing-index error.
    pub fn require_composite_indexes(mut self) -> Self {
        self.require_composite_indexes = true;
        self
    }

    fn check_access(&self, collection: &CollectionPath) -> Result<(), StoreError> {
        let path = collection.as_str();
        let denied = self
            .denied
            .iter()
            .any(|d| path == d || path.starts_with(&format!("{}/", d)));
        if denied {
            return Err(classify_backend_message(
                path,
                "PERMISSION_DENIED: Missing or insufficient permissions.",
            ));
        }
        Ok(())
    }

    fn check_index(&self, collection: &CollectionPath, query: &DocumentQuery) -> Result<(), StoreError> {
        if self.require_composite_indexes && query.is_composite() {
            let message = format!(
                "FAILED_PRECONDITION: The query requires an index. You can create it here: \
                 https://console.local/indexes?collection={}",
                collection
            );
            return Err(classify_backend_message(collection.as_str(), &message));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn list(
        &self,
        collection: &CollectionPath,
        query: &DocumentQuery,
    ) -> Result<Vec<Document>, StoreError> {
        let timer = StoreTimer::new(BACKEND, "list");
        let result: Result<Vec<Document>, StoreError> = async {
            self.check_access(collection)?;
            self.check_index(collection, query)?;

            let collections = self.collections.read().await;
            let mut docs: Vec<Document> = collections
                .get(collection.as_str())
                .map(|docs| {
                    docs.iter()
                        .filter(|doc| {
                            query
                                .filters
                                .iter()
                                .all(|f| doc.data.get(&f.field) == Some(&f.value))
                        })
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();

            if let Some(order) = &query.order_by {
                docs.sort_by(|a, b| {
                    let ordering = compare_values(a.data.get(&order.field), b.data.get(&order.field));
                    match order.direction {
                        Direction::Ascending => ordering,
                        Direction::Descending => ordering.reverse(),
                    }
                });
            }
            if let Some(limit) = query.limit {
                docs.truncate(limit);
            }
            Ok(docs)
        }
        .await;
        timer.finish(result)
    }

    async fn get(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        self.check_access(collection)?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection.as_str())
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn insert(
        &self,
        collection: &CollectionPath,
        id: Option<&str>,
        data: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        self.check_access(collection)?;
        let id = id.map(str::to_string).unwrap_or_else(generate_id);

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.as_str().to_string()).or_default();
        if docs.iter().any(|d| d.id == id) {
            return Err(StoreError::Backend(format!(
                "ALREADY_EXISTS: Document already exists: {}",
                collection.document(&id)
            )));
        }

        let doc = Document { id, data };
        docs.push(doc.clone());
        Ok(doc)
    }

    async fn set(
        &self,
        collection: &CollectionPath,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        self.check_access(collection)?;
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.as_str().to_string()).or_default();

        let doc = Document {
            id: id.to_string(),
            data,
        };
        match docs.iter_mut().find(|d| d.id == id) {
            Some(existing) => *existing = doc.clone(),
            None => docs.push(doc.clone()),
        }
        Ok(doc)
    }

    async fn patch(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        self.check_access(collection)?;
        let mut collections = self.collections.write().await;
        let existing = collections
            .get_mut(collection.as_str())
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| StoreError::not_found(collection.as_str(), id))?;

        for (key, value) in fields {
            existing.data.insert(key, value);
        }
        Ok(existing.clone())
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<bool, StoreError> {
        self.check_access(collection)?;
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection.as_str()) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|d| d.id != id);
        Ok(docs.len() < before)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// Orders values the way a document database does: missing and null first,
// then booleans, numbers and strings.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(Value::Array(_)) => 4,
            Some(Value::Object(_)) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.total_cmp(&y)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn notices() -> CollectionPath {
        CollectionPath::root("notices")
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MemoryDocumentStore::new();
        let doc = store
            .insert(&notices(), None, body(json!({ "title": "Eid" })))
            .await
            .unwrap();

        let fetched = store.get(&notices(), &doc.id).await.unwrap().unwrap();
        assert_eq!(fetched.data["title"], "Eid");
        assert!(store.get(&notices(), "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_with_existing_id_fails() {
        let store = MemoryDocumentStore::new();
        store.insert(&notices(), Some("n1"), Map::new()).await.unwrap();
        assert!(store.insert(&notices(), Some("n1"), Map::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_list_filters_orders_and_limits() {
        let store = MemoryDocumentStore::new();
        for (id, active, rank) in [("a", true, 2), ("b", false, 3), ("c", true, 1), ("d", true, 5)] {
            store
                .insert(&notices(), Some(id), body(json!({ "active": active, "rank": rank })))
                .await
                .unwrap();
        }

        let query = DocumentQuery::new()
            .where_eq("active", true)
            .order_by("rank", Direction::Descending)
            .limit(2);
        let ids: Vec<_> = store
            .list(&notices(), &query)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["d", "a"]);

        let all = store.list(&notices(), &DocumentQuery::new()).await.unwrap();
        let ids: Vec<_> = all.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_patch_merges_fields() {
        let store = MemoryDocumentStore::new();
        store
            .insert(&notices(), Some("n1"), body(json!({ "title": "Old", "active": true })))
            .await
            .unwrap();

        let patched = store
            .patch(&notices(), "n1", body(json!({ "title": "New" })))
            .await
            .unwrap();
        assert_eq!(patched.data["title"], "New");
        assert_eq!(patched.data["active"], true);

        let missing = store.patch(&notices(), "n2", Map::new()).await;
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let store = MemoryDocumentStore::new();
        store.insert(&notices(), Some("n1"), Map::new()).await.unwrap();
        assert!(store.delete(&notices(), "n1").await.unwrap());
        assert!(!store.delete(&notices(), "n1").await.unwrap());
        assert!(!store.delete(&CollectionPath::root("empty"), "x").await.unwrap());
    }

    #[tokio::test]
    async fn test_denied_collection_and_subcollections() {
        let store = MemoryDocumentStore::new().deny_access("electionCandidates");
        let root = CollectionPath::root("electionCandidates");

        let err = store.list(&root, &DocumentQuery::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::PermissionDenied { ref path, .. } if path == "electionCandidates"));

        let voters = root.child("c1", "voters");
        assert!(matches!(
            store.get(&voters, "v1").await,
            Err(StoreError::PermissionDenied { .. })
        ));

        assert!(store.list(&notices(), &DocumentQuery::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_composite_query_needs_index() {
        let store = MemoryDocumentStore::new().require_composite_indexes();
        let query = DocumentQuery::new()
            .where_eq("active", true)
            .order_by("updated_at", Direction::Descending);

        match store.list(&notices(), &query).await {
            Err(StoreError::MissingIndex { create_url, .. }) => {
                assert_eq!(
                    create_url.as_deref(),
                    Some("https://console.local/indexes?collection=notices")
                );
            }
            other => panic!("expected missing index, got {:?}", other),
        }
    }

    #[test]
    fn test_compare_values_mixed_types() {
        assert_eq!(compare_values(None, Some(&json!(1))), Ordering::Less);
        assert_eq!(compare_values(Some(&json!(2)), Some(&json!(10))), Ordering::Less);
        assert_eq!(compare_values(Some(&json!("b")), Some(&json!("a"))), Ordering::Greater);
        assert_eq!(compare_values(Some(&json!(5)), Some(&json!("a"))), Ordering::Less);
    }
}
