//! Generic repository over one collection.
//!
//! Records are stored as flat JSON documents. The repository owns the
//! `created_at` / `updated_at` fields: both are written as RFC 3339 strings
//! with microsecond precision, so lexical order equals time order on every
//! backend.

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::StoreError;
use crate::store::{CollectionPath, Document, DocumentQuery, DocumentStore};

pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";

pub struct CollectionRepository<T> {
    store: Arc<dyn DocumentStore>,
    path: CollectionPath,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for CollectionRepository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            path: self.path.clone(),
            _record: PhantomData,
        }
    }
}

/// Serializes `body` into top-level document fields.
pub fn to_fields<S: Serialize>(path: &CollectionPath, body: &S) -> Result<Map<String, Value>, StoreError> {
    match serde_json::to_value(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::invalid_data(
            path.as_str(),
            format!("expected an object, got {}", other),
        )),
        Err(e) => Err(StoreError::invalid_data(path.as_str(), e)),
    }
}

fn timestamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Micros, true))
}

fn stored_time(data: &Map<String, Value>, field: &str) -> Option<DateTime<Utc>> {
    data.get(field)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

/// Next `updated_at` for a record last updated at `previous`; always later.
fn next_update_time(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now().trunc_subsecs(6);
    match previous {
        Some(prev) if now <= prev => prev + Duration::microseconds(1),
        _ => now,
    }
}

impl<T: DeserializeOwned> CollectionRepository<T> {
    pub fn new(store: Arc<dyn DocumentStore>, path: CollectionPath) -> Self {
        Self {
            store,
            path,
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &CollectionPath {
        &self.path
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    fn decode(&self, doc: Document) -> Result<T, StoreError> {
        let id = doc.id.clone();
        serde_json::from_value(doc.into_value()).map_err(|e| {
            StoreError::invalid_data(self.path.as_str(), format!("document '{}': {}", id, e))
        })
    }

    pub async fn list(&self, query: &DocumentQuery) -> Result<Vec<T>, StoreError> {
        self.store
            .list(&self.path, query)
            .await?
            .into_iter()
            .map(|doc| self.decode(doc))
            .collect()
    }

    pub async fn all(&self) -> Result<Vec<T>, StoreError> {
        self.list(&DocumentQuery::new()).await
    }

    pub async fn find(&self, id: &str) -> Result<Option<T>, StoreError> {
        match self.store.get(&self.path, id).await? {
            Some(doc) => self.decode(doc).map(Some),
            None => Ok(None),
        }
    }

    /// Loads a record, failing with `NotFound` when it is absent.
    pub async fn require(&self, id: &str) -> Result<T, StoreError> {
        self.find(id)
            .await?
            .ok_or_else(|| StoreError::not_found(self.path.as_str(), id))
    }

    /// Creates a record. Pass `id` to use a pre-allocated id.
    pub async fn create<S: Serialize>(&self, id: Option<&str>, body: &S) -> Result<T, StoreError> {
        let mut data = to_fields(&self.path, body)?;
        data.remove("id");
        let now = timestamp(Utc::now());
        data.insert(CREATED_AT.to_string(), now.clone());
        data.insert(UPDATED_AT.to_string(), now);

        let doc = self.store.insert(&self.path, id, data).await?;
        self.decode(doc)
    }

    /// Creates or replaces a record, keeping the original `created_at`.
    pub async fn set<S: Serialize>(&self, id: &str, body: &S) -> Result<T, StoreError> {
        let mut data = to_fields(&self.path, body)?;
        data.remove("id");

        let existing = self.store.get(&self.path, id).await?;
        let previous = existing.as_ref().and_then(|d| stored_time(&d.data, UPDATED_AT));
        let updated = next_update_time(previous);
        let created = existing
            .as_ref()
            .and_then(|d| d.data.get(CREATED_AT).cloned())
            .unwrap_or_else(|| timestamp(updated));

        data.insert(CREATED_AT.to_string(), created);
        data.insert(UPDATED_AT.to_string(), timestamp(updated));

        let doc = self.store.set(&self.path, id, data).await?;
        self.decode(doc)
    }

    /// Merges `fields` into a record and advances `updated_at`.
    ///
    /// A `null` value clears the field.
    pub async fn update(&self, id: &str, mut fields: Map<String, Value>) -> Result<T, StoreError> {
        let existing = self
            .store
            .get(&self.path, id)
            .await?
            .ok_or_else(|| StoreError::not_found(self.path.as_str(), id))?;

        fields.remove("id");
        fields.remove(CREATED_AT);
        let updated = next_update_time(stored_time(&existing.data, UPDATED_AT));
        fields.insert(UPDATED_AT.to_string(), timestamp(updated));

        let doc = self.store.patch(&self.path, id, fields).await?;
        self.decode(doc)
    }

    /// Deletes a record, failing with `NotFound` when it is absent.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        if self.store.delete(&self.path, id).await? {
            Ok(())
        } else {
            Err(StoreError::not_found(self.path.as_str(), id))
        }
    }
}
