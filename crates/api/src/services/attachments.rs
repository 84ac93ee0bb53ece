//! Generic entity service: documents in one collection, each owning at
//! most one blob.

use domain::models::attachment::{blob_path, Attached, StoredFile};
use persistence::repositories::{to_fields, CollectionRepository};
use persistence::store::generate_id;
use persistence::{BlobStorage, CollectionPath, DocumentQuery, DocumentStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared::crypto::sha256_hex;
use std::sync::Arc;
use tracing::{info, warn};

use super::{OperationContext, ServiceError};
use crate::middleware::metrics::{record_entity_change, record_upload};

/// A file received with a create or update request.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Falls back to a type guessed from the file name when the client sent
    /// none or a generic one.
    pub fn new(file_name: &str, content_type: Option<&str>, bytes: Vec<u8>) -> Self {
        let content_type = content_type
            .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream")
            .map(str::to_string)
            .unwrap_or_else(|| {
                mime_guess::from_path(file_name)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            });

        Self {
            file_name: file_name.to_string(),
            content_type,
            bytes,
        }
    }
}

/// Static description of an entity kind.
#[derive(Debug, Clone, Copy)]
pub struct EntityKind {
    /// Singular name used in logs, metrics and error messages.
    pub name: &'static str,
    pub collection: &'static str,
    /// Document field holding the [`StoredFile`]; `None` if files are not
    /// accepted.
    pub attachment_field: Option<&'static str>,
}

pub struct EntityService<T> {
    repo: CollectionRepository<T>,
    blobs: BlobStorage,
    kind: EntityKind,
}

impl<T> Clone for EntityService<T> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            blobs: self.blobs.clone(),
            kind: self.kind,
        }
    }
}

impl<T: DeserializeOwned + Attached> EntityService<T> {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: BlobStorage, kind: EntityKind) -> Self {
        Self {
            repo: CollectionRepository::new(store, CollectionPath::root(kind.collection)),
            blobs,
            kind,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn repository(&self) -> &CollectionRepository<T> {
        &self.repo
    }

    pub async fn list(&self, query: &DocumentQuery) -> Result<Vec<T>, ServiceError> {
        self.repo
            .list(query)
            .await
            .context(format!("fetch {}", self.kind.collection))
    }

    pub async fn get(&self, id: &str) -> Result<T, ServiceError> {
        self.repo
            .require(id)
            .await
            .context(format!("fetch {} '{}'", self.kind.name, id))
    }

    fn attachment_field(&self) -> Result<&'static str, ServiceError> {
        self.kind.attachment_field.ok_or_else(|| {
            ServiceError::Invalid(format!("A {} does not take a file", self.kind.name))
        })
    }

    async fn upload(&self, id: &str, upload: Upload) -> Result<StoredFile, ServiceError> {
        let upload_key = generate_id();
        let path = blob_path(self.kind.collection, id, &upload_key[..8], &upload.file_name);
        let sha256 = sha256_hex(&upload.bytes);
        let size = upload.bytes.len();

        let blob = self
            .blobs
            .put(&path, upload.bytes)
            .await
            .context(format!("upload file for {} '{}'", self.kind.name, id))?;
        record_upload(self.kind.name, size);

        Ok(StoredFile {
            path: blob.path,
            url: blob.url,
            content_type: upload.content_type,
            size: blob.size,
            sha256,
        })
    }

    fn file_value(stored: &StoredFile) -> Result<Value, ServiceError> {
        serde_json::to_value(stored).map_err(|e| ServiceError::Invalid(e.to_string()))
    }

    /// Stores `input` as a new document under a fresh id, uploading `file`
    /// first so the document can carry its URL.
    pub async fn add<S: Serialize>(&self, input: &S, file: Option<Upload>) -> Result<T, ServiceError> {
        let operation = format!("add {}", self.kind.name);
        let id = generate_id();
        let mut fields = to_fields(self.repo.path(), input).context(operation.as_str())?;

        let stored = match file {
            Some(upload) => {
                let field = self.attachment_field()?;
                let stored = self.upload(&id, upload).await?;
                fields.insert(field.to_string(), Self::file_value(&stored)?);
                Some(stored)
            }
            None => None,
        };

        match self.repo.create(Some(&id), &fields).await {
            Ok(record) => {
                info!(entity = self.kind.name, id = %id, with_file = stored.is_some(), "Record created");
                record_entity_change(self.kind.name, "create");
                Ok(record)
            }
            Err(e) => {
                if let Some(stored) = stored {
                    warn!(entity = self.kind.name, path = %stored.path, "File orphaned by failed document write");
                }
                Err::<T, _>(e).context(operation)
            }
        }
    }

    /// Applies the non-empty fields of `patch`.
    ///
    /// A new `file` replaces the current one; `remove_file` drops it. The
    /// superseded blob is deleted best-effort once the document is updated.
    pub async fn update<S: Serialize>(
        &self,
        id: &str,
        patch: &S,
        file: Option<Upload>,
        remove_file: bool,
    ) -> Result<T, ServiceError> {
        let operation = format!("update {} '{}'", self.kind.name, id);
        let existing = self.repo.require(id).await.context(operation.as_str())?;
        let previous = existing.attachment().map(|f| f.path.clone());
        let mut fields = to_fields(self.repo.path(), patch).context(operation.as_str())?;

        let mut uploaded = None;
        let mut superseded = None;
        if let Some(upload) = file {
            let field = self.attachment_field()?;
            let stored = self.upload(id, upload).await?;
            fields.insert(field.to_string(), Self::file_value(&stored)?);
            superseded = previous.filter(|p| *p != stored.path);
            uploaded = Some(stored);
        } else if remove_file {
            let field = self.attachment_field()?;
            fields.insert(field.to_string(), Value::Null);
            superseded = previous;
        }

        let record = match self.repo.update(id, fields).await {
            Ok(record) => record,
            Err(e) => {
                if let Some(stored) = uploaded {
                    warn!(entity = self.kind.name, path = %stored.path, "File orphaned by failed document write");
                }
                return Err::<T, _>(e).context(operation);
            }
        };

        if let Some(path) = superseded {
            self.blobs.delete_best_effort(&path).await;
        }

        info!(entity = self.kind.name, id = %id, "Record updated");
        record_entity_change(self.kind.name, "update");
        Ok(record)
    }

    /// Deletes the owned blob and then the document. A blob that is
    /// already gone does not block the delete; any other storage failure
    /// leaves the document in place.
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let operation = format!("delete {} '{}'", self.kind.name, id);
        let existing = self.repo.require(id).await.context(operation.as_str())?;

        if let Some(file) = existing.attachment() {
            self.blobs.delete(&file.path).await.context(operation.as_str())?;
        }

        self.repo.delete(id).await.context(operation)?;
        info!(entity = self.kind.name, id = %id, "Record deleted");
        record_entity_change(self.kind.name, "delete");
        Ok(())
    }
}
