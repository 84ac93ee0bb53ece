//! Object storage for document attachments.
//!
//! Blobs are addressed by path; the public download URL is the configured
//! base URL joined with the path.

use opendal::services::{Fs, Memory, S3};
use opendal::{ErrorKind, Operator};
use thiserror::Error;

use crate::metrics::record_blob_operation;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("Invalid storage configuration: {0}")]
    Config(String),

    #[error("Failed to write blob '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: opendal::Error,
    },

    #[error("Failed to delete blob '{path}': {source}")]
    Delete {
        path: String,
        #[source]
        source: opendal::Error,
    },

    #[error("Failed to read blob '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: opendal::Error,
    },
}

/// Which object storage service backs the operator.
#[derive(Debug, Clone)]
pub enum BlobConfig {
    Memory,
    Fs {
        root: String,
    },
    S3 {
        endpoint: String,
        bucket: String,
        region: String,
        access_key_id: String,
        secret_access_key: String,
    },
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub path: String,
    pub url: String,
    pub size: u64,
}

#[derive(Clone)]
pub struct BlobStorage {
    operator: Operator,
    public_base_url: String,
}

impl BlobStorage {
    pub fn new(operator: Operator, public_base_url: impl Into<String>) -> Self {
        Self {
            operator,
            public_base_url: public_base_url.into(),
        }
    }

    /// Builds the operator for `config`.
    pub fn from_config(config: &BlobConfig, public_base_url: &str) -> Result<Self, BlobError> {
        let operator = match config {
            BlobConfig::Memory => Operator::new(Memory::default()).map(|b| b.finish()),
            BlobConfig::Fs { root } => Operator::new(Fs::default().root(root)).map(|b| b.finish()),
            BlobConfig::S3 {
                endpoint,
                bucket,
                region,
                access_key_id,
                secret_access_key,
            } => Operator::new(
                S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .region(region)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key),
            )
            .map(|b| b.finish()),
        }
        .map_err(|e| BlobError::Config(e.to_string()))?;

        Ok(Self::new(operator, public_base_url))
    }

    /// In-memory storage for tests.
    pub fn in_memory(public_base_url: &str) -> Result<Self, BlobError> {
        Self::from_config(&BlobConfig::Memory, public_base_url)
    }

    /// Public download URL for `path`.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<StoredBlob, BlobError> {
        let size = bytes.len() as u64;
        match self.operator.write(path, bytes).await {
            Ok(_) => {
                record_blob_operation("write", "ok");
                Ok(StoredBlob {
                    path: path.to_string(),
                    url: self.url_for(path),
                    size,
                })
            }
            Err(source) => {
                record_blob_operation("write", "error");
                Err(BlobError::Write {
                    path: path.to_string(),
                    source,
                })
            }
        }
    }

    pub async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, BlobError> {
        match self.operator.read(path).await {
            Ok(buffer) => Ok(Some(buffer.to_vec())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(BlobError::Read {
                path: path.to_string(),
                source,
            }),
        }
    }

    pub async fn exists(&self, path: &str) -> Result<bool, BlobError> {
        match self.operator.stat(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(BlobError::Read {
                path: path.to_string(),
                source,
            }),
        }
    }

    /// Deletes a blob. An absent blob is not an error; returns whether it
    /// was present.
    pub async fn delete(&self, path: &str) -> Result<bool, BlobError> {
        if !self.exists(path).await? {
            record_blob_operation("delete", "absent");
            tracing::debug!(path = %path, "Blob already absent");
            return Ok(false);
        }

        match self.operator.delete(path).await {
            Ok(()) => {
                record_blob_operation("delete", "ok");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => {
                record_blob_operation("delete", "error");
                Err(BlobError::Delete {
                    path: path.to_string(),
                    source,
                })
            }
        }
    }

    /// Deletes a blob, logging instead of failing.
    pub async fn delete_best_effort(&self, path: &str) {
        if let Err(e) = self.delete(path).await {
            tracing::warn!(path = %path, error = %e, "Failed to delete blob; leaving it in place");
        }
    }
}
