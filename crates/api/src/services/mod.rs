//! Entity services and external integrations.
//!
//! Each entity module follows the same contract: list with an optional
//! filter, add with an optional file, patch with file replacement or
//! removal, delete together with the owned blob.

pub mod attachments;
pub mod boards;
pub mod campaigns;
pub mod candidates;
pub mod events;
pub mod expenses;
pub mod identity;
pub mod mission;
pub mod notices;
pub mod payments;
pub mod recommendation;

use persistence::{BlobError, StoreError};
use thiserror::Error;

pub use attachments::{EntityService, Upload};

/// Failure of a service operation, tagged with what was being attempted.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Failed to {operation}: {source}")]
    Store {
        operation: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to {operation}: {source}")]
    Blob {
        operation: String,
        #[source]
        source: BlobError,
    },

    #[error("Invalid input: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0}")]
    Invalid(String),

    #[error("Upstream service failed: {0}")]
    Upstream(String),
}

impl ServiceError {
    /// The store failure behind this error, if any.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            ServiceError::Store { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Attaches the attempted operation to a persistence error.
pub trait OperationContext<T> {
    fn context(self, operation: impl Into<String>) -> Result<T, ServiceError>;
}

impl<T> OperationContext<T> for Result<T, StoreError> {
    fn context(self, operation: impl Into<String>) -> Result<T, ServiceError> {
        self.map_err(|source| ServiceError::Store {
            operation: operation.into(),
            source,
        })
    }
}

impl<T> OperationContext<T> for Result<T, BlobError> {
    fn context(self, operation: impl Into<String>) -> Result<T, ServiceError> {
        self.map_err(|source| ServiceError::Blob {
            operation: operation.into(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_prefixes_operation() {
        let result: Result<(), StoreError> = Err(StoreError::not_found("notices", "n1"));
        let err = result.context("update notice 'n1'").unwrap_err();

        assert!(err.to_string().starts_with("Failed to update notice 'n1'"));
        assert!(err.store_error().unwrap().is_not_found());
    }

    #[test]
    fn test_permission_and_not_found_are_distinguishable() {
        let denied: Result<(), StoreError> = Err(StoreError::PermissionDenied {
            path: "payments".into(),
            message: "Missing or insufficient permissions.".into(),
        });
        let missing: Result<(), StoreError> = Err(StoreError::not_found("payments", "p1"));

        let denied = denied.context("fetch payments").unwrap_err();
        let missing = missing.context("fetch payment 'p1'").unwrap_err();

        assert_eq!(denied.store_error().unwrap().kind(), "permission_denied");
        assert_eq!(missing.store_error().unwrap().kind(), "not_found");
    }
}
