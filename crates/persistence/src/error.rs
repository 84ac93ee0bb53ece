//! Document store errors.
//!
//! Backends report failures as free-form messages; [`classify_backend_message`]
//! sorts them into the cases callers need to tell apart.

use thiserror::Error;

lazy_static::lazy_static! {
    static ref URL_REGEX: regex::Regex = regex::Regex::new(r#"https://[^\s"'<>\\]+"#).unwrap();
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Permission denied on '{path}': {message}")]
    PermissionDenied { path: String, message: String },

    #[error("Query on '{path}' requires an index: {message}")]
    MissingIndex {
        path: String,
        message: String,
        create_url: Option<String>,
    },

    #[error("Document '{id}' not found in '{path}'")]
    NotFound { path: String, id: String },

    #[error("Invalid document data in '{path}': {message}")]
    InvalidData { path: String, message: String },

    #[error("Document store error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(path: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            path: path.into(),
            id: id.into(),
        }
    }

    pub fn invalid_data(path: impl Into<String>, message: impl ToString) -> Self {
        StoreError::InvalidData {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Short label used as a metrics dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::PermissionDenied { .. } => "permission_denied",
            StoreError::MissingIndex { .. } => "missing_index",
            StoreError::NotFound { .. } => "not_found",
            StoreError::InvalidData { .. } => "invalid_data",
            StoreError::Backend(_) => "backend",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Turns a raw backend error message into a [`StoreError`].
pub fn classify_backend_message(path: &str, message: &str) -> StoreError {
    let lower = message.to_lowercase();

    if message.contains("PERMISSION_DENIED")
        || lower.contains("permission denied")
        || lower.contains("insufficient permissions")
        || lower.contains("missing or insufficient permissions")
    {
        return StoreError::PermissionDenied {
            path: path.to_string(),
            message: message.to_string(),
        };
    }

    if lower.contains("requires an index") {
        return StoreError::MissingIndex {
            path: path.to_string(),
            message: message.to_string(),
            create_url: extract_url(message),
        };
    }

    StoreError::Backend(message.to_string())
}

/// First `https://` URL in `message`, if any.
pub fn extract_url(message: &str) -> Option<String> {
    URL_REGEX
        .find(message)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ')']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_variants() {
        for message in [
            "7 PERMISSION_DENIED: Missing or insufficient permissions.",
            "permission denied for table documents",
            "Insufficient permissions to read",
        ] {
            let err = classify_backend_message("payments", message);
            assert!(
                matches!(&err, StoreError::PermissionDenied { path, .. } if path == "payments"),
                "{} classified as {:?}",
                message,
                err
            );
        }
    }

    #[test]
    fn test_missing_index_extracts_link() {
        let message = "9 FAILED_PRECONDITION: The query requires an index. You can create it here: \
                       https://console.firebase.google.com/v1/r/project/bpjp/firestore/indexes?create_composite=abc123.";
        match classify_backend_message("notices", message) {
            StoreError::MissingIndex { create_url, .. } => assert_eq!(
                create_url.as_deref(),
                Some("https://console.firebase.google.com/v1/r/project/bpjp/firestore/indexes?create_composite=abc123")
            ),
            other => panic!("expected missing index, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_index_without_link() {
        let err = classify_backend_message("notices", "The query requires an index");
        assert!(matches!(err, StoreError::MissingIndex { create_url: None, .. }));
    }

    #[test]
    fn test_other_messages_are_backend_errors() {
        let err = classify_backend_message("events", "deadline exceeded");
        assert!(matches!(err, StoreError::Backend(ref m) if m == "deadline exceeded"));
        assert_eq!(err.kind(), "backend");
    }

    #[test]
    fn test_display_names_path() {
        let err = StoreError::not_found("campaigns", "abc");
        assert_eq!(err.to_string(), "Document 'abc' not found in 'campaigns'");
        assert!(err.is_not_found());
    }
}
