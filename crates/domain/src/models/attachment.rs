//! Attachment metadata embedded in documents that own a blob.

use serde::{Deserialize, Serialize};

/// A file kept in object storage on behalf of a document.
///
/// `path` is the storage key used for deletion; `url` is what clients
/// render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StoredFile {
    pub path: String,
    pub url: String,
    pub content_type: String,
    pub size: u64,
    pub sha256: String,
}

/// Collection-scoped namespace for an entity's blobs.
///
/// Blobs live under `<namespace>/<document id>/<upload key>/<file name>`.
/// Each upload gets its own key, so a replacement never overwrites the blob
/// the document currently points at.
pub fn blob_path(namespace: &str, document_id: &str, upload_key: &str, file_name: &str) -> String {
    format!(
        "{}/{}/{}/{}",
        namespace.trim_matches('/'),
        document_id,
        upload_key,
        shared::crypto::sanitize_file_name(file_name)
    )
}

/// A record that may own one stored file.
pub trait Attached {
    fn attachment(&self) -> Option<&StoredFile>;
}

macro_rules! attached_via {
    ($ty:ty, $field:ident) => {
        impl Attached for $ty {
            fn attachment(&self) -> Option<&StoredFile> {
                self.$field.as_ref()
            }
        }
    };
}

attached_via!(crate::models::campaign::Campaign, image);
attached_via!(crate::models::expense::Expense, attachment);
attached_via!(crate::models::notice::Notice, image);
attached_via!(crate::models::board::BoardMember, image);
attached_via!(crate::models::election::ElectionCandidate, image);

impl Attached for crate::models::payment::PaymentTransaction {
    fn attachment(&self) -> Option<&StoredFile> {
        None
    }
}

impl Attached for crate::models::event::Event {
    fn attachment(&self) -> Option<&StoredFile> {
        None
    }
}
