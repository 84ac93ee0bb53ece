//! Notice board models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::attachment::StoredFile;
use crate::services::listing::{Listable, SortValue};

/// A notice shown on the public site; `popup` notices are also shown as a
/// modal on first visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Notice {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub popup: bool,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub image: Option<StoredFile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listable for Notice {
    const SORT_FIELDS: &'static [&'static str] = &["title", "updated_at", "created_at"];

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.content]
    }

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "title" => Some(SortValue::text(&self.title)),
            "updated_at" => Some(SortValue::Time(self.updated_at)),
            "created_at" => Some(SortValue::Time(self.created_at)),
            _ => None,
        }
    }
}

/// Request payload for publishing a notice.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateNoticeRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 5000, message = "Content must be at most 5000 characters"))]
    pub content: String,

    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default)]
    pub popup: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Link must be a valid URL"))]
    pub link: Option<String>,
}

fn default_active() -> bool {
    true
}

/// Partial update for a notice.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateNoticeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 5000, message = "Content must be at most 5000 characters"))]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub popup: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Link must be a valid URL"))]
    pub link: Option<String>,

    /// Clears the current link.
    #[serde(default, skip_serializing)]
    pub remove_link: bool,

    /// Drops the current image without uploading a new one.
    #[serde(default, skip_serializing)]
    pub remove_image: bool,
}

/// Query filters for listing notices.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NoticeFilter {
    /// Only active notices, most recently updated first.
    #[serde(default)]
    pub active_only: bool,
}
