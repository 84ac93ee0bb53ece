//! Advisory board and executive committee members.
//!
//! Both boards hold the same kind of record in separate collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::models::attachment::StoredFile;
use crate::services::listing::{Listable, SortValue};

/// Which board a member sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Board {
    Advisory,
    Executive,
}

impl Board {
    pub fn as_str(&self) -> &'static str {
        match self {
            Board::Advisory => "advisory",
            Board::Executive => "executive",
        }
    }

    /// Human-readable name used in log lines and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Board::Advisory => "advisory board member",
            Board::Executive => "executive committee member",
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A person listed on one of the boards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BoardMember {
    pub id: String,
    pub name: String,
    pub designation: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub image: Option<StoredFile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listable for BoardMember {
    const SORT_FIELDS: &'static [&'static str] = &["name", "designation", "display_order"];

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.designation.as_str()];
        if let Some(bio) = &self.bio {
            fields.push(bio);
        }
        fields
    }

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "name" => Some(SortValue::text(&self.name)),
            "designation" => Some(SortValue::text(&self.designation)),
            "display_order" => Some(SortValue::Number(f64::from(self.display_order))),
            _ => None,
        }
    }
}

/// Request payload for adding a board member.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateBoardMemberRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "Designation must be between 1 and 100 characters"))]
    pub designation: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000, message = "Bio must be at most 2000 characters"))]
    pub bio: Option<String>,

    #[serde(default)]
    pub display_order: i32,
}

/// Partial update for a board member.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateBoardMemberRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "Designation must be between 1 and 100 characters"))]
    pub designation: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000, message = "Bio must be at most 2000 characters"))]
    pub bio: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,

    /// Drops the current photo without uploading a new one.
    #[serde(default, skip_serializing)]
    pub remove_image: bool,
}
