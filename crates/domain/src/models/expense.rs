//! Expense models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::attachment::StoredFile;
use crate::services::listing::{Listable, SortValue};

/// Money spent by the organization, optionally with a receipt attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Expense {
    pub id: String,
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub attachment: Option<StoredFile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listable for Expense {
    const SORT_FIELDS: &'static [&'static str] = &["name", "amount", "created_at"];

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.details]
    }

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "name" => Some(SortValue::text(&self.name)),
            "amount" => Some(SortValue::Number(self.amount)),
            "created_at" => Some(SortValue::Time(self.created_at)),
            _ => None,
        }
    }
}

/// Request payload for recording an expense.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateExpenseRequest {
    #[validate(
        length(min = 1, max = 150, message = "Name must be between 1 and 150 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: String,

    #[validate(custom(function = "shared::validation::validate_amount"))]
    pub amount: f64,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Details must be at most 2000 characters"))]
    pub details: String,
}

/// Partial update for an expense.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateExpenseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 1, max = 150, message = "Name must be between 1 and 150 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "shared::validation::validate_amount"))]
    pub amount: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000, message = "Details must be at most 2000 characters"))]
    pub details: Option<String>,

    /// Drops the current attachment without uploading a new one.
    #[serde(default, skip_serializing)]
    pub remove_attachment: bool,
}
