//! Community event models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::listing::{Listable, SortValue};

/// An organization event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub details: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub participants: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Returns true if the event has not happened yet relative to `today`.
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.date >= today
    }
}

impl Listable for Event {
    const SORT_FIELDS: &'static [&'static str] = &["title", "date", "participants"];

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.details]
    }

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "title" => Some(SortValue::text(&self.title)),
            "date" => Some(SortValue::Date(self.date)),
            "participants" => Some(SortValue::Number(f64::from(self.participants))),
            _ => None,
        }
    }
}

/// Request payload for creating an event.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateEventRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 5000, message = "Details must be at most 5000 characters"))]
    pub details: String,

    pub date: NaiveDate,

    #[serde(default)]
    #[validate(range(max = 1_000_000, message = "Participants must be at most 1000000"))]
    pub participants: u32,
}

/// Partial update for an event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateEventRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 5000, message = "Details must be at most 5000 characters"))]
    pub details: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(max = 1_000_000, message = "Participants must be at most 1000000"))]
    pub participants: Option<u32>,
}

/// Query filters for listing events.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EventFilter {
    #[serde(default)]
    pub upcoming_only: bool,
}
