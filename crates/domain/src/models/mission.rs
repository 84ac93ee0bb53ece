//! Mission and vision content shown on the about page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Singleton mission content document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MissionContent {
    pub id: String,
    pub mission: String,
    pub vision: String,
    #[serde(default)]
    pub values: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Replaces the mission content.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct SetMissionRequest {
    #[validate(length(min = 1, max = 5000, message = "Mission must be between 1 and 5000 characters"))]
    pub mission: String,

    #[validate(length(min = 1, max = 5000, message = "Vision must be between 1 and 5000 characters"))]
    pub vision: String,

    #[serde(default)]
    #[validate(length(max = 20, message = "At most 20 values can be listed"))]
    pub values: Vec<String>,
}
