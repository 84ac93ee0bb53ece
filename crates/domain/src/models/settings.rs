//! Application-wide display settings.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Fallback display name when none is configured.
pub const DEFAULT_DISPLAY_NAME: &str = "BPJP";

/// Settings shared by every page of the site.
///
/// Held in memory for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DisplaySettings {
    pub display_name: String,
}

impl DisplaySettings {
    pub fn new(display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Self::default();
        }
        Self { display_name }
    }

    /// Applies an update, keeping fields the request leaves out.
    pub fn apply(&mut self, update: UpdateDisplaySettingsRequest) {
        if let Some(name) = update.display_name {
            self.display_name = name.trim().to_string();
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateDisplaySettingsRequest {
    #[validate(
        length(min = 1, max = 80, message = "Display name must be between 1 and 80 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub display_name: Option<String>,
}
