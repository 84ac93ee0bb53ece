//! Query parameters shared by every list endpoint.

use serde::Deserialize;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Search, sort and page parameters for a list view.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListQuery {
    /// Case-insensitive substring matched against the entity's text fields.
    pub search: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    /// Field to sort by; entity-specific.
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
}
