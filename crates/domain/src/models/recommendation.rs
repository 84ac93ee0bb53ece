//! Input and output of the donation recommendation flow.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One past donation supplied by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DonationHistoryItem {
    pub campaign: String,
    #[serde(default)]
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RecommendationInput {
    #[serde(default)]
    #[validate(length(max = 100, message = "At most 100 history items are accepted"))]
    pub donation_history: Vec<DonationHistoryItem>,

    #[validate(length(max = 500, message = "Preferences must be at most 500 characters"))]
    #[serde(default)]
    pub preferences: String,
}

/// A campaign from the recommendation catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CampaignSummary {
    pub title: String,
    pub category: String,
    pub description: String,
}

/// Where the recommendations came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    /// Ranked by the generative model.
    Model,
    /// Plain catalogue search; the model was disabled or failed.
    Catalogue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RecommendationOutput {
    pub recommendations: Vec<CampaignSummary>,
    pub source: RecommendationSource,
}
