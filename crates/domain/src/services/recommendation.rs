//! Donation recommendations.
//!
//! The catalogue is a fixed in-memory list. A preference string narrows it
//! by substring; an optional generative model then picks and orders titles
//! from the narrowed list.

use serde::Deserialize;
use shared::search::matches_any;
use std::fmt::Write;

use crate::models::recommendation::{CampaignSummary, DonationHistoryItem};

const CATALOGUE: &[(&str, &str, &str)] = &[
    (
        "Flood Relief for Sylhet",
        "disaster relief",
        "Emergency food, clean water and shelter for families displaced by flooding.",
    ),
    (
        "Winter Blanket Drive",
        "seasonal",
        "Warm blankets and clothing for vulnerable people in the northern districts.",
    ),
    (
        "School Supplies for Rural Children",
        "education",
        "Books, bags and stationery for primary school students in rural villages.",
    ),
    (
        "Scholarships for University Students",
        "education",
        "Tuition support for first-generation university students.",
    ),
    (
        "Clean Water Wells",
        "health",
        "Tube wells and water purification in arsenic-affected communities.",
    ),
    (
        "Mobile Medical Camp",
        "health",
        "Free check-ups and medicine through monthly medical camps.",
    ),
    (
        "Ramadan Food Packages",
        "food security",
        "Monthly food packages for low-income families during Ramadan.",
    ),
    (
        "Tree Plantation Program",
        "environment",
        "Planting and caring for trees along roads and school grounds.",
    ),
];

/// Returns the full catalogue.
pub fn catalogue() -> Vec<CampaignSummary> {
    CATALOGUE
        .iter()
        .map(|(title, category, description)| CampaignSummary {
            title: title.to_string(),
            category: category.to_string(),
            description: description.to_string(),
        })
        .collect()
}

/// Catalogue entries whose title, category or description contains the
/// preference, ignoring case. A blank preference returns everything.
pub fn find_campaigns(preference: &str) -> Vec<CampaignSummary> {
    catalogue()
        .into_iter()
        .filter(|c| matches_any(Some(preference), [c.title.as_str(), c.category.as_str(), c.description.as_str()]))
        .collect()
}

/// Builds the prompt sent to the generative model.
pub fn build_prompt(
    history: &[DonationHistoryItem],
    preferences: &str,
    candidates: &[CampaignSummary],
) -> String {
    let mut prompt = String::from(
        "You recommend donation campaigns for a community organization.\n\n",
    );

    prompt.push_str("Donation history:\n");
    if history.is_empty() {
        prompt.push_str("- none\n");
    }
    for item in history {
        let _ = writeln!(prompt, "- {} ({:.2})", item.campaign, item.amount);
    }

    let preferences = preferences.trim();
    let _ = writeln!(
        prompt,
        "\nPreferences: {}\n",
        if preferences.is_empty() { "none" } else { preferences }
    );

    prompt.push_str("Available campaigns:\n");
    for campaign in candidates {
        let _ = writeln!(
            prompt,
            "- {} [{}]: {}",
            campaign.title, campaign.category, campaign.description
        );
    }

    prompt.push_str(
        "\nPick the campaigns that best fit this donor, best first. \
         Answer with a JSON array of campaign titles copied exactly from the list above.",
    );
    prompt
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModelAnswer {
    Titles(Vec<String>),
    Wrapped { recommendations: Vec<String> },
}

/// Extracts the list of titles from a model answer.
///
/// Accepts a bare JSON array, an object with a `recommendations` array, and
/// either of those wrapped in a Markdown code fence. Returns `None` when no
/// such JSON can be found.
pub fn parse_model_titles(answer: &str) -> Option<Vec<String>> {
    let body = strip_code_fence(answer.trim());
    match serde_json::from_str::<ModelAnswer>(body) {
        Ok(ModelAnswer::Titles(titles)) => Some(titles),
        Ok(ModelAnswer::Wrapped { recommendations }) => Some(recommendations),
        Err(_) => {
            let start = body.find('[')?;
            let end = body.rfind(']')?;
            if end <= start {
                return None;
            }
            serde_json::from_str(&body[start..=end]).ok()
        }
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Maps titles chosen by the model back onto candidate entries.
///
/// Matching ignores case and surrounding whitespace; unknown titles and
/// duplicates are dropped, and the model's order is kept.
pub fn resolve_titles(titles: &[String], candidates: &[CampaignSummary]) -> Vec<CampaignSummary> {
    let mut resolved: Vec<CampaignSummary> = Vec::new();
    for title in titles {
        let wanted = title.trim().to_lowercase();
        let found = candidates
            .iter()
            .find(|c| c.title.to_lowercase() == wanted);
        if let Some(campaign) = found {
            if !resolved.iter().any(|r| r.title == campaign.title) {
                resolved.push(campaign.clone());
            }
        }
    }
    resolved
}
