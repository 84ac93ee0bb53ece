//! Fundraising campaign models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};

use crate::models::attachment::StoredFile;
use crate::services::listing::{Listable, SortValue};

/// Lifecycle status of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Upcoming,
    Active,
    Completed,
}

impl CampaignStatus {
    pub const ALL: [CampaignStatus; 4] = [
        CampaignStatus::Draft,
        CampaignStatus::Upcoming,
        CampaignStatus::Active,
        CampaignStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Upcoming => "upcoming",
            CampaignStatus::Active => "active",
            CampaignStatus::Completed => "completed",
        }
    }

    /// Returns true if the campaign is shown to the public.
    pub fn is_public(&self) -> bool {
        !matches!(self, CampaignStatus::Draft)
    }
}

impl FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(CampaignStatus::Draft),
            "upcoming" => Ok(CampaignStatus::Upcoming),
            "active" => Ok(CampaignStatus::Active),
            "completed" => Ok(CampaignStatus::Completed),
            _ => Err(format!("Invalid campaign status: {}", s)),
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fundraising campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Campaign {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub goal_amount: f64,
    #[serde(default)]
    pub raised_amount: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: CampaignStatus,
    #[serde(default)]
    pub image: Option<StoredFile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// Share of the goal raised so far, in percent, capped at 100.
    pub fn progress_percent(&self) -> f64 {
        if self.goal_amount <= 0.0 {
            return 0.0;
        }
        (self.raised_amount / self.goal_amount * 100.0).clamp(0.0, 100.0)
    }
}

impl Listable for Campaign {
    const SORT_FIELDS: &'static [&'static str] = &[
        "title",
        "goal_amount",
        "raised_amount",
        "start_date",
        "end_date",
        "updated_at",
    ];

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.description]
    }

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "title" => Some(SortValue::text(&self.title)),
            "goal_amount" => Some(SortValue::Number(self.goal_amount)),
            "raised_amount" => Some(SortValue::Number(self.raised_amount)),
            "start_date" => Some(SortValue::Date(self.start_date)),
            "end_date" => Some(SortValue::Date(self.end_date)),
            "updated_at" => Some(SortValue::Time(self.updated_at)),
            _ => None,
        }
    }
}

/// Request payload for creating a campaign.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
#[validate(schema(function = "validate_campaign_dates"))]
pub struct CreateCampaignRequest {
    #[validate(
        length(min = 1, max = 150, message = "Title must be between 1 and 150 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: String,

    #[validate(custom(function = "shared::validation::validate_amount"))]
    pub goal_amount: f64,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_amount"))]
    pub raised_amount: f64,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[serde(default = "default_status")]
    pub status: CampaignStatus,
}

fn default_status() -> CampaignStatus {
    CampaignStatus::Draft
}

fn validate_campaign_dates(request: &CreateCampaignRequest) -> Result<(), ValidationError> {
    shared::validation::validate_date_range(request.start_date, request.end_date)
}

/// Partial update for a campaign. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateCampaignRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 1, max = 150, message = "Title must be between 1 and 150 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "shared::validation::validate_amount"))]
    pub goal_amount: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "shared::validation::validate_amount"))]
    pub raised_amount: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CampaignStatus>,

    /// Drops the current image without uploading a new one.
    #[serde(default, skip_serializing)]
    pub remove_image: bool,
}

impl UpdateCampaignRequest {
    /// Checks the date range the campaign would have after applying this
    /// patch to `current`.
    pub fn validate_against(&self, current: &Campaign) -> Result<(), ValidationError> {
        let start = self.start_date.unwrap_or(current.start_date);
        let end = self.end_date.unwrap_or(current.end_date);
        shared::validation::validate_date_range(start, end)
    }
}

/// Query filters for listing campaigns.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CampaignFilter {
    pub status: Option<CampaignStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_request() -> CreateCampaignRequest {
        CreateCampaignRequest {
            title: "Flood relief".to_string(),
            description: "Emergency food and shelter".to_string(),
            goal_amount: 50_000.0,
            raised_amount: 0.0,
            start_date: date(2024, 7, 1),
            end_date: date(2024, 9, 30),
            status: CampaignStatus::Active,
        }
    }

    fn campaign(goal: f64, raised: f64) -> Campaign {
        Campaign {
            id: "c1".to_string(),
            title: "Flood relief".to_string(),
            description: String::new(),
            goal_amount: goal,
            raised_amount: raised,
            start_date: date(2024, 7, 1),
            end_date: date(2024, 9, 30),
            status: CampaignStatus::Active,
            image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_round_trip() {
        for status in CampaignStatus::ALL {
            assert_eq!(status.as_str().parse::<CampaignStatus>().unwrap(), status);
            assert_eq!(
                serde_json::to_string(&status).unwrap(),
                format!("\"{}\"", status.as_str())
            );
        }
        assert!("archived".parse::<CampaignStatus>().is_err());
    }

    #[test]
    fn test_status_visibility() {
        assert!(!CampaignStatus::Draft.is_public());
        assert!(CampaignStatus::Active.is_public());
        assert!(CampaignStatus::Completed.is_public());
    }

    #[test]
    fn test_valid_create_request() {
        assert!(create_request().validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_blank_title() {
        let mut request = create_request();
        request.title = "   ".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_rejects_negative_goal() {
        let mut request = create_request();
        request.goal_amount = -5.0;
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("goal_amount"));
    }

    #[test]
    fn test_create_request_rejects_inverted_dates() {
        let mut request = create_request();
        request.end_date = date(2024, 6, 1);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_defaults_to_draft() {
        let request: CreateCampaignRequest = serde_json::from_value(serde_json::json!({
            "title": "School books",
            "goal_amount": 1000,
            "start_date": "2024-01-01",
            "end_date": "2024-02-01"
        }))
        .unwrap();
        assert_eq!(request.status, CampaignStatus::Draft);
        assert_eq!(request.raised_amount, 0.0);
    }

    #[test]
    fn test_update_request_serializes_only_present_fields() {
        let patch = UpdateCampaignRequest {
            raised_amount: Some(1200.0),
            remove_image: true,
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, serde_json::json!({ "raised_amount": 1200.0 }));
    }

    #[test]
    fn test_update_validated_against_current_dates() {
        let current = campaign(100.0, 0.0);
        let patch = UpdateCampaignRequest {
            end_date: Some(date(2024, 6, 1)),
            ..Default::default()
        };
        assert!(patch.validate_against(&current).is_err());

        let patch = UpdateCampaignRequest {
            end_date: Some(date(2024, 12, 31)),
            ..Default::default()
        };
        assert!(patch.validate_against(&current).is_ok());
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(campaign(200.0, 50.0).progress_percent(), 25.0);
        assert_eq!(campaign(100.0, 250.0).progress_percent(), 100.0);
        assert_eq!(campaign(0.0, 10.0).progress_percent(), 0.0);
    }
}
