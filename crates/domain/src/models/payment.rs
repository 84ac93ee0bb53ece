//! Donation payment transaction models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::services::listing::{Listable, SortValue};

/// Settlement status of a payment.
///
/// Serialized with the capitalized names used by the payment records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Succeeded,
    Pending,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Succeeded,
        PaymentStatus::Pending,
        PaymentStatus::Failed,
        PaymentStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Succeeded => "Succeeded",
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::Refunded => "Refunded",
        }
    }

    /// Returns true if the money actually arrived and was kept.
    pub fn counts_as_donation(&self) -> bool {
        matches!(self, PaymentStatus::Succeeded)
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "succeeded" => Ok(PaymentStatus::Succeeded),
            "pending" => Ok(PaymentStatus::Pending),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A payment made by a donor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PaymentTransaction {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub campaign_id: Option<String>,
    pub amount: f64,
    pub method: String,
    pub status: PaymentStatus,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listable for PaymentTransaction {
    const SORT_FIELDS: &'static [&'static str] = &["date", "amount", "user_name", "method"];

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.user_name, &self.user_id, &self.method, self.status.as_str()]
    }

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "date" => Some(SortValue::Time(self.date)),
            "amount" => Some(SortValue::Number(self.amount)),
            "user_name" => Some(SortValue::text(&self.user_name)),
            "method" => Some(SortValue::text(&self.method)),
            _ => None,
        }
    }
}

/// Request payload for recording a payment.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreatePaymentRequest {
    #[validate(length(min = 1, max = 128, message = "User id must be between 1 and 128 characters"))]
    pub user_id: String,

    #[serde(default)]
    #[validate(length(max = 100, message = "User name must be at most 100 characters"))]
    pub user_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 128, message = "Campaign id must be between 1 and 128 characters"))]
    pub campaign_id: Option<String>,

    #[validate(custom(function = "shared::validation::validate_positive_amount"))]
    pub amount: f64,

    #[validate(length(min = 1, max = 50, message = "Method must be between 1 and 50 characters"))]
    pub method: String,

    #[serde(default = "default_status")]
    pub status: PaymentStatus,

    #[serde(default = "Utc::now")]
    pub date: DateTime<Utc>,
}

fn default_status() -> PaymentStatus {
    PaymentStatus::Pending
}

/// Partial update for a payment (typically a status change).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdatePaymentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "shared::validation::validate_positive_amount"))]
    pub amount: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 50, message = "Method must be between 1 and 50 characters"))]
    pub method: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

/// Query filters for listing payments.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PaymentFilter {
    /// Matched case-insensitively (`?status=succeeded` works).
    #[serde(default, deserialize_with = "status_any_case")]
    pub status: Option<PaymentStatus>,
    pub user_id: Option<String>,
    pub campaign_id: Option<String>,
}

fn status_any_case<'de, D>(deserializer: D) -> Result<Option<PaymentStatus>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|s| s.parse().map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_status_is_case_insensitive() {
        let filter: PaymentFilter =
            serde_json::from_value(serde_json::json!({ "status": "succeeded" })).unwrap();
        assert_eq!(filter.status, Some(PaymentStatus::Succeeded));

        let filter: PaymentFilter = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(filter.status, None);

        assert!(serde_json::from_value::<PaymentFilter>(serde_json::json!({ "status": "Lost" })).is_err());
    }

    #[test]
    fn test_status_serializes_capitalized() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Succeeded).unwrap(),
            "\"Succeeded\""
        );
        let parsed: PaymentStatus = serde_json::from_str("\"Refunded\"").unwrap();
        assert_eq!(parsed, PaymentStatus::Refunded);
        assert!(serde_json::from_str::<PaymentStatus>("\"refunded\"").is_err());
    }

    #[test]
    fn test_status_from_str_is_lenient() {
        for status in PaymentStatus::ALL {
            assert_eq!(status.as_str().to_uppercase().parse::<PaymentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_only_succeeded_counts() {
        assert!(PaymentStatus::Succeeded.counts_as_donation());
        assert!(!PaymentStatus::Pending.counts_as_donation());
        assert!(!PaymentStatus::Refunded.counts_as_donation());
    }

    #[test]
    fn test_create_request_defaults() {
        let request: CreatePaymentRequest = serde_json::from_value(serde_json::json!({
            "user_id": "uid-1",
            "amount": 500,
            "method": "bKash"
        }))
        .unwrap();

        assert_eq!(request.status, PaymentStatus::Pending);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_zero_amount() {
        let request: CreatePaymentRequest = serde_json::from_value(serde_json::json!({
            "user_id": "uid-1",
            "amount": 0,
            "method": "card"
        }))
        .unwrap();

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_unknown_status_rejected() {
        let result = serde_json::from_value::<CreatePaymentRequest>(serde_json::json!({
            "user_id": "uid-1",
            "amount": 10,
            "method": "card",
            "status": "Chargeback"
        }));
        assert!(result.is_err());
    }
}
