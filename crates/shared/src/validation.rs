//! Common validation utilities.

use chrono::NaiveDate;
use validator::ValidationError;

/// Largest amount accepted for any monetary field.
const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

/// Validates that a monetary amount is finite and not negative.
pub fn validate_amount(amount: f64) -> Result<(), ValidationError> {
    if amount.is_finite() && (0.0..=MAX_AMOUNT).contains(&amount) {
        Ok(())
    } else {
        let mut err = ValidationError::new("amount_range");
        err.message = Some("Amount must be a non-negative number".into());
        Err(err)
    }
}

/// Validates that a payment amount is finite and strictly positive.
pub fn validate_positive_amount(amount: f64) -> Result<(), ValidationError> {
    if amount.is_finite() && amount > 0.0 && amount <= MAX_AMOUNT {
        Ok(())
    } else {
        let mut err = ValidationError::new("amount_positive");
        err.message = Some("Amount must be greater than zero".into());
        Err(err)
    }
}

/// Validates that a text field is not only whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates that `end` does not come before `start`.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if end >= start {
        Ok(())
    } else {
        let mut err = ValidationError::new("date_range");
        err.message = Some("End date must not be before start date".into());
        Err(err)
    }
}
