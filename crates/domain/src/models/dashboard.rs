//! Admin dashboard summary.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::payment::PaymentTransaction;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CampaignTotals {
    pub total: usize,
    /// Count per status, keyed by the lowercase status name.
    pub by_status: BTreeMap<String, usize>,
    pub goal_amount: f64,
    pub raised_amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PaymentTotals {
    pub count: usize,
    pub by_status: BTreeMap<String, usize>,
    /// Sum of succeeded payments.
    pub donated_amount: f64,
    /// Succeeded amount per month, keyed `YYYY-MM`.
    pub monthly: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DashboardSummary {
    pub campaigns: CampaignTotals,
    pub payments: PaymentTotals,
    pub expense_count: usize,
    pub expense_amount: f64,
    /// Donations received minus expenses.
    pub net_balance: f64,
    pub active_notices: usize,
    pub upcoming_events: usize,
    pub recent_payments: Vec<PaymentTransaction>,
}
