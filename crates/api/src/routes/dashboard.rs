//! Admin dashboard route.

use axum::{extract::State, Json};
use chrono::Utc;
use domain::models::campaign::CampaignFilter;
use domain::models::dashboard::DashboardSummary;
use domain::models::event::EventFilter;
use domain::models::notice::NoticeFilter;
use domain::models::payment::PaymentFilter;
use domain::services::dashboard::{summarize, DashboardInput};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminSession;

/// GET /api/v1/dashboard
///
/// Loads the five collections concurrently and aggregates them.
pub async fn get_dashboard(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
) -> Result<Json<DashboardSummary>, ApiError> {
    let campaign_filter = CampaignFilter::default();
    let payment_filter = PaymentFilter::default();
    let notice_filter = NoticeFilter::default();
    let event_filter = EventFilter::default();

    let (campaigns, payments, expenses, notices, events) = tokio::try_join!(
        state.campaigns.get_campaigns(&campaign_filter),
        state.payments.get_payments(&payment_filter),
        state.expenses.get_expenses(),
        state.notices.get_notices(&notice_filter),
        state.events.get_events(&event_filter),
    )?;

    let summary = summarize(DashboardInput {
        campaigns: &campaigns,
        payments: &payments,
        expenses: &expenses,
        notices: &notices,
        events: &events,
        today: Utc::now().date_naive(),
    });

    info!(
        user_id = %session.user_id,
        campaigns = campaigns.len(),
        payments = payments.len(),
        "Dashboard computed"
    );

    Ok(Json(summary))
}
