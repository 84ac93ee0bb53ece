//! Payment endpoint handlers (admin only).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::listing::ListQuery;
use domain::models::payment::{
    CreatePaymentRequest, PaymentFilter, PaymentTransaction, UpdatePaymentRequest,
};
use domain::services::listing::apply_view;
use shared::pagination::Page;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;

/// GET /api/v1/payments?status=&user_id=&campaign_id=&search=&sort=&order=&page=&per_page=
///
/// Without `sort` the page is newest first.
pub async fn list_payments(
    State(state): State<AppState>,
    Query(filter): Query<PaymentFilter>,
    Query(view): Query<ListQuery>,
) -> Result<Json<Page<PaymentTransaction>>, ApiError> {
    let payments = state.payments.get_payments(&filter).await?;
    let page = apply_view(payments, &view, state.config.limits.view_limits())?;
    Ok(Json(page))
}

pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PaymentTransaction>, ApiError> {
    Ok(Json(state.payments.get_payment(&id).await?))
}

pub async fn create_payment(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<PaymentTransaction>), ApiError> {
    let payment = state.payments.add_payment(&request).await?;

    info!(
        payment_id = %payment.id,
        amount = payment.amount,
        status = %payment.status,
        "Payment recorded"
    );
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdatePaymentRequest>,
) -> Result<Json<PaymentTransaction>, ApiError> {
    Ok(Json(state.payments.update_payment(&id, &request).await?))
}

pub async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.payments.delete_payment(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
