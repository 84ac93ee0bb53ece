//! Expense endpoint handlers (admin only).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::expense::{CreateExpenseRequest, Expense, UpdateExpenseRequest};
use domain::models::listing::ListQuery;
use domain::services::listing::apply_view;
use shared::pagination::Page;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::EntityPayload;

pub async fn list_expenses(
    State(state): State<AppState>,
    Query(view): Query<ListQuery>,
) -> Result<Json<Page<Expense>>, ApiError> {
    let expenses = state.expenses.get_expenses().await?;
    let page = apply_view(expenses, &view, state.config.limits.view_limits())?;
    Ok(Json(page))
}

pub async fn get_expense(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Expense>, ApiError> {
    Ok(Json(state.expenses.get_expense(&id).await?))
}

/// POST /api/v1/expenses (JSON or multipart with a receipt `file`)
pub async fn create_expense(
    State(state): State<AppState>,
    payload: EntityPayload<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    let expense = state
        .expenses
        .add_expense(&payload.body, payload.file)
        .await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: EntityPayload<UpdateExpenseRequest>,
) -> Result<Json<Expense>, ApiError> {
    let expense = state
        .expenses
        .update_expense(&id, &payload.body, payload.file)
        .await?;
    Ok(Json(expense))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.expenses.delete_expense(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
