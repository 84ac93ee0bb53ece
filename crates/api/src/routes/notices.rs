//! Notice endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::listing::ListQuery;
use domain::models::notice::{CreateNoticeRequest, Notice, NoticeFilter, UpdateNoticeRequest};
use domain::services::listing::apply_view;
use serde::Serialize;
use shared::pagination::Page;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::EntityPayload;

/// GET /api/v1/notices?active_only=true
///
/// Most recently updated first unless `sort` is given.
pub async fn list_notices(
    State(state): State<AppState>,
    Query(filter): Query<NoticeFilter>,
    Query(view): Query<ListQuery>,
) -> Result<Json<Page<Notice>>, ApiError> {
    let notices = state.notices.get_notices(&filter).await?;
    let page = apply_view(notices, &view, state.config.limits.view_limits())?;
    Ok(Json(page))
}

#[derive(Debug, Serialize)]
pub struct PopupNoticeResponse {
    pub notice: Option<Notice>,
}

/// GET /api/v1/notices/popup
pub async fn get_popup_notice(
    State(state): State<AppState>,
) -> Result<Json<PopupNoticeResponse>, ApiError> {
    let notice = state.notices.get_popup_notice().await?;
    Ok(Json(PopupNoticeResponse { notice }))
}

pub async fn get_notice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Notice>, ApiError> {
    Ok(Json(state.notices.get_notice(&id).await?))
}

pub async fn create_notice(
    State(state): State<AppState>,
    payload: EntityPayload<CreateNoticeRequest>,
) -> Result<(StatusCode, Json<Notice>), ApiError> {
    let notice = state
        .notices
        .add_notice(&payload.body, payload.file)
        .await?;
    Ok((StatusCode::CREATED, Json(notice)))
}

pub async fn update_notice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: EntityPayload<UpdateNoticeRequest>,
) -> Result<Json<Notice>, ApiError> {
    let notice = state
        .notices
        .update_notice(&id, &payload.body, payload.file)
        .await?;
    Ok(Json(notice))
}

pub async fn delete_notice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.notices.delete_notice(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
