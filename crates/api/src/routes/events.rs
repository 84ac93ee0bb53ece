//! Event endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::event::{CreateEventRequest, Event, EventFilter, UpdateEventRequest};
use domain::models::listing::ListQuery;
use domain::services::listing::apply_view;
use shared::pagination::Page;

use crate::app::AppState;
use crate::error::ApiError;

/// GET /api/v1/events?upcoming_only=true
pub async fn list_events(
    State(state): State<AppState>,
    Query(filter): Query<EventFilter>,
    Query(view): Query<ListQuery>,
) -> Result<Json<Page<Event>>, ApiError> {
    let events = state.events.get_events(&filter).await?;
    let page = apply_view(events, &view, state.config.limits.view_limits())?;
    Ok(Json(page))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    Ok(Json(state.events.get_event(&id).await?))
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let event = state.events.add_event(&request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<Event>, ApiError> {
    Ok(Json(state.events.update_event(&id, &request).await?))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.events.delete_event(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
