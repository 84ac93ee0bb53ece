//! Election candidate handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::models::election::{
    CandidateFilter, CreateCandidateRequest, ElectionCandidate, UpdateCandidateRequest, Voter,
};
use domain::models::listing::ListQuery;
use domain::services::listing::apply_view;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::EntityPayload;

/// GET /api/v1/candidates?position=&include_voters=true
///
/// With `include_voters` every candidate carries its voters and vote count.
pub async fn list_candidates(
    State(state): State<AppState>,
    Query(filter): Query<CandidateFilter>,
    Query(view): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let limits = state.config.limits.view_limits();

    if !filter.include_voters {
        let candidates = state.candidates.get_candidates(filter.position).await?;
        return Ok(Json(apply_view(candidates, &view, limits)?).into_response());
    }

    let candidates = state.candidates.get_candidates_with_voters(&filter).await?;
    Ok(Json(apply_view(candidates, &view, limits)?).into_response())
}

pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ElectionCandidate>, ApiError> {
    Ok(Json(state.candidates.get_candidate(&id).await?))
}

pub async fn list_voters(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Voter>>, ApiError> {
    // 404 for an unknown candidate rather than an empty list
    state.candidates.get_candidate(&id).await?;
    Ok(Json(state.candidates.get_voters(&id).await?))
}

pub async fn create_candidate(
    State(state): State<AppState>,
    payload: EntityPayload<CreateCandidateRequest>,
) -> Result<(StatusCode, Json<ElectionCandidate>), ApiError> {
    let candidate = state
        .candidates
        .add_candidate(&payload.body, payload.file)
        .await?;
    Ok((StatusCode::CREATED, Json(candidate)))
}

pub async fn update_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: EntityPayload<UpdateCandidateRequest>,
) -> Result<Json<ElectionCandidate>, ApiError> {
    let candidate = state
        .candidates
        .update_candidate(&id, &payload.body, payload.file)
        .await?;
    Ok(Json(candidate))
}

pub async fn delete_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.candidates.delete_candidate(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
