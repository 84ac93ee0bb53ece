//! Campaign recommendation handler.

use axum::{extract::State, Json};
use domain::models::recommendation::{RecommendationInput, RecommendationOutput};

use crate::app::AppState;
use crate::error::ApiError;

/// POST /api/v1/recommendations
pub async fn recommend(
    State(state): State<AppState>,
    Json(input): Json<RecommendationInput>,
) -> Result<Json<RecommendationOutput>, ApiError> {
    Ok(Json(state.recommender.recommend(&input).await?))
}
