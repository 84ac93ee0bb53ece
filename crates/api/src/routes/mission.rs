//! Mission and vision content handlers.

use axum::{extract::State, Json};
use domain::models::mission::{MissionContent, SetMissionRequest};

use crate::app::AppState;
use crate::error::ApiError;

pub async fn get_mission(State(state): State<AppState>) -> Result<Json<MissionContent>, ApiError> {
    state
        .mission
        .get_mission()
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Mission content has not been set".to_string()))
}

/// PUT /api/v1/mission
pub async fn set_mission(
    State(state): State<AppState>,
    Json(request): Json<SetMissionRequest>,
) -> Result<Json<MissionContent>, ApiError> {
    Ok(Json(state.mission.set_mission(&request).await?))
}
