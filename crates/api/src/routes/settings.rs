//! Display settings handlers.
//!
//! Settings live in process memory and reset to the configured display name
//! on restart.

use axum::{extract::State, Json};
use domain::models::settings::{DisplaySettings, UpdateDisplaySettingsRequest};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

pub async fn get_settings(State(state): State<AppState>) -> Json<DisplaySettings> {
    Json(state.settings.read().await.clone())
}

/// PATCH /api/v1/settings
pub async fn update_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdateDisplaySettingsRequest>,
) -> Result<Json<DisplaySettings>, ApiError> {
    request.validate()?;

    let mut settings = state.settings.write().await;
    settings.apply(request);

    info!(display_name = %settings.display_name, "Display settings updated");
    Ok(Json(settings.clone()))
}
