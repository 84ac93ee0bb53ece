//! Campaign endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::campaign::{Campaign, CampaignFilter, CreateCampaignRequest, UpdateCampaignRequest};
use domain::models::listing::ListQuery;
use domain::services::listing::apply_view;
use shared::pagination::Page;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{EntityPayload, Session};

/// GET /api/v1/campaigns?status=&search=&sort=&order=&page=&per_page=
pub async fn list_campaigns(
    State(state): State<AppState>,
    Query(filter): Query<CampaignFilter>,
    Query(view): Query<ListQuery>,
) -> Result<Json<Page<Campaign>>, ApiError> {
    let campaigns = state.campaigns.get_campaigns(&filter).await?;
    let page = apply_view(campaigns, &view, state.config.limits.view_limits())?;
    Ok(Json(page))
}

/// GET /api/v1/campaigns/:id
pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Campaign>, ApiError> {
    Ok(Json(state.campaigns.get_campaign(&id).await?))
}

/// POST /api/v1/campaigns (JSON or multipart with an `image` file)
pub async fn create_campaign(
    State(state): State<AppState>,
    session: Session,
    payload: EntityPayload<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<Campaign>), ApiError> {
    let campaign = state
        .campaigns
        .add_campaign(&payload.body, payload.file)
        .await?;

    info!(
        campaign_id = %campaign.id,
        status = %campaign.status,
        admin = %session.user_id,
        "Campaign created"
    );
    Ok((StatusCode::CREATED, Json(campaign)))
}

/// PATCH /api/v1/campaigns/:id
pub async fn update_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: EntityPayload<UpdateCampaignRequest>,
) -> Result<Json<Campaign>, ApiError> {
    let campaign = state
        .campaigns
        .update_campaign(&id, &payload.body, payload.file)
        .await?;
    Ok(Json(campaign))
}

/// DELETE /api/v1/campaigns/:id
pub async fn delete_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.campaigns.delete_campaign(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
