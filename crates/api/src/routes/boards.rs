//! Advisory board and executive committee handlers.
//!
//! `:board` is `advisory` or `executive`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::board::{
    Board, BoardMember, CreateBoardMemberRequest, UpdateBoardMemberRequest,
};
use domain::models::listing::ListQuery;
use domain::services::listing::apply_view;
use shared::pagination::Page;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::EntityPayload;

pub async fn list_members(
    State(state): State<AppState>,
    Path(board): Path<Board>,
    Query(view): Query<ListQuery>,
) -> Result<Json<Page<BoardMember>>, ApiError> {
    let members = state.board(board).get_members().await?;
    let page = apply_view(members, &view, state.config.limits.view_limits())?;
    Ok(Json(page))
}

pub async fn get_member(
    State(state): State<AppState>,
    Path((board, id)): Path<(Board, String)>,
) -> Result<Json<BoardMember>, ApiError> {
    Ok(Json(state.board(board).get_member(&id).await?))
}

pub async fn create_member(
    State(state): State<AppState>,
    Path(board): Path<Board>,
    payload: EntityPayload<CreateBoardMemberRequest>,
) -> Result<(StatusCode, Json<BoardMember>), ApiError> {
    let member = state
        .board(board)
        .add_member(&payload.body, payload.file)
        .await?;

    info!(board = %board, member_id = %member.id, "Board member added");
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn update_member(
    State(state): State<AppState>,
    Path((board, id)): Path<(Board, String)>,
    payload: EntityPayload<UpdateBoardMemberRequest>,
) -> Result<Json<BoardMember>, ApiError> {
    let member = state
        .board(board)
        .update_member(&id, &payload.body, payload.file)
        .await?;
    Ok(Json(member))
}

pub async fn delete_member(
    State(state): State<AppState>,
    Path((board, id)): Path<(Board, String)>,
) -> Result<StatusCode, ApiError> {
    state.board(board).delete_member(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
