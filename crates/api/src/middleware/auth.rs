//! Session authentication middleware.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Session;

/// Rejects requests without a valid admin session.
///
/// The validated [`Session`] is stored in request extensions for handlers.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let (mut parts, body) = req.into_parts();

    let session = match Session::from_headers(&parts, &state) {
        Ok(session) => session,
        Err(err) => return err.into_response(),
    };

    if !session.is_admin() {
        tracing::warn!(user_id = %session.user_id, "Admin route refused for non-admin session");
        return ApiError::Forbidden("Admin access required".to_string()).into_response();
    }

    parts.extensions.insert(session);
    next.run(Request::from_parts(parts, body)).await
}

