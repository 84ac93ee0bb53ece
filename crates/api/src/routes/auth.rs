//! Signup, login and current-user routes.
//!
//! Failures carry the identity provider's error code in `error` so clients
//! can branch on it:
//!
//! ```json
//! { "error": "wrong_password", "message": "Incorrect password" }
//! ```

use axum::{extract::State, http::StatusCode, Json};
use domain::models::user::{AuthFailure, AuthUser, LoginRequest, SignupRequest};
use serde::Serialize;
use shared::jwt::SessionSubject;
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Session;
use crate::middleware::metrics::record_auth_attempt;
use crate::services::identity::Account;

/// Successful signup or login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AuthResponse {
    pub user: AuthUser,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// POST /api/v1/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    request.validate()?;

    let account = state
        .identity
        .sign_up(&request)
        .await
        .map_err(|failure| rejected("signup", failure))?;

    let response = start_session(&state, account)?;
    record_auth_attempt("signup", "ok");
    info!(user_id = %response.user.uid, provider = state.identity.name(), "Account created");

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    request.validate()?;

    let account = state
        .identity
        .sign_in(&request)
        .await
        .map_err(|failure| rejected("login", failure))?;

    let response = start_session(&state, account)?;
    record_auth_attempt("login", "ok");
    info!(user_id = %response.user.uid, role = %response.user.role.as_str(), "User logged in");

    Ok(Json(response))
}

/// GET /api/v1/auth/me
pub async fn me(session: Session) -> Json<AuthUser> {
    Json(AuthUser {
        uid: session.user_id,
        email: session.email,
        display_name: session.display_name,
        role: session.role,
    })
}

fn rejected(kind: &'static str, failure: AuthFailure) -> ApiError {
    record_auth_attempt(kind, failure.code.as_str());
    warn!(kind, code = %failure.code, "Authentication rejected");
    ApiError::Auth(failure)
}

fn start_session(state: &AppState, account: Account) -> Result<AuthResponse, ApiError> {
    let user = account.into_user(&state.config.auth);

    let issued = state
        .jwt
        .issue(&SessionSubject {
            user_id: &user.uid,
            email: &user.email,
            display_name: user.display_name.as_deref(),
            role: user.role,
        })
        .map_err(|e| ApiError::Internal(format!("Failed to issue session token: {}", e)))?;

    Ok(AuthResponse {
        user,
        access_token: issued.token,
        token_type: "Bearer".to_string(),
        expires_in: issued.expires_in,
    })
}
