//! Session extractors.
//!
//! A session is the API's own JWT, issued at signup/login. Admin routes
//! validate it in [`require_admin`](crate::middleware::auth::require_admin)
//! and leave the result in request extensions; handlers on other routes
//! validate the header themselves.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use shared::jwt::{Claims, SessionRole};

use crate::app::AppState;
use crate::error::ApiError;

/// The caller, as described by a valid session token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: SessionRole,
    pub jti: String,
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            display_name: claims.name,
            role: claims.role,
            jti: claims.jti,
        }
    }
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Validates the bearer token in `Authorization`.
    pub fn from_headers(parts: &Parts, state: &AppState) -> Result<Self, ApiError> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        state
            .jwt
            .validate(token)
            .map(Session::from)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(session.clone());
        }
        Session::from_headers(parts, state)
    }
}

/// A session that must carry the admin role.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        if !session.is_admin() {
            return Err(ApiError::Forbidden("Admin access required".to_string()));
        }
        Ok(AdminSession(session))
    }
}
