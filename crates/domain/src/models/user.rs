//! Authenticated user and identity provider error codes.

use serde::{Deserialize, Serialize};
use shared::jwt::SessionRole;
use std::fmt;
use validator::Validate;

/// The signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub role: SessionRole,
}

/// Request payload for creating an account.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 128, message = "Password must be between 1 and 128 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "Display name must be between 1 and 100 characters"))]
    pub display_name: Option<String>,
}

/// Request payload for signing in.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Machine-readable reason a login or signup failed.
///
/// These are passed through to the client unchanged so it can pick its own
/// wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorCode {
    EmailAlreadyInUse,
    UserNotFound,
    WrongPassword,
    InvalidCredential,
    UserDisabled,
    WeakPassword,
    TooManyRequests,
    Unknown,
}

impl AuthErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthErrorCode::EmailAlreadyInUse => "email_already_in_use",
            AuthErrorCode::UserNotFound => "user_not_found",
            AuthErrorCode::WrongPassword => "wrong_password",
            AuthErrorCode::InvalidCredential => "invalid_credential",
            AuthErrorCode::UserDisabled => "user_disabled",
            AuthErrorCode::WeakPassword => "weak_password",
            AuthErrorCode::TooManyRequests => "too_many_requests",
            AuthErrorCode::Unknown => "unknown",
        }
    }

    /// Default message shown alongside the code.
    pub fn default_message(&self) -> &'static str {
        match self {
            AuthErrorCode::EmailAlreadyInUse => "An account with this email already exists",
            AuthErrorCode::UserNotFound => "No account found for this email",
            AuthErrorCode::WrongPassword => "Incorrect password",
            AuthErrorCode::InvalidCredential => "Invalid email or password",
            AuthErrorCode::UserDisabled => "This account has been disabled",
            AuthErrorCode::WeakPassword => "Password is too weak",
            AuthErrorCode::TooManyRequests => "Too many attempts, try again later",
            AuthErrorCode::Unknown => "Authentication failed",
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rejected login or signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthFailure {
    pub code: AuthErrorCode,
    pub message: String,
}

impl AuthFailure {
    pub fn new(code: AuthErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
        }
    }

    pub fn with_message(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for AuthFailure {}
