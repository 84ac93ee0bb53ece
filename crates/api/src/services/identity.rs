//! Identity providers backing signup and login.
//!
//! Two implementations of [`IdentityProvider`]:
//! - [`IdentityToolkitProvider`] calls the managed identity toolkit REST API
//!   (`accounts:signUp`, `accounts:signInWithPassword`).
//! - [`LocalIdentityProvider`] keeps accounts in process memory with
//!   Argon2id password hashes, for local development and tests.
//!
//! Both report failures as an [`AuthFailure`] carrying one of the closed
//! set of [`AuthErrorCode`]s.

use async_trait::async_trait;
use domain::models::user::{AuthErrorCode, AuthFailure, AuthUser, LoginRequest, SignupRequest};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::jwt::SessionRole;
use shared::password::{hash_password, is_strong_enough, verify_password, MIN_PASSWORD_LENGTH};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::AuthConfig;

/// An account as known to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

impl Account {
    /// Attaches the role granted by configuration.
    pub fn into_user(self, config: &AuthConfig) -> AuthUser {
        let role = if config.is_admin(&self.email) {
            SessionRole::Admin
        } else {
            SessionRole::Member
        };
        AuthUser {
            uid: self.uid,
            email: self.email,
            display_name: self.display_name,
            role,
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    async fn sign_up(&self, request: &SignupRequest) -> Result<Account, AuthFailure>;

    async fn sign_in(&self, request: &LoginRequest) -> Result<Account, AuthFailure>;
}

/// Maps a provider error message to an error code.
///
/// Accepts both the REST API's upper-case messages (`EMAIL_EXISTS`,
/// `WEAK_PASSWORD : ...`) and client-SDK style codes
/// (`auth/email-already-in-use`).
pub fn error_code_for(message: &str) -> AuthErrorCode {
    let head = message
        .split(':')
        .next()
        .unwrap_or_default()
        .trim()
        .trim_start_matches("auth/")
        .to_ascii_uppercase()
        .replace('-', "_");

    match head.as_str() {
        "EMAIL_EXISTS" | "EMAIL_ALREADY_IN_USE" => AuthErrorCode::EmailAlreadyInUse,
        "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => AuthErrorCode::UserNotFound,
        "INVALID_PASSWORD" | "WRONG_PASSWORD" => AuthErrorCode::WrongPassword,
        "INVALID_LOGIN_CREDENTIALS" | "INVALID_CREDENTIAL" | "INVALID_EMAIL" => {
            AuthErrorCode::InvalidCredential
        }
        "USER_DISABLED" => AuthErrorCode::UserDisabled,
        "WEAK_PASSWORD" => AuthErrorCode::WeakPassword,
        "TOO_MANY_ATTEMPTS_TRY_LATER" | "TOO_MANY_REQUESTS" => AuthErrorCode::TooManyRequests,
        _ => AuthErrorCode::Unknown,
    }
}

// Identity toolkit REST client

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetails,
}

#[derive(Debug, Deserialize)]
struct ErrorDetails {
    message: String,
}

pub struct IdentityToolkitProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl IdentityToolkitProvider {
    pub fn new(config: &AuthConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn call(&self, method: &str, body: &PasswordRequest<'_>) -> Result<Account, AuthFailure> {
        let url = format!("{}/accounts:{}", self.base_url, method);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(provider = "identity_toolkit", method, error = %e, "Identity request failed");
                AuthFailure::new(AuthErrorCode::Unknown)
            })?;

        let status = response.status();
        if status.is_success() {
            let account: AccountResponse = response.json().await.map_err(|e| {
                warn!(provider = "identity_toolkit", method, error = %e, "Unreadable identity response");
                AuthFailure::new(AuthErrorCode::Unknown)
            })?;
            return Ok(Account {
                uid: account.local_id,
                email: account.email,
                display_name: account.display_name.filter(|n| !n.is_empty()),
            });
        }

        let message = response
            .json::<ErrorResponse>()
            .await
            .map(|e| e.error.message)
            .unwrap_or_else(|_| status.to_string());
        let code = error_code_for(&message);
        if code == AuthErrorCode::Unknown {
            warn!(provider = "identity_toolkit", method, status = status.as_u16(), message = %message, "Unmapped identity error");
        }
        Err(AuthFailure::new(code))
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitProvider {
    fn name(&self) -> &'static str {
        "identity_toolkit"
    }

    async fn sign_up(&self, request: &SignupRequest) -> Result<Account, AuthFailure> {
        let body = PasswordRequest {
            email: &request.email,
            password: &request.password,
            display_name: request.display_name.as_deref(),
            return_secure_token: true,
        };
        self.call("signUp", &body).await
    }

    async fn sign_in(&self, request: &LoginRequest) -> Result<Account, AuthFailure> {
        let body = PasswordRequest {
            email: &request.email,
            password: &request.password,
            display_name: None,
            return_secure_token: true,
        };
        self.call("signInWithPassword", &body).await
    }
}

// In-process accounts

struct LocalAccount {
    account: Account,
    password_hash: String,
    disabled: bool,
}

/// Accounts held in memory, keyed by lower-cased email. Lost on restart.
#[derive(Default)]
pub struct LocalIdentityProvider {
    accounts: RwLock<HashMap<String, LocalAccount>>,
}

impl LocalIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks further sign-ins for `email`. Returns false if unknown.
    pub async fn disable(&self, email: &str) -> bool {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(&email.trim().to_lowercase()) {
            Some(local) => {
                local.disabled = true;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn sign_up(&self, request: &SignupRequest) -> Result<Account, AuthFailure> {
        if !is_strong_enough(&request.password) {
            return Err(AuthFailure::with_message(
                AuthErrorCode::WeakPassword,
                format!("Password should be at least {} characters", MIN_PASSWORD_LENGTH),
            ));
        }

        let key = request.email.trim().to_lowercase();
        if self.accounts.read().await.contains_key(&key) {
            return Err(AuthFailure::new(AuthErrorCode::EmailAlreadyInUse));
        }

        let password_hash = hash_password(&request.password).map_err(|e| {
            warn!(provider = "local", error = %e, "Password hashing failed");
            AuthFailure::new(AuthErrorCode::Unknown)
        })?;

        let account = Account {
            uid: persistence::store::generate_id(),
            email: request.email.trim().to_string(),
            display_name: request.display_name.clone(),
        };

        let mut accounts = self.accounts.write().await;
        // Re-checked under the write lock; another signup may have won.
        if accounts.contains_key(&key) {
            return Err(AuthFailure::new(AuthErrorCode::EmailAlreadyInUse));
        }
        accounts.insert(
            key,
            LocalAccount {
                account: account.clone(),
                password_hash,
                disabled: false,
            },
        );

        info!(provider = "local", uid = %account.uid, "Account created");
        Ok(account)
    }

    async fn sign_in(&self, request: &LoginRequest) -> Result<Account, AuthFailure> {
        let key = request.email.trim().to_lowercase();
        let accounts = self.accounts.read().await;
        let local = accounts
            .get(&key)
            .ok_or_else(|| AuthFailure::new(AuthErrorCode::UserNotFound))?;

        if local.disabled {
            return Err(AuthFailure::new(AuthErrorCode::UserDisabled));
        }

        match verify_password(&request.password, &local.password_hash) {
            Ok(true) => Ok(local.account.clone()),
            Ok(false) => Err(AuthFailure::new(AuthErrorCode::WrongPassword)),
            Err(e) => {
                warn!(provider = "local", error = %e, "Stored password hash unreadable");
                Err(AuthFailure::new(AuthErrorCode::Unknown))
            }
        }
    }
}
