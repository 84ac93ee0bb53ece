//! OAuth2 access tokens for Google APIs from a service account key.
//!
//! Tokens are minted with the JWT bearer grant and cached until shortly
//! before they expire.

use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Refresh this long before the token actually expires.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Requested token lifetime.
const TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum GoogleAuthError {
    #[error("Failed to parse credentials: {0}")]
    Credentials(String),

    #[error("Failed to sign assertion: {0}")]
    Signing(String),

    #[error("Token request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token exchange rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    token_uri: String,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Mints and caches access tokens for one scope.
pub struct ServiceAccountTokenSource {
    client: Client,
    key: ServiceAccountKey,
    scope: String,
    cache: RwLock<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    /// `credentials` is either the key JSON itself or a path to the key file.
    pub fn new(
        client: Client,
        credentials: &str,
        scope: impl Into<String>,
    ) -> Result<Self, GoogleAuthError> {
        Ok(Self {
            client,
            key: load_key(credentials)?,
            scope: scope.into(),
            cache: RwLock::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Returns a valid access token, fetching a new one when needed.
    pub async fn token(&self) -> Result<String, GoogleAuthError> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.expires_at > Instant::now() + EXPIRY_MARGIN {
                return Ok(cached.access_token.clone());
            }
        }

        let fresh = self.fetch().await?;
        let token = fresh.access_token.clone();
        *self.cache.write().await = Some(fresh);
        Ok(token)
    }

    async fn fetch(&self) -> Result<CachedToken, GoogleAuthError> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };

        let encoding_key = jsonwebtoken::EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| GoogleAuthError::Signing(format!("Invalid private key: {}", e)))?;
        let assertion = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256),
            &claims,
            &encoding_key,
        )
        .map_err(|e| GoogleAuthError::Signing(e.to_string()))?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleAuthError::Rejected(body));
        }

        let token: TokenResponse = response.json().await?;
        tracing::debug!(
            client_email = %self.key.client_email,
            expires_in = token.expires_in,
            "Fetched Google access token"
        );
        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }
}

fn load_key(source: &str) -> Result<ServiceAccountKey, GoogleAuthError> {
    let json = if source.trim_start().starts_with('{') {
        source.to_string()
    } else {
        std::fs::read_to_string(source).map_err(|e| {
            GoogleAuthError::Credentials(format!("Failed to read credentials file: {}", e))
        })?
    };
    serde_json::from_str(&json)
        .map_err(|e| GoogleAuthError::Credentials(format!("Invalid credentials JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_inline_key() {
        let key = load_key(
            r#"{"client_email":"svc@bpjp.iam.gserviceaccount.com","private_key":"pem","token_uri":"https://oauth2.googleapis.com/token","project_id":"bpjp"}"#,
        )
        .unwrap();
        assert_eq!(key.client_email, "svc@bpjp.iam.gserviceaccount.com");
    }

    #[test]
    fn test_missing_key_file() {
        let err = load_key("/nonexistent/bpjp-key.json").unwrap_err();
        assert!(matches!(err, GoogleAuthError::Credentials(_)));
    }

    #[test]
    fn test_incomplete_key_rejected() {
        assert!(load_key(r#"{"client_email":"svc@bpjp"}"#).is_err());
    }
}
