use persistence::BlobConfig;
use serde::Deserialize;
use shared::jwt::{JwtConfig, JwtError};
use std::net::{AddrParseError, SocketAddr};

use domain::services::listing::ViewLimits;

/// Application configuration.
///
/// Loaded from `config/default.toml`, an optional `config/local.toml` and
/// `BPJP__`-prefixed environment variables, in that order.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    pub jwt: JwtAuthConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Upper bound for request bodies, uploads included.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            max_body_size: default_max_body_size(),
        }
    }
}

/// Which document store backs the collections.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// `memory`, `postgres` or `firestore`.
    #[serde(default = "default_store_backend")]
    pub backend: String,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub firestore: FirestoreSettings,

    /// Collections the memory backend refuses, emulating security rules.
    #[serde(default)]
    pub denied_collections: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            database: DatabaseConfig::default(),
            firestore: FirestoreSettings::default(),
            denied_collections: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

impl DatabaseConfig {
    pub fn to_pool_config(&self) -> persistence::db::DatabaseConfig {
        persistence::db::DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreSettings {
    #[serde(default)]
    pub project_id: String,

    #[serde(default = "default_firestore_database")]
    pub database_id: String,

    #[serde(default = "default_firestore_base_url")]
    pub base_url: String,

    /// Service account key JSON or a path to it; empty means unauthenticated
    /// (emulator only).
    #[serde(default)]
    pub credentials: String,

    #[serde(default = "default_firestore_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for FirestoreSettings {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            database_id: default_firestore_database(),
            base_url: default_firestore_base_url(),
            credentials: String::new(),
            timeout_ms: default_firestore_timeout_ms(),
        }
    }
}

impl FirestoreSettings {
    pub fn to_store_config(&self) -> persistence::store::FirestoreConfig {
        persistence::store::FirestoreConfig {
            project_id: self.project_id.clone(),
            database_id: self.database_id.clone(),
            base_url: self.base_url.clone(),
            credentials: Some(self.credentials.clone()).filter(|c| !c.trim().is_empty()),
            timeout_ms: self.timeout_ms,
        }
    }
}

/// Object storage for attachments.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// `memory`, `fs` or `s3`.
    #[serde(default = "default_storage_backend")]
    pub backend: String,

    #[serde(default)]
    pub root: String,

    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub bucket: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default)]
    pub access_key_id: String,

    #[serde(default)]
    pub secret_access_key: String,

    /// Prefix joined with a blob path to form its download URL.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            root: String::new(),
            endpoint: String::new(),
            bucket: String::new(),
            region: default_region(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            public_base_url: default_public_base_url(),
        }
    }
}

impl StorageConfig {
    pub fn blob_config(&self) -> Result<BlobConfig, ConfigValidationError> {
        match self.backend.as_str() {
            "memory" => Ok(BlobConfig::Memory),
            "fs" => Ok(BlobConfig::Fs {
                root: self.root.clone(),
            }),
            "s3" => Ok(BlobConfig::S3 {
                endpoint: self.endpoint.clone(),
                bucket: self.bucket.clone(),
                region: self.region.clone(),
                access_key_id: self.access_key_id.clone(),
                secret_access_key: self.secret_access_key.clone(),
            }),
            other => Err(ConfigValidationError::InvalidValue(format!(
                "Unknown storage backend '{}' (expected memory, fs or s3)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Requests per minute per client on the auth routes; 0 disables.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            rate_limit_per_minute: default_rate_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl LimitsConfig {
    pub fn view_limits(&self) -> ViewLimits {
        ViewLimits {
            default_per_page: self.default_page_size,
            max_per_page: self.max_page_size,
        }
    }
}

/// Session token signing. Set either `secret` (HS256) or both PEM keys
/// (RS256); the key pair wins when both are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JwtAuthConfig {
    #[serde(default)]
    pub secret: String,

    #[serde(default)]
    pub private_key: String,

    #[serde(default)]
    pub public_key: String,

    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: i64,

    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

impl JwtAuthConfig {
    fn has_key_pair(&self) -> bool {
        !self.private_key.trim().is_empty() && !self.public_key.trim().is_empty()
    }

    pub fn build(&self) -> Result<JwtConfig, JwtError> {
        if self.has_key_pair() {
            JwtConfig::from_rsa_pem(
                &self.private_key,
                &self.public_key,
                self.access_token_expiry_secs,
                self.leeway_secs,
            )
        } else {
            JwtConfig::from_secret(&self.secret, self.access_token_expiry_secs, self.leeway_secs)
        }
    }
}

/// Identity provider settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// `local` (in-process accounts) or `identity_toolkit`.
    #[serde(default = "default_auth_provider")]
    pub provider: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_identity_toolkit_url")]
    pub base_url: String,

    #[serde(default = "default_auth_timeout_ms")]
    pub timeout_ms: u64,

    /// Accounts with these emails receive the admin role.
    #[serde(default)]
    pub admin_emails: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            provider: default_auth_provider(),
            api_key: String::new(),
            base_url: default_identity_toolkit_url(),
            timeout_ms: default_auth_timeout_ms(),
            admin_emails: Vec::new(),
        }
    }
}

impl AuthConfig {
    pub fn is_admin(&self, email: &str) -> bool {
        self.admin_emails
            .iter()
            .any(|admin| admin.trim().eq_ignore_ascii_case(email.trim()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Initial display name; admins can change it at runtime.
    #[serde(default = "default_display_name")]
    pub display_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            display_name: default_display_name(),
        }
    }
}

/// Generative model used by the recommendation flow.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_ai_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_ai_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_ai_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_ai_endpoint(),
            model: default_ai_model(),
            api_key: String::new(),
            timeout_ms: default_ai_timeout_ms(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_body_size() -> usize {
    10 * 1_048_576
}
fn default_store_backend() -> String {
    "memory".to_string()
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    2
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_firestore_database() -> String {
    "(default)".to_string()
}
fn default_firestore_base_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}
fn default_firestore_timeout_ms() -> u64 {
    10_000
}
fn default_storage_backend() -> String {
    "memory".to_string()
}
fn default_region() -> String {
    "auto".to_string()
}
fn default_public_base_url() -> String {
    "http://localhost:8080/files".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_rate_limit() -> u32 {
    30
}
fn default_page_size() -> usize {
    shared::pagination::DEFAULT_PAGE_SIZE
}
fn default_max_page_size() -> usize {
    shared::pagination::MAX_PAGE_SIZE
}
fn default_max_upload_bytes() -> usize {
    5 * 1_048_576
}
fn default_access_token_expiry() -> i64 {
    3600 // 1 hour
}
fn default_jwt_leeway() -> u64 {
    shared::jwt::DEFAULT_LEEWAY_SECS
}
fn default_auth_provider() -> String {
    "local".to_string()
}
fn default_identity_toolkit_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}
fn default_auth_timeout_ms() -> u64 {
    10_000
}
fn default_display_name() -> String {
    domain::models::settings::DEFAULT_DISPLAY_NAME.to_string()
}
fn default_ai_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_ai_model() -> String {
    "gemini-1.5-flash".to_string()
}
fn default_ai_timeout_ms() -> u64 {
    20_000
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("BPJP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auth.admin_emails")
                    .with_list_parse_key("security.cors_origins")
                    .with_list_parse_key("store.denied_collections")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [store]
            backend = "memory"

            [logging]
            level = "info"
            format = "json"

            [jwt]
            secret = "test-secret-at-least-16-bytes"
            access_token_expiry_secs = 3600
            leeway_secs = 30
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        match self.store.backend.as_str() {
            "memory" => {}
            "postgres" => {
                if self.store.database.url.is_empty() {
                    return Err(ConfigValidationError::MissingRequired(
                        "BPJP__STORE__DATABASE__URL must be set for the postgres backend".to_string(),
                    ));
                }
                if self.store.database.min_connections > self.store.database.max_connections {
                    return Err(ConfigValidationError::InvalidValue(
                        "min_connections cannot exceed max_connections".to_string(),
                    ));
                }
            }
            "firestore" => {
                if self.store.firestore.project_id.is_empty() {
                    return Err(ConfigValidationError::MissingRequired(
                        "BPJP__STORE__FIRESTORE__PROJECT_ID must be set for the firestore backend"
                            .to_string(),
                    ));
                }
            }
            other => {
                return Err(ConfigValidationError::InvalidValue(format!(
                    "Unknown store backend '{}' (expected memory, postgres or firestore)",
                    other
                )))
            }
        }

        match self.storage.blob_config()? {
            BlobConfig::Fs { root } if root.is_empty() => {
                return Err(ConfigValidationError::MissingRequired(
                    "BPJP__STORAGE__ROOT must be set for the fs storage backend".to_string(),
                ))
            }
            BlobConfig::S3 { bucket, .. } if bucket.is_empty() => {
                return Err(ConfigValidationError::MissingRequired(
                    "BPJP__STORAGE__BUCKET must be set for the s3 storage backend".to_string(),
                ))
            }
            _ => {}
        }

        if !self.jwt.has_key_pair() && self.jwt.secret.len() < 16 {
            return Err(ConfigValidationError::MissingRequired(
                "BPJP__JWT__SECRET (16+ bytes) or an RS256 key pair must be set".to_string(),
            ));
        }

        match self.auth.provider.as_str() {
            "local" => {}
            "identity_toolkit" => {
                if self.auth.api_key.is_empty() {
                    return Err(ConfigValidationError::MissingRequired(
                        "BPJP__AUTH__API_KEY must be set for the identity_toolkit provider"
                            .to_string(),
                    ));
                }
            }
            other => {
                return Err(ConfigValidationError::InvalidValue(format!(
                    "Unknown auth provider '{}' (expected local or identity_toolkit)",
                    other
                )))
            }
        }

        if self.ai.enabled && self.ai.api_key.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "BPJP__AI__API_KEY must be set when ai.enabled is true".to_string(),
            ));
        }

        if self.limits.default_page_size == 0
            || self.limits.default_page_size > self.limits.max_page_size
        {
            return Err(ConfigValidationError::InvalidValue(
                "default_page_size must be between 1 and max_page_size".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
