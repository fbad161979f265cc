use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    /// JWT session configuration
    pub jwt: JwtAuthConfig,
    /// Outbound email configuration
    #[serde(default)]
    pub email: EmailConfig,
    /// Admin account bootstrap
    #[serde(default)]
    pub admin: AdminBootstrapConfig,
    /// Background job tuning
    #[serde(default)]
    pub jobs: JobsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
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

impl DatabaseConfig {
    /// Pool settings for the persistence layer.
    pub fn pool_config(&self) -> persistence::db::DatabaseConfig {
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
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Per-IP attempts per minute on the auth endpoints; 0 disables limiting
    #[serde(default = "default_auth_rate_limit")]
    pub auth_rate_limit_per_minute: u32,

    /// Mark the session cookie `Secure` (HTTPS only)
    #[serde(default)]
    pub secure_cookies: bool,

    /// Take the client address from `X-Forwarded-For`. Only enable behind a
    /// proxy that overwrites the header; otherwise clients can pick their
    /// own rate-limit bucket.
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_request_timeout() -> u64 {
    30
}
fn default_shutdown_timeout() -> u64 {
    10
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
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_auth_rate_limit() -> u32 {
    20
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtAuthConfig {
    /// HMAC secret used to sign session tokens (HS256)
    pub secret: String,

    /// Session lifetime in days; also the cookie max-age
    #[serde(default = "default_token_expiry_days")]
    pub token_expiry_days: i64,

    /// Leeway in seconds for clock skew tolerance
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

impl JwtAuthConfig {
    pub fn token_expiry_secs(&self) -> i64 {
        self.token_expiry_days * 24 * 60 * 60
    }
}

fn default_token_expiry_days() -> i64 {
    7
}

fn default_jwt_leeway() -> u64 {
    30
}

/// Outbound email configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// When false, messages are accepted and dropped
    #[serde(default)]
    pub enabled: bool,

    /// Email provider: console or sendgrid
    #[serde(default = "default_email_provider")]
    pub provider: String,

    /// SendGrid API key (for sendgrid provider)
    #[serde(default)]
    pub sendgrid_api_key: String,

    /// Sender email address (From header)
    #[serde(default = "default_sender_email")]
    pub sender_email: String,

    /// Sender name (From header)
    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    /// Operator inbox for signups, requests, purchases and deletion requests
    #[serde(default = "default_operator_email")]
    pub operator_email: String,

    /// Public frontend URL used to build password reset links
    #[serde(default = "default_app_url")]
    pub app_url: String,
}

impl EmailConfig {
    /// Reset link for a raw token.
    pub fn reset_link(&self, token: &str) -> String {
        format!(
            "{}/reset-password?token={}",
            self.app_url.trim_end_matches('/'),
            token
        )
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_email_provider(),
            sendgrid_api_key: String::new(),
            sender_email: default_sender_email(),
            sender_name: default_sender_name(),
            operator_email: default_operator_email(),
            app_url: default_app_url(),
        }
    }
}

fn default_email_provider() -> String {
    "console".to_string()
}

fn default_sender_email() -> String {
    "noreply@cinematic.local".to_string()
}

fn default_sender_name() -> String {
    "Cinematic".to_string()
}

fn default_operator_email() -> String {
    "operator@cinematic.local".to_string()
}

fn default_app_url() -> String {
    "http://localhost:5173".to_string()
}

/// Admin account ensured at startup. Both fields must be set to take effect.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminBootstrapConfig {
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_admin_name")]
    pub full_name: String,
}

impl Default for AdminBootstrapConfig {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            full_name: default_admin_name(),
        }
    }
}

impl AdminBootstrapConfig {
    pub fn is_configured(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

/// Background job configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    /// Start the job scheduler with the server
    #[serde(default = "default_jobs_enabled")]
    pub enabled: bool,

    /// Maximum outbox rows claimed per run
    #[serde(default = "default_outbox_batch_size")]
    pub outbox_batch_size: i64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            enabled: default_jobs_enabled(),
            outbox_batch_size: default_outbox_batch_size(),
        }
    }
}

fn default_jobs_enabled() -> bool {
    true
}

fn default_outbox_batch_size() -> i64 {
    50
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with CP__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("CP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("security.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Defaults are embedded so tests do not depend on config files.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "127.0.0.1"
            port = 5000
            request_timeout_secs = 30
            shutdown_timeout_secs = 5

            [database]
            url = ""
            max_connections = 5
            min_connections = 1
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "pretty"

            [security]
            cors_origins = []
            auth_rate_limit_per_minute = 0
            secure_cookies = false
            trust_forwarded_for = false

            [jwt]
            secret = "test-secret-at-least-sixteen-bytes"
            token_expiry_days = 7
            leeway_secs = 30

            [email]
            enabled = false
            provider = "console"
            sender_email = "noreply@test.local"
            sender_name = "Test"
            operator_email = "operator@test.local"
            app_url = "http://localhost:5173"

            [jobs]
            enabled = false
            outbox_batch_size = 10
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        // Skip validation to allow partial configs
        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "CP__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.jwt.secret.len() < shared::jwt::MIN_SECRET_LEN {
            return Err(ConfigValidationError::InvalidValue(format!(
                "CP__JWT__SECRET must be at least {} bytes",
                shared::jwt::MIN_SECRET_LEN
            )));
        }

        if self.jwt.token_expiry_days <= 0 {
            return Err(ConfigValidationError::InvalidValue(
                "jwt.token_expiry_days must be positive".to_string(),
            ));
        }

        if self.email.enabled
            && self.email.provider == "sendgrid"
            && self.email.sendgrid_api_key.is_empty()
        {
            return Err(ConfigValidationError::MissingRequired(
                "CP__EMAIL__SENDGRID_API_KEY is required for the sendgrid provider".to_string(),
            ));
        }

        if self.jobs.outbox_batch_size <= 0 {
            return Err(ConfigValidationError::InvalidValue(
                "jobs.outbox_batch_size must be positive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
