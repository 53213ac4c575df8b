//! Application configuration
//!
//! Loaded from a TOML file (default `~/.config/plugspot/config.toml`).
//! Every section is optional; missing keys fall back to development
//! defaults. Secrets can be supplied through environment variables instead
//! of the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_JWT_SECRET: &str = "change-me-plugspot-dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Default config location: `<config_dir>/plugspot/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("plugspot")
        .join("config.toml")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Development,
    Test,
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub payments: PaymentsConfig,
    pub email: EmailConfig,
    pub scheduling: SchedulingConfig,
    pub browse: BrowseConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for in-flight work on shutdown
    pub shutdown_timeout: u64,
    /// Public URL of the web app, used for Connect redirects and email links
    pub public_base_url: String,
    /// Allowed CORS origins; empty allows any
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 3001,
            shutdown_timeout: 30,
            public_base_url: "http://localhost:5173".to_string(),
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub backend: DatabaseBackend,
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::Sqlite,
            url: "sqlite://./plugspot.db?mode=rwc".to_string(),
        }
    }
}

impl DatabaseSettings {
    pub fn connection_url(&self) -> String {
        self.url.clone()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `plugspot=debug,tower_http=info`
    pub level: String,
    /// `plain` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "plain".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_expiration_hours: 24,
            bcrypt_cost: 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    Stripe,
    /// In-process gateway that approves every intent. Never allowed in production.
    #[default]
    Mock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentsConfig {
    pub mode: PaymentMode,
    pub stripe_secret_key: String,
    pub webhook_secret: String,
    pub connect_client_id: String,
    pub currency: String,
    pub api_base: String,
    pub connect_base: String,
    /// Maximum age of a webhook signature timestamp, in seconds
    pub webhook_tolerance_secs: i64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            mode: PaymentMode::Mock,
            stripe_secret_key: String::new(),
            webhook_secret: String::new(),
            connect_client_id: String::new(),
            currency: "usd".to_string(),
            api_base: "https://api.stripe.com".to_string(),
            connect_base: "https://connect.stripe.com".to_string(),
            webhook_tolerance_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailMode {
    Resend,
    /// Log emails instead of sending them
    #[default]
    Log,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub mode: EmailMode,
    pub resend_api_key: String,
    pub from: String,
    pub api_base: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            mode: EmailMode::Log,
            resend_api_key: String::new(),
            from: "PlugSpot <onboarding@resend.dev>".to_string(),
            api_base: "https://api.resend.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Period of the booking status / reminder task
    pub status_check_interval_secs: u64,
    /// Send the reminder email this many hours before start
    pub reminder_lead_hours: i64,
    /// Offset of the marketplace's local time from UTC, used for slot hours
    pub utc_offset_minutes: i32,
    /// Bookable durations in hours
    pub allowed_durations: Vec<u32>,
    pub day_start_hour: u32,
    pub day_end_hour: u32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            status_check_interval_secs: 60,
            reminder_lead_hours: 24,
            utc_offset_minutes: 0,
            allowed_durations: vec![1, 2, 4, 8],
            day_start_hour: 6,
            day_end_hour: 22,
        }
    }
}

/// Origin used for distance sorting when the client sends none
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseConfig {
    pub default_latitude: f64,
    pub default_longitude: f64,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        // Palo Alto, CA
        Self {
            default_latitude: 37.4419,
            default_longitude: -122.143,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: "admin@plugspot.local".to_string(),
            name: "PlugSpot Admin".to_string(),
            password: "admin123".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply environment
    /// overrides. A missing file yields defaults plus overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml(&raw)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Secrets and the database URL may come from the environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("STRIPE_SECRET_KEY") {
            self.payments.stripe_secret_key = v;
        }
        if let Some(v) = get("STRIPE_WEBHOOK_SECRET") {
            self.payments.webhook_secret = v;
        }
        if let Some(v) = get("STRIPE_CONNECT_CLIENT_ID") {
            self.payments.connect_client_id = v;
        }
        if let Some(v) = get("RESEND_API_KEY") {
            self.email.resend_api_key = v;
        }
        if let Some(v) = get("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = get("DATABASE_URL") {
            self.database.url = v;
        }
    }

    /// Reject configurations that cannot run safely.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.scheduling;
        if s.day_start_hour > s.day_end_hour || s.day_end_hour > 23 {
            return Err(ConfigError::Invalid(format!(
                "scheduling window {}..={} is not a valid hour range",
                s.day_start_hour, s.day_end_hour
            )));
        }
        if s.allowed_durations.is_empty() || s.allowed_durations.contains(&0) {
            return Err(ConfigError::Invalid(
                "scheduling.allowed_durations must be non-empty positive hours".to_string(),
            ));
        }
        if s.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::Invalid(
                "scheduling.utc_offset_minutes must be within one day".to_string(),
            ));
        }
        if self.security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "security.jwt_secret must not be empty".to_string(),
            ));
        }
        if !(4..=31).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::Invalid(
                "security.bcrypt_cost must be between 4 and 31".to_string(),
            ));
        }
        if self.payments.mode == PaymentMode::Stripe && self.payments.stripe_secret_key.is_empty() {
            return Err(ConfigError::Invalid(
                "payments.mode = \"stripe\" requires STRIPE_SECRET_KEY".to_string(),
            ));
        }
        if self.email.mode == EmailMode::Resend && self.email.resend_api_key.is_empty() {
            return Err(ConfigError::Invalid(
                "email.mode = \"resend\" requires RESEND_API_KEY".to_string(),
            ));
        }

        if self.environment == Environment::Production {
            if self.payments.mode == PaymentMode::Mock {
                return Err(ConfigError::Invalid(
                    "mock payments are not allowed in production".to_string(),
                ));
            }
            if self.security.jwt_secret == DEFAULT_JWT_SECRET {
                return Err(ConfigError::Invalid(
                    "set security.jwt_secret (or JWT_SECRET) in production".to_string(),
                ));
            }
            if self.payments.webhook_secret.is_empty() {
                return Err(ConfigError::Invalid(
                    "set STRIPE_WEBHOOK_SECRET in production".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg.environment, Environment::Development);
        assert_eq!(cfg.server.api_port, 3001);
        assert_eq!(cfg.scheduling.allowed_durations, vec![1, 2, 4, 8]);
        assert_eq!(cfg.payments.mode, PaymentMode::Mock);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_sections_are_merged_with_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [server]
            api_port = 8080

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.api_port, 8080);
        assert_eq!(cfg.server.api_host, "0.0.0.0");
        assert_eq!(cfg.logging.format, "json");
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn mock_payments_rejected_in_production() {
        let mut cfg = AppConfig::from_toml(
            r#"
            environment = "production"
            [security]
            jwt_secret = "prod-secret"
            [payments]
            mode = "mock"
            webhook_secret = "whsec_x"
            "#,
        )
        .unwrap();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("mock payments"));

        cfg.payments.mode = PaymentMode::Stripe;
        cfg.payments.stripe_secret_key = "sk_live_x".into();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn default_jwt_secret_rejected_in_production() {
        let mut cfg = AppConfig::default();
        cfg.environment = Environment::Production;
        cfg.payments.mode = PaymentMode::Stripe;
        cfg.payments.stripe_secret_key = "sk_live_x".into();
        cfg.payments.webhook_secret = "whsec_x".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn stripe_mode_requires_key() {
        let mut cfg = AppConfig::default();
        cfg.payments.mode = PaymentMode::Stripe;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn env_overrides_replace_secrets() {
        let mut cfg = AppConfig::default();
        cfg.apply_overrides(|key| match key {
            "STRIPE_SECRET_KEY" => Some("sk_test_123".to_string()),
            "DATABASE_URL" => Some("sqlite::memory:".to_string()),
            "JWT_SECRET" => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(cfg.payments.stripe_secret_key, "sk_test_123");
        assert_eq!(cfg.database.url, "sqlite::memory:");
        assert_eq!(cfg.security.jwt_secret, DEFAULT_JWT_SECRET);
    }

    #[test]
    fn invalid_window_rejected() {
        let mut cfg = AppConfig::default();
        cfg.scheduling.day_start_hour = 23;
        cfg.scheduling.day_end_hour = 6;
        assert!(cfg.validate().is_err());
    }
}
