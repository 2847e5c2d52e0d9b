//! Application configuration
//!
//! Loaded from a TOML file (default `~/.config/seller-dashboard/config.toml`).
//! Every section falls back to its defaults, so a missing file or a partial
//! file is fine. A few environment variables override the file afterwards.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::domain::{FeeSchedule, QuotaPolicy, UNLIMITED_USAGE_PRODUCT};
use crate::infrastructure::crypto::jwt::{JwtConfig, DEFAULT_JWT_SECRET};
use crate::infrastructure::DatabaseConfig;

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "SELLER_DASHBOARD_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub security: SecuritySection,
    pub cors: CorsSection,
    pub rate_limit: RateLimitSection,
    pub logging: LoggingSection,
    pub quota: QuotaSection,
    pub fees: FeesSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// `development` or `production`
    pub environment: String,
    /// Serve Swagger UI at /docs. Unset means on outside production.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_enabled: Option<bool>,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            environment: "development".to_string(),
            docs_enabled: None,
            shutdown_timeout: 30,
        }
    }
}

impl ServerSection {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Whether Swagger UI is served, after the environment default.
    pub fn docs_enabled(&self) -> bool {
        self.docs_enabled.unwrap_or(!self.is_production())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let db = DatabaseConfig::default();
        Self {
            url: db.url,
            max_connections: db.max_connections,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySection {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub jwt_issuer: String,
}

impl Default for SecuritySection {
    fn default() -> Self {
        let jwt = JwtConfig::default();
        Self {
            jwt_secret: jwt.secret,
            jwt_expiration_hours: jwt.expiration_hours,
            jwt_issuer: jwt.issuer,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsSection {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsSection {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:8501".to_string(),
                "https://etsydashboard.streamlit.app".to_string(),
                "https://etsydashboard.com".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSection {
    /// Per client IP. 0 disables the limiter.
    pub requests_per_minute: u32,
}

impl Default for RateLimitSection {
    fn default() -> Self {
        Self {
            requests_per_minute: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// EnvFilter directive; RUST_LOG takes precedence
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaSection {
    pub free_tier_limit: u32,
    pub reset_period_days: i64,
    /// Product id that lifts the quota entirely
    pub unlimited_product: String,
}

impl Default for QuotaSection {
    fn default() -> Self {
        let policy = QuotaPolicy::default();
        Self {
            free_tier_limit: policy.free_tier_limit,
            reset_period_days: policy.reset_period_days,
            unlimited_product: UNLIMITED_USAGE_PRODUCT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeesSection {
    pub currency: String,
    pub listing_fee: Decimal,
    pub transaction_rate: Decimal,
    pub payment_processing_rate: Decimal,
    pub payment_processing_flat_fee: Decimal,
    pub offsite_ads_standard_rate: Decimal,
    pub offsite_ads_reduced_rate: Decimal,
    pub offsite_ads_reduced_threshold: Decimal,
}

impl Default for FeesSection {
    fn default() -> Self {
        let schedule = FeeSchedule::default();
        Self {
            currency: schedule.currency,
            listing_fee: schedule.listing_fee,
            transaction_rate: schedule.transaction_rate,
            payment_processing_rate: schedule.payment_processing_rate,
            payment_processing_flat_fee: schedule.payment_processing_flat_fee,
            offsite_ads_standard_rate: schedule.offsite_ads_standard_rate,
            offsite_ads_reduced_rate: schedule.offsite_ads_reduced_rate,
            offsite_ads_reduced_threshold: schedule.offsite_ads_reduced_threshold,
        }
    }
}

impl AppConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Write the config as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Apply `DATABASE_URL`, `JWT_SECRET`, `ENVIRONMENT` and `PORT`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.security.jwt_secret = secret;
        }
        if let Some(env) = lookup("ENVIRONMENT") {
            self.server.environment = env;
        }
        if let Some(port) = lookup("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(value = %port, "Ignoring invalid PORT"),
            }
        }
    }

    /// Reject settings the service cannot run with.
    ///
    /// In production the default JWT secret and an empty database URL are
    /// errors; in development they only warn.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut critical = Vec::new();
        if self.security.jwt_secret == DEFAULT_JWT_SECRET || self.security.jwt_secret.is_empty() {
            critical.push("security.jwt_secret must be changed from the default");
        }
        if self.database.url.trim().is_empty() {
            critical.push("database.url must be set");
        }
        if !critical.is_empty() {
            if self.server.is_production() {
                return Err(ConfigError::Invalid(critical.join("; ")));
            }
            for issue in &critical {
                warn!("{} (tolerated outside production)", issue);
            }
        }

        if self.quota.free_tier_limit == 0 {
            return Err(ConfigError::Invalid(
                "quota.free_tier_limit must be at least 1".into(),
            ));
        }
        if self.quota.reset_period_days < 1 {
            return Err(ConfigError::Invalid(
                "quota.reset_period_days must be at least 1".into(),
            ));
        }
        if self.quota.unlimited_product.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "quota.unlimited_product must not be empty".into(),
            ));
        }
        if self.security.jwt_expiration_hours < 1 {
            return Err(ConfigError::Invalid(
                "security.jwt_expiration_hours must be at least 1".into(),
            ));
        }

        self.fee_schedule()
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("fees: {}", e)))?;

        Ok(())
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections.max(1),
        }
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.security.jwt_secret.clone(),
            expiration_hours: self.security.jwt_expiration_hours,
            issuer: self.security.jwt_issuer.clone(),
        }
    }

    pub fn quota_policy(&self) -> QuotaPolicy {
        QuotaPolicy {
            free_tier_limit: self.quota.free_tier_limit,
            reset_period_days: self.quota.reset_period_days,
        }
    }

    pub fn fee_schedule(&self) -> FeeSchedule {
        let f = &self.fees;
        FeeSchedule {
            currency: f.currency.clone(),
            listing_fee: f.listing_fee,
            transaction_rate: f.transaction_rate,
            payment_processing_rate: f.payment_processing_rate,
            payment_processing_flat_fee: f.payment_processing_flat_fee,
            offsite_ads_standard_rate: f.offsite_ads_standard_rate,
            offsite_ads_reduced_rate: f.offsite_ads_reduced_rate,
            offsite_ads_reduced_threshold: f.offsite_ads_reduced_threshold,
        }
    }
}

/// `~/.config/seller-dashboard/config.toml`, or `./config.toml` when no
/// config directory can be determined.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("seller-dashboard").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// Config path from `SELLER_DASHBOARD_CONFIG`, else the default.
pub fn config_path_from_env() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_config_path())
}
