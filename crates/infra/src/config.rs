//! Process configuration.
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. `config/default.toml` (optional)
//! 3. `config/{environment}.toml` (optional)
//! 4. environment variables `CHARIOT__*` (e.g. `CHARIOT__PORT=9000`)

use std::env;

use chrono::{Duration, FixedOffset};
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::Deserialize;
use thiserror::Error;

const CONFIG_DIR: &str = "config";
const DEV_ENV: &str = "development";
const DEV_JWT_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    /// When set, documents live in Postgres; otherwise in memory.
    #[serde(default)]
    pub database_url: Option<String>,
    pub max_db_connections: u32,
    #[serde(default)]
    pub jwt_secret: Option<String>,
    pub token_ttl_minutes: i64,
    /// JSON seed applied to empty collections at startup.
    #[serde(default)]
    pub seed_path: Option<String>,
    /// Printed under the report title.
    pub unit_name: String,
    /// Wall-clock offset used for report timestamps.
    pub report_utc_offset_minutes: i32,
}

impl AppConfig {
    /// Load from the standard sources.
    pub fn load() -> Result<Self, ConfigError> {
        let environment = env::var("CHARIOT__ENVIRONMENT").unwrap_or_else(|_| DEV_ENV.to_string());
        tracing::info!(environment = %environment, "loading configuration");

        let config = defaults()?
            .add_source(File::with_name(&format!("{CONFIG_DIR}/default")).required(false))
            .add_source(File::with_name(&format!("{CONFIG_DIR}/{environment}")).required(false))
            .add_source(Environment::with_prefix("CHARIOT").separator("__"))
            .build()?;

        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self, ConfigError> {
        let cfg: AppConfig = config.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn is_development(&self) -> bool {
        self.environment == DEV_ENV
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid("token_ttl_minutes must be positive".into()));
        }
        if self.unit_name.trim().is_empty() {
            return Err(ConfigError::Invalid("unit_name must not be empty".into()));
        }
        if self.max_db_connections == 0 {
            return Err(ConfigError::Invalid("max_db_connections must be at least 1".into()));
        }
        self.utc_offset()?;
        match self.jwt_secret.as_deref() {
            Some(s) if !s.trim().is_empty() => Ok(()),
            _ if self.is_development() => Ok(()),
            _ => Err(ConfigError::Invalid(
                "jwt_secret is required outside development (set CHARIOT__JWT_SECRET)".into(),
            )),
        }
    }

    /// Secret used to sign session tokens. Falls back to a fixed value in
    /// development only.
    pub fn jwt_secret(&self) -> &str {
        match self.jwt_secret.as_deref() {
            Some(s) if !s.trim().is_empty() => s,
            _ => {
                tracing::warn!("jwt_secret not set; using development secret");
                DEV_JWT_SECRET
            }
        }
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::minutes(self.token_ttl_minutes)
    }

    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.report_utc_offset_minutes * 60).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "report_utc_offset_minutes out of range: {}",
                self.report_utc_offset_minutes
            ))
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    Config::builder()
        .set_default("environment", DEV_ENV)?
        .set_default("host", "0.0.0.0")?
        .set_default("port", 8080)?
        .set_default("max_db_connections", 5)?
        .set_default("token_ttl_minutes", 12 * 60)?
        .set_default("unit_name", "Service de Réanimation Pédiatrique")?
        .set_default("report_utc_offset_minutes", 60)
}
