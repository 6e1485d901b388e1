//! Server configuration module.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `BRANDPOS_*` environment variables.
//!
//! ```text
//! defaults ──► brandpos.toml (or $BRANDPOS_CONFIG) ──► BRANDPOS_* env
//!   lowest                                               highest
//! ```

use axum::http::HeaderValue;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "brandpos.toml";

/// Development signing secret. Set `BRANDPOS_JWT_SECRET` in production.
pub const DEV_JWT_SECRET: &str = "brandpos-dev-secret-change-in-production";

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Secret for signing admin tokens
    pub jwt_secret: String,

    /// Admin token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Origin allowed by CORS (the dashboard)
    pub cors_origin: String,

    /// Page size of the sales listing when `limit` is absent
    pub default_page_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: 3500,
            database_path: "./brandpos.db".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_lifetime_secs: 3600, // 1 hour
            cors_origin: "http://localhost:3000".to_string(),
            default_page_size: brandpos_core::DEFAULT_PAGE_SIZE,
        }
    }
}

impl ServerConfig {
    /// Load configuration from file and environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("BRANDPOS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path, Environment::with_prefix("BRANDPOS"))
    }

    fn load_from(path: &str, environment: Environment) -> Result<Self, ConfigError> {
        let defaults = ServerConfig::default();

        let config: ServerConfig = Config::builder()
            .set_default("port", i64::from(defaults.port))?
            .set_default("database_path", defaults.database_path)?
            .set_default("jwt_secret", defaults.jwt_secret)?
            .set_default("jwt_lifetime_secs", defaults.jwt_lifetime_secs)?
            .set_default("cors_origin", defaults.cors_origin)?
            .set_default("default_page_size", i64::from(defaults.default_page_size))?
            .add_source(File::with_name(path).required(false))
            .add_source(environment.try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Whether tokens are signed with the built-in development secret.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// Checks values the type system cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt_secret".to_string()));
        }
        if self.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("jwt_lifetime_secs".to_string()));
        }
        if self.default_page_size == 0 || self.default_page_size > brandpos_core::MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidValue("default_page_size".to_string()));
        }
        if HeaderValue::from_str(&self.cors_origin).is_err() {
            return Err(ConfigError::InvalidValue("cors_origin".to_string()));
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),
}
