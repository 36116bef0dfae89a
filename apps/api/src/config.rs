//! API configuration module.
//!
//! Configuration is layered: built-in defaults, then an optional
//! `rateboard.toml`, then `RATEBOARD_*` environment variables.
//!
//! ```text
//! RATEBOARD_HTTP_PORT=9000
//! RATEBOARD_DATABASE_PATH=/var/lib/rateboard/rateboard.db
//! RATEBOARD_JWT_SECRET=...
//! ```

use std::path::Path;

use argon2::Params;
use axum::http::HeaderValue;
use config::{Config, Environment, File};
use rateboard_db::DbConfig;
use serde::{Deserialize, Serialize};

/// Signing secret used when none is configured. Startup warns about it.
pub const DEV_JWT_SECRET: &str = "rateboard-dev-secret-change-in-production";

/// API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// HTTP server port
    pub http_port: u16,

    /// SQLite database file, or `:memory:`
    pub database_path: String,

    /// Secret key for signing tokens
    pub jwt_secret: String,

    /// Token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Browser origin allowed by CORS
    pub cors_origin: String,

    /// Max request body size in bytes
    pub max_body_bytes: usize,

    /// Argon2 memory cost in KiB
    pub argon2_memory_kib: u32,

    /// Argon2 iterations
    pub argon2_iterations: u32,

    /// Argon2 lanes
    pub argon2_parallelism: u32,

    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            http_port: 8080,
            database_path: "./data/rateboard.db".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_lifetime_secs: 7 * 24 * 60 * 60, // 7 days
            cors_origin: "http://localhost:5173".to_string(),
            max_body_bytes: 1024 * 1024, // 1 MiB
            argon2_memory_kib: Params::DEFAULT_M_COST,
            argon2_iterations: Params::DEFAULT_T_COST,
            argon2_parallelism: Params::DEFAULT_P_COST,
            log_level: "info".to_string(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from `rateboard.toml` (if present) and the
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("rateboard.toml"))
    }

    /// Load configuration with an explicit optional file.
    pub fn load_from(file: &Path) -> Result<Self, ConfigError> {
        let config: ApiConfig = Config::builder()
            .add_source(Config::try_from(&ApiConfig::default())?)
            .add_source(File::from(file).required(false))
            .add_source(Environment::with_prefix("RATEBOARD").try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::InvalidValue("jwt_secret must not be empty".to_string()));
        }
        if self.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "jwt_lifetime_secs must be positive".to_string(),
            ));
        }
        if HeaderValue::from_str(&self.cors_origin).is_err() {
            return Err(ConfigError::InvalidValue(format!(
                "cors_origin is not a valid header value: {}",
                self.cors_origin
            )));
        }
        Params::new(
            self.argon2_memory_kib,
            self.argon2_iterations,
            self.argon2_parallelism,
            None,
        )
        .map_err(|e| ConfigError::InvalidValue(format!("argon2 parameters: {e}")))?;

        Ok(())
    }

    /// True when running with the built-in development secret.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// Storage settings for `database_path`. `:memory:` gets the
    /// single-connection in-memory setup.
    pub fn db_config(&self) -> DbConfig {
        let config = DbConfig::new(&self.database_path);
        if config.is_in_memory() {
            DbConfig::in_memory()
        } else {
            config
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.uses_dev_secret());
        assert_eq!(config.jwt_lifetime_secs, 604_800);
    }

    #[test]
    fn test_rejects_empty_secret_and_zero_lifetime() {
        let config = ApiConfig {
            jwt_secret: "  ".to_string(),
            ..ApiConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ApiConfig {
            jwt_lifetime_secs: 0,
            ..ApiConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_argon2_params() {
        let config = ApiConfig {
            argon2_iterations: 0,
            ..ApiConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = ApiConfig::load_from(Path::new("/nonexistent/rateboard.toml")).unwrap();
        assert_eq!(config.database_path, ApiConfig::default().database_path);
    }

    #[test]
    fn test_memory_path_uses_in_memory_db_config() {
        let config = ApiConfig {
            database_path: ":memory:".to_string(),
            ..ApiConfig::default()
        };
        assert!(config.db_config().is_in_memory());
        assert!(!ApiConfig::default().db_config().is_in_memory());
    }
}
