use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Storage key cannot be empty")]
    EmptyStorageKey,

    #[error("Storage version cannot be empty")]
    EmptyStorageVersion,

    #[error("Schema path cannot be empty")]
    EmptySchemaPath,

    #[error("Database path cannot be empty when storage.kind is sqlite")]
    EmptyDatabasePath,

    #[error("Invalid timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error("Invalid max_tokens: {0}. Must be at least 1")]
    InvalidMaxTokens(u32),

    #[error("Invalid temperature: {0}. Must be between 0.0 and 2.0")]
    InvalidTemperature(f32),

    #[error("Invalid screen capacity {0}x{1}. Both dimensions must be at least 1")]
    InvalidCapacity(u32, u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .adaptui/config.yaml (project config)
    /// 3. .adaptui/local.yaml (project local overrides, optional)
    /// 4. Environment variables (ADAPTUI_* prefix, `__` separates sections)
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment()
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    ///
    /// Environment variables still take precedence over the file.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let path = path.as_ref();
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("ADAPTUI_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".adaptui/config.yaml"))
            .merge(Yaml::file(".adaptui/local.yaml"))
            .merge(Env::prefixed("ADAPTUI_").split("__"))
    }

    /// Validate configuration values
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.schema_path.trim().is_empty() {
            return Err(ConfigError::EmptySchemaPath);
        }

        if config.storage.key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        if config.storage.version.trim().is_empty() {
            return Err(ConfigError::EmptyStorageVersion);
        }
        if config.storage.kind == crate::domain::models::StorageKind::Sqlite
            && config.storage.database_path.trim().is_empty()
        {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.backend.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(0));
        }
        if config.backend.max_tokens == 0 {
            return Err(ConfigError::InvalidMaxTokens(0));
        }
        let temperature = config.backend.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidTemperature(temperature));
        }

        if config.capacity.width == 0 || config.capacity.height == 0 {
            return Err(ConfigError::InvalidCapacity(
                config.capacity.width,
                config.capacity.height,
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&config.logging.format.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        Ok(())
    }
}
