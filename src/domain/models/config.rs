use serde::{Deserialize, Serialize};
use std::fmt;

use super::proposal::ScreenCapacity;

/// Main configuration structure for adaptui
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Path to the component schema (YAML or JSON)
    #[serde(default = "default_schema_path")]
    pub schema_path: String,

    /// Optional path to the developer-supplied default UI-State
    #[serde(default)]
    pub default_state_path: Option<String>,

    /// Persistence configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Text-generation backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Default screen capacity used for layout requests
    #[serde(default)]
    pub capacity: ScreenCapacity,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_schema_path() -> String {
    ".adaptui/components.yaml".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_path: default_schema_path(),
            default_state_path: None,
            storage: StorageConfig::default(),
            backend: BackendConfig::default(),
            capacity: ScreenCapacity::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Which state store backs persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Sqlite,
    Memory,
    None,
}

/// Persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StorageConfig {
    #[serde(default = "default_storage_kind")]
    pub kind: StorageKind,

    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Application-chosen storage key. Independent UI-States need distinct keys.
    #[serde(default = "default_storage_key")]
    pub key: String,

    /// Schema version; records saved under another version are discarded
    #[serde(default = "default_storage_version")]
    pub version: String,
}

const fn default_storage_kind() -> StorageKind {
    StorageKind::Sqlite
}

fn default_database_path() -> String {
    ".adaptui/state.db".to_string()
}

fn default_storage_key() -> String {
    "adaptui_layout".to_string()
}

fn default_storage_version() -> String {
    "1.0.0".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: default_storage_kind(),
            database_path: default_database_path(),
            key: default_storage_key(),
            version: default_storage_version(),
        }
    }
}

/// Supported text-generation providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendProvider {
    Anthropic,
    OpenAi,
    Google,
    Mock,
}

impl BackendProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::Google => "google",
            Self::Mock => "mock",
        }
    }

    /// Environment variable consulted when no API key is configured
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Google => Some("GOOGLE_API_KEY"),
            Self::Mock => None,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Anthropic => "claude-sonnet-4-5-20250929",
            Self::OpenAi => "gpt-4o-mini",
            Self::Google => "gemini-2.0-flash",
            Self::Mock => "mock",
        }
    }
}

impl fmt::Display for BackendProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text-generation backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BackendConfig {
    #[serde(default = "default_provider")]
    pub provider: BackendProvider,

    /// Model identifier; provider default when absent
    #[serde(default)]
    pub model: Option<String>,

    /// API key (falls back to the provider's environment variable)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL override (for testing/proxies)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

const fn default_provider() -> BackendProvider {
    BackendProvider::Anthropic
}

const fn default_timeout_secs() -> u64 {
    60
}

const fn default_max_tokens() -> u32 {
    4096
}

const fn default_temperature() -> f32 {
    0.3
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            api_key: None,
            base_url: None,
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl BackendConfig {
    pub fn resolved_model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }

    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| {
                self.provider
                    .api_key_env()
                    .and_then(|var| std::env::var(var).ok())
                    .filter(|k| !k.is_empty())
            })
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when absent
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
