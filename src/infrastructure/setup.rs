//! Project setup and reconciler bootstrap
//!
//! Handles:
//! - Project initialization (`.adaptui/` with a config file and a starter schema)
//! - Building the state store, gateway and reconciler from a [`Config`]

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::adapters::backends::BackendRegistry;
use crate::adapters::sqlite::{database_url, initialize_database, SqliteStateStore};
use crate::adapters::InMemoryStateStore;
use crate::domain::models::{ComponentSchema, Config, StorageKind};
use crate::domain::ports::{NullStateStore, StateStore};
use crate::infrastructure::schema_loader::SchemaLoader;
use crate::services::{AdaptationReconciler, GatewayParams, LayoutGateway};

/// Default configuration template content
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# adaptui configuration
# Override settings by editing this file, adding .adaptui/local.yaml, or
# setting environment variables with the ADAPTUI_ prefix
#
# Example environment variables:
#   export ADAPTUI_BACKEND__PROVIDER=openai
#   export ADAPTUI_STORAGE__KEY=dashboard
#   export ADAPTUI_LOGGING__LEVEL=debug

# Component schema (YAML, or JSON by .json extension)
schema_path: ".adaptui/components.yaml"

# Optional default UI-State shown before any goal is submitted
# default_state_path: ".adaptui/default_state.yaml"

storage:
  # sqlite, memory or none
  kind: sqlite
  database_path: ".adaptui/state.db"
  # Independent UI-States need distinct keys
  key: "adaptui_layout"
  # Bump when the schema changes incompatibly; older records are discarded
  version: "1.0.0"

backend:
  # anthropic, openai, google or mock
  provider: anthropic
  # API key falls back to ANTHROPIC_API_KEY / OPENAI_API_KEY / GOOGLE_API_KEY
  timeout_secs: 60
  max_tokens: 4096
  temperature: 0.3

# Default screen capacity in grid tracks
capacity:
  width: 12
  height: 24

logging:
  # trace, debug, info, warn, error
  level: "info"
  # json, pretty
  format: "pretty"
  # daily, hourly, never (only used with log_dir)
  rotation: "daily"
"#;

/// Starter component schema content
const DEFAULT_SCHEMA_TEMPLATE: &str = r#"components:
  - name: MetricCard
    description: A single key figure with a label and optional trend
    arguments:
      label: { type: text, required: true }
      value: { type: text, required: true }
      trend: { type: text, allowedValues: [up, down, flat] }
    useCases:
      - highlight one KPI such as revenue or active users
    spaceHint:
      min: [2, 2]
      max: [4, 3]
      preferred: [3, 2]

  - name: TextBlock
    description: A paragraph of explanatory text with an optional heading
    arguments:
      heading: { type: text }
      content: { type: text, required: true }
    useCases:
      - explain what the user is looking at
    spaceHint:
      min: [3, 1]
      max: [12, 6]
      preferred: [6, 2]

  - name: DataTable
    description: Tabular data with named columns
    arguments:
      columns: { type: list, required: true }
      rows: { type: list, required: true }
      caption: { type: text }
    useCases:
      - compare records side by side
    spaceHint:
      min: [4, 3]
      max: [12, 12]
      preferred: [8, 6]
"#;

/// Setup paths and directories
pub struct SetupPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub schema_file: PathBuf,
}

impl SetupPaths {
    /// Setup paths for the current directory
    pub fn new() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(Self::under(&current_dir))
    }

    /// Setup paths rooted at `root`
    pub fn under(root: &Path) -> Self {
        let config_dir = root.join(".adaptui");
        Self {
            config_file: config_dir.join("config.yaml"),
            schema_file: config_dir.join("components.yaml"),
            config_dir,
        }
    }

    /// Check if the project is already initialized
    pub fn is_initialized(&self) -> bool {
        self.config_file.exists() && self.schema_file.exists()
    }
}

/// Create `.adaptui/` with a config file and a starter schema.
///
/// Existing files are kept unless `force` is set. Returns the files written.
pub fn initialize_project(paths: &SetupPaths, force: bool) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&paths.config_dir).with_context(|| {
        format!(
            "Failed to create config directory: {}",
            paths.config_dir.display()
        )
    })?;

    let mut written = Vec::new();
    for (path, contents) in [
        (&paths.config_file, DEFAULT_CONFIG_TEMPLATE),
        (&paths.schema_file, DEFAULT_SCHEMA_TEMPLATE),
    ] {
        if path.exists() && !force {
            info!(path = %path.display(), "Keeping existing file");
            continue;
        }
        fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path.clone());
    }
    Ok(written)
}

/// Build the state store selected by `storage.kind`.
///
/// A SQLite database that cannot be opened degrades to in-memory storage:
/// persistence is best-effort and never blocks startup.
pub async fn build_state_store(config: &Config) -> Arc<dyn StateStore> {
    match config.storage.kind {
        StorageKind::Sqlite => {
            let url = database_url(&config.storage.database_path);
            match initialize_database(&url).await {
                Ok(pool) => Arc::new(SqliteStateStore::new(pool)),
                Err(e) => {
                    warn!(
                        database = %config.storage.database_path,
                        error = %e,
                        "Persistent storage unavailable; falling back to in-memory storage"
                    );
                    Arc::new(InMemoryStateStore::new())
                }
            }
        }
        StorageKind::Memory => Arc::new(InMemoryStateStore::new()),
        StorageKind::None => Arc::new(NullStateStore::new()),
    }
}

/// Build the layout gateway, or `None` when the backend is not configured.
pub fn build_gateway(config: &Config) -> Option<Arc<LayoutGateway>> {
    let backend = match BackendRegistry::from_config(&config.backend) {
        Ok(backend) => backend,
        Err(e) => {
            warn!(
                provider = %config.backend.provider,
                error = %e,
                "Text-generation backend unavailable; goal submission is disabled"
            );
            return None;
        }
    };

    let params = GatewayParams {
        timeout: Duration::from_secs(config.backend.timeout_secs),
        max_tokens: config.backend.max_tokens,
        temperature: config.backend.temperature,
    };
    Some(Arc::new(LayoutGateway::with_params(backend, params)))
}

/// Load the schema, restore state and start a reconciler.
pub async fn bootstrap(config: &Config) -> Result<AdaptationReconciler> {
    let schema = load_schema(config)?;

    let mut builder = AdaptationReconciler::builder(schema, build_state_store(config).await)
        .storage(&config.storage.key, &config.storage.version);

    if let Some(path) = &config.default_state_path {
        let default_state = SchemaLoader::load_default_state(path)
            .with_context(|| format!("Failed to load default UI-State from {path}"))?;
        builder = builder.default_state(default_state);
    }
    if let Some(gateway) = build_gateway(config) {
        builder = builder.gateway(gateway);
    }

    let reconciler = builder
        .initialize()
        .await
        .context("Failed to initialize the adaptation reconciler")?;
    info!(
        key = %config.storage.key,
        version = %config.storage.version,
        "Reconciler ready"
    );
    Ok(reconciler)
}

/// Load and validate the configured component schema.
pub fn load_schema(config: &Config) -> Result<Arc<ComponentSchema>> {
    let schema = SchemaLoader::from_path(&config.schema_path).with_context(|| {
        format!(
            "Failed to load component schema from {} (run `adaptui init` to create one)",
            config.schema_path
        )
    })?;
    Ok(Arc::new(schema))
}
