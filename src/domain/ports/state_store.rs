//! State store port: versioned, best-effort persistence of UI-State.
//!
//! Every operation degrades to `false`/`None` instead of failing. Records
//! are stored under `"{key}_{version}"`; loading with a different version
//! discards whatever is stored for the key.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::models::UiState;

/// Persisted record format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    pub state: UiState,
    pub saved_at_epoch_millis: i64,
    pub schema_version: String,
}

impl PersistedRecord {
    pub fn new(state: UiState, schema_version: impl Into<String>) -> Self {
        Self {
            state,
            saved_at_epoch_millis: Utc::now().timestamp_millis(),
            schema_version: schema_version.into(),
        }
    }
}

/// Storage name of a record.
pub fn storage_key(key: &str, version: &str) -> String {
    format!("{key}_{version}")
}

#[async_trait]
pub trait StateStore: Send + Sync {
    /// Persist `state` for `key` at `version`. Returns `false` on any failure.
    async fn save(&self, key: &str, version: &str, state: &UiState) -> bool;

    /// Load the state for `key` at `version`.
    ///
    /// A record stored under another version is deleted and `None` returned.
    async fn load(&self, key: &str, version: &str) -> Option<UiState>;

    /// Remove every record stored for `key`. Returns `false` on failure.
    async fn clear(&self, key: &str) -> bool;

    /// Whether any record is stored for `key`.
    async fn exists(&self, key: &str) -> bool;
}
