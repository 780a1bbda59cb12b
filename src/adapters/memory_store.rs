//! In-process state store.
//!
//! Keeps serialized records in a map keyed by `"{key}_{version}"`. It can
//! be switched unavailable to exercise the degrade-to-no-op paths.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::models::UiState;
use crate::domain::ports::{storage_key, PersistedRecord, StateStore};

#[derive(Debug, Clone)]
struct StoredRecord {
    base_key: String,
    /// Records are kept serialized, like any real backing store.
    json: String,
}

#[derive(Debug)]
pub struct InMemoryStateStore {
    records: RwLock<HashMap<String, StoredRecord>>,
    available: AtomicBool,
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate storage being disabled or over quota.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Full record for `key` at `version`, without the version gate.
    pub async fn record(&self, key: &str, version: &str) -> Option<PersistedRecord> {
        let records = self.records.read().await;
        records
            .get(&storage_key(key, version))
            .and_then(|r| serde_json::from_str(&r.json).ok())
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn save(&self, key: &str, version: &str, state: &UiState) -> bool {
        if !self.is_available() {
            warn!(key = %key, "State store unavailable; save skipped");
            return false;
        }
        let record = PersistedRecord::new(state.clone(), version);
        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to serialize UI-State");
                return false;
            }
        };

        self.records.write().await.insert(
            storage_key(key, version),
            StoredRecord {
                base_key: key.to_string(),
                json,
            },
        );
        true
    }

    async fn load(&self, key: &str, version: &str) -> Option<UiState> {
        if !self.is_available() {
            warn!(key = %key, "State store unavailable; load skipped");
            return None;
        }

        let mut records = self.records.write().await;
        let wanted = storage_key(key, version);
        let mut found = None;

        records.retain(|name, record| {
            if record.base_key != key {
                return true;
            }
            let parsed: Option<PersistedRecord> = serde_json::from_str(&record.json).ok();
            match parsed {
                Some(p) if *name == wanted && p.schema_version == version => {
                    found = Some(p.state);
                    true
                }
                _ => {
                    debug!(storage_key = %name, "Discarding mismatched or unreadable record");
                    false
                }
            }
        });

        found
    }

    async fn clear(&self, key: &str) -> bool {
        if !self.is_available() {
            warn!(key = %key, "State store unavailable; clear skipped");
            return false;
        }
        self.records.write().await.retain(|_, r| r.base_key != key);
        true
    }

    async fn exists(&self, key: &str) -> bool {
        if !self.is_available() {
            return false;
        }
        self.records.read().await.values().any(|r| r.base_key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ArrangementMode;

    #[tokio::test]
    async fn test_round_trip_and_record_metadata() {
        let store = InMemoryStateStore::new();
        let state = UiState {
            arrangement_mode: ArrangementMode::Absolute,
            ..UiState::default()
        };
        assert!(store.save("k", "1.0.0", &state).await);
        assert_eq!(store.load("k", "1.0.0").await, Some(state));

        let record = store.record("k", "1.0.0").await.unwrap();
        assert_eq!(record.schema_version, "1.0.0");
        assert!(record.saved_at_epoch_millis > 0);
    }

    #[tokio::test]
    async fn test_version_gate_deletes_other_versions() {
        let store = InMemoryStateStore::new();
        store.save("k", "2.0.0", &UiState::default()).await;
        store.save("other", "2.0.0", &UiState::default()).await;

        assert_eq!(store.load("k", "1.0.0").await, None);
        assert!(!store.exists("k").await);
        assert!(store.exists("other").await);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_unavailable_degrades() {
        let store = InMemoryStateStore::new();
        store.save("k", "1", &UiState::default()).await;
        store.set_available(false);

        assert!(!store.save("k", "1", &UiState::default()).await);
        assert_eq!(store.load("k", "1").await, None);
        assert!(!store.clear("k").await);
        assert!(!store.exists("k").await);

        store.set_available(true);
        assert!(store.exists("k").await);
    }
}
