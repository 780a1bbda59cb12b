//! Null state store implementation.
//!
//! Used when persistence is disabled but the reconciler still requires a
//! StateStore implementation.

use async_trait::async_trait;

use super::StateStore;
use crate::domain::models::UiState;

/// A no-op state store that stores nothing.
#[derive(Debug, Clone, Default)]
pub struct NullStateStore;

impl NullStateStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StateStore for NullStateStore {
    async fn save(&self, _key: &str, _version: &str, _state: &UiState) -> bool {
        false
    }

    async fn load(&self, _key: &str, _version: &str) -> Option<UiState> {
        None
    }

    async fn clear(&self, _key: &str) -> bool {
        true
    }

    async fn exists(&self, _key: &str) -> bool {
        false
    }
}
