//! SQLite implementation of the StateStore.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use super::StoreError;
use crate::domain::models::UiState;
use crate::domain::ports::{storage_key, PersistedRecord, StateStore};

#[derive(Clone)]
pub struct SqliteStateStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct UiStateRow {
    storage_key: String,
    schema_version: String,
    state_json: String,
    saved_at_epoch_millis: i64,
}

impl UiStateRow {
    fn into_record(self) -> Result<PersistedRecord, StoreError> {
        Ok(PersistedRecord {
            state: serde_json::from_str(&self.state_json)?,
            saved_at_epoch_millis: self.saved_at_epoch_millis,
            schema_version: self.schema_version,
        })
    }
}

impl SqliteStateStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn try_save(&self, key: &str, version: &str, state: &UiState) -> Result<(), StoreError> {
        let record = PersistedRecord::new(state.clone(), version);
        let state_json = serde_json::to_string(&record.state)?;

        sqlx::query(
            r#"INSERT INTO ui_state_records (storage_key, base_key, schema_version, state_json, saved_at_epoch_millis)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(storage_key) DO UPDATE SET
                   base_key = excluded.base_key,
                   schema_version = excluded.schema_version,
                   state_json = excluded.state_json,
                   saved_at_epoch_millis = excluded.saved_at_epoch_millis"#
        )
        .bind(storage_key(key, version))
        .bind(key)
        .bind(&record.schema_version)
        .bind(&state_json)
        .bind(record.saved_at_epoch_millis)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Load the record for `key` at `version`, deleting records of any other
    /// version stored under the same key.
    pub async fn try_load(&self, key: &str, version: &str) -> Result<Option<PersistedRecord>, StoreError> {
        let rows: Vec<UiStateRow> = sqlx::query_as(
            "SELECT storage_key, schema_version, state_json, saved_at_epoch_millis
             FROM ui_state_records WHERE base_key = ?"
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await?;

        let wanted = storage_key(key, version);
        let mut found = None;

        for row in rows {
            if row.storage_key == wanted && row.schema_version == version {
                found = Some(row);
                continue;
            }
            debug!(
                storage_key = %row.storage_key,
                stored_version = %row.schema_version,
                requested_version = %version,
                "Discarding persisted UI-State with mismatched version"
            );
            sqlx::query("DELETE FROM ui_state_records WHERE storage_key = ?")
                .bind(&row.storage_key)
                .execute(&self.pool)
                .await?;
        }

        match found.map(UiStateRow::into_record).transpose() {
            Ok(record) => Ok(record),
            Err(e) => {
                // unreadable record; drop it so the next save starts clean
                sqlx::query("DELETE FROM ui_state_records WHERE storage_key = ?")
                    .bind(&wanted)
                    .execute(&self.pool)
                    .await?;
                Err(e)
            }
        }
    }

    pub async fn try_clear(&self, key: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM ui_state_records WHERE base_key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn try_exists(&self, key: &str) -> Result<bool, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ui_state_records WHERE base_key = ?")
            .bind(key)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }
}

#[async_trait]
impl StateStore for SqliteStateStore {
    async fn save(&self, key: &str, version: &str, state: &UiState) -> bool {
        match self.try_save(key, version, state).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %key, version = %version, error = %e, "SQLite save failed");
                false
            }
        }
    }

    async fn load(&self, key: &str, version: &str) -> Option<UiState> {
        match self.try_load(key, version).await {
            Ok(record) => record.map(|r| r.state),
            Err(e) => {
                warn!(key = %key, version = %version, error = %e, "SQLite load failed");
                None
            }
        }
    }

    async fn clear(&self, key: &str) -> bool {
        match self.try_clear(key).await {
            Ok(removed) => {
                debug!(key = %key, removed, "Cleared persisted UI-State");
                true
            }
            Err(e) => {
                warn!(key = %key, error = %e, "SQLite clear failed");
                false
            }
        }
    }

    async fn exists(&self, key: &str) -> bool {
        self.try_exists(key).await.unwrap_or_else(|e| {
            warn!(key = %key, error = %e, "SQLite exists check failed");
            false
        })
    }
}
