//! Background persistence for one reconciler.
//!
//! Mutations enqueue commands and return immediately. A single worker task
//! drains the queue in order, so a `clear` issued by a reset can never be
//! overtaken by a save queued before it.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::models::UiState;
use crate::domain::ports::StateStore;

enum PersistCommand {
    Save(Box<UiState>),
    Clear(oneshot::Sender<bool>),
    Flush(oneshot::Sender<()>),
}

/// Handle to the persistence worker. Dropping it stops the worker once the
/// queue is drained.
pub struct PersistenceWorker {
    tx: mpsc::UnboundedSender<PersistCommand>,
    task: JoinHandle<()>,
}

impl PersistenceWorker {
    /// Spawn the worker on the current runtime.
    pub fn spawn(store: Arc<dyn StateStore>, key: String, version: String) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<PersistCommand>();

        let task = tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    PersistCommand::Save(state) => {
                        if store.save(&key, &version, &state).await {
                            debug!(key = %key, version = %version, "Persisted UI-State");
                        } else {
                            warn!(key = %key, version = %version, "Failed to persist UI-State");
                        }
                    }
                    PersistCommand::Clear(reply) => {
                        let cleared = store.clear(&key).await;
                        if !cleared {
                            warn!(key = %key, "Failed to clear persisted UI-State");
                        }
                        let _ = reply.send(cleared);
                    }
                    PersistCommand::Flush(reply) => {
                        let _ = reply.send(());
                    }
                }
            }
            debug!(key = %key, "Persistence worker stopped");
        });

        Self { tx, task }
    }

    /// Queue a save. Fire-and-forget.
    pub fn save(&self, state: UiState) {
        if self.tx.send(PersistCommand::Save(Box::new(state))).is_err() {
            warn!("Persistence worker is not running; UI-State not saved");
        }
    }

    /// Queue a clear and wait for its result.
    pub async fn clear(&self) -> bool {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(PersistCommand::Clear(reply)).is_err() {
            return false;
        }
        rx.await.unwrap_or(false)
    }

    /// Wait until everything queued so far has been processed.
    pub async fn flush(&self) {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(PersistCommand::Flush(reply)).is_ok() {
            let _ = rx.await;
        }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_store::InMemoryStateStore;
    use crate::domain::models::ArrangementMode;

    #[tokio::test]
    async fn test_saves_then_clear_in_order() {
        let store = Arc::new(InMemoryStateStore::new());
        let worker = PersistenceWorker::spawn(store.clone(), "k".to_string(), "1".to_string());

        worker.save(UiState::default());
        assert!(worker.clear().await);
        assert!(!store.exists("k").await);

        let state = UiState {
            arrangement_mode: ArrangementMode::Flow,
            ..UiState::default()
        };
        worker.save(state.clone());
        worker.flush().await;
        assert_eq!(store.load("k", "1").await, Some(state));
        assert!(worker.is_running());
    }

    #[tokio::test]
    async fn test_failed_save_is_swallowed() {
        let store = Arc::new(InMemoryStateStore::new());
        store.set_available(false);
        let worker = PersistenceWorker::spawn(store.clone(), "k".to_string(), "1".to_string());

        worker.save(UiState::default());
        worker.flush().await;
        store.set_available(true);
        assert!(!store.exists("k").await);
    }
}
