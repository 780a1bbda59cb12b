//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces that adapters implement:
//! - TextGenerationBackend: one request/response with a text-generation service
//! - StateStore: versioned UI-State persistence
//!
//! These traits keep the reconciliation core independent of any vendor SDK
//! or storage engine.

pub mod null_state_store;
pub mod state_store;
pub mod text_generation;

pub use null_state_store::NullStateStore;
pub use state_store::{storage_key, PersistedRecord, StateStore};
pub use text_generation::{BackendError, GenerationRequest, TextGenerationBackend};
