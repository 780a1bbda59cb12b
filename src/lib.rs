//! adaptui - natural-language driven UI layout reconciliation
//!
//! A developer declares a component schema. A user states a goal in plain
//! language, a text-generation backend proposes a layout, and every proposed
//! element is validated against the schema before it may reach the screen.
//! The resulting UI-State is persisted per storage key and schema version.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors and port traits
//! - **Service Layer** (`services`): validator, gateway, reconciler and render planning
//! - **Adapters** (`adapters`): SQLite and in-memory stores, text-generation backends
//! - **Infrastructure Layer** (`infrastructure`): configuration, logging, schema loading
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use adaptui::adapters::InMemoryStateStore;
//! use adaptui::infrastructure::SchemaLoader;
//! use adaptui::services::AdaptationReconciler;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let schema = Arc::new(SchemaLoader::from_path(".adaptui/components.yaml")?);
//!     let reconciler = AdaptationReconciler::builder(schema, Arc::new(InMemoryStateStore::new()))
//!         .initialize()
//!         .await?;
//!     println!("{}", reconciler.snapshot().await.summary());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    CandidateElement, ComponentSchema, Config, LayoutProposal, ScreenCapacity, UiElement, UiState,
};
pub use domain::ports::{StateStore, TextGenerationBackend};
pub use domain::{GatewayError, GatewayErrorCategory, SchemaError};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    AdaptationReconciler, LayoutGateway, SchemaValidator, SubmitOutcome, ValidationReport,
};
