//! Infrastructure layer module
//!
//! Configuration, logging, schema loading and process bootstrap. Storage
//! and text-generation adapters live in [`crate::adapters`].

pub mod config;
pub mod logging;
pub mod schema_loader;
pub mod setup;

pub use config::{ConfigError, ConfigLoader};
pub use logging::{LogConfig, LoggerImpl};
pub use schema_loader::SchemaLoader;
