//! Domain layer for the adaptation engine
//!
//! Models, errors and port traits. Nothing in here performs I/O.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{ArrangementError, GatewayError, GatewayErrorCategory, SchemaError};
