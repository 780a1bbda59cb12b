//! Infrastructure adapters for external systems.

pub mod backends;
pub mod memory_store;
pub mod sqlite;

pub use memory_store::InMemoryStateStore;
