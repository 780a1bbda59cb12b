//! Text-generation backends.
//!
//! One implementation per vendor plus a scripted double. The gateway only
//! depends on the `TextGenerationBackend` port.

pub mod anthropic;
pub mod google;
pub mod http;
pub mod openai;
pub mod registry;
pub mod scripted;

pub use anthropic::AnthropicBackend;
pub use google::GoogleBackend;
pub use http::{redact, HttpBackendConfig};
pub use openai::OpenAiBackend;
pub use registry::BackendRegistry;
pub use scripted::ScriptedBackend;
