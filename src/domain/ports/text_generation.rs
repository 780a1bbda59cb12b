//! Text-generation backend port.
//!
//! Each vendor (Anthropic, OpenAI, Google) and the test double implement
//! [`TextGenerationBackend`]. The gateway only ever sees this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::GatewayErrorCategory;

/// A single prompt payload sent to a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// System instructions (output contract)
    pub system: String,

    /// User prompt (goal, schema, state, capacity)
    pub prompt: String,

    pub max_tokens: u32,

    pub temperature: f32,
}

/// Error types for backend operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("Authentication error: {0}")]
    Unauthorized(String),

    #[error("Quota or rate limit exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Server error (HTTP {status}): {body}")]
    Server { status: u16, body: String },

    #[error("Unexpected response (HTTP {status}): {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Invalid response body: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// Map onto the coarse gateway taxonomy.
    pub fn category(&self) -> GatewayErrorCategory {
        match self {
            Self::Unauthorized(_) | Self::NotConfigured(_) => GatewayErrorCategory::Auth,
            Self::QuotaExceeded(_) => GatewayErrorCategory::Quota,
            Self::Timeout(_) | Self::Transport(_) | Self::Server { .. } => {
                GatewayErrorCategory::Network
            }
            Self::UnexpectedStatus { .. } | Self::InvalidResponse(_) => {
                GatewayErrorCategory::Unknown
            }
        }
    }

    /// Classify an HTTP error status and body.
    ///
    /// - 401, 403: authentication
    /// - 402, 429: quota
    /// - 408, 5xx: network
    /// - anything else: unknown, unless the body mentions an exhausted quota
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Unauthorized(body),
            402 | 429 => Self::QuotaExceeded(body),
            408 | 500..=599 => Self::Server { status, body },
            _ if mentions_quota(&body) => Self::QuotaExceeded(body),
            _ => Self::UnexpectedStatus { status, body },
        }
    }
}

fn mentions_quota(body: &str) -> bool {
    let lower = body.to_lowercase();
    lower.contains("resource_exhausted") || lower.contains("insufficient_quota")
}

/// Port trait for text-generation backends
///
/// Implementations must be `Send + Sync`; one backend instance is shared by
/// every request of a gateway.
#[async_trait]
pub trait TextGenerationBackend: Send + Sync {
    /// Stable identifier, e.g. "anthropic", "openai", "google", "scripted"
    fn backend_id(&self) -> &str;

    /// Issue one request and return the raw reply text.
    async fn generate(&self, request: GenerationRequest) -> Result<String, BackendError>;
}
