//! Domain errors for the adaptation engine.
//!
//! Only [`SchemaError`] is fatal. Every other failure is carried as data
//! (rejections, `bool`/`Option` results) or as a recoverable [`GatewayError`].

use std::fmt;
use thiserror::Error;

/// Malformed component schema or default UI-State. Fatal at startup.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Component schema defines no element types")]
    NoElementTypes,

    #[error("Element type at position {0} has an empty name")]
    MissingName(usize),

    #[error("Element type '{0}' is defined more than once")]
    DuplicateElementType(String),

    #[error("Element type '{0}' is missing a description")]
    MissingDescription(String),

    #[error("Element type '{0}' declares no arguments")]
    MissingArguments(String),

    #[error("Element type '{0}' declares no use cases")]
    MissingUseCases(String),

    #[error("Element type '{0}' is missing a space hint")]
    MissingSpaceHint(String),

    #[error("Space hint of element type '{component}' is missing '{field}'")]
    IncompleteSpaceHint {
        component: String,
        field: &'static str,
    },

    #[error("Argument '{argument}' of '{component}' has an allowed value that is not {expected}")]
    InvalidAllowedValue {
        component: String,
        argument: String,
        expected: &'static str,
    },

    #[error("Argument '{argument}' of '{component}' has an empty allowed-values list")]
    EmptyAllowedValues { component: String, argument: String },

    #[error("Default UI-State element '{id}' is invalid: {reason}")]
    InvalidDefaultElement { id: String, reason: String },

    #[error("Default UI-State is invalid: {0}")]
    InvalidDefaultState(String),

    #[error("Failed to parse component schema: {0}")]
    Parse(String),

    #[error("Failed to read component schema: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse failure category reported by the text-generation gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayErrorCategory {
    Auth,
    Quota,
    Network,
    Unknown,
}

impl GatewayErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Quota => "quota",
            Self::Network => "network",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for GatewayErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed layout request. Never mutates UI-State.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{category} error from text-generation backend: {message}")]
pub struct GatewayError {
    pub category: GatewayErrorCategory,
    pub message: String,
}

impl GatewayError {
    pub fn new(category: GatewayErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCategory::Auth, message)
    }

    pub fn quota(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCategory::Quota, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCategory::Network, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCategory::Unknown, message)
    }

    pub fn category(&self) -> GatewayErrorCategory {
        self.category
    }

    /// Message meant for the end user (`lastError`).
    pub fn user_message(&self) -> String {
        match self.category {
            GatewayErrorCategory::Auth => {
                "The AI service rejected the configured credentials. Check the API key.".to_string()
            }
            GatewayErrorCategory::Quota => {
                "The AI service quota or rate limit was exceeded. Try again later.".to_string()
            }
            GatewayErrorCategory::Network => {
                "The AI service could not be reached in time. Check the connection and retry."
                    .to_string()
            }
            GatewayErrorCategory::Unknown => {
                format!("The AI service failed to produce a layout: {}", self.message)
            }
        }
    }
}

/// Rejected metadata mutation on the reconciler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArrangementError {
    #[error("Spacing must be a finite non-negative number, got {0}")]
    InvalidSpacing(f64),

    #[error("Track count must be at least 1, got {0}")]
    InvalidTrackCount(u32),
}
