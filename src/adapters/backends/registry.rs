//! Backend registry and factory.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::http::HttpBackendConfig;
use super::{anthropic, google, openai, AnthropicBackend, GoogleBackend, OpenAiBackend, ScriptedBackend};
use crate::domain::models::{BackendConfig, BackendProvider};
use crate::domain::ports::{BackendError, TextGenerationBackend};

/// Prose reply of the offline `mock` provider.
const MOCK_REPLY: &str =
    "The mock backend does not design layouts. Configure a real provider to use submit.";

fn http_config(config: &BackendConfig, default_base_url: &str) -> Result<HttpBackendConfig, BackendError> {
    let provider = config.provider;
    let api_key = config.resolved_api_key().ok_or_else(|| {
        BackendError::NotConfigured(format!(
            "no API key for {provider}; set backend.api_key or {}",
            provider.api_key_env().unwrap_or("the provider's key variable")
        ))
    })?;
    let base_url = config
        .base_url
        .clone()
        .unwrap_or_else(|| default_base_url.to_string());

    Ok(HttpBackendConfig::new(api_key, config.resolved_model(), base_url)
        .with_timeout(Duration::from_secs(config.timeout_secs)))
}

/// Selects exactly one backend from configuration.
pub struct BackendRegistry;

impl BackendRegistry {
    pub fn from_config(config: &BackendConfig) -> Result<Arc<dyn TextGenerationBackend>, BackendError> {
        info!(
            provider = %config.provider,
            model = %config.resolved_model(),
            "Selecting text-generation backend"
        );

        let backend: Arc<dyn TextGenerationBackend> = match config.provider {
            BackendProvider::Anthropic => {
                Arc::new(AnthropicBackend::new(http_config(config, anthropic::DEFAULT_BASE_URL)?)?)
            }
            BackendProvider::OpenAi => {
                Arc::new(OpenAiBackend::new(http_config(config, openai::DEFAULT_BASE_URL)?)?)
            }
            BackendProvider::Google => {
                Arc::new(GoogleBackend::new(http_config(config, google::DEFAULT_BASE_URL)?)?)
            }
            BackendProvider::Mock => Arc::new(ScriptedBackend::new().with_fallback(MOCK_REPLY)),
        };
        Ok(backend)
    }

    pub fn available_providers() -> Vec<&'static str> {
        vec!["anthropic", "openai", "google", "mock"]
    }
}
