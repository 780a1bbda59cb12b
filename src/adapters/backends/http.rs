//! Shared HTTP plumbing for the vendor backends.

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::domain::ports::BackendError;

/// Connection settings common to every HTTP backend.
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl HttpBackendConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `base_url` joined with `path`, without doubled slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    pub(crate) fn require_key(&self, backend: &str) -> Result<(), BackendError> {
        if self.api_key.trim().is_empty() {
            return Err(BackendError::NotConfigured(format!("{backend} API key is not set")));
        }
        Ok(())
    }
}

pub(crate) fn build_client(config: &HttpBackendConfig) -> Result<Client, BackendError> {
    Client::builder()
        .timeout(config.timeout)
        .pool_max_idle_per_host(4)
        .tcp_nodelay(true)
        .build()
        .map_err(|e| BackendError::Transport(format!("Failed to build HTTP client: {e}")))
}

/// Replace every occurrence of `secret` in `text`.
pub fn redact(text: &str, secret: &str) -> String {
    if secret.len() < 4 {
        return text.to_string();
    }
    text.replace(secret, "[REDACTED]")
}

/// Send a request and decode a JSON body, classifying every failure.
pub(crate) async fn send_json<R: DeserializeOwned>(
    request: RequestBuilder,
    config: &HttpBackendConfig,
) -> Result<R, BackendError> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            BackendError::Timeout(config.timeout.as_secs())
        } else {
            BackendError::Transport(redact(&e.to_string(), &config.api_key))
        }
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        if e.is_timeout() {
            BackendError::Timeout(config.timeout.as_secs())
        } else {
            BackendError::Transport(redact(&e.to_string(), &config.api_key))
        }
    })?;

    if !status.is_success() {
        debug!(status = status.as_u16(), "Backend returned error status");
        return Err(BackendError::from_status(
            status.as_u16(),
            redact(&body, &config.api_key),
        ));
    }

    serde_json::from_str(&body).map_err(|e| BackendError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact() {
        assert_eq!(
            redact("bad key sk-test-123456 rejected", "sk-test-123456"),
            "bad key [REDACTED] rejected"
        );
        assert_eq!(redact("abc", ""), "abc");
    }

    #[test]
    fn test_endpoint_join() {
        let config = HttpBackendConfig::new("k", "m", "http://localhost:1234/");
        assert_eq!(config.endpoint("/v1/messages"), "http://localhost:1234/v1/messages");
    }

    #[test]
    fn test_require_key() {
        let config = HttpBackendConfig::new(" ", "m", "http://x");
        assert!(matches!(
            config.require_key("Anthropic"),
            Err(BackendError::NotConfigured(_))
        ));
    }
}
