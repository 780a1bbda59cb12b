//! Anthropic Messages API backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::http::{build_client, send_json, HttpBackendConfig};
use crate::domain::ports::{BackendError, GenerationRequest, TextGenerationBackend};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

pub struct AnthropicBackend {
    client: Client,
    config: HttpBackendConfig,
}

impl AnthropicBackend {
    pub fn new(config: HttpBackendConfig) -> Result<Self, BackendError> {
        config.require_key("Anthropic")?;
        Ok(Self {
            client: build_client(&config)?,
            config,
        })
    }
}

#[async_trait]
impl TextGenerationBackend for AnthropicBackend {
    fn backend_id(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, BackendError> {
        let body = MessageRequest {
            model: &self.config.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: &request.system,
            messages: [Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        let http = self
            .client
            .post(self.config.endpoint("/v1/messages"))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body);
        let response: MessageResponse = send_json(http, &self.config).await?;

        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n");

        if text.is_empty() {
            return Err(BackendError::InvalidResponse(
                "response contained no text content".to_string(),
            ));
        }
        Ok(text)
    }
}
