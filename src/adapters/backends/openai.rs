//! OpenAI chat completions backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::http::{build_client, send_json, HttpBackendConfig};
use crate::domain::ports::{BackendError, GenerationRequest, TextGenerationBackend};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiBackend {
    client: Client,
    config: HttpBackendConfig,
}

impl OpenAiBackend {
    pub fn new(config: HttpBackendConfig) -> Result<Self, BackendError> {
        config.require_key("OpenAI")?;
        Ok(Self {
            client: build_client(&config)?,
            config,
        })
    }
}

#[async_trait]
impl TextGenerationBackend for OpenAiBackend {
    fn backend_id(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, BackendError> {
        let body = ChatRequest {
            model: &self.config.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
        };

        let http = self
            .client
            .post(self.config.endpoint("/v1/chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&body);
        let response: ChatResponse = send_json(http, &self.config).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| BackendError::InvalidResponse("response contained no choices".to_string()))
    }
}
