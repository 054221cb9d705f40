use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::application::ports::{CompletionRequest, LlmClient, LlmClientError};

/// Client for any OpenAI-compatible `/chat/completions` endpoint
/// (Groq, OpenAI, LM Studio, Azure OpenAI).
pub struct OpenAiClient {
    client: Client,
    provider: String,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(
        provider: String,
        base_url: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, LlmClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            provider,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.provider == "azure" {
            request.header("api-key", &self.api_key)
        } else {
            request.bearer_auth(&self.api_key)
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    #[tracing::instrument(skip_all, fields(model = %self.model, messages = request.messages.len()))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmClientError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: request
                .messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let http_request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        let response = self.apply_auth(http_request).send().await.map_err(|e| {
            if e.is_timeout() {
                LlmClientError::Timeout
            } else {
                LlmClientError::ApiRequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        match status {
            StatusCode::TOO_MANY_REQUESTS => return Err(LlmClientError::RateLimited),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let detail = response.text().await.unwrap_or_default();
                return Err(LlmClientError::Unauthorized(format!("HTTP {}: {}", status, detail)));
            }
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                return Err(LlmClientError::Timeout);
            }
            s if !s.is_success() => {
                let detail = response.text().await.unwrap_or_default();
                return Err(LlmClientError::ApiRequestFailed(format!(
                    "HTTP {}: {}",
                    status, detail
                )));
            }
            _ => {}
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;

        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}
