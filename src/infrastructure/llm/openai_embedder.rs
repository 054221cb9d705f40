use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::application::ports::{Embedder, EmbedderError, EmbeddingMode};
use crate::domain::Embedding;
use crate::infrastructure::retry::RetryPolicy;

/// Embedding client for OpenAI-compatible `/embeddings` endpoints. The
/// embedding mode is sent as `input_type` for providers that support
/// asymmetric models.
pub struct OpenAiEmbedder {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    send_input_type: bool,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [&'a str],
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    input_type: Option<&'static str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        send_input_type: bool,
        timeout: Duration,
    ) -> Result<Self, EmbedderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbedderError::ApiRequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            send_input_type,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn request_once(
        &self,
        texts: &[&str],
        mode: EmbeddingMode,
    ) -> Result<Vec<Embedding>, EmbedderError> {
        let request_body = EmbeddingRequest {
            input: texts,
            model: &self.model,
            input_type: self.send_input_type.then(|| mode.as_str()),
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| EmbedderError::ApiRequestFailed(e.to_string()))?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(EmbedderError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbedderError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let mut embedding_response: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbedderError::InvalidResponse(e.to_string()))?;

        if embedding_response.data.len() != texts.len() {
            return Err(EmbedderError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embedding_response.data.len()
            )));
        }

        embedding_response
            .data
            .sort_by_key(|d| d.index.unwrap_or(usize::MAX));

        Ok(embedding_response
            .data
            .into_iter()
            .map(|d| Embedding::new(d.embedding))
            .collect())
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str, mode: EmbeddingMode) -> Result<Embedding, EmbedderError> {
        let results = self.embed_batch(&[text], mode).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| EmbedderError::InvalidResponse("empty response".to_string()))
    }

    #[tracing::instrument(skip_all, fields(model = %self.model, count = texts.len(), mode = mode.as_str()))]
    async fn embed_batch(
        &self,
        texts: &[&str],
        mode: EmbeddingMode,
    ) -> Result<Vec<Embedding>, EmbedderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        self.retry
            .run("embed_batch", || self.request_once(texts, mode))
            .await
    }
}
