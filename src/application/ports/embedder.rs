use async_trait::async_trait;

use crate::domain::Embedding;

/// Hosted embedding models encode queries and passages asymmetrically.
/// Ingestion always uses `Passage`, retrieval always uses `Query`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingMode {
    Passage,
    Query,
}

impl EmbeddingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingMode::Passage => "passage",
            EmbeddingMode::Query => "query",
        }
    }
}

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str, mode: EmbeddingMode) -> Result<Embedding, EmbedderError>;

    /// Order of the returned embeddings matches `texts`.
    async fn embed_batch(
        &self,
        texts: &[&str],
        mode: EmbeddingMode,
    ) -> Result<Vec<Embedding>, EmbedderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EmbedderError {
    #[error("embedding api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("embedding rate limited")]
    RateLimited,
    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),
}
