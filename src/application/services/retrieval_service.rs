use std::collections::HashSet;
use std::sync::Arc;

use crate::application::ports::{
    Embedder, EmbedderError, EmbeddingMode, SearchResult, VectorStore, VectorStoreError,
};

const TRUNCATION_MARKER: &str = "...";

#[derive(Debug, Clone, PartialEq)]
pub struct SourceRef {
    pub filename: String,
    pub chunk_index: u32,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RetrievedContext {
    pub has_knowledge_base: bool,
    pub context: String,
    pub sources: Vec<SourceRef>,
}

pub struct RetrievalService {
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    top_k: usize,
    max_context_chars: usize,
}

impl RetrievalService {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        top_k: usize,
        max_context_chars: usize,
    ) -> Self {
        Self {
            embedder,
            vector_store,
            top_k,
            max_context_chars,
        }
    }

    /// Never fails: any error degrades to "no knowledge base".
    #[tracing::instrument(skip_all)]
    pub async fn retrieve(&self, query: &str) -> RetrievedContext {
        match self.try_retrieve(query).await {
            Ok(retrieved) => retrieved,
            Err(e) => {
                tracing::warn!(error = %e, "Knowledge base lookup failed, continuing without context");
                RetrievedContext::default()
            }
        }
    }

    async fn try_retrieve(&self, query: &str) -> Result<RetrievedContext, RetrievalError> {
        if self.vector_store.count().await? == 0 {
            return Ok(RetrievedContext::default());
        }

        let query_embedding = self.embedder.embed(query, EmbeddingMode::Query).await?;
        let mut matches = self.vector_store.search(&query_embedding, self.top_k).await?;

        if matches.is_empty() {
            return Ok(RetrievedContext {
                has_knowledge_base: true,
                ..RetrievedContext::default()
            });
        }

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        let context = assemble_context(&matches, self.max_context_chars);
        tracing::debug!(matches = matches.len(), context_chars = context.len(), "Context assembled");

        let sources = matches
            .into_iter()
            .map(|m| SourceRef {
                filename: m.metadata.filename,
                chunk_index: m.metadata.chunk_index,
                score: m.score,
            })
            .collect();

        Ok(RetrievedContext {
            has_knowledge_base: true,
            context,
            sources,
        })
    }
}

/// Orders matches by score, drops repeated texts and caps the result at
/// `max_chars` characters plus the truncation marker.
pub fn assemble_context(matches: &[SearchResult], max_chars: usize) -> String {
    let mut ordered: Vec<&SearchResult> = matches.iter().collect();
    ordered.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut seen = HashSet::new();
    let context = ordered
        .into_iter()
        .filter(|m| seen.insert(m.metadata.text.as_str()))
        .map(|m| format!("[Source: {}]\n{}", m.metadata.filename, m.metadata.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    match context.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &context[..cut], TRUNCATION_MARKER),
        None => context,
    }
}

#[derive(Debug, thiserror::Error)]
enum RetrievalError {
    #[error("embedding: {0}")]
    Embedding(#[from] EmbedderError),
    #[error("vector store: {0}")]
    VectorStore(#[from] VectorStoreError),
}
