use async_trait::async_trait;

use crate::application::ports::{Embedder, EmbedderError, EmbeddingMode};
use crate::domain::Embedding;

/// Deterministic bag-of-words embedder for running without a model service.
/// Texts sharing words land close together, which is enough for local demos.
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn encode(&self, text: &str) -> Embedding {
        let mut values = vec![0.0_f32; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let bucket = fnv1a(&word.to_lowercase()) as usize % self.dimensions;
            values[bucket] += 1.0;
        }

        Embedding::new(values).normalized()
    }
}

fn fnv1a(text: &str) -> u64 {
    text.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str, _mode: EmbeddingMode) -> Result<Embedding, EmbedderError> {
        Ok(self.encode(text))
    }

    async fn embed_batch(
        &self,
        texts: &[&str],
        _mode: EmbeddingMode,
    ) -> Result<Vec<Embedding>, EmbedderError> {
        Ok(texts.iter().map(|t| self.encode(t)).collect())
    }
}
