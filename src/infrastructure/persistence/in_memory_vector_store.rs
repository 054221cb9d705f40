use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{
    CollectionConfig, SearchResult, VectorRecord, VectorStore, VectorStoreError,
};
use crate::domain::{ChunkId, DocumentId, Embedding};

/// Brute-force cosine search over vectors held in memory.
#[derive(Default)]
pub struct InMemoryVectorStore {
    records: RwLock<HashMap<ChunkId, VectorRecord>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, _config: &CollectionConfig) -> Result<bool, VectorStoreError> {
        Ok(false)
    }

    async fn collection_exists(&self) -> Result<bool, VectorStoreError> {
        Ok(true)
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<(), VectorStoreError> {
        let mut stored = self.records.write().await;
        for record in records {
            stored.insert(record.id, record.clone());
        }
        Ok(())
    }

    async fn search(
        &self,
        embedding: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, VectorStoreError> {
        let stored = self.records.read().await;
        let mut results: Vec<SearchResult> = stored
            .values()
            .map(|record| SearchResult {
                chunk_id: record.id,
                score: embedding.cosine_similarity(&record.embedding),
                metadata: record.metadata.clone(),
            })
            .collect();
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(top_k);
        Ok(results)
    }

    async fn delete_by_document(&self, document_id: DocumentId) -> Result<(), VectorStoreError> {
        self.records
            .write()
            .await
            .retain(|_, record| record.metadata.document_id != document_id);
        Ok(())
    }

    async fn count(&self) -> Result<u64, VectorStoreError> {
        Ok(self.records.read().await.len() as u64)
    }
}
