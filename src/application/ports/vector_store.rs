use async_trait::async_trait;

use super::{CollectionConfig, SearchResult, VectorRecord, VectorStoreError};
use crate::domain::{DocumentId, Embedding};

#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn create_collection(&self, config: &CollectionConfig) -> Result<bool, VectorStoreError>;

    async fn collection_exists(&self) -> Result<bool, VectorStoreError>;

    /// Overwrites any existing vector with the same id.
    async fn upsert(&self, records: &[VectorRecord]) -> Result<(), VectorStoreError>;

    async fn search(
        &self,
        embedding: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, VectorStoreError>;

    async fn delete_by_document(&self, document_id: DocumentId) -> Result<(), VectorStoreError>;

    async fn count(&self) -> Result<u64, VectorStoreError>;
}
