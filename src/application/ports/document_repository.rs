use crate::domain::{Chunk, ChunkId, Document, DocumentId};
use async_trait::async_trait;

use super::RepositoryError;

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Inserts the document and all of its chunks atomically.
    async fn create_document(
        &self,
        document: &Document,
        chunks: &[Chunk],
    ) -> Result<(), RepositoryError>;

    /// Records that the vector index holds these chunks under their own ids.
    async fn confirm_vectors(&self, chunk_ids: &[ChunkId]) -> Result<(), RepositoryError>;

    async fn get_document(&self, id: DocumentId) -> Result<Option<Document>, RepositoryError>;

    /// Chunks of the document ordered by index.
    async fn get_chunks(&self, document_id: DocumentId) -> Result<Vec<Chunk>, RepositoryError>;

    /// Newest first.
    async fn list_documents(&self) -> Result<Vec<Document>, RepositoryError>;

    /// Deletes the document and its chunks. Returns `false` when nothing matched.
    async fn delete_document(&self, id: DocumentId) -> Result<bool, RepositoryError>;
}
