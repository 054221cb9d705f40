use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{DocumentRepository, RepositoryError};
use crate::domain::{Chunk, ChunkId, Document, DocumentId};

#[derive(Default)]
struct State {
    documents: HashMap<DocumentId, Document>,
    chunks: Vec<Chunk>,
}

#[derive(Default)]
pub struct InMemoryDocumentRepository {
    state: RwLock<State>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn create_document(
        &self,
        document: &Document,
        chunks: &[Chunk],
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if state.documents.contains_key(&document.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "document {} already exists",
                document.id.as_uuid()
            )));
        }
        state.documents.insert(document.id, document.clone());
        state.chunks.extend_from_slice(chunks);
        Ok(())
    }

    async fn confirm_vectors(&self, chunk_ids: &[ChunkId]) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        for chunk in state
            .chunks
            .iter_mut()
            .filter(|c| chunk_ids.contains(&c.id))
        {
            chunk.vector_id = Some(chunk.id.as_uuid().to_string());
        }
        Ok(())
    }

    async fn get_document(&self, id: DocumentId) -> Result<Option<Document>, RepositoryError> {
        Ok(self.state.read().await.documents.get(&id).cloned())
    }

    async fn get_chunks(&self, document_id: DocumentId) -> Result<Vec<Chunk>, RepositoryError> {
        let state = self.state.read().await;
        let mut chunks: Vec<Chunk> = state
            .chunks
            .iter()
            .filter(|c| c.document_id == document_id)
            .cloned()
            .collect();
        chunks.sort_by_key(|c| c.chunk_index);
        Ok(chunks)
    }

    async fn list_documents(&self) -> Result<Vec<Document>, RepositoryError> {
        let state = self.state.read().await;
        let mut documents: Vec<Document> = state.documents.values().cloned().collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(documents)
    }

    async fn delete_document(&self, id: DocumentId) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        let removed = state.documents.remove(&id).is_some();
        state.chunks.retain(|c| c.document_id != id);
        Ok(removed)
    }
}
