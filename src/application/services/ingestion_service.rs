use std::sync::Arc;

use crate::application::ports::{
    Clock, DocumentRepository, Embedder, EmbedderError, EmbeddingMode, FileLoader,
    RepositoryError, TextSplitter, VectorMetadata, VectorRecord, VectorStore, VectorStoreError,
};
use crate::domain::{Chunk, ContentType, Document, DocumentId};

#[derive(Debug, Clone, PartialEq)]
pub struct IngestedDocument {
    pub document_id: DocumentId,
    pub filename: String,
    pub total_chunks: u32,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentDetail {
    pub document: Document,
    pub chunks: Vec<Chunk>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSummary {
    pub filename: String,
    pub chunks: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeBaseStats {
    pub total_documents: usize,
    pub total_vectors: u64,
    pub documents: Vec<DocumentSummary>,
}

/// Turns uploaded documents into searchable chunks and removes them again.
///
/// The relational store and the vector index are kept in step by ordering:
/// rows are written before vectors on ingest, vectors are removed before rows
/// on delete.
pub struct IngestionService {
    file_loader: Arc<dyn FileLoader>,
    text_splitter: Arc<dyn TextSplitter>,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    documents: Arc<dyn DocumentRepository>,
    clock: Arc<dyn Clock>,
}

impl IngestionService {
    pub fn new(
        file_loader: Arc<dyn FileLoader>,
        text_splitter: Arc<dyn TextSplitter>,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        documents: Arc<dyn DocumentRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            file_loader,
            text_splitter,
            embedder,
            vector_store,
            documents,
            clock,
        }
    }

    #[tracing::instrument(skip(self, data), fields(filename = %filename, bytes = data.len()))]
    pub async fn ingest(
        &self,
        data: &[u8],
        filename: String,
        content_type: ContentType,
    ) -> Result<IngestedDocument, IngestionError> {
        let text = self
            .file_loader
            .extract_text(data, content_type)
            .await
            .map_err(|e| IngestionError::Extraction(e.to_string()))?;

        if text.trim().is_empty() {
            return Err(IngestionError::Extraction(
                "No text content found in document".to_string(),
            ));
        }

        let mut document = Document::new(
            filename,
            content_type,
            data.len() as u64,
            0,
            self.clock.now(),
        );
        let chunks = self.text_splitter.split(&text, document.id);
        if chunks.is_empty() {
            return Err(IngestionError::EmptyDocument);
        }
        document.total_chunks = chunks.len() as u32;

        self.documents
            .create_document(&document, &chunks)
            .await
            .map_err(IngestionError::from_repository)?;
        tracing::debug!(
            document_id = %document.id.as_uuid(),
            chunks = chunks.len(),
            "Document rows written, vectors pending"
        );

        if let Err(e) = self.index_chunks(&document, &chunks).await {
            self.discard_partial(document.id).await;
            return Err(e);
        }

        let chunk_ids: Vec<_> = chunks.iter().map(|c| c.id).collect();
        if let Err(e) = self.documents.confirm_vectors(&chunk_ids).await {
            tracing::warn!(
                error = %e,
                document_id = %document.id.as_uuid(),
                "Vectors indexed but confirmation failed, chunks stay pending"
            );
        }

        tracing::info!(
            document_id = %document.id.as_uuid(),
            total_chunks = document.total_chunks,
            "Document ingested"
        );

        Ok(IngestedDocument {
            document_id: document.id,
            filename: document.filename,
            total_chunks: document.total_chunks,
            size_bytes: document.size_bytes,
        })
    }

    async fn index_chunks(&self, document: &Document, chunks: &[Chunk]) -> Result<(), IngestionError> {
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self
            .embedder
            .embed_batch(&texts, EmbeddingMode::Passage)
            .await?;

        if embeddings.len() != chunks.len() {
            return Err(IngestionError::Embedding(EmbedderError::InvalidResponse(
                format!("expected {} embeddings, got {}", chunks.len(), embeddings.len()),
            )));
        }

        let records: Vec<VectorRecord> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| VectorRecord {
                id: chunk.id,
                embedding,
                metadata: VectorMetadata {
                    text: chunk.text.clone(),
                    document_id: document.id,
                    chunk_index: chunk.chunk_index,
                    filename: document.filename.clone(),
                },
            })
            .collect();

        self.vector_store.upsert(&records).await?;
        Ok(())
    }

    /// Undoes a half-finished ingest in delete order so a retry starts clean.
    async fn discard_partial(&self, document_id: DocumentId) {
        if let Err(e) = self.vector_store.delete_by_document(document_id).await {
            tracing::error!(
                error = %e,
                document_id = %document_id.as_uuid(),
                "Could not remove partial vectors, keeping rows for retry"
            );
            return;
        }
        if let Err(e) = self.documents.delete_document(document_id).await {
            tracing::error!(
                error = %e,
                document_id = %document_id.as_uuid(),
                "Could not remove rows of failed ingest"
            );
        }
    }

    /// Removes vectors first; when that fails the rows stay so the call can
    /// be repeated.
    #[tracing::instrument(skip(self), fields(document_id = %id.as_uuid()))]
    pub async fn delete_document(&self, id: DocumentId) -> Result<String, IngestionError> {
        let document = self
            .documents
            .get_document(id)
            .await
            .map_err(IngestionError::from_repository)?
            .ok_or(IngestionError::NotFound(id))?;

        self.vector_store.delete_by_document(id).await?;

        self.documents
            .delete_document(id)
            .await
            .map_err(IngestionError::from_repository)?;

        tracing::info!(filename = %document.filename, "Document deleted");
        Ok(document.filename)
    }

    pub async fn list_documents(&self) -> Result<Vec<Document>, IngestionError> {
        self.documents
            .list_documents()
            .await
            .map_err(IngestionError::from_repository)
    }

    pub async fn get_document(&self, id: DocumentId) -> Result<DocumentDetail, IngestionError> {
        let document = self
            .documents
            .get_document(id)
            .await
            .map_err(IngestionError::from_repository)?
            .ok_or(IngestionError::NotFound(id))?;

        let chunks = self
            .documents
            .get_chunks(id)
            .await
            .map_err(IngestionError::from_repository)?;

        Ok(DocumentDetail { document, chunks })
    }

    pub async fn knowledge_base_stats(&self) -> Result<KnowledgeBaseStats, IngestionError> {
        let documents = self.list_documents().await?;
        let total_vectors = self.vector_store.count().await?;

        Ok(KnowledgeBaseStats {
            total_documents: documents.len(),
            total_vectors,
            documents: documents
                .into_iter()
                .map(|d| DocumentSummary {
                    filename: d.filename,
                    chunks: d.total_chunks,
                })
                .collect(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error("extraction failed: {0}")]
    Extraction(String),
    #[error("document produced no chunks")]
    EmptyDocument,
    #[error("document not found: {}", .0.as_uuid())]
    NotFound(DocumentId),
    #[error("database unreachable: {0}")]
    Connectivity(RepositoryError),
    #[error("embedding: {0}")]
    Embedding(#[from] EmbedderError),
    #[error("vector index: {0}")]
    VectorIndex(#[from] VectorStoreError),
    #[error("unexpected failure: {0}")]
    Unknown(String),
}

impl IngestionError {
    fn from_repository(error: RepositoryError) -> Self {
        if error.is_connectivity() {
            Self::Connectivity(error)
        } else {
            Self::Unknown(error.to_string())
        }
    }

    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::Extraction(_) | Self::EmptyDocument | Self::NotFound(_)
        )
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Extraction(_) => {
                "We couldn't read any text from this document. Please check the file and try again."
            }
            Self::EmptyDocument => "The document does not contain any usable text.",
            Self::NotFound(_) => "Document not found",
            Self::Connectivity(_) => {
                "We're having trouble reaching our database. Please try again in a moment."
            }
            Self::Embedding(_) | Self::VectorIndex(_) => {
                "The knowledge base is temporarily unavailable. Please try again in a moment."
            }
            Self::Unknown(_) => "An unexpected error occurred. Please try again.",
        }
    }
}
