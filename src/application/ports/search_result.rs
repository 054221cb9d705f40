use crate::domain::{ChunkId, DocumentId, Embedding};

/// Payload stored next to every vector.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMetadata {
    pub text: String,
    pub document_id: DocumentId,
    pub chunk_index: u32,
    pub filename: String,
}

/// One vector to upsert, keyed by the id of the chunk it encodes.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub id: ChunkId,
    pub embedding: Embedding,
    pub metadata: VectorMetadata,
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub chunk_id: ChunkId,
    pub score: f32,
    pub metadata: VectorMetadata,
}
