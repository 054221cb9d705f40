use uuid::Uuid;

/// A contiguous slice of a document's text.
///
/// `vector_id` stays `None` until the vector index has confirmed the upsert,
/// so a chunk without one is pending.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub id: ChunkId,
    pub document_id: DocumentId,
    pub chunk_index: u32,
    pub text: String,
    pub vector_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkId(Uuid);

impl ChunkId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ChunkId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunk {
    pub fn new(document_id: DocumentId, chunk_index: u32, text: String) -> Self {
        Self {
            id: ChunkId::new(),
            document_id,
            chunk_index,
            text,
            vector_id: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.vector_id.is_none()
    }
}
