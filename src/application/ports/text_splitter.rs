use crate::domain::{Chunk, DocumentId};

pub trait TextSplitter: Send + Sync {
    /// Splits extracted text into ordered chunks owned by `document_id`.
    /// Blank input yields no chunks.
    fn split(&self, text: &str, document_id: DocumentId) -> Vec<Chunk>;
}
