/// Payload fields the chunk index filters or sorts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFieldType {
    Keyword,
    Integer,
}

#[derive(Debug, Clone)]
pub struct PayloadIndex {
    pub field_name: &'static str,
    pub field_type: PayloadFieldType,
}

/// Shape of the chunk collection. Similarity is always cosine, which is what
/// the hosted embedding models are trained for.
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    pub vector_dimensions: u64,
    pub payload_indexes: Vec<PayloadIndex>,
}

impl CollectionConfig {
    pub fn new(vector_dimensions: u64) -> Self {
        let index = |field_name, field_type| PayloadIndex {
            field_name,
            field_type,
        };
        Self {
            vector_dimensions,
            payload_indexes: vec![
                index("document_id", PayloadFieldType::Keyword),
                index("filename", PayloadFieldType::Keyword),
                index("chunk_index", PayloadFieldType::Integer),
            ],
        }
    }
}
