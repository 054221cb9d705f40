mod in_memory_conversation_repository;
mod in_memory_document_repository;
mod in_memory_vector_store;
mod pg_conversation_repository;
mod pg_document_repository;
mod pg_pool;
mod qdrant_adapter;

pub use in_memory_conversation_repository::InMemoryConversationRepository;
pub use in_memory_document_repository::InMemoryDocumentRepository;
pub use in_memory_vector_store::InMemoryVectorStore;
pub use pg_conversation_repository::PgConversationRepository;
pub use pg_document_repository::PgDocumentRepository;
pub use pg_pool::{create_pool, run_migrations};
pub use qdrant_adapter::QdrantAdapter;
