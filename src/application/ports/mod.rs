mod attachment_store;
mod clock;
mod collection_config;
mod conversation_repository;
mod document_repository;
mod embedder;
mod file_loader;
mod llm_client;
mod repository_error;
mod search_result;
mod text_splitter;
mod vector_store;
mod vector_store_error;

pub use attachment_store::{AttachmentStore, AttachmentStoreError, StoredAttachment};
pub use clock::Clock;
pub use collection_config::{CollectionConfig, PayloadFieldType, PayloadIndex};
pub use conversation_repository::{ConversationRepository, InactivityCandidate};
pub use document_repository::DocumentRepository;
pub use embedder::{Embedder, EmbedderError, EmbeddingMode};
pub use file_loader::{FileLoader, FileLoaderError};
pub use llm_client::{CompletionRequest, LlmClient, LlmClientError, PromptMessage, PromptRole};
pub use repository_error::RepositoryError;
pub use search_result::{SearchResult, VectorMetadata, VectorRecord};
pub use text_splitter::TextSplitter;
pub use vector_store::VectorStore;
pub use vector_store_error::VectorStoreError;
