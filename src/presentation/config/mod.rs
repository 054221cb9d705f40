mod environment;
mod scaffold_config;
mod settings;

pub use environment::Environment;
pub use scaffold_config::ScaffoldConfig;
pub use settings::{
    ChatSettings, ChunkingSettings, DatabaseSettings, EmbeddingsSettings, LlmSettings,
    PersonaSettings, QdrantSettings, RagSettings, ServerSettings, Settings, StorageSettings,
};
