mod canned_llm_client;
mod hashing_embedder;
mod openai_client;
mod openai_embedder;

pub use canned_llm_client::CannedLlmClient;
pub use hashing_embedder::HashingEmbedder;
pub use openai_client::OpenAiClient;
pub use openai_embedder::OpenAiEmbedder;
