pub mod clock;
pub mod llm;
pub mod observability;
pub mod persistence;
pub mod retry;
pub mod storage;
pub mod text_processing;
