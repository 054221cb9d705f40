mod conversation_service;
mod inactivity_sweeper;
mod ingestion_service;
mod prompts;
mod reply_generator;
mod retrieval_service;

pub use conversation_service::{
    ChatError, ConversationHistory, ConversationService, IncomingAttachment, Reopened,
    SendMessage, SentReply,
};
pub use inactivity_sweeper::{InactivitySweeper, SweepReport};
pub use ingestion_service::{
    DocumentDetail, DocumentSummary, IngestedDocument, IngestionError, IngestionService,
    KnowledgeBaseStats,
};
pub use prompts::{CLOSED_NOTICE_MARKER, PromptSet, SUMMARY_FALLBACK};
pub use reply_generator::{
    AttachmentNote, CompletionFailure, ReplyGenerator, build_reply_messages, render_transcript,
};
pub use retrieval_service::{RetrievalService, RetrievedContext, SourceRef, assemble_context};
