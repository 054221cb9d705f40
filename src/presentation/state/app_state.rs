use std::sync::Arc;

use crate::application::ports::AttachmentStore;
use crate::application::services::{ConversationService, IngestionService};

/// Upload and message limits enforced at the HTTP edge.
#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    pub max_message_length: usize,
    pub max_attachment_bytes: usize,
    pub max_document_bytes: usize,
}

impl RequestLimits {
    /// Multipart framing overhead on top of the largest accepted file.
    const BODY_OVERHEAD: usize = 64 * 1024;

    pub fn max_body_bytes(&self) -> usize {
        self.max_attachment_bytes.max(self.max_document_bytes)
            + self.max_message_length * 4
            + Self::BODY_OVERHEAD
    }
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_message_length: 8000,
            max_attachment_bytes: 10 * 1024 * 1024,
            max_document_bytes: 20 * 1024 * 1024,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ConversationService>,
    pub ingestion: Arc<IngestionService>,
    pub attachments: Arc<dyn AttachmentStore>,
    pub limits: RequestLimits,
}
