use super::{Attachment, ConversationId, MessageId, MessageRole};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub role: MessageRole,
    pub content: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub attachment: Option<Attachment>,
}

impl Message {
    /// User messages are stored already read; nobody tracks whether an
    /// operator looked at customer input.
    pub fn user(conversation_id: ConversationId, content: String, now: DateTime<Utc>) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            role: MessageRole::User,
            content,
            is_read: true,
            read_at: Some(now),
            created_at: now,
            attachment: None,
        }
    }

    pub fn assistant(conversation_id: ConversationId, content: String, now: DateTime<Utc>) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            role: MessageRole::Assistant,
            content,
            is_read: false,
            read_at: None,
            created_at: now,
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}
