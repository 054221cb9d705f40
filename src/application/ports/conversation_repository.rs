use crate::domain::{Conversation, ConversationId, Message, MessageId, MessageRole};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::RepositoryError;

/// An open conversation paired with its most recent assistant message that
/// has been read.
#[derive(Debug, Clone)]
pub struct InactivityCandidate {
    pub conversation: Conversation,
    pub last_read_assistant: Message,
}

/// Status changes are exposed as targeted operations rather than a whole-row
/// update so that a request and the sweeper cannot overwrite each other's
/// transitions.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn create_conversation(&self, conversation: &Conversation)
    -> Result<(), RepositoryError>;

    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError>;

    /// Bumps `last_activity_at` (never backwards) and clears any warning marker.
    async fn touch_activity(
        &self,
        id: ConversationId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Moves an open conversation to closed and clears its warning marker.
    /// Returns `false` when the conversation was not open.
    async fn mark_closed(&self, id: ConversationId, at: DateTime<Utc>)
    -> Result<bool, RepositoryError>;

    /// Moves a closed conversation back to open with fresh activity.
    /// Returns `false` when the conversation was not closed.
    async fn mark_reopened(
        &self,
        id: ConversationId,
        at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>;

    async fn set_warning_sent(
        &self,
        id: ConversationId,
        at: Option<DateTime<Utc>>,
    ) -> Result<(), RepositoryError>;

    /// Persists the message together with its attachment, if any.
    async fn append_message(&self, message: &Message) -> Result<(), RepositoryError>;

    async fn get_message(&self, id: MessageId) -> Result<Option<Message>, RepositoryError>;

    /// All messages of the conversation, oldest first, attachments included.
    async fn get_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, RepositoryError>;

    /// Flips an unread message to read. Returns `false` when it was already read.
    async fn mark_message_read(
        &self,
        id: MessageId,
        at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>;

    /// Marks every unread assistant message of the conversation read and
    /// returns how many rows changed.
    async fn mark_assistant_messages_read(
        &self,
        conversation_id: ConversationId,
        at: DateTime<Utc>,
    ) -> Result<u64, RepositoryError>;

    async fn latest_message_by(
        &self,
        conversation_id: ConversationId,
        role: MessageRole,
    ) -> Result<Option<Message>, RepositoryError>;

    async fn list_inactivity_candidates(&self) -> Result<Vec<InactivityCandidate>, RepositoryError>;

    async fn has_user_message_after(
        &self,
        conversation_id: ConversationId,
        after: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>;
}
