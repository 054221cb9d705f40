use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::application::ports::{ConversationRepository, InactivityCandidate, RepositoryError};
use crate::domain::{
    Conversation, ConversationId, ConversationStatus, Message, MessageId, MessageRole,
};

#[derive(Default)]
struct State {
    conversations: HashMap<ConversationId, Conversation>,
    messages: Vec<Message>,
}

impl State {
    /// Messages of one conversation in insertion order, which is creation order.
    fn thread(&self, conversation_id: ConversationId) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(move |m| m.conversation_id == conversation_id)
    }
}

/// Process-local repository for scaffold mode and tests.
#[derive(Default)]
pub struct InMemoryConversationRepository {
    state: RwLock<State>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if state.conversations.contains_key(&conversation.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "conversation {} already exists",
                conversation.id
            )));
        }
        state
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(())
    }

    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        Ok(self.state.read().await.conversations.get(&id).cloned())
    }

    async fn touch_activity(
        &self,
        id: ConversationId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        if let Some(conversation) = self.state.write().await.conversations.get_mut(&id) {
            conversation.last_activity_at = conversation.last_activity_at.max(at);
            conversation.warning_sent_at = None;
        }
        Ok(())
    }

    async fn mark_closed(
        &self,
        id: ConversationId,
        at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        match state.conversations.get_mut(&id) {
            Some(conversation) if conversation.status == ConversationStatus::Open => {
                conversation.status = ConversationStatus::Closed;
                conversation.closed_at = Some(at);
                conversation.warning_sent_at = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_reopened(
        &self,
        id: ConversationId,
        at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        match state.conversations.get_mut(&id) {
            Some(conversation) if conversation.status == ConversationStatus::Closed => {
                conversation.status = ConversationStatus::Open;
                conversation.closed_at = None;
                conversation.warning_sent_at = None;
                conversation.last_activity_at = conversation.last_activity_at.max(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_warning_sent(
        &self,
        id: ConversationId,
        at: Option<DateTime<Utc>>,
    ) -> Result<(), RepositoryError> {
        if let Some(conversation) = self.state.write().await.conversations.get_mut(&id) {
            conversation.warning_sent_at = at;
        }
        Ok(())
    }

    async fn append_message(&self, message: &Message) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if !state.conversations.contains_key(&message.conversation_id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "conversation {} does not exist",
                message.conversation_id
            )));
        }
        state.messages.push(message.clone());
        Ok(())
    }

    async fn get_message(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.messages.iter().find(|m| m.id == id).cloned())
    }

    async fn get_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let state = self.state.read().await;
        let mut messages: Vec<Message> = state.thread(conversation_id).cloned().collect();
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    async fn mark_message_read(
        &self,
        id: MessageId,
        at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        match state.messages.iter_mut().find(|m| m.id == id) {
            Some(message) if !message.is_read => {
                message.is_read = true;
                message.read_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_assistant_messages_read(
        &self,
        conversation_id: ConversationId,
        at: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let mut state = self.state.write().await;
        let mut updated = 0;
        for message in state.messages.iter_mut().filter(|m| {
            m.conversation_id == conversation_id && m.role == MessageRole::Assistant && !m.is_read
        }) {
            message.is_read = true;
            message.read_at = Some(at);
            updated += 1;
        }
        Ok(updated)
    }

    async fn latest_message_by(
        &self,
        conversation_id: ConversationId,
        role: MessageRole,
    ) -> Result<Option<Message>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .thread(conversation_id)
            .filter(|m| m.role == role)
            .max_by_key(|m| m.created_at)
            .cloned())
    }

    async fn list_inactivity_candidates(&self) -> Result<Vec<InactivityCandidate>, RepositoryError> {
        let state = self.state.read().await;
        let candidates = state
            .conversations
            .values()
            .filter(|c| c.status == ConversationStatus::Open)
            .filter_map(|conversation| {
                let last_read_assistant = state
                    .thread(conversation.id)
                    .filter(|m| m.role == MessageRole::Assistant && m.is_read)
                    .max_by_key(|m| m.created_at)?
                    .clone();
                Some(InactivityCandidate {
                    conversation: conversation.clone(),
                    last_read_assistant,
                })
            })
            .collect();
        Ok(candidates)
    }

    async fn has_user_message_after(
        &self,
        conversation_id: ConversationId,
        after: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .thread(conversation_id)
            .any(|m| m.role == MessageRole::User && m.created_at > after))
    }
}
