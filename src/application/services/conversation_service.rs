use std::sync::Arc;

use bytes::Bytes;

use crate::application::ports::{
    AttachmentStore, AttachmentStoreError, Clock, ConversationRepository, RepositoryError,
};
use crate::domain::{
    Attachment, AttachmentId, Conversation, ConversationId, ConversationStatus,
    InactivityStatus, InactivityWindows, Message, MessageId, MessageRole, StoragePath,
    derive_status,
};

use super::prompts::{PromptSet, SUMMARY_FALLBACK};
use super::reply_generator::{AttachmentNote, CompletionFailure, ReplyGenerator};
use super::retrieval_service::{RetrievalService, SourceRef};

#[derive(Debug, Clone)]
pub struct IncomingAttachment {
    pub file_name: String,
    pub mime_type: String,
    pub data: Bytes,
}

#[derive(Debug, Clone)]
pub struct SendMessage {
    pub session_id: Option<ConversationId>,
    pub message: String,
    pub attachment: Option<IncomingAttachment>,
}

#[derive(Debug, Clone)]
pub struct SentReply {
    pub session_id: ConversationId,
    pub reply: String,
    pub user_message_id: MessageId,
    pub assistant_message_id: MessageId,
    pub attachment: Option<Attachment>,
    pub sources: Vec<SourceRef>,
}

#[derive(Debug, Clone)]
pub struct ConversationHistory {
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone)]
pub struct Reopened {
    pub conversation: Conversation,
    pub summary: String,
    pub message: Message,
}

/// Lifecycle of support conversations: sending, read tracking, closing and
/// reopening.
///
/// Concurrent sends to the same conversation are not serialized. Two requests
/// can both observe `open` before either persists, so "is open" is only
/// checked per call.
pub struct ConversationService {
    conversations: Arc<dyn ConversationRepository>,
    retrieval: Arc<RetrievalService>,
    replies: Arc<ReplyGenerator>,
    attachments: Arc<dyn AttachmentStore>,
    prompts: Arc<PromptSet>,
    clock: Arc<dyn Clock>,
    windows: InactivityWindows,
}

impl ConversationService {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        retrieval: Arc<RetrievalService>,
        replies: Arc<ReplyGenerator>,
        attachments: Arc<dyn AttachmentStore>,
        prompts: Arc<PromptSet>,
        clock: Arc<dyn Clock>,
        windows: InactivityWindows,
    ) -> Self {
        Self {
            conversations,
            retrieval,
            replies,
            attachments,
            prompts,
            clock,
            windows,
        }
    }

    #[tracing::instrument(
        skip(self, input),
        fields(
            session_id = ?input.session_id.map(|id| id.as_uuid()),
            message_chars = input.message.chars().count(),
            attachment = input.attachment.is_some(),
        )
    )]
    pub async fn send_message(&self, input: SendMessage) -> Result<SentReply, ChatError> {
        let conversation = self.get_or_create(input.session_id).await?;
        let session_id = conversation.id;

        if conversation.is_closed() {
            return Err(ChatError::ConversationClosed { session_id });
        }

        let now = self.clock.now();
        let mut user_message = Message::user(session_id, input.message.clone(), now);
        let mut stored_path = None;
        if let Some(incoming) = input.attachment {
            let (attachment, path) = self
                .store_attachment(session_id, user_message.id, incoming)
                .await?;
            user_message = user_message.with_attachment(attachment);
            stored_path = Some(path);
        }

        if let Err(e) = self.conversations.append_message(&user_message).await {
            if let Some(path) = stored_path {
                self.discard_attachment(&path).await;
            }
            return Err(e.into());
        }

        let history: Vec<Message> = self
            .conversations
            .get_messages(session_id)
            .await?
            .into_iter()
            .filter(|m| m.id != user_message.id)
            .collect();

        let retrieved = self.retrieval.retrieve(&input.message).await;
        let system_prompt = self.prompts.system_prompt(&retrieved.context);
        let note = user_message.attachment.as_ref().map(|a| AttachmentNote {
            url: a.url.clone(),
            mime_type: a.mime_type.clone(),
        });

        let reply = self
            .replies
            .generate_reply(&system_prompt, &history, &input.message, note.as_ref())
            .await
            .map_err(|failure| ChatError::Completion {
                session_id,
                failure,
            })?;

        let assistant_message = Message::assistant(session_id, reply.clone(), self.clock.now());
        self.conversations.append_message(&assistant_message).await?;
        self.conversations
            .touch_activity(session_id, self.clock.now())
            .await?;

        tracing::info!(
            session_id = %session_id,
            knowledge_base = retrieved.has_knowledge_base,
            sources = retrieved.sources.len(),
            "Reply sent"
        );

        Ok(SentReply {
            session_id,
            reply,
            user_message_id: user_message.id,
            assistant_message_id: assistant_message.id,
            attachment: user_message.attachment,
            sources: retrieved.sources,
        })
    }

    async fn get_or_create(
        &self,
        session_id: Option<ConversationId>,
    ) -> Result<Conversation, ChatError> {
        if let Some(id) = session_id {
            if let Some(existing) = self.conversations.get_conversation(id).await? {
                return Ok(existing);
            }
            tracing::debug!(session_id = %id, "Unknown session, starting a new conversation");
        }

        let conversation = Conversation::new(self.clock.now());
        self.conversations.create_conversation(&conversation).await?;
        tracing::info!(session_id = %conversation.id, "Conversation created");
        Ok(conversation)
    }

    async fn store_attachment(
        &self,
        session_id: ConversationId,
        message_id: MessageId,
        incoming: IncomingAttachment,
    ) -> Result<(Attachment, StoragePath), ChatError> {
        let attachment_id = AttachmentId::new();
        let path = StoragePath::new(&session_id, &attachment_id, &incoming.file_name);
        let stored = self.attachments.store(&path, incoming.data).await?;

        let attachment = Attachment {
            id: attachment_id,
            message_id,
            file_name: incoming.file_name,
            mime_type: incoming.mime_type,
            url: stored.url,
            storage_id: Some(stored.storage_id),
            size_bytes: Some(stored.size_bytes),
            created_at: self.clock.now(),
        };
        Ok((attachment, path))
    }

    async fn discard_attachment(&self, path: &StoragePath) {
        if let Err(e) = self.attachments.delete(path).await {
            tracing::warn!(error = %e, path = %path, "Failed to delete orphaned attachment");
        }
    }

    pub async fn get_history(&self, session_id: ConversationId) -> Result<ConversationHistory, ChatError> {
        let conversation = self.require_conversation(session_id).await?;
        let messages = self.conversations.get_messages(session_id).await?;
        Ok(ConversationHistory {
            conversation,
            messages,
        })
    }

    /// Returns `true` when the message had already been read.
    #[tracing::instrument(skip(self), fields(message_id = %message_id))]
    pub async fn mark_message_read(&self, message_id: MessageId) -> Result<bool, ChatError> {
        let message = self
            .conversations
            .get_message(message_id)
            .await?
            .ok_or(ChatError::MessageNotFound(message_id))?;

        if message.is_read {
            return Ok(true);
        }

        let transitioned = self
            .conversations
            .mark_message_read(message_id, self.clock.now())
            .await?;
        Ok(!transitioned)
    }

    #[tracing::instrument(skip(self), fields(session_id = %session_id))]
    pub async fn mark_all_read(&self, session_id: ConversationId) -> Result<u64, ChatError> {
        self.require_conversation(session_id).await?;
        let updated = self
            .conversations
            .mark_assistant_messages_read(session_id, self.clock.now())
            .await?;
        tracing::debug!(updated, "Assistant messages marked read");
        Ok(updated)
    }

    pub async fn get_status(&self, session_id: ConversationId) -> Result<InactivityStatus, ChatError> {
        let conversation = self.require_conversation(session_id).await?;
        let latest = self
            .conversations
            .latest_message_by(session_id, MessageRole::Assistant)
            .await?;

        Ok(derive_status(
            &conversation,
            latest.as_ref(),
            self.windows,
            self.clock.now(),
        ))
    }

    /// Closes an open conversation and announces it. Closing a closed
    /// conversation changes nothing. The announcement is best effort: if it
    /// cannot be stored the conversation stays closed.
    #[tracing::instrument(skip(self), fields(session_id = %session_id))]
    pub async fn close(&self, session_id: ConversationId) -> Result<Conversation, ChatError> {
        let conversation = self.require_conversation(session_id).await?;
        if conversation.is_closed() {
            return Ok(conversation);
        }

        let now = self.clock.now();
        if !self.conversations.mark_closed(session_id, now).await? {
            return self.require_conversation(session_id).await;
        }

        let notice = Message::assistant(session_id, self.prompts.closed_notice.clone(), now);
        if let Err(e) = self.conversations.append_message(&notice).await {
            tracing::error!(error = %e, "Conversation closed but the closure notice was not stored");
        }

        tracing::info!("Conversation closed");
        Ok(Conversation {
            status: ConversationStatus::Closed,
            closed_at: Some(now),
            warning_sent_at: None,
            ..conversation
        })
    }

    /// Posts the inactivity warning and records when it went out.
    #[tracing::instrument(skip(self), fields(session_id = %session_id))]
    pub async fn send_warning(&self, session_id: ConversationId) -> Result<Message, ChatError> {
        let now = self.clock.now();
        let warning = Message::assistant(session_id, self.prompts.warning_notice.clone(), now);
        self.conversations.append_message(&warning).await?;
        self.conversations
            .set_warning_sent(session_id, Some(now))
            .await?;

        tracing::info!("Inactivity warning sent");
        Ok(warning)
    }

    #[tracing::instrument(skip(self), fields(session_id = %session_id))]
    pub async fn reopen(&self, session_id: ConversationId) -> Result<Reopened, ChatError> {
        let conversation = self.require_conversation(session_id).await?;
        if !conversation.is_closed() {
            return Err(ChatError::NotClosed(session_id));
        }

        let transcript: Vec<Message> = self
            .conversations
            .get_messages(session_id)
            .await?
            .into_iter()
            .filter(|m| !PromptSet::is_closed_notice(&m.content))
            .collect();

        let summary = if transcript.is_empty() {
            SUMMARY_FALLBACK.to_string()
        } else {
            self.replies
                .generate_summary(&transcript)
                .await
                .unwrap_or_else(|_| SUMMARY_FALLBACK.to_string())
        };

        let now = self.clock.now();
        if !self.conversations.mark_reopened(session_id, now).await? {
            return Err(ChatError::NotClosed(session_id));
        }

        let message = Message::assistant(session_id, self.prompts.reopened_notice(&summary), now);
        self.conversations.append_message(&message).await?;

        tracing::info!("Conversation reopened");
        Ok(Reopened {
            conversation: Conversation {
                status: ConversationStatus::Open,
                closed_at: None,
                warning_sent_at: None,
                last_activity_at: conversation.last_activity_at.max(now),
                ..conversation
            },
            summary,
            message,
        })
    }

    async fn require_conversation(&self, session_id: ConversationId) -> Result<Conversation, ChatError> {
        self.conversations
            .get_conversation(session_id)
            .await?
            .ok_or(ChatError::ConversationNotFound(session_id))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("conversation {session_id} is closed")]
    ConversationClosed { session_id: ConversationId },
    #[error("conversation {0} not found")]
    ConversationNotFound(ConversationId),
    #[error("message {0} not found")]
    MessageNotFound(MessageId),
    #[error("conversation {0} is not closed")]
    NotClosed(ConversationId),
    #[error("reply for {session_id} failed: {failure}")]
    Completion {
        session_id: ConversationId,
        failure: CompletionFailure,
    },
    #[error("attachment storage: {0}")]
    Attachment(#[from] AttachmentStoreError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}

impl ChatError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ConversationClosed { .. } => {
                "This conversation is closed. Please reopen it to continue."
            }
            Self::ConversationNotFound(_) => "Conversation not found",
            Self::MessageNotFound(_) => "Message not found",
            Self::NotClosed(_) => "Conversation is not closed",
            Self::Completion { failure, .. } => failure.user_message(),
            Self::Attachment(_) => "We couldn't upload your attachment. Please try again.",
            Self::Repository(e) if e.is_connectivity() => {
                "We're having trouble reaching our servers. Please try again in a moment."
            }
            Self::Repository(_) => "An unexpected error occurred. Please try again.",
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Completion { failure, .. } => failure.is_retryable(),
            Self::Attachment(_) | Self::Repository(_) => true,
            _ => false,
        }
    }

    /// Conversation the failed request was about, when one was resolved.
    pub fn session_id(&self) -> Option<ConversationId> {
        match self {
            Self::ConversationClosed { session_id } | Self::Completion { session_id, .. } => {
                Some(*session_id)
            }
            Self::ConversationNotFound(id) | Self::NotClosed(id) => Some(*id),
            _ => None,
        }
    }
}
