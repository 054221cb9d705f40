use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use super::pg_pool::map_sqlx_error;
use crate::application::ports::{ConversationRepository, InactivityCandidate, RepositoryError};
use crate::domain::{
    Attachment, AttachmentId, Conversation, ConversationId, ConversationStatus, Message,
    MessageId, MessageRole,
};

const CONVERSATION_COLUMNS: &str =
    "id, status, created_at, last_activity_at, closed_at, warning_sent_at";

const MESSAGE_SELECT: &str = r#"
    SELECT m.id, m.conversation_id, m.role, m.content, m.is_read, m.read_at, m.created_at,
           a.id AS attachment_id, a.file_name, a.mime_type, a.url, a.storage_id,
           a.size_bytes, a.created_at AS attachment_created_at
    FROM messages m
    LEFT JOIN attachments a ON a.message_id = m.id
"#;

#[derive(FromRow)]
struct ConversationRow {
    id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    warning_sent_at: Option<DateTime<Utc>>,
}

impl TryFrom<ConversationRow> for Conversation {
    type Error = RepositoryError;

    fn try_from(row: ConversationRow) -> Result<Self, Self::Error> {
        Ok(Conversation {
            id: ConversationId::from_uuid(row.id),
            status: row
                .status
                .parse::<ConversationStatus>()
                .map_err(RepositoryError::CorruptRow)?,
            created_at: row.created_at,
            last_activity_at: row.last_activity_at,
            closed_at: row.closed_at,
            warning_sent_at: row.warning_sent_at,
        })
    }
}

#[derive(FromRow)]
struct MessageRow {
    id: Uuid,
    conversation_id: Uuid,
    role: String,
    content: String,
    is_read: bool,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    attachment_id: Option<Uuid>,
    file_name: Option<String>,
    mime_type: Option<String>,
    url: Option<String>,
    storage_id: Option<String>,
    size_bytes: Option<i64>,
    attachment_created_at: Option<DateTime<Utc>>,
}

impl TryFrom<MessageRow> for Message {
    type Error = RepositoryError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let message_id = MessageId::from_uuid(row.id);
        let attachment = match (row.attachment_id, row.file_name, row.mime_type, row.url) {
            (Some(id), Some(file_name), Some(mime_type), Some(url)) => Some(Attachment {
                id: AttachmentId::from_uuid(id),
                message_id,
                file_name,
                mime_type,
                url,
                storage_id: row.storage_id,
                size_bytes: row.size_bytes.map(|s| s.max(0) as u64),
                created_at: row.attachment_created_at.unwrap_or(row.created_at),
            }),
            _ => None,
        };

        Ok(Message {
            id: message_id,
            conversation_id: ConversationId::from_uuid(row.conversation_id),
            role: row
                .role
                .parse::<MessageRole>()
                .map_err(RepositoryError::CorruptRow)?,
            content: row.content,
            is_read: row.is_read,
            read_at: row.read_at,
            created_at: row.created_at,
            attachment,
        })
    }
}

#[derive(FromRow)]
struct CandidateRow {
    #[sqlx(flatten)]
    conversation: ConversationRow,
    message_id: Uuid,
    message_content: String,
    message_is_read: bool,
    message_read_at: Option<DateTime<Utc>>,
    message_created_at: DateTime<Utc>,
}

pub struct PgConversationRepository {
    pool: PgPool,
}

impl PgConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    #[instrument(skip(self, conversation), fields(conversation_id = %conversation.id.as_uuid()))]
    async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO conversations
                (id, status, created_at, last_activity_at, closed_at, warning_sent_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(conversation.id.as_uuid())
        .bind(conversation.status.as_str())
        .bind(conversation.created_at)
        .bind(conversation.last_activity_at)
        .bind(conversation.closed_at)
        .bind(conversation.warning_sent_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self), fields(conversation_id = %id.as_uuid()))]
    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query_as::<_, ConversationRow>(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(Conversation::try_from).transpose()
    }

    #[instrument(skip(self), fields(conversation_id = %id.as_uuid()))]
    async fn touch_activity(
        &self,
        id: ConversationId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE conversations
            SET last_activity_at = GREATEST(last_activity_at, $2),
                warning_sent_at = NULL
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self), fields(conversation_id = %id.as_uuid()))]
    async fn mark_closed(
        &self,
        id: ConversationId,
        at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE conversations
            SET status = 'closed', closed_at = $2, warning_sent_at = NULL
            WHERE id = $1 AND status = 'open'
            "#,
        )
        .bind(id.as_uuid())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(conversation_id = %id.as_uuid()))]
    async fn mark_reopened(
        &self,
        id: ConversationId,
        at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE conversations
            SET status = 'open', closed_at = NULL, warning_sent_at = NULL,
                last_activity_at = GREATEST(last_activity_at, $2)
            WHERE id = $1 AND status = 'closed'
            "#,
        )
        .bind(id.as_uuid())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(conversation_id = %id.as_uuid()))]
    async fn set_warning_sent(
        &self,
        id: ConversationId,
        at: Option<DateTime<Utc>>,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE conversations SET warning_sent_at = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self, message), fields(message_id = %message.id.as_uuid(), conversation_id = %message.conversation_id.as_uuid()))]
    async fn append_message(&self, message: &Message) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, role, content, is_read, read_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(message.id.as_uuid())
        .bind(message.conversation_id.as_uuid())
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(message.is_read)
        .bind(message.read_at)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if let Some(attachment) = &message.attachment {
            sqlx::query(
                r#"
                INSERT INTO attachments
                    (id, message_id, file_name, mime_type, url, storage_id, size_bytes, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(attachment.id.as_uuid())
            .bind(message.id.as_uuid())
            .bind(&attachment.file_name)
            .bind(&attachment.mime_type)
            .bind(&attachment.url)
            .bind(&attachment.storage_id)
            .bind(attachment.size_bytes.map(|s| s as i64))
            .bind(attachment.created_at)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    #[instrument(skip(self), fields(message_id = %id.as_uuid()))]
    async fn get_message(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!("{MESSAGE_SELECT} WHERE m.id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(Message::try_from).transpose()
    }

    #[instrument(skip(self), fields(conversation_id = %conversation_id.as_uuid()))]
    async fn get_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            "{MESSAGE_SELECT} WHERE m.conversation_id = $1 ORDER BY m.created_at ASC, m.seq ASC"
        ))
        .bind(conversation_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(Message::try_from).collect()
    }

    #[instrument(skip(self), fields(message_id = %id.as_uuid()))]
    async fn mark_message_read(
        &self,
        id: MessageId,
        at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = TRUE, read_at = $2 WHERE id = $1 AND NOT is_read",
        )
        .bind(id.as_uuid())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(conversation_id = %conversation_id.as_uuid()))]
    async fn mark_assistant_messages_read(
        &self,
        conversation_id: ConversationId,
        at: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET is_read = TRUE, read_at = $2
            WHERE conversation_id = $1 AND role = 'assistant' AND NOT is_read
            "#,
        )
        .bind(conversation_id.as_uuid())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self), fields(conversation_id = %conversation_id.as_uuid(), role = %role))]
    async fn latest_message_by(
        &self,
        conversation_id: ConversationId,
        role: MessageRole,
    ) -> Result<Option<Message>, RepositoryError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "{MESSAGE_SELECT} WHERE m.conversation_id = $1 AND m.role = $2 \
             ORDER BY m.created_at DESC, m.seq DESC LIMIT 1"
        ))
        .bind(conversation_id.as_uuid())
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(Message::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list_inactivity_candidates(&self) -> Result<Vec<InactivityCandidate>, RepositoryError> {
        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT c.id, c.status, c.created_at, c.last_activity_at, c.closed_at, c.warning_sent_at,
                   m.id AS message_id, m.content AS message_content, m.is_read AS message_is_read,
                   m.read_at AS message_read_at, m.created_at AS message_created_at
            FROM conversations c
            JOIN LATERAL (
                SELECT id, content, is_read, read_at, created_at
                FROM messages
                WHERE conversation_id = c.id AND role = 'assistant' AND is_read
                ORDER BY created_at DESC, seq DESC
                LIMIT 1
            ) m ON TRUE
            WHERE c.status = 'open'
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|row| {
                let conversation = Conversation::try_from(row.conversation)?;
                let last_read_assistant = Message {
                    id: MessageId::from_uuid(row.message_id),
                    conversation_id: conversation.id,
                    role: MessageRole::Assistant,
                    content: row.message_content,
                    is_read: row.message_is_read,
                    read_at: row.message_read_at,
                    created_at: row.message_created_at,
                    attachment: None,
                };
                Ok(InactivityCandidate {
                    conversation,
                    last_read_assistant,
                })
            })
            .collect()
    }

    #[instrument(skip(self), fields(conversation_id = %conversation_id.as_uuid()))]
    async fn has_user_message_after(
        &self,
        conversation_id: ConversationId,
        after: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM messages
                WHERE conversation_id = $1 AND role = 'user' AND created_at > $2
            )
            "#,
        )
        .bind(conversation_id.as_uuid())
        .bind(after)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }
}
