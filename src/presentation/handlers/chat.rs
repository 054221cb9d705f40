use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::application::services::{IncomingAttachment, SendMessage};
use crate::domain::{Attachment, ConversationId, Message, MessageId};
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::{AppState, RequestLimits};

use super::error::ApiError;

const ALLOWED_ATTACHMENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "text/plain",
    "text/csv",
];

#[derive(Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRef {
    pub id: Uuid,
    pub file_name: String,
    pub file_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub session_id: String,
    pub reply: String,
    pub user_message_id: String,
    pub assistant_message_id: String,
    pub attachment: Option<AttachmentRef>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentView {
    pub id: Uuid,
    pub file_name: String,
    pub file_type: String,
    pub file_url: String,
}

impl From<&Attachment> for AttachmentView {
    fn from(attachment: &Attachment) -> Self {
        Self {
            id: attachment.id.as_uuid(),
            file_name: attachment.file_name.clone(),
            file_type: attachment.mime_type.clone(),
            file_url: attachment.url.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: String,
    pub sender: &'static str,
    pub text: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub attachments: Vec<AttachmentView>,
}

impl From<&Message> for MessageView {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.to_string(),
            sender: message.role.as_str(),
            text: message.content.clone(),
            is_read: message.is_read,
            created_at: message.created_at,
            attachments: message.attachment.iter().map(AttachmentView::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub id: String,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<MessageView>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: &'static str,
    pub warning_issued: bool,
    pub time_until_warning: Option<i64>,
    pub time_until_close: Option<i64>,
    pub last_assistant_message_read_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResponse {
    pub already_read: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadAllResponse {
    pub count: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseResponse {
    pub id: String,
    pub status: &'static str,
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReopenResponse {
    pub session_id: String,
    pub summary: String,
    pub message: MessageView,
}

pub(crate) fn parse_session_id(raw: &str) -> Result<ConversationId, ApiError> {
    Uuid::parse_str(raw.trim())
        .map(ConversationId::from_uuid)
        .map_err(|_| ApiError::BadRequest("Invalid session ID".to_string()))
}

fn parse_message_id(raw: &str) -> Result<MessageId, ApiError> {
    Uuid::parse_str(raw.trim())
        .map(MessageId::from_uuid)
        .map_err(|_| ApiError::BadRequest("Invalid message ID".to_string()))
}

pub(crate) fn validate_message(message: &str, limits: &RequestLimits) -> Result<String, ApiError> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest("Message cannot be empty".to_string()));
    }
    if trimmed.chars().count() > limits.max_message_length {
        return Err(ApiError::BadRequest(format!(
            "Your message is too long. Please keep it under {} characters (approximately {} words).",
            limits.max_message_length,
            limits.max_message_length / 5
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_attachment(attachment: &IncomingAttachment, limits: &RequestLimits) -> Result<(), ApiError> {
    let mime = attachment
        .mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !ALLOWED_ATTACHMENT_TYPES.contains(&mime.as_str()) {
        return Err(ApiError::UnsupportedMediaType(
            "Invalid file type. Allowed: images (JPEG, PNG, GIF, WebP), PDF, text and CSV files."
                .to_string(),
        ));
    }
    if attachment.data.len() > limits.max_attachment_bytes {
        return Err(ApiError::PayloadTooLarge(format!(
            "File too large. Maximum size is {}MB.",
            limits.max_attachment_bytes / (1024 * 1024)
        )));
    }
    Ok(())
}

#[derive(Default)]
struct SendForm {
    message: Option<String>,
    session_id: Option<String>,
    attachment: Option<IncomingAttachment>,
}

async fn read_send_form(mut multipart: Multipart) -> Result<SendForm, ApiError> {
    let mut form = SendForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed form data: {}", e.body_text())))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "message" => {
                let value = field.text().await.map_err(|e| ApiError::BadRequest(e.body_text()))?;
                form.message = Some(value);
            }
            "sessionId" => {
                let value = field.text().await.map_err(|e| ApiError::BadRequest(e.body_text()))?;
                if !value.trim().is_empty() {
                    form.session_id = Some(value);
                }
            }
            "file" => {
                let file_name = field.file_name().unwrap_or("attachment").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(|e| ApiError::BadRequest(e.body_text()))?;
                if !data.is_empty() {
                    form.attachment = Some(IncomingAttachment {
                        file_name,
                        mime_type,
                        data,
                    });
                }
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown form field");
            }
        }
    }

    Ok(form)
}

#[tracing::instrument(skip(state, multipart))]
pub async fn send_message_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_send_form(multipart).await?;

    let message = validate_message(form.message.as_deref().unwrap_or_default(), &state.limits)?;
    tracing::debug!(message = %sanitize_prompt(&message), "Processing chat message");
    let session_id = form.session_id.as_deref().map(parse_session_id).transpose()?;
    let attachment = form.attachment;
    if let Some(attachment) = &attachment {
        validate_attachment(attachment, &state.limits)?;
    }

    let sent = state
        .chat
        .send_message(SendMessage {
            session_id,
            message,
            attachment,
        })
        .await?;

    Ok((
        StatusCode::OK,
        Envelope::ok(SendMessageResponse {
            session_id: sent.session_id.to_string(),
            reply: sent.reply,
            user_message_id: sent.user_message_id.to_string(),
            assistant_message_id: sent.assistant_message_id.to_string(),
            attachment: sent.attachment.map(|a| AttachmentRef {
                id: a.id.as_uuid(),
                file_name: a.file_name,
                file_url: a.url,
            }),
        }),
    ))
}

#[tracing::instrument(skip(state))]
pub async fn history_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let history = state.chat.get_history(session_id).await?;

    Ok((
        StatusCode::OK,
        Envelope::ok(HistoryResponse {
            id: history.conversation.id.to_string(),
            status: history.conversation.status.as_str(),
            created_at: history.conversation.created_at,
            messages: history.messages.iter().map(MessageView::from).collect(),
        }),
    ))
}

#[tracing::instrument(skip(state))]
pub async fn status_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let status = state.chat.get_status(session_id).await?;

    Ok((
        StatusCode::OK,
        Envelope::ok(StatusResponse {
            status: status.status.as_str(),
            warning_issued: status.warning_issued,
            time_until_warning: status.time_until_warning.map(|d| d.num_milliseconds()),
            time_until_close: status.time_until_close.map(|d| d.num_milliseconds()),
            last_assistant_message_read_at: status.last_assistant_read_at,
        }),
    ))
}

#[tracing::instrument(skip(state))]
pub async fn mark_read_handler(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let message_id = parse_message_id(&message_id)?;
    let already_read = state.chat.mark_message_read(message_id).await?;

    Ok((StatusCode::OK, Envelope::ok(ReadResponse { already_read })))
}

#[tracing::instrument(skip(state))]
pub async fn mark_all_read_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let count = state.chat.mark_all_read(session_id).await?;

    Ok((StatusCode::OK, Envelope::ok(ReadAllResponse { count })))
}

#[tracing::instrument(skip(state))]
pub async fn close_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let conversation = state.chat.close(session_id).await?;

    Ok((
        StatusCode::OK,
        Envelope::ok(CloseResponse {
            id: conversation.id.to_string(),
            status: conversation.status.as_str(),
            closed_at: conversation.closed_at,
        }),
    ))
}

#[tracing::instrument(skip(state))]
pub async fn reopen_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let reopened = state.chat.reopen(session_id).await?;

    Ok((
        StatusCode::OK,
        Envelope::ok(ReopenResponse {
            session_id: reopened.conversation.id.to_string(),
            summary: reopened.summary,
            message: MessageView::from(&reopened.message),
        }),
    ))
}
