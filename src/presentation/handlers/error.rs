use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::AttachmentStoreError;
use crate::application::services::{ChatError, CompletionFailure, IngestionError};

/// Failure body shared by every endpoint. Only user-safe text goes out; the
/// underlying error is logged.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error(transparent)]
    Ingestion(#[from] IngestionError),
    #[error(transparent)]
    Attachment(#[from] AttachmentStoreError),
}

impl ApiError {
    fn chat_status(error: &ChatError) -> StatusCode {
        match error {
            ChatError::ConversationClosed { .. } | ChatError::NotClosed(_) => {
                StatusCode::BAD_REQUEST
            }
            ChatError::ConversationNotFound(_) | ChatError::MessageNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ChatError::Completion { failure, .. } => match failure {
                CompletionFailure::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                CompletionFailure::Timeout => StatusCode::GATEWAY_TIMEOUT,
                CompletionFailure::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_GATEWAY,
            },
            ChatError::Repository(e) if e.is_connectivity() => StatusCode::SERVICE_UNAVAILABLE,
            ChatError::Attachment(_) | ChatError::Repository(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn ingestion_status(error: &IngestionError) -> StatusCode {
        match error {
            IngestionError::Extraction(_) | IngestionError::EmptyDocument => {
                StatusCode::BAD_REQUEST
            }
            IngestionError::NotFound(_) => StatusCode::NOT_FOUND,
            IngestionError::Connectivity(_)
            | IngestionError::Embedding(_)
            | IngestionError::VectorIndex(_) => StatusCode::SERVICE_UNAVAILABLE,
            IngestionError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, retryable, session_id) = match &self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone(), false, None),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone(), false, None),
            ApiError::PayloadTooLarge(m) => (StatusCode::PAYLOAD_TOO_LARGE, m.clone(), false, None),
            ApiError::UnsupportedMediaType(m) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, m.clone(), false, None)
            }
            ApiError::Chat(e) => {
                let status = Self::chat_status(e);
                if status.is_server_error() {
                    tracing::error!(error = %e, "Chat request failed");
                } else {
                    tracing::debug!(error = %e, "Chat request rejected");
                }
                (
                    status,
                    e.user_message().to_string(),
                    e.is_retryable(),
                    e.session_id().map(|id| id.to_string()),
                )
            }
            ApiError::Ingestion(e) => {
                let status = Self::ingestion_status(e);
                if status.is_server_error() {
                    tracing::error!(error = %e, "Document request failed");
                } else {
                    tracing::debug!(error = %e, "Document request rejected");
                }
                (status, e.user_message().to_string(), e.is_retryable(), None)
            }
            ApiError::Attachment(AttachmentStoreError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "Attachment not found".to_string(), false, None)
            }
            ApiError::Attachment(e) => {
                tracing::error!(error = %e, "Attachment download failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                    true,
                    None,
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error,
                retryable,
                session_id,
            }),
        )
            .into_response()
    }
}
