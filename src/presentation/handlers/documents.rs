use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{ContentType, Document, DocumentId};
use crate::presentation::state::AppState;

use super::chat::Envelope;
use super::error::ApiError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub document_id: Uuid,
    pub filename: String,
    pub total_chunks: u32,
    pub size_bytes: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    pub id: Uuid,
    pub filename: String,
    pub content_type: &'static str,
    pub size_bytes: u64,
    pub total_chunks: u32,
    pub created_at: DateTime<Utc>,
}

impl From<&Document> for DocumentView {
    fn from(document: &Document) -> Self {
        Self {
            id: document.id.as_uuid(),
            filename: document.filename.clone(),
            content_type: document.content_type.as_mime(),
            size_bytes: document.size_bytes,
            total_chunks: document.total_chunks,
            created_at: document.created_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkView {
    pub id: Uuid,
    pub chunk_index: u32,
    pub text: String,
    pub vector_id: Option<String>,
    pub pending: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDetailResponse {
    #[serde(flatten)]
    pub document: DocumentView,
    pub chunks: Vec<ChunkView>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatsEntry {
    pub filename: String,
    pub chunks: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_documents: usize,
    pub total_vectors: u64,
    pub documents: Vec<DocumentStatsEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

fn parse_document_id(raw: &str) -> Result<DocumentId, ApiError> {
    Uuid::parse_str(raw.trim())
        .map(DocumentId::from_uuid)
        .map_err(|_| ApiError::BadRequest("Invalid document ID".to_string()))
}

/// Resolves the document type from the declared MIME type, falling back to
/// the file extension when the client sent a generic type.
fn resolve_content_type(mime: Option<&str>, filename: &str) -> Option<ContentType> {
    mime.and_then(ContentType::from_mime)
        .or_else(|| match mime {
            None | Some("application/octet-stream") => ContentType::from_filename(filename),
            Some(_) => None,
        })
}

#[tracing::instrument(skip(state, multipart))]
pub async fn upload_document_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed form data: {}", e.body_text())))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("document").to_string();
        let declared = field.content_type().map(str::to_string);

        tracing::debug!(filename = %filename, content_type = ?declared, "Processing document upload");

        let content_type = resolve_content_type(declared.as_deref(), &filename).ok_or_else(|| {
            ApiError::UnsupportedMediaType(
                "Invalid file type. Only PDF, plain text and Markdown documents are supported."
                    .to_string(),
            )
        })?;

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        if data.is_empty() {
            return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
        }
        if data.len() > state.limits.max_document_bytes {
            return Err(ApiError::PayloadTooLarge(format!(
                "File too large. Maximum size is {}MB.",
                state.limits.max_document_bytes / (1024 * 1024)
            )));
        }

        let ingested = state
            .ingestion
            .ingest(&data, filename, content_type)
            .await?;

        return Ok((
            StatusCode::CREATED,
            Envelope::ok(UploadResponse {
                document_id: ingested.document_id.as_uuid(),
                filename: ingested.filename,
                total_chunks: ingested.total_chunks,
                size_bytes: ingested.size_bytes,
            }),
        ));
    }

    tracing::warn!("Document upload without a file field");
    Err(ApiError::BadRequest("No file uploaded".to_string()))
}

#[tracing::instrument(skip(state))]
pub async fn list_documents_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let documents = state.ingestion.list_documents().await?;
    let views: Vec<DocumentView> = documents.iter().map(DocumentView::from).collect();
    Ok((StatusCode::OK, Envelope::ok(views)))
}

#[tracing::instrument(skip(state))]
pub async fn document_stats_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state.ingestion.knowledge_base_stats().await?;

    Ok((
        StatusCode::OK,
        Envelope::ok(StatsResponse {
            total_documents: stats.total_documents,
            total_vectors: stats.total_vectors,
            documents: stats
                .documents
                .into_iter()
                .map(|d| DocumentStatsEntry {
                    filename: d.filename,
                    chunks: d.chunks,
                })
                .collect(),
        }),
    ))
}

#[tracing::instrument(skip(state))]
pub async fn get_document_handler(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let document_id = parse_document_id(&document_id)?;
    let detail = state.ingestion.get_document(document_id).await?;

    Ok((
        StatusCode::OK,
        Envelope::ok(DocumentDetailResponse {
            document: DocumentView::from(&detail.document),
            chunks: detail
                .chunks
                .into_iter()
                .map(|c| ChunkView {
                    id: c.id.as_uuid(),
                    chunk_index: c.chunk_index,
                    pending: c.is_pending(),
                    text: c.text,
                    vector_id: c.vector_id,
                })
                .collect(),
        }),
    ))
}

#[tracing::instrument(skip(state))]
pub async fn delete_document_handler(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let document_id = parse_document_id(&document_id)?;
    let filename = state.ingestion.delete_document(document_id).await?;

    Ok((
        StatusCode::OK,
        Json(DeleteResponse {
            success: true,
            message: format!("Document \"{}\" deleted", filename),
        }),
    ))
}
