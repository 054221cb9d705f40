use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;

use crate::domain::StoragePath;
use crate::presentation::state::AppState;

use super::error::ApiError;

fn content_type_for(key: &str) -> &'static str {
    let extension = key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "txt" => "text/plain; charset=utf-8",
        "csv" => "text/csv; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Serves stored attachment bytes under the public attachment URL.
#[tracing::instrument(skip(state))]
pub async fn attachment_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if key.split('/').any(|segment| segment == "..") {
        return Err(ApiError::NotFound("Attachment not found".to_string()));
    }

    let path = StoragePath::from_raw(format!("attachments/{}", key));
    let data = state.attachments.fetch(&path).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type_for(&key)),
            (header::CACHE_CONTROL, "private, max-age=3600"),
        ],
        data,
    ))
}
