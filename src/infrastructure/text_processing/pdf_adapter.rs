use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::ContentType;

use super::text_sanitizer::sanitize_extracted_text;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Extracts the text layer of a PDF on a blocking thread.
pub struct PdfAdapter {
    timeout: Duration,
}

impl PdfAdapter {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Default for PdfAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileLoader for PdfAdapter {
    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    async fn extract_text(
        &self,
        data: &[u8],
        content_type: ContentType,
    ) -> Result<String, FileLoaderError> {
        if content_type != ContentType::Pdf {
            return Err(FileLoaderError::UnsupportedContentType(
                content_type.as_mime().to_string(),
            ));
        }

        let bytes = data.to_vec();
        let raw = tokio::time::timeout(
            self.timeout,
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)),
        )
        .await
        .map_err(|_| FileLoaderError::Timeout(self.timeout.as_secs()))?
        .map_err(|e| FileLoaderError::ExtractionFailed(format!("extraction task failed: {e}")))?
        .map_err(|e| FileLoaderError::ExtractionFailed(format!("failed to parse PDF: {e}")))?;

        let text = sanitize_extracted_text(&raw);
        tracing::info!(chars = text.len(), "PDF text extraction complete");
        Ok(text)
    }
}
