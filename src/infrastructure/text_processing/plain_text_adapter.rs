use async_trait::async_trait;

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::ContentType;

/// Decodes plain text and markdown as UTF-8, replacing invalid sequences.
pub struct PlainTextAdapter;

#[async_trait]
impl FileLoader for PlainTextAdapter {
    async fn extract_text(
        &self,
        data: &[u8],
        content_type: ContentType,
    ) -> Result<String, FileLoaderError> {
        if !matches!(content_type, ContentType::Text | ContentType::Markdown) {
            return Err(FileLoaderError::UnsupportedContentType(
                content_type.as_mime().to_string(),
            ));
        }

        let text = String::from_utf8_lossy(data);
        Ok(text.trim_start_matches('\u{feff}').to_string())
    }
}
