use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::ContentType;

use super::{PdfAdapter, PlainTextAdapter};

/// Routes extraction to the adapter registered for the content type.
pub struct CompositeFileLoader {
    adapters: HashMap<ContentType, Arc<dyn FileLoader>>,
}

impl CompositeFileLoader {
    pub fn new(adapters: Vec<(ContentType, Arc<dyn FileLoader>)>) -> Self {
        Self {
            adapters: adapters.into_iter().collect(),
        }
    }

    /// Plain text, markdown and PDF.
    pub fn standard() -> Self {
        let text: Arc<dyn FileLoader> = Arc::new(PlainTextAdapter);
        Self::new(vec![
            (ContentType::Text, Arc::clone(&text)),
            (ContentType::Markdown, text),
            (ContentType::Pdf, Arc::new(PdfAdapter::new())),
        ])
    }
}

#[async_trait]
impl FileLoader for CompositeFileLoader {
    async fn extract_text(
        &self,
        data: &[u8],
        content_type: ContentType,
    ) -> Result<String, FileLoaderError> {
        let adapter = self.adapters.get(&content_type).ok_or_else(|| {
            FileLoaderError::UnsupportedContentType(content_type.as_mime().to_string())
        })?;

        adapter.extract_text(data, content_type).await
    }
}
