use std::sync::Arc;

use helpline::application::ports::{FileLoader, FileLoaderError};
use helpline::domain::ContentType;
use helpline::infrastructure::text_processing::{CompositeFileLoader, PlainTextAdapter};

#[tokio::test]
async fn given_markdown_when_loading_through_standard_loader_then_text_adapter_handles_it() {
    let loader = CompositeFileLoader::standard();

    let text = loader
        .extract_text(b"## Returns\nWithin 30 days.", ContentType::Markdown)
        .await
        .unwrap();

    assert_eq!(text, "## Returns\nWithin 30 days.");
}

#[tokio::test]
async fn given_unregistered_type_when_loading_then_unsupported_content_type() {
    let text: Arc<dyn FileLoader> = Arc::new(PlainTextAdapter);
    let loader = CompositeFileLoader::new(vec![(ContentType::Text, text)]);

    let result = loader.extract_text(b"%PDF-1.7", ContentType::Pdf).await;

    match result {
        Err(FileLoaderError::UnsupportedContentType(mime)) => assert_eq!(mime, "application/pdf"),
        other => panic!("expected unsupported content type, got {other:?}"),
    }
}

#[tokio::test]
async fn given_garbage_bytes_as_pdf_when_loading_then_extraction_fails() {
    let loader = CompositeFileLoader::standard();

    let result = loader.extract_text(b"not a pdf at all", ContentType::Pdf).await;

    assert!(matches!(result, Err(FileLoaderError::ExtractionFailed(_))));
}
