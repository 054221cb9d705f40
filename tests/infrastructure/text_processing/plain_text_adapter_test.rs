use helpline::application::ports::{FileLoader, FileLoaderError};
use helpline::domain::ContentType;
use helpline::infrastructure::text_processing::PlainTextAdapter;

#[tokio::test]
async fn given_utf8_text_when_extracting_then_content_is_returned() {
    let text = PlainTextAdapter
        .extract_text("Støtte på norsk".as_bytes(), ContentType::Text)
        .await
        .unwrap();

    assert_eq!(text, "Støtte på norsk");
}

#[tokio::test]
async fn given_byte_order_mark_when_extracting_then_it_is_stripped() {
    let text = PlainTextAdapter
        .extract_text("\u{feff}# FAQ".as_bytes(), ContentType::Markdown)
        .await
        .unwrap();

    assert_eq!(text, "# FAQ");
}

#[tokio::test]
async fn given_invalid_utf8_when_extracting_then_replacement_characters_are_used() {
    let text = PlainTextAdapter
        .extract_text(&[b'o', b'k', 0xFF], ContentType::Text)
        .await
        .unwrap();

    assert_eq!(text, "ok\u{FFFD}");
}

#[tokio::test]
async fn given_pdf_content_type_when_extracting_then_unsupported() {
    let result = PlainTextAdapter.extract_text(b"%PDF", ContentType::Pdf).await;

    assert!(matches!(result, Err(FileLoaderError::UnsupportedContentType(_))));
}
