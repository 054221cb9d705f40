use helpline::application::ports::TextSplitter;
use helpline::domain::DocumentId;
use helpline::infrastructure::text_processing::SentenceWindowSplitter;

fn sentences(count: usize) -> String {
    (1..=count)
        .map(|i| format!("Sentence {i} explains one detail of the warranty policy."))
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn given_fifty_sentences_when_splitting_then_every_chunk_fits_the_target() {
    let splitter = SentenceWindowSplitter::new(512, 50);

    let chunks = splitter.split_text(&sentences(50));

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.chars().count() <= 512, "chunk too long: {}", chunk.len());
    }
}

#[test]
fn given_consecutive_chunks_when_splitting_then_next_chunk_starts_with_previous_tail() {
    let splitter = SentenceWindowSplitter::new(512, 50);

    let chunks = splitter.split_text(&sentences(50));

    for pair in chunks.windows(2) {
        let previous: Vec<&str> = pair[0].split(' ').collect();
        let tail = previous[previous.len().saturating_sub(50)..].join(" ");
        assert!(pair[1].starts_with(&tail));
    }
}

#[test]
fn given_zero_overlap_when_splitting_then_chunks_do_not_share_sentences() {
    let splitter = SentenceWindowSplitter::new(120, 0);

    let chunks = splitter.split_text(&sentences(6));

    assert!(chunks.len() > 1);
    assert!(chunks[1].starts_with("Sentence"));
    assert!(!chunks[1].starts_with(' '));
}

#[test]
fn given_text_without_terminators_when_splitting_then_one_oversized_chunk_is_kept() {
    let splitter = SentenceWindowSplitter::default();
    let text = "a".repeat(1200);

    let chunks = splitter.split_text(&text);

    assert_eq!(chunks, vec![text]);
}

#[test]
fn given_terminators_when_splitting_then_punctuation_is_dropped_and_fragments_are_joined() {
    let splitter = SentenceWindowSplitter::default();

    let chunks = splitter.split_text("Hello there! How are you? Fine.");

    assert_eq!(chunks, vec!["Hello there How are you Fine".to_string()]);
}

#[test]
fn given_blank_or_punctuation_only_text_when_splitting_then_no_chunks() {
    let splitter = SentenceWindowSplitter::default();

    assert!(splitter.split_text("").is_empty());
    assert!(splitter.split_text("  ... ?! ").is_empty());
}

#[test]
fn given_document_id_when_splitting_through_port_then_chunks_are_indexed_in_order() {
    let splitter = SentenceWindowSplitter::new(120, 5);
    let document_id = DocumentId::new();

    let chunks = splitter.split(&sentences(8), document_id);

    assert!(chunks.len() > 1);
    for (expected, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.chunk_index, expected as u32);
        assert_eq!(chunk.document_id, document_id);
        assert!(chunk.is_pending());
    }
}
