use helpline::domain::{AttachmentId, ConversationId, StoragePath};

#[test]
fn given_conversation_and_attachment_when_creating_path_then_key_is_scoped_by_conversation() {
    let conversation_id = ConversationId::new();
    let attachment_id = AttachmentId::new();

    let path = StoragePath::new(&conversation_id, &attachment_id, "receipt.png");

    let expected = format!(
        "attachments/{}/{}-receipt.png",
        conversation_id.as_uuid(),
        attachment_id.as_uuid()
    );
    assert_eq!(path.as_str(), expected);
}

#[test]
fn given_same_filename_twice_when_creating_paths_then_paths_differ() {
    let conversation_id = ConversationId::new();

    let first = StoragePath::new(&conversation_id, &AttachmentId::new(), "photo.jpg");
    let second = StoragePath::new(&conversation_id, &AttachmentId::new(), "photo.jpg");

    assert_ne!(first, second);
}

#[test]
fn given_filename_with_directories_when_creating_path_then_only_base_name_is_kept() {
    let path = StoragePath::new(
        &ConversationId::new(),
        &AttachmentId::new(),
        "../../etc/passwd",
    );

    assert!(path.as_str().ends_with("-passwd"));
    assert!(!path.as_str().contains(".."));
}

#[test]
fn given_filename_with_spaces_when_creating_path_then_unsafe_characters_are_replaced() {
    let path = StoragePath::new(&ConversationId::new(), &AttachmentId::new(), "my invoice (1).pdf");

    assert!(path.as_str().ends_with("-my_invoice__1_.pdf"));
}

#[test]
fn given_hidden_or_empty_filename_when_creating_path_then_fallback_name_is_used() {
    let path = StoragePath::new(&ConversationId::new(), &AttachmentId::new(), "...");

    assert!(path.as_str().ends_with("-file"));
}

#[test]
fn given_storage_path_when_displayed_then_matches_as_str() {
    let path = StoragePath::new(&ConversationId::new(), &AttachmentId::new(), "notes.txt");

    assert_eq!(format!("{}", path), path.as_str());
}
