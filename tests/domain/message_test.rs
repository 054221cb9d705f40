use chrono::Utc;
use helpline::domain::{
    Attachment, AttachmentId, ConversationId, ConversationStatus, Message, MessageRole,
    mime_subtype,
};

#[test]
fn given_user_message_when_created_then_it_is_already_read() {
    let now = Utc::now();
    let message = Message::user(ConversationId::new(), "hello".to_string(), now);

    assert_eq!(message.role, MessageRole::User);
    assert!(message.is_read);
    assert_eq!(message.read_at, Some(now));
}

#[test]
fn given_assistant_message_when_created_then_it_is_unread() {
    let message = Message::assistant(ConversationId::new(), "hi there".to_string(), Utc::now());

    assert_eq!(message.role, MessageRole::Assistant);
    assert!(!message.is_read);
    assert_eq!(message.read_at, None);
}

#[test]
fn given_attachment_when_attached_then_message_carries_it() {
    let now = Utc::now();
    let message = Message::user(ConversationId::new(), "see file".to_string(), now);
    let attachment = Attachment {
        id: AttachmentId::new(),
        message_id: message.id,
        file_name: "photo.png".to_string(),
        mime_type: "image/png".to_string(),
        url: "http://files.test/a.png".to_string(),
        storage_id: None,
        size_bytes: Some(10),
        created_at: now,
    };

    let message = message.with_attachment(attachment);

    let attached = message.attachment.as_ref().unwrap();
    assert_eq!(attached.subtype(), "png");
}

#[test]
fn given_mime_without_subtype_when_reading_subtype_then_file_is_used() {
    assert_eq!(mime_subtype("application/pdf"), "pdf");
    assert_eq!(mime_subtype("garbage"), "file");
    assert_eq!(mime_subtype("image/"), "file");
}

#[test]
fn given_role_and_status_strings_when_parsing_then_round_trip_through_as_str() {
    assert_eq!("user".parse::<MessageRole>().unwrap(), MessageRole::User);
    assert_eq!("assistant".parse::<MessageRole>().unwrap(), MessageRole::Assistant);
    assert!("system".parse::<MessageRole>().is_err());
    assert_eq!("closed".parse::<ConversationStatus>().unwrap().as_str(), "closed");
    assert!("archived".parse::<ConversationStatus>().is_err());
}
