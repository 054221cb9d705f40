use chrono::TimeDelta;

use helpline::application::ports::{ConversationRepository, DocumentRepository};
use helpline::domain::{
    Attachment, AttachmentId, Chunk, ContentType, Conversation, ConversationStatus, Document,
    Message, MessageRole,
};

use crate::helpers::start_time;
use crate::helpers::test_postgres::TestPostgres;

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_postgres_container_when_starting_then_migrations_create_tables() {
    let test_pg = TestPostgres::new().await;

    let tables: Vec<(String,)> = sqlx::query_as(
        "SELECT table_name::text FROM information_schema.tables \
         WHERE table_schema = 'public' ORDER BY table_name",
    )
    .fetch_all(&test_pg.pool)
    .await
    .unwrap();

    let names: Vec<&str> = tables.iter().map(|(name,)| name.as_str()).collect();
    for expected in ["attachments", "chunks", "conversations", "documents", "messages"] {
        assert!(names.contains(&expected), "missing table {expected}");
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_conversation_with_attachment_when_round_tripping_then_messages_come_back_in_order() {
    let test_pg = TestPostgres::new().await;
    let repository = &test_pg.conversation_repository;
    let conversation = Conversation::new(start_time());
    repository.create_conversation(&conversation).await.unwrap();

    let user = Message::user(conversation.id, "see photo".to_string(), start_time());
    let attachment = Attachment {
        id: AttachmentId::new(),
        message_id: user.id,
        file_name: "photo.png".to_string(),
        mime_type: "image/png".to_string(),
        url: "http://files.test/photo.png".to_string(),
        storage_id: Some("attachments/x/photo.png".to_string()),
        size_bytes: Some(42),
        created_at: start_time(),
    };
    let user = user.with_attachment(attachment);
    let reply = Message::assistant(conversation.id, "Nice photo".to_string(), start_time());
    repository.append_message(&user).await.unwrap();
    repository.append_message(&reply).await.unwrap();

    let messages = repository.get_messages(conversation.id).await.unwrap();

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], user);
    assert_eq!(messages[1].id, reply.id);
    assert_eq!(messages[1].attachment, None);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_status_transitions_when_applied_twice_then_second_is_a_no_op() {
    let test_pg = TestPostgres::new().await;
    let repository = &test_pg.conversation_repository;
    let conversation = Conversation::new(start_time());
    repository.create_conversation(&conversation).await.unwrap();
    let later = start_time() + TimeDelta::minutes(5);

    assert!(repository.mark_closed(conversation.id, later).await.unwrap());
    assert!(!repository.mark_closed(conversation.id, later).await.unwrap());
    assert!(repository.mark_reopened(conversation.id, later).await.unwrap());
    assert!(!repository.mark_reopened(conversation.id, later).await.unwrap());

    let stored = repository.get_conversation(conversation.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ConversationStatus::Open);
    assert_eq!(stored.closed_at, None);
    assert_eq!(stored.last_activity_at, later);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_read_reply_and_later_user_message_when_querying_inactivity_then_reply_is_detected() {
    let test_pg = TestPostgres::new().await;
    let repository = &test_pg.conversation_repository;
    let conversation = Conversation::new(start_time());
    repository.create_conversation(&conversation).await.unwrap();
    let reply = Message::assistant(conversation.id, "Anything else?".to_string(), start_time());
    repository.append_message(&reply).await.unwrap();
    assert_eq!(
        repository
            .mark_assistant_messages_read(conversation.id, start_time())
            .await
            .unwrap(),
        1
    );

    let candidates = repository.list_inactivity_candidates().await.unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].last_read_assistant.id, reply.id);
    assert!(
        !repository
            .has_user_message_after(conversation.id, reply.created_at)
            .await
            .unwrap()
    );

    let answer = Message::user(
        conversation.id,
        "No, thanks".to_string(),
        start_time() + TimeDelta::seconds(10),
    );
    repository.append_message(&answer).await.unwrap();

    assert!(
        repository
            .has_user_message_after(conversation.id, reply.created_at)
            .await
            .unwrap()
    );
    let latest_user = repository
        .latest_message_by(conversation.id, MessageRole::User)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest_user.id, answer.id);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_document_with_chunks_when_confirming_and_deleting_then_chunks_follow_document() {
    let test_pg = TestPostgres::new().await;
    let repository = &test_pg.document_repository;
    let document = Document::new("faq.md".to_string(), ContentType::Markdown, 64, 2, start_time());
    let chunks = vec![
        Chunk::new(document.id, 0, "Shipping is free.".to_string()),
        Chunk::new(document.id, 1, "Returns take 30 days.".to_string()),
    ];
    repository.create_document(&document, &chunks).await.unwrap();

    let pending = repository.get_chunks(document.id).await.unwrap();
    assert!(pending.iter().all(|c| c.is_pending()));

    let ids: Vec<_> = chunks.iter().map(|c| c.id).collect();
    repository.confirm_vectors(&ids).await.unwrap();
    let confirmed = repository.get_chunks(document.id).await.unwrap();
    assert_eq!(
        confirmed[0].vector_id.as_deref(),
        Some(chunks[0].id.as_uuid().to_string().as_str())
    );

    assert_eq!(
        repository.get_document(document.id).await.unwrap(),
        Some(document.clone())
    );
    assert!(repository.delete_document(document.id).await.unwrap());
    assert!(!repository.delete_document(document.id).await.unwrap());
    assert!(repository.get_chunks(document.id).await.unwrap().is_empty());
}
