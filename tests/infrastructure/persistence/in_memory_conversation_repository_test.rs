use chrono::TimeDelta;

use helpline::application::ports::{ConversationRepository, RepositoryError};
use helpline::domain::{Conversation, ConversationStatus, Message, MessageRole};
use helpline::infrastructure::persistence::InMemoryConversationRepository;

use crate::helpers::start_time;

#[tokio::test]
async fn given_open_conversation_when_closing_twice_then_only_first_transition_applies() {
    let repository = InMemoryConversationRepository::new();
    let conversation = Conversation::new(start_time());
    repository.create_conversation(&conversation).await.unwrap();

    let first = repository.mark_closed(conversation.id, start_time()).await.unwrap();
    let second = repository.mark_closed(conversation.id, start_time()).await.unwrap();

    assert!(first);
    assert!(!second);
    let stored = repository.get_conversation(conversation.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ConversationStatus::Closed);
    assert_eq!(stored.closed_at, Some(start_time()));
}

#[tokio::test]
async fn given_message_for_unknown_conversation_when_appending_then_constraint_violation() {
    let repository = InMemoryConversationRepository::new();
    let orphan = Message::user(Conversation::new(start_time()).id, "hi".to_string(), start_time());

    let result = repository.append_message(&orphan).await;

    assert!(matches!(result, Err(RepositoryError::ConstraintViolation(_))));
}

#[tokio::test]
async fn given_older_timestamp_when_touching_activity_then_activity_never_moves_backwards() {
    let repository = InMemoryConversationRepository::new();
    let conversation = Conversation::new(start_time());
    repository.create_conversation(&conversation).await.unwrap();
    repository
        .set_warning_sent(conversation.id, Some(start_time()))
        .await
        .unwrap();

    repository
        .touch_activity(conversation.id, start_time() - TimeDelta::seconds(30))
        .await
        .unwrap();

    let stored = repository.get_conversation(conversation.id).await.unwrap().unwrap();
    assert_eq!(stored.last_activity_at, start_time());
    assert_eq!(stored.warning_sent_at, None);
}

#[tokio::test]
async fn given_read_and_unread_replies_when_listing_candidates_then_latest_read_reply_is_used() {
    let repository = InMemoryConversationRepository::new();
    let conversation = Conversation::new(start_time());
    repository.create_conversation(&conversation).await.unwrap();
    let read = Message::assistant(conversation.id, "first".to_string(), start_time());
    let unread = Message::assistant(
        conversation.id,
        "second".to_string(),
        start_time() + TimeDelta::seconds(5),
    );
    repository.append_message(&read).await.unwrap();
    repository.append_message(&unread).await.unwrap();
    repository.mark_message_read(read.id, start_time()).await.unwrap();

    let candidates = repository.list_inactivity_candidates().await.unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].last_read_assistant.id, read.id);
    let latest = repository
        .latest_message_by(conversation.id, MessageRole::Assistant)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.id, unread.id);
}

#[tokio::test]
async fn given_closed_conversation_when_listing_candidates_then_it_is_excluded() {
    let repository = InMemoryConversationRepository::new();
    let conversation = Conversation::new(start_time());
    repository.create_conversation(&conversation).await.unwrap();
    let reply = Message::assistant(conversation.id, "bye".to_string(), start_time());
    repository.append_message(&reply).await.unwrap();
    repository.mark_message_read(reply.id, start_time()).await.unwrap();
    repository.mark_closed(conversation.id, start_time()).await.unwrap();

    let candidates = repository.list_inactivity_candidates().await.unwrap();

    assert!(candidates.is_empty());
}
