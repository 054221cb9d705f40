use std::time::Duration;

use helpline::application::ports::LlmClientError;
use helpline::application::services::{SendMessage, SweepReport};
use helpline::domain::{ConversationId, ConversationStatus, MessageRole};
use tokio::sync::watch;

use crate::helpers::ChatHarness;

async fn read_conversation(harness: &ChatHarness) -> ConversationId {
    let sent = harness
        .service
        .send_message(SendMessage {
            session_id: None,
            message: "Can I change my delivery address?".to_string(),
            attachment: None,
        })
        .await
        .unwrap();
    harness.service.mark_all_read(sent.session_id).await.unwrap();
    sent.session_id
}

async fn reply(harness: &ChatHarness, session_id: ConversationId, message: &str) {
    harness
        .service
        .send_message(SendMessage {
            session_id: Some(session_id),
            message: message.to_string(),
            attachment: None,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn given_read_reply_and_silence_when_sweeping_then_warning_then_closure_follow() {
    let harness = ChatHarness::new();
    let session_id = read_conversation(&harness).await;
    let sweeper = harness.sweeper();

    harness.clock.advance_ms(60_000);
    let early = sweeper.sweep().await.unwrap();
    assert_eq!(early.warned, 0);

    harness.clock.advance_ms(60_000);
    let warned = sweeper.sweep().await.unwrap();
    assert_eq!(warned.warned, 1);

    let history = harness.service.get_history(session_id).await.unwrap();
    let warning = history.messages.last().unwrap();
    assert_eq!(warning.role, MessageRole::Assistant);
    assert_eq!(warning.content, harness.prompts.warning_notice);
    assert!(history.conversation.warning_sent_at.is_some());

    harness.clock.advance_ms(30_000);
    let waiting = sweeper.sweep().await.unwrap();
    assert_eq!(waiting, SweepReport { scanned: 1, ..SweepReport::default() });

    harness.clock.advance_ms(30_000);
    let closed = sweeper.sweep().await.unwrap();
    assert_eq!(closed.closed, 1);

    let history = harness.service.get_history(session_id).await.unwrap();
    assert_eq!(history.conversation.status, ConversationStatus::Closed);
    assert_eq!(history.conversation.warning_sent_at, None);
    assert_eq!(
        history.messages.last().unwrap().content,
        harness.prompts.closed_notice
    );
}

#[tokio::test]
async fn given_warning_already_sent_when_sweeping_again_then_no_second_warning() {
    let harness = ChatHarness::new();
    let session_id = read_conversation(&harness).await;
    let sweeper = harness.sweeper();

    harness.clock.advance_ms(120_000);
    sweeper.sweep().await.unwrap();
    harness.clock.advance_ms(10_000);
    sweeper.sweep().await.unwrap();

    let history = harness.service.get_history(session_id).await.unwrap();
    let warnings = history
        .messages
        .iter()
        .filter(|m| m.content == harness.prompts.warning_notice)
        .count();
    assert_eq!(warnings, 1);
}

#[tokio::test]
async fn given_user_replies_between_warning_and_close_when_sweeping_then_conversation_stays_open() {
    let harness = ChatHarness::new();
    let session_id = read_conversation(&harness).await;
    let sweeper = harness.sweeper();

    harness.clock.advance_ms(120_000);
    sweeper.sweep().await.unwrap();

    harness.clock.advance_ms(30_000);
    reply(&harness, session_id, "Sorry, still here!").await;

    harness.clock.advance_ms(30_000);
    let report = sweeper.sweep().await.unwrap();

    assert_eq!(report.closed, 0);
    let history = harness.service.get_history(session_id).await.unwrap();
    assert_eq!(history.conversation.status, ConversationStatus::Open);
    assert_eq!(history.conversation.warning_sent_at, None);
}

#[tokio::test]
async fn given_user_message_without_reply_after_warning_when_sweeping_then_warning_is_cleared() {
    let harness = ChatHarness::new();
    let session_id = read_conversation(&harness).await;
    let sweeper = harness.sweeper();

    harness.clock.advance_ms(120_000);
    sweeper.sweep().await.unwrap();

    harness.clock.advance_ms(10_000);
    harness.llm.push(Err(LlmClientError::Timeout));
    let failed = harness
        .service
        .send_message(SendMessage {
            session_id: Some(session_id),
            message: "hello?".to_string(),
            attachment: None,
        })
        .await;
    assert!(failed.is_err());

    harness.clock.advance_ms(60_000);
    let report = sweeper.sweep().await.unwrap();

    assert_eq!(report.cleared, 1);
    assert_eq!(report.closed, 0);
    let history = harness.service.get_history(session_id).await.unwrap();
    assert_eq!(history.conversation.status, ConversationStatus::Open);
    assert_eq!(history.conversation.warning_sent_at, None);
}

#[tokio::test]
async fn given_unread_reply_when_sweeping_then_conversation_is_left_alone() {
    let harness = ChatHarness::new();
    harness
        .service
        .send_message(SendMessage {
            session_id: None,
            message: "hello".to_string(),
            attachment: None,
        })
        .await
        .unwrap();

    harness.clock.advance_ms(600_000);
    let report = harness.sweeper().sweep().await.unwrap();

    assert_eq!(report, SweepReport::default());
}

#[tokio::test]
async fn given_reopened_conversation_when_notice_is_read_then_warning_follows_that_read() {
    let harness = ChatHarness::new();
    let session_id = read_conversation(&harness).await;
    let sweeper = harness.sweeper();
    harness.service.close(session_id).await.unwrap();

    harness.clock.advance_ms(600_000);
    harness.service.reopen(session_id).await.unwrap();
    harness.service.mark_all_read(session_id).await.unwrap();

    harness.clock.advance_ms(119_000);
    let before = sweeper.sweep().await.unwrap();
    assert_eq!(before.warned, 0);

    harness.clock.advance_ms(1_000);
    let at_window = sweeper.sweep().await.unwrap();
    assert_eq!(at_window.warned, 1);
}

#[tokio::test]
async fn given_reopened_conversation_with_unread_notice_when_sweeping_then_old_read_receipt_counts() {
    let harness = ChatHarness::new();
    let session_id = read_conversation(&harness).await;
    harness.service.close(session_id).await.unwrap();

    harness.clock.advance_ms(600_000);
    harness.service.reopen(session_id).await.unwrap();

    let report = harness.sweeper().sweep().await.unwrap();

    assert_eq!(report.warned, 1);
}

#[tokio::test]
async fn given_one_conversation_failing_when_sweeping_then_others_are_still_processed() {
    let harness = ChatHarness::new();
    let broken = read_conversation(&harness).await;
    let healthy = read_conversation(&harness).await;
    harness.repository.fail_appends_for(broken);

    harness.clock.advance_ms(120_000);
    let report = harness.sweeper().sweep().await.unwrap();

    assert_eq!(report.scanned, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.warned, 1);
    let history = harness.service.get_history(healthy).await.unwrap();
    assert!(history.conversation.warning_sent_at.is_some());
}

#[tokio::test]
async fn given_running_sweeper_when_shutdown_is_signalled_then_loop_exits() {
    let harness = ChatHarness::new();
    let sweeper = harness.sweeper();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let handle = tokio::spawn(sweeper.run(shutdown_rx));
    shutdown_tx.send(true).unwrap();

    let finished = tokio::time::timeout(Duration::from_secs(5), handle).await;
    assert!(finished.is_ok());
}
