use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use helpline::domain::{
    Conversation, ConversationStatus, InactivityWindows, Message, SweepAction,
    decide_sweep_action, derive_status,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

fn ms(value: i64) -> TimeDelta {
    TimeDelta::milliseconds(value)
}

fn read_reply(conversation: &Conversation, read_at: DateTime<Utc>) -> Message {
    let mut reply = Message::assistant(conversation.id, "Here you go.".to_string(), t0());
    reply.is_read = true;
    reply.read_at = Some(read_at);
    reply
}

#[test]
fn given_default_windows_when_created_then_warning_is_two_minutes_and_close_one_minute() {
    let windows = InactivityWindows::default();

    assert_eq!(windows.warning, ms(120_000));
    assert_eq!(windows.close, ms(60_000));
}

#[test]
fn given_reply_read_150_seconds_ago_when_deriving_status_then_warning_is_issued_and_close_in_30_seconds() {
    let conversation = Conversation::new(t0());
    let reply = read_reply(&conversation, t0());

    let status = derive_status(
        &conversation,
        Some(&reply),
        InactivityWindows::default(),
        t0() + ms(150_000),
    );

    assert_eq!(status.status, ConversationStatus::Open);
    assert!(status.warning_issued);
    assert_eq!(status.time_until_warning, Some(TimeDelta::zero()));
    assert_eq!(status.time_until_close, Some(ms(30_000)));
    assert_eq!(status.last_assistant_read_at, Some(t0()));
}

#[test]
fn given_reply_read_moments_ago_when_deriving_status_then_countdown_runs() {
    let conversation = Conversation::new(t0());
    let reply = read_reply(&conversation, t0());

    let status = derive_status(
        &conversation,
        Some(&reply),
        InactivityWindows::default(),
        t0() + ms(20_000),
    );

    assert!(!status.warning_issued);
    assert_eq!(status.time_until_warning, Some(ms(100_000)));
    assert_eq!(status.time_until_close, Some(ms(160_000)));
}

#[test]
fn given_long_idle_when_deriving_status_then_durations_never_go_negative() {
    let conversation = Conversation::new(t0());
    let reply = read_reply(&conversation, t0());

    let status = derive_status(
        &conversation,
        Some(&reply),
        InactivityWindows::default(),
        t0() + ms(900_000),
    );

    assert_eq!(status.time_until_warning, Some(TimeDelta::zero()));
    assert_eq!(status.time_until_close, Some(TimeDelta::zero()));
}

#[test]
fn given_unread_latest_reply_when_deriving_status_then_there_is_no_countdown() {
    let conversation = Conversation::new(t0());
    let reply = Message::assistant(conversation.id, "Unread".to_string(), t0());

    let status = derive_status(
        &conversation,
        Some(&reply),
        InactivityWindows::default(),
        t0() + ms(600_000),
    );

    assert!(!status.warning_issued);
    assert_eq!(status.time_until_warning, None);
    assert_eq!(status.time_until_close, None);
    assert_eq!(status.last_assistant_read_at, None);
}

#[test]
fn given_no_assistant_message_when_deriving_status_then_there_is_no_countdown() {
    let conversation = Conversation::new(t0());

    let status = derive_status(&conversation, None, InactivityWindows::default(), t0());

    assert_eq!(status.time_until_warning, None);
}

#[test]
fn given_closed_conversation_when_deriving_status_then_status_is_closed_without_countdown() {
    let mut conversation = Conversation::new(t0());
    conversation.status = ConversationStatus::Closed;
    conversation.closed_at = Some(t0());
    let reply = read_reply(&conversation, t0());

    let status = derive_status(
        &conversation,
        Some(&reply),
        InactivityWindows::default(),
        t0() + ms(150_000),
    );

    assert_eq!(status.status, ConversationStatus::Closed);
    assert!(!status.warning_issued);
    assert_eq!(status.time_until_close, None);
}

#[test]
fn given_idle_past_warning_window_when_deciding_then_warn() {
    let conversation = Conversation::new(t0());
    let reply = read_reply(&conversation, t0());

    let action = decide_sweep_action(
        &conversation,
        &reply,
        false,
        InactivityWindows::default(),
        t0() + ms(120_000),
    );

    assert_eq!(action, SweepAction::Warn);
}

#[test]
fn given_idle_within_warning_window_when_deciding_then_skip() {
    let conversation = Conversation::new(t0());
    let reply = read_reply(&conversation, t0());

    let action = decide_sweep_action(
        &conversation,
        &reply,
        false,
        InactivityWindows::default(),
        t0() + ms(119_999),
    );

    assert_eq!(action, SweepAction::Skip);
}

#[test]
fn given_warning_older_than_close_window_when_deciding_then_close() {
    let mut conversation = Conversation::new(t0());
    conversation.warning_sent_at = Some(t0() + ms(120_000));
    let reply = read_reply(&conversation, t0());

    let action = decide_sweep_action(
        &conversation,
        &reply,
        false,
        InactivityWindows::default(),
        t0() + ms(180_000),
    );

    assert_eq!(action, SweepAction::Close);
}

#[test]
fn given_recent_warning_when_deciding_then_wait_without_second_warning() {
    let mut conversation = Conversation::new(t0());
    conversation.warning_sent_at = Some(t0() + ms(120_000));
    let reply = read_reply(&conversation, t0());

    let action = decide_sweep_action(
        &conversation,
        &reply,
        false,
        InactivityWindows::default(),
        t0() + ms(150_000),
    );

    assert_eq!(action, SweepAction::Skip);
}

#[test]
fn given_user_replied_after_warning_when_deciding_then_clear_warning() {
    let mut conversation = Conversation::new(t0());
    conversation.warning_sent_at = Some(t0() + ms(120_000));
    let reply = read_reply(&conversation, t0());

    let action = decide_sweep_action(
        &conversation,
        &reply,
        true,
        InactivityWindows::default(),
        t0() + ms(600_000),
    );

    assert_eq!(action, SweepAction::ClearWarning);
}

#[test]
fn given_user_replied_without_warning_when_deciding_then_skip() {
    let conversation = Conversation::new(t0());
    let reply = read_reply(&conversation, t0());

    let action = decide_sweep_action(
        &conversation,
        &reply,
        true,
        InactivityWindows::default(),
        t0() + ms(600_000),
    );

    assert_eq!(action, SweepAction::Skip);
}

#[test]
fn given_later_activity_than_read_receipt_when_deciding_then_idle_time_still_runs_from_read() {
    let mut conversation = Conversation::new(t0());
    conversation.last_activity_at = t0() + ms(100_000);
    let reply = read_reply(&conversation, t0());

    let action = decide_sweep_action(
        &conversation,
        &reply,
        false,
        InactivityWindows::default(),
        t0() + ms(120_000),
    );
    let status = derive_status(
        &conversation,
        Some(&reply),
        InactivityWindows::default(),
        t0() + ms(120_000),
    );

    assert_eq!(action, SweepAction::Warn);
    assert_eq!(status.time_until_warning, Some(TimeDelta::zero()));
}

#[test]
fn given_closed_conversation_when_deciding_then_skip() {
    let mut conversation = Conversation::new(t0());
    conversation.status = ConversationStatus::Closed;
    conversation.warning_sent_at = Some(t0());
    let reply = read_reply(&conversation, t0());

    let action = decide_sweep_action(
        &conversation,
        &reply,
        false,
        InactivityWindows::default(),
        t0() + ms(600_000),
    );

    assert_eq!(action, SweepAction::Skip);
}
