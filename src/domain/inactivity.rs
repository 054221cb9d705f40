use super::{Conversation, ConversationStatus, Message};
use chrono::{DateTime, TimeDelta, Utc};

/// Durations that drive the inactivity protocol. The close window is counted
/// from the moment the warning is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InactivityWindows {
    pub warning: TimeDelta,
    pub close: TimeDelta,
}

impl InactivityWindows {
    pub fn from_millis(warning_ms: u64, close_ms: u64) -> Self {
        Self {
            warning: TimeDelta::milliseconds(warning_ms as i64),
            close: TimeDelta::milliseconds(close_ms as i64),
        }
    }
}

impl Default for InactivityWindows {
    fn default() -> Self {
        Self::from_millis(120_000, 60_000)
    }
}

/// Countdown overlay observed by polling clients.
#[derive(Debug, Clone, PartialEq)]
pub struct InactivityStatus {
    pub status: ConversationStatus,
    pub warning_issued: bool,
    pub time_until_warning: Option<TimeDelta>,
    pub time_until_close: Option<TimeDelta>,
    pub last_assistant_read_at: Option<DateTime<Utc>>,
}

impl InactivityStatus {
    fn idle(status: ConversationStatus) -> Self {
        Self {
            status,
            warning_issued: false,
            time_until_warning: None,
            time_until_close: None,
            last_assistant_read_at: None,
        }
    }
}

/// Derives the countdown from the latest assistant message (read or not).
/// There is no countdown while that message is unread or the conversation
/// is closed.
pub fn derive_status(
    conversation: &Conversation,
    latest_assistant: Option<&Message>,
    windows: InactivityWindows,
    now: DateTime<Utc>,
) -> InactivityStatus {
    if conversation.is_closed() {
        return InactivityStatus::idle(conversation.status);
    }

    let read_at = match latest_assistant {
        Some(message) if message.is_read => match message.read_at {
            Some(read_at) => read_at,
            None => return InactivityStatus::idle(conversation.status),
        },
        _ => return InactivityStatus::idle(conversation.status),
    };

    let since_read = now - read_at;
    let zero = TimeDelta::zero();

    InactivityStatus {
        status: conversation.status,
        warning_issued: since_read >= windows.warning,
        time_until_warning: Some((windows.warning - since_read).max(zero)),
        time_until_close: Some((windows.warning + windows.close - since_read).max(zero)),
        last_assistant_read_at: Some(read_at),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepAction {
    Skip,
    ClearWarning,
    Warn,
    Close,
}

/// Decides what one sweeper tick does for an open conversation, given its most
/// recently read assistant message and whether the user has written since
/// that message was posted. Idle time runs from the read receipt, matching
/// the countdown reported by [`derive_status`].
pub fn decide_sweep_action(
    conversation: &Conversation,
    last_read_assistant: &Message,
    user_replied_since: bool,
    windows: InactivityWindows,
    now: DateTime<Utc>,
) -> SweepAction {
    if conversation.is_closed() {
        return SweepAction::Skip;
    }

    let Some(read_at) = last_read_assistant.read_at else {
        return SweepAction::Skip;
    };

    if user_replied_since {
        return match conversation.warning_sent_at {
            Some(_) => SweepAction::ClearWarning,
            None => SweepAction::Skip,
        };
    }

    match conversation.warning_sent_at {
        Some(warned_at) if now - warned_at >= windows.close => SweepAction::Close,
        Some(_) => SweepAction::Skip,
        None if now - read_at >= windows.warning => SweepAction::Warn,
        None => SweepAction::Skip,
    }
}
