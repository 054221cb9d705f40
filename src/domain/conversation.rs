use super::{ConversationId, ConversationStatus};
use chrono::{DateTime, Utc};

/// A support conversation.
///
/// `closed_at` is set exactly when `status` is `Closed`. `warning_sent_at`
/// records that the inactivity warning went out and is cleared by a user
/// reply or by closing.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub id: ConversationId,
    pub status: ConversationStatus,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub warning_sent_at: Option<DateTime<Utc>>,
}

impl Conversation {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: ConversationId::new(),
            status: ConversationStatus::Open,
            created_at: now,
            last_activity_at: now,
            closed_at: None,
            warning_sent_at: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.status == ConversationStatus::Closed
    }
}
