use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::application::ports::{
    Clock, ConversationRepository, InactivityCandidate, RepositoryError,
};
use crate::domain::{InactivityWindows, SweepAction, decide_sweep_action};

use super::conversation_service::{ChatError, ConversationService};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub warned: usize,
    pub closed: usize,
    pub cleared: usize,
    pub failed: usize,
}

/// Periodically warns and then closes conversations whose customer stopped
/// responding after reading a reply.
pub struct InactivitySweeper {
    conversations: Arc<dyn ConversationRepository>,
    chat: Arc<ConversationService>,
    clock: Arc<dyn Clock>,
    windows: InactivityWindows,
    interval: Duration,
}

impl InactivitySweeper {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        chat: Arc<ConversationService>,
        clock: Arc<dyn Clock>,
        windows: InactivityWindows,
        interval: Duration,
    ) -> Self {
        Self {
            conversations,
            chat,
            clock,
            windows,
            interval,
        }
    }

    /// Ticks until `shutdown` flips to `true`. A tick runs to completion
    /// before the next one starts; ticks missed meanwhile are dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;

        tracing::info!(interval_ms = self.interval.as_millis() as u64, "Inactivity sweeper started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.sweep().await {
                        Ok(report) if report.warned + report.closed + report.cleared + report.failed > 0 => {
                            tracing::info!(?report, "Inactivity sweep finished");
                        }
                        Ok(_) => {}
                        Err(e) => tracing::error!(error = %e, "Inactivity sweep could not list conversations"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Inactivity sweeper stopped");
    }

    /// One pass over every open conversation. A failure on one conversation
    /// is logged and counted without stopping the pass.
    pub async fn sweep(&self) -> Result<SweepReport, RepositoryError> {
        let candidates = self.conversations.list_inactivity_candidates().await?;
        let now = self.clock.now();
        let mut report = SweepReport {
            scanned: candidates.len(),
            ..SweepReport::default()
        };

        for candidate in candidates {
            let session_id = candidate.conversation.id;
            match self.process(candidate, now).await {
                Ok(SweepAction::Warn) => report.warned += 1,
                Ok(SweepAction::Close) => report.closed += 1,
                Ok(SweepAction::ClearWarning) => report.cleared += 1,
                Ok(SweepAction::Skip) => {}
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(session_id = %session_id, error = %e, "Inactivity check failed");
                }
            }
        }

        Ok(report)
    }

    async fn process(
        &self,
        candidate: InactivityCandidate,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<SweepAction, ChatError> {
        let conversation = &candidate.conversation;
        let user_replied = self
            .conversations
            .has_user_message_after(conversation.id, candidate.last_read_assistant.created_at)
            .await?;

        let action = decide_sweep_action(
            conversation,
            &candidate.last_read_assistant,
            user_replied,
            self.windows,
            now,
        );

        match action {
            SweepAction::Skip => {}
            SweepAction::ClearWarning => {
                self.conversations
                    .set_warning_sent(conversation.id, None)
                    .await?;
                tracing::debug!(session_id = %conversation.id, "Customer replied, warning cleared");
            }
            SweepAction::Warn => {
                self.chat.send_warning(conversation.id).await?;
            }
            SweepAction::Close => {
                self.chat.close(conversation.id).await?;
            }
        }

        Ok(action)
    }
}
