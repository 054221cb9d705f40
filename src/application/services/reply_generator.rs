use std::sync::Arc;

use crate::application::ports::{
    CompletionRequest, LlmClient, LlmClientError, PromptMessage, PromptRole,
};
use crate::domain::{Message, MessageRole, mime_subtype};

use super::prompts::PromptSet;

const REPLY_TEMPERATURE: f32 = 0.7;
const REPLY_MAX_TOKENS: u32 = 1024;
const SUMMARY_TEMPERATURE: f32 = 0.5;
const SUMMARY_MAX_TOKENS: u32 = 256;

/// Attachment facts the model is told about.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentNote {
    pub url: String,
    pub mime_type: String,
}

pub struct ReplyGenerator {
    llm_client: Arc<dyn LlmClient>,
    prompts: Arc<PromptSet>,
    history_window: usize,
}

impl ReplyGenerator {
    pub fn new(llm_client: Arc<dyn LlmClient>, prompts: Arc<PromptSet>, history_window: usize) -> Self {
        Self {
            llm_client,
            prompts,
            history_window,
        }
    }

    #[tracing::instrument(skip_all, fields(history = history.len(), attachment = attachment.is_some()))]
    pub async fn generate_reply(
        &self,
        system_prompt: &str,
        history: &[Message],
        current_message: &str,
        attachment: Option<&AttachmentNote>,
    ) -> Result<String, CompletionFailure> {
        let request = CompletionRequest {
            messages: build_reply_messages(
                system_prompt,
                history,
                current_message,
                attachment,
                self.history_window,
            ),
            temperature: REPLY_TEMPERATURE,
            max_tokens: REPLY_MAX_TOKENS,
        };

        tracing::debug!(messages = request.messages.len(), "Requesting reply");

        match self.llm_client.complete(&request).await {
            Ok(text) if text.trim().is_empty() => Err(CompletionFailure::EmptyResponse),
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::error!(error = %e, "Reply completion failed");
                Err(CompletionFailure::classify(&e))
            }
        }
    }

    #[tracing::instrument(skip_all, fields(history = history.len()))]
    pub async fn generate_summary(&self, history: &[Message]) -> Result<String, CompletionFailure> {
        let prompt = format!(
            "{}\n\n{}",
            self.prompts.summary_instruction,
            render_transcript(history)
        );
        let request = CompletionRequest {
            messages: vec![PromptMessage::new(PromptRole::User, prompt)],
            temperature: SUMMARY_TEMPERATURE,
            max_tokens: SUMMARY_MAX_TOKENS,
        };

        match self.llm_client.complete(&request).await {
            Ok(text) if !text.trim().is_empty() => Ok(text),
            Ok(_) => Err(CompletionFailure::SummaryUnavailable),
            Err(e) => {
                tracing::warn!(error = %e, "Summary completion failed");
                Err(CompletionFailure::SummaryUnavailable)
            }
        }
    }
}

/// System prompt, then the last `window` history entries in order, then the
/// current message with its attachment annotation.
pub fn build_reply_messages(
    system_prompt: &str,
    history: &[Message],
    current_message: &str,
    attachment: Option<&AttachmentNote>,
    window: usize,
) -> Vec<PromptMessage> {
    let recent = &history[history.len().saturating_sub(window)..];

    let mut messages = Vec::with_capacity(recent.len() + 2);
    messages.push(PromptMessage::new(PromptRole::System, system_prompt));
    messages.extend(recent.iter().map(|m| {
        let role = match m.role {
            MessageRole::User => PromptRole::User,
            MessageRole::Assistant => PromptRole::Assistant,
        };
        PromptMessage::new(role, m.content.clone())
    }));

    let content = match attachment {
        Some(note) => format!(
            "[User attached a {} file: {}]\n\n{}",
            mime_subtype(&note.mime_type),
            note.url,
            current_message
        ),
        None => current_message.to_string(),
    };
    messages.push(PromptMessage::new(PromptRole::User, content));

    messages
}

pub fn render_transcript(history: &[Message]) -> String {
    history
        .iter()
        .map(|m| {
            let speaker = match m.role {
                MessageRole::User => "Customer",
                MessageRole::Assistant => "Support",
            };
            format!("{}: {}", speaker, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Why a completion could not be turned into a reply. Provider error text
/// never leaves this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CompletionFailure {
    #[error("completion service rejected the configured credentials")]
    Configuration,
    #[error("completion service is rate limited")]
    RateLimited,
    #[error("completion service timed out")]
    Timeout,
    #[error("completion service returned no text")]
    EmptyResponse,
    #[error("completion service failed")]
    Unavailable,
    #[error("summary could not be generated")]
    SummaryUnavailable,
}

impl CompletionFailure {
    pub fn classify(error: &LlmClientError) -> Self {
        match error {
            LlmClientError::Unauthorized(_) => Self::Configuration,
            LlmClientError::RateLimited => Self::RateLimited,
            LlmClientError::Timeout => Self::Timeout,
            LlmClientError::ApiRequestFailed(detail) => Self::classify_text(detail),
            LlmClientError::InvalidResponse(_) => Self::Unavailable,
        }
    }

    fn classify_text(detail: &str) -> Self {
        let detail = detail.to_lowercase();
        if ["api key", "unauthorized", "invalid"]
            .iter()
            .any(|needle| detail.contains(needle))
        {
            Self::Configuration
        } else if detail.contains("rate limit") || detail.contains("quota") {
            Self::RateLimited
        } else if detail.contains("timeout") || detail.contains("deadline") {
            Self::Timeout
        } else {
            Self::Unavailable
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Configuration => "Service configuration error. Please contact support.",
            Self::RateLimited => {
                "Our service is experiencing high demand. Please try again in a moment."
            }
            Self::Timeout => "The request took too long. Please try again.",
            Self::EmptyResponse => "No response generated from AI",
            Self::Unavailable => {
                "I apologize, but I encountered an issue processing your request. Please try again."
            }
            Self::SummaryUnavailable => "Could not generate conversation summary",
        }
    }

    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Configuration)
    }
}
