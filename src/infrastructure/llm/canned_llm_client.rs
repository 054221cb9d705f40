use async_trait::async_trait;

use crate::application::ports::{CompletionRequest, LlmClient, LlmClientError, PromptRole};

/// Completion client that answers without calling a model. Used in scaffold
/// mode so the chat UI can be exercised offline.
pub struct CannedLlmClient;

#[async_trait]
impl LlmClient for CannedLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmClientError> {
        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == PromptRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let preview: String = last_user.chars().take(80).collect();
        Ok(format!(
            "Thanks for reaching out! This is a scaffold reply to: \"{}\". \
             Is there anything else I can help you with?",
            preview
        ))
    }
}
