use helpline::application::ports::{CompletionRequest, LlmClient, PromptMessage, PromptRole};
use helpline::infrastructure::llm::CannedLlmClient;

#[tokio::test]
async fn given_conversation_when_completing_then_reply_quotes_last_user_message() {
    let request = CompletionRequest {
        messages: vec![
            PromptMessage::new(PromptRole::System, "persona"),
            PromptMessage::new(PromptRole::User, "first"),
            PromptMessage::new(PromptRole::Assistant, "reply"),
            PromptMessage::new(PromptRole::User, "where is my parcel"),
        ],
        temperature: 0.7,
        max_tokens: 1024,
    };

    let reply = CannedLlmClient.complete(&request).await.unwrap();

    assert!(reply.contains("\"where is my parcel\""));
    assert!(!reply.contains("first"));
}
