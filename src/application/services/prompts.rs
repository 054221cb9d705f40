/// Phrase that identifies the closure notice inside a transcript.
pub const CLOSED_NOTICE_MARKER: &str = "closed due to inactivity";

const SUMMARY_PLACEHOLDER: &str = "{summary}";
const CONTEXT_PLACEHOLDER: &str = "{context}";

const DEFAULT_PERSONA: &str = "You are Ava, the customer support assistant of an online electronics store. \
Be friendly, professional and concise: two to four sentences when possible, bullet points for lists, \
and offer further help at the end.\n\n\
Only answer questions about the store's products, orders, shipping, returns, payments and accounts. \
Politely decline anything else and steer the customer back to their shopping experience.\n\n\
If the customer is upset, asks for a human, or has an issue you cannot resolve, \
point them to the human support team.";

const DEFAULT_CONTEXT_PROMPT: &str = "You are Ava, the customer support assistant of an online electronics store. \
Be warm, professional and concise, and offer further help at the end.\n\n\
## COMPANY INFORMATION\n\
{context}\n\n\
## RULES\n\
- Answer as if you simply know the information above. Never mention documents, sources or context.\n\
- If the information above does not cover the question, say you do not have the details and offer the human support team.\n\
- Decline questions unrelated to the store.";

const DEFAULT_CLOSED_NOTICE: &str = "This conversation has been closed due to inactivity. \
If you need further assistance, you can reopen this chat to continue where we left off, \
or start a new conversation. We're here to help!";

const DEFAULT_WARNING_NOTICE: &str = "Are you still there? This chat will automatically close in 1 minute \
if there's no response. Feel free to send a message if you need more help!";

const DEFAULT_REOPENED_NOTICE: &str = "Welcome back! Here's a quick summary of our previous conversation:\n\n\
{summary}\n\nHow can I continue to help you?";

const DEFAULT_SUMMARY_INSTRUCTION: &str = "Summarize the following customer support conversation in 2-3 sentences.\n\
IMPORTANT: write the summary in SECOND PERSON, addressing the customer directly as \"you\" \
(not \"the customer\" or \"they\"). For example: \"You asked about shipping options...\".\n\
Focus on what they asked about and what was resolved or discussed:";

pub const SUMMARY_FALLBACK: &str = "Unable to generate summary of previous conversation.";

/// Every piece of text the assistant emits on its own behalf.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSet {
    pub persona: String,
    pub context_template: String,
    pub closed_notice: String,
    pub warning_notice: String,
    pub reopened_template: String,
    pub summary_instruction: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            persona: DEFAULT_PERSONA.to_string(),
            context_template: DEFAULT_CONTEXT_PROMPT.to_string(),
            closed_notice: DEFAULT_CLOSED_NOTICE.to_string(),
            warning_notice: DEFAULT_WARNING_NOTICE.to_string(),
            reopened_template: DEFAULT_REOPENED_NOTICE.to_string(),
            summary_instruction: DEFAULT_SUMMARY_INSTRUCTION.to_string(),
        }
    }
}

impl PromptSet {
    /// Persona used for a reply: the context-injected prompt when retrieval
    /// found something, the static persona otherwise.
    pub fn system_prompt(&self, context: &str) -> String {
        if context.trim().is_empty() {
            self.persona.clone()
        } else {
            self.context_template.replace(CONTEXT_PLACEHOLDER, context)
        }
    }

    pub fn reopened_notice(&self, summary: &str) -> String {
        self.reopened_template.replace(SUMMARY_PLACEHOLDER, summary)
    }

    pub fn is_closed_notice(text: &str) -> bool {
        text.contains(CLOSED_NOTICE_MARKER)
    }
}
