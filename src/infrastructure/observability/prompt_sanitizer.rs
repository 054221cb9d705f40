use std::sync::LazyLock;

use regex::Regex;

const MAX_VISIBLE_CHARS: usize = 100;

static SECRET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(bearer\s+|(?:api_key|password|secret|token)=)[^\s&"']+"#)
        .unwrap_or_else(|e| panic!("invalid secret pattern: {e}"))
});

/// Shortens user-authored text for logs and masks credentials in it.
pub fn sanitize_prompt(prompt: &str) -> String {
    let trimmed = prompt.trim();

    if trimmed.is_empty() {
        return String::from("[EMPTY]");
    }

    let total = trimmed.chars().count();
    let visible = if total > MAX_VISIBLE_CHARS {
        let head: String = trimmed.chars().take(MAX_VISIBLE_CHARS).collect();
        format!("{}... ({} chars total)", head, total)
    } else {
        trimmed.to_string()
    };

    SECRET_PATTERN
        .replace_all(&visible, "${1}[REDACTED]")
        .into_owned()
}
