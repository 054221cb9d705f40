use helpline::infrastructure::observability::sanitize_prompt;

#[test]
fn given_blank_prompt_when_sanitizing_then_placeholder_is_logged() {
    assert_eq!(sanitize_prompt("   "), "[EMPTY]");
}

#[test]
fn given_short_prompt_when_sanitizing_then_it_is_kept_trimmed() {
    assert_eq!(sanitize_prompt("  where is my order?  "), "where is my order?");
}

#[test]
fn given_long_prompt_when_sanitizing_then_it_is_cut_at_100_chars_with_total() {
    let prompt = "ø".repeat(150);

    let sanitized = sanitize_prompt(&prompt);

    assert_eq!(sanitized, format!("{}... (150 chars total)", "ø".repeat(100)));
}

#[test]
fn given_credentials_when_sanitizing_then_they_are_redacted() {
    let sanitized = sanitize_prompt("my api_key=sk-123 and Bearer abc.def plus password=hunter2");

    assert_eq!(
        sanitized,
        "my api_key=[REDACTED] and Bearer [REDACTED] plus password=[REDACTED]"
    );
}
