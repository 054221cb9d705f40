use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static BROKEN_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w)-[ \t]*\r?\n[ \t]*(\w)").unwrap());

static INLINE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());

static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t]*(\n[ \t]*)+").unwrap());

/// Cleans text pulled out of a PDF layout: NFKC-folds ligatures, rejoins words
/// hyphenated across line breaks, drops control characters, collapses runs
/// of spaces and squeezes blank-line runs to a single paragraph break.
pub fn sanitize_extracted_text(raw: &str) -> String {
    let normalized: String = raw
        .nfkc()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect();

    let rejoined = BROKEN_WORD.replace_all(&normalized, "$1$2");
    let spaced = INLINE_WHITESPACE.replace_all(&rejoined, " ");
    let paragraphs = BLANK_RUN.replace_all(&spaced, "\n\n");

    paragraphs
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
