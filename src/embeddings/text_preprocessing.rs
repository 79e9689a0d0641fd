//! Text preprocessing utilities for embedding generation
//!
//! Cleans and normalizes chunk and query text before it is sent to the
//! embedding model.

use tracing::debug;
use tracing::warn;

/// Upper bound on characters sent to the embedding model for one input
pub const MAX_EMBEDDING_CHARS: usize = 8000;

/// Preprocess text for embedding generation
///
/// Returns `None` when nothing embeddable is left, in which case the caller
/// substitutes a zero vector.
pub fn preprocess_text_for_embedding(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }

    let normalized = normalize_whitespace(text);
    let sanitized = sanitize_text(&normalized);

    if sanitized.is_empty() {
        return None;
    }

    if sanitized.chars().count() > MAX_EMBEDDING_CHARS {
        warn!(
            "Text too long ({} chars), truncating at a word boundary",
            sanitized.chars().count()
        );
        return Some(smart_truncate_text(&sanitized, MAX_EMBEDDING_CHARS));
    }

    debug!(
        "Preprocessed text: {} -> {} chars",
        text.len(),
        sanitized.len()
    );
    Some(sanitized)
}

/// Collapse every run of whitespace (newlines and tabs included) to one space
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Replace control characters with spaces and re-collapse whitespace
fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Truncate at the last word boundary before `max_chars`
fn smart_truncate_text(text: &str, max_chars: usize) -> String {
    let cut: String = text.chars().take(max_chars).collect();
    match cut.rfind(' ') {
        Some(pos) if pos > cut.len() / 2 => cut[..pos].to_string(),
        _ => cut,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(
            normalize_whitespace("POST /partnerblock\r\n\n\tbody  here"),
            "POST /partnerblock body here"
        );
    }

    #[test]
    fn test_sanitize_text() {
        assert_eq!(sanitize_text("a\u{0007}b"), "a b");
        assert_eq!(sanitize_text("café ✓"), "café ✓");
    }

    #[test]
    fn test_empty_inputs_yield_none() {
        assert!(preprocess_text_for_embedding("").is_none());
        assert!(preprocess_text_for_embedding(" \n\t ").is_none());
        assert!(preprocess_text_for_embedding("\u{0001}\u{0002}").is_none());
    }

    #[test]
    fn test_long_text_truncated() {
        let text = "word ".repeat(4000);
        let processed = preprocess_text_for_embedding(&text).unwrap();
        assert!(processed.chars().count() <= MAX_EMBEDDING_CHARS);
        assert!(processed.ends_with("word"));
    }
}
