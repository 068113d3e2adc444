//! Shared utility functions.

/// Cut `text` to at most `max` characters, appending `...` when anything
/// was dropped. Counts chars, not bytes, so multi-byte text never splits.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
