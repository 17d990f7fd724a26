pub const EXCERPT_MAX_CHARS: usize = 250;
pub const ELLIPSIS: &str = "...";

/// Cut `text` to at most `max_chars` characters, appending `...` when anything was dropped.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Citation excerpt: 250 characters plus an ellipsis when longer.
pub fn excerpt(text: &str) -> String {
    truncate_with_ellipsis(text, EXCERPT_MAX_CHARS)
}

/// Collapse runs of whitespace into single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
