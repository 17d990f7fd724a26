//! Sentence splitting and best-sentence selection for citation excerpts.
//!
//! The splitter is a punctuation heuristic, not a tokenizer: it breaks after
//! `.` or `?` followed by whitespace unless the text right before looks like
//! `Xy.` (a short capitalised abbreviation) or `a.b.` (`e.g.`, `i.e.`). Ellipses
//! and other abbreviations can still split in the wrong place.

use crate::search::SearchEngine;
use domain::errors::RetrievalError;
use domain::ports::EmbeddingModel;
use shared::utils::ELLIPSIS;

pub const FALLBACK_CHARS: usize = 200;

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn suppressed_split(chars: &[(usize, char)], i: usize) -> bool {
    if i >= 3 && chars[i - 1].1 == '.' {
        let (a, b) = (chars[i - 3].1, chars[i - 2].1);
        if a.is_uppercase() && b.is_lowercase() {
            return true;
        }
    }
    if i >= 4 {
        let (a, b, c) = (chars[i - 4].1, chars[i - 3].1, chars[i - 2].1);
        if is_word_char(a) && b == '.' && is_word_char(c) {
            return true;
        }
    }
    false
}

/// Split `text` into trimmed, non-empty sentences.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;

    for i in 1..chars.len() {
        let (byte_idx, c) = chars[i];
        if !c.is_whitespace() {
            continue;
        }
        let prev = chars[i - 1].1;
        if prev != '.' && prev != '?' {
            continue;
        }
        if suppressed_split(&chars, i) {
            continue;
        }
        sentences.push(&text[start..byte_idx]);
        start = byte_idx + c.len_utf8();
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Excerpt used when no sentence can be extracted.
pub fn fallback_excerpt(text: &str) -> String {
    let head: String = text.chars().take(FALLBACK_CHARS).collect();
    format!("{head}{ELLIPSIS}")
}

/// The sentence of `text` whose embedding is closest to `query_embedding`.
pub async fn best_sentence(
    text: &str,
    query_embedding: &[f32],
    model: &dyn EmbeddingModel,
) -> Result<String, RetrievalError> {
    let sentences = split_sentences(text);
    match sentences.as_slice() {
        [] => return Ok(fallback_excerpt(text)),
        [only] => return Ok((*only).to_string()),
        _ => {}
    }

    let owned: Vec<String> = sentences.iter().map(|s| s.to_string()).collect();
    let vectors = model.embed_batch(&owned).await?;
    if let Some(bad) = vectors.iter().find(|v| v.len() != query_embedding.len()) {
        return Err(RetrievalError::DimensionMismatch {
            expected: query_embedding.len(),
            actual: bad.len(),
        });
    }

    let best = SearchEngine::best_match(query_embedding, &vectors)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    Ok(owned.into_iter().nth(best).unwrap_or_default())
}
