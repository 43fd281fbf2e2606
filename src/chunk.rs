//! Splitting long transcripts at sentence boundaries.

use once_cell::sync::Lazy;
use regex::Regex;

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+").expect("Failed to compile SENTENCE_END regex"));

/// Splits `text` into sentences: each ends with `.`, `!` or `?` followed by
/// whitespace, or at the end of the text.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in SENTENCE_END.find_iter(text) {
        // The terminator is a single ASCII byte.
        let end = boundary.start() + 1;
        if let Some(sentence) = text.get(start..end) {
            sentences.push(sentence.trim());
        }
        start = boundary.end();
    }
    if let Some(rest) = text.get(start..) {
        sentences.push(rest.trim());
    }

    sentences.retain(|sentence| !sentence.is_empty());
    sentences
}

/// Greedily packs whole sentences into chunks of at most `max_chunk_size`
/// characters, joining sentences with a single space.
///
/// A sentence longer than the budget is emitted alone and unsplit. A budget
/// of zero disables chunking.
pub fn chunk_transcript(text: &str, max_chunk_size: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if max_chunk_size == 0 {
        return vec![text.to_owned()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in split_sentences(text) {
        let sentence_len = sentence.chars().count();
        if current.is_empty() {
            current.push_str(sentence);
            current_len = sentence_len;
            continue;
        }

        if current_len + 1 + sentence_len > max_chunk_size {
            chunks.push(std::mem::take(&mut current));
            current.push_str(sentence);
            current_len = sentence_len;
        } else {
            current.push(' ');
            current.push_str(sentence);
            current_len += 1 + sentence_len;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
