//! Fuzzy matching of a mention against directory names.
//!
//! Scores live in `[0, 1]`:
//! 1. case-insensitive equality scores `1.0`
//! 2. otherwise the normalized Damerau-Levenshtein similarity of the
//!    lowercased strings, which tolerates plurals and transposed letters
//! 3. when exactly one side is a single word and the other has several,
//!    that word is also compared against every word of the other side,
//!    discounted by [`TOKEN_MATCH_WEIGHT`]. Two multi-word strings are
//!    only compared whole.
//!
//! An entry scores the best of its name and each of its aliases. The best
//! score at or above [`MATCH_THRESHOLD`] wins. Equal scores keep
//! the entry seen first in directory order.

use crate::constants::{MATCH_THRESHOLD, TOKEN_MATCH_WEIGHT};
use crate::link::LinkEntry;

/// The directory entry chosen for a mention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
    pub entry: &'a LinkEntry,
    /// Position of `entry` in the searched directory.
    pub index: usize,
    pub score: f64,
}

/// Similarity between a mention and a directory name.
pub fn similarity(mention: &str, name: &str) -> f64 {
    let mention = mention.trim().to_lowercase();
    let name = name.trim().to_lowercase();
    if mention.is_empty() || name.is_empty() {
        return 0.0;
    }
    if mention == name {
        return 1.0;
    }

    let whole = strsim::normalized_damerau_levenshtein(&mention, &name);
    whole.max(TOKEN_MATCH_WEIGHT * token_similarity(&mention, &name))
}

fn token_similarity(left: &str, right: &str) -> f64 {
    let left_words: Vec<&str> = left.split_whitespace().collect();
    let right_words: Vec<&str> = right.split_whitespace().collect();

    let (word, words) = match (left_words.as_slice(), right_words.as_slice()) {
        ([word], words) | (words, [word]) if words.len() > 1 => (*word, words),
        _ => return 0.0,
    };

    words
        .iter()
        .map(|candidate| strsim::normalized_damerau_levenshtein(word, candidate))
        .fold(0.0, f64::max)
}

/// Similarity between a mention and the closest of an entry's name and
/// aliases.
pub fn entry_similarity(mention: &str, entry: &LinkEntry) -> f64 {
    entry
        .aliases
        .iter()
        .map(|alias| similarity(mention, alias))
        .fold(similarity(mention, &entry.name), f64::max)
}

/// Finds the best scoring entry for `mention`, if any clears the threshold.
pub fn best_match<'a>(mention: &str, directory: &'a [LinkEntry]) -> Option<Match<'a>> {
    let mut best: Option<Match<'a>> = None;

    for (index, entry) in directory.iter().enumerate() {
        let score = entry_similarity(mention, entry);
        if score < MATCH_THRESHOLD {
            continue;
        }
        // Strictly greater: ties keep the earlier entry.
        if best.is_none_or(|current| score > current.score) {
            best = Some(Match {
                entry,
                index,
                score,
            });
        }
    }

    best
}
