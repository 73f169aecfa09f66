//! Whole-word lexicon matching helpers
//!
//! Comment text is short and informal; all matching here is case-insensitive
//! and word-boundary aware so that "now" never counts as "no" and "classic"
//! never counts as "ass".

use aho_corasick::AhoCorasick;
use sentiguard_core::{Error, Result};

/// Build a case-insensitive automaton over a fixed word list.
///
/// Automaton construction only fails on degenerate inputs, but a failure here
/// must abort startup: the oracle drives parental alerts and cannot degrade
/// silently.
pub fn build_matcher(words: &[&str]) -> Result<AhoCorasick> {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(words)
        .map_err(|e| Error::classifier(format!("failed to build lexicon matcher: {e}")))
}

/// Count matches that fall on word boundaries
pub fn whole_word_hits(matcher: &AhoCorasick, text: &str) -> usize {
    matcher
        .find_iter(text)
        .filter(|m| is_word_boundary(text, m.start(), m.end()))
        .count()
}

/// Whether any lexicon word occurs as a whole word
pub fn contains_word(matcher: &AhoCorasick, text: &str) -> bool {
    whole_word_hits(matcher, text) > 0
}

fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(|c| c.is_alphanumeric()) && !after.is_some_and(|c| c.is_alphanumeric())
}

/// Detect negation: the words "not", "no", "never", or any "n't" contraction
pub fn has_negation(text: &str) -> bool {
    let lower = text.to_lowercase();
    if lower.contains("n't") {
        return true;
    }
    lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| matches!(word, "not" | "no" | "never"))
}
