//! Lexical negation fast path
//!
//! Small fixed lists of strongly polar words, combined with negation
//! detection, resolve the common cases the models get wrong ("not bad",
//! "not good") without invoking them.

use crate::lexicon::{build_matcher, contains_word, has_negation};
use aho_corasick::AhoCorasick;
use sentiguard_core::{Label, Result};

const STRONG_POSITIVE: &[&str] = &[
    "good", "great", "awesome", "amazing", "fantastic", "love", "excellent",
];

const STRONG_NEGATIVE: &[&str] = &["bad", "terrible", "awful", "horrible", "worst", "dislike"];

pub struct FastPath {
    positive: AhoCorasick,
    negative: AhoCorasick,
}

impl FastPath {
    pub fn new() -> Result<Self> {
        Ok(Self {
            positive: build_matcher(STRONG_POSITIVE)?,
            negative: build_matcher(STRONG_NEGATIVE)?,
        })
    }

    /// Apply the decision table; `None` falls through to the model path.
    ///
    /// - negation + negative words only -> `Positive` ("not bad")
    /// - negation + positive words only -> `Negative` ("not good")
    /// - negation + both or neither     -> fall through
    /// - no negation + exactly one word class -> that class
    pub fn evaluate(&self, text: &str) -> Option<Label> {
        let has_positive = contains_word(&self.positive, text);
        let has_negative = contains_word(&self.negative, text);

        if has_negation(text) {
            match (has_positive, has_negative) {
                (false, true) => Some(Label::Positive),
                (true, false) => Some(Label::Negative),
                _ => None,
            }
        } else {
            match (has_positive, has_negative) {
                (true, false) => Some(Label::Positive),
                (false, true) => Some(Label::Negative),
                _ => None,
            }
        }
    }
}
