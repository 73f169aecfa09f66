//! Toxicity detection classifier

use crate::classifier::{ClassificationResult, Classifier};
use crate::lexicon::{build_matcher, whole_word_hits};
use aho_corasick::AhoCorasick;
use async_trait::async_trait;
use sentiguard_core::{Label, Result};

/// Score above which a comment is labeled toxic
pub const TOXIC_THRESHOLD: f32 = 0.5;

/// Abusive terms flagged regardless of surrounding sentiment.
///
/// "hate" belongs here, not in the sentiment lexicons: "I hate this" on a
/// child's post is an alert, not a mood.
const TOXIC_WORDS: &[&str] = &[
    "hate", "stupid", "idiot", "ugly", "dumb", "kill", "die", "trash", "garbage", "loser",
    "creep", "freak", "shit", "fuck", "bitch", "asshole", "bastard",
];

/// Per-match weight. A single strong term crosses [`TOXIC_THRESHOLD`];
/// comments are one-liners, so multi-hit accumulation is the exception.
const MATCH_WEIGHT: f32 = 0.6;

/// Toxicity detection classifier.
///
/// Deterministic lexicon scoring with bounded confidence; the whole service
/// fails fast at startup if the matcher cannot be built.
pub struct ToxicityClassifier {
    name: String,
    matcher: AhoCorasick,
}

impl ToxicityClassifier {
    /// Create a new toxicity classifier.
    pub fn new() -> Result<Self> {
        Ok(Self {
            name: "toxicity".to_string(),
            matcher: build_matcher(TOXIC_WORDS)?,
        })
    }

    /// Toxic-probability score for the given text (0.0-0.95)
    pub fn score(&self, text: &str) -> f32 {
        let matches = whole_word_hits(&self.matcher, text) as f32;
        (matches * MATCH_WEIGHT).clamp(0.0, 0.95)
    }
}

#[async_trait]
impl Classifier for ToxicityClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let score = self.score(text);
        let label = if score > TOXIC_THRESHOLD {
            Label::Toxic
        } else {
            Label::Neutral
        };

        Ok(ClassificationResult::new(label, score))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
