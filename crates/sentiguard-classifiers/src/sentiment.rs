//! Three-way lexicon sentiment classifier
//!
//! Stand-in for an external sentiment model with the same contract: a
//! negative/neutral/positive distribution whose top class wins.

use crate::classifier::{ClassificationResult, Classifier};
use crate::lexicon::{build_matcher, whole_word_hits};
use aho_corasick::AhoCorasick;
use async_trait::async_trait;
use sentiguard_core::{Label, Result};

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "love", "amazing", "wonderful", "happy", "fantastic",
    "awesome", "best", "nice", "cool", "beautiful", "sweet",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "horrible", "worst", "sad", "angry", "disappointed", "poor",
    "unhappy", "boring", "gross", "annoying",
];

pub struct SentimentClassifier {
    name: String,
    positive: AhoCorasick,
    negative: AhoCorasick,
}

impl SentimentClassifier {
    pub fn new() -> Result<Self> {
        Ok(Self {
            name: "sentiment".to_string(),
            positive: build_matcher(POSITIVE_WORDS)?,
            negative: build_matcher(NEGATIVE_WORDS)?,
        })
    }
}

#[async_trait]
impl Classifier for SentimentClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let positive_hits = whole_word_hits(&self.positive, text) as f32;
        let negative_hits = whole_word_hits(&self.negative, text) as f32;
        let total = positive_hits + negative_hits;

        let (label, score, all_scores) = if total == 0.0 {
            (
                Label::Neutral,
                1.0,
                vec![
                    (Label::Negative, 0.0),
                    (Label::Neutral, 1.0),
                    (Label::Positive, 0.0),
                ],
            )
        } else {
            let positive_score = positive_hits / total;
            let negative_score = negative_hits / total;
            let label = if positive_score >= negative_score {
                Label::Positive
            } else {
                Label::Negative
            };
            (
                label,
                positive_score.max(negative_score),
                vec![
                    (Label::Negative, negative_score),
                    (Label::Neutral, 0.0),
                    (Label::Positive, positive_score),
                ],
            )
        };

        Ok(ClassificationResult {
            label,
            score,
            all_scores,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
