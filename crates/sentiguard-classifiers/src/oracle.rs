//! The classification oracle: one pure `text -> label` function
//!
//! Classification order is toxicity gate, then lexical fast path, then the
//! sentiment model. The toxicity gate runs first so that a comment whose
//! toxic score clears the threshold can never come back as plain
//! positive/negative sentiment, whatever polar words it also contains.

use crate::classifier::Classifier;
use crate::fast_path::FastPath;
use crate::sentiment::SentimentClassifier;
use crate::toxicity::{ToxicityClassifier, TOXIC_THRESHOLD};
use sentiguard_core::{Label, Result};
use tracing::debug;

/// Process-wide classification oracle.
///
/// Stateless per call and safe for concurrent use; construct once at startup.
/// Construction failure is fatal: classification drives parental alerts and
/// must not degrade silently.
pub struct CommentOracle {
    toxicity: ToxicityClassifier,
    sentiment: SentimentClassifier,
    fast_path: FastPath,
}

impl CommentOracle {
    /// Build the oracle, failing fast if any matcher cannot be constructed
    pub fn new() -> Result<Self> {
        Ok(Self {
            toxicity: ToxicityClassifier::new()?,
            sentiment: SentimentClassifier::new()?,
            fast_path: FastPath::new()?,
        })
    }

    /// Classify one comment text.
    ///
    /// Deterministic for a fixed lexicon version.
    pub async fn classify(&self, text: &str) -> Result<Label> {
        let toxic_score = self.toxicity.score(text);
        if toxic_score > TOXIC_THRESHOLD {
            debug!(toxic_score, "comment classified toxic");
            return Ok(Label::Toxic);
        }

        if let Some(label) = self.fast_path.evaluate(text) {
            debug!(label = %label, "lexical fast path hit");
            return Ok(label);
        }

        let sentiment = self.sentiment.classify(text).await?;
        Ok(sentiment.label)
    }
}
