//! Classifier trait and common types

use async_trait::async_trait;
use sentiguard_core::{Label, Result};

/// Trait for all classifiers
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify the given text
    async fn classify(&self, text: &str) -> Result<ClassificationResult>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Result of classification
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    /// Top classification label
    pub label: Label,

    /// Confidence score for the top label (0.0-1.0)
    pub score: f32,

    /// All class scores, when the classifier is multi-class
    pub all_scores: Vec<(Label, f32)>,
}

impl ClassificationResult {
    /// Create a new classification result
    pub fn new(label: Label, score: f32) -> Self {
        Self {
            label,
            score,
            all_scores: Vec::new(),
        }
    }
}
