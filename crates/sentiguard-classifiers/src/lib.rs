//! SentiGuard Classifiers
//!
//! Deterministic classification of comment text into positive, neutral,
//! negative, or toxic.
//!
//! The oracle layers three deterministic stages: a toxicity gate, a lexical
//! negation fast path, and a three-way sentiment scorer. All lexicon
//! automata are built once at startup; a build failure aborts the service
//! rather than letting classification degrade silently.

pub mod classifier;
pub mod fast_path;
pub mod lexicon;
pub mod oracle;
pub mod sentiment;
pub mod toxicity;

pub use classifier::{ClassificationResult, Classifier};
pub use fast_path::FastPath;
pub use oracle::CommentOracle;
pub use sentiment::SentimentClassifier;
pub use toxicity::{ToxicityClassifier, TOXIC_THRESHOLD};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{ClassificationResult, Classifier};
    pub use crate::oracle::CommentOracle;
    pub use crate::sentiment::SentimentClassifier;
    pub use crate::toxicity::{ToxicityClassifier, TOXIC_THRESHOLD};
}
