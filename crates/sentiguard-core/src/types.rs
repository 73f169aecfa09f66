//! Domain types shared across SentiGuard components

use crate::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classification label assigned to a comment.
///
/// `Toxic` indicates abusive/harmful content and is distinct from plain
/// `Negative` sentiment; only `Toxic` comments trigger parent alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Positive,
    #[default]
    Neutral,
    Negative,
    Toxic,
}

impl Label {
    /// Stable lowercase name used in API payloads and the journal
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
            Self::Toxic => "toxic",
        }
    }

    /// Whether this label should trigger a parent alert
    pub fn is_toxic(&self) -> bool {
        matches!(self, Self::Toxic)
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered parent account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parent {
    /// Unique parent id
    pub id: Uuid,

    /// Unique login name
    pub username: String,

    /// Alert delivery address
    pub email: String,

    /// Optional display name used in alert salutations
    pub display_name: Option<String>,

    /// Argon2 password hash (PHC string)
    pub password_hash: String,

    /// Account creation time
    pub created_at: DateTime<Utc>,
}

impl Parent {
    /// Name used when addressing the parent in alerts
    pub fn salutation(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// A pre-authorized credential record in the shared monitoring pool.
///
/// Seeded by an operator import; referenced (never owned) by linked children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoredAccount {
    /// Platform-assigned account id
    pub external_id: String,

    /// Public username on the platform
    pub handle: String,

    /// Long-lived bearer token authorizing graph API calls
    pub access_token: String,
}

/// A parent's monitoring subscription to one account.
///
/// Credential fields stay empty until the handle is matched against the
/// monitored-account pool. Invariant: (parent_id, handle) is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedChild {
    /// Unique child row id
    pub id: Uuid,

    /// Owning parent
    pub parent_id: Uuid,

    /// Public username on the platform
    pub handle: String,

    /// Platform-assigned account id, once linked
    pub external_id: Option<String>,

    /// Bearer token copied from the pool, once linked
    pub access_token: Option<String>,

    /// Parental consent flag
    pub consent_given: bool,

    /// Subscription creation time
    pub created_at: DateTime<Utc>,
}

impl LinkedChild {
    /// Create a pending (unlinked) subscription
    pub fn pending(parent_id: Uuid, handle: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent_id,
            handle: handle.into(),
            external_id: None,
            access_token: None,
            consent_given: true,
            created_at: Utc::now(),
        }
    }

    /// Both credential fields, or `None` if either is missing
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.external_id.as_deref(), self.access_token.as_deref()) {
            (Some(id), Some(token)) if !id.is_empty() && !token.is_empty() => Some((id, token)),
            _ => None,
        }
    }
}

/// A stored comment, exclusively owned by one linked child.
///
/// Dedup key is (comment_id, child_id): two parents monitoring the same
/// handle each keep an independent copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Owning linked child
    pub child_id: Uuid,

    /// Platform-assigned comment id
    pub comment_id: String,

    /// Platform-assigned id of the post the comment was left on
    pub post_id: String,

    /// Commenter's handle
    pub username: String,

    /// Raw comment text
    pub text: String,

    /// Classification label; `Neutral` until classified
    #[serde(default)]
    pub label: Label,

    /// Upstream comment timestamp, when the API provided one
    pub posted_at: Option<DateTime<Utc>>,

    /// Time this row was stored
    pub stored_at: DateTime<Utc>,
}

/// Structured summary of one ingestion run
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    /// Comments stored for the first time during this run
    pub new_comments: usize,

    /// Comments seen upstream (including duplicates)
    pub total_processed: usize,

    /// Newly stored comments labeled toxic
    pub toxic_found: usize,

    /// Per-item failures; never abort the containing run
    pub errors: Vec<IngestError>,
}

impl IngestReport {
    /// Fold another report into this one (parent fan-out, global sweep)
    pub fn merge(&mut self, other: IngestReport) {
        self.new_comments += other.new_comments;
        self.total_processed += other.total_processed;
        self.toxic_found += other.toxic_found;
        self.errors.extend(other.errors);
    }

    /// Record a per-item failure without aborting the run
    pub fn record_error(&mut self, scope: impl Into<String>, err: &Error) {
        self.errors.push(IngestError::new(scope, err));
    }
}

/// One per-item failure inside an ingestion run
#[derive(Debug, Clone, Serialize)]
pub struct IngestError {
    /// What failed, e.g. `child <id>` or `media <id>`
    pub scope: String,

    /// Machine-readable error code
    pub code: String,

    /// Human-readable detail
    pub message: String,
}

impl IngestError {
    pub fn new(scope: impl Into<String>, err: &Error) -> Self {
        Self {
            scope: scope.into(),
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Result of probing one child's stored credential against the graph API
#[derive(Debug, Clone, Serialize)]
pub struct CredentialStatus {
    pub child_id: Uuid,
    pub handle: String,
    pub valid: bool,

    /// Error detail when the probe failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
