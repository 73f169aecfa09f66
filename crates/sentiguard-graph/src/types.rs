//! Response schemas for the social graph API
//!
//! Upstream responses are dict-shaped; everything is validated into these
//! structs at the boundary. A body without the expected `data` array is a
//! malformed response, not an empty result.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Standard list envelope: `{"data": [...]}`
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: Vec<T>,
}

/// One media item (post) on the monitored account
#[derive(Debug, Clone, Deserialize)]
pub struct Media {
    pub id: String,

    #[serde(default)]
    pub caption: Option<String>,

    #[serde(default)]
    pub timestamp: Option<String>,
}

/// One comment on a media item
#[derive(Debug, Clone, Deserialize)]
pub struct MediaComment {
    pub id: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub timestamp: Option<String>,
}

impl MediaComment {
    /// Upstream timestamp, if present and parseable.
    ///
    /// The API emits both RFC 3339 and the legacy `+0000` offset form.
    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.as_deref()?;
        parse_graph_timestamp(raw)
    }
}

/// Result of probing a token against the `/me` endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    pub id: String,

    #[serde(default)]
    pub username: Option<String>,
}

pub(crate) fn parse_graph_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
