//! SentiGuard Graph
//!
//! Typed client for the social graph API: media listing, per-media comments,
//! and token probes. All responses are validated into explicit schemas at
//! the boundary; unexpected shapes surface as malformed-response errors
//! rather than empty results.

pub mod client;
pub mod types;

pub use client::GraphApiClient;
pub use types::{Envelope, Media, MediaComment, TokenInfo};

use async_trait::async_trait;
use sentiguard_core::Result;

/// Seam over the social graph API so the ingestion engine can be exercised
/// against fixtures.
#[async_trait]
pub trait SocialGraph: Send + Sync {
    /// List posts for an external account id
    async fn list_media(&self, account_id: &str, access_token: &str) -> Result<Vec<Media>>;

    /// List comments on one media item
    async fn list_comments(&self, media_id: &str, access_token: &str)
        -> Result<Vec<MediaComment>>;

    /// Probe a stored token for validity
    async fn token_info(&self, access_token: &str) -> Result<TokenInfo>;
}
