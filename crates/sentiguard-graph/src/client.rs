//! HTTP client for the social graph API

use crate::types::{Envelope, Media, MediaComment, TokenInfo};
use crate::SocialGraph;
use async_trait::async_trait;
use sentiguard_core::{Error, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://graph.facebook.com/v23.0";

/// Bound on any single upstream request; the API degrades by hanging, and an
/// ingestion sweep must never block indefinitely on one account.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct GraphApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl GraphApiClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a non-default base URL (staging, tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::internal(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(map_transport_error)?;

        decode_response(resp).await
    }
}

#[async_trait]
impl SocialGraph for GraphApiClient {
    async fn list_media(&self, account_id: &str, access_token: &str) -> Result<Vec<Media>> {
        tracing::debug!(account_id, "listing media");
        let envelope: Envelope<Media> = self
            .get_json(
                format!("{}/{}/media", self.base_url, account_id),
                &[
                    ("fields", "id,caption,timestamp"),
                    ("access_token", access_token),
                ],
            )
            .await?;

        Ok(envelope.data)
    }

    async fn list_comments(&self, media_id: &str, access_token: &str) -> Result<Vec<MediaComment>> {
        tracing::debug!(media_id, "listing comments");
        let envelope: Envelope<MediaComment> = self
            .get_json(
                format!("{}/{}/comments", self.base_url, media_id),
                &[
                    ("fields", "id,username,text,timestamp"),
                    ("access_token", access_token),
                ],
            )
            .await?;

        Ok(envelope.data)
    }

    async fn token_info(&self, access_token: &str) -> Result<TokenInfo> {
        self.get_json(
            format!("{}/me", self.base_url),
            &[("access_token", access_token)],
        )
        .await
    }
}

/// Distinguish timeouts from other transport failures for observability
fn map_transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout
    } else {
        let status = err.status().map(|s| s.as_u16()).unwrap_or(0);
        Error::upstream(status, err.to_string())
    }
}

async fn decode_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::upstream(status.as_u16(), body));
    }

    let body = resp.text().await.map_err(map_transport_error)?;
    serde_json::from_str(&body).map_err(|e| Error::malformed(e.to_string()))
}
