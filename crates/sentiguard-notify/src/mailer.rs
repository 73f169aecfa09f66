//! Mail delivery seam

use async_trait::async_trait;
use sentiguard_core::{Error, Result};
use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// One outbound message, with optional HTML alternative body
#[derive(Debug, Clone, Serialize)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub text_body: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_body: Option<String>,
}

/// Outbound email delivery
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<()>;
}

/// Mailer posting JSON to a mail-provider HTTP endpoint
pub struct HttpMailer {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
}

impl HttpMailer {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::internal(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            from: from.into(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        let request = SendRequest {
            from: &self.from,
            to: &email.to,
            subject: &email.subject,
            text: &email.text_body,
            html: email.html_body.as_deref(),
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::notification(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::notification(format!(
                "mail provider returned {status}: {body}"
            )));
        }

        Ok(())
    }
}

/// Development mailer: logs the message instead of delivering it
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        info!(to = %email.to, subject = %email.subject, "email (log mailer)");
        Ok(())
    }
}
