//! Notification dispatch with isolated failures
//!
//! Delivery failures are logged and reported as `false`; they never
//! propagate into the ingestion path, which persists comments regardless of
//! notification outcome.

use crate::alerts::{summary_alert, toxic_comment_alert, ToxicFinding};
use crate::mailer::Mailer;
use sentiguard_core::{Comment, LinkedChild, Parent};
use std::sync::Arc;
use tracing::{error, info};

pub struct NotificationDispatcher {
    mailer: Arc<dyn Mailer>,
    dashboard_url: String,
}

impl NotificationDispatcher {
    pub fn new(mailer: Arc<dyn Mailer>, dashboard_url: impl Into<String>) -> Self {
        Self {
            mailer,
            dashboard_url: dashboard_url.into(),
        }
    }

    /// Alert the owning parent about one newly detected toxic comment
    pub async fn notify_toxic_comment(
        &self,
        comment: &Comment,
        child: &LinkedChild,
        parent: &Parent,
    ) -> bool {
        let email = toxic_comment_alert(comment, child, parent, &self.dashboard_url);
        match self.mailer.send(&email).await {
            Ok(()) => {
                info!(
                    parent = %parent.username,
                    handle = %child.handle,
                    comment_id = %comment.comment_id,
                    "toxic comment alert sent"
                );
                true
            }
            Err(e) => {
                error!(
                    parent = %parent.username,
                    handle = %child.handle,
                    error = %e,
                    "failed to send toxic comment alert"
                );
                false
            }
        }
    }

    /// Send one batched summary covering several detections
    pub async fn notify_summary(&self, parent: &Parent, findings: &[ToxicFinding]) -> bool {
        if findings.is_empty() {
            return false;
        }

        let email = summary_alert(parent, findings, &self.dashboard_url);
        match self.mailer.send(&email).await {
            Ok(()) => {
                info!(
                    parent = %parent.username,
                    count = findings.len(),
                    "toxic comment summary sent"
                );
                true
            }
            Err(e) => {
                error!(parent = %parent.username, error = %e, "failed to send summary alert");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::OutboundEmail;
    use async_trait::async_trait;
    use chrono::Utc;
    use parking_lot::Mutex;
    use sentiguard_core::{Error, Label, Result};
    use uuid::Uuid;

    struct RecordingMailer {
        sent: Mutex<Vec<OutboundEmail>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: &OutboundEmail) -> Result<()> {
            self.sent.lock().push(email.clone());
            Ok(())
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _email: &OutboundEmail) -> Result<()> {
            Err(Error::notification("smtp bridge down"))
        }
    }

    fn fixtures() -> (Parent, LinkedChild, Comment) {
        let parent = Parent {
            id: Uuid::new_v4(),
            username: "pat".to_string(),
            email: "pat@example.com".to_string(),
            display_name: None,
            password_hash: "x".to_string(),
            created_at: Utc::now(),
        };
        let child = LinkedChild::pending(parent.id, "kid1");
        let comment = Comment {
            child_id: child.id,
            comment_id: "c1".to_string(),
            post_id: "p1".to_string(),
            username: "troll".to_string(),
            text: "I hate this".to_string(),
            label: Label::Toxic,
            posted_at: None,
            stored_at: Utc::now(),
        };
        (parent, child, comment)
    }

    #[tokio::test]
    async fn test_successful_dispatch_returns_true() {
        let mailer = Arc::new(RecordingMailer {
            sent: Mutex::new(Vec::new()),
        });
        let dispatcher = NotificationDispatcher::new(mailer.clone(), "https://app.example.com");
        let (parent, child, comment) = fixtures();

        assert!(dispatcher.notify_toxic_comment(&comment, &child, &parent).await);
        assert_eq!(mailer.sent.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_swallowed() {
        let dispatcher =
            NotificationDispatcher::new(Arc::new(FailingMailer), "https://app.example.com");
        let (parent, child, comment) = fixtures();

        assert!(!dispatcher.notify_toxic_comment(&comment, &child, &parent).await);
    }

    #[tokio::test]
    async fn test_empty_summary_sends_nothing() {
        let mailer = Arc::new(RecordingMailer {
            sent: Mutex::new(Vec::new()),
        });
        let dispatcher = NotificationDispatcher::new(mailer.clone(), "https://app.example.com");
        let (parent, _, _) = fixtures();

        assert!(!dispatcher.notify_summary(&parent, &[]).await);
        assert!(mailer.sent.lock().is_empty());
    }
}
