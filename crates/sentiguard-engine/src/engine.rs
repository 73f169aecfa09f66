//! The ingestion engine
//!
//! Pulls media and comments from the social graph API, deduplicates per
//! child, classifies new comments, persists them, and hands toxic findings
//! to the notification dispatcher. Per-item failures are folded into the
//! run's report; nothing short of a missing child aborts a run.

use crate::locks::ChildLocks;
use chrono::Utc;
use sentiguard_classifiers::CommentOracle;
use sentiguard_core::{
    Comment, CredentialStatus, Error, IngestReport, LinkedChild, Result,
};
use sentiguard_graph::SocialGraph;
use sentiguard_notify::{NotificationDispatcher, ToxicFinding};
use sentiguard_store::Store;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub struct IngestEngine {
    store: Arc<dyn Store>,
    oracle: Arc<CommentOracle>,
    graph: Arc<dyn SocialGraph>,
    dispatcher: Arc<NotificationDispatcher>,
    locks: ChildLocks,
}

impl IngestEngine {
    pub fn new(
        store: Arc<dyn Store>,
        oracle: Arc<CommentOracle>,
        graph: Arc<dyn SocialGraph>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            store,
            oracle,
            graph,
            dispatcher,
            locks: ChildLocks::new(),
        }
    }

    /// Ingest one child, alerting immediately per new toxic comment
    pub async fn ingest_child(&self, child_id: &Uuid) -> Result<IngestReport> {
        let child = self
            .store
            .child(child_id)
            .ok_or_else(|| Error::not_found(format!("child {child_id}")))?;

        let (report, findings) = self.run_child(&child).await;
        self.alert_immediately(&child, &findings).await;
        Ok(report)
    }

    /// Ingest every child of one parent, alerting per toxic comment
    pub async fn ingest_parent(&self, parent_id: &Uuid) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        for child in self.store.children_of(parent_id) {
            let (child_report, findings) = self.run_child(&child).await;
            report.merge(child_report);
            self.alert_immediately(&child, &findings).await;
        }
        Ok(report)
    }

    /// Scheduled sweep over every subscription.
    ///
    /// Toxic findings are batched per parent: a single finding gets the
    /// regular alert, several get one summary email.
    pub async fn sweep(&self) -> IngestReport {
        let mut report = IngestReport::default();
        let mut per_parent: HashMap<Uuid, Vec<ToxicFinding>> = HashMap::new();

        for child in self.store.all_children() {
            let (child_report, findings) = self.run_child(&child).await;
            report.merge(child_report);
            per_parent
                .entry(child.parent_id)
                .or_default()
                .extend(findings);
        }

        for (parent_id, findings) in per_parent {
            if findings.is_empty() {
                continue;
            }
            let Some(parent) = self.store.parent_by_id(&parent_id) else {
                warn!(%parent_id, "toxic findings for unknown parent, skipping alert");
                continue;
            };
            if let [finding] = findings.as_slice() {
                if let Some(child) = self.store.child(&finding.comment.child_id) {
                    self.dispatcher
                        .notify_toxic_comment(&finding.comment, &child, &parent)
                        .await;
                }
            } else {
                self.dispatcher.notify_summary(&parent, &findings).await;
            }
        }

        info!(
            new_comments = report.new_comments,
            toxic_found = report.toxic_found,
            errors = report.errors.len(),
            "sweep complete"
        );
        report
    }

    /// Re-run the oracle over every stored comment; rewrite labels that
    /// changed and return the mutation count. Converges: an immediate second
    /// run returns 0.
    pub async fn reclassify_all(&self) -> Result<usize> {
        let mut updated = 0;
        for comment in self.store.all_comments() {
            let label = self.oracle.classify(&comment.text).await?;
            if label != comment.label
                && self
                    .store
                    .update_label(&comment.child_id, &comment.comment_id, label)?
            {
                updated += 1;
            }
        }
        info!(updated, "bulk reclassification complete");
        Ok(updated)
    }

    /// Probe each of the parent's stored credentials against the graph API
    pub async fn check_credentials(&self, parent_id: &Uuid) -> Vec<CredentialStatus> {
        let mut statuses = Vec::new();
        for child in self.store.children_of(parent_id) {
            let status = match child.credentials() {
                None => CredentialStatus {
                    child_id: child.id,
                    handle: child.handle.clone(),
                    valid: false,
                    detail: Some(Error::MissingCredentials.to_string()),
                },
                Some((_, token)) => match self.graph.token_info(token).await {
                    Ok(_) => CredentialStatus {
                        child_id: child.id,
                        handle: child.handle.clone(),
                        valid: true,
                        detail: None,
                    },
                    Err(e) => CredentialStatus {
                        child_id: child.id,
                        handle: child.handle.clone(),
                        valid: false,
                        detail: Some(e.to_string()),
                    },
                },
            };
            statuses.push(status);
        }
        statuses
    }

    async fn alert_immediately(&self, child: &LinkedChild, findings: &[ToxicFinding]) {
        if findings.is_empty() {
            return;
        }
        let Some(parent) = self.store.parent_by_id(&child.parent_id) else {
            warn!(child = %child.id, "toxic findings for unknown parent, skipping alert");
            return;
        };
        for finding in findings {
            self.dispatcher
                .notify_toxic_comment(&finding.comment, child, &parent)
                .await;
        }
    }

    /// Fetch, dedup, classify, and store for one child.
    ///
    /// Returns the run report plus the newly stored toxic comments; the
    /// caller decides how to alert. Comments are persisted before any alert
    /// fires, so notification outcome never affects storage.
    async fn run_child(&self, child: &LinkedChild) -> (IngestReport, Vec<ToxicFinding>) {
        let mut report = IngestReport::default();
        let mut findings = Vec::new();

        let Some((external_id, token)) = child.credentials() else {
            report.record_error(format!("child {}", child.id), &Error::MissingCredentials);
            return (report, findings);
        };

        // Serialize overlapping runs on this child
        let _guard = self.locks.acquire(child.id).await;

        let media_list = match self.graph.list_media(external_id, token).await {
            Ok(media) => media,
            Err(e) => {
                metrics::counter!("sentiguard_upstream_errors_total").increment(1);
                warn!(child = %child.id, error = %e, "media listing failed");
                report.record_error(format!("child {}", child.id), &e);
                return (report, findings);
            }
        };

        for media in &media_list {
            let comments = match self.graph.list_comments(&media.id, token).await {
                Ok(comments) => comments,
                Err(e) => {
                    metrics::counter!("sentiguard_upstream_errors_total").increment(1);
                    warn!(media = %media.id, error = %e, "comment listing failed");
                    report.record_error(format!("media {}", media.id), &e);
                    continue;
                }
            };

            for upstream in comments {
                report.total_processed += 1;

                if upstream.id.is_empty() {
                    continue;
                }
                if self.store.comment_exists(&child.id, &upstream.id) {
                    // Expected duplicate, silently skipped
                    continue;
                }

                let label = match self.oracle.classify(&upstream.text).await {
                    Ok(label) => label,
                    Err(e) => {
                        report.record_error(format!("comment {}", upstream.id), &e);
                        continue;
                    }
                };

                let comment = Comment {
                    child_id: child.id,
                    comment_id: upstream.id.clone(),
                    post_id: media.id.clone(),
                    username: upstream.username.clone(),
                    text: upstream.text.clone(),
                    label,
                    posted_at: upstream.posted_at(),
                    stored_at: Utc::now(),
                };

                match self.store.insert_comment(comment.clone()) {
                    Ok(true) => {
                        metrics::counter!("sentiguard_comments_ingested_total").increment(1);
                        report.new_comments += 1;
                        if label.is_toxic() {
                            metrics::counter!("sentiguard_toxic_comments_total").increment(1);
                            report.toxic_found += 1;
                            findings.push(ToxicFinding {
                                handle: child.handle.clone(),
                                comment,
                            });
                        }
                    }
                    // Lost a race; the dedup key is the final authority
                    Ok(false) => {}
                    Err(e) => report.record_error(format!("comment {}", upstream.id), &e),
                }
            }
        }

        (report, findings)
    }
}
