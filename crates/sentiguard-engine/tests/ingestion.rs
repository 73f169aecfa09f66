//! End-to-end ingestion runs against a fixture graph and recording mailer.

use async_trait::async_trait;
use parking_lot::Mutex;
use sentiguard_classifiers::CommentOracle;
use sentiguard_core::{Error, Label, MonitoredAccount, Parent, Result};
use sentiguard_engine::{IngestEngine, LinkageService};
use sentiguard_graph::{Media, MediaComment, SocialGraph, TokenInfo};
use sentiguard_notify::{Mailer, NotificationDispatcher, OutboundEmail};
use sentiguard_store::{MemoryStore, Store};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Fixture graph: media per account id, comments per media id, and optional
/// per-media comment failures.
#[derive(Default)]
struct FixtureGraph {
    media: HashMap<String, Vec<Media>>,
    comments: HashMap<String, Vec<MediaComment>>,
    failing_media: Vec<String>,
}

impl FixtureGraph {
    fn media_item(id: &str) -> Media {
        Media {
            id: id.to_string(),
            caption: None,
            timestamp: None,
        }
    }

    fn comment(id: &str, text: &str) -> MediaComment {
        MediaComment {
            id: id.to_string(),
            username: "commenter".to_string(),
            text: text.to_string(),
            timestamp: Some("2024-05-01T10:30:00+0000".to_string()),
        }
    }
}

#[async_trait]
impl SocialGraph for FixtureGraph {
    async fn list_media(&self, account_id: &str, _access_token: &str) -> Result<Vec<Media>> {
        self.media
            .get(account_id)
            .cloned()
            .ok_or_else(|| Error::upstream(400, "unknown account"))
    }

    async fn list_comments(
        &self,
        media_id: &str,
        _access_token: &str,
    ) -> Result<Vec<MediaComment>> {
        if self.failing_media.iter().any(|m| m == media_id) {
            return Err(Error::upstream(500, "comments unavailable"));
        }
        Ok(self.comments.get(media_id).cloned().unwrap_or_default())
    }

    async fn token_info(&self, access_token: &str) -> Result<TokenInfo> {
        if access_token == "T" {
            Ok(TokenInfo {
                id: "1".to_string(),
                username: Some("kid1".to_string()),
            })
        } else {
            Err(Error::upstream(401, "invalid token"))
        }
    }
}

#[derive(Default)]
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

struct Harness {
    store: Arc<MemoryStore>,
    engine: IngestEngine,
    linkage: LinkageService,
    mailer: Arc<RecordingMailer>,
}

fn harness(graph: FixtureGraph) -> Harness {
    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    let mailer = Arc::new(RecordingMailer::default());
    let dispatcher = Arc::new(NotificationDispatcher::new(
        mailer.clone(),
        "https://app.example.com",
    ));
    let engine = IngestEngine::new(
        store.clone(),
        Arc::new(CommentOracle::new().unwrap()),
        Arc::new(graph),
        dispatcher,
    );
    let linkage = LinkageService::new(store.clone());
    Harness {
        store,
        engine,
        linkage,
        mailer,
    }
}

fn register_parent(store: &dyn Store, username: &str) -> Parent {
    let parent = Parent {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        display_name: None,
        password_hash: "x".to_string(),
        created_at: chrono::Utc::now(),
    };
    store.insert_parent(parent.clone()).unwrap();
    parent
}

fn seed_kid1(store: &dyn Store) {
    store
        .seed_account(MonitoredAccount {
            external_id: "1".to_string(),
            handle: "kid1".to_string(),
            access_token: "T".to_string(),
        })
        .unwrap();
}

#[tokio::test]
async fn test_toxic_comment_is_stored_and_alerted() {
    let mut graph = FixtureGraph::default();
    graph
        .media
        .insert("1".to_string(), vec![FixtureGraph::media_item("m1")]);
    graph.comments.insert(
        "m1".to_string(),
        vec![FixtureGraph::comment("c1", "I hate this")],
    );

    let h = harness(graph);
    seed_kid1(h.store.as_ref());
    let parent = register_parent(h.store.as_ref(), "pat");
    let child = h.linkage.link_child(parent.id, "kid1").unwrap();

    let report = h.engine.ingest_child(&child.id).await.unwrap();
    assert_eq!(report.new_comments, 1);
    assert_eq!(report.toxic_found, 1);
    assert!(report.errors.is_empty());

    let stored = h.store.comments_of(&child.id);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].label, Label::Toxic);
    assert!(stored[0].posted_at.is_some());

    let sent = h.mailer.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "pat@example.com");
    assert!(sent[0].text_body.contains("I hate this"));
}

#[tokio::test]
async fn test_repeat_ingestion_stores_nothing_new() {
    let mut graph = FixtureGraph::default();
    graph
        .media
        .insert("1".to_string(), vec![FixtureGraph::media_item("m1")]);
    graph.comments.insert(
        "m1".to_string(),
        vec![FixtureGraph::comment("c1", "I hate this")],
    );

    let h = harness(graph);
    seed_kid1(h.store.as_ref());
    let parent = register_parent(h.store.as_ref(), "pat");
    let child = h.linkage.link_child(parent.id, "kid1").unwrap();

    h.engine.ingest_child(&child.id).await.unwrap();
    let second = h.engine.ingest_child(&child.id).await.unwrap();

    assert_eq!(second.new_comments, 0);
    assert_eq!(second.total_processed, 1);
    assert_eq!(h.store.comments_of(&child.id).len(), 1);
    // No second alert for the already-known comment
    assert_eq!(h.mailer.sent.lock().len(), 1);
}

#[tokio::test]
async fn test_missing_credentials_reported_without_upstream_call() {
    let h = harness(FixtureGraph::default());
    let parent = register_parent(h.store.as_ref(), "pat");
    // Handle not in the pool, so the subscription stays pending
    let child = h.linkage.link_child(parent.id, "unknown_kid").unwrap();

    let report = h.engine.ingest_child(&child.id).await.unwrap();
    assert_eq!(report.new_comments, 0);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].code, "missing_credentials");
}

#[tokio::test]
async fn test_one_failing_media_does_not_stop_the_run() {
    let mut graph = FixtureGraph::default();
    graph.media.insert(
        "1".to_string(),
        vec![
            FixtureGraph::media_item("m1"),
            FixtureGraph::media_item("m2"),
        ],
    );
    graph.failing_media.push("m1".to_string());
    graph.comments.insert(
        "m2".to_string(),
        vec![FixtureGraph::comment("c2", "you are so stupid")],
    );

    let h = harness(graph);
    seed_kid1(h.store.as_ref());
    let parent = register_parent(h.store.as_ref(), "pat");
    let child = h.linkage.link_child(parent.id, "kid1").unwrap();

    let report = h.engine.ingest_child(&child.id).await.unwrap();
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].scope, "media m1");
    assert_eq!(report.new_comments, 1);
    assert_eq!(report.toxic_found, 1);
}

#[tokio::test]
async fn test_sweep_batches_multiple_findings_into_one_summary() {
    let mut graph = FixtureGraph::default();
    graph
        .media
        .insert("1".to_string(), vec![FixtureGraph::media_item("m1")]);
    graph.comments.insert(
        "m1".to_string(),
        vec![
            FixtureGraph::comment("c1", "I hate this"),
            FixtureGraph::comment("c2", "what an idiot"),
        ],
    );

    let h = harness(graph);
    seed_kid1(h.store.as_ref());
    let parent = register_parent(h.store.as_ref(), "pat");
    h.linkage.link_child(parent.id, "kid1").unwrap();

    let report = h.engine.sweep().await;
    assert_eq!(report.toxic_found, 2);

    let sent = h.mailer.sent.lock();
    assert_eq!(sent.len(), 1, "two findings collapse into one summary");
    assert!(sent[0].subject.contains('2') || sent[0].text_body.contains('2'));
}

#[tokio::test]
async fn test_sweep_with_single_finding_sends_regular_alert() {
    let mut graph = FixtureGraph::default();
    graph
        .media
        .insert("1".to_string(), vec![FixtureGraph::media_item("m1")]);
    graph.comments.insert(
        "m1".to_string(),
        vec![
            FixtureGraph::comment("c1", "love this so much"),
            FixtureGraph::comment("c2", "I hate this"),
        ],
    );

    let h = harness(graph);
    seed_kid1(h.store.as_ref());
    let parent = register_parent(h.store.as_ref(), "pat");
    h.linkage.link_child(parent.id, "kid1").unwrap();

    let report = h.engine.sweep().await;
    assert_eq!(report.new_comments, 2);
    assert_eq!(report.toxic_found, 1);

    let sent = h.mailer.sent.lock();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text_body.contains("I hate this"));
}

#[tokio::test]
async fn test_reclassify_converges() {
    let mut graph = FixtureGraph::default();
    graph
        .media
        .insert("1".to_string(), vec![FixtureGraph::media_item("m1")]);
    graph.comments.insert(
        "m1".to_string(),
        vec![
            FixtureGraph::comment("c1", "this is great"),
            FixtureGraph::comment("c2", "I hate this"),
        ],
    );

    let h = harness(graph);
    seed_kid1(h.store.as_ref());
    let parent = register_parent(h.store.as_ref(), "pat");
    let child = h.linkage.link_child(parent.id, "kid1").unwrap();
    h.engine.ingest_child(&child.id).await.unwrap();

    // Labels already match the oracle, so a fresh pass changes nothing
    assert_eq!(h.engine.reclassify_all().await.unwrap(), 0);
}

#[tokio::test]
async fn test_reclassify_repairs_stale_labels() {
    let h = harness(FixtureGraph::default());
    let parent = register_parent(h.store.as_ref(), "pat");
    let child = h.linkage.link_child(parent.id, "kid1").unwrap();

    // A row persisted before classification keeps the default label
    h.store
        .insert_comment(sentiguard_core::Comment {
            child_id: child.id,
            comment_id: "c1".to_string(),
            post_id: "m1".to_string(),
            username: "commenter".to_string(),
            text: "I hate this".to_string(),
            label: Label::Neutral,
            posted_at: None,
            stored_at: chrono::Utc::now(),
        })
        .unwrap();

    assert_eq!(h.engine.reclassify_all().await.unwrap(), 1);
    assert_eq!(h.store.comments_of(&child.id)[0].label, Label::Toxic);
    assert_eq!(h.engine.reclassify_all().await.unwrap(), 0);
}

#[tokio::test]
async fn test_check_credentials_reports_valid_and_missing() {
    let mut graph = FixtureGraph::default();
    graph
        .media
        .insert("1".to_string(), vec![FixtureGraph::media_item("m1")]);

    let h = harness(graph);
    seed_kid1(h.store.as_ref());
    let parent = register_parent(h.store.as_ref(), "pat");
    h.linkage.link_child(parent.id, "kid1").unwrap();
    h.linkage.link_child(parent.id, "pending_kid").unwrap();

    let mut statuses = h.engine.check_credentials(&parent.id).await;
    statuses.sort_by(|a, b| a.handle.cmp(&b.handle));

    assert_eq!(statuses.len(), 2);
    assert!(statuses[0].valid, "kid1 token probes ok");
    assert!(!statuses[1].valid);
    assert!(statuses[1].detail.is_some());
}
