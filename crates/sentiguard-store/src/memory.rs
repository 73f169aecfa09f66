//! In-memory store with optional journal persistence

use crate::journal::{Journal, JournalEvent};
use crate::store::Store;
use parking_lot::{Mutex, RwLock};
use sentiguard_core::{Comment, Error, Label, LinkedChild, MonitoredAccount, Parent, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

#[derive(Default)]
struct State {
    /// Pool credentials keyed by handle
    accounts: HashMap<String, MonitoredAccount>,

    parents: HashMap<Uuid, Parent>,

    /// username -> parent id
    parent_names: HashMap<String, Uuid>,

    children: HashMap<Uuid, LinkedChild>,

    /// child id -> comments, insertion order preserved
    comments: HashMap<Uuid, Vec<Comment>>,
}

impl State {
    fn apply(&mut self, event: JournalEvent) {
        match event {
            JournalEvent::AccountSeeded { account } => {
                // External ids are unique across the pool: a re-import under
                // a new handle replaces the old row rather than duplicating it
                self.accounts
                    .retain(|_, a| a.external_id != account.external_id);
                self.accounts.insert(account.handle.clone(), account);
            }
            JournalEvent::ParentCreated { parent } => {
                self.parent_names.insert(parent.username.clone(), parent.id);
                self.parents.insert(parent.id, parent);
            }
            JournalEvent::ChildUpserted { child } => {
                self.children.insert(child.id, child);
            }
            JournalEvent::ChildDeleted { id } => {
                self.children.remove(&id);
                self.comments.remove(&id);
            }
            JournalEvent::CommentStored { comment } => {
                self.comments
                    .entry(comment.child_id)
                    .or_default()
                    .push(comment);
            }
            JournalEvent::LabelUpdated {
                child_id,
                comment_id,
                label,
            } => {
                if let Some(comments) = self.comments.get_mut(&child_id) {
                    if let Some(comment) =
                        comments.iter_mut().find(|c| c.comment_id == comment_id)
                    {
                        comment.label = label;
                    }
                }
            }
        }
    }

    /// Events that rebuild the current state exactly (journal compaction)
    fn snapshot(&self) -> Vec<JournalEvent> {
        let mut events = Vec::new();
        for account in self.accounts.values() {
            events.push(JournalEvent::AccountSeeded {
                account: account.clone(),
            });
        }
        for parent in self.parents.values() {
            events.push(JournalEvent::ParentCreated {
                parent: parent.clone(),
            });
        }
        for child in self.children.values() {
            events.push(JournalEvent::ChildUpserted {
                child: child.clone(),
            });
        }
        for comments in self.comments.values() {
            for comment in comments {
                events.push(JournalEvent::CommentStored {
                    comment: comment.clone(),
                });
            }
        }
        events
    }
}

/// In-memory store, optionally backed by an append-only journal.
///
/// All reads take a shared lock; mutations take the write lock, mutate, then
/// append the event. A crash between fetch and append only loses rows that
/// ingestion will re-fetch and reprocess on its next run.
pub struct MemoryStore {
    state: RwLock<State>,
    journal: Option<Mutex<Journal>>,
}

impl MemoryStore {
    /// Volatile store, no persistence (tests, ephemeral deployments)
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            journal: None,
        }
    }

    /// Open a journal-backed store, replaying existing history
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let events = Journal::replay(&path)?;
        let mut state = State::default();
        let replayed = events.len();
        for event in events {
            state.apply(event);
        }

        let journal = Journal::open(&path)?;
        info!(
            path = %path.as_ref().display(),
            events = replayed,
            "store opened from journal"
        );

        Ok(Self {
            state: RwLock::new(state),
            journal: Some(Mutex::new(journal)),
        })
    }

    fn record(&self, event: &JournalEvent) -> Result<()> {
        if let Some(journal) = &self.journal {
            journal.lock().append(event)?;
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn seed_account(&self, account: MonitoredAccount) -> Result<()> {
        let event = JournalEvent::AccountSeeded {
            account: account.clone(),
        };
        self.state.write().apply(event.clone());
        self.record(&event)
    }

    fn account_by_handle(&self, handle: &str) -> Option<MonitoredAccount> {
        self.state.read().accounts.get(handle).cloned()
    }

    fn insert_parent(&self, parent: Parent) -> Result<()> {
        let mut state = self.state.write();
        if state.parent_names.contains_key(&parent.username) {
            return Err(Error::store(format!(
                "username '{}' is already registered",
                parent.username
            )));
        }
        let event = JournalEvent::ParentCreated {
            parent: parent.clone(),
        };
        state.apply(event.clone());
        drop(state);
        self.record(&event)
    }

    fn parent_by_username(&self, username: &str) -> Option<Parent> {
        let state = self.state.read();
        let id = state.parent_names.get(username)?;
        state.parents.get(id).cloned()
    }

    fn parent_by_id(&self, id: &Uuid) -> Option<Parent> {
        self.state.read().parents.get(id).cloned()
    }

    fn upsert_child(&self, child: LinkedChild) -> Result<()> {
        let event = JournalEvent::ChildUpserted {
            child: child.clone(),
        };
        self.state.write().apply(event.clone());
        self.record(&event)
    }

    fn child(&self, id: &Uuid) -> Option<LinkedChild> {
        self.state.read().children.get(id).cloned()
    }

    fn child_by_handle(&self, parent_id: &Uuid, handle: &str) -> Option<LinkedChild> {
        self.state
            .read()
            .children
            .values()
            .find(|c| c.parent_id == *parent_id && c.handle == handle)
            .cloned()
    }

    fn children_of(&self, parent_id: &Uuid) -> Vec<LinkedChild> {
        let mut children: Vec<_> = self
            .state
            .read()
            .children
            .values()
            .filter(|c| c.parent_id == *parent_id)
            .cloned()
            .collect();
        children.sort_by_key(|c| c.created_at);
        children
    }

    fn all_children(&self) -> Vec<LinkedChild> {
        let mut children: Vec<_> = self.state.read().children.values().cloned().collect();
        children.sort_by_key(|c| c.created_at);
        children
    }

    fn delete_child(&self, id: &Uuid) -> Result<bool> {
        let mut state = self.state.write();
        if !state.children.contains_key(id) {
            return Ok(false);
        }
        let event = JournalEvent::ChildDeleted { id: *id };
        state.apply(event.clone());
        drop(state);
        self.record(&event)?;
        Ok(true)
    }

    fn comment_exists(&self, child_id: &Uuid, comment_id: &str) -> bool {
        self.state
            .read()
            .comments
            .get(child_id)
            .is_some_and(|comments| comments.iter().any(|c| c.comment_id == comment_id))
    }

    fn insert_comment(&self, comment: Comment) -> Result<bool> {
        let mut state = self.state.write();
        let exists = state
            .comments
            .get(&comment.child_id)
            .is_some_and(|comments| comments.iter().any(|c| c.comment_id == comment.comment_id));
        if exists {
            return Ok(false);
        }

        let event = JournalEvent::CommentStored {
            comment: comment.clone(),
        };
        state.apply(event.clone());
        drop(state);
        self.record(&event)?;
        Ok(true)
    }

    fn comments_of(&self, child_id: &Uuid) -> Vec<Comment> {
        self.state
            .read()
            .comments
            .get(child_id)
            .cloned()
            .unwrap_or_default()
    }

    fn all_comments(&self) -> Vec<Comment> {
        self.state
            .read()
            .comments
            .values()
            .flatten()
            .cloned()
            .collect()
    }

    fn toxic_comments_of_parent(&self, parent_id: &Uuid) -> Vec<Comment> {
        let state = self.state.read();
        let mut toxic = Vec::new();
        for child in state.children.values() {
            if child.parent_id != *parent_id {
                continue;
            }
            if let Some(comments) = state.comments.get(&child.id) {
                toxic.extend(comments.iter().filter(|c| c.label.is_toxic()).cloned());
            }
        }
        toxic
    }

    /// Rewrite the journal as a snapshot of current state
    fn compact(&self) -> Result<()> {
        let Some(journal) = &self.journal else {
            return Ok(());
        };
        let state = self.state.read();
        journal.lock().rewrite(&state.snapshot())
    }

    fn update_label(&self, child_id: &Uuid, comment_id: &str, label: Label) -> Result<bool> {
        let mut state = self.state.write();
        let found = state
            .comments
            .get(child_id)
            .is_some_and(|comments| comments.iter().any(|c| c.comment_id == comment_id));
        if !found {
            return Ok(false);
        }

        let event = JournalEvent::LabelUpdated {
            child_id: *child_id,
            comment_id: comment_id.to_string(),
            label,
        };
        state.apply(event.clone());
        drop(state);
        self.record(&event)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn comment(child_id: Uuid, comment_id: &str, label: Label) -> Comment {
        Comment {
            child_id,
            comment_id: comment_id.to_string(),
            post_id: "p1".to_string(),
            username: "commenter".to_string(),
            text: "text".to_string(),
            label,
            posted_at: None,
            stored_at: Utc::now(),
        }
    }

    fn child(parent_id: Uuid, handle: &str) -> LinkedChild {
        LinkedChild::pending(parent_id, handle)
    }

    #[test]
    fn test_dedup_is_scoped_per_child() {
        let store = MemoryStore::new();
        let parent_p = Uuid::new_v4();
        let parent_q = Uuid::new_v4();
        let child_p = child(parent_p, "kid1");
        let child_q = child(parent_q, "kid1");
        store.upsert_child(child_p.clone()).unwrap();
        store.upsert_child(child_q.clone()).unwrap();

        // Same upstream comment id lands once per child
        assert!(store.insert_comment(comment(child_p.id, "c1", Label::Neutral)).unwrap());
        assert!(store.insert_comment(comment(child_q.id, "c1", Label::Neutral)).unwrap());
        assert!(!store.insert_comment(comment(child_p.id, "c1", Label::Neutral)).unwrap());

        assert_eq!(store.comments_of(&child_p.id).len(), 1);
        assert_eq!(store.comments_of(&child_q.id).len(), 1);
    }

    #[test]
    fn test_delete_cascades_only_own_comments() {
        let store = MemoryStore::new();
        let child_p = child(Uuid::new_v4(), "kid1");
        let child_q = child(Uuid::new_v4(), "kid1");
        store.upsert_child(child_p.clone()).unwrap();
        store.upsert_child(child_q.clone()).unwrap();
        store.insert_comment(comment(child_p.id, "c1", Label::Toxic)).unwrap();
        store.insert_comment(comment(child_q.id, "c1", Label::Toxic)).unwrap();

        assert!(store.delete_child(&child_p.id).unwrap());
        assert!(store.child(&child_p.id).is_none());
        assert!(store.comments_of(&child_p.id).is_empty());
        assert_eq!(store.comments_of(&child_q.id).len(), 1);
    }

    #[test]
    fn test_reseeding_external_id_replaces_old_handle() {
        let store = MemoryStore::new();
        store
            .seed_account(MonitoredAccount {
                external_id: "1".to_string(),
                handle: "kid1".to_string(),
                access_token: "T".to_string(),
            })
            .unwrap();

        // Same platform account re-imported under a renamed handle
        store
            .seed_account(MonitoredAccount {
                external_id: "1".to_string(),
                handle: "kid1_new".to_string(),
                access_token: "U".to_string(),
            })
            .unwrap();

        assert!(store.account_by_handle("kid1").is_none());
        let account = store.account_by_handle("kid1_new").unwrap();
        assert_eq!(account.access_token, "U");
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let store = MemoryStore::new();
        let parent = Parent {
            id: Uuid::new_v4(),
            username: "pat".to_string(),
            email: "pat@example.com".to_string(),
            display_name: None,
            password_hash: "x".to_string(),
            created_at: Utc::now(),
        };
        store.insert_parent(parent.clone()).unwrap();

        let dup = Parent {
            id: Uuid::new_v4(),
            ..parent
        };
        assert!(store.insert_parent(dup).is_err());
    }

    #[test]
    fn test_toxic_comments_scoped_to_parent() {
        let store = MemoryStore::new();
        let parent_p = Uuid::new_v4();
        let parent_q = Uuid::new_v4();
        let child_p = child(parent_p, "kid1");
        let child_q = child(parent_q, "kid2");
        store.upsert_child(child_p.clone()).unwrap();
        store.upsert_child(child_q.clone()).unwrap();
        store.insert_comment(comment(child_p.id, "c1", Label::Toxic)).unwrap();
        store.insert_comment(comment(child_p.id, "c2", Label::Positive)).unwrap();
        store.insert_comment(comment(child_q.id, "c3", Label::Toxic)).unwrap();

        let toxic = store.toxic_comments_of_parent(&parent_p);
        assert_eq!(toxic.len(), 1);
        assert_eq!(toxic[0].comment_id, "c1");
    }

    #[test]
    fn test_update_label() {
        let store = MemoryStore::new();
        let child_row = child(Uuid::new_v4(), "kid1");
        store.upsert_child(child_row.clone()).unwrap();
        store.insert_comment(comment(child_row.id, "c1", Label::Neutral)).unwrap();

        assert!(store.update_label(&child_row.id, "c1", Label::Toxic).unwrap());
        assert_eq!(store.comments_of(&child_row.id)[0].label, Label::Toxic);

        assert!(!store.update_label(&child_row.id, "missing", Label::Toxic).unwrap());
    }

    #[test]
    fn test_journal_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.jsonl");
        let parent_id = Uuid::new_v4();
        let child_id;

        {
            let store = MemoryStore::open(&path).unwrap();
            store
                .seed_account(MonitoredAccount {
                    external_id: "1".to_string(),
                    handle: "kid1".to_string(),
                    access_token: "T".to_string(),
                })
                .unwrap();
            let child_row = child(parent_id, "kid1");
            child_id = child_row.id;
            store.upsert_child(child_row).unwrap();
            store.insert_comment(comment(child_id, "c1", Label::Toxic)).unwrap();
        }

        let reopened = MemoryStore::open(&path).unwrap();
        assert!(reopened.account_by_handle("kid1").is_some());
        assert!(reopened.comment_exists(&child_id, "c1"));
        assert_eq!(reopened.comments_of(&child_id)[0].label, Label::Toxic);
    }

    #[test]
    fn test_compaction_drops_superseded_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.jsonl");
        let child_row = child(Uuid::new_v4(), "kid1");

        let store = MemoryStore::open(&path).unwrap();
        store.upsert_child(child_row.clone()).unwrap();
        store.insert_comment(comment(child_row.id, "c1", Label::Neutral)).unwrap();
        for _ in 0..10 {
            store.update_label(&child_row.id, "c1", Label::Toxic).unwrap();
            store.update_label(&child_row.id, "c1", Label::Neutral).unwrap();
        }
        assert!(Journal::replay(&path).unwrap().len() > 20);

        store.compact().unwrap();

        // Snapshot keeps one event per live row, not the update history
        assert_eq!(Journal::replay(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_compaction_preserves_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.jsonl");
        let child_row = child(Uuid::new_v4(), "kid1");

        let store = MemoryStore::open(&path).unwrap();
        store.upsert_child(child_row.clone()).unwrap();
        store.insert_comment(comment(child_row.id, "c1", Label::Neutral)).unwrap();
        store.update_label(&child_row.id, "c1", Label::Toxic).unwrap();
        store.compact().unwrap();
        drop(store);

        let reopened = MemoryStore::open(&path).unwrap();
        assert_eq!(reopened.comments_of(&child_row.id)[0].label, Label::Toxic);
    }
}
