//! Store trait: the persistence seam for the ingestion pipeline

use sentiguard_core::{Comment, Label, LinkedChild, MonitoredAccount, Parent, Result};
use uuid::Uuid;

/// Key-value/document style persistence interface.
///
/// Ownership chain: comments belong to one linked child, children belong to
/// one parent, monitored accounts are a shared pool referenced by children.
pub trait Store: Send + Sync {
    // -- monitored account pool --

    /// Seed or rotate one pool credential (keyed by handle)
    fn seed_account(&self, account: MonitoredAccount) -> Result<()>;

    fn account_by_handle(&self, handle: &str) -> Option<MonitoredAccount>;

    // -- parents --

    /// Insert a parent; fails if the username is taken
    fn insert_parent(&self, parent: Parent) -> Result<()>;

    fn parent_by_username(&self, username: &str) -> Option<Parent>;

    fn parent_by_id(&self, id: &Uuid) -> Option<Parent>;

    // -- linked children --

    /// Insert or replace a child row (keyed by id)
    fn upsert_child(&self, child: LinkedChild) -> Result<()>;

    fn child(&self, id: &Uuid) -> Option<LinkedChild>;

    /// The unique child for (parent, handle), if subscribed
    fn child_by_handle(&self, parent_id: &Uuid, handle: &str) -> Option<LinkedChild>;

    fn children_of(&self, parent_id: &Uuid) -> Vec<LinkedChild>;

    /// Every subscription across all parents (scheduled sweeps)
    fn all_children(&self) -> Vec<LinkedChild>;

    /// Delete a child and cascade-delete only that child's comments.
    /// Returns false when no such child exists.
    fn delete_child(&self, id: &Uuid) -> Result<bool>;

    // -- comments --

    /// Dedup check, scoped to one child
    fn comment_exists(&self, child_id: &Uuid, comment_id: &str) -> bool;

    /// Store a comment unless (comment_id, child_id) already exists.
    /// Returns false on duplicate skip.
    fn insert_comment(&self, comment: Comment) -> Result<bool>;

    fn comments_of(&self, child_id: &Uuid) -> Vec<Comment>;

    /// Every stored comment (bulk reclassification)
    fn all_comments(&self) -> Vec<Comment>;

    /// Toxic comments across all of one parent's children
    fn toxic_comments_of_parent(&self, parent_id: &Uuid) -> Vec<Comment>;

    /// Rewrite one comment's label. Returns false when the comment is absent.
    fn update_label(&self, child_id: &Uuid, comment_id: &str, label: Label) -> Result<bool>;

    // -- maintenance --

    /// Rewrite persistent state as a snapshot, dropping superseded history.
    /// No-op for stores without durable history.
    fn compact(&self) -> Result<()> {
        Ok(())
    }
}
