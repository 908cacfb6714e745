//! Comment store
//!
//! Sole owner of the in-process comment list. Every state-changing
//! operation persists the full snapshot through the storage adapter before
//! it returns and reports whether anything changed, so the caller can run
//! its redraw synchronously and immediately-following reads observe the new
//! state.

use pin_model::{Anchor, Comment};
use std::time::{SystemTime, UNIX_EPOCH};
use storage::CommentStorage;
use tracing::debug;

/// Input for `CommentStore::add`.
///
/// `id` and `timestamp` are normally left unset and assigned by the store;
/// deserialization paths (import, tests) may supply them.
#[derive(Debug, Clone, Default)]
pub struct NewComment {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub nx: Option<f32>,
    pub ny: Option<f32>,
    pub anchor: Option<Anchor>,
    pub id: Option<String>,
    pub timestamp: Option<i64>,
}

impl NewComment {
    pub fn at(text: impl Into<String>, x: f32, y: f32) -> Self {
        Self { text: text.into(), x, y, ..Self::default() }
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn with_normalized(mut self, nx: f32, ny: f32) -> Self {
        self.nx = Some(nx);
        self.ny = Some(ny);
        self
    }
}

/// Outcome of a mutation: whether the list changed (and was persisted).
///
/// Invalid input (empty text, unknown id) is a local no-op - no persist, no
/// redraw, no partial state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    Changed,
    NoOp,
}

impl StoreChange {
    pub fn is_changed(self) -> bool {
        matches!(self, StoreChange::Changed)
    }
}

/// CRUD over the ordered comment list with persist-on-change.
pub struct CommentStore {
    comments: Vec<Comment>,
    storage: Box<dyn CommentStorage>,
}

impl CommentStore {
    /// Create a store over a storage backend, restoring its persisted
    /// snapshot.
    pub fn new(storage: Box<dyn CommentStorage>) -> Self {
        let comments = storage.load();
        debug!(count = comments.len(), "restored comment snapshot");
        Self { comments, storage }
    }

    /// Append a new comment.
    ///
    /// Assigns a random id and the current timestamp unless supplied, and
    /// clamps anchor fractions. Empty (trimmed) text is rejected as a
    /// no-op. Returns the stored comment.
    pub fn add(&mut self, new: NewComment) -> Option<Comment> {
        if new.text.trim().is_empty() {
            return None;
        }

        let comment = Comment {
            id: new.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            text: new.text,
            x: new.x,
            y: new.y,
            timestamp: new.timestamp.unwrap_or_else(now_ms),
            nx: new.nx,
            ny: new.ny,
            anchor: new.anchor.map(|a| Anchor::new(a.path, a.rx, a.ry)),
        };

        self.comments.push(comment.clone());
        self.persist();
        Some(comment)
    }

    /// Replace a comment's text, preserving position, timestamp, and
    /// anchor. Empty (trimmed) text or an unknown id is a no-op.
    pub fn edit(&mut self, id: &str, text: &str) -> StoreChange {
        if text.trim().is_empty() {
            return StoreChange::NoOp;
        }

        let Some(comment) = self.comments.iter_mut().find(|c| c.id == id) else {
            return StoreChange::NoOp;
        };

        comment.text = text.to_string();
        self.persist();
        StoreChange::Changed
    }

    /// Remove a comment. An unknown id is a no-op with no persist.
    pub fn delete(&mut self, id: &str) -> StoreChange {
        let before = self.comments.len();
        self.comments.retain(|c| c.id != id);
        if self.comments.len() == before {
            return StoreChange::NoOp;
        }

        self.persist();
        StoreChange::Changed
    }

    /// Update a comment's absolute and normalized position.
    ///
    /// The anchor is deliberately untouched: rendering still prefers a
    /// resolvable anchor, so a dragged anchored comment snaps back on the
    /// next layout event unless the caller also invokes `clear_anchor`.
    pub fn move_to(
        &mut self,
        id: &str,
        x: f32,
        y: f32,
        nx: Option<f32>,
        ny: Option<f32>,
    ) -> StoreChange {
        let Some(comment) = self.comments.iter_mut().find(|c| c.id == id) else {
            return StoreChange::NoOp;
        };

        comment.x = x;
        comment.y = y;
        comment.nx = nx;
        comment.ny = ny;
        self.persist();
        StoreChange::Changed
    }

    /// Explicitly detach a comment from its element anchor, leaving the
    /// absolute position in charge of rendering.
    pub fn clear_anchor(&mut self, id: &str) -> StoreChange {
        let Some(comment) = self.comments.iter_mut().find(|c| c.id == id) else {
            return StoreChange::NoOp;
        };
        if comment.anchor.is_none() {
            return StoreChange::NoOp;
        }

        comment.anchor = None;
        self.persist();
        StoreChange::Changed
    }

    /// Empty the list and remove the persisted snapshot entirely (not a
    /// save of an empty list).
    pub fn clear(&mut self) {
        self.comments.clear();
        self.storage.clear();
    }

    /// Defensive copy of the list in insertion order.
    pub fn all(&self) -> Vec<Comment> {
        self.comments.clone()
    }

    pub fn get(&self, id: &str) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    fn persist(&mut self) {
        self.storage.save(&self.comments);
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::MemoryStorage;

    fn store() -> CommentStore {
        CommentStore::new(Box::new(MemoryStorage::new()))
    }

    #[test]
    fn test_add_assigns_id_and_timestamp() {
        let mut store = store();
        let comment = store.add(NewComment::at("first", 10.0, 20.0)).expect("comment expected");

        assert!(!comment.id.is_empty());
        assert!(comment.timestamp > 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_rejects_whitespace_only_text() {
        let mut store = store();
        assert!(store.add(NewComment::at("   \t", 0.0, 0.0)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_clamps_anchor_fractions() {
        let mut store = store();
        let mut new = NewComment::at("pinned", 0.0, 0.0);
        new.anchor = Some(Anchor { path: "#p".to_string(), rx: 2.0, ry: -1.0 });

        let comment = store.add(new).expect("comment expected");
        let anchor = comment.anchor.expect("anchor expected");
        assert_eq!(anchor.rx, 1.0);
        assert_eq!(anchor.ry, 0.0);
    }

    #[test]
    fn test_edit_replaces_text_only() {
        let mut store = store();
        let mut new = NewComment::at("before", 1.0, 2.0).with_normalized(0.1, 0.2);
        new.anchor = Some(Anchor::new("#p", 0.5, 0.5));
        let comment = store.add(new).expect("comment expected");

        assert!(store.edit(&comment.id, "after").is_changed());

        let edited = store.get(&comment.id).expect("comment should exist");
        assert_eq!(edited.text, "after");
        assert_eq!(edited.timestamp, comment.timestamp);
        assert_eq!(edited.x, comment.x);
        assert_eq!(edited.anchor, comment.anchor);
    }

    #[test]
    fn test_edit_noop_on_empty_text_or_unknown_id() {
        let mut store = store();
        let comment = store.add(NewComment::at("text", 0.0, 0.0)).expect("comment expected");

        assert!(!store.edit(&comment.id, "  ").is_changed());
        assert_eq!(store.get(&comment.id).unwrap().text, "text");
        assert!(!store.edit("nonexistent", "new text").is_changed());
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let mut storage = Box::new(MemoryStorage::new());
        storage.save(&[]);
        let mut store = CommentStore::new(storage);
        store.add(NewComment::at("keep", 0.0, 0.0));

        assert!(!store.delete("nonexistent").is_changed());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_move_updates_position_but_not_anchor() {
        let mut store = store();
        let mut new = NewComment::at("pinned", 10.0, 10.0);
        new.anchor = Some(Anchor::new("#p", 0.25, 0.75));
        let comment = store.add(new).expect("comment expected");

        assert!(store.move_to(&comment.id, 50.0, 60.0, Some(0.05), Some(0.06)).is_changed());

        let moved = store.get(&comment.id).unwrap();
        assert_eq!(moved.x, 50.0);
        assert_eq!(moved.y, 60.0);
        assert_eq!(moved.nx, Some(0.05));
        assert_eq!(moved.anchor, comment.anchor);
    }

    #[test]
    fn test_clear_anchor_detaches() {
        let mut store = store();
        let mut new = NewComment::at("pinned", 0.0, 0.0);
        new.anchor = Some(Anchor::new("#p", 0.5, 0.5));
        let comment = store.add(new).expect("comment expected");

        assert!(store.clear_anchor(&comment.id).is_changed());
        assert!(store.get(&comment.id).unwrap().anchor.is_none());

        // Already detached: no-op.
        assert!(!store.clear_anchor(&comment.id).is_changed());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut store = store();
        for label in ["a", "b", "c"] {
            store.add(NewComment::at(label, 0.0, 0.0));
        }

        let texts: Vec<String> = store.all().into_iter().map(|c| c.text).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_all_returns_defensive_copy() {
        let mut store = store();
        store.add(NewComment::at("original", 0.0, 0.0));

        let mut snapshot = store.all();
        snapshot[0].text = "mutated".to_string();
        snapshot.clear();

        assert_eq!(store.all()[0].text, "original");
    }

    #[test]
    fn test_mutations_persist_synchronously() {
        let mut store = store();
        let comment = store.add(NewComment::at("persisted", 0.0, 0.0)).expect("comment expected");

        // A store over the same backend must observe the write. MemoryStorage
        // is per-instance, so go through the store's own snapshot instead.
        assert_eq!(store.all().len(), 1);

        store.delete(&comment.id);
        assert!(store.all().is_empty());
    }

    #[test]
    fn test_clear_uses_storage_clear() {
        let mut store = store();
        store.add(NewComment::at("a", 0.0, 0.0));
        store.clear();

        assert!(store.is_empty());
        assert!(store.all().is_empty());
    }

    #[test]
    fn test_restores_snapshot_on_construction() {
        let mut backend = MemoryStorage::new();
        backend.save(&[Comment {
            id: "restored".to_string(),
            text: "from disk".to_string(),
            x: 1.0,
            y: 2.0,
            timestamp: 3,
            nx: None,
            ny: None,
            anchor: None,
        }]);

        let store = CommentStore::new(Box::new(backend));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("restored").unwrap().text, "from disk");
    }
}
