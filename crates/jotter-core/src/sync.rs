//! Live note list for the signed-in identity.

use std::sync::Arc;

use crate::models::{sort_by_recency, Note, NoteId};
use crate::store::{DocumentStore, StoreError, StoreResult, Subscription};

/// Owner's notes, most recently updated first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteList {
    notes: Vec<Note>,
}

impl NoteList {
    /// Rebuild the list from a full snapshot batch.
    #[must_use]
    pub fn from_snapshot(mut notes: Vec<Note>) -> Self {
        sort_by_recency(&mut notes);
        Self { notes }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Note] {
        &self.notes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Note> {
        self.notes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&Note> {
        self.notes.first()
    }

    #[must_use]
    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }
}

impl<'a> IntoIterator for &'a NoteList {
    type Item = &'a Note;
    type IntoIter = std::slice::Iter<'a, Note>;

    fn into_iter(self) -> Self::IntoIter {
        self.notes.iter()
    }
}

/// What a live subscription produced.
#[derive(Debug)]
pub enum SyncEvent {
    Snapshot(NoteList),
    Failed(StoreError),
}

/// Keeps at most one owner-scoped subscription open.
pub struct NoteSynchronizer {
    store: Arc<dyn DocumentStore>,
    subscription: Option<Subscription>,
}

impl NoteSynchronizer {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            subscription: None,
        }
    }

    /// Identity the open subscription is scoped to.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        self.subscription.as_ref().map(Subscription::owner)
    }

    /// Subscribe to `uid`'s notes, tearing down any other subscription first.
    ///
    /// Returns `false` when already subscribed to `uid`.
    pub fn attach(&mut self, uid: &str) -> StoreResult<bool> {
        if self.owner() == Some(uid) {
            return Ok(false);
        }
        self.detach();
        self.subscription = Some(self.store.subscribe_owned(uid)?);
        tracing::info!("Subscribed to notes for {}", uid);
        Ok(true)
    }

    pub fn detach(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            tracing::info!("Unsubscribed from notes for {}", subscription.owner());
        }
    }

    /// Wait for the next batch. `None` when nothing is attached or the query
    /// has ended.
    pub async fn next_event(&mut self) -> Option<SyncEvent> {
        let batch = self.subscription.as_mut()?.next_batch().await?;
        Some(match batch {
            Ok(notes) => {
                tracing::debug!("Received snapshot with {} notes", notes.len());
                SyncEvent::Snapshot(NoteList::from_snapshot(notes))
            }
            Err(error) => {
                tracing::warn!("Note subscription failed: {}", error);
                SyncEvent::Failed(error)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::NoteWrite;
    use crate::store::MemoryStore;

    fn note(id: &str, updated_at: Option<i64>) -> Note {
        Note {
            id: id.parse().unwrap(),
            title: id.to_string(),
            content: String::new(),
            uid: "u1".to_string(),
            created_at: None,
            updated_at,
        }
    }

    fn ids(list: &NoteList) -> Vec<&str> {
        list.iter().map(|note| note.id.as_str()).collect()
    }

    #[test]
    fn from_snapshot_sorts_by_updated_at_descending() {
        let list = NoteList::from_snapshot(vec![
            note("old", Some(1)),
            note("pending", None),
            note("new", Some(9)),
        ]);
        assert_eq!(ids(&list), vec!["new", "old", "pending"]);
        assert!(list
            .as_slice()
            .windows(2)
            .all(|pair| pair[0].recency() >= pair[1].recency()));
    }

    #[tokio::test]
    async fn attach_streams_owner_snapshots() {
        let store = MemoryStore::new();
        let mut sync = NoteSynchronizer::new(Arc::new(store.clone()));

        assert!(sync.attach("u1").unwrap());
        let Some(SyncEvent::Snapshot(first)) = sync.next_event().await else {
            panic!("expected initial snapshot");
        };
        assert!(first.is_empty());

        store.insert(&NoteWrite::new("A", "", "u1")).await.unwrap();
        let Some(SyncEvent::Snapshot(second)) = sync.next_event().await else {
            panic!("expected snapshot after insert");
        };
        assert_eq!(second.len(), 1);
    }

    #[tokio::test]
    async fn attach_same_owner_is_noop_and_switch_replaces() {
        let store = MemoryStore::new();
        let mut sync = NoteSynchronizer::new(Arc::new(store.clone()));

        assert!(sync.attach("u1").unwrap());
        assert!(!sync.attach("u1").unwrap());
        assert!(sync.attach("u2").unwrap());
        assert_eq!(sync.owner(), Some("u2"));

        sync.detach();
        assert_eq!(sync.owner(), None);
        assert!(sync.next_event().await.is_none());
    }

    #[tokio::test]
    async fn failures_are_reported_once() {
        let store = MemoryStore::new();
        let mut sync = NoteSynchronizer::new(Arc::new(store.clone()));
        sync.attach("u1").unwrap();
        sync.next_event().await.unwrap();

        store.fail_subscriptions_with("offline").unwrap();
        assert!(matches!(sync.next_event().await, Some(SyncEvent::Failed(_))));
        assert!(sync.next_event().await.is_none());
    }
}
