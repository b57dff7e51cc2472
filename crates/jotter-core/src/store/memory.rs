//! In-process document store with push-on-write subscriptions.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::watch;

use super::{DocumentStore, SnapshotBatch, StoreError, StoreResult, Subscription};
use crate::models::{Note, NoteId, NoteWrite};
use crate::util::unix_timestamp_millis_now;

#[derive(Debug, Default)]
struct Inner {
    docs: BTreeMap<NoteId, Note>,
    last_timestamp: i64,
    read_failure: Option<String>,
    write_failure: Option<String>,
    subscription_failure: Option<String>,
}

impl Inner {
    /// Server clock: wall time, forced strictly increasing.
    fn next_timestamp(&mut self) -> i64 {
        let timestamp = unix_timestamp_millis_now().max(self.last_timestamp + 1);
        self.last_timestamp = timestamp;
        timestamp
    }

    fn check_write(&self) -> StoreResult<()> {
        self.write_failure
            .as_ref()
            .map_or(Ok(()), |message| Err(StoreError::Api(message.clone())))
    }

    fn snapshot_for(&self, owner: &str) -> SnapshotBatch {
        if let Some(message) = &self.subscription_failure {
            return Err(StoreError::Api(message.clone()));
        }
        Ok(self
            .docs
            .values()
            .filter(|note| note.uid == owner)
            .cloned()
            .collect())
    }
}

/// Notes kept in memory. Clones share the same documents.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    revision: Arc<watch::Sender<u64>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            revision: Arc::new(revision),
        }
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|error| StoreError::Api(format!("store lock poisoned: {error}")))
    }

    fn bump_revision(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    /// Put a document in place as-is, timestamps included.
    pub fn seed(&self, note: Note) -> StoreResult<()> {
        self.lock()?.docs.insert(note.id.clone(), note);
        self.bump_revision();
        Ok(())
    }

    /// Delete a document, as another client would.
    pub fn remove(&self, id: &NoteId) -> StoreResult<Option<Note>> {
        let removed = self.lock()?.docs.remove(id);
        self.bump_revision();
        Ok(removed)
    }

    /// Number of stored documents across all owners.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.lock()?.docs.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Make subsequent writes fail with `message`.
    pub fn fail_writes_with(&self, message: impl Into<String>) -> StoreResult<()> {
        self.lock()?.write_failure = Some(message.into());
        Ok(())
    }

    /// Make subsequent point reads fail with `message`.
    pub fn fail_reads_with(&self, message: impl Into<String>) -> StoreResult<()> {
        self.lock()?.read_failure = Some(message.into());
        Ok(())
    }

    /// Make live queries report `message` on their next batch.
    pub fn fail_subscriptions_with(&self, message: impl Into<String>) -> StoreResult<()> {
        self.lock()?.subscription_failure = Some(message.into());
        self.bump_revision();
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn subscribe_owned(&self, uid: &str) -> StoreResult<Subscription> {
        let (tx, builder) = Subscription::channel(uid);
        let mut revision = self.revision.subscribe();
        let store = self.clone();
        let owner = uid.to_string();

        let task = tokio::spawn(async move {
            loop {
                revision.mark_unchanged();
                let batch = match store.lock() {
                    Ok(inner) => inner.snapshot_for(&owner),
                    Err(error) => Err(error),
                };
                let failed = batch.is_err();
                if tx.send(batch).await.is_err() || failed {
                    break;
                }
                if revision.changed().await.is_err() {
                    break;
                }
            }
        });

        Ok(builder.driven_by(task))
    }

    async fn get(&self, id: &NoteId) -> StoreResult<Option<Note>> {
        let inner = self.lock()?;
        if let Some(message) = &inner.read_failure {
            return Err(StoreError::Api(message.clone()));
        }
        Ok(inner.docs.get(id).cloned())
    }

    async fn insert(&self, write: &NoteWrite) -> StoreResult<NoteId> {
        let id = {
            let mut inner = self.lock()?;
            inner.check_write()?;
            let timestamp = inner.next_timestamp();
            let id = NoteId::generate();
            inner.docs.insert(
                id.clone(),
                Note {
                    id: id.clone(),
                    title: write.title.clone(),
                    content: write.content.clone(),
                    uid: write.uid.clone(),
                    created_at: Some(timestamp),
                    updated_at: Some(timestamp),
                },
            );
            id
        };
        self.bump_revision();
        Ok(id)
    }

    async fn merge(&self, id: &NoteId, write: &NoteWrite) -> StoreResult<()> {
        {
            let mut inner = self.lock()?;
            inner.check_write()?;
            let timestamp = inner.next_timestamp();
            let note = inner.docs.entry(id.clone()).or_insert_with(|| Note {
                id: id.clone(),
                title: String::new(),
                content: String::new(),
                uid: write.uid.clone(),
                created_at: None,
                updated_at: None,
            });
            note.title.clone_from(&write.title);
            note.content.clone_from(&write.content);
            note.uid.clone_from(&write.uid);
            note.updated_at = Some(timestamp);
        }
        self.bump_revision();
        Ok(())
    }
}
