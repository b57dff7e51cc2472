//! Document store abstraction: owner-scoped live queries, point reads and
//! merge writes.

mod firestore;
mod memory;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::auth::AuthError;
use crate::models::{Note, NoteId, NoteWrite};

pub use firestore::{
    FirestoreStore, DEFAULT_COLLECTION, DEFAULT_DATABASE, DEFAULT_POLL_INTERVAL,
};
pub use memory::MemoryStore;

/// Buffered snapshot batches per subscription.
const SUBSCRIPTION_BUFFER: usize = 16;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document store is not configured for this build.")]
    NotConfigured,
    #[error("Invalid store configuration: {0}")]
    InvalidConfiguration(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Api(String),
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One batch pushed by a live subscription: the full owner-filtered result set.
pub type SnapshotBatch = StoreResult<Vec<Note>>;

/// Hosted document database holding notes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Open a live query over notes owned by `uid`.
    ///
    /// Must be called inside a Tokio runtime; the subscription drives a
    /// background task that ends when the subscription is dropped.
    fn subscribe_owned(&self, uid: &str) -> StoreResult<Subscription>;

    /// Point read by identifier. `Ok(None)` when the document does not exist.
    async fn get(&self, id: &NoteId) -> StoreResult<Option<Note>>;

    /// Insert a new note, stamping both timestamps. Returns the assigned id.
    async fn insert(&self, write: &NoteWrite) -> StoreResult<NoteId>;

    /// Merge `write` into the document `id`, stamping `updatedAt` only.
    async fn merge(&self, id: &NoteId, write: &NoteWrite) -> StoreResult<()>;
}

/// Handle to a live query. Dropping it stops the query.
#[derive(Debug)]
pub struct Subscription {
    owner: String,
    updates: mpsc::Receiver<SnapshotBatch>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Channel pair for a store implementation to feed.
    pub(crate) fn channel(owner: &str) -> (mpsc::Sender<SnapshotBatch>, SubscriptionBuilder) {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        (
            tx,
            SubscriptionBuilder {
                owner: owner.to_string(),
                updates: rx,
            },
        )
    }

    /// Identity the query is scoped to.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Wait for the next batch. `None` once the query has ended.
    pub async fn next_batch(&mut self) -> Option<SnapshotBatch> {
        self.updates.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

pub(crate) struct SubscriptionBuilder {
    owner: String,
    updates: mpsc::Receiver<SnapshotBatch>,
}

impl SubscriptionBuilder {
    pub(crate) fn driven_by(self, task: JoinHandle<()>) -> Subscription {
        Subscription {
            owner: self.owner,
            updates: self.updates,
            task: Some(task),
        }
    }
}
