//! Backend handles shared by every client.

use std::sync::Arc;

use crate::auth::{
    AccessTokenSource, FirebaseAuthClient, IdentityProvider, LocalIdentityProvider,
    SessionPersistence,
};
use crate::config::FirebaseSettings;
use crate::store::{DocumentStore, FirestoreStore, MemoryStore};
use crate::Result;

/// Explicitly constructed identity provider and document store.
#[derive(Clone)]
pub struct Backend {
    pub auth: Arc<dyn IdentityProvider>,
    pub store: Arc<dyn DocumentStore>,
}

impl Backend {
    #[must_use]
    pub fn new(auth: Arc<dyn IdentityProvider>, store: Arc<dyn DocumentStore>) -> Self {
        Self { auth, store }
    }

    /// Local accounts and an in-process store. Nothing is persisted.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(LocalIdentityProvider::new()),
            Arc::new(MemoryStore::new()),
        )
    }

    /// Firebase Auth and Firestore for one project.
    ///
    /// A session persisted in `sessions` is restored (and refreshed when
    /// expired) before this returns.
    pub async fn connect<S: SessionPersistence>(
        settings: &FirebaseSettings,
        sessions: S,
    ) -> Result<Self> {
        let auth = Arc::new(FirebaseAuthClient::new(&settings.api_key, sessions)?);
        if let Some(identity) = auth.restore_session().await? {
            tracing::info!("Restored session for {}", identity.display_label());
        }

        let tokens: Arc<dyn AccessTokenSource> = auth.clone();
        let store = FirestoreStore::new(&settings.project_id, &settings.database, &settings.api_key)?
            .with_collection(settings.collection.clone())
            .with_poll_interval(settings.poll_interval)
            .with_token_source(tokens);

        Ok(Self::new(auth, Arc::new(store)))
    }
}
