//! In-process identity provider for tests and offline sessions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;

use super::{
    AuthError, AuthErrorCode, AuthResult, Credentials, Identity, IdentityProvider, IdentityWatch,
};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    password: String,
}

/// Accounts live in memory and vanish with the provider.
#[derive(Clone)]
pub struct LocalIdentityProvider {
    accounts: Arc<Mutex<HashMap<String, Account>>>,
    identity_tx: Arc<watch::Sender<Option<Identity>>>,
}

impl Default for LocalIdentityProvider {
    fn default() -> Self {
        let (identity_tx, _) = watch::channel(None);
        Self {
            accounts: Arc::new(Mutex::new(HashMap::new())),
            identity_tx: Arc::new(identity_tx),
        }
    }
}

impl LocalIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn publish(&self, identity: Option<Identity>) {
        self.identity_tx.send_if_modified(|current| {
            if *current == identity {
                false
            } else {
                current.clone_from(&identity);
                true
            }
        });
    }

    fn accounts(&self) -> AuthResult<std::sync::MutexGuard<'_, HashMap<String, Account>>> {
        self.accounts
            .lock()
            .map_err(|error| AuthError::SecureStorage(error.to_string()))
    }
}

fn account_key(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_in(&self, credentials: &Credentials) -> AuthResult<Identity> {
        let identity = {
            let accounts = self.accounts()?;
            let account = accounts.get(&account_key(&credentials.email)).ok_or_else(|| {
                AuthError::api(
                    AuthErrorCode::UserNotFound,
                    "There is no account for this email",
                )
            })?;
            if account.password != credentials.password {
                return Err(AuthError::api(
                    AuthErrorCode::InvalidCredentials,
                    "Invalid email or password",
                ));
            }
            Identity {
                uid: account.uid.clone(),
                email: Some(credentials.email.clone()),
            }
        };

        self.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_up(&self, credentials: &Credentials) -> AuthResult<Identity> {
        if credentials.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::api(
                AuthErrorCode::WeakPassword,
                "Password should be at least 6 characters",
            ));
        }

        let identity = {
            let mut accounts = self.accounts()?;
            let key = account_key(&credentials.email);
            if accounts.contains_key(&key) {
                return Err(AuthError::api(
                    AuthErrorCode::EmailAlreadyInUse,
                    "The email address is already in use",
                ));
            }
            let uid = Uuid::now_v7().simple().to_string();
            accounts.insert(
                key,
                Account {
                    uid: uid.clone(),
                    password: credentials.password.clone(),
                },
            );
            Identity {
                uid,
                email: Some(credentials.email.clone()),
            }
        };

        self.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.publish(None);
        Ok(())
    }

    fn current_identity(&self) -> Option<Identity> {
        self.identity_tx.borrow().clone()
    }

    fn subscribe(&self) -> IdentityWatch {
        self.identity_tx.subscribe()
    }
}
