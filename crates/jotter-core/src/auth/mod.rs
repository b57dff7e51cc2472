//! Identity provider abstraction and shared auth types.

mod firebase;
mod local;

use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

use crate::util::unix_timestamp_now;

pub use firebase::{normalize_api_key, FirebaseAuthClient};
pub use local::LocalIdentityProvider;

const EXPIRY_SKEW_SECONDS: i64 = 60;

/// The authenticated user as seen by the rest of the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
}

impl Identity {
    /// Label shown in headers and status output.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.uid)
    }
}

/// Tokens issued by the identity provider for one signed-in identity.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub identity: Identity,
}

impl AuthSession {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= unix_timestamp_now() + EXPIRY_SKEW_SECONDS
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("id_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("identity", &self.identity)
            .finish()
    }
}

/// Coded provider failures the client knows how to explain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    UserNotFound,
    EmailAlreadyInUse,
    InvalidCredentials,
    WeakPassword,
    TooManyAttempts,
    Other,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Firebase auth is not configured for this build.")]
    NotConfigured,
    #[error("Invalid auth configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("Enter email and password")]
    MissingCredentials,
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{message}")]
    Api {
        code: AuthErrorCode,
        message: String,
    },
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
}

impl AuthError {
    pub(crate) fn api(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
        }
    }

    /// The provider failure code, when the provider reported one.
    #[must_use]
    pub const fn code(&self) -> Option<AuthErrorCode> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Which auth form action produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

/// Map an auth failure to the text shown under the auth form.
///
/// Only "account not found" on sign-in and "account exists" on sign-up get
/// guidance; everything else is shown as reported.
#[must_use]
pub fn describe_auth_error(mode: AuthMode, error: &AuthError) -> String {
    match (mode, error.code()) {
        (AuthMode::SignIn, Some(AuthErrorCode::UserNotFound)) => {
            "No account found. Use Sign up.".to_string()
        }
        (AuthMode::SignUp, Some(AuthErrorCode::EmailAlreadyInUse)) => {
            "Email already in use. Try Sign in.".to_string()
        }
        _ => error.to_string(),
    }
}

/// Validated email/password pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Reject blank input before any provider call.
    pub fn new(email: &str, password: &str) -> AuthResult<Self> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        Ok(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Receiver side of identity-change notifications. Dropping it unsubscribes.
pub type IdentityWatch = watch::Receiver<Option<Identity>>;

/// External authentication provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, credentials: &Credentials) -> AuthResult<Identity>;

    async fn sign_up(&self, credentials: &Credentials) -> AuthResult<Identity>;

    async fn sign_out(&self) -> AuthResult<()>;

    fn current_identity(&self) -> Option<Identity>;

    /// Observe identity changes. The receiver starts at the current identity.
    fn subscribe(&self) -> IdentityWatch;
}

/// Bearer tokens for authenticated store requests.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    /// A valid token for the signed-in identity, refreshed when needed.
    async fn access_token(&self) -> AuthResult<Option<String>>;
}

/// Where provider sessions survive restarts.
pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load_session(&self) -> AuthResult<Option<AuthSession>>;
    fn save_session(&self, session: &AuthSession) -> AuthResult<()>;
    fn clear_session(&self) -> AuthResult<()>;
}

/// Process-local session persistence. Nothing outlives the process.
#[derive(Debug, Clone, Default)]
pub struct EphemeralSessionStore {
    slot: Arc<Mutex<Option<AuthSession>>>,
}

impl SessionPersistence for EphemeralSessionStore {
    fn load_session(&self) -> AuthResult<Option<AuthSession>> {
        let guard = self
            .slot
            .lock()
            .map_err(|error| AuthError::SecureStorage(error.to_string()))?;
        Ok(guard.clone())
    }

    fn save_session(&self, session: &AuthSession) -> AuthResult<()> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|error| AuthError::SecureStorage(error.to_string()))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn clear_session(&self) -> AuthResult<()> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|error| AuthError::SecureStorage(error.to_string()))?;
        *guard = None;
        Ok(())
    }
}
