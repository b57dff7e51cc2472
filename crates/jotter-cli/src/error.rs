use std::io;

use jotter_core::auth::AuthError;
use jotter_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] jotter_core::Error),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No note text provided")]
    EmptyContent,
    #[error("Note ID cannot be empty")]
    EmptyNoteId,
    #[error("Note not found for id/prefix: {0}")]
    NoteNotFound(String),
    #[error("{0}")]
    AmbiguousNoteId(String),
    #[error("Save failed: {0}")]
    SaveFailed(String),
    #[error("{0}")]
    AuthFailed(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("{0}")]
    Viewer(&'static str),
    #[error("Not signed in. Run `jotter auth login --email <email> --password <password>`.")]
    NotSignedIn,
    #[error("Note subscription ended before any notes arrived")]
    SubscriptionClosed,
    #[error(
        "Firebase is not configured. Run `jotter config init`, or set JOTTER_FIREBASE_API_KEY and JOTTER_FIREBASE_PROJECT_ID."
    )]
    NotConfigured,
    #[error("Failed to open browser: {0}")]
    Browser(String),
}
