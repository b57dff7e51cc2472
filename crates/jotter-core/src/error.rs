//! Error types for jotter-core

use thiserror::Error;

use crate::auth::AuthError;
use crate::store::StoreError;

/// Result type alias using jotter-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in jotter-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Document store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Identity provider error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
