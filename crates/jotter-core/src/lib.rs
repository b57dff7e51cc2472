//! jotter-core - Core library for Jotter
//!
//! This crate contains the shared models, markup helpers, client state machines,
//! and backend clients used by all Jotter interfaces (desktop, CLI).

pub mod auth;
pub mod config;
pub mod editor;
pub mod error;
pub mod format;
pub mod markup;
pub mod models;
pub mod services;
pub mod session;
pub mod share;
pub mod store;
pub mod sync;
pub mod util;
pub mod viewer;
pub mod workspace;

pub use error::{Error, Result};
pub use models::{Note, NoteId};
