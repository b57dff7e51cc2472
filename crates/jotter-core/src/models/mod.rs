//! Data models for Jotter

mod note;

pub use note::{
    format_timestamp, sort_by_recency, Note, NoteId, NoteWrite, DEFAULT_TITLE, PREVIEW_CHARS,
};
