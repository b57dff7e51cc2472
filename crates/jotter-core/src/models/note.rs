//! Note model

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::markup::{has_meaningful_text, plain_preview, strip_html};

/// Title persisted when the draft title has no visible text.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Number of characters shown in note list previews.
pub const PREVIEW_CHARS: usize = 80;

/// Opaque note identifier assigned by the document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Generate a fresh identifier for stores that assign ids client-side.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    /// Borrow the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NoteId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("Note ID cannot be empty".to_string()));
        }
        if trimmed.contains('/') {
            return Err(Error::InvalidInput(format!(
                "Note ID must not contain '/': {trimmed}"
            )));
        }
        // Firestore reserves these document ids.
        let reserved = matches!(trimmed, "." | "..")
            || (trimmed.len() > 4 && trimmed.starts_with("__") && trimmed.ends_with("__"));
        if reserved {
            return Err(Error::InvalidInput(format!(
                "Note ID is reserved: {trimmed}"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// A note as stored in the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Store-assigned identifier
    pub id: NoteId,
    /// Title markup
    #[serde(default)]
    pub title: String,
    /// Body markup
    #[serde(default)]
    pub content: String,
    /// Owner identity
    pub uid: String,
    /// Creation timestamp (Unix ms), absent until the store resolves it
    #[serde(default)]
    pub created_at: Option<i64>,
    /// Last update timestamp (Unix ms), absent until the store resolves it
    #[serde(default)]
    pub updated_at: Option<i64>,
}

impl Note {
    /// Sort key for list ordering. Missing timestamps count as zero.
    #[must_use]
    pub fn recency(&self) -> i64 {
        self.updated_at.unwrap_or(0)
    }

    /// Title shown in note lists: stripped title text, or "Untitled".
    #[must_use]
    pub fn list_title(&self) -> String {
        let stripped = strip_html(&self.title);
        if stripped.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            stripped
        }
    }

    /// Plain-text body preview, empty when the body has no visible text.
    #[must_use]
    pub fn preview(&self) -> String {
        plain_preview(&self.content, PREVIEW_CHARS)
    }

    /// Title markup for full rendering, falling back to "Untitled" when empty.
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            DEFAULT_TITLE
        } else {
            &self.title
        }
    }
}

/// Fields written on every save. The store stamps `updatedAt` (and
/// `createdAt` on insert) with its own clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteWrite {
    pub title: String,
    pub content: String,
    pub uid: String,
}

impl NoteWrite {
    /// Build a write payload from draft markup, defaulting an empty title.
    #[must_use]
    pub fn new(title: &str, content: &str, uid: impl Into<String>) -> Self {
        let title = if has_meaningful_text(title) {
            title.to_string()
        } else {
            DEFAULT_TITLE.to_string()
        };
        Self {
            title,
            content: content.to_string(),
            uid: uid.into(),
        }
    }
}

/// Sort notes by `updated_at` descending. Missing timestamps sort last and
/// ties keep their incoming order.
pub fn sort_by_recency(notes: &mut [Note]) {
    notes.sort_by_key(|note| Reverse(note.recency()));
}

/// Human-readable label for a note timestamp in the local timezone.
#[must_use]
pub fn format_timestamp(timestamp_ms: Option<i64>) -> String {
    format_timestamp_in(timestamp_ms, &Local)
}

pub(crate) fn format_timestamp_in<Tz>(timestamp_ms: Option<i64>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let Some(moment) = timestamp_ms.and_then(DateTime::<Utc>::from_timestamp_millis) else {
        return "Just now".to_string();
    };
    moment
        .with_timezone(tz)
        .format("%b %-d, %I:%M %p")
        .to_string()
}
