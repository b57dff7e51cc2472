//! Read-only note viewer reached through a share link.

use url::Url;

use crate::markup::sanitize_markup;
use crate::models::{Note, NoteId};
use crate::store::DocumentStore;

pub const NOTE_PARAM: &str = "note";
pub const MODE_PARAM: &str = "mode";
pub const READ_MODE: &str = "read";

/// A `?note=<id>&mode=read` location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRoute {
    note: String,
}

impl ReadRoute {
    /// `None` unless the URL asks for read mode with a non-empty note id.
    #[must_use]
    pub fn from_url(url: &Url) -> Option<Self> {
        let mut note = None;
        let mut read_mode = false;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                NOTE_PARAM if note.is_none() => note = Some(value.into_owned()),
                MODE_PARAM if !read_mode => read_mode = value == READ_MODE,
                _ => {}
            }
        }
        let note = note.filter(|note| !note.is_empty())?;
        read_mode.then_some(Self { note })
    }

    /// Parse `raw` as a URL first, then check it for read mode.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Url::parse(raw.trim()).ok().as_ref().and_then(Self::from_url)
    }

    /// Route for a bare note id. `None` when the id is blank.
    #[must_use]
    pub fn for_note(id: &str) -> Option<Self> {
        let note = id.trim();
        (!note.is_empty()).then(|| Self {
            note: note.to_string(),
        })
    }

    /// The requested id exactly as it appeared in the URL.
    #[must_use]
    pub fn requested_id(&self) -> &str {
        &self.note
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerState {
    Loading,
    NotFound,
    Failed,
    Loaded(Note),
}

impl ViewerState {
    /// Text shown in place of the note, if any.
    #[must_use]
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Loading => Some("Loading note..."),
            Self::NotFound => Some("Note not found"),
            Self::Failed => Some("Unable to load note"),
            Self::Loaded(_) => None,
        }
    }

    #[must_use]
    pub fn note(&self) -> Option<&Note> {
        match self {
            Self::Loaded(note) => Some(note),
            _ => None,
        }
    }
}

/// Fetch the note a read route points at. Does not require sign-in.
pub async fn load_note_view(store: &dyn DocumentStore, route: &ReadRoute) -> ViewerState {
    // Ids that cannot name a document cannot exist.
    let Ok(id) = route.requested_id().parse::<NoteId>() else {
        return ViewerState::NotFound;
    };
    match store.get(&id).await {
        Ok(Some(note)) => ViewerState::Loaded(note),
        Ok(None) => ViewerState::NotFound,
        Err(error) => {
            tracing::warn!("Failed to load shared note {}: {}", id, error);
            ViewerState::Failed
        }
    }
}

/// Sanitized markup for a viewed note's heading and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNote {
    pub title: String,
    pub body: String,
}

impl RenderedNote {
    #[must_use]
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: sanitize_markup(note.display_title()),
            body: sanitize_markup(&note.content),
        }
    }
}

/// The same location with the query and fragment removed.
#[must_use]
pub fn workspace_url(location: &Url) -> Url {
    let mut url = location.clone();
    url.set_query(None);
    url.set_fragment(None);
    url
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::NoteWrite;
    use crate::store::MemoryStore;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn read_route_requires_note_and_read_mode() {
        let route = ReadRoute::from_url(&url("https://notes.example.com/app?note=abc&mode=read"));
        assert_eq!(route.map(|r| r.requested_id().to_string()), Some("abc".to_string()));

        assert!(ReadRoute::from_url(&url("https://x.test/?note=abc")).is_none());
        assert!(ReadRoute::from_url(&url("https://x.test/?note=abc&mode=edit")).is_none());
        assert!(ReadRoute::from_url(&url("https://x.test/?note=&mode=read")).is_none());
        assert!(ReadRoute::from_url(&url("https://x.test/?mode=read")).is_none());
    }

    #[test]
    fn read_route_parse_rejects_non_urls() {
        assert!(ReadRoute::parse("abc").is_none());
        assert!(ReadRoute::parse(" https://x.test/?mode=read&note=n1 ").is_some());
    }

    #[test]
    fn bare_id_route_trims_and_rejects_blank() {
        assert_eq!(
            ReadRoute::for_note(" n1 ").map(|route| route.requested_id().to_string()),
            Some("n1".to_string())
        );
        assert!(ReadRoute::for_note("  ").is_none());
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = MemoryStore::new();
        let route = ReadRoute::parse("https://x.test/?note=missing&mode=read").unwrap();
        let state = load_note_view(&store, &route).await;
        assert_eq!(state, ViewerState::NotFound);
        assert_eq!(state.message(), Some("Note not found"));
        assert!(state.note().is_none());
    }

    #[tokio::test]
    async fn deleted_note_is_not_found() {
        let store = MemoryStore::new();
        let id = store
            .insert(&NoteWrite::new("Gone soon", "body", "u1"))
            .await
            .unwrap();
        let route = ReadRoute::for_note(id.as_str()).unwrap();
        assert!(matches!(load_note_view(&store, &route).await, ViewerState::Loaded(_)));

        assert!(store.remove(&id).unwrap().is_some());
        assert_eq!(load_note_view(&store, &route).await, ViewerState::NotFound);
    }

    #[tokio::test]
    async fn reserved_id_is_not_found() {
        let store = MemoryStore::new();
        let route = ReadRoute::parse("https://x.test/?note=..&mode=read").unwrap();
        assert_eq!(load_note_view(&store, &route).await, ViewerState::NotFound);
    }

    #[tokio::test]
    async fn unusable_id_is_not_found() {
        let store = MemoryStore::new();
        let route = ReadRoute::parse("https://x.test/?note=a%2Fb&mode=read").unwrap();
        assert_eq!(load_note_view(&store, &route).await, ViewerState::NotFound);
    }

    #[tokio::test]
    async fn read_failure_is_generic() {
        let store = MemoryStore::new();
        store.fail_reads_with("unavailable").unwrap();
        let route = ReadRoute::parse("https://x.test/?note=n1&mode=read").unwrap();
        let state = load_note_view(&store, &route).await;
        assert_eq!(state.message(), Some("Unable to load note"));
    }

    #[tokio::test]
    async fn existing_note_loads_without_identity() {
        let store = MemoryStore::new();
        let id = store
            .insert(&NoteWrite::new("<b>Groceries</b>", "Milk<script>x()</script>", "u1"))
            .await
            .unwrap();
        let route = ReadRoute::parse(&format!("https://x.test/?note={id}&mode=read")).unwrap();

        let state = load_note_view(&store, &route).await;
        let note = state.note().unwrap();
        let rendered = RenderedNote::from_note(note);
        assert_eq!(rendered.title, "<b>Groceries</b>");
        assert_eq!(rendered.body, "Milk");
    }

    #[test]
    fn workspace_url_drops_query() {
        let back = workspace_url(&url("https://x.test/app/?note=n1&mode=read#top"));
        assert_eq!(back.as_str(), "https://x.test/app/");
    }
}
