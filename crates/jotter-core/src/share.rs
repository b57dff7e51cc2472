//! Share links for the active note.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::models::NoteId;
use crate::viewer::{MODE_PARAM, NOTE_PARAM, READ_MODE};

/// How long a copy notice stays visible.
pub const SHARE_NOTICE_TTL: Duration = Duration::from_millis(2500);

/// Read-only link for `note` at `location`'s origin and path.
///
/// `None` when there is no active note.
#[must_use]
pub fn share_url(location: &Url, note: Option<&NoteId>) -> Option<Url> {
    let note = note?;
    let mut url = location.clone();
    url.set_fragment(None);
    url.query_pairs_mut()
        .clear()
        .append_pair(NOTE_PARAM, note.as_str())
        .append_pair(MODE_PARAM, READ_MODE);
    Some(url)
}

/// Host clipboard. Writes are best effort.
#[async_trait(?Send)]
pub trait Clipboard {
    async fn write_text(&self, text: &str) -> Result<(), String>;
}

/// Transient feedback after a copy attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareNotice {
    pub message: String,
    pub copied: bool,
}

impl ShareNotice {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        SHARE_NOTICE_TTL
    }
}

/// Copy `link` to the clipboard.
///
/// Without a link nothing is written and no notice is produced.
pub async fn copy_share_link<C: Clipboard + ?Sized>(
    clipboard: &C,
    link: Option<&Url>,
) -> Option<ShareNotice> {
    let link = link?;
    Some(match clipboard.write_text(link.as_str()).await {
        Ok(()) => ShareNotice {
            message: "Share link copied".to_string(),
            copied: true,
        },
        Err(error) => {
            tracing::warn!("Failed to copy share link: {}", error);
            let message = error.trim();
            ShareNotice {
                message: if message.is_empty() {
                    "Copy failed".to_string()
                } else {
                    message.to_string()
                },
                copied: false,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::viewer::ReadRoute;

    #[derive(Default)]
    struct FakeClipboard {
        writes: Mutex<Vec<String>>,
        failure: Option<String>,
    }

    #[async_trait(?Send)]
    impl Clipboard for FakeClipboard {
        async fn write_text(&self, text: &str) -> Result<(), String> {
            if let Some(failure) = &self.failure {
                return Err(failure.clone());
            }
            self.writes.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn location() -> Url {
        Url::parse("https://notes.example.com/app?note=old&mode=edit#x").unwrap()
    }

    #[test]
    fn share_url_replaces_query_with_read_route() {
        let id: NoteId = "n1".parse().unwrap();
        let url = share_url(&location(), Some(&id)).unwrap();
        assert_eq!(url.as_str(), "https://notes.example.com/app?note=n1&mode=read");

        let route = ReadRoute::from_url(&url).unwrap();
        assert_eq!(route.requested_id(), "n1");
    }

    #[test]
    fn share_url_requires_active_note() {
        assert_eq!(share_url(&location(), None), None);
    }

    #[tokio::test]
    async fn copy_without_link_writes_nothing() {
        let clipboard = FakeClipboard::default();
        assert_eq!(copy_share_link(&clipboard, None).await, None);
        assert!(clipboard.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn copy_reports_success() {
        let clipboard = FakeClipboard::default();
        let id: NoteId = "n1".parse().unwrap();
        let link = share_url(&location(), Some(&id));

        let notice = copy_share_link(&clipboard, link.as_ref()).await.unwrap();
        assert_eq!(notice.message, "Share link copied");
        assert!(notice.copied);
        assert_eq!(notice.ttl(), Duration::from_millis(2500));
        assert_eq!(clipboard.writes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn copy_failure_shows_clipboard_error() {
        let link = Url::parse("https://x.test/?note=n1&mode=read").unwrap();
        let clipboard = FakeClipboard {
            failure: Some("Clipboard unavailable".to_string()),
            ..Default::default()
        };
        let notice = copy_share_link(&clipboard, Some(&link)).await.unwrap();
        assert_eq!(notice.message, "Clipboard unavailable");
        assert!(!notice.copied);

        let silent = FakeClipboard {
            failure: Some(String::new()),
            ..Default::default()
        };
        let notice = copy_share_link(&silent, Some(&link)).await.unwrap();
        assert_eq!(notice.message, "Copy failed");
    }
}
