//! Signed-in workspace: session, live note list, editor and share notice.
//!
//! `Workspace` is plain state driven by the front-end's event loop. It
//! never performs I/O itself; store calls go through [`NoteSynchronizer`]
//! and [`execute_save`](crate::editor::execute_save).

use url::Url;

use crate::auth::Identity;
use crate::editor::{Editor, SaveCompletion, SaveRequest};
use crate::format::FormatTarget;
use crate::models::{Note, NoteId};
use crate::session::{Session, SessionChange};
use crate::share::{share_url, ShareNotice};
use crate::store::StoreResult;
use crate::sync::{NoteList, NoteSynchronizer, SyncEvent};

#[derive(Debug, Clone, Default)]
pub struct Workspace {
    session: Session,
    notes: NoteList,
    notes_loading: bool,
    editor: Editor,
    format: FormatTarget,
    share_notice: Option<ShareNotice>,
}

impl Workspace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn notes(&self) -> &NoteList {
        &self.notes
    }

    #[must_use]
    pub fn notes_loading(&self) -> bool {
        self.notes_loading
    }

    #[must_use]
    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    #[must_use]
    pub fn format_target(&self) -> &FormatTarget {
        &self.format
    }

    pub fn format_target_mut(&mut self) -> &mut FormatTarget {
        &mut self.format
    }

    #[must_use]
    pub fn share_notice(&self) -> Option<&ShareNotice> {
        self.share_notice.as_ref()
    }

    /// Apply an identity notification from the provider.
    ///
    /// Signing out or switching accounts drops every piece of note state.
    pub fn identity_changed(&mut self, identity: Option<Identity>) -> SessionChange {
        let change = self.session.replace(identity);
        if change.clears_notes() {
            self.notes = NoteList::default();
            self.notes_loading = false;
            self.editor.reset();
            self.share_notice = None;
        }
        change
    }

    /// Apply an identity notification and point `sync` at the new owner.
    pub fn follow_identity(
        &mut self,
        sync: &mut NoteSynchronizer,
        identity: Option<Identity>,
    ) -> StoreResult<SessionChange> {
        let change = self.identity_changed(identity);
        match self.session.uid() {
            Some(uid) => {
                if sync.attach(uid)? {
                    self.notes_loading = true;
                }
            }
            None => sync.detach(),
        }
        Ok(change)
    }

    /// Apply a subscription event. Returns `true` when the editor picked a
    /// note automatically.
    pub fn apply_sync_event(&mut self, event: SyncEvent) -> bool {
        self.notes_loading = false;
        match event {
            SyncEvent::Snapshot(notes) => {
                self.notes = notes;
                self.editor.auto_select(&self.notes)
            }
            // Keep the last known list.
            SyncEvent::Failed(_) => false,
        }
    }

    /// Note currently loaded in the editor, if it is in the list.
    #[must_use]
    pub fn active_note(&self) -> Option<&Note> {
        let id = self.editor.draft().note_id.as_ref()?;
        self.notes.get(id)
    }

    #[must_use]
    pub fn active_note_id(&self) -> Option<&NoteId> {
        self.editor.draft().note_id.as_ref()
    }

    /// Load a listed note. Returns `false` for ids not in the list.
    pub fn select_note(&mut self, id: &NoteId) -> bool {
        let Some(note) = self.notes.get(id) else {
            return false;
        };
        let note = note.clone();
        self.editor.select(&note);
        true
    }

    pub fn new_draft(&mut self) {
        self.editor.new_draft();
    }

    pub fn set_title(&mut self, markup: impl Into<String>) {
        self.editor.set_title(markup);
    }

    pub fn set_content(&mut self, markup: impl Into<String>) {
        self.editor.set_content(markup);
    }

    #[must_use]
    pub fn can_save(&self) -> bool {
        self.editor.can_save(self.session.is_signed_in())
    }

    pub fn begin_save(&mut self) -> Option<SaveRequest> {
        self.editor.begin_save(self.session.uid())
    }

    pub fn finish_save(&mut self, completion: SaveCompletion) -> bool {
        self.editor.finish_save(completion)
    }

    /// Share link for the active note relative to `location`.
    #[must_use]
    pub fn share_url(&self, location: &Url) -> Option<Url> {
        share_url(location, self.active_note_id())
    }

    pub fn show_share_notice(&mut self, notice: Option<ShareNotice>) {
        if notice.is_some() {
            self.share_notice = notice;
        }
    }

    /// Clear `notice` if it is still the one on display.
    pub fn expire_share_notice(&mut self, notice: &ShareNotice) {
        if self.share_notice.as_ref() == Some(notice) {
            self.share_notice = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::auth::{Credentials, IdentityProvider, LocalIdentityProvider};
    use crate::editor::{execute_save, Selection};
    use crate::models::NoteWrite;
    use crate::share::{copy_share_link, Clipboard};
    use crate::store::{DocumentStore, MemoryStore};
    use crate::viewer::{load_note_view, ReadRoute, ViewerState};

    struct Harness {
        auth: LocalIdentityProvider,
        store: MemoryStore,
        sync: NoteSynchronizer,
        workspace: Workspace,
    }

    impl Harness {
        fn new() -> Self {
            let store = MemoryStore::new();
            Self {
                auth: LocalIdentityProvider::new(),
                sync: NoteSynchronizer::new(Arc::new(store.clone())),
                store,
                workspace: Workspace::new(),
            }
        }

        async fn sign_up(&mut self, email: &str) -> Identity {
            let credentials = Credentials::new(email, "secret1").unwrap();
            let identity = self.auth.sign_up(&credentials).await.unwrap();
            self.follow_provider();
            identity
        }

        async fn sign_out(&mut self) {
            self.auth.sign_out().await.unwrap();
            self.follow_provider();
        }

        fn follow_provider(&mut self) {
            let identity = self.auth.current_identity();
            self.workspace
                .follow_identity(&mut self.sync, identity)
                .unwrap();
        }

        async fn pump(&mut self) {
            let event = self.sync.next_event().await.unwrap();
            self.workspace.apply_sync_event(event);
        }

        async fn save(&mut self) {
            let request = self.workspace.begin_save().unwrap();
            let completion = execute_save(&self.store, request).await;
            self.workspace.finish_save(completion);
        }
    }

    struct NoClipboard;

    #[async_trait::async_trait(?Send)]
    impl Clipboard for NoClipboard {
        async fn write_text(&self, _text: &str) -> Result<(), String> {
            panic!("clipboard must not be written");
        }
    }

    #[tokio::test]
    async fn first_save_shows_up_first_in_list() {
        let mut harness = Harness::new();
        harness.sign_up("a@example.com").await;
        assert!(harness.workspace.notes_loading());

        harness.pump().await;
        assert!(!harness.workspace.notes_loading());
        assert!(harness.workspace.notes().is_empty());
        assert!(!harness.workspace.can_save());

        harness.workspace.set_title("Groceries");
        harness.workspace.set_content("Milk");
        assert!(harness.workspace.can_save());
        harness.save().await;
        assert_eq!(
            harness.workspace.editor().status().message(),
            Some("Draft saved")
        );

        harness.pump().await;
        let notes = harness.workspace.notes();
        assert_eq!(notes.len(), 1);
        let first = notes.first().unwrap();
        assert_eq!(first.list_title(), "Groceries");
        assert_eq!(first.preview(), "Milk");
        assert_eq!(harness.workspace.active_note().map(|n| &n.id), Some(&first.id));
        assert_eq!(harness.workspace.editor().primary_action_label(), "Update");
    }

    #[tokio::test]
    async fn sign_out_clears_everything() {
        let mut harness = Harness::new();
        let identity = harness.sign_up("a@example.com").await;
        harness.pump().await;
        harness
            .store
            .insert(&NoteWrite::new("Old", "text", identity.uid.clone()))
            .await
            .unwrap();
        harness.pump().await;
        assert_eq!(harness.workspace.notes().len(), 1);
        assert!(matches!(
            harness.workspace.editor().selection(),
            Selection::Auto(_)
        ));

        harness.sign_out().await;
        let workspace = &harness.workspace;
        assert!(workspace.notes().is_empty());
        assert_eq!(workspace.editor().selection(), &Selection::Empty);
        assert_eq!(workspace.editor().draft().title, "");
        assert_eq!(workspace.editor().draft().content, "");
        assert!(!workspace.can_save());
        assert_eq!(harness.sync.owner(), None);
    }

    #[tokio::test]
    async fn new_draft_is_not_replaced_by_snapshots() {
        let mut harness = Harness::new();
        let identity = harness.sign_up("a@example.com").await;
        harness.pump().await;

        harness.workspace.new_draft();
        harness
            .store
            .insert(&NoteWrite::new("Other device", "", identity.uid.clone()))
            .await
            .unwrap();
        harness.pump().await;

        assert_eq!(harness.workspace.notes().len(), 1);
        assert_eq!(harness.workspace.editor().selection(), &Selection::NewDraft);
        assert_eq!(harness.workspace.editor().primary_action_label(), "Save draft");
    }

    #[tokio::test]
    async fn list_is_sorted_and_scoped_to_owner() {
        let mut harness = Harness::new();
        let identity = harness.sign_up("a@example.com").await;
        harness.pump().await;

        for (id, updated_at, uid) in [
            ("n1", Some(10), identity.uid.as_str()),
            ("n2", None, identity.uid.as_str()),
            ("n3", Some(30), identity.uid.as_str()),
            ("n4", Some(99), "someone-else"),
        ] {
            harness
                .store
                .seed(Note {
                    id: id.parse().unwrap(),
                    title: id.to_string(),
                    content: String::new(),
                    uid: uid.to_string(),
                    created_at: updated_at,
                    updated_at,
                })
                .unwrap();
        }
        // Seeds may coalesce into fewer batches.
        while harness.workspace.notes().len() < 3 {
            harness.pump().await;
        }

        let ids: Vec<_> = harness
            .workspace
            .notes()
            .iter()
            .map(|note| note.id.as_str())
            .collect();
        assert_eq!(ids, vec!["n3", "n1", "n2"]);
    }

    #[tokio::test]
    async fn select_then_save_merges_into_same_note() {
        let mut harness = Harness::new();
        let identity = harness.sign_up("a@example.com").await;
        harness.pump().await;
        let id = harness
            .store
            .insert(&NoteWrite::new("Plan", "v1", identity.uid.clone()))
            .await
            .unwrap();
        harness.pump().await;

        harness.workspace.new_draft();
        assert!(harness.workspace.select_note(&id));
        assert_eq!(
            harness.workspace.editor().selection(),
            &Selection::User(id.clone())
        );
        harness.workspace.set_content("v2");
        harness.save().await;

        assert_eq!(
            harness.workspace.editor().status().message(),
            Some("Note updated")
        );
        assert_eq!(harness.store.len().unwrap(), 1);
        let stored = harness.store.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.content, "v2");
        assert!(!harness.workspace.select_note(&"missing".parse().unwrap()));
    }

    #[tokio::test]
    async fn switching_accounts_resubscribes() {
        let mut harness = Harness::new();
        harness.sign_up("a@example.com").await;
        harness.pump().await;
        harness.workspace.set_title("Unsaved");

        let second = harness.sign_up("b@example.com").await;
        assert_eq!(harness.sync.owner(), Some(second.uid.as_str()));
        assert_eq!(harness.workspace.editor().draft().title, "");
        assert!(harness.workspace.notes_loading());
    }

    #[tokio::test]
    async fn subscription_failure_keeps_last_list() {
        let mut harness = Harness::new();
        let identity = harness.sign_up("a@example.com").await;
        harness.pump().await;
        harness
            .store
            .insert(&NoteWrite::new("Kept", "", identity.uid.clone()))
            .await
            .unwrap();
        harness.pump().await;

        harness.store.fail_subscriptions_with("offline").unwrap();
        harness.pump().await;
        assert!(!harness.workspace.notes_loading());
        assert_eq!(harness.workspace.notes().len(), 1);
    }

    #[tokio::test]
    async fn viewer_with_unknown_id_shows_not_found() {
        let store = MemoryStore::new();
        let route = ReadRoute::parse("https://notes.example.com/?note=nope&mode=read").unwrap();
        let state = load_note_view(&store as &dyn DocumentStore, &route).await;
        assert_eq!(state, ViewerState::NotFound);
    }

    #[tokio::test]
    async fn copy_without_active_note_does_not_touch_clipboard() {
        let mut harness = Harness::new();
        harness.sign_up("a@example.com").await;
        harness.pump().await;

        let location = Url::parse("https://notes.example.com/").unwrap();
        let link = harness.workspace.share_url(&location);
        assert!(link.is_none());
        let notice = copy_share_link(&NoClipboard, link.as_ref()).await;
        harness.workspace.show_share_notice(notice);
        assert!(harness.workspace.share_notice().is_none());
    }

    #[test]
    fn share_notice_expiry_only_clears_matching_notice() {
        let mut workspace = Workspace::new();
        let first = ShareNotice {
            message: "Share link copied".to_string(),
            copied: true,
        };
        let second = ShareNotice {
            message: "Copy failed".to_string(),
            copied: false,
        };
        workspace.show_share_notice(Some(first.clone()));
        workspace.show_share_notice(Some(second.clone()));
        workspace.expire_share_notice(&first);
        assert_eq!(workspace.share_notice(), Some(&second));
        workspace.expire_share_notice(&second);
        assert!(workspace.share_notice().is_none());
    }
}
