//! Editor draft, selection policy and explicit save flow.
//!
//! Nothing is saved implicitly. A save is split into three steps so UI
//! code can run the store call on its own executor:
//!
//! 1. [`Editor::begin_save`] validates and snapshots the draft.
//! 2. [`execute_save`] performs the store write.
//! 3. [`Editor::finish_save`] applies the result.

use crate::markup::has_meaningful_text;
use crate::models::{Note, NoteId, NoteWrite};
use crate::store::{DocumentStore, StoreResult};
use crate::sync::NoteList;

/// Which note the editor is showing, and why.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    /// Nothing chosen yet; the first listed note may be picked automatically.
    #[default]
    Empty,
    /// Picked automatically from the top of the list.
    Auto(NoteId),
    /// Picked by the user, or just created by a save.
    User(NoteId),
    /// A blank draft the user asked for. Suppresses auto-selection.
    NewDraft,
}

impl Selection {
    #[must_use]
    pub fn note_id(&self) -> Option<&NoteId> {
        match self {
            Self::Auto(id) | Self::User(id) => Some(id),
            Self::Empty | Self::NewDraft => None,
        }
    }

    #[must_use]
    pub const fn allows_auto_select(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Title and body markup being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub note_id: Option<NoteId>,
    pub title: String,
    pub content: String,
}

impl Draft {
    #[must_use]
    pub fn from_note(note: &Note) -> Self {
        Self {
            note_id: Some(note.id.clone()),
            title: note.title.clone(),
            content: note.content.clone(),
        }
    }

    /// Neither field has visible text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        !has_meaningful_text(&self.title) && !has_meaningful_text(&self.content)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Updated,
    Created,
    Failed(String),
}

impl SaveStatus {
    /// Status line shown next to the save button.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Saving => Some("Saving..."),
            Self::Updated => Some("Note updated"),
            Self::Created => Some("Draft saved"),
            Self::Failed(message) => Some(message.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    /// Merge into an existing note.
    Update(NoteId),
    /// Insert a new note.
    Create,
}

/// Snapshot of a draft ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    generation: u64,
    pub target: SaveTarget,
    pub write: NoteWrite,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Updated(NoteId),
    Created(NoteId),
}

impl SaveOutcome {
    #[must_use]
    pub fn note_id(&self) -> &NoteId {
        match self {
            Self::Updated(id) | Self::Created(id) => id,
        }
    }
}

/// Result of [`execute_save`], tagged with the draft it was taken from.
#[derive(Debug)]
pub struct SaveCompletion {
    generation: u64,
    pub result: StoreResult<SaveOutcome>,
}

/// Perform the write described by `request`.
pub async fn execute_save(store: &dyn DocumentStore, request: SaveRequest) -> SaveCompletion {
    let result = match request.target {
        SaveTarget::Update(id) => store
            .merge(&id, &request.write)
            .await
            .map(|()| SaveOutcome::Updated(id)),
        SaveTarget::Create => store.insert(&request.write).await.map(SaveOutcome::Created),
    };
    match &result {
        Ok(outcome) => tracing::info!("Saved note {}", outcome.note_id()),
        Err(error) => tracing::warn!("Failed to save note: {}", error),
    }
    SaveCompletion {
        generation: request.generation,
        result,
    }
}

#[derive(Debug, Clone, Default)]
pub struct Editor {
    selection: Selection,
    draft: Draft,
    status: SaveStatus,
    // Bumped whenever the draft is replaced; stale save completions are dropped.
    generation: u64,
}

impl Editor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    #[must_use]
    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.status == SaveStatus::Saving
    }

    /// Identity present, some visible text, and no save in flight.
    #[must_use]
    pub fn can_save(&self, signed_in: bool) -> bool {
        signed_in && !self.draft.is_blank() && !self.is_saving()
    }

    #[must_use]
    pub fn primary_action_label(&self) -> &'static str {
        if self.is_saving() {
            "Saving"
        } else if self.draft.note_id.is_some() {
            "Update"
        } else {
            "Save draft"
        }
    }

    pub fn set_title(&mut self, markup: impl Into<String>) {
        self.draft.title = markup.into();
    }

    pub fn set_content(&mut self, markup: impl Into<String>) {
        self.draft.content = markup.into();
    }

    /// Load `note` as the user's explicit choice.
    pub fn select(&mut self, note: &Note) {
        self.replace_draft(Selection::User(note.id.clone()), Draft::from_note(note));
    }

    /// Start a blank draft and stop auto-selecting.
    pub fn new_draft(&mut self) {
        self.replace_draft(Selection::NewDraft, Draft::default());
    }

    /// Drop everything, e.g. on sign-out.
    pub fn reset(&mut self) {
        self.replace_draft(Selection::Empty, Draft::default());
    }

    /// Pick the most recent note when nothing has been chosen yet.
    ///
    /// Returns `true` when a note was selected.
    pub fn auto_select(&mut self, notes: &NoteList) -> bool {
        if !self.selection.allows_auto_select() {
            return false;
        }
        let Some(first) = notes.first() else {
            return false;
        };
        self.replace_draft(Selection::Auto(first.id.clone()), Draft::from_note(first));
        true
    }

    fn replace_draft(&mut self, selection: Selection, draft: Draft) {
        self.selection = selection;
        self.draft = draft;
        self.status = SaveStatus::Idle;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Snapshot the draft for writing as `uid`.
    ///
    /// `None` when saving is not allowed right now.
    pub fn begin_save(&mut self, uid: Option<&str>) -> Option<SaveRequest> {
        let uid = uid?;
        if !self.can_save(true) {
            return None;
        }

        let target = self
            .draft
            .note_id
            .clone()
            .map_or(SaveTarget::Create, SaveTarget::Update);
        self.status = SaveStatus::Saving;
        Some(SaveRequest {
            generation: self.generation,
            target,
            write: NoteWrite::new(&self.draft.title, &self.draft.content, uid),
        })
    }

    /// Apply a finished save. Returns `false` when the draft it belonged to
    /// has since been replaced.
    pub fn finish_save(&mut self, completion: SaveCompletion) -> bool {
        if completion.generation != self.generation {
            tracing::debug!("Ignoring save completion for a replaced draft");
            return false;
        }

        self.status = match completion.result {
            Ok(SaveOutcome::Updated(_)) => SaveStatus::Updated,
            Ok(SaveOutcome::Created(id)) => {
                self.draft.note_id = Some(id.clone());
                self.selection = Selection::User(id);
                SaveStatus::Created
            }
            Err(error) => SaveStatus::Failed(error.to_string()),
        };
        true
    }
}
