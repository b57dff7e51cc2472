use std::env;
use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use jotter_core::auth::Identity;
use jotter_core::config::{resolve_firebase_config, ClientConfig};
use jotter_core::editor::{execute_save, Editor, SaveStatus};
use jotter_core::markup::{escape_text, strip_html};
use jotter_core::services::Backend;
use jotter_core::store::DocumentStore;
use jotter_core::sync::{NoteList, NoteSynchronizer, SyncEvent};
use jotter_core::{Note, NoteId};
use serde::Serialize;

use crate::auth::SessionStore;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

/// Resolved profile name plus the effective client configuration.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub profile_name: String,
    pub config: ClientConfig,
}

/// Environment values win over the stored profile.
pub fn load_context(profile: Option<&str>) -> Result<CommandContext, CliError> {
    let profiles = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = profiles.resolve_profile_name(profile);
    let stored = profiles
        .profile(&profile_name)
        .map(|profile| profile.client_config())
        .unwrap_or_default();
    let config = ClientConfig::from_env()?.or(stored);
    Ok(CommandContext {
        profile_name,
        config,
    })
}

pub async fn connect_backend(context: &CommandContext) -> Result<Backend, CliError> {
    let settings = resolve_firebase_config(&context.config)?.ok_or(CliError::NotConfigured)?;
    Ok(Backend::connect(&settings, SessionStore::new(&context.profile_name)).await?)
}

pub fn require_identity(backend: &Backend) -> Result<Identity, CliError> {
    backend
        .auth
        .current_identity()
        .ok_or(CliError::NotSignedIn)
}

/// The first live snapshot of `uid`'s notes, already sorted.
pub async fn first_snapshot(
    store: Arc<dyn DocumentStore>,
    uid: &str,
) -> Result<NoteList, CliError> {
    let mut synchronizer = NoteSynchronizer::new(store);
    synchronizer.attach(uid)?;
    match synchronizer.next_event().await {
        Some(SyncEvent::Snapshot(notes)) => Ok(notes),
        Some(SyncEvent::Failed(error)) => Err(error.into()),
        None => Err(CliError::SubscriptionClosed),
    }
}

/// Find a note by exact id, then by unique id prefix.
pub fn resolve_note(notes: &NoteList, note_query: &str) -> Result<Note, CliError> {
    let note_query = normalize_note_identifier(note_query)?;
    if let Some(note) = note_query
        .parse::<NoteId>()
        .ok()
        .and_then(|id| notes.get(&id))
    {
        return Ok(note.clone());
    }

    let mut matching = notes
        .iter()
        .filter(|note| note.id.as_str().starts_with(&note_query));
    match (matching.next(), matching.next()) {
        (None, _) => Err(CliError::NoteNotFound(note_query)),
        (Some(note), None) => Ok(note.clone()),
        (Some(first), Some(second)) => {
            let candidates = [first, second]
                .into_iter()
                .chain(matching.take(1))
                .map(|note| short_id(&note.id))
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousNoteId(format!(
                "Note id prefix '{note_query}' is ambiguous: {candidates}"
            )))
        }
    }
}

/// Run a prepared editor through one save and report the result.
pub async fn save_editor(
    editor: &mut Editor,
    store: &dyn DocumentStore,
    identity: &Identity,
) -> Result<NoteId, CliError> {
    let request = editor
        .begin_save(Some(&identity.uid))
        .ok_or(CliError::EmptyContent)?;
    let completion = execute_save(store, request).await;
    editor.finish_save(completion);

    match editor.status() {
        SaveStatus::Failed(message) => Err(CliError::SaveFailed(message.clone())),
        _ => editor
            .draft()
            .note_id
            .clone()
            .ok_or_else(|| CliError::SaveFailed("note id missing after save".to_string())),
    }
}

/// One row of `jotter list`, also its JSON shape.
#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub relative_time: String,
}

impl NoteListItem {
    fn new(note: &Note, now_ms: i64) -> Self {
        Self {
            id: note.id.to_string(),
            title: note.list_title(),
            preview: note.preview(),
            created_at: note.created_at,
            updated_at: note.updated_at,
            relative_time: format_relative_time(note.updated_at, now_ms),
        }
    }

    fn line(&self) -> String {
        let id = self.id.chars().take(SHORT_ID_LEN).collect::<String>();
        format!(
            "{id:<width$}  {title:<30}  {preview:<40}  {when}",
            width = SHORT_ID_LEN,
            title = truncate_chars(&self.title, 30),
            preview = truncate_chars(&self.preview, 40),
            when = self.relative_time,
        )
    }
}

const SHORT_ID_LEN: usize = 13;

pub fn short_id(id: &NoteId) -> String {
    id.as_str().chars().take(SHORT_ID_LEN).collect()
}

pub fn format_note_lines(notes: &[Note]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    notes
        .iter()
        .map(|note| NoteListItem::new(note, now_ms).line())
        .collect()
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    NoteListItem::new(note, Utc::now().timestamp_millis())
}

/// Keep at most `max_chars` characters, ending in "..." when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.char_indices().nth(max_chars).is_none() {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let end = text.char_indices().nth(keep).map_or(text.len(), |(index, _)| index);
    format!("{}...", &text[..end])
}

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Largest unit first.
const AGE_UNITS: [(i64, &str); 6] = [
    (365 * DAY_MS, "y"),
    (30 * DAY_MS, "mo"),
    (7 * DAY_MS, "w"),
    (DAY_MS, "d"),
    (HOUR_MS, "h"),
    (MINUTE_MS, "m"),
];

/// Timestamps not yet resolved by the store show as "pending".
pub fn format_relative_time(timestamp_ms: Option<i64>, now_ms: i64) -> String {
    let Some(timestamp_ms) = timestamp_ms else {
        return "pending".to_string();
    };
    let elapsed = now_ms.saturating_sub(timestamp_ms);
    AGE_UNITS
        .iter()
        .find(|(span, _)| elapsed >= *span)
        .map_or_else(
            || "just now".to_string(),
            |(span, unit)| format!("{}{unit} ago", elapsed / span),
        )
}

/// Escape plain text into markup, one `<br>` per line break.
pub fn text_to_markup(text: &str) -> String {
    text.trim()
        .lines()
        .map(escape_text)
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Plain text for terminal output, keeping line and block breaks.
pub fn markup_to_text(markup: &str) -> String {
    let mut broken = markup.to_string();
    for boundary in ["<br>", "<br/>", "<br />", "<div>", "<p>", "<li>"] {
        broken = broken.replace(boundary, "\n");
    }

    let mut lines = Vec::new();
    for line in broken.lines().map(strip_html) {
        if line.is_empty() && lines.last().is_none_or(String::is_empty) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines.join("\n")
}

/// Split editor text into a title (first line) and body (the rest).
pub fn split_title_body(text: &str) -> (String, String) {
    let text = text.trim();
    match text.split_once('\n') {
        Some((title, body)) => (title.trim().to_string(), body.trim().to_string()),
        None => (text.to_string(), String::new()),
    }
}

/// Trimmed text, `None` when nothing is left.
pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn normalize_note_identifier(id: &str) -> Result<String, CliError> {
    normalize_content(id).ok_or(CliError::EmptyNoteId)
}

/// Text piped on stdin. `None` for an interactive terminal or blank input.
pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }
    Ok(normalize_content(&io::read_to_string(stdin)?))
}

/// Open `initial` in the user's editor and return what was saved.
pub fn capture_editor_input_with_initial(
    initial: &str,
    extension: &str,
) -> Result<Option<String>, CliError> {
    let scratch = ScratchFile::create(extension, initial)?;
    run_editor(&preferred_editor(), scratch.path())?;
    Ok(normalize_content(&fs::read_to_string(scratch.path())?))
}

/// Run an editor command line (for example `code --wait`) on `path`.
pub fn run_editor(editor: &str, path: &Path) -> Result<(), CliError> {
    let mut words = editor.split_whitespace();
    let program = words
        .next()
        .ok_or_else(|| CliError::EditorFailed("EDITOR is empty".to_string()))?;
    let status = Command::new(program).args(words).arg(path).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(CliError::EditorFailed(format!(
            "`{editor}` exited with {status}"
        )))
    }
}

/// `$VISUAL`, then `$EDITOR`, then the platform default.
pub fn preferred_editor() -> String {
    ["VISUAL", "EDITOR"]
        .into_iter()
        .find_map(|name| env::var(name).ok().and_then(|value| normalize_content(&value)))
        .unwrap_or_else(|| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

/// Temporary note file, removed on drop.
struct ScratchFile(PathBuf);

impl ScratchFile {
    fn create(extension: &str, contents: &str) -> io::Result<Self> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.subsec_nanos());
        let path = env::temp_dir().join(format!(
            "jotter-note-{}-{nanos}.{extension}",
            std::process::id()
        ));
        fs::write(&path, contents)?;
        Ok(Self(path))
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}
