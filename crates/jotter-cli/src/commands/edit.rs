use jotter_core::editor::Editor;

use crate::commands::common::{
    capture_editor_input_with_initial, connect_backend, first_snapshot, load_context,
    require_identity, resolve_note, save_editor, text_to_markup,
};
use crate::error::CliError;

pub async fn run_edit(
    id: &str,
    title: Option<String>,
    content: Option<String>,
    profile: Option<&str>,
) -> Result<(), CliError> {
    let context = load_context(profile)?;
    let backend = connect_backend(&context).await?;
    let identity = require_identity(&backend)?;
    let notes = first_snapshot(backend.store.clone(), &identity.uid).await?;
    let note = resolve_note(&notes, id)?;

    let mut editor = Editor::new();
    editor.select(&note);

    if title.is_none() && content.is_none() {
        // Without flags the body markup is edited as-is.
        let Some(updated) = capture_editor_input_with_initial(&note.content, "html")? else {
            return Err(CliError::EmptyContent);
        };
        if updated == note.content.trim() {
            println!("No changes made.");
            return Ok(());
        }
        editor.set_content(updated);
    } else {
        if let Some(title) = title {
            editor.set_title(text_to_markup(&title));
        }
        if let Some(content) = content {
            editor.set_content(text_to_markup(&content));
        }
    }

    let note_id = save_editor(&mut editor, backend.store.as_ref(), &identity).await?;
    if let Some(message) = editor.status().message() {
        println!("{message}: {note_id}");
    }
    Ok(())
}
