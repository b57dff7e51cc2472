use jotter_core::editor::Editor;

use crate::commands::common::{
    capture_editor_input_with_initial, connect_backend, load_context, read_piped_stdin,
    require_identity, save_editor, split_title_body, text_to_markup,
};
use crate::error::CliError;

/// Title and body from flags, piped stdin, or `$EDITOR` (first line is the title).
pub fn resolve_new_note_text(
    title: Option<String>,
    content: Option<String>,
) -> Result<(String, String), CliError> {
    if title.is_some() || content.is_some() {
        return Ok((title.unwrap_or_default(), content.unwrap_or_default()));
    }

    if let Some(text) = read_piped_stdin()? {
        return Ok(split_title_body(&text));
    }

    if let Some(text) = capture_editor_input_with_initial("", "txt")? {
        return Ok(split_title_body(&text));
    }

    Err(CliError::EmptyContent)
}

pub async fn run_new(
    title: Option<String>,
    content: Option<String>,
    profile: Option<&str>,
) -> Result<(), CliError> {
    let (title, content) = resolve_new_note_text(title, content)?;

    let context = load_context(profile)?;
    let backend = connect_backend(&context).await?;
    let identity = require_identity(&backend)?;

    let mut editor = Editor::new();
    editor.new_draft();
    editor.set_title(text_to_markup(&title));
    editor.set_content(text_to_markup(&content));

    let note_id = save_editor(&mut editor, backend.store.as_ref(), &identity).await?;
    if let Some(message) = editor.status().message() {
        println!("{message}: {note_id}");
    }
    Ok(())
}
