use crate::commands::common::{
    connect_backend, first_snapshot, format_note_lines, load_context, note_to_list_item,
    require_identity,
};
use crate::error::CliError;

pub async fn run_list(limit: usize, json: bool, profile: Option<&str>) -> Result<(), CliError> {
    let context = load_context(profile)?;
    let backend = connect_backend(&context).await?;
    let identity = require_identity(&backend)?;
    let notes = first_snapshot(backend.store.clone(), &identity.uid).await?;
    let notes = &notes.as_slice()[..limit.min(notes.len())];

    if json {
        let items = notes.iter().map(note_to_list_item).collect::<Vec<_>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if notes.is_empty() {
        println!("No notes yet.");
        return Ok(());
    }

    for line in format_note_lines(notes) {
        println!("{line}");
    }
    Ok(())
}
