use jotter_core::viewer::{load_note_view, ReadRoute, RenderedNote, ViewerState};

use crate::commands::common::{connect_backend, load_context, markup_to_text};
use crate::error::CliError;

/// A share link (`?note=<id>&mode=read`) or a bare note id.
pub fn parse_show_target(target: &str) -> Result<ReadRoute, CliError> {
    if target.contains("://") {
        return ReadRoute::parse(target)
            .ok_or_else(|| CliError::NoteNotFound(target.trim().to_string()));
    }
    ReadRoute::for_note(target).ok_or(CliError::EmptyNoteId)
}

pub async fn run_show(target: &str, raw: bool, profile: Option<&str>) -> Result<(), CliError> {
    let route = parse_show_target(target)?;
    let context = load_context(profile)?;
    let backend = connect_backend(&context).await?;

    let state = load_note_view(backend.store.as_ref(), &route).await;
    let ViewerState::Loaded(note) = &state else {
        return Err(CliError::Viewer(
            state.message().unwrap_or("Unable to load note"),
        ));
    };

    let rendered = RenderedNote::from_note(note);
    if raw {
        println!("{}", rendered.title);
        println!("{}", rendered.body);
    } else {
        println!("{}", markup_to_text(&rendered.title));
        println!();
        println!("{}", markup_to_text(&rendered.body));
    }
    Ok(())
}
