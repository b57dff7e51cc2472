use jotter_core::share::share_url;

use crate::commands::common::{
    connect_backend, first_snapshot, load_context, require_identity, resolve_note,
};
use crate::error::CliError;

pub async fn run_share(id: &str, open: bool, profile: Option<&str>) -> Result<(), CliError> {
    let context = load_context(profile)?;
    let base = context.config.share_base()?.ok_or_else(|| {
        CliError::Config(
            "share_base_url is not set. Run `jotter config init --share-base-url <URL>`."
                .to_string(),
        )
    })?;

    let backend = connect_backend(&context).await?;
    let identity = require_identity(&backend)?;
    let notes = first_snapshot(backend.store.clone(), &identity.uid).await?;
    let note = resolve_note(&notes, id)?;

    let Some(link) = share_url(&base, Some(&note.id)) else {
        return Err(CliError::NoteNotFound(id.to_string()));
    };
    println!("{link}");

    if open {
        webbrowser::open(link.as_str()).map_err(|error| CliError::Browser(error.to_string()))?;
    }
    Ok(())
}
