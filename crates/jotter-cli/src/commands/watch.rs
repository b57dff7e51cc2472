use jotter_core::sync::{NoteSynchronizer, SyncEvent};

use crate::commands::common::{connect_backend, format_note_lines, load_context, require_identity};
use crate::error::CliError;

/// Print the note list on every snapshot until Ctrl-C.
pub async fn run_watch(limit: usize, profile: Option<&str>) -> Result<(), CliError> {
    let context = load_context(profile)?;
    let backend = connect_backend(&context).await?;
    let identity = require_identity(&backend)?;

    let mut synchronizer = NoteSynchronizer::new(backend.store.clone());
    synchronizer.attach(&identity.uid)?;
    println!(
        "Watching notes for {} (Ctrl-C to stop)",
        identity.display_label()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return Ok(()),
            event = synchronizer.next_event() => match event {
                Some(SyncEvent::Snapshot(notes)) => {
                    println!();
                    println!("{} note(s)", notes.len());
                    let shown = &notes.as_slice()[..limit.min(notes.len())];
                    for line in format_note_lines(shown) {
                        println!("{line}");
                    }
                }
                Some(SyncEvent::Failed(error)) => return Err(error.into()),
                None => return Err(CliError::SubscriptionClosed),
            }
        }
    }
}
