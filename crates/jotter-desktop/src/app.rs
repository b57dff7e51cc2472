//! Main application component

use dioxus::prelude::*;
use jotter_core::auth::Identity;
use jotter_core::config::resolve_firebase_config;
use jotter_core::services::Backend;
use jotter_core::sync::{NoteSynchronizer, SyncEvent};
use jotter_core::workspace::Workspace;
use url::Url;

use crate::bootstrap_config::{load_client_config, share_location};
use crate::components::ViewerScreen;
use crate::launch::LaunchOptions;
use crate::services::KeyringSessionStore;
use crate::state::AppState;
use crate::theme::ResolvedTheme;
use crate::views::Home;

/// Root application component
#[component]
pub fn App() -> Element {
    let launch = use_context::<LaunchOptions>();

    let workspace = use_signal(Workspace::new);
    let mut backend = use_signal(|| None::<Backend>);
    let mut location = use_signal(|| None::<Url>);
    let read_route = use_signal(|| launch.read_route.clone());
    let mut startup_error = use_signal(|| None::<String>);
    let mut offline_mode = use_signal(|| false);
    let theme = use_signal(ResolvedTheme::detect);

    let state = use_context_provider(|| AppState {
        workspace,
        backend,
        location,
        read_route,
        startup_error,
        offline_mode,
        theme,
    });

    // Connect once, then follow identity changes and note snapshots for the
    // lifetime of the window.
    use_future(move || async move {
        let connected = match connect().await {
            Ok(connected) => connected,
            Err(error) => {
                tracing::error!("Failed to connect: {}", error);
                startup_error.set(Some(error));
                Connected {
                    backend: Backend::in_memory(),
                    location: None,
                    offline: true,
                }
            }
        };
        if connected.offline {
            tracing::warn!("Firebase is not configured; notes are kept in memory");
        }

        offline_mode.set(connected.offline);
        location.set(connected.location);
        backend.set(Some(connected.backend.clone()));

        run_sync_loop(state, connected.backend).await;
    });

    let current_theme = theme();
    let colors = current_theme.palette();
    let theme_attr = current_theme.attr();

    rsx! {
        document::Link { rel: "stylesheet", href: asset!("/assets/main.css") }

        div {
            class: "app-container",
            "data-theme": "{theme_attr}",
            style: "
                min-height: 100vh;
                background: {colors.bg_primary};
                color: {colors.text_primary};
            ",

            if read_route.read().is_some() {
                ViewerScreen {}
            } else {
                Home {}
            }
        }
    }
}

struct Connected {
    backend: Backend,
    location: Option<Url>,
    offline: bool,
}

async fn connect() -> Result<Connected, String> {
    let config = load_client_config().map_err(|error| error.to_string())?;
    let location = share_location(&config).map_err(|error| error.to_string())?;

    match resolve_firebase_config(&config).map_err(|error| error.to_string())? {
        Some(settings) => {
            let backend = Backend::connect(&settings, KeyringSessionStore)
                .await
                .map_err(|error| error.to_string())?;
            Ok(Connected {
                backend,
                location: Some(location),
                offline: false,
            })
        }
        None => Ok(Connected {
            backend: Backend::in_memory(),
            location: Some(location),
            offline: true,
        }),
    }
}

async fn run_sync_loop(state: AppState, backend: Backend) {
    let mut identities = backend.auth.subscribe();
    let mut synchronizer = NoteSynchronizer::new(backend.store.clone());

    let initial = identities.borrow_and_update().clone();
    follow_identity(state, &mut synchronizer, initial);

    loop {
        tokio::select! {
            changed = identities.changed() => {
                if changed.is_err() {
                    break;
                }
                let identity = identities.borrow_and_update().clone();
                follow_identity(state, &mut synchronizer, identity);
            }
            Some(event) = synchronizer.next_event() => {
                apply_sync_event(state, event);
            }
        }
    }
}

fn follow_identity(
    mut state: AppState,
    synchronizer: &mut NoteSynchronizer,
    identity: Option<Identity>,
) {
    let result = state
        .workspace
        .write()
        .follow_identity(synchronizer, identity);
    match result {
        Ok(change) => tracing::debug!("Identity change: {:?}", change),
        // The list stays as it was.
        Err(error) => tracing::error!("Failed to subscribe to notes: {}", error),
    }
}

fn apply_sync_event(mut state: AppState, event: SyncEvent) {
    if state.workspace.write().apply_sync_event(event) {
        tracing::debug!("Selected the most recent note");
    }
}
