//! Application state shared through Dioxus context.

use dioxus::prelude::*;
use jotter_core::services::Backend;
use jotter_core::viewer::ReadRoute;
use jotter_core::workspace::Workspace;
use url::Url;

use crate::theme::ResolvedTheme;

/// Global application state
#[derive(Clone, Copy)]
pub struct AppState {
    /// Session, live note list, editor and share notice
    pub workspace: Signal<Workspace>,
    /// Identity provider and store, once connected
    pub backend: Signal<Option<Backend>>,
    /// Base for share links, once configuration is loaded
    pub location: Signal<Option<Url>>,
    /// Set while the main window shows the read-only viewer
    pub read_route: Signal<Option<ReadRoute>>,
    /// Configuration or connection problem shown above the workspace
    pub startup_error: Signal<Option<String>>,
    /// Notes are kept in memory only
    pub offline_mode: Signal<bool>,
    pub theme: Signal<ResolvedTheme>,
}

impl AppState {
    #[must_use]
    pub fn backend(&self) -> Option<Backend> {
        self.backend.read().clone()
    }
}
