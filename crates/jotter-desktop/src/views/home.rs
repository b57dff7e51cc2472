//! Home view - header, then either the auth form or the notes shell

use dioxus::prelude::*;

use crate::components::{AuthForm, Header, NoteEditor, Sidebar};
use crate::state::AppState;

#[component]
pub fn Home() -> Element {
    let state = use_context::<AppState>();
    let colors = (state.theme)().palette();

    let connected = state.backend.read().is_some();
    let signed_in = state.workspace.read().session().is_signed_in();
    let startup_error = (state.startup_error)();
    let offline = (state.offline_mode)();

    rsx! {
        section {
            id: "notes",
            class: "notes-card",
            style: "display: flex; flex-direction: column; height: 100vh;",

            Header {}

            if let Some(error) = startup_error {
                p {
                    class: "status-banner error-text",
                    style: "color: {colors.error};",
                    "{error}"
                }
            }
            if offline {
                p {
                    class: "status-banner muted",
                    style: "color: {colors.text_muted};",
                    "Firebase is not configured. Notes are kept in memory until you quit."
                }
            }

            if !connected {
                p {
                    class: "muted",
                    style: "padding: 24px; color: {colors.text_muted};",
                    "Connecting..."
                }
            } else if signed_in {
                div {
                    class: "notes-shell",
                    style: "display: flex; flex: 1; overflow: hidden;",

                    Sidebar {}
                    NoteEditor {}
                }
            } else {
                AuthForm {}
            }
        }
    }
}
