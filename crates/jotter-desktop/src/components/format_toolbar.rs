//! Formatting buttons for the focused editable region

use dioxus::prelude::*;
use jotter_core::format::FormatCommand;

use crate::services::WebviewSurface;
use crate::state::AppState;

#[component]
pub fn FormatToolbar() -> Element {
    let state = use_context::<AppState>();
    let colors = (state.theme)().palette();

    rsx! {
        div {
            class: "editor-toolbar",
            style: "display: flex; gap: 6px;",

            for command in FormatCommand::ALL {
                button {
                    key: "{command:?}",
                    r#type: "button",
                    title: command.title(),
                    style: "
                        min-width: 32px;
                        padding: 4px 8px;
                        border: 1px solid {colors.border};
                        border-radius: 6px;
                        background: {colors.bg_secondary};
                        color: {colors.text_primary};
                    ",
                    // Keep focus (and the selection) in the editable region.
                    onmousedown: move |evt| evt.prevent_default(),
                    onclick: move |_| {
                        let target = *state.workspace.read().format_target();
                        target.apply(&WebviewSurface, command);
                    },
                    {command.label()}
                }
            }
        }
    }
}
