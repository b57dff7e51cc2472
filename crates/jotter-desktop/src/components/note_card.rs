use dioxus::prelude::*;

use crate::state::AppState;

/// Sidebar row for one note. An empty preview reads "Draft".
#[component]
pub fn NoteCard(
    title: String,
    preview: String,
    timestamp: String,
    is_selected: bool,
    onclick: EventHandler<MouseEvent>,
) -> Element {
    let state = use_context::<AppState>();
    let colors = (state.theme)().palette();

    let (class, background, marker) = if is_selected {
        ("note-row active", colors.bg_tertiary, colors.accent)
    } else {
        ("note-row", "transparent", "transparent")
    };
    let preview = if preview.is_empty() { "Draft".to_string() } else { preview };

    rsx! {
        button {
            class,
            style: "border-left: 3px solid {marker}; border-bottom: 1px solid {colors.border}; background: {background}; color: {colors.text_primary};",
            onclick: move |evt| onclick.call(evt),
            strong { "{title}" }
            span { style: "color: {colors.text_secondary};", "{preview}" }
            time { style: "color: {colors.text_muted};", "{timestamp}" }
        }
    }
}
