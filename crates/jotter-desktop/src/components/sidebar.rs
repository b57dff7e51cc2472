//! Sidebar with the live note list

use dioxus::prelude::*;
use jotter_core::models::format_timestamp;
use jotter_core::NoteId;

use super::NoteCard;
use crate::state::AppState;

struct NoteRow {
    id: NoteId,
    title: String,
    preview: String,
    timestamp: String,
    is_selected: bool,
}

#[component]
pub fn Sidebar() -> Element {
    let mut state = use_context::<AppState>();
    let colors = (state.theme)().palette();

    let (loading, rows) = {
        let workspace = state.workspace.read();
        let active = workspace.active_note_id();
        let rows = workspace
            .notes()
            .iter()
            .map(|note| NoteRow {
                id: note.id.clone(),
                title: note.list_title(),
                preview: note.preview(),
                timestamp: format_timestamp(note.updated_at),
                is_selected: active == Some(&note.id),
            })
            .collect::<Vec<_>>();
        (workspace.notes_loading(), rows)
    };

    rsx! {
        aside {
            class: "notes-sidebar",
            style: "
                width: 280px;
                background: {colors.bg_secondary};
                border-right: 1px solid {colors.border};
                display: flex;
                flex-direction: column;
                overflow: hidden;
            ",

            div {
                class: "sidebar-head",
                style: "color: {colors.text_secondary};",
                span { "Recent notes" }
                button {
                    r#type: "button",
                    onclick: move |_| state.workspace.write().new_draft(),
                    "New"
                }
            }

            div {
                class: "notes-list",
                style: "flex: 1; overflow-y: auto;",

                if loading {
                    p {
                        class: "muted",
                        style: "color: {colors.text_muted};",
                        "Loading notes..."
                    }
                } else if rows.is_empty() {
                    p {
                        class: "muted",
                        style: "color: {colors.text_muted};",
                        "Start with a fresh idea ➜"
                    }
                }

                for row in rows {
                    NoteCard {
                        key: "{row.id}",
                        title: row.title,
                        preview: row.preview,
                        timestamp: row.timestamp,
                        is_selected: row.is_selected,
                        onclick: move |_| {
                            if !state.workspace.write().select_note(&row.id) {
                                tracing::warn!("Note {} is no longer listed", row.id);
                            }
                        },
                    }
                }
            }
        }
    }
}
