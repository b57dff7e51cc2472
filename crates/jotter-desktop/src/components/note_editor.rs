//! Rich-text note editor with explicit save

use dioxus::prelude::*;
use jotter_core::editor::execute_save;
use jotter_core::format::{key_command, needs_mirror, EditableRegion, RichTextSurface};

use super::FormatToolbar;
use crate::services::{read_region, write_region, WebviewSurface};
use crate::state::AppState;

#[component]
pub fn NoteEditor() -> Element {
    let mut state = use_context::<AppState>();
    let colors = (state.theme)().palette();

    // Markup currently in the DOM, as last read from or written to it.
    let mut shown_title = use_signal(String::new);
    let mut shown_body = use_signal(String::new);

    // Push the draft into the editable regions when it was replaced by a
    // selection, a new draft or a sign-out. Typing leaves both equal.
    use_effect(move || {
        let (title, content) = {
            let workspace = state.workspace.read();
            let draft = workspace.editor().draft();
            (draft.title.clone(), draft.content.clone())
        };
        if needs_mirror(&shown_title.peek(), &title) {
            write_region(EditableRegion::Title, &title);
            shown_title.set(title);
        }
        if needs_mirror(&shown_body.peek(), &content) {
            write_region(EditableRegion::Body, &content);
            shown_body.set(content);
        }
    });

    let on_input = move |region: EditableRegion| {
        spawn(async move {
            let Some(markup) = read_region(region).await else {
                return;
            };
            match region {
                EditableRegion::Title => {
                    shown_title.set(markup.clone());
                    state.workspace.write().set_title(markup);
                }
                EditableRegion::Body => {
                    shown_body.set(markup.clone());
                    state.workspace.write().set_content(markup);
                }
            }
        });
    };

    let mut on_focus = move |region: EditableRegion| {
        state.workspace.write().format_target_mut().focused(region);
    };

    let on_keydown = move |region: EditableRegion, evt: Event<KeyboardData>| {
        let key = evt.key().to_string();
        if let Some(command) = key_command(region, &key, evt.modifiers().shift()) {
            evt.prevent_default();
            WebviewSurface.exec_command(command);
        }
    };

    let save = move |_| {
        let Some(backend) = state.backend() else {
            return;
        };
        let Some(request) = state.workspace.write().begin_save() else {
            return;
        };
        spawn(async move {
            let completion = execute_save(backend.store.as_ref(), request).await;
            if !state.workspace.write().finish_save(completion) {
                tracing::debug!("Save finished after the draft changed");
            }
        });
    };

    let (label, can_save, status) = {
        let workspace = state.workspace.read();
        let editor = workspace.editor();
        (
            editor.primary_action_label(),
            workspace.can_save(),
            editor.status().message().unwrap_or_default().to_string(),
        )
    };

    let editable_style = format!(
        "outline: none; padding: 12px 16px; border-radius: 8px; border: 1px solid {}; background: {}; color: {};",
        colors.border, colors.bg_primary, colors.text_primary
    );

    rsx! {
        div {
            class: "notes-editor",
            style: "flex: 1; display: flex; flex-direction: column; gap: 12px; padding: 16px 24px; overflow-y: auto;",

            div {
                id: EditableRegion::Title.element_id(),
                class: "notes-title",
                contenteditable: "true",
                "data-placeholder": "Title your note",
                style: "{editable_style} font-size: 22px; font-weight: 600;",
                oninput: move |_| on_input(EditableRegion::Title),
                onfocus: move |_| on_focus(EditableRegion::Title),
                onkeydown: move |evt| on_keydown(EditableRegion::Title, evt),
            }

            FormatToolbar {}

            div {
                id: EditableRegion::Body.element_id(),
                class: "editor-content",
                contenteditable: "true",
                "data-placeholder": "Write something memorable",
                style: "{editable_style} flex: 1; min-height: 240px; line-height: 1.6;",
                oninput: move |_| on_input(EditableRegion::Body),
                onfocus: move |_| on_focus(EditableRegion::Body),
                onkeydown: move |evt| on_keydown(EditableRegion::Body, evt),
            }

            div {
                class: "editor-footer",
                style: "display: flex; align-items: center; gap: 12px;",

                button {
                    r#type: "button",
                    class: "primary",
                    style: "background: {colors.accent}; color: {colors.accent_text};",
                    disabled: !can_save,
                    onclick: save,
                    "{label}"
                }
                span {
                    class: "muted",
                    style: "color: {colors.text_muted};",
                    "{status}"
                }
            }
        }
    }
}
