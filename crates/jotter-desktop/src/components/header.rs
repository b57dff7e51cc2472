//! Workspace header with account chip and share actions

use dioxus::prelude::*;
use jotter_core::share::copy_share_link;
use jotter_core::viewer::ReadRoute;

use super::open_viewer_window;
use crate::services::WebviewClipboard;
use crate::state::AppState;

#[component]
pub fn Header() -> Element {
    let mut state = use_context::<AppState>();
    let colors = (state.theme)().palette();

    let (identity_label, has_active_note, notice) = {
        let workspace = state.workspace.read();
        (
            workspace
                .session()
                .identity()
                .map(|identity| identity.display_label().to_string()),
            workspace.active_note_id().is_some(),
            workspace.share_notice().cloned(),
        )
    };

    let notice_color = match &notice {
        Some(notice) if !notice.copied => colors.error,
        _ => colors.success,
    };

    let open_viewer = move |_| {
        let Some(location) = (state.location)() else {
            return;
        };
        let Some(link) = state.workspace.read().share_url(&location) else {
            return;
        };
        let Some(backend) = state.backend() else {
            return;
        };
        match ReadRoute::from_url(&link) {
            Some(route) => open_viewer_window(backend, route),
            None => tracing::warn!("Share link is not a read route: {}", link),
        }
    };

    let copy_link = move |_| {
        let Some(location) = (state.location)() else {
            return;
        };
        let link = state.workspace.read().share_url(&location);
        spawn(async move {
            let Some(notice) = copy_share_link(&WebviewClipboard, link.as_ref()).await else {
                return;
            };
            let ttl = notice.ttl();
            state.workspace.write().show_share_notice(Some(notice.clone()));
            tokio::time::sleep(ttl).await;
            state.workspace.write().expire_share_notice(&notice);
        });
    };

    let sign_out = move |_| {
        let Some(backend) = state.backend() else {
            return;
        };
        spawn(async move {
            if let Err(error) = backend.auth.sign_out().await {
                tracing::error!("Failed to sign out: {}", error);
                state.startup_error.set(Some(error.to_string()));
            }
        });
    };

    rsx! {
        header {
            class: "notes-header",
            style: "
                display: flex;
                justify-content: space-between;
                align-items: flex-start;
                padding: 20px 24px 12px;
                border-bottom: 1px solid {colors.border};
            ",

            div {
                p {
                    class: "eyebrow",
                    style: "color: {colors.accent};",
                    "Lightweight Workspace"
                }
                h2 { "Notes you can trust" }
                p {
                    class: "subhead",
                    style: "color: {colors.text_secondary};",
                    "Rich text editing with instant sync per account."
                }
            }

            if let Some(label) = identity_label {
                div {
                    class: "user-chip",
                    style: "background: {colors.bg_secondary}; border: 1px solid {colors.border};",

                    span { "{label}" }
                    div {
                        class: "chip-actions",

                        button {
                            r#type: "button",
                            class: "chip-btn",
                            title: "Open viewing link",
                            disabled: !has_active_note,
                            onclick: open_viewer,
                            "View"
                        }
                        button {
                            r#type: "button",
                            class: "chip-btn subtle",
                            title: "Copy note URL",
                            disabled: !has_active_note,
                            onclick: copy_link,
                            "Copy link"
                        }
                        button {
                            r#type: "button",
                            class: "chip-btn danger",
                            title: "Sign out",
                            style: "color: {colors.error};",
                            onclick: sign_out,
                            "Sign out"
                        }
                    }
                }
            }
        }

        if let Some(notice) = notice {
            p {
                class: "share-hint",
                style: "color: {notice_color};",
                "{notice.message}"
            }
        }
    }
}
