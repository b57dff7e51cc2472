//! Read-only note viewer, in the main window or a window of its own

use dioxus::desktop::{window, LogicalSize, WindowBuilder};
use dioxus::prelude::*;
use jotter_core::services::Backend;
use jotter_core::viewer::{load_note_view, ReadRoute, RenderedNote, ViewerState};

use crate::state::AppState;
use crate::theme::ResolvedTheme;

/// Rendered note, or the loading / not-found / failure message.
#[component]
pub fn NoteViewer(
    view: ViewerState,
    theme: ResolvedTheme,
    on_back: EventHandler<MouseEvent>,
) -> Element {
    let colors = theme.palette();
    let rendered = view.note().map(RenderedNote::from_note);
    let (message_class, message_color) = if view == ViewerState::Loading {
        ("muted", colors.text_muted)
    } else {
        ("error-text", colors.error)
    };

    rsx! {
        section {
            id: "notes",
            class: "note-view",
            style: "min-height: 100vh; background: {colors.bg_primary}; color: {colors.text_primary};",

            div {
                class: "note-view-card",
                style: "max-width: 760px; margin: 0 auto; padding: 32px 24px;",

                div {
                    class: "note-view-header",
                    button {
                        r#type: "button",
                        class: "ghost-btn",
                        style: "color: {colors.text_secondary};",
                        onclick: move |evt| on_back.call(evt),
                        "Back to workspace"
                    }
                }

                if let Some(message) = view.message() {
                    p {
                        class: message_class,
                        style: "color: {message_color};",
                        "{message}"
                    }
                }

                if let Some(rendered) = rendered {
                    h1 {
                        class: "note-view-title",
                        dangerous_inner_html: "{rendered.title}",
                    }
                    article {
                        class: "note-view-body",
                        style: "line-height: 1.7;",
                        dangerous_inner_html: "{rendered.body}",
                    }
                }
            }
        }
    }
}

/// Viewer shown in the main window while a read route is set.
#[component]
pub fn ViewerScreen() -> Element {
    let mut state = use_context::<AppState>();
    let mut view = use_signal(|| ViewerState::Loading);

    // Reload whenever the backend or the route changes.
    use_effect(move || {
        let Some(route) = (state.read_route)() else {
            return;
        };
        let Some(backend) = state.backend() else {
            return;
        };
        view.set(ViewerState::Loading);
        spawn(async move {
            let loaded = load_note_view(backend.store.as_ref(), &route).await;
            view.set(loaded);
        });
    });

    rsx! {
        NoteViewer {
            view: view(),
            theme: (state.theme)(),
            on_back: move |_| state.read_route.set(None),
        }
    }
}

/// Root context for a standalone viewer window.
#[derive(Clone)]
struct ViewerWindowContext {
    backend: Backend,
    route: ReadRoute,
}

/// Standalone viewer window. Runs without the workspace context.
#[component]
pub fn ViewerWindow() -> Element {
    let context = use_context::<ViewerWindowContext>();
    let mut view = use_signal(|| ViewerState::Loading);
    let theme = ResolvedTheme::detect();
    let theme_attr = theme.attr();

    use_future(move || {
        let context = context.clone();
        async move {
            let loaded = load_note_view(context.backend.store.as_ref(), &context.route).await;
            view.set(loaded);
        }
    });

    rsx! {
        document::Link { rel: "stylesheet", href: asset!("/assets/main.css") }

        div {
            "data-theme": "{theme_attr}",
            NoteViewer {
                view: view(),
                theme,
                on_back: move |_| window().close(),
            }
        }
    }
}

/// Open `route` in a new read-only window sharing `backend`.
pub fn open_viewer_window(backend: Backend, route: ReadRoute) {
    let cfg = dioxus::desktop::Config::new().with_window(
        WindowBuilder::new()
            .with_title("Jotter - Read only")
            .with_inner_size(LogicalSize::new(760.0, 640.0))
            .with_focused(true),
    );

    let dom = VirtualDom::new(ViewerWindow)
        .with_root_context(ViewerWindowContext { backend, route });
    window().new_window(dom, cfg);
}
