//! Email/password sign-in form

use dioxus::prelude::*;
use jotter_core::auth::{describe_auth_error, AuthMode, Credentials};

use crate::state::AppState;

#[component]
pub fn AuthForm() -> Element {
    let state = use_context::<AppState>();
    let colors = (state.theme)().palette();

    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut pending = use_signal(|| false);
    let mut error = use_signal(|| None::<String>);

    let mut submit = move |mode: AuthMode| {
        if pending() {
            return;
        }
        let Some(backend) = state.backend() else {
            return;
        };
        let credentials = match Credentials::new(&email.read(), &password.read()) {
            Ok(credentials) => credentials,
            Err(invalid) => {
                error.set(Some(invalid.to_string()));
                return;
            }
        };

        error.set(None);
        pending.set(true);
        spawn(async move {
            let result = match mode {
                AuthMode::SignIn => backend.auth.sign_in(&credentials).await,
                AuthMode::SignUp => backend.auth.sign_up(&credentials).await,
            };
            match result {
                Ok(identity) => {
                    tracing::info!("Signed in as {}", identity.display_label());
                    password.set(String::new());
                }
                Err(failure) => {
                    tracing::warn!("Authentication failed: {}", failure);
                    error.set(Some(describe_auth_error(mode, &failure)));
                }
            }
            pending.set(false);
        });
    };

    let working = pending();
    let input_style = format!(
        "padding: 10px 12px; border-radius: 8px; border: 1px solid {}; background: {}; color: {};",
        colors.border, colors.bg_secondary, colors.text_primary
    );

    rsx! {
        form {
            class: "notes-auth",
            style: "display: flex; flex-direction: column; gap: 12px; max-width: 360px; margin: 48px auto;",
            onsubmit: move |evt: FormEvent| {
                evt.prevent_default();
                submit(AuthMode::SignIn);
            },

            input {
                r#type: "email",
                placeholder: "you@example.com",
                style: "{input_style}",
                value: "{email}",
                oninput: move |evt| email.set(evt.value()),
            }
            input {
                r#type: "password",
                placeholder: "Create a password",
                style: "{input_style}",
                value: "{password}",
                oninput: move |evt| password.set(evt.value()),
            }

            if let Some(message) = error() {
                p {
                    class: "error-text",
                    style: "color: {colors.error}; margin: 0;",
                    "{message}"
                }
            }

            div {
                class: "auth-actions",
                style: "display: flex; gap: 8px;",

                button {
                    r#type: "submit",
                    class: "primary",
                    disabled: working,
                    if working { "Working..." } else { "Sign in" }
                }
                button {
                    r#type: "button",
                    class: "secondary",
                    disabled: working,
                    onclick: move |_| submit(AuthMode::SignUp),
                    if working { "Working..." } else { "Sign up" }
                }
            }

            p {
                class: "auth-hint muted",
                style: "color: {colors.text_muted}; font-size: 13px;",
                "Choose Sign in for existing accounts or Sign up to create one."
            }
        }
    }
}
