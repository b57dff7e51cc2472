//! Bridges from core traits to the webview's DOM.

use async_trait::async_trait;
use dioxus::prelude::document;
use jotter_core::format::{EditableRegion, RichTextSurface};
use jotter_core::share::Clipboard;

/// JSON string literal, safe to splice into a script.
fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

fn element_expr(region: EditableRegion) -> String {
    format!("document.getElementById({})", js_string(region.element_id()))
}

/// Formatting through `document.execCommand` on the editable regions.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebviewSurface;

impl RichTextSurface for WebviewSurface {
    fn focus(&self, region: EditableRegion) {
        let _ = document::eval(&format!("{}?.focus();", element_expr(region)));
    }

    fn exec_command(&self, command: &str) {
        let _ = document::eval(&format!(
            "document.execCommand({}, false, null);",
            js_string(command)
        ));
    }
}

/// Clipboard writes through `navigator.clipboard`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebviewClipboard;

#[async_trait(?Send)]
impl Clipboard for WebviewClipboard {
    async fn write_text(&self, text: &str) -> Result<(), String> {
        let script = format!(
            r"try {{
                await navigator.clipboard.writeText({});
                return '';
            }} catch (error) {{
                return String((error && error.message) || error || 'Copy failed');
            }}",
            js_string(text)
        );
        let failure = document::eval(&script)
            .join::<String>()
            .await
            .map_err(|error| error.to_string())?;
        if failure.is_empty() {
            Ok(())
        } else {
            Err(failure)
        }
    }
}

/// Current markup of an editable region.
pub async fn read_region(region: EditableRegion) -> Option<String> {
    let script = format!("return {}?.innerHTML ?? null;", element_expr(region));
    match document::eval(&script).join::<Option<String>>().await {
        Ok(markup) => markup,
        Err(error) => {
            tracing::warn!("Failed to read {}: {}", region.element_id(), error);
            None
        }
    }
}

/// Replace an editable region's markup.
pub fn write_region(region: EditableRegion, markup: &str) {
    let _ = document::eval(&format!(
        "const el = {}; if (el) {{ el.innerHTML = {}; }}",
        element_expr(region),
        js_string(markup)
    ));
}
