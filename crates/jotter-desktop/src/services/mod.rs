//! Desktop services: keychain sessions and webview bridges.

mod session_store;
mod webview;

pub use session_store::KeyringSessionStore;
pub use webview::{read_region, write_region, WebviewClipboard, WebviewSurface};
