//! UI Components
//!
//! Building blocks for the workspace and the read-only viewer.

mod auth_form;
mod format_toolbar;
mod header;
mod note_card;
mod note_editor;
mod sidebar;
mod viewer;

pub use auth_form::AuthForm;
pub use format_toolbar::FormatToolbar;
pub use header::Header;
pub use note_card::NoteCard;
pub use note_editor::NoteEditor;
pub use sidebar::Sidebar;
pub use viewer::{open_viewer_window, ViewerScreen};
