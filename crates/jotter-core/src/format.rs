//! Rich-text formatting commands for the editable title and body.

/// Toolbar commands, in toolbar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    UnorderedList,
}

impl FormatCommand {
    pub const ALL: [Self; 4] = [Self::Bold, Self::Italic, Self::Underline, Self::UnorderedList];

    /// Button text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bold => "B",
            Self::Italic => "I",
            Self::Underline => "U",
            Self::UnorderedList => "\u{2022}",
        }
    }

    /// Tooltip / accessible name.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Bold => "Bold",
            Self::Italic => "Italic",
            Self::Underline => "Underline",
            Self::UnorderedList => "Bullet list",
        }
    }

    /// Editing command name understood by the host surface.
    #[must_use]
    pub const fn command_name(self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
            Self::UnorderedList => "insertUnorderedList",
        }
    }
}

/// Command used for Shift+Enter in the body.
pub const LINE_BREAK_COMMAND: &str = "insertLineBreak";

/// The two editable regions of the editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EditableRegion {
    Title,
    #[default]
    Body,
}

impl EditableRegion {
    /// DOM id of the region's element.
    #[must_use]
    pub const fn element_id(self) -> &'static str {
        match self {
            Self::Title => "note-title",
            Self::Body => "note-body",
        }
    }
}

/// Host editing surface that executes commands on the focused region.
pub trait RichTextSurface {
    fn focus(&self, region: EditableRegion);

    fn exec_command(&self, command: &str);
}

/// Tracks which region formatting applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatTarget {
    active: EditableRegion,
}

impl FormatTarget {
    #[must_use]
    pub const fn active(self) -> EditableRegion {
        self.active
    }

    /// Record that `region` received focus.
    pub fn focused(&mut self, region: EditableRegion) {
        self.active = region;
    }

    /// Refocus the last active region and run `command` there.
    pub fn apply<S: RichTextSurface + ?Sized>(self, surface: &S, command: FormatCommand) {
        surface.focus(self.active);
        surface.exec_command(command.command_name());
    }
}

/// What a key press in an editable region should do instead of the default.
#[must_use]
pub fn key_command(region: EditableRegion, key: &str, shift: bool) -> Option<&'static str> {
    match (region, key, shift) {
        (EditableRegion::Body, "Enter", true) => Some(LINE_BREAK_COMMAND),
        _ => None,
    }
}

/// Whether a region showing `shown` must be overwritten with `draft`.
///
/// Writing identical markup back would reset the caret, so only differing
/// markup is pushed.
#[must_use]
pub fn needs_mirror(shown: &str, draft: &str) -> bool {
    shown != draft
}
