//! Terminal palette.

use owo_colors::Style;

/// Styles for status markers and report fields. Every field is a no-op
/// style by default, which is what non-TTY and `NO_COLOR` output uses.
#[derive(Default, Clone)]
pub struct Styles {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub info: Style,
    /// Keys in key/value listings.
    pub dim: Style,
    pub bold: Style,
    pub header: Style,
    /// Paths of written scripts.
    pub path: Style,
    /// Digests and other fixed-width identifiers.
    pub digest: Style,
}

impl Styles {
    /// Palette for a color terminal.
    #[must_use]
    pub fn colored() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red(),
            info: Style::new().cyan(),
            dim: Style::new().dimmed(),
            bold: Style::new().bold(),
            header: Style::new().bold().cyan(),
            path: Style::new().underline(),
            digest: Style::new().dimmed(),
        }
    }

    /// `colored()` when `enabled`, plain otherwise.
    #[must_use]
    pub fn for_terminal(enabled: bool) -> Self {
        if enabled { Self::colored() } else { Self::default() }
    }
}
