//! Terminal styling helpers

use owo_colors::{OwoColorize, Stream, Style};

/// Check mark used for successful steps
pub const CHECK: &str = "✓";
/// Cross used for failed steps
pub const CROSS: &str = "✗";

/// Semantic styling for terminal output
///
/// Colors are only applied when stdout supports them.
pub trait Stylize: std::fmt::Display {
    /// Bold text for headings
    fn emphasis(&self) -> String {
        self.styled(Style::new().bold())
    }
    /// Cyan text for names and counts
    fn accent(&self) -> String {
        self.styled(Style::new().cyan())
    }
    /// Green text for success
    fn success(&self) -> String {
        self.styled(Style::new().green())
    }
    /// Red text for failures
    fn failure(&self) -> String {
        self.styled(Style::new().red())
    }
    /// Dimmed text for secondary information
    fn muted(&self) -> String {
        self.styled(Style::new().dimmed())
    }
    /// Apply `style` when stdout supports color
    fn styled(&self, style: Style) -> String {
        let text = self.to_string();
        format!(
            "{}",
            text.if_supports_color(Stream::Stdout, |t| style.style(t))
        )
    }
}

impl<T: std::fmt::Display + ?Sized> Stylize for T {}

/// Styled check mark
pub fn check() -> String {
    CHECK.success()
}

/// Styled cross
pub fn cross() -> String {
    CROSS.failure()
}
