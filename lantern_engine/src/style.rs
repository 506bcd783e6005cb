//! Styling helpers for the console front-end.
//!
//! The [`GameStyle`] trait wraps the `colored` crate so the prompt and
//! banner can be styled directly from string literals. Engine prose is
//! deliberately unstyled; only the console boundary decorates text.

use colored::{ColoredString, Colorize};

/// Convenience trait for applying color and style to console chrome.
pub trait GameStyle {
    fn prompt_style(&self) -> ColoredString;
    fn banner_style(&self) -> ColoredString;
    fn error_style(&self) -> ColoredString;
}

impl GameStyle for &str {
    fn prompt_style(&self) -> ColoredString {
        self.bold().green()
    }
    fn banner_style(&self) -> ColoredString {
        self.bright_yellow().underline()
    }
    fn error_style(&self) -> ColoredString {
        self.bright_red()
    }
}

impl GameStyle for String {
    fn prompt_style(&self) -> ColoredString {
        self.as_str().prompt_style()
    }
    fn banner_style(&self) -> ColoredString {
        self.as_str().banner_style()
    }
    fn error_style(&self) -> ColoredString {
        self.as_str().error_style()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styles_emit_ansi_when_forced() {
        colored::control::set_override(true);
        assert!(format!("{}", "hi".prompt_style()).contains('\u{1b}'));
        colored::control::unset_override();
    }
}
