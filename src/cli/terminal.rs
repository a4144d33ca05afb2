//! Terminal capability detection and status rendering

use owo_colors::{OwoColorize, colors::css};
use pathways::Status;

/// Detects whether colored output should be enabled
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Detects terminal width, returning None if not available
pub fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(w, _)| w.0)
}

/// Check if the terminal is too narrow for a table of the given width
pub fn is_narrow(table_width: usize) -> bool {
    terminal_width().is_some_and(|w| usize::from(w) < table_width)
}

/// Extension trait for colorizing output
pub trait Colorize {
    /// Color as success (green)
    fn success(&self) -> String;
    /// Color as warning (amber)
    fn warning(&self) -> String;
    /// Color as failure (red)
    fn failure(&self) -> String;
    /// Color as info (blue)
    fn info(&self) -> String;
    /// Dim the text
    fn dim(&self) -> String;
}

impl Colorize for str {
    fn success(&self) -> String {
        if supports_color() {
            self.fg::<css::Green>().to_string()
        } else {
            self.to_string()
        }
    }

    fn warning(&self) -> String {
        if supports_color() {
            self.fg::<css::Orange>().to_string()
        } else {
            self.to_string()
        }
    }

    fn failure(&self) -> String {
        if supports_color() {
            self.fg::<css::Crimson>().to_string()
        } else {
            self.to_string()
        }
    }

    fn info(&self) -> String {
        if supports_color() {
            self.fg::<css::LightBlue>().to_string()
        } else {
            self.to_string()
        }
    }

    fn dim(&self) -> String {
        if supports_color() {
            self.dimmed().to_string()
        } else {
            self.to_string()
        }
    }
}

impl Colorize for String {
    fn success(&self) -> String {
        self.as_str().success()
    }

    fn warning(&self) -> String {
        self.as_str().warning()
    }

    fn failure(&self) -> String {
        self.as_str().failure()
    }

    fn info(&self) -> String {
        self.as_str().info()
    }

    fn dim(&self) -> String {
        self.as_str().dim()
    }
}

/// Single-character marker for a status
pub const fn symbol(status: Status) -> &'static str {
    match status {
        Status::Current => "✓",
        Status::Expired => "⧗",
        Status::None => "✗",
    }
}

/// Colors already-padded text according to a status
pub fn paint(status: Status, text: &str) -> String {
    match status {
        Status::Current => text.success(),
        Status::Expired => text.warning(),
        Status::None => text.failure(),
    }
}
