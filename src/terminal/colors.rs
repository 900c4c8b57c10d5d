//! Colored status messages.
//!
//! Styling comes from `colored`, which already honours `NO_COLOR` and
//! `CLICOLOR`. [`init_color`] additionally turns colors off when stdout is
//! not a terminal.

use colored::{ColoredString, Colorize};
use std::io::{self, IsTerminal};

/// Disable colors when stdout is redirected.
pub fn init_color() {
    if !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
}

/// Message symbols.
pub struct Symbols;

impl Symbols {
    /// Success symbol (green checkmark).
    pub fn success() -> ColoredString {
        "\u{2713}".green().bold()
    }

    /// Error symbol (red X).
    pub fn error() -> ColoredString {
        "\u{2717}".red().bold()
    }

    /// Warning symbol (yellow warning sign).
    pub fn warning() -> ColoredString {
        "\u{26A0}".yellow().bold()
    }

    /// Info symbol (blue info).
    pub fn info() -> ColoredString {
        "\u{2139}".blue().bold()
    }
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", Symbols::success(), message);
}

/// Print an error message to stderr.
pub fn print_error(message: &str) {
    eprintln!("{} {}", Symbols::error(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", Symbols::warning(), message);
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", Symbols::info(), message);
}

/// Format a file size in human-readable form.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
