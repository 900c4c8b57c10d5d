//! Terminal utilities for colored output and progress reporting.

pub mod colors;
pub mod progress;

pub use colors::{
    Symbols, format_size, init_color, print_error, print_info, print_success, print_warning,
};
pub use progress::{ProcessingStats, Progress, print_summary, summary_line};
