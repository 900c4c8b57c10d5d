//! Progress bar and run summary.

use super::colors::{Symbols, format_size, print_info};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Per-image progress indicator on stdout.
///
/// Hidden when disabled or when stdout is not a terminal.
pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    /// Create a progress bar over `total` images.
    pub fn new(total: usize, enabled: bool) -> Self {
        let target = if enabled {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        };
        let bar = ProgressBar::with_draw_target(Some(total as u64), target);
        if let Ok(style) = ProgressStyle::with_template(
            "Processing images [{bar:30.cyan/blue}] {pos}/{len} ({percent}%) {wide_msg}",
        ) {
            bar.set_style(style.progress_chars("\u{2588}\u{2593}\u{2591}"));
        }
        Self { bar }
    }

    /// Show the file currently being processed.
    pub fn set_current_file(&self, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_message(name);
    }

    /// Advance by one image.
    pub fn inc(&self) {
        self.bar.inc(1);
    }

    /// Number of images completed so far.
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Print a line without tearing the bar.
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }

    /// Clear the bar.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Statistics for the processing summary.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProcessingStats {
    /// Images written.
    pub processed: usize,
    /// Inputs that could not be read.
    pub skipped: usize,
    /// Inputs whose output could not be written.
    pub failed: usize,
    /// Total bytes of metadata removed.
    pub metadata_removed: u64,
    /// Processing duration.
    pub duration: Duration,
}

impl ProcessingStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_success(&mut self, metadata_bytes: u64) {
        self.processed += 1;
        self.metadata_removed += metadata_bytes;
    }

    pub fn add_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn add_failure(&mut self) {
        self.failed += 1;
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Number of inputs attempted.
    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed
    }
}

/// The summary line printed after a run.
pub fn summary_line(stats: &ProcessingStats, output_dir: &Path) -> String {
    format!(
        "Processed {} image(s). Output saved to: {}",
        stats.total(),
        output_dir.display()
    )
}

/// Print the run summary.
pub fn print_summary(stats: &ProcessingStats, output_dir: &Path, verbose: bool) {
    println!("{}", summary_line(stats, output_dir));

    if stats.skipped > 0 || stats.failed > 0 {
        println!(
            "{} {} written, {} skipped, {} failed",
            Symbols::warning(),
            stats.processed,
            stats.skipped,
            stats.failed
        );
    }

    if verbose {
        print_info(&format!(
            "Metadata removed: {}, time elapsed: {:.1}s",
            format_size(stats.metadata_removed),
            stats.duration.as_secs_f64()
        ));
    }
}
