//! The transform pipeline.
//!
//! Images are processed one at a time: noise and/or blur into
//! `<output_dir>/<file name>`, then metadata is stripped from the result.
//! Each input yields a [`FileReport`]; unreadable inputs are skipped and the
//! run carries on.

use crate::cli::Config;
use crate::error::{Error, Result};
use crate::formats::strip_file;
use crate::paths::image_paths;
use crate::terminal::{ProcessingStats, Progress, print_error, print_success, print_warning};
use crate::transform::{add_noise, blur_file};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, warn};

/// Outcome of the metadata step for a written image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataOutcome {
    /// Metadata was stripped (`bytes` may be zero when there was none).
    Stripped { bytes: u64 },
    /// Stripping failed; the image was still written.
    Skipped(String),
}

/// Result of processing a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The output image was written.
    Success { metadata: MetadataOutcome },
    /// The input could not be read; nothing was written.
    Skipped { reason: String },
    /// Writing the output failed.
    Failed { error: String },
}

/// What happened to one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub outcome: Outcome,
}

/// Everything a run produced.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub files: Vec<FileReport>,
    pub stats: ProcessingStats,
}

impl RunReport {
    /// Whether any input was found at all.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Sequential image processor.
pub struct Processor {
    config: Config,
    rng: StdRng,
}

impl Processor {
    /// Create a processor. The noise generator is seeded from
    /// `config.seed`, or from the OS when unset.
    pub fn new(config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { config, rng }
    }

    /// The configuration this processor runs with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve the configured input and process every image found.
    ///
    /// Returns an empty report, without creating the output directory, when
    /// no image was found.
    pub fn run(&mut self) -> Result<RunReport> {
        self.config.validate()?;
        let paths = image_paths(&self.config.input)?;
        self.process_paths(&paths)
    }

    /// Process an already resolved list of images.
    pub fn process_paths(&mut self, paths: &[PathBuf]) -> Result<RunReport> {
        self.config.validate()?;
        let start = Instant::now();
        let mut report = RunReport::default();

        if paths.is_empty() {
            return Ok(report);
        }

        let output_dir = &self.config.output_dir;
        fs::create_dir_all(output_dir).map_err(|e| Error::io_with_path(e, output_dir))?;

        let progress = Progress::new(paths.len(), !self.config.quiet);
        for input in paths {
            progress.set_current_file(input);
            let file = self.process_file(input);
            progress.suspend(|| self.announce(&file));
            record(&mut report.stats, &file.outcome);
            report.files.push(file);
            progress.inc();
        }
        debug!(completed = progress.position(), total = paths.len(), "run finished");
        progress.finish();

        report.stats.set_duration(start.elapsed());
        Ok(report)
    }

    /// Get the output path for an input: its file name inside `output_dir`.
    pub fn output_path(output_dir: &Path, input: &Path) -> PathBuf {
        let file_name = input.file_name().unwrap_or_default();
        output_dir.join(file_name)
    }

    /// Transform one image and strip metadata from the result.
    fn process_file(&mut self, input: &Path) -> FileReport {
        let output = Self::output_path(&self.config.output_dir, input);
        debug!(input = %input.display(), output = %output.display(), "processing");

        let outcome = match self.transform(input, &output) {
            Ok(()) => Outcome::Success {
                metadata: strip_output(&output),
            },
            Err(e) if e.is_unreadable_input() => {
                warn!(input = %input.display(), error = %e, "skipping unreadable image");
                Outcome::Skipped {
                    reason: e.to_string(),
                }
            }
            Err(e) => {
                error!(input = %input.display(), error = %e, "failed to write image");
                Outcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        FileReport {
            input: input.to_path_buf(),
            output,
            outcome,
        }
    }

    /// Apply the configured transforms from `input` to `output`.
    fn transform(&mut self, input: &Path, output: &Path) -> Result<()> {
        let Config {
            noise,
            blur,
            noise_strength,
            blur_radius,
            ..
        } = self.config;

        match (noise, blur) {
            (true, true) => {
                // Noise lands in a scoped temp file outside the output
                // directory; it is removed on drop whatever happens next.
                let intermediate = tempfile::Builder::new()
                    .prefix("obscura-")
                    .suffix(".png")
                    .tempfile()
                    .map_err(|e| Error::io_with_path(e, std::env::temp_dir()))?;

                add_noise(input, intermediate.path(), noise_strength, &mut self.rng)?;
                blur_file(intermediate.path(), output, blur_radius)?;

                if let Err(e) = intermediate.close() {
                    warn!(error = %e, "failed to remove intermediate file");
                }
                Ok(())
            }
            (true, false) => add_noise(input, output, noise_strength, &mut self.rng),
            (false, true) => blur_file(input, output, blur_radius),
            (false, false) => Err(Error::NoTransform),
        }
    }

    /// Print the per-file result line.
    fn announce(&self, file: &FileReport) {
        if self.config.quiet && !matches!(file.outcome, Outcome::Failed { .. }) {
            return;
        }
        let name = file.input.file_name().unwrap_or_default().to_string_lossy();

        match &file.outcome {
            Outcome::Success { metadata } => {
                if let MetadataOutcome::Skipped(reason) = metadata {
                    print_warning(&format!(
                        "Failed to remove metadata from {}: {}",
                        file.output.display(),
                        reason
                    ));
                }
                if self.config.verbose {
                    print_success(&format!("{} \u{2192} {}", name, file.output.display()));
                }
            }
            Outcome::Skipped { reason } => {
                print_warning(&format!("Skipped {}: {}", name, reason));
            }
            Outcome::Failed { error } => {
                print_error(&format!("Failed to process {}: {}", name, error));
            }
        }
    }
}

/// Strip metadata from a written output; failures are recorded, not raised.
fn strip_output(output: &Path) -> MetadataOutcome {
    match strip_file(output) {
        Ok(bytes) => MetadataOutcome::Stripped { bytes },
        Err(e) => {
            warn!(path = %output.display(), error = %e, "metadata stripping failed");
            MetadataOutcome::Skipped(e.to_string())
        }
    }
}

fn record(stats: &mut ProcessingStats, outcome: &Outcome) {
    match outcome {
        Outcome::Success {
            metadata: MetadataOutcome::Stripped { bytes },
        } => stats.add_success(*bytes),
        Outcome::Success { .. } => stats.add_success(0),
        Outcome::Skipped { .. } => stats.add_skipped(),
        Outcome::Failed { .. } => stats.add_failure(),
    }
}
