//! Command-line argument parsing for Obscura.
//!
//! [`Cli`] is the clap surface; [`Config`] is the plain value the processor
//! consumes. Library callers can build a [`Config`] directly.

use crate::error::{Error, Result};
use clap::{ArgGroup, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

/// Application name.
pub const NAME: &str = "obscura";

/// Command-line surface.
#[derive(Debug, Parser)]
#[command(name = NAME, version, about = "Batch obfuscate images with noise and/or blur.")]
#[command(group(
    ArgGroup::new("transform")
        .args(["noise", "blur"])
        .required(true)
        .multiple(true)
))]
pub struct Cli {
    /// Input file or directory
    pub input: PathBuf,

    /// Output directory (created if missing)
    pub output: PathBuf,

    /// Add random noise
    #[arg(long)]
    pub noise: bool,

    /// Apply Gaussian blur
    #[arg(long)]
    pub blur: bool,

    /// Strength of random noise
    #[arg(
        long = "noise_strength",
        visible_alias = "noise-strength",
        value_name = "N",
        default_value_t = Config::DEFAULT_NOISE_STRENGTH
    )]
    pub noise_strength: u32,

    /// Gaussian blur radius
    #[arg(
        long = "blur_radius",
        visible_alias = "blur-radius",
        value_name = "R",
        default_value_t = Config::DEFAULT_BLUR_RADIUS,
        value_parser = parse_radius
    )]
    pub blur_radius: f32,

    /// Seed the noise generator for reproducible output
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Show per-file details
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress everything except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Processing configuration for a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Input file or directory.
    pub input: PathBuf,
    /// Directory that receives the transformed copies.
    pub output_dir: PathBuf,
    /// Add uniform per-channel noise.
    pub noise: bool,
    /// Apply Gaussian blur.
    pub blur: bool,
    /// Half-range of the uniform noise, in channel units.
    pub noise_strength: u32,
    /// Gaussian blur sigma, in pixels.
    pub blur_radius: f32,
    /// Fixed seed for the noise generator; OS entropy when `None`.
    pub seed: Option<u64>,
    /// Show per-file details.
    pub verbose: bool,
    /// Suppress all output except errors.
    pub quiet: bool,
}

impl Config {
    /// Default noise half-range.
    pub const DEFAULT_NOISE_STRENGTH: u32 = 20;
    /// Default blur sigma.
    pub const DEFAULT_BLUR_RADIUS: f32 = 2.0;

    /// Create a configuration with defaults and no transform selected.
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            noise: false,
            blur: false,
            noise_strength: Self::DEFAULT_NOISE_STRENGTH,
            blur_radius: Self::DEFAULT_BLUR_RADIUS,
            seed: None,
            verbose: false,
            quiet: false,
        }
    }

    /// Parse configuration from command-line arguments.
    ///
    /// The first item is the program name, as with `std::env::args`.
    pub fn parse<I, S>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString> + Clone,
    {
        Cli::try_parse_from(args).map(Config::from)
    }

    pub fn with_noise(mut self, strength: u32) -> Self {
        self.noise = true;
        self.noise_strength = strength;
        self
    }

    pub fn with_blur(mut self, radius: f32) -> Self {
        self.blur = true;
        self.blur_radius = radius;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self.verbose = false;
        self
    }

    /// Check the invariants the CLI parser enforces, for configs built in code.
    pub fn validate(&self) -> Result<()> {
        if !self.noise && !self.blur {
            return Err(Error::NoTransform);
        }
        if !self.blur_radius.is_finite() || self.blur_radius < 0.0 {
            return Err(Error::InvalidArgument {
                argument: String::from("--blur_radius"),
                reason: format!("'{}' is not a non-negative number", self.blur_radius),
            });
        }
        if self.quiet && self.verbose {
            return Err(Error::InvalidArgument {
                argument: String::from("--quiet, --verbose"),
                reason: String::from("Cannot use both --quiet and --verbose"),
            });
        }
        Ok(())
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            input: cli.input,
            output_dir: cli.output,
            noise: cli.noise,
            blur: cli.blur,
            noise_strength: cli.noise_strength,
            blur_radius: cli.blur_radius,
            seed: cli.seed,
            verbose: cli.verbose,
            quiet: cli.quiet,
        }
    }
}

/// Parse a blur radius (finite, non-negative).
fn parse_radius(value: &str) -> std::result::Result<f32, String> {
    let radius: f32 = value
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", value))?;
    if !radius.is_finite() || radius < 0.0 {
        return Err(String::from("Blur radius must be a non-negative number"));
    }
    Ok(radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_parse_noise_only() {
        let config = Config::parse(["obscura", "in.jpg", "out", "--noise"]).unwrap();
        assert_eq!(config.input, PathBuf::from("in.jpg"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert!(config.noise);
        assert!(!config.blur);
        assert_eq!(config.noise_strength, 20);
        assert_eq!(config.blur_radius, 2.0);
    }

    #[test]
    fn test_parse_both_transforms() {
        let config = Config::parse(["obscura", "photos/", "out", "--noise", "--blur"]).unwrap();
        assert!(config.noise);
        assert!(config.blur);
    }

    #[test]
    fn test_parse_underscore_flags() {
        let config = Config::parse([
            "obscura",
            "in",
            "out",
            "--noise",
            "--noise_strength",
            "35",
            "--blur",
            "--blur_radius",
            "4",
        ])
        .unwrap();
        assert_eq!(config.noise_strength, 35);
        assert_eq!(config.blur_radius, 4.0);
    }

    #[test]
    fn test_parse_dashed_aliases() {
        let config =
            Config::parse(["obscura", "in", "out", "--blur", "--blur-radius=0.5"]).unwrap();
        assert_eq!(config.blur_radius, 0.5);

        let config =
            Config::parse(["obscura", "in", "out", "--noise", "--noise-strength", "3"]).unwrap();
        assert_eq!(config.noise_strength, 3);
    }

    #[test]
    fn test_parse_seed() {
        let config = Config::parse(["obscura", "in", "out", "--noise", "--seed", "7"]).unwrap();
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_missing_transform() {
        let err = Config::parse(["obscura", "in", "out"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_missing_output() {
        let err = Config::parse(["obscura", "in", "--noise"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_negative_radius_rejected() {
        let result = Config::parse(["obscura", "in", "out", "--blur", "--blur_radius=-1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_strength_rejected() {
        let result = Config::parse(["obscura", "in", "out", "--noise", "--noise_strength=-5"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_quiet_and_verbose_conflict() {
        let err = Config::parse(["obscura", "in", "out", "--noise", "-q", "-v"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_validate() {
        let config = Config::new("in", "out");
        assert!(matches!(config.validate(), Err(Error::NoTransform)));

        assert!(Config::new("in", "out").with_noise(0).validate().is_ok());
        assert!(Config::new("in", "out").with_blur(-1.0).validate().is_err());
        assert!(Config::new("in", "out").with_blur(f32::NAN).validate().is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
