//! Obscura
//!
//! Batch obfuscate images with noise and/or blur, then strip their metadata.

use clap::Parser;
use obscura::cli::{Cli, Config};
use obscura::processor::Processor;
use obscura::terminal::{init_color, print_error, print_summary};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Usage errors exit with status 2.
    let config = Config::from(Cli::parse());

    let default_filter = if config.verbose {
        "obscura=debug"
    } else if config.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
    init_color();

    let mut processor = Processor::new(config);
    match processor.run() {
        Ok(report) if report.is_empty() => {
            if !processor.config().quiet {
                println!("No images found to process.");
            }
            ExitCode::SUCCESS
        }
        Ok(report) => {
            let config = processor.config();
            if !config.quiet {
                print_summary(&report.stats, &config.output_dir, config.verbose);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_error(&e.to_string());
            ExitCode::from(1)
        }
    }
}
