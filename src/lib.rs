//! Obscura
//!
//! Batch image obfuscation: random noise, Gaussian blur, and metadata
//! removal for single images or whole directories.
//!
//! # Supported Formats
//!
//! - JPEG (.jpg, .jpeg)
//! - PNG (.png)
//! - BMP (.bmp)
//! - TIFF (.tiff)
//!
//! # Example
//!
//! ```no_run
//! use obscura::cli::Config;
//! use obscura::processor::Processor;
//!
//! let config = Config::new("photos/", "out/").with_noise(20).with_blur(2.0);
//! let mut processor = Processor::new(config);
//! let report = processor.run().unwrap();
//! println!("Processed {} image(s)", report.stats.total());
//! ```

pub mod cli;
pub mod error;
pub mod formats;
pub mod paths;
pub mod processor;
pub mod terminal;
pub mod transform;

pub use cli::Config;
pub use error::{Error, Result};
pub use formats::{ImageFormat, detect_format, strip_file, strip_metadata};
pub use paths::{image_paths, is_supported_image};
pub use processor::{FileReport, MetadataOutcome, Outcome, Processor, RunReport};
pub use terminal::{ProcessingStats, print_error, print_info, print_success, print_warning};
pub use transform::{add_noise, apply_blur, apply_noise, blur_file};
