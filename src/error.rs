//! Error types for Obscura.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Obscura operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving, transforming or cleaning images.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error with optional path context.
    #[error("{}", io_message(source, path.as_ref()))]
    Io {
        #[source]
        source: io::Error,
        path: Option<PathBuf>,
    },

    /// Input path is neither a regular file nor a directory.
    #[error("Input path must be an image file or directory: '{}'", path.display())]
    InvalidInput { path: PathBuf },

    /// Structurally invalid image container.
    #[error("Invalid image '{}': {reason}", path.display())]
    InvalidImage { path: PathBuf, reason: String },

    /// Container format we cannot strip.
    #[error("{}", unsupported_message(path, detected.as_deref()))]
    UnsupportedFormat {
        path: PathBuf,
        detected: Option<String>,
    },

    /// The image could not be read or decoded.
    #[error("Could not read '{}': {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The image could not be encoded or written.
    #[error("Could not write '{}': {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Invalid configuration value.
    #[error("Invalid argument '{argument}': {reason}")]
    InvalidArgument { argument: String, reason: String },

    /// Neither noise nor blur was requested.
    #[error("You must specify at least --noise or --blur")]
    NoTransform,

    /// File not found.
    #[error("File not found: '{}'", path.display())]
    NotFound { path: PathBuf },

    /// Permission denied.
    #[error("Permission denied: '{}'", path.display())]
    PermissionDenied { path: PathBuf },
}

fn io_message(source: &io::Error, path: Option<&PathBuf>) -> String {
    match path {
        Some(p) => format!("I/O error for '{}': {}", p.display(), source),
        None => format!("I/O error: {}", source),
    }
}

fn unsupported_message(path: &std::path::Path, detected: Option<&str>) -> String {
    match detected {
        Some(fmt) => format!("Unsupported format '{}' for '{}'", fmt, path.display()),
        None => format!("Unknown or unsupported format for '{}'", path.display()),
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io {
            source: err,
            path: None,
        }
    }
}

impl Error {
    /// Create an I/O error with path context.
    pub fn io_with_path(err: io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound => Error::NotFound { path },
            io::ErrorKind::PermissionDenied => Error::PermissionDenied { path },
            _ => Error::Io {
                source: err,
                path: Some(path),
            },
        }
    }

    /// Create an invalid image error.
    pub fn invalid_image(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::InvalidImage {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported format error.
    pub fn unsupported_format(path: impl Into<PathBuf>, detected: Option<&str>) -> Self {
        Error::UnsupportedFormat {
            path: path.into(),
            detected: detected.map(String::from),
        }
    }

    /// Wrap a decode failure from the `image` crate.
    ///
    /// Plain I/O failures (missing file, permissions) are still reported as
    /// decode failures: either way the input cannot be read.
    pub fn decode(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Error::Decode {
            path: path.into(),
            source,
        }
    }

    /// Wrap an encode failure from the `image` crate.
    pub fn encode(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Error::Encode {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the input image itself was unreadable.
    pub fn is_unreadable_input(&self) -> bool {
        matches!(self, Error::Decode { .. })
    }
}
