//! Input path resolution.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions picked up when scanning a directory (compared lowercased).
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".bmp", ".tiff"];

/// Check if a file name ends with a supported image extension.
pub fn is_supported_image(path: &Path) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy().to_lowercase();
    SUPPORTED_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Resolve an input path into the list of images to process.
///
/// A regular file is returned as-is whatever its extension. A directory is
/// scanned non-recursively for files with a supported extension; the result
/// is sorted so runs are reproducible across platforms.
pub fn image_paths(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    if !input.is_dir() {
        return Err(Error::InvalidInput {
            path: input.to_path_buf(),
        });
    }

    let entries = fs::read_dir(input).map_err(|e| Error::io_with_path(e, input))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io_with_path(e, input))?;
        let path = entry.path();

        if path.is_file() && is_supported_image(&path) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
