//! Image format detection and metadata stripping.
//!
//! Format is detected from magic bytes, then each container has its own
//! stripper that removes metadata while leaving the pixel data untouched.

pub mod jpeg;
pub mod png;
pub mod tiff;

use crate::error::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Containers the stripper understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Tiff,
    Bmp,
}

impl ImageFormat {
    /// Get the format name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Png => "PNG",
            ImageFormat::Tiff => "TIFF",
            ImageFormat::Bmp => "BMP",
        }
    }
}

/// Magic bytes for format detection.
mod magic {
    pub const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF];
    pub const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    /// "II*\0"
    pub const TIFF_LE: &[u8] = &[0x49, 0x49, 0x2A, 0x00];
    /// "MM\0*"
    pub const TIFF_BE: &[u8] = &[0x4D, 0x4D, 0x00, 0x2A];
    pub const BMP: &[u8] = b"BM";
}

/// Detect image format from magic bytes.
pub fn detect_format(data: &[u8]) -> Option<ImageFormat> {
    if data.starts_with(magic::JPEG) {
        Some(ImageFormat::Jpeg)
    } else if data.starts_with(magic::PNG) {
        Some(ImageFormat::Png)
    } else if data.starts_with(magic::TIFF_LE) || data.starts_with(magic::TIFF_BE) {
        Some(ImageFormat::Tiff)
    } else if data.len() >= 14 && data.starts_with(magic::BMP) {
        Some(ImageFormat::Bmp)
    } else {
        None
    }
}

/// Result of stripping metadata from an image.
#[derive(Debug)]
pub struct StripResult {
    /// The cleaned image data.
    pub data: Vec<u8>,
    /// Bytes of metadata removed, or blanked for formats edited in place.
    pub metadata_bytes: u64,
}

/// Strip metadata from image data.
pub fn strip_metadata(data: &[u8], path: &Path) -> Result<StripResult> {
    let format = detect_format(data).ok_or_else(|| {
        let ext = path.extension().map(|e| e.to_string_lossy().to_uppercase());
        Error::unsupported_format(path, ext.as_deref())
    })?;

    let result = match format {
        ImageFormat::Jpeg => {
            let cleaned = jpeg::strip(data, path)?;
            let removed = data.len().saturating_sub(cleaned.len()) as u64;
            StripResult {
                data: cleaned,
                metadata_bytes: removed,
            }
        }
        ImageFormat::Png => {
            let cleaned = png::strip(data, path)?;
            let removed = data.len().saturating_sub(cleaned.len()) as u64;
            StripResult {
                data: cleaned,
                metadata_bytes: removed,
            }
        }
        ImageFormat::Tiff => {
            let mut cleaned = data.to_vec();
            let blanked = tiff::strip_in_place(&mut cleaned, path)?;
            StripResult {
                data: cleaned,
                metadata_bytes: blanked,
            }
        }
        // BMP has no metadata container.
        ImageFormat::Bmp => StripResult {
            data: data.to_vec(),
            metadata_bytes: 0,
        },
    };

    debug!(
        path = %path.display(),
        format = format.name(),
        bytes = result.metadata_bytes,
        "stripped metadata"
    );
    Ok(result)
}

/// Strip metadata from a file on disk, replacing it atomically.
///
/// Returns the number of metadata bytes removed. The file is left untouched
/// when there was nothing to remove.
pub fn strip_file(path: &Path) -> Result<u64> {
    let data = fs::read(path).map_err(|e| Error::io_with_path(e, path))?;
    let result = strip_metadata(&data, path)?;

    if result.data == data {
        return Ok(0);
    }

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path)
        .map_err(|e| Error::io_with_path(e, path))?
        .permissions();

    let mut tmp = tempfile::Builder::new()
        .prefix(".obscura-strip-")
        .tempfile_in(dir)
        .map_err(|e| Error::io_with_path(e, dir))?;
    let tmp_path = tmp.path().to_path_buf();
    tmp.write_all(&result.data)
        .map_err(|e| Error::io_with_path(e, &tmp_path))?;
    // The temp file is created owner-only; the replacement keeps the original mode.
    tmp.as_file()
        .set_permissions(permissions)
        .map_err(|e| Error::io_with_path(e, &tmp_path))?;
    tmp.persist(path)
        .map_err(|e| Error::io_with_path(e.error, path))?;

    Ok(result.metadata_bytes)
}
