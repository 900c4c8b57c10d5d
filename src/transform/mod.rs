//! Pixel transforms.
//!
//! Each transform has a pure in-memory form (`apply_*`) and a file form that
//! decodes the source, applies it, and encodes the destination in the format
//! implied by its extension.

pub mod blur;
pub mod noise;

pub use blur::{apply_blur, blur_file};
pub use noise::{add_noise, apply_noise};

use crate::error::{Error, Result};
use image::DynamicImage;
use std::path::Path;

/// Decode an image file.
pub(crate) fn load(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|e| Error::decode(path, e))
}

/// Encode an image to `path`, picking the format from the extension.
pub(crate) fn save(image: &DynamicImage, path: &Path) -> Result<()> {
    image.save(path).map_err(|e| Error::encode(path, e))
}
