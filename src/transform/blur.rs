//! Gaussian blur.

use super::{load, save};
use crate::error::Result;
use image::DynamicImage;
use std::path::Path;
use tracing::debug;

/// Blur the whole image with an isotropic Gaussian of standard deviation
/// `radius`. Dimensions and color type are preserved.
///
/// A radius of zero returns an unmodified copy.
pub fn apply_blur(image: &DynamicImage, radius: f32) -> DynamicImage {
    if radius <= 0.0 {
        return image.clone();
    }
    image.blur(radius)
}

/// Read `src`, blur it, and write the result to `dst`.
///
/// Returns [`Error::Decode`](crate::Error::Decode) when `src` cannot be read.
pub fn blur_file(src: &Path, dst: &Path, radius: f32) -> Result<()> {
    let image = load(src)?;
    debug!(
        src = %src.display(),
        width = image.width(),
        height = image.height(),
        radius,
        "blurring"
    );

    save(&apply_blur(&image, radius), dst)
}
