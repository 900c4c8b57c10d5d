//! Uniform per-channel noise.

use super::{load, save};
use crate::error::Result;
use image::{DynamicImage, RgbImage};
use rand::Rng;
use std::path::Path;
use tracing::debug;

/// Perturb every channel of every pixel by an independent uniform integer in
/// `[-strength, strength)`, clamped to `0..=255`.
///
/// A strength of zero leaves the image untouched.
pub fn apply_noise<R: Rng + ?Sized>(image: &mut RgbImage, strength: u32, rng: &mut R) {
    if strength == 0 {
        return;
    }

    let strength = i64::from(strength);
    for channel in image.iter_mut() {
        let delta = rng.random_range(-strength..strength);
        *channel = (i64::from(*channel) + delta).clamp(0, 255) as u8;
    }
}

/// Read `src` as RGB, add noise, and write the result to `dst`.
///
/// Any alpha channel is dropped. Returns [`Error::Decode`](crate::Error::Decode)
/// when `src` cannot be read, in which case nothing is written.
pub fn add_noise<R: Rng + ?Sized>(
    src: &Path,
    dst: &Path,
    strength: u32,
    rng: &mut R,
) -> Result<()> {
    let mut pixels = load(src)?.to_rgb8();
    debug!(
        src = %src.display(),
        width = pixels.width(),
        height = pixels.height(),
        strength,
        "adding noise"
    );

    apply_noise(&mut pixels, strength, rng);
    save(&DynamicImage::ImageRgb8(pixels), dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use image::Rgb;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 8) as u8, (y * 8) as u8, ((x + y) * 4) as u8])
        })
    }

    #[test]
    fn test_noise_stays_within_bounds() {
        let original = gradient(32, 32);
        let mut noisy = original.clone();
        let mut rng = StdRng::seed_from_u64(42);
        let strength = 20;

        apply_noise(&mut noisy, strength, &mut rng);

        for (before, after) in original.iter().zip(noisy.iter()) {
            let lo = before.saturating_sub(strength as u8);
            let hi = before.saturating_add(strength as u8);
            assert!(
                (lo..=hi).contains(after),
                "{after} outside [{lo}, {hi}] for original {before}"
            );
        }
        assert_ne!(original, noisy);
    }

    #[test]
    fn test_zero_strength_is_identity() {
        let original = gradient(8, 8);
        let mut noisy = original.clone();
        apply_noise(&mut noisy, 0, &mut StdRng::seed_from_u64(1));
        assert_eq!(original, noisy);
    }

    #[test]
    fn test_large_strength_saturates() {
        let mut noisy = RgbImage::from_pixel(16, 16, Rgb([128, 128, 128]));
        apply_noise(&mut noisy, 4_000_000_000, &mut StdRng::seed_from_u64(3));
        assert!(noisy.iter().all(|&c| c == 0 || c == 255));
    }

    #[test]
    fn test_same_seed_same_noise() {
        let mut a = gradient(16, 16);
        let mut b = gradient(16, 16);
        apply_noise(&mut a, 30, &mut StdRng::seed_from_u64(9));
        apply_noise(&mut b, 30, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_add_noise_writes_rgb_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.png");
        let dst = dir.path().join("out.png");
        DynamicImage::ImageRgba8(image::RgbaImage::new(10, 6))
            .save(&src)
            .unwrap();

        add_noise(&src, &dst, 10, &mut StdRng::seed_from_u64(5)).unwrap();

        let out = image::open(&dst).unwrap();
        assert_eq!((out.width(), out.height()), (10, 6));
        assert_eq!(out.color(), image::ColorType::Rgb8);
    }

    #[test]
    fn test_add_noise_unreadable_source() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("broken.jpg");
        let dst = dir.path().join("out.jpg");
        std::fs::write(&src, b"definitely not a jpeg").unwrap();

        let err = add_noise(&src, &dst, 10, &mut StdRng::seed_from_u64(5)).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
        assert!(!dst.exists());
    }
}
