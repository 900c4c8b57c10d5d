//! JPEG metadata stripping.
//!
//! A JPEG is a sequence of `FF xx` marked segments. Application segments
//! carrying EXIF, XMP, ICC, IPTC and comments are dropped; the JFIF (APP0)
//! and Adobe (APP14) segments and every coding segment are copied verbatim,
//! as is the entropy-coded data following each SOS.

use crate::error::{Error, Result};
use std::path::Path;

mod markers {
    pub const PREFIX: u8 = 0xFF;

    pub const SOI: u8 = 0xD8;
    pub const EOI: u8 = 0xD9;
    pub const SOS: u8 = 0xDA;
    pub const TEM: u8 = 0x01;
    pub const RST0: u8 = 0xD0;
    pub const RST7: u8 = 0xD7;

    pub const APP0: u8 = 0xE0;
    pub const APP1: u8 = 0xE1;
    pub const APP13: u8 = 0xED;
    pub const APP14: u8 = 0xEE;
    pub const APP15: u8 = 0xEF;
    pub const COM: u8 = 0xFE;
}

/// APP1..APP13, APP15 and COM hold metadata. APP0 and APP14 affect decoding.
fn is_metadata_marker(marker: u8) -> bool {
    matches!(
        marker,
        markers::APP1..=markers::APP13 | markers::APP15 | markers::COM
    )
}

/// Markers without a length field.
fn is_standalone_marker(marker: u8) -> bool {
    marker == markers::TEM || (markers::RST0..=markers::RST7).contains(&marker)
}

/// Read the big-endian length of the segment starting at `pos` (just past
/// the marker) and return the end offset of the segment.
fn segment_end(data: &[u8], pos: usize, path: &Path) -> Result<usize> {
    let Some(bytes) = data.get(pos..pos + 2) else {
        return Err(Error::invalid_image(path, "Truncated segment header"));
    };
    let length = usize::from(u16::from_be_bytes([bytes[0], bytes[1]]));
    if length < 2 {
        return Err(Error::invalid_image(path, "Invalid segment length"));
    }
    let end = pos + length;
    if end > data.len() {
        return Err(Error::invalid_image(path, "Segment extends beyond file"));
    }
    Ok(end)
}

/// Find where the entropy-coded data starting at `pos` ends: the first
/// marker that is neither a stuffed zero nor a restart marker.
fn scan_end(data: &[u8], mut pos: usize) -> usize {
    while pos + 1 < data.len() {
        if data[pos] == markers::PREFIX {
            let next = data[pos + 1];
            if next != 0x00 && !(markers::RST0..=markers::RST7).contains(&next) {
                return pos;
            }
            pos += 2;
        } else {
            pos += 1;
        }
    }
    data.len()
}

/// Strip metadata from JPEG data.
pub fn strip(data: &[u8], path: &Path) -> Result<Vec<u8>> {
    if data.len() < 4 {
        return Err(Error::invalid_image(path, "File too small to be a valid JPEG"));
    }
    if data[0] != markers::PREFIX || data[1] != markers::SOI {
        return Err(Error::invalid_image(path, "Missing JPEG SOI marker"));
    }

    let mut output = Vec::with_capacity(data.len());
    output.extend_from_slice(&data[..2]);
    let mut pos = 2;

    while pos < data.len() {
        if data[pos] != markers::PREFIX {
            return Err(Error::invalid_image(
                path,
                format!("Expected marker at offset {}", pos),
            ));
        }

        // Fill bytes before a marker are optional; drop them.
        while pos < data.len() && data[pos] == markers::PREFIX {
            pos += 1;
        }
        let Some(&marker) = data.get(pos) else {
            break;
        };
        pos += 1;

        if marker == markers::EOI {
            output.extend_from_slice(&[markers::PREFIX, markers::EOI]);
            break;
        }

        if is_standalone_marker(marker) {
            output.extend_from_slice(&[markers::PREFIX, marker]);
            continue;
        }

        let end = segment_end(data, pos, path)?;

        if marker == markers::SOS {
            let scan_end = scan_end(data, end);
            output.extend_from_slice(&[markers::PREFIX, marker]);
            output.extend_from_slice(&data[pos..scan_end]);
            pos = scan_end;
            continue;
        }

        if !is_metadata_marker(marker) {
            output.extend_from_slice(&[markers::PREFIX, marker]);
            output.extend_from_slice(&data[pos..end]);
        }
        pos = end;
    }

    Ok(output)
}

/// Encode a small real JPEG for tests.
#[cfg(test)]
pub fn create_minimal_jpeg() -> Vec<u8> {
    use image::codecs::jpeg::JpegEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    let pixels: Vec<u8> = (0..8 * 8 * 3).map(|i| (i * 5 % 256) as u8).collect();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 90)
        .write_image(&pixels, 8, 8, ExtendedColorType::Rgb8)
        .unwrap();
    out
}

/// A minimal little-endian EXIF payload with a Make tag.
#[cfg(test)]
pub fn exif_payload(make: &str) -> Vec<u8> {
    let mut value = make.as_bytes().to_vec();
    value.push(0);
    while value.len() < 5 {
        value.push(0);
    }

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&1u16.to_le_bytes());
    // Make (271), ASCII, stored after the IFD.
    tiff.extend_from_slice(&271u16.to_le_bytes());
    tiff.extend_from_slice(&2u16.to_le_bytes());
    tiff.extend_from_slice(&(value.len() as u32).to_le_bytes());
    tiff.extend_from_slice(&26u32.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend_from_slice(&value);

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&tiff);
    payload
}

/// A real JPEG with an EXIF APP1 segment and a comment inserted after SOI.
#[cfg(test)]
pub fn create_jpeg_with_exif() -> Vec<u8> {
    fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
        let mut seg = vec![markers::PREFIX, marker];
        seg.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        seg.extend_from_slice(payload);
        seg
    }

    let base = create_minimal_jpeg();
    let mut data = base[..2].to_vec();
    data.extend(segment(markers::APP1, &exif_payload("Acme")));
    data.extend(segment(markers::COM, b"shot at home"));
    data.extend_from_slice(&base[2..]);
    data
}
