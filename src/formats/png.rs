//! PNG metadata stripping.
//!
//! A PNG is a signature followed by `length | type | data | crc` chunks.
//! Text, EXIF and timestamp chunks are dropped; every other chunk is copied
//! byte-for-byte, CRC included, so nothing needs re-checksumming.

use crate::error::{Error, Result};
use std::path::Path;

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Chunk types that carry metadata.
const METADATA_CHUNKS: &[&[u8; 4]] = &[b"tEXt", b"zTXt", b"iTXt", b"eXIf", b"tIME"];

fn is_metadata_chunk(chunk_type: &[u8]) -> bool {
    METADATA_CHUNKS.iter().any(|m| m.as_slice() == chunk_type)
}

/// A chunk located inside the source buffer.
struct RawChunk<'a> {
    chunk_type: &'a [u8],
    /// The whole chunk: length, type, data and CRC.
    bytes: &'a [u8],
}

/// Split PNG data into chunks, stopping after IEND.
fn chunks<'a>(data: &'a [u8], path: &Path) -> Result<Vec<RawChunk<'a>>> {
    let mut found = Vec::new();
    let mut pos = PNG_SIGNATURE.len();

    while pos < data.len() {
        let Some(header) = data.get(pos..pos + 8) else {
            return Err(Error::invalid_image(path, "Truncated chunk header"));
        };
        let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let end = pos
            .checked_add(12)
            .and_then(|n| n.checked_add(length))
            .filter(|&end| end <= data.len())
            .ok_or_else(|| Error::invalid_image(path, "Truncated chunk data"))?;

        let chunk = RawChunk {
            chunk_type: &header[4..8],
            bytes: &data[pos..end],
        };
        let is_end = chunk.chunk_type == b"IEND";
        found.push(chunk);
        pos = end;

        if is_end {
            break;
        }
    }

    Ok(found)
}

/// Strip metadata from PNG data.
pub fn strip(data: &[u8], path: &Path) -> Result<Vec<u8>> {
    if !data.starts_with(&PNG_SIGNATURE) {
        return Err(Error::invalid_image(path, "Invalid PNG signature"));
    }

    let chunks = chunks(data, path)?;

    if chunks.first().map(|c| c.chunk_type) != Some(b"IHDR".as_slice()) {
        return Err(Error::invalid_image(path, "Missing IHDR chunk"));
    }
    if chunks.last().map(|c| c.chunk_type) != Some(b"IEND".as_slice()) {
        return Err(Error::invalid_image(path, "Missing IEND chunk"));
    }

    let mut output = Vec::with_capacity(data.len());
    output.extend_from_slice(&PNG_SIGNATURE);
    for chunk in chunks
        .iter()
        .filter(|c| !is_metadata_chunk(c.chunk_type))
    {
        output.extend_from_slice(chunk.bytes);
    }

    Ok(output)
}
