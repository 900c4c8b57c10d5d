//! TIFF metadata stripping.
//!
//! A TIFF is a header followed by a chain of Image File Directories (IFDs),
//! each a list of 12-byte `tag | type | count | value-or-offset` entries.
//! Metadata lives in descriptive ASCII tags and in the EXIF, GPS and
//! interoperability sub-IFDs.
//!
//! Rather than relocating strips and tiles, each IFD is compacted in place:
//! metadata entries are removed, the remaining entries shifted up, and the
//! freed slots zeroed. Out-of-line values and sub-IFDs referenced by removed
//! entries are zeroed too, so the file keeps its size and every image data
//! offset stays valid.

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::path::Path;

/// Byte order of multi-byte fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    fn read_u16(self, bytes: &[u8]) -> u16 {
        let raw = [bytes[0], bytes[1]];
        match self {
            ByteOrder::Little => u16::from_le_bytes(raw),
            ByteOrder::Big => u16::from_be_bytes(raw),
        }
    }

    fn read_u32(self, bytes: &[u8]) -> u32 {
        let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];
        match self {
            ByteOrder::Little => u32::from_le_bytes(raw),
            ByteOrder::Big => u32::from_be_bytes(raw),
        }
    }

    fn u16_bytes(self, value: u16) -> [u8; 2] {
        match self {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        }
    }

    fn u32_bytes(self, value: u32) -> [u8; 4] {
        match self {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        }
    }
}

mod tags {
    pub const IMAGE_DESCRIPTION: u16 = 270;
    pub const MAKE: u16 = 271;
    pub const MODEL: u16 = 272;
    pub const SOFTWARE: u16 = 305;
    pub const DATE_TIME: u16 = 306;
    pub const ARTIST: u16 = 315;
    pub const HOST_COMPUTER: u16 = 316;
    pub const XMP: u16 = 700;
    pub const COPYRIGHT: u16 = 33432;
    pub const IPTC: u16 = 33723;
    pub const PHOTOSHOP: u16 = 34377;
    pub const EXIF_IFD: u16 = 34665;
    pub const GPS_IFD: u16 = 34853;
    pub const INTEROPERABILITY_IFD: u16 = 40965;
}

const METADATA_TAGS: &[u16] = &[
    tags::IMAGE_DESCRIPTION,
    tags::MAKE,
    tags::MODEL,
    tags::SOFTWARE,
    tags::DATE_TIME,
    tags::ARTIST,
    tags::HOST_COMPUTER,
    tags::XMP,
    tags::COPYRIGHT,
    tags::IPTC,
    tags::PHOTOSHOP,
    tags::EXIF_IFD,
    tags::GPS_IFD,
    tags::INTEROPERABILITY_IFD,
];

/// Tags whose value is the offset of a nested IFD full of metadata.
const SUB_IFD_POINTERS: &[u16] = &[tags::EXIF_IFD, tags::GPS_IFD, tags::INTEROPERABILITY_IFD];

/// Longest IFD chain followed before the file is considered malformed.
const MAX_IFDS: usize = 1024;

/// Nested sub-IFDs followed when blanking (EXIF -> interoperability).
const MAX_SUB_IFD_DEPTH: usize = 4;

fn is_metadata_tag(tag: u16) -> bool {
    METADATA_TAGS.contains(&tag)
}

/// Size in bytes of one value of a TIFF field type.
fn type_size(field_type: u16) -> usize {
    match field_type {
        1 | 2 | 6 | 7 => 1,  // BYTE, ASCII, SBYTE, UNDEFINED
        3 | 8 => 2,          // SHORT, SSHORT
        4 | 9 | 11 | 13 => 4, // LONG, SLONG, FLOAT, IFD
        5 | 10 | 12 => 8,    // RATIONAL, SRATIONAL, DOUBLE
        _ => 1,
    }
}

/// One IFD entry, with its raw 12 bytes.
#[derive(Debug, Clone, Copy)]
struct Entry {
    tag: u16,
    field_type: u16,
    count: u32,
    raw: [u8; 12],
}

impl Entry {
    fn parse(bytes: &[u8], order: ByteOrder) -> Self {
        let mut raw = [0u8; 12];
        raw.copy_from_slice(&bytes[..12]);
        Self {
            tag: order.read_u16(&raw[0..]),
            field_type: order.read_u16(&raw[2..]),
            count: order.read_u32(&raw[4..]),
            raw,
        }
    }

    fn value_u32(&self, order: ByteOrder) -> u32 {
        order.read_u32(&self.raw[8..])
    }

    /// Byte range of the value when it is stored outside the entry.
    fn out_of_line(&self, order: ByteOrder) -> Option<(usize, usize)> {
        let size = type_size(self.field_type).checked_mul(self.count as usize)?;
        if size <= 4 {
            return None;
        }
        let start = self.value_u32(order) as usize;
        Some((start, start.checked_add(size)?))
    }
}

/// A parsed directory and the byte span it occupies.
struct Ifd {
    offset: usize,
    entries: Vec<Entry>,
    next: u32,
}

impl Ifd {
    fn len(&self) -> usize {
        2 + 12 * self.entries.len() + 4
    }
}

fn read_ifd(data: &[u8], offset: usize, order: ByteOrder) -> Option<Ifd> {
    let count = usize::from(order.read_u16(data.get(offset..offset + 2)?));
    let entries_end = offset + 2 + 12 * count;
    let next = order.read_u32(data.get(entries_end..entries_end + 4)?);

    let entries = data[offset + 2..entries_end]
        .chunks_exact(12)
        .map(|raw| Entry::parse(raw, order))
        .collect();

    Some(Ifd {
        offset,
        entries,
        next,
    })
}

/// Zero `start..end` if it lies within the file. Returns bytes zeroed.
fn blank(data: &mut [u8], start: usize, end: usize) -> u64 {
    match data.get_mut(start..end) {
        Some(range) => {
            range.fill(0);
            (end - start) as u64
        }
        None => 0,
    }
}

/// Zero a removed entry's out-of-line value and, for sub-IFD pointers, the
/// whole nested directory.
fn blank_entry_data(
    data: &mut [u8],
    entry: &Entry,
    order: ByteOrder,
    depth: usize,
    visited: &mut HashSet<usize>,
) -> u64 {
    if SUB_IFD_POINTERS.contains(&entry.tag) {
        let offset = entry.value_u32(order) as usize;
        return blank_sub_ifd(data, offset, order, depth + 1, visited);
    }
    match entry.out_of_line(order) {
        Some((start, end)) => blank(data, start, end),
        None => 0,
    }
}

fn blank_sub_ifd(
    data: &mut [u8],
    offset: usize,
    order: ByteOrder,
    depth: usize,
    visited: &mut HashSet<usize>,
) -> u64 {
    if offset == 0 || depth > MAX_SUB_IFD_DEPTH || !visited.insert(offset) {
        return 0;
    }
    let Some(ifd) = read_ifd(data, offset, order) else {
        return 0;
    };

    let mut blanked = 0;
    for entry in &ifd.entries {
        blanked += blank_entry_data(data, entry, order, depth, visited);
    }
    blanked + blank(data, ifd.offset, ifd.offset + ifd.len())
}

/// Remove metadata from one IFD in place. Returns bytes removed or zeroed.
fn scrub_ifd(data: &mut [u8], ifd: &Ifd, order: ByteOrder, visited: &mut HashSet<usize>) -> u64 {
    let (removed, kept): (Vec<Entry>, Vec<Entry>) =
        ifd.entries.iter().partition(|e| is_metadata_tag(e.tag));
    if removed.is_empty() {
        return 0;
    }

    let mut blanked = 0;
    for entry in &removed {
        blanked += blank_entry_data(data, entry, order, 0, visited);
    }

    let mut pos = ifd.offset;
    data[pos..pos + 2].copy_from_slice(&order.u16_bytes(kept.len() as u16));
    pos += 2;
    for entry in &kept {
        data[pos..pos + 12].copy_from_slice(&entry.raw);
        pos += 12;
    }
    data[pos..pos + 4].copy_from_slice(&order.u32_bytes(ifd.next));
    pos += 4;

    let freed = blank(data, pos, ifd.offset + ifd.len());
    blanked + freed
}

/// Strip metadata from TIFF data in place.
///
/// Returns the number of bytes removed from directories or zeroed.
pub fn strip_in_place(data: &mut [u8], path: &Path) -> Result<u64> {
    if data.len() < 8 {
        return Err(Error::invalid_image(path, "File too small to be a valid TIFF"));
    }

    let order = match &data[0..2] {
        b"II" => ByteOrder::Little,
        b"MM" => ByteOrder::Big,
        _ => return Err(Error::invalid_image(path, "Invalid TIFF byte order marker")),
    };
    if order.read_u16(&data[2..]) != 42 {
        return Err(Error::invalid_image(path, "Invalid TIFF magic number"));
    }

    let mut offset = order.read_u32(&data[4..]) as usize;
    let mut visited = HashSet::new();
    let mut total = 0;

    while offset != 0 {
        if visited.len() >= MAX_IFDS || !visited.insert(offset) {
            return Err(Error::invalid_image(path, "IFD chain loops or is too long"));
        }
        let ifd = read_ifd(data, offset, order)
            .ok_or_else(|| Error::invalid_image(path, format!("Truncated IFD at offset {}", offset)))?;

        total += scrub_ifd(data, &ifd, order, &mut visited);
        offset = ifd.next as usize;
    }

    Ok(total)
}

/// Builds small uncompressed grayscale TIFFs for tests.
#[cfg(test)]
mod fixtures {
    use super::*;

    pub const DATE: &[u8; 20] = b"2024:06:21 12:00:00\0";
    pub const MAKE: &[u8; 5] = b"Acme\0";

    fn entry(out: &mut Vec<u8>, order: ByteOrder, tag: u16, field_type: u16, count: u32, value: [u8; 4]) {
        out.extend_from_slice(&order.u16_bytes(tag));
        out.extend_from_slice(&order.u16_bytes(field_type));
        out.extend_from_slice(&order.u32_bytes(count));
        out.extend_from_slice(&value);
    }

    fn short(order: ByteOrder, value: u16) -> [u8; 4] {
        let b = order.u16_bytes(value);
        [b[0], b[1], 0, 0]
    }

    /// A 2x1 8-bit grayscale TIFF. With `metadata`, IFD0 also carries Make,
    /// Software and an EXIF sub-IFD holding DateTimeOriginal.
    pub fn sample_tiff(order: ByteOrder, metadata: bool) -> Vec<u8> {
        let entry_count: usize = if metadata { 12 } else { 9 };
        let ifd0_end = 8 + 2 + 12 * entry_count + 4;
        let make_at = ifd0_end;
        let exif_at = make_at + 6;
        let date_at = exif_at + 2 + 12 + 4;
        let strip_at = if metadata { date_at + DATE.len() } else { ifd0_end };

        let mut out = match order {
            ByteOrder::Little => b"II".to_vec(),
            ByteOrder::Big => b"MM".to_vec(),
        };
        out.extend_from_slice(&order.u16_bytes(42));
        out.extend_from_slice(&order.u32_bytes(8));
        out.extend_from_slice(&order.u16_bytes(entry_count as u16));

        entry(&mut out, order, 256, 3, 1, short(order, 2));
        entry(&mut out, order, 257, 3, 1, short(order, 1));
        entry(&mut out, order, 258, 3, 1, short(order, 8));
        entry(&mut out, order, 259, 3, 1, short(order, 1));
        entry(&mut out, order, 262, 3, 1, short(order, 1));
        if metadata {
            entry(&mut out, order, tags::MAKE, 2, 5, order.u32_bytes(make_at as u32));
        }
        entry(&mut out, order, 273, 4, 1, order.u32_bytes(strip_at as u32));
        entry(&mut out, order, 277, 3, 1, short(order, 1));
        entry(&mut out, order, 278, 4, 1, order.u32_bytes(1));
        entry(&mut out, order, 279, 4, 1, order.u32_bytes(2));
        if metadata {
            entry(&mut out, order, tags::SOFTWARE, 2, 3, *b"ob\0\0");
            entry(&mut out, order, tags::EXIF_IFD, 4, 1, order.u32_bytes(exif_at as u32));
        }
        out.extend_from_slice(&order.u32_bytes(0));

        if metadata {
            out.extend_from_slice(MAKE);
            out.push(0);
            out.extend_from_slice(&order.u16_bytes(1));
            entry(&mut out, order, 36867, 2, DATE.len() as u32, order.u32_bytes(date_at as u32));
            out.extend_from_slice(&order.u32_bytes(0));
            out.extend_from_slice(DATE);
        }
        assert_eq!(out.len(), strip_at);
        out.extend_from_slice(&[0x10, 0xF0]);
        out
    }

    pub fn tags_of(data: &[u8]) -> Vec<u16> {
        let order = if &data[0..2] == b"II" { ByteOrder::Little } else { ByteOrder::Big };
        let offset = order.read_u32(&data[4..]) as usize;
        read_ifd(data, offset, order)
            .unwrap()
            .entries
            .iter()
            .map(|e| e.tag)
            .collect()
    }
}
