//! Top-level sfnt table directory.
//!
//! Decodes the 12-byte header and the table records, verifies the
//! whole-file checksum and the `head` table checksum, and hands out
//! bounds-checked slices per table tag.

use std::collections::HashMap;

use crate::error::{FontError, Result};
use crate::font::reader::ByteReader;

const SFNT_VERSION_TRUETYPE: u32 = 0x00010000;
const FILE_CHECKSUM: u32 = 0xB1B0AFBA;

/// Tables the decoder cannot work without.
pub(crate) const REQUIRED_TABLES: &[&[u8; 4]] = &[
    b"head", b"maxp", b"OS/2", b"hhea", b"hmtx", b"name", b"cmap", b"loca", b"glyf",
];

#[derive(Debug, Clone, Copy)]
struct TableRecord {
    checksum: u32,
    offset: u32,
    length: u32,
}

/// The decoded table directory of one font file.
#[derive(Debug)]
pub(crate) struct TableDirectory<'a> {
    data: &'a [u8],
    records: HashMap<[u8; 4], TableRecord>,
    pub glyf_checksum: u32,
}

/// Sum of the data interpreted as big-endian u32 words; the tail is
/// zero-padded to a whole word.
pub(crate) fn sfnt_checksum(data: &[u8]) -> u32 {
    let mut sum = 0u32;
    let mut chunks = data.chunks_exact(4);
    for word in chunks.by_ref() {
        sum = sum.wrapping_add(u32::from_be_bytes([word[0], word[1], word[2], word[3]]));
    }
    let tail = chunks.remainder();
    if !tail.is_empty() {
        let mut word = [0u8; 4];
        word[..tail.len()].copy_from_slice(tail);
        sum = sum.wrapping_add(u32::from_be_bytes(word));
    }
    sum
}

impl<'a> TableDirectory<'a> {
    /// Parses the directory, running the checksum gate and the per-entry
    /// bounds checks of the load sequence.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if sfnt_checksum(data) != FILE_CHECKSUM {
            return Err(FontError::CorruptChecksum(
                "file checksum does not sum to 0xB1B0AFBA".to_string(),
            ));
        }

        let mut reader = ByteReader::new(data);
        let version = reader.read_u32()?;
        if version != SFNT_VERSION_TRUETYPE {
            return Err(FontError::UnsupportedVersion(version));
        }
        let num_tables = reader.read_u16()?;
        reader.skip(6)?; // searchRange, entrySelector, rangeShift

        let mut records = HashMap::new();
        let mut glyf_checksum = 0;
        for _ in 0..num_tables {
            let tag = reader.read_tag()?;
            let checksum = reader.read_u32()?;
            let offset = reader.read_u32()?;
            let length = reader.read_u32()?;
            let end = (offset as u64).checked_add(length as u64);
            match end {
                Some(end) if end <= data.len() as u64 => {}
                _ => {
                    return Err(FontError::CorruptFormat(format!(
                        "table {} exceeds file bounds",
                        String::from_utf8_lossy(&tag)
                    )))
                }
            }
            if &tag == b"glyf" {
                glyf_checksum = checksum;
            }
            records.insert(
                tag,
                TableRecord {
                    checksum,
                    offset,
                    length,
                },
            );
        }

        let dir = Self {
            data,
            records,
            glyf_checksum,
        };

        for &tag in REQUIRED_TABLES {
            if !dir.records.contains_key(tag) {
                return Err(FontError::MissingTable(tag_name(tag)));
            }
        }
        dir.verify_head_checksum()?;

        Ok(dir)
    }

    /// The stored `head` checksum is defined over the table with its
    /// `checkSumAdjustment` field zeroed, so that contribution is removed
    /// before comparing. Other tables' checksums are not enforced: too
    /// many real-world producers get them wrong.
    fn verify_head_checksum(&self) -> Result<()> {
        let head = self.required(b"head")?;
        let record = self.records[b"head"];
        if head.len() < 12 {
            return Err(FontError::CorruptFormat("head table too short".to_string()));
        }
        let adjustment = u32::from_be_bytes([head[8], head[9], head[10], head[11]]);
        let sum = sfnt_checksum(head).wrapping_sub(adjustment);
        if sum != record.checksum {
            return Err(FontError::CorruptChecksum(
                "head table checksum mismatch".to_string(),
            ));
        }
        Ok(())
    }

    pub fn table(&self, tag: &[u8; 4]) -> Option<&'a [u8]> {
        let record = self.records.get(tag)?;
        Some(&self.data[record.offset as usize..(record.offset + record.length) as usize])
    }

    pub fn required(&self, tag: &'static [u8; 4]) -> Result<&'a [u8]> {
        self.table(tag)
            .ok_or_else(|| FontError::MissingTable(tag_name(tag)))
    }

    pub fn reader(&self, tag: &'static [u8; 4]) -> Result<ByteReader<'a>> {
        Ok(ByteReader::new(self.required(tag)?))
    }
}

fn tag_name(tag: &'static [u8; 4]) -> &'static str {
    std::str::from_utf8(tag).unwrap_or("????")
}
