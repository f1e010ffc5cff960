//! `cmap` decoding: character-to-glyph mapping and Unicode coverage.
//!
//! A format-12 subtable is preferred when present because it reaches the
//! supplementary planes; otherwise a format-4 subtable is required. Both
//! walks also accumulate the 163-range BMP coverage set used by font
//! matching.

use crate::error::{FontError, Result};
use crate::font::ranges::UnicodeRangeSet;
use crate::font::reader::ByteReader;

/// Hostile subtables are not allowed to request unbounded pair storage.
const MAX_CHAR_COUNT: usize = 1 << 21;

/// Sorted code-point to glyph-index mapping of one font.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharMap {
    /// Strictly ascending (after the post-decode sort) code points.
    pub codes: Vec<u32>,
    /// Glyph index per entry of `codes`.
    pub glyph_ids: Vec<u32>,
}

impl CharMap {
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Binary search over the sorted code array.
    pub fn find(&self, code: u32) -> Option<usize> {
        self.codes
            .binary_search(&code)
            .ok()
            .map(|i| self.glyph_ids[i] as usize)
    }

    /// Stable sort of the paired arrays by code point.
    pub(crate) fn sort_by_code(&mut self) {
        let mut pairs: Vec<(u32, u32)> = self
            .codes
            .iter()
            .copied()
            .zip(self.glyph_ids.iter().copied())
            .collect();
        pairs.sort_by_key(|&(code, _)| code);
        for (i, (code, glyph)) in pairs.into_iter().enumerate() {
            self.codes[i] = code;
            self.glyph_ids[i] = glyph;
        }
    }
}

pub(crate) struct CmapResult {
    pub map: CharMap,
    pub coverage: UnicodeRangeSet,
}

/// Walks the encoding records and decodes the best supported subtable.
pub(crate) fn parse_cmap(data: &[u8], nglyphs: u16, headers_only: bool) -> Result<CmapResult> {
    let fmt12 = locate_subtable(data, 12)?;
    let fmt4 = locate_subtable(data, 4)?;

    let mut coverage = UnicodeRangeSet::new();
    let mut map = CharMap::default();

    if let Some(offset) = fmt12 {
        parse_format12(
            &data[offset..],
            nglyphs,
            headers_only,
            &mut map,
            &mut coverage,
        )?;
    } else if let Some(offset) = fmt4 {
        parse_format4(
            &data[offset..],
            nglyphs,
            headers_only,
            &mut map,
            &mut coverage,
        )?;
    } else {
        return Err(FontError::UnsupportedTable(
            "cmap has neither a format 4 nor a format 12 subtable".to_string(),
        ));
    }

    Ok(CmapResult { map, coverage })
}

/// Offset of the first subtable with the given format, if any.
fn locate_subtable(data: &[u8], format: u16) -> Result<Option<usize>> {
    let mut r = ByteReader::new(data);
    let version = r.read_u16()?;
    if version != 0 {
        return Err(FontError::UnsupportedTable(format!(
            "cmap version {version}"
        )));
    }
    let num_tables = r.read_u16()?;
    for _ in 0..num_tables {
        r.skip(4)?; // platformID, encodingID
        let offset = r.read_u32()? as usize;
        if offset + 2 > data.len() {
            return Err(FontError::CorruptFormat(
                "cmap subtable offset out of bounds".to_string(),
            ));
        }
        let sub_format = u16::from_be_bytes([data[offset], data[offset + 1]]);
        if sub_format == format {
            return Ok(Some(offset));
        }
    }
    Ok(None)
}

fn push_pair(map: &mut CharMap, code: u32, glyph: u32) -> Result<()> {
    if map.codes.len() >= MAX_CHAR_COUNT {
        return Err(FontError::CorruptFormat(
            "cmap maps too many characters".to_string(),
        ));
    }
    map.codes.push(code);
    map.glyph_ids.push(glyph);
    Ok(())
}

fn parse_format4(
    data: &[u8],
    nglyphs: u16,
    headers_only: bool,
    map: &mut CharMap,
    coverage: &mut UnicodeRangeSet,
) -> Result<()> {
    let mut r = ByteReader::new(data);
    r.skip(2)?; // format
    let length = r.read_u16()? as usize;
    if length > data.len() {
        return Err(FontError::CorruptFormat(
            "cmap format 4 length exceeds subtable".to_string(),
        ));
    }
    r.skip(2)?; // language
    let seg_count_x2 = r.read_u16()? as usize;
    let seg_count = seg_count_x2 / 2;
    r.skip(6)?; // searchRange, entrySelector, rangeShift

    let mut end_codes = Vec::with_capacity(seg_count);
    for _ in 0..seg_count {
        end_codes.push(r.read_u16()?);
    }
    r.skip(2)?; // reservedPad
    let mut start_codes = Vec::with_capacity(seg_count);
    for _ in 0..seg_count {
        start_codes.push(r.read_u16()?);
    }
    let mut id_deltas = Vec::with_capacity(seg_count);
    for _ in 0..seg_count {
        id_deltas.push(r.read_i16()?);
    }
    let id_range_offset_base = r.pos();
    let mut id_range_offsets = Vec::with_capacity(seg_count);
    for _ in 0..seg_count {
        id_range_offsets.push(r.read_u16()?);
    }

    for i in 0..seg_count {
        if i == seg_count - 1 && start_codes[i] != 0xFFFF {
            return Err(FontError::CorruptFormat(
                "cmap format 4 lacks the 0xFFFF terminator segment".to_string(),
            ));
        }
        if start_codes[i] == 0xFFFF {
            break;
        }
        if start_codes[i] > end_codes[i] {
            return Err(FontError::CorruptFormat(
                "cmap format 4 segment runs backwards".to_string(),
            ));
        }
        for code in start_codes[i]..=end_codes[i] {
            coverage.insert_code(code as u32);
            if headers_only {
                continue;
            }
            let glyph = if id_range_offsets[i] == 0 {
                (code as i32 + id_deltas[i] as i32) as u16
            } else {
                // offset is relative to the idRangeOffset entry itself
                let pos = id_range_offset_base
                    + i * 2
                    + id_range_offsets[i] as usize
                    + (code - start_codes[i]) as usize * 2;
                if pos + 2 > data.len() {
                    return Err(FontError::CorruptFormat(
                        "cmap format 4 glyph id out of bounds".to_string(),
                    ));
                }
                u16::from_be_bytes([data[pos], data[pos + 1]])
            };
            if glyph >= nglyphs {
                return Err(FontError::CorruptFormat(format!(
                    "cmap maps U+{code:04X} to glyph {glyph} of {nglyphs}"
                )));
            }
            push_pair(map, code as u32, glyph as u32)?;
        }
    }
    Ok(())
}

fn parse_format12(
    data: &[u8],
    nglyphs: u16,
    headers_only: bool,
    map: &mut CharMap,
    coverage: &mut UnicodeRangeSet,
) -> Result<()> {
    let mut r = ByteReader::new(data);
    r.skip(4)?; // format, reserved
    let length = r.read_u32()? as usize;
    if length > data.len() {
        return Err(FontError::CorruptFormat(
            "cmap format 12 length exceeds subtable".to_string(),
        ));
    }
    r.skip(4)?; // language
    let num_groups = r.read_u32()?;

    for _ in 0..num_groups {
        let start = r.read_u32()?;
        let end = r.read_u32()?;
        let start_glyph = r.read_u32()?;
        if start > end || end >= 0x110000 {
            return Err(FontError::CorruptFormat(
                "cmap format 12 group range is invalid".to_string(),
            ));
        }
        for code in start..=end {
            coverage.insert_code(code);
            if headers_only {
                continue;
            }
            let glyph = start_glyph.wrapping_add(code - start);
            if glyph >= nglyphs as u32 {
                return Err(FontError::CorruptFormat(format!(
                    "cmap maps U+{code:04X} to glyph {glyph} of {nglyphs}"
                )));
            }
            push_pair(map, code, glyph)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// cmap with one format-4 subtable mapping `start..=end` to glyphs
    /// `1..`.
    fn format4_cmap(start: u16, end: u16) -> Vec<u8> {
        let mut sub = Vec::new();
        sub.extend(&4u16.to_be_bytes());
        let seg_count = 2u16;
        let length = 16 + seg_count * 8;
        sub.extend(&length.to_be_bytes());
        sub.extend(&0u16.to_be_bytes()); // language
        sub.extend(&(seg_count * 2).to_be_bytes());
        sub.extend(&[0u8; 6]); // search helpers
        sub.extend(&end.to_be_bytes());
        sub.extend(&0xFFFFu16.to_be_bytes());
        sub.extend(&0u16.to_be_bytes()); // reservedPad
        sub.extend(&start.to_be_bytes());
        sub.extend(&0xFFFFu16.to_be_bytes());
        let delta = (1i32 - start as i32) as i16;
        sub.extend(&delta.to_be_bytes());
        sub.extend(&1i16.to_be_bytes());
        sub.extend(&0u16.to_be_bytes()); // idRangeOffset
        sub.extend(&0u16.to_be_bytes());

        let mut table = Vec::new();
        table.extend(&0u16.to_be_bytes()); // version
        table.extend(&1u16.to_be_bytes()); // numTables
        table.extend(&3u16.to_be_bytes()); // platform
        table.extend(&1u16.to_be_bytes()); // encoding
        table.extend(&12u32.to_be_bytes()); // offset
        table.extend(&sub);
        table
    }

    #[test]
    fn test_format4_mapping() {
        let data = format4_cmap(b'A' as u16, b'C' as u16);
        let result = parse_cmap(&data, 8, false).unwrap();
        assert_eq!(result.map.codes, vec![65, 66, 67]);
        assert_eq!(result.map.glyph_ids, vec![1, 2, 3]);
        assert_eq!(result.map.find(66), Some(2));
        assert_eq!(result.map.find(68), None);
        assert!(result.coverage.covers_code(65));
        assert!(!result.coverage.covers_code(0x0400));
    }

    #[test]
    fn test_headers_only_skips_the_map() {
        let data = format4_cmap(b'A' as u16, b'C' as u16);
        let result = parse_cmap(&data, 8, true).unwrap();
        assert!(result.map.is_empty());
        assert!(result.coverage.covers_code(65));
    }

    #[test]
    fn test_glyph_out_of_range_is_rejected() {
        let data = format4_cmap(b'A' as u16, b'C' as u16);
        assert!(matches!(
            parse_cmap(&data, 2, false),
            Err(FontError::CorruptFormat(_))
        ));
    }

    #[test]
    fn test_missing_subtables() {
        let mut table = Vec::new();
        table.extend(&0u16.to_be_bytes());
        table.extend(&0u16.to_be_bytes());
        assert!(matches!(
            parse_cmap(&table, 1, false),
            Err(FontError::UnsupportedTable(_))
        ));
    }

    #[test]
    fn test_format12_backwards_group_is_rejected() {
        let mut sub = Vec::new();
        sub.extend(&12u16.to_be_bytes());
        sub.extend(&0u16.to_be_bytes());
        sub.extend(&(16u32 + 12).to_be_bytes());
        sub.extend(&0u32.to_be_bytes()); // language
        sub.extend(&1u32.to_be_bytes()); // numGroups
        sub.extend(&10u32.to_be_bytes()); // startCharCode
        sub.extend(&5u32.to_be_bytes()); // endCharCode < start
        sub.extend(&1u32.to_be_bytes());

        let mut table = Vec::new();
        table.extend(&0u16.to_be_bytes());
        table.extend(&1u16.to_be_bytes());
        table.extend(&3u16.to_be_bytes());
        table.extend(&10u16.to_be_bytes());
        table.extend(&12u32.to_be_bytes());
        table.extend(&sub);
        assert!(matches!(
            parse_cmap(&table, 100, false),
            Err(FontError::CorruptFormat(_))
        ));
    }

    #[test]
    fn test_sort_by_code_is_stable_for_pairs() {
        let mut map = CharMap {
            codes: vec![90, 65, 70],
            glyph_ids: vec![3, 1, 2],
        };
        map.sort_by_code();
        assert_eq!(map.codes, vec![65, 70, 90]);
        assert_eq!(map.glyph_ids, vec![1, 2, 3]);
    }
}
