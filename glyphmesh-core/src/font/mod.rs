//! The TrueType decoder: container directory, table parsers and the
//! loaded [`Font`] object.
//!
//! The decode path is a fixed sequence: checksum gate, directory, the
//! metadata tables, `cmap`, then (unless only headers were requested)
//! the `loca`/`glyf` outlines and `hmtx` metrics. Every malformed input
//! is rejected by a distinct [`FontError`] kind.

mod cmap;
mod directory;
mod glyf;
pub mod matching;
pub mod ranges;
mod reader;
pub mod tables;

pub use cmap::CharMap;
pub use matching::{match_fonts, Requirement, StyleRequest};
pub use ranges::{UnicodeRange, UnicodeRangeSet, UNICODE_BMP_RANGES};
pub use tables::{FontNames, HeadInfo, HheaInfo, MacStyleFlags, Os2Info, SelectionFlags};

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{FontError, Result};
use crate::glyph::Glyph;
use directory::TableDirectory;

/// A decoded TrueType font.
///
/// All linear metrics (glyph metrics, outline coordinates, `hhea` and
/// `OS/2` distances) are in em units: raw font units divided by
/// `unitsPerEm`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Font {
    /// Sorted code-point to glyph-index map.
    pub char_map: CharMap,
    /// Glyphs by index; empty when only headers were loaded.
    pub glyphs: Vec<Glyph>,
    /// Design units per em, the scale divisor applied at decode time.
    pub units_per_em: u16,
    /// Unpacked `head` fields.
    pub head: HeadInfo,
    /// Unpacked `OS/2` fields.
    pub os2: Os2Info,
    /// Unpacked `hhea` fields (default when only headers were loaded).
    pub hhea: HheaInfo,
    /// Strings of the `name` table.
    pub names: FontNames,
    /// Which of the 163 predefined BMP ranges this font covers.
    pub unicode_coverage: UnicodeRangeSet,
    /// Stored checksum of the `glyf` table; a cheap identity for
    /// duplicate detection across font lists.
    pub glyf_checksum: u32,
    /// Where the font was read from, when loaded via a path.
    pub source_path: Option<PathBuf>,
}

impl Font {
    /// Decodes a font from memory.
    ///
    /// With `headers_only` the decode stops after `cmap`: metadata and
    /// coverage are filled, the character map and glyph table stay empty.
    pub fn load(data: &[u8], headers_only: bool) -> Result<Font> {
        let directory = TableDirectory::parse(data)?;

        let head = tables::parse_head(directory.required(b"head")?)?;
        let nglyphs = tables::parse_maxp(directory.required(b"maxp")?)?;
        let names = tables::parse_name(directory.required(b"name")?)?;
        let os2 = tables::parse_os2(directory.required(b"OS/2")?)?;
        let cmap = cmap::parse_cmap(directory.required(b"cmap")?, nglyphs, headers_only)?;

        let mut font = Font {
            char_map: cmap.map,
            glyphs: Vec::new(),
            units_per_em: head.units_per_em,
            head: head.info,
            os2,
            hhea: HheaInfo::default(),
            names,
            unicode_coverage: cmap.coverage,
            glyf_checksum: directory.glyf_checksum,
            source_path: None,
        };

        if !headers_only {
            let glyf = directory.required(b"glyf")?;
            let loca = glyf::parse_loca(
                directory.required(b"loca")?,
                nglyphs,
                head.index_to_loc_format == 1,
                glyf.len(),
            )?;

            font.glyphs = (0..nglyphs as usize)
                .map(|index| Glyph {
                    index,
                    ..Glyph::default()
                })
                .collect();
            glyf::parse_glyf(glyf, &loca, &mut font.glyphs)?;

            let hhea = tables::parse_hhea(directory.required(b"hhea")?)?;
            glyf::parse_hmtx(
                directory.required(b"hmtx")?,
                hhea.number_of_h_metrics,
                &mut font.glyphs,
            )?;
            font.hhea = hhea.info;

            for (&code, &glyph) in font
                .char_map
                .codes
                .iter()
                .zip(font.char_map.glyph_ids.iter())
            {
                font.glyphs[glyph as usize].code_point = Some(code);
            }
        }

        font.scale_to_em(head.units_per_em);
        font.char_map.sort_by_code();

        debug!(
            nglyphs = nglyphs as usize,
            nchars = font.char_map.len(),
            family = %font.names.family,
            headers_only,
            "font decoded"
        );
        Ok(font)
    }

    /// Reads and decodes a font file; the size cap and any I/O failure
    /// surface before the decoder runs.
    pub fn load_from_file<P: AsRef<Path>>(path: P, headers_only: bool) -> Result<Font> {
        let path = path.as_ref();
        let size = std::fs::metadata(path)?.len();
        if size > crate::MAX_FILE_SIZE as u64 {
            return Err(FontError::FileTooLarge(size));
        }
        let data = std::fs::read(path)?;
        let mut font = Font::load(&data, headers_only)?;
        font.source_path = Some(path.to_path_buf());
        Ok(font)
    }

    /// Number of glyphs in the font.
    pub fn nglyphs(&self) -> usize {
        self.glyphs.len()
    }

    /// Number of mapped character codes.
    pub fn nchars(&self) -> usize {
        self.char_map.len()
    }

    /// Glyph index for a code point, by binary search over the sorted
    /// code array.
    pub fn find_glyph(&self, code_point: u32) -> Option<usize> {
        self.char_map.find(code_point)
    }

    /// The glyph a code point maps to.
    pub fn glyph_for_char(&self, code_point: char) -> Option<&Glyph> {
        self.glyphs.get(self.find_glyph(code_point as u32)?)
    }

    /// Divides every stored linear metric by `unitsPerEm`.
    fn scale_to_em(&mut self, units_per_em: u16) {
        let scale = if units_per_em == 0 {
            0.0
        } else {
            1.0 / units_per_em as f32
        };

        for glyph in &mut self.glyphs {
            glyph.x_bounds[0] *= scale;
            glyph.x_bounds[1] *= scale;
            glyph.y_bounds[0] *= scale;
            glyph.y_bounds[1] *= scale;
            glyph.advance *= scale;
            glyph.left_bearing *= scale;
            glyph.right_bearing = glyph.advance
                - (glyph.left_bearing + glyph.x_bounds[1] - glyph.x_bounds[0]);
            if let Some(outline) = &mut glyph.outline {
                for contour in &mut outline.contours {
                    for point in &mut contour.points {
                        point.x *= scale;
                        point.y *= scale;
                    }
                }
            }
        }

        self.hhea.ascender *= scale;
        self.hhea.descender *= scale;
        self.hhea.line_gap *= scale;
        self.hhea.advance_width_max *= scale;
        self.hhea.min_left_side_bearing *= scale;
        self.hhea.min_right_side_bearing *= scale;
        self.hhea.x_max_extent *= scale;

        self.os2.x_avg_char_width *= scale;
        self.os2.strikeout_size *= scale;
        self.os2.strikeout_position *= scale;
        self.os2.typo_ascender *= scale;
        self.os2.typo_descender *= scale;
        self.os2.typo_line_gap *= scale;
        self.os2.win_ascent *= scale;
        self.os2.win_descent *= scale;
    }
}
