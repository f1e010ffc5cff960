//! Decoders of the fixed-layout metadata tables: `head`, `maxp`, `hhea`,
//! `OS/2` and `name`.
//!
//! Each parser consumes its table through the bounds-checked reader and
//! produces a typed info struct. Linear metrics stay in raw font units
//! here; the font loader scales everything by `1/unitsPerEm` once the
//! whole decode succeeds.

use bitflags::bitflags;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::error::{FontError, Result};
use crate::font::reader::ByteReader;

const HEAD_MAGIC: u32 = 0x5F0F3CF5;
const HEAD_TABLE_LEN: usize = 54;

bitflags! {
    /// `head` table macStyle bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MacStyleFlags: u16 {
        const BOLD = 0x0001;
        const ITALIC = 0x0002;
        const UNDERLINE = 0x0004;
        const OUTLINE = 0x0008;
        const SHADOW = 0x0010;
        const CONDENSED = 0x0020;
        const EXTENDED = 0x0040;
    }
}

bitflags! {
    /// `OS/2` table fsSelection bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SelectionFlags: u16 {
        const ITALIC = 0x0001;
        const UNDERSCORE = 0x0002;
        const NEGATIVE = 0x0004;
        const OUTLINED = 0x0008;
        const STRIKEOUT = 0x0010;
        const BOLD = 0x0020;
        const REGULAR = 0x0040;
        const USE_TYPO_METRICS = 0x0080;
        const OBLIQUE = 0x0200;
    }
}

/// Unpacked fields of the `head` table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeadInfo {
    /// Font revision set by the manufacturer (16.16 fixed point).
    pub revision: f32,
    /// Style bits.
    pub mac_style: MacStyleFlags,
    /// Creation time, when representable.
    pub created: Option<DateTime<Utc>>,
    /// Last modification time, when representable.
    pub modified: Option<DateTime<Utc>>,
}

/// Raw `head` fields the rest of the decoder needs.
#[derive(Debug, Clone)]
pub(crate) struct RawHead {
    pub units_per_em: u16,
    pub index_to_loc_format: i16,
    pub info: HeadInfo,
}

/// Unpacked fields of the `OS/2` table. Linear metrics are em-normalized
/// by the loader.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Os2Info {
    /// Average weighted escapement.
    pub x_avg_char_width: f32,
    /// Weight class, see the `WEIGHT_*` constants.
    pub weight_class: u16,
    /// Width class, 1 (ultra-condensed) through 9 (ultra-expanded).
    pub width_class: u16,
    /// Thickness of the strikeout stroke.
    pub strikeout_size: f32,
    /// Top of the strikeout stroke relative to the baseline.
    pub strikeout_position: f32,
    /// IBM font-family class and subclass.
    pub family_class: i16,
    /// PANOSE classification number.
    pub panose: [u8; 10],
    /// Font selection flags.
    pub selection: SelectionFlags,
    pub typo_ascender: f32,
    pub typo_descender: f32,
    pub typo_line_gap: f32,
    pub win_ascent: f32,
    pub win_descent: f32,
}

/// Unpacked fields of the `hhea` table, em-normalized by the loader.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HheaInfo {
    pub ascender: f32,
    pub descender: f32,
    pub line_gap: f32,
    pub advance_width_max: f32,
    pub min_left_side_bearing: f32,
    pub min_right_side_bearing: f32,
    pub x_max_extent: f32,
    /// Caret slope in radians; ~0 for upright fonts, ~0.2 for italics.
    pub caret_slope: f32,
}

/// Raw `hhea` fields consumed by the `hmtx` parser.
#[derive(Debug, Clone)]
pub(crate) struct RawHhea {
    pub number_of_h_metrics: u16,
    pub info: HheaInfo,
}

/// Strings of the `name` table, keyed by the recognized name IDs 0-14
/// and 19. Unrecognized encodings leave a field empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FontNames {
    pub copyright: String,
    pub family: String,
    pub subfamily: String,
    pub unique_id: String,
    pub full_name: String,
    pub version: String,
    pub ps_name: String,
    pub trademark: String,
    pub manufacturer: String,
    pub designer: String,
    pub description: String,
    pub vendor_url: String,
    pub designer_url: String,
    pub license_description: String,
    pub license_url: String,
    pub sample_text: String,
}

pub(crate) fn parse_head(data: &[u8]) -> Result<RawHead> {
    if data.len() != HEAD_TABLE_LEN {
        return Err(FontError::CorruptFormat(format!(
            "head table has {} bytes, expected {HEAD_TABLE_LEN}",
            data.len()
        )));
    }
    let mut r = ByteReader::new(data);
    r.skip(4)?; // majorVersion, minorVersion
    let revision_i = r.read_i16()?;
    let revision_f = r.read_u16()?;
    r.skip(4)?; // checkSumAdjustment
    let magic = r.read_u32()?;
    if magic != HEAD_MAGIC {
        return Err(FontError::CorruptFormat(format!(
            "head magic number is 0x{magic:08X}"
        )));
    }
    r.skip(2)?; // flags
    let units_per_em = r.read_u16()?;
    let created = r.read_u64()?;
    let modified = r.read_u64()?;
    r.skip(8)?; // xMin, yMin, xMax, yMax
    let mac_style = MacStyleFlags::from_bits_truncate(r.read_u16()?);
    r.skip(4)?; // lowestRecPPEM, fontDirectionHint
    let index_to_loc_format = r.read_i16()?;
    if !(0..=1).contains(&index_to_loc_format) {
        return Err(FontError::CorruptFormat(format!(
            "indexToLocFormat is {index_to_loc_format}"
        )));
    }

    Ok(RawHead {
        units_per_em,
        index_to_loc_format,
        info: HeadInfo {
            revision: revision_i as f32 + revision_f as f32 / 65536.0,
            mac_style,
            created: longdatetime(created),
            modified: longdatetime(modified),
        },
    })
}

/// LONGDATETIME: seconds since 1904-01-01T00:00:00 UTC. Out-of-range
/// values decode to `None` rather than failing the font.
fn longdatetime(seconds: u64) -> Option<DateTime<Utc>> {
    if seconds == 0 {
        return None;
    }
    let epoch = Utc.with_ymd_and_hms(1904, 1, 1, 0, 0, 0).single()?;
    let delta = Duration::try_seconds(i64::try_from(seconds).ok()?)?;
    epoch.checked_add_signed(delta)
}

/// Reads `numGlyphs` from `maxp`; versions above 1.0 are unknown territory.
pub(crate) fn parse_maxp(data: &[u8]) -> Result<u16> {
    let mut r = ByteReader::new(data);
    let ver_major = r.read_u16()?;
    r.skip(2)?;
    if ver_major > 1 {
        return Err(FontError::UnsupportedTable(format!(
            "maxp version {ver_major}.x"
        )));
    }
    r.read_u16()
}

pub(crate) fn parse_hhea(data: &[u8]) -> Result<RawHhea> {
    let mut r = ByteReader::new(data);
    r.skip(4)?; // majorVersion, minorVersion
    let ascender = r.read_i16()? as f32;
    let descender = r.read_i16()? as f32;
    let line_gap = r.read_i16()? as f32;
    let advance_width_max = r.read_u16()? as f32;
    let min_left_side_bearing = r.read_i16()? as f32;
    let min_right_side_bearing = r.read_i16()? as f32;
    let x_max_extent = r.read_i16()? as f32;
    let caret_slope_rise = r.read_i16()?;
    let caret_slope_run = r.read_i16()?;
    r.skip(10)?; // caretOffset, reserved x4
    r.skip(2)?; // metricDataFormat
    let number_of_h_metrics = r.read_u16()?;

    Ok(RawHhea {
        number_of_h_metrics,
        info: HheaInfo {
            ascender,
            descender,
            line_gap,
            advance_width_max,
            min_left_side_bearing,
            min_right_side_bearing,
            x_max_extent,
            caret_slope: (caret_slope_run as f32).atan2(caret_slope_rise as f32),
        },
    })
}

pub(crate) fn parse_os2(data: &[u8]) -> Result<Os2Info> {
    let mut r = ByteReader::new(data);
    r.skip(2)?; // version
    let x_avg_char_width = r.read_i16()? as f32;
    let weight_class = r.read_u16()?;
    let width_class = r.read_u16()?;
    r.skip(2)?; // fsType
    r.skip(16)?; // subscript/superscript boxes
    let strikeout_size = r.read_i16()? as f32;
    let strikeout_position = r.read_i16()? as f32;
    let family_class = r.read_i16()?;
    let mut panose = [0u8; 10];
    panose.copy_from_slice(r.read_bytes(10)?);
    r.skip(16)?; // ulUnicodeRange (the cmap walk rebuilds coverage itself)
    r.skip(4)?; // achVendID
    let selection = SelectionFlags::from_bits_truncate(r.read_u16()?);
    r.skip(4)?; // usFirstCharIndex, usLastCharIndex
    let typo_ascender = r.read_i16()? as f32;
    let typo_descender = r.read_i16()? as f32;
    let typo_line_gap = r.read_i16()? as f32;
    let win_ascent = r.read_u16()? as f32;
    let win_descent = r.read_u16()? as f32;

    Ok(Os2Info {
        x_avg_char_width,
        weight_class,
        width_class,
        strikeout_size,
        strikeout_position,
        family_class,
        panose,
        selection,
        typo_ascender,
        typo_descender,
        typo_line_gap,
        win_ascent,
        win_descent,
    })
}

/// Decodes one name-record payload into a string.
///
/// Recognized pairs: Macintosh Roman (1, 0) taken as raw bytes, and
/// Windows Unicode BMP US-English (3, 1, 0x0409) narrowed to the low byte
/// of each UTF-16BE unit. Everything else yields an empty string.
fn name_record_string(payload: &[u8], platform: u16, encoding: u16, language: u16) -> String {
    if platform == 1 && encoding == 0 {
        return String::from_utf8_lossy(payload).into_owned();
    }
    if platform == 3 && encoding == 1 && language == 0x0409 {
        let narrowed: Vec<u8> = payload.chunks_exact(2).map(|unit| unit[1]).collect();
        return String::from_utf8_lossy(&narrowed).into_owned();
    }
    String::new()
}

pub(crate) fn parse_name(data: &[u8]) -> Result<FontNames> {
    let mut r = ByteReader::new(data);
    let format = r.read_u16()?;
    if format > 1 {
        return Err(FontError::CorruptFormat(format!(
            "name table format {format}"
        )));
    }
    let count = r.read_u16()?;
    let string_offset = r.read_u16()? as usize;

    let mut names = FontNames::default();
    for _ in 0..count {
        let platform = r.read_u16()?;
        let encoding = r.read_u16()?;
        let language = r.read_u16()?;
        let name_id = r.read_u16()?;
        let length = r.read_u16()? as usize;
        let offset = r.read_u16()? as usize;

        let start = string_offset
            .checked_add(offset)
            .ok_or_else(|| FontError::CorruptFormat("name record offset overflow".to_string()))?;
        if start + length > data.len() {
            return Err(FontError::CorruptFormat(
                "name record string out of bounds".to_string(),
            ));
        }
        let payload = &data[start..start + length];

        let field = match name_id {
            0 => &mut names.copyright,
            1 => &mut names.family,
            2 => &mut names.subfamily,
            3 => &mut names.unique_id,
            4 => &mut names.full_name,
            5 => &mut names.version,
            6 => &mut names.ps_name,
            7 => &mut names.trademark,
            8 => &mut names.manufacturer,
            9 => &mut names.designer,
            10 => &mut names.description,
            11 => &mut names.vendor_url,
            12 => &mut names.designer_url,
            13 => &mut names.license_description,
            14 => &mut names.license_url,
            19 => &mut names.sample_text,
            _ => continue,
        };
        // first matching record wins
        if field.is_empty() {
            *field = name_record_string(payload, platform, encoding, language);
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head_bytes(units_per_em: u16, loc_format: i16, mac_style: u16) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend(&[0x00, 0x01, 0x00, 0x00]); // version
        data.extend(&0x0001_8000u32.to_be_bytes()); // revision 1.5
        data.extend(&[0x00; 4]); // checkSumAdjustment
        data.extend(&HEAD_MAGIC.to_be_bytes());
        data.extend(&[0x00, 0x00]); // flags
        data.extend(&units_per_em.to_be_bytes());
        data.extend(&[0x00; 16]); // created, modified
        data.extend(&[0x00; 8]); // bounds
        data.extend(&mac_style.to_be_bytes());
        data.extend(&[0x00, 0x08]); // lowestRecPPEM
        data.extend(&[0x00, 0x02]); // fontDirectionHint
        data.extend(&(loc_format as u16).to_be_bytes());
        data.extend(&[0x00, 0x00]); // glyphDataFormat
        data
    }

    #[test]
    fn test_parse_head() {
        let head = parse_head(&head_bytes(2048, 1, 0x0003)).unwrap();
        assert_eq!(head.units_per_em, 2048);
        assert_eq!(head.index_to_loc_format, 1);
        assert!((head.info.revision - 1.5).abs() < 1e-6);
        assert!(head
            .info
            .mac_style
            .contains(MacStyleFlags::BOLD | MacStyleFlags::ITALIC));
        assert_eq!(head.info.created, None);
    }

    #[test]
    fn test_parse_head_rejects_bad_magic() {
        let mut data = head_bytes(1000, 0, 0);
        data[12] ^= 0xFF;
        assert!(matches!(
            parse_head(&data),
            Err(FontError::CorruptFormat(_))
        ));
    }

    #[test]
    fn test_parse_head_rejects_bad_loc_format() {
        let data = head_bytes(1000, 2, 0);
        assert!(matches!(
            parse_head(&data),
            Err(FontError::CorruptFormat(_))
        ));
    }

    #[test]
    fn test_longdatetime() {
        // 1904-01-01 plus one day
        let date = longdatetime(86400).unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(1904, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(longdatetime(0), None);
    }

    #[test]
    fn test_parse_maxp() {
        let mut data = Vec::new();
        data.extend(&[0x00, 0x01, 0x00, 0x00]);
        data.extend(&42u16.to_be_bytes());
        assert_eq!(parse_maxp(&data).unwrap(), 42);

        data[0..2].copy_from_slice(&2u16.to_be_bytes());
        assert!(matches!(
            parse_maxp(&data),
            Err(FontError::UnsupportedTable(_))
        ));
    }

    #[test]
    fn test_name_record_narrowing() {
        assert_eq!(name_record_string(b"Times", 1, 0, 0), "Times");
        let utf16be = [0x00, b'B', 0x00, b'o', 0x00, b'l', 0x00, b'd'];
        assert_eq!(name_record_string(&utf16be, 3, 1, 0x0409), "Bold");
        assert_eq!(name_record_string(b"whatever", 0, 3, 0), "");
    }

    #[test]
    fn test_parse_name_first_record_wins() {
        let mut data = Vec::new();
        data.extend(&[0x00, 0x00]); // format
        data.extend(&2u16.to_be_bytes()); // count
        data.extend(&30u16.to_be_bytes()); // stringOffset
        for (offset, len) in [(0u16, 5u16), (5, 6)] {
            data.extend(&1u16.to_be_bytes()); // platform: Macintosh
            data.extend(&0u16.to_be_bytes()); // encoding: Roman
            data.extend(&0u16.to_be_bytes()); // language
            data.extend(&1u16.to_be_bytes()); // name id: family
            data.extend(&len.to_be_bytes());
            data.extend(&offset.to_be_bytes());
        }
        data.extend(b"FirstSecond");
        let names = parse_name(&data).unwrap();
        assert_eq!(names.family, "First");
        assert_eq!(names.subfamily, "");
    }
}
