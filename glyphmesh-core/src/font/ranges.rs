//! The 163 predefined Unicode Basic Multilingual Plane ranges.
//!
//! Fonts advertise which of these ranges they cover; the coverage bit set
//! drives the `Text` requirement of font matching.

/// One predefined BMP range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnicodeRange {
    /// First code point in the range.
    pub first: u16,
    /// Last code point in the range.
    pub last: u16,
    /// Range name per the Unicode block list.
    pub name: &'static str,
}

/// Index of the range containing `code`, if any. Supplementary-plane
/// code points are outside every BMP range.
pub fn find_range(code: u32) -> Option<usize> {
    if code > 0xFFFF {
        return None;
    }
    let code = code as u16;
    let idx = UNICODE_BMP_RANGES
        .partition_point(|range| range.last < code);
    if idx < UNICODE_BMP_RANGES.len() && UNICODE_BMP_RANGES[idx].first <= code {
        Some(idx)
    } else {
        None
    }
}

/// Bit set over [`UNICODE_BMP_RANGES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnicodeRangeSet([u32; 6]);

impl UnicodeRangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the range containing `code`, if there is one.
    pub fn insert_code(&mut self, code: u32) {
        if let Some(range) = find_range(code) {
            self.0[range / 32] |= 1 << (range & 31);
        }
    }

    pub fn contains_range(&self, range: usize) -> bool {
        range < UNICODE_BMP_RANGES.len() && self.0[range / 32] & (1 << (range & 31)) != 0
    }

    /// Whether the range containing `code` is marked.
    pub fn covers_code(&self, code: u32) -> bool {
        find_range(code).is_some_and(|range| self.contains_range(range))
    }

    /// Raw words, least significant bit of word 0 being range 0.
    pub fn words(&self) -> [u32; 6] {
        self.0
    }
}

pub const UNICODE_BMP_RANGES: [UnicodeRange; 163] = [
    UnicodeRange { first: 0x0000, last: 0x007F, name: "Basic Latin" },
    UnicodeRange { first: 0x0080, last: 0x00FF, name: "Latin-1 Supplement" },
    UnicodeRange { first: 0x0100, last: 0x017F, name: "Latin Extended-A" },
    UnicodeRange { first: 0x0180, last: 0x024F, name: "Latin Extended-B" },
    UnicodeRange { first: 0x0250, last: 0x02AF, name: "IPA Extensions" },
    UnicodeRange { first: 0x02B0, last: 0x02FF, name: "Spacing Modifier Letters" },
    UnicodeRange { first: 0x0300, last: 0x036F, name: "Combining Diacritical Marks" },
    UnicodeRange { first: 0x0370, last: 0x03FF, name: "Greek and Coptic" },
    UnicodeRange { first: 0x0400, last: 0x04FF, name: "Cyrillic" },
    UnicodeRange { first: 0x0500, last: 0x052F, name: "Cyrillic Supplement" },
    UnicodeRange { first: 0x0530, last: 0x058F, name: "Armenian" },
    UnicodeRange { first: 0x0590, last: 0x05FF, name: "Hebrew" },
    UnicodeRange { first: 0x0600, last: 0x06FF, name: "Arabic" },
    UnicodeRange { first: 0x0700, last: 0x074F, name: "Syriac" },
    UnicodeRange { first: 0x0750, last: 0x077F, name: "Arabic Supplement" },
    UnicodeRange { first: 0x0780, last: 0x07BF, name: "Thaana" },
    UnicodeRange { first: 0x07C0, last: 0x07FF, name: "NKo" },
    UnicodeRange { first: 0x0800, last: 0x083F, name: "Samaritan" },
    UnicodeRange { first: 0x0840, last: 0x085F, name: "Mandaic" },
    UnicodeRange { first: 0x0860, last: 0x086F, name: "Syriac Supplement" },
    UnicodeRange { first: 0x08A0, last: 0x08FF, name: "Arabic Extended-A" },
    UnicodeRange { first: 0x0900, last: 0x097F, name: "Devanagari" },
    UnicodeRange { first: 0x0980, last: 0x09FF, name: "Bengali" },
    UnicodeRange { first: 0x0A00, last: 0x0A7F, name: "Gurmukhi" },
    UnicodeRange { first: 0x0A80, last: 0x0AFF, name: "Gujarati" },
    UnicodeRange { first: 0x0B00, last: 0x0B7F, name: "Oriya" },
    UnicodeRange { first: 0x0B80, last: 0x0BFF, name: "Tamil" },
    UnicodeRange { first: 0x0C00, last: 0x0C7F, name: "Telugu" },
    UnicodeRange { first: 0x0C80, last: 0x0CFF, name: "Kannada" },
    UnicodeRange { first: 0x0D00, last: 0x0D7F, name: "Malayalam" },
    UnicodeRange { first: 0x0D80, last: 0x0DFF, name: "Sinhala" },
    UnicodeRange { first: 0x0E00, last: 0x0E7F, name: "Thai" },
    UnicodeRange { first: 0x0E80, last: 0x0EFF, name: "Lao" },
    UnicodeRange { first: 0x0F00, last: 0x0FFF, name: "Tibetan" },
    UnicodeRange { first: 0x1000, last: 0x109F, name: "Myanmar" },
    UnicodeRange { first: 0x10A0, last: 0x10FF, name: "Georgian" },
    UnicodeRange { first: 0x1100, last: 0x11FF, name: "Hangul Jamo" },
    UnicodeRange { first: 0x1200, last: 0x137F, name: "Ethiopic" },
    UnicodeRange { first: 0x1380, last: 0x139F, name: "Ethiopic Supplement" },
    UnicodeRange { first: 0x13A0, last: 0x13FF, name: "Cherokee" },
    UnicodeRange { first: 0x1400, last: 0x167F, name: "Unified Canadian Aboriginal Syllabics" },
    UnicodeRange { first: 0x1680, last: 0x169F, name: "Ogham" },
    UnicodeRange { first: 0x16A0, last: 0x16FF, name: "Runic" },
    UnicodeRange { first: 0x1700, last: 0x171F, name: "Tagalog" },
    UnicodeRange { first: 0x1720, last: 0x173F, name: "Hanunoo" },
    UnicodeRange { first: 0x1740, last: 0x175F, name: "Buhid" },
    UnicodeRange { first: 0x1760, last: 0x177F, name: "Tagbanwa" },
    UnicodeRange { first: 0x1780, last: 0x17FF, name: "Khmer" },
    UnicodeRange { first: 0x1800, last: 0x18AF, name: "Mongolian" },
    UnicodeRange { first: 0x18B0, last: 0x18FF, name: "Unified Canadian Aboriginal Syllabics Extended" },
    UnicodeRange { first: 0x1900, last: 0x194F, name: "Limbu" },
    UnicodeRange { first: 0x1950, last: 0x197F, name: "Tai Le" },
    UnicodeRange { first: 0x1980, last: 0x19DF, name: "New Tai Lue" },
    UnicodeRange { first: 0x19E0, last: 0x19FF, name: "Khmer Symbols" },
    UnicodeRange { first: 0x1A00, last: 0x1A1F, name: "Buginese" },
    UnicodeRange { first: 0x1A20, last: 0x1AAF, name: "Tai Tham" },
    UnicodeRange { first: 0x1AB0, last: 0x1AFF, name: "Combining Diacritical Marks Extended" },
    UnicodeRange { first: 0x1B00, last: 0x1B7F, name: "Balinese" },
    UnicodeRange { first: 0x1B80, last: 0x1BBF, name: "Sundanese" },
    UnicodeRange { first: 0x1BC0, last: 0x1BFF, name: "Batak" },
    UnicodeRange { first: 0x1C00, last: 0x1C4F, name: "Lepcha" },
    UnicodeRange { first: 0x1C50, last: 0x1C7F, name: "Ol Chiki" },
    UnicodeRange { first: 0x1C80, last: 0x1C8F, name: "Cyrillic Extended-C" },
    UnicodeRange { first: 0x1C90, last: 0x1CBF, name: "Georgian Extended" },
    UnicodeRange { first: 0x1CC0, last: 0x1CCF, name: "Sundanese Supplement" },
    UnicodeRange { first: 0x1CD0, last: 0x1CFF, name: "Vedic Extensions" },
    UnicodeRange { first: 0x1D00, last: 0x1D7F, name: "Phonetic Extensions" },
    UnicodeRange { first: 0x1D80, last: 0x1DBF, name: "Phonetic Extensions Supplement" },
    UnicodeRange { first: 0x1DC0, last: 0x1DFF, name: "Combining Diacritical Marks Supplement" },
    UnicodeRange { first: 0x1E00, last: 0x1EFF, name: "Latin Extended Additional" },
    UnicodeRange { first: 0x1F00, last: 0x1FFF, name: "Greek Extended" },
    UnicodeRange { first: 0x2000, last: 0x206F, name: "General Punctuation" },
    UnicodeRange { first: 0x2070, last: 0x209F, name: "Superscripts and Subscripts" },
    UnicodeRange { first: 0x20A0, last: 0x20CF, name: "Currency Symbols" },
    UnicodeRange { first: 0x20D0, last: 0x20FF, name: "Combining Diacritical Marks for Symbols" },
    UnicodeRange { first: 0x2100, last: 0x214F, name: "Letterlike Symbols" },
    UnicodeRange { first: 0x2150, last: 0x218F, name: "Number Forms" },
    UnicodeRange { first: 0x2190, last: 0x21FF, name: "Arrows" },
    UnicodeRange { first: 0x2200, last: 0x22FF, name: "Mathematical Operators" },
    UnicodeRange { first: 0x2300, last: 0x23FF, name: "Miscellaneous Technical" },
    UnicodeRange { first: 0x2400, last: 0x243F, name: "Control Pictures" },
    UnicodeRange { first: 0x2440, last: 0x245F, name: "Optical Character Recognition" },
    UnicodeRange { first: 0x2460, last: 0x24FF, name: "Enclosed Alphanumerics" },
    UnicodeRange { first: 0x2500, last: 0x257F, name: "Box Drawing" },
    UnicodeRange { first: 0x2580, last: 0x259F, name: "Block Elements" },
    UnicodeRange { first: 0x25A0, last: 0x25FF, name: "Geometric Shapes" },
    UnicodeRange { first: 0x2600, last: 0x26FF, name: "Miscellaneous Symbols" },
    UnicodeRange { first: 0x2700, last: 0x27BF, name: "Dingbats" },
    UnicodeRange { first: 0x27C0, last: 0x27EF, name: "Miscellaneous Mathematical Symbols-A" },
    UnicodeRange { first: 0x27F0, last: 0x27FF, name: "Supplemental Arrows-A" },
    UnicodeRange { first: 0x2800, last: 0x28FF, name: "Braille Patterns" },
    UnicodeRange { first: 0x2900, last: 0x297F, name: "Supplemental Arrows-B" },
    UnicodeRange { first: 0x2980, last: 0x29FF, name: "Miscellaneous Mathematical Symbols-B" },
    UnicodeRange { first: 0x2A00, last: 0x2AFF, name: "Supplemental Mathematical Operators" },
    UnicodeRange { first: 0x2B00, last: 0x2BFF, name: "Miscellaneous Symbols and Arrows" },
    UnicodeRange { first: 0x2C00, last: 0x2C5F, name: "Glagolitic" },
    UnicodeRange { first: 0x2C60, last: 0x2C7F, name: "Latin Extended-C" },
    UnicodeRange { first: 0x2C80, last: 0x2CFF, name: "Coptic" },
    UnicodeRange { first: 0x2D00, last: 0x2D2F, name: "Georgian Supplement" },
    UnicodeRange { first: 0x2D30, last: 0x2D7F, name: "Tifinagh" },
    UnicodeRange { first: 0x2D80, last: 0x2DDF, name: "Ethiopic Extended" },
    UnicodeRange { first: 0x2DE0, last: 0x2DFF, name: "Cyrillic Extended-A" },
    UnicodeRange { first: 0x2E00, last: 0x2E7F, name: "Supplemental Punctuation" },
    UnicodeRange { first: 0x2E80, last: 0x2EFF, name: "CJK Radicals Supplement" },
    UnicodeRange { first: 0x2F00, last: 0x2FDF, name: "Kangxi Radicals" },
    UnicodeRange { first: 0x2FF0, last: 0x2FFF, name: "Ideographic Description Characters" },
    UnicodeRange { first: 0x3000, last: 0x303F, name: "CJK Symbols and Punctuation" },
    UnicodeRange { first: 0x3040, last: 0x309F, name: "Hiragana" },
    UnicodeRange { first: 0x30A0, last: 0x30FF, name: "Katakana" },
    UnicodeRange { first: 0x3100, last: 0x312F, name: "Bopomofo" },
    UnicodeRange { first: 0x3130, last: 0x318F, name: "Hangul Compatibility Jamo" },
    UnicodeRange { first: 0x3190, last: 0x319F, name: "Kanbun" },
    UnicodeRange { first: 0x31A0, last: 0x31BF, name: "Bopomofo Extended" },
    UnicodeRange { first: 0x31C0, last: 0x31EF, name: "CJK Strokes" },
    UnicodeRange { first: 0x31F0, last: 0x31FF, name: "Katakana Phonetic Extensions" },
    UnicodeRange { first: 0x3200, last: 0x32FF, name: "Enclosed CJK Letters and Months" },
    UnicodeRange { first: 0x3300, last: 0x33FF, name: "CJK Compatibility" },
    UnicodeRange { first: 0x3400, last: 0x4DBF, name: "CJK Unified Ideographs Extension A" },
    UnicodeRange { first: 0x4DC0, last: 0x4DFF, name: "Yijing Hexagram Symbols" },
    UnicodeRange { first: 0x4E00, last: 0x9FFF, name: "CJK Unified Ideographs" },
    UnicodeRange { first: 0xA000, last: 0xA48F, name: "Yi Syllables" },
    UnicodeRange { first: 0xA490, last: 0xA4CF, name: "Yi Radicals" },
    UnicodeRange { first: 0xA4D0, last: 0xA4FF, name: "Lisu" },
    UnicodeRange { first: 0xA500, last: 0xA63F, name: "Vai" },
    UnicodeRange { first: 0xA640, last: 0xA69F, name: "Cyrillic Extended-B" },
    UnicodeRange { first: 0xA6A0, last: 0xA6FF, name: "Bamum" },
    UnicodeRange { first: 0xA700, last: 0xA71F, name: "Modifier Tone Letters" },
    UnicodeRange { first: 0xA720, last: 0xA7FF, name: "Latin Extended-D" },
    UnicodeRange { first: 0xA800, last: 0xA82F, name: "Syloti Nagri" },
    UnicodeRange { first: 0xA830, last: 0xA83F, name: "Common Indic Number Forms" },
    UnicodeRange { first: 0xA840, last: 0xA87F, name: "Phags-pa" },
    UnicodeRange { first: 0xA880, last: 0xA8DF, name: "Saurashtra" },
    UnicodeRange { first: 0xA8E0, last: 0xA8FF, name: "Devanagari Extended" },
    UnicodeRange { first: 0xA900, last: 0xA92F, name: "Kayah Li" },
    UnicodeRange { first: 0xA930, last: 0xA95F, name: "Rejang" },
    UnicodeRange { first: 0xA960, last: 0xA97F, name: "Hangul Jamo Extended-A" },
    UnicodeRange { first: 0xA980, last: 0xA9DF, name: "Javanese" },
    UnicodeRange { first: 0xA9E0, last: 0xA9FF, name: "Myanmar Extended-B" },
    UnicodeRange { first: 0xAA00, last: 0xAA5F, name: "Cham" },
    UnicodeRange { first: 0xAA60, last: 0xAA7F, name: "Myanmar Extended-A" },
    UnicodeRange { first: 0xAA80, last: 0xAADF, name: "Tai Viet" },
    UnicodeRange { first: 0xAAE0, last: 0xAAFF, name: "Meetei Mayek Extensions" },
    UnicodeRange { first: 0xAB00, last: 0xAB2F, name: "Ethiopic Extended-A" },
    UnicodeRange { first: 0xAB30, last: 0xAB6F, name: "Latin Extended-E" },
    UnicodeRange { first: 0xAB70, last: 0xABBF, name: "Cherokee Supplement" },
    UnicodeRange { first: 0xABC0, last: 0xABFF, name: "Meetei Mayek" },
    UnicodeRange { first: 0xAC00, last: 0xD7AF, name: "Hangul Syllables" },
    UnicodeRange { first: 0xD7B0, last: 0xD7FF, name: "Hangul Jamo Extended-B" },
    UnicodeRange { first: 0xD800, last: 0xDB7F, name: "High Surrogates" },
    UnicodeRange { first: 0xDB80, last: 0xDBFF, name: "High Private Use Surrogates" },
    UnicodeRange { first: 0xDC00, last: 0xDFFF, name: "Low Surrogates" },
    UnicodeRange { first: 0xE000, last: 0xF8FF, name: "Private Use Area" },
    UnicodeRange { first: 0xF900, last: 0xFAFF, name: "CJK Compatibility Ideographs" },
    UnicodeRange { first: 0xFB00, last: 0xFB4F, name: "Alphabetic Presentation Forms" },
    UnicodeRange { first: 0xFB50, last: 0xFDFF, name: "Arabic Presentation Forms-A" },
    UnicodeRange { first: 0xFE00, last: 0xFE0F, name: "Variation Selectors" },
    UnicodeRange { first: 0xFE10, last: 0xFE1F, name: "Vertical Forms" },
    UnicodeRange { first: 0xFE20, last: 0xFE2F, name: "Combining Half Marks" },
    UnicodeRange { first: 0xFE30, last: 0xFE4F, name: "CJK Compatibility Forms" },
    UnicodeRange { first: 0xFE50, last: 0xFE6F, name: "Small Form Variants" },
    UnicodeRange { first: 0xFE70, last: 0xFEFF, name: "Arabic Presentation Forms-B" },
    UnicodeRange { first: 0xFF00, last: 0xFFEF, name: "Halfwidth and Fullwidth Forms" },
    UnicodeRange { first: 0xFFF0, last: 0xFFFF, name: "Specials" },];
