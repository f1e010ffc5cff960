//! Font selection over a loaded list.
//!
//! Each candidate is scored per requirement on a 0..=3 scale and the
//! scores are concatenated base-4, so earlier requirements dominate later
//! ones. An exact requirement disqualifies any candidate scoring below 3.

use crate::font::tables::SelectionFlags;
use crate::font::Font;
use crate::font::ranges::find_range;

pub const WEIGHT_THIN: u16 = 100;
pub const WEIGHT_EXTRALIGHT: u16 = 200;
pub const WEIGHT_LIGHT: u16 = 300;
pub const WEIGHT_NORMAL: u16 = 400;
pub const WEIGHT_MEDIUM: u16 = 500;
pub const WEIGHT_DEMIBOLD: u16 = 600;
pub const WEIGHT_BOLD: u16 = 700;
pub const WEIGHT_EXTRABOLD: u16 = 800;
pub const WEIGHT_BLACK: u16 = 900;

/// One property a caller asks of a font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleRequest<'a> {
    /// Bold per OS/2 fsSelection.
    Bold,
    /// Italic per OS/2 fsSelection.
    Italic,
    /// Outlined (hollow) glyphs.
    Hollow,
    /// Oblique; italic fonts score 2 as a fallback.
    Oblique,
    /// The standard weight/style of the family.
    Regular,
    /// Weight class; score falls off by 1 per 100 of distance.
    Weight(u16),
    /// Family name; exact 3, "Times" vs "Times New Roman" 2, the reverse
    /// 1, case-insensitive.
    Family(&'a str),
    /// Text the font should cover: 3 when every covered-range character
    /// matches, 2 above two thirds, 1 above one half.
    Text(&'a str),
}

/// A scored requirement; `exact` turns a partial match into a veto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement<'a> {
    pub request: StyleRequest<'a>,
    pub exact: bool,
}

impl<'a> Requirement<'a> {
    pub fn new(request: StyleRequest<'a>) -> Self {
        Self {
            request,
            exact: false,
        }
    }

    pub fn exact(request: StyleRequest<'a>) -> Self {
        Self {
            request,
            exact: true,
        }
    }
}

/// Matching level of one font against one request, 0..=3.
fn matching_metric(font: &Font, request: &StyleRequest) -> u64 {
    let selection = font.os2.selection;
    match request {
        StyleRequest::Bold => bool_metric(selection.contains(SelectionFlags::BOLD)),
        StyleRequest::Italic => bool_metric(selection.contains(SelectionFlags::ITALIC)),
        StyleRequest::Hollow => bool_metric(selection.contains(SelectionFlags::OUTLINED)),
        StyleRequest::Oblique => {
            if selection.contains(SelectionFlags::OBLIQUE) {
                3
            } else if selection.contains(SelectionFlags::ITALIC) {
                2
            } else {
                0
            }
        }
        StyleRequest::Regular => bool_metric(selection.contains(SelectionFlags::REGULAR)),
        StyleRequest::Weight(weight) => {
            let delta = (font.os2.weight_class as i32 - *weight as i32).unsigned_abs() / 100;
            if delta > 3 {
                0
            } else {
                3 - delta as u64
            }
        }
        StyleRequest::Family(family) => family_metric(family, &font.names.family),
        StyleRequest::Text(text) => text_metric(font, text),
    }
}

fn bool_metric(matched: bool) -> u64 {
    if matched {
        3
    } else {
        0
    }
}

fn family_metric(wanted: &str, actual: &str) -> u64 {
    let mut a = wanted.bytes().map(|b| b.to_ascii_uppercase());
    let mut b = actual.bytes().map(|b| b.to_ascii_uppercase());
    loop {
        match (a.next(), b.next()) {
            (None, None) => return 3,
            (Some(x), Some(y)) if x == y => continue,
            // asked "Times", font is "Times New Roman"
            (None, Some(b' ')) => return 2,
            // asked "Times New Roman", font is "Times"
            (Some(b' '), None) => return 1,
            _ => return 0,
        }
    }
}

fn text_metric(font: &Font, text: &str) -> u64 {
    let mut total = 0u32;
    let mut matched = 0u32;
    for ch in text.chars() {
        let Some(range) = find_range(ch as u32) else {
            continue;
        };
        if font.unicode_coverage.contains_range(range) {
            matched += 1;
        }
        total += 1;
    }
    if matched == total {
        3
    } else if matched > total * 2 / 3 {
        2
    } else if matched >= total / 2 {
        1
    } else {
        0
    }
}

/// Index of the best-scoring font in `list`, or `None` when every
/// candidate scores zero (or is vetoed by an exact requirement).
pub fn match_fonts(list: &[&Font], requirements: &[Requirement]) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut best_score = 0u64;

    for (i, font) in list.iter().enumerate() {
        let mut score = 0u64;
        for requirement in requirements {
            let metric = matching_metric(font, &requirement.request);
            if requirement.exact && metric != 3 {
                score = 0;
                break;
            }
            score = (score << 2) | metric;
        }
        if score > best_score {
            best_score = score;
            best = Some(i);
        }
    }
    best
}
