//! Glyph data decoding: `loca` offsets, simple and composite `glyf`
//! entries, and the `hmtx` metrics fill.
//!
//! Coordinates leave this module in raw font units; the loader scales
//! them to em once the whole decode has succeeded.

use bitflags::bitflags;
use tracing::debug;

use crate::error::{FontError, Result};
use crate::font::reader::ByteReader;
use crate::glyph::Glyph;
use crate::outline::{Contour, Outline, OutlinePoint};

bitflags! {
    /// Simple-glyph flag byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct PointFlags: u8 {
        const ON_CURVE = 0x01;
        const X_SHORT = 0x02;
        const Y_SHORT = 0x04;
        const REPEAT = 0x08;
        const X_SAME_OR_POSITIVE = 0x10;
        const Y_SAME_OR_POSITIVE = 0x20;
        const OVERLAP_SIMPLE = 0x40;
    }
}

bitflags! {
    /// Composite component flag word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct ComponentFlags: u16 {
        const ARGS_ARE_WORDS = 0x0001;
        const ARGS_ARE_XY_VALUES = 0x0002;
        const ROUND_XY_TO_GRID = 0x0004;
        const HAVE_SCALE = 0x0008;
        const MORE_COMPONENTS = 0x0020;
        const HAVE_X_AND_Y_SCALE = 0x0040;
        const HAVE_TWO_BY_TWO = 0x0080;
        const HAVE_INSTRUCTIONS = 0x0100;
        const USE_MY_METRICS = 0x0200;
        const OVERLAP_COMPOUND = 0x0400;
        const SCALED_COMPONENT_OFFSET = 0x0800;
        const UNSCALED_COMPONENT_OFFSET = 0x1000;
    }
}

const GLYF_HEADER_LEN: usize = 10;

/// Converts `loca` to host offsets into `glyf`, one entry per glyph.
///
/// Offsets must be non-decreasing and inside the `glyf` table; fonts
/// violating that are rejected rather than guessed at.
pub(crate) fn parse_loca(
    data: &[u8],
    nglyphs: u16,
    long_format: bool,
    glyf_len: usize,
) -> Result<Vec<u32>> {
    let mut r = ByteReader::new(data);
    let mut offsets = Vec::with_capacity(nglyphs as usize);
    for _ in 0..nglyphs {
        let offset = if long_format {
            r.read_u32()?
        } else {
            r.read_u16()? as u32 * 2
        };
        if let Some(&prev) = offsets.last() {
            if offset < prev {
                return Err(FontError::CorruptFormat(
                    "loca offsets run backwards".to_string(),
                ));
            }
        }
        if offset as usize > glyf_len {
            return Err(FontError::CorruptFormat(
                "loca offset beyond glyf table".to_string(),
            ));
        }
        offsets.push(offset);
    }
    Ok(offsets)
}

/// Decodes every glyph of the font: simple glyphs first, then composites
/// assembled from the already decoded simple outlines.
pub(crate) fn parse_glyf(glyf: &[u8], loca: &[u32], glyphs: &mut [Glyph]) -> Result<()> {
    let nglyphs = glyphs.len();
    let mut simple = 0usize;
    let mut composite = 0usize;

    for i in 0..nglyphs {
        let Some(offset) = glyph_offset(glyf, loca, i)? else {
            continue;
        };
        let mut r = ByteReader::new(&glyf[offset..]);
        if r.clone().read_i16()? >= 0 {
            parse_simple_glyph(&mut r, i, &mut glyphs[i])?;
            simple += 1;
        }
    }

    for i in 0..nglyphs {
        let Some(offset) = glyph_offset(glyf, loca, i)? else {
            continue;
        };
        let mut r = ByteReader::new(&glyf[offset..]);
        if r.clone().read_i16()? < 0 {
            parse_composite_glyph(&mut r, i, glyphs)?;
            composite += 1;
        }
    }

    debug!(simple, composite, "glyf table decoded");
    Ok(())
}

/// Offset of glyph `i` inside `glyf`, or `None` when it has no outline.
fn glyph_offset(glyf: &[u8], loca: &[u32], i: usize) -> Result<Option<usize>> {
    let offset = loca[i] as usize;
    if i + 1 < loca.len() && loca[i] == loca[i + 1] {
        return Ok(None);
    }
    if offset == glyf.len() {
        return Ok(None);
    }
    if offset + GLYF_HEADER_LEN > glyf.len() {
        return Err(FontError::CorruptFormat(
            "glyf entry truncated by table end".to_string(),
        ));
    }
    Ok(Some(offset))
}

struct GlyfHeader {
    number_of_contours: i16,
    x_min: i16,
    y_min: i16,
    x_max: i16,
    y_max: i16,
}

fn read_glyf_header(r: &mut ByteReader) -> Result<GlyfHeader> {
    Ok(GlyfHeader {
        number_of_contours: r.read_i16()?,
        x_min: r.read_i16()?,
        y_min: r.read_i16()?,
        x_max: r.read_i16()?,
        y_max: r.read_i16()?,
    })
}

fn apply_header_bounds(glyph: &mut Glyph, hdr: &GlyfHeader) {
    glyph.x_bounds = [hdr.x_min as f32, hdr.x_max as f32];
    glyph.y_bounds = [hdr.y_min as f32, hdr.y_max as f32];
}

fn parse_simple_glyph(r: &mut ByteReader, index: usize, glyph: &mut Glyph) -> Result<()> {
    let hdr = read_glyf_header(r)?;
    if hdr.number_of_contours <= 0 {
        return Err(FontError::CorruptFormat(
            "simple glyph without contours".to_string(),
        ));
    }
    let ncontours = hdr.number_of_contours as usize;

    let mut end_points = Vec::with_capacity(ncontours);
    for _ in 0..ncontours {
        end_points.push(r.read_u16()?);
    }
    let npoints = *end_points.last().unwrap() as usize + 1;

    // contour lengths from the cumulative endpoint array
    let mut lengths = Vec::with_capacity(ncontours);
    let mut prev = -1i32;
    for &end in &end_points {
        let len = end as i32 - prev;
        if len <= 0 {
            return Err(FontError::CorruptFormat(
                "glyph endpoint array is not ascending".to_string(),
            ));
        }
        lengths.push(len as usize);
        prev = end as i32;
    }
    if lengths.iter().sum::<usize>() != npoints {
        return Err(FontError::CorruptFormat(
            "glyph point total disagrees with endpoints".to_string(),
        ));
    }

    let instruction_len = r.read_u16()? as usize;
    r.skip(instruction_len)?;

    // run-length encoded flag stream
    let mut flags = Vec::with_capacity(npoints);
    while flags.len() < npoints {
        let flag = PointFlags::from_bits_truncate(r.read_u8()?);
        flags.push(flag);
        if flag.contains(PointFlags::REPEAT) {
            let repeat = r.read_u8()? as usize;
            for _ in 0..repeat {
                if flags.len() >= npoints {
                    break;
                }
                flags.push(flag);
            }
        }
    }

    // delta-coded x then y streams
    let mut xs = Vec::with_capacity(npoints);
    let mut x = 0i32;
    for flag in &flags {
        match (
            flag.contains(PointFlags::X_SHORT),
            flag.contains(PointFlags::X_SAME_OR_POSITIVE),
        ) {
            (false, false) => x += r.read_i16()? as i32,
            (false, true) => {}
            (true, false) => x -= r.read_u8()? as i32,
            (true, true) => x += r.read_u8()? as i32,
        }
        xs.push(x);
    }
    let mut ys = Vec::with_capacity(npoints);
    let mut y = 0i32;
    for flag in &flags {
        match (
            flag.contains(PointFlags::Y_SHORT),
            flag.contains(PointFlags::Y_SAME_OR_POSITIVE),
        ) {
            (false, false) => y += r.read_i16()? as i32,
            (false, true) => {}
            (true, false) => y -= r.read_u8()? as i32,
            (true, true) => y += r.read_u8()? as i32,
        }
        ys.push(y);
    }

    let mut contours = Vec::with_capacity(ncontours);
    let mut base = 0;
    for &len in &lengths {
        let mut points: Vec<OutlinePoint> = (base..base + len)
            .map(|i| {
                OutlinePoint::new(
                    xs[i] as f32,
                    ys[i] as f32,
                    flags[i].contains(PointFlags::ON_CURVE),
                )
            })
            .collect();
        // start every contour at an on-curve point when one exists
        if points.len() >= 2 {
            if let Some(first_on) = points.iter().position(|p| p.on_curve) {
                points.rotate_left(first_on);
            }
        }
        contours.push(Contour {
            points,
            subglyph_id: index,
            subglyph_order: 0,
        });
        base += len;
    }

    glyph.ncontours = ncontours;
    glyph.npoints = npoints;
    apply_header_bounds(glyph, &hdr);
    glyph.outline = Some(Outline::new(contours));
    Ok(())
}

struct Component {
    glyph_index: usize,
    arg1: i16,
    arg2: i16,
    scale: [[f32; 2]; 2],
    flags: ComponentFlags,
}

fn read_component(r: &mut ByteReader) -> Result<Component> {
    let mut flags = ComponentFlags::from_bits_truncate(r.read_u16()?);
    let glyph_index = r.read_u16()? as usize;

    if !flags.contains(ComponentFlags::ARGS_ARE_XY_VALUES) {
        // args as point numbers anchor the component to outline points
        return Err(FontError::UnsupportedTable(
            "composite glyph uses point-anchored placement".to_string(),
        ));
    }
    let (arg1, arg2) = if flags.contains(ComponentFlags::ARGS_ARE_WORDS) {
        (r.read_i16()?, r.read_i16()?)
    } else {
        (r.read_i8()? as i16, r.read_i8()? as i16)
    };

    let mut scale = [[1.0, 0.0], [0.0, 1.0]];
    if flags.contains(ComponentFlags::HAVE_SCALE) {
        let s = r.read_f2dot14()?;
        scale[0][0] = s;
        scale[1][1] = s;
    } else if flags.contains(ComponentFlags::HAVE_X_AND_Y_SCALE) {
        scale[0][0] = r.read_f2dot14()?;
        scale[1][1] = r.read_f2dot14()?;
    } else if flags.contains(ComponentFlags::HAVE_TWO_BY_TWO) {
        scale[0][0] = r.read_f2dot14()?;
        scale[0][1] = r.read_f2dot14()?;
        scale[1][0] = r.read_f2dot14()?;
        scale[1][1] = r.read_f2dot14()?;
    }

    if !flags.contains(ComponentFlags::SCALED_COMPONENT_OFFSET)
        && !flags.contains(ComponentFlags::UNSCALED_COMPONENT_OFFSET)
    {
        flags |= ComponentFlags::UNSCALED_COMPONENT_OFFSET;
    }

    Ok(Component {
        glyph_index,
        arg1,
        arg2,
        scale,
        flags,
    })
}

/// Assembles composite glyph `index` from components already decoded in
/// `glyphs`. Composites are processed in index order, so a component that
/// is itself a not-yet-assembled composite contributes nothing; when all
/// components resolve that way the glyph ends up with an empty outline.
fn parse_composite_glyph(r: &mut ByteReader, index: usize, glyphs: &mut [Glyph]) -> Result<()> {
    let hdr = read_glyf_header(r)?;

    let mut components = Vec::new();
    loop {
        let component = read_component(r)?;
        if component.glyph_index >= glyphs.len() {
            return Err(FontError::CorruptFormat(
                "composite component index out of range".to_string(),
            ));
        }
        let more = component.flags.contains(ComponentFlags::MORE_COMPONENTS);
        components.push(component);
        if !more {
            break;
        }
    }

    let mut ncontours = 0;
    let mut npoints = 0;
    for component in &components {
        if let Some(outline) = &glyphs[component.glyph_index].outline {
            ncontours += outline.contours.len();
            npoints += outline.total_points();
        }
    }
    glyphs[index].composite = true;
    if ncontours == 0 || npoints == 0 {
        return Ok(());
    }

    let mut contours = Vec::with_capacity(ncontours);
    for (order, component) in components.iter().enumerate() {
        let Some(outline) = &glyphs[component.glyph_index].outline else {
            continue;
        };
        let scaled = component
            .flags
            .contains(ComponentFlags::SCALED_COMPONENT_OFFSET);
        let (pre_dx, pre_dy, post_dx, post_dy) = if scaled {
            (component.arg1 as f32, component.arg2 as f32, 0.0, 0.0)
        } else {
            (0.0, 0.0, component.arg1 as f32, component.arg2 as f32)
        };
        let s = component.scale;
        for contour in &outline.contours {
            let points = contour
                .points
                .iter()
                .map(|p| {
                    let x = p.x + pre_dx;
                    let y = p.y + pre_dy;
                    OutlinePoint {
                        x: s[0][0] * x + s[0][1] * y + post_dx,
                        y: s[1][0] * x + s[1][1] * y + post_dy,
                        on_curve: p.on_curve,
                        split: p.split,
                    }
                })
                .collect();
            contours.push(Contour {
                points,
                subglyph_id: component.glyph_index,
                subglyph_order: order,
            });
        }
    }

    let glyph = &mut glyphs[index];
    glyph.ncontours = ncontours;
    glyph.npoints = npoints;
    apply_header_bounds(glyph, &hdr);
    glyph.outline = Some(Outline::new(contours));
    Ok(())
}

/// Fills advance widths and side bearings from `hmtx`.
pub(crate) fn parse_hmtx(data: &[u8], number_of_h_metrics: u16, glyphs: &mut [Glyph]) -> Result<()> {
    let nglyphs = glyphs.len();
    let nmetrics = number_of_h_metrics as usize;
    if nmetrics == 0 || nmetrics > nglyphs {
        return Err(FontError::CorruptFormat(format!(
            "hmtx declares {nmetrics} metrics for {nglyphs} glyphs"
        )));
    }
    let expected = nmetrics * 4 + (nglyphs - nmetrics) * 2;
    if data.len() != expected {
        return Err(FontError::CorruptFormat(format!(
            "hmtx table has {} bytes, expected {expected}",
            data.len()
        )));
    }

    let mut r = ByteReader::new(data);
    let mut advance = 0.0;
    for (i, glyph) in glyphs.iter_mut().enumerate() {
        if i < nmetrics {
            advance = r.read_u16()? as f32;
        }
        let lsb = r.read_i16()? as f32;
        glyph.advance = advance;
        glyph.left_bearing = lsb;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Simple square glyph: one contour, four on-curve points.
    fn square_glyf_entry() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend(&1i16.to_be_bytes()); // numberOfContours
        data.extend(&0i16.to_be_bytes()); // xMin
        data.extend(&0i16.to_be_bytes()); // yMin
        data.extend(&100i16.to_be_bytes()); // xMax
        data.extend(&100i16.to_be_bytes()); // yMax
        data.extend(&3u16.to_be_bytes()); // endPtsOfContours
        data.extend(&0u16.to_be_bytes()); // instructionLength
        data.extend(&[0x01; 4]); // flags: on-curve, full deltas
        for delta in [0i16, 100, 0, -100] {
            data.extend(&delta.to_be_bytes()); // x deltas
        }
        for delta in [0i16, 0, 100, 0] {
            data.extend(&delta.to_be_bytes()); // y deltas
        }
        data
    }

    #[test]
    fn test_simple_glyph_decoding() {
        let data = square_glyf_entry();
        let mut glyph = Glyph::default();
        parse_simple_glyph(&mut ByteReader::new(&data), 0, &mut glyph).unwrap();
        assert_eq!(glyph.ncontours, 1);
        assert_eq!(glyph.npoints, 4);
        assert_eq!(glyph.x_bounds, [0.0, 100.0]);
        let outline = glyph.outline.unwrap();
        let points = &outline.contours[0].points;
        assert_eq!(points[1].x, 100.0);
        assert_eq!(points[2].y, 100.0);
        assert_eq!(points[3].x, 0.0);
        assert!(points.iter().all(|p| p.on_curve));
    }

    #[test]
    fn test_repeat_flag_expansion() {
        let mut data = Vec::new();
        data.extend(&1i16.to_be_bytes());
        data.extend(&[0u8; 8]); // bounds
        data.extend(&3u16.to_be_bytes());
        data.extend(&0u16.to_be_bytes());
        data.extend(&[0x09, 0x03]); // on-curve with repeat 3 => 4 flags
        for delta in [0i16, 10, 0, -10] {
            data.extend(&delta.to_be_bytes());
        }
        for delta in [0i16, 0, 10, 0] {
            data.extend(&delta.to_be_bytes());
        }
        let mut glyph = Glyph::default();
        parse_simple_glyph(&mut ByteReader::new(&data), 0, &mut glyph).unwrap();
        assert_eq!(glyph.npoints, 4);
    }

    #[test]
    fn test_contour_rotates_to_on_curve_start() {
        let mut data = Vec::new();
        data.extend(&1i16.to_be_bytes());
        data.extend(&[0u8; 8]);
        data.extend(&2u16.to_be_bytes()); // 3 points
        data.extend(&0u16.to_be_bytes());
        data.extend(&[0x00, 0x01, 0x01]); // off, on, on
        for delta in [0i16, 10, 10] {
            data.extend(&delta.to_be_bytes());
        }
        for delta in [0i16, 10, -5] {
            data.extend(&delta.to_be_bytes());
        }
        let mut glyph = Glyph::default();
        parse_simple_glyph(&mut ByteReader::new(&data), 0, &mut glyph).unwrap();
        let outline = glyph.outline.unwrap();
        let points = &outline.contours[0].points;
        assert!(points[0].on_curve);
        assert!(!points[2].on_curve);
        // rotation preserves the cyclic order
        assert_eq!((points[0].x, points[0].y), (10.0, 10.0));
        assert_eq!((points[2].x, points[2].y), (0.0, 0.0));
    }

    #[test]
    fn test_truncated_glyph_is_rejected() {
        let data = square_glyf_entry();
        let truncated = &data[..data.len() - 4];
        let mut glyph = Glyph::default();
        assert!(matches!(
            parse_simple_glyph(&mut ByteReader::new(truncated), 0, &mut glyph),
            Err(FontError::CorruptFormat(_))
        ));
    }

    #[test]
    fn test_loca_monotonicity() {
        let mut data = Vec::new();
        for value in [0u16, 20, 10] {
            data.extend(&value.to_be_bytes());
        }
        assert!(matches!(
            parse_loca(&data, 3, false, 1000),
            Err(FontError::CorruptFormat(_))
        ));

        let mut data = Vec::new();
        for value in [0u16, 10, 20] {
            data.extend(&value.to_be_bytes());
        }
        assert_eq!(parse_loca(&data, 3, false, 1000).unwrap(), vec![0, 20, 40]);
    }

    #[test]
    fn test_point_anchored_composite_is_unsupported() {
        let mut data = Vec::new();
        data.extend(&(-1i16).to_be_bytes());
        data.extend(&[0u8; 8]);
        data.extend(&0x0001u16.to_be_bytes()); // words, but no XY flag
        data.extend(&1u16.to_be_bytes());
        data.extend(&[0u8; 4]);
        let mut glyphs = vec![Glyph::default(), Glyph::default()];
        assert!(matches!(
            parse_composite_glyph(&mut ByteReader::new(&data), 0, &mut glyphs),
            Err(FontError::UnsupportedTable(_))
        ));
    }

    #[test]
    fn test_composite_translates_components() {
        let mut glyphs = vec![Glyph::default(), Glyph::default()];
        parse_simple_glyph(
            &mut ByteReader::new(&square_glyf_entry()),
            0,
            &mut glyphs[0],
        )
        .unwrap();

        // two references to glyph 0, the second shifted by (500, 0)
        let mut data = Vec::new();
        data.extend(&(-1i16).to_be_bytes());
        data.extend(&[0u8; 8]);
        data.extend(&0x0023u16.to_be_bytes()); // words | xy values | more
        data.extend(&0u16.to_be_bytes());
        data.extend(&0i16.to_be_bytes());
        data.extend(&0i16.to_be_bytes());
        data.extend(&0x0003u16.to_be_bytes()); // words | xy values
        data.extend(&0u16.to_be_bytes());
        data.extend(&500i16.to_be_bytes());
        data.extend(&0i16.to_be_bytes());

        parse_composite_glyph(&mut ByteReader::new(&data), 1, &mut glyphs).unwrap();
        let glyph = &glyphs[1];
        assert!(glyph.composite);
        assert_eq!(glyph.ncontours, 2);
        assert_eq!(glyph.npoints, 8);
        let outline = glyph.outline.as_ref().unwrap();
        assert_eq!(outline.contours[0].subglyph_order, 0);
        assert_eq!(outline.contours[1].subglyph_order, 1);
        for (a, b) in outline.contours[0]
            .points
            .iter()
            .zip(&outline.contours[1].points)
        {
            assert_eq!(b.x, a.x + 500.0);
            assert_eq!(b.y, a.y);
        }
    }

    #[test]
    fn test_hmtx_fill_with_tail_bearings() {
        let mut glyphs = vec![Glyph::default(), Glyph::default(), Glyph::default()];
        let mut data = Vec::new();
        data.extend(&500u16.to_be_bytes());
        data.extend(&50i16.to_be_bytes());
        data.extend(&600u16.to_be_bytes());
        data.extend(&60i16.to_be_bytes());
        data.extend(&70i16.to_be_bytes()); // tail lsb only
        parse_hmtx(&data, 2, &mut glyphs).unwrap();
        assert_eq!(glyphs[0].advance, 500.0);
        assert_eq!(glyphs[1].advance, 600.0);
        assert_eq!(glyphs[2].advance, 600.0);
        assert_eq!(glyphs[2].left_bearing, 70.0);
    }

    #[test]
    fn test_hmtx_size_must_match() {
        let mut glyphs = vec![Glyph::default()];
        let data = [0u8; 6];
        assert!(matches!(
            parse_hmtx(&data, 1, &mut glyphs),
            Err(FontError::CorruptFormat(_))
        ));
    }
}
