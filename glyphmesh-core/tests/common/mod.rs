//! Shared fixture builder: assembles valid TrueType blobs byte by byte,
//! with correct directory and whole-file checksums, so the integration
//! suites can exercise the decoder without shipping binary fonts.

#![allow(dead_code)]

/// One glyph to be placed in the `glyf` table.
#[derive(Debug, Clone)]
pub enum GlyphDef {
    /// No outline; zero-length glyf entry.
    Empty,
    /// Contours of absolute `(x, y, on_curve)` points in font units.
    Simple(Vec<Vec<(i16, i16, bool)>>),
    /// Components as `(glyph_index, dx, dy)` offsets.
    Composite(Vec<(u16, i16, i16)>),
    /// Raw glyf entry bytes, for hostile inputs.
    Raw(Vec<u8>),
}

/// Builds complete, checksum-correct TrueType files.
#[derive(Debug, Clone)]
pub struct FontBuilder {
    pub units_per_em: u16,
    pub weight_class: u16,
    pub fs_selection: u16,
    pub mac_style: u16,
    pub advance_width: u16,
    pub left_bearing: i16,
    glyphs: Vec<GlyphDef>,
    char_map: Vec<(u16, u16)>,
    names: Vec<(u16, String)>,
}

impl FontBuilder {
    /// A font containing only the notdef glyph and no mapped characters.
    pub fn minimal() -> Self {
        FontBuilder {
            units_per_em: 1000,
            weight_class: 400,
            fs_selection: 0x0040, // regular
            mac_style: 0,
            advance_width: 500,
            left_bearing: 50,
            glyphs: vec![GlyphDef::Empty],
            char_map: Vec::new(),
            names: Vec::new(),
        }
    }

    pub fn add_glyph(&mut self, glyph: GlyphDef) -> u16 {
        self.glyphs.push(glyph);
        (self.glyphs.len() - 1) as u16
    }

    pub fn add_simple_glyph(&mut self, contours: &[Vec<(i16, i16, bool)>]) -> u16 {
        self.add_glyph(GlyphDef::Simple(contours.to_vec()))
    }

    pub fn map_char(&mut self, code: char, glyph: u16) -> &mut Self {
        self.char_map.push((code as u16, glyph));
        self
    }

    pub fn family(&mut self, name: &str) -> &mut Self {
        self.names.push((1, name.to_string()));
        self
    }

    pub fn subfamily(&mut self, name: &str) -> &mut Self {
        self.names.push((2, name.to_string()));
        self
    }

    pub fn full_name(&mut self, name: &str) -> &mut Self {
        self.names.push((4, name.to_string()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let nglyphs = self.glyphs.len() as u16;

        let glyf_entries: Vec<Vec<u8>> = self.glyphs.iter().map(encode_glyf_entry).collect();
        let mut glyf = Vec::new();
        let mut offsets = vec![0u16];
        for entry in &glyf_entries {
            glyf.extend(entry);
            while glyf.len() % 4 != 0 {
                glyf.push(0);
            }
            offsets.push((glyf.len() / 2) as u16);
        }
        let mut loca = Vec::new();
        for offset in offsets {
            loca.extend(&offset.to_be_bytes());
        }

        let tables: Vec<([u8; 4], Vec<u8>)> = vec![
            (*b"OS/2", self.encode_os2()),
            (*b"cmap", self.encode_cmap()),
            (*b"glyf", glyf),
            (*b"head", self.encode_head()),
            (*b"hhea", self.encode_hhea(nglyphs)),
            (*b"hmtx", self.encode_hmtx(nglyphs)),
            (*b"loca", loca),
            (*b"maxp", self.encode_maxp(nglyphs)),
            (*b"name", self.encode_name()),
        ];

        assemble(&tables)
    }

    fn encode_head(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(&[0x00, 0x01, 0x00, 0x00]); // version
        out.extend(&[0x00, 0x01, 0x00, 0x00]); // fontRevision 1.0
        out.extend(&[0x00; 4]); // checkSumAdjustment, patched later
        out.extend(&0x5F0F3CF5u32.to_be_bytes()); // magicNumber
        out.extend(&[0x00, 0x00]); // flags
        out.extend(&self.units_per_em.to_be_bytes());
        out.extend(&[0x00; 16]); // created, modified
        out.extend(&[0x00; 8]); // font bounds
        out.extend(&self.mac_style.to_be_bytes());
        out.extend(&8u16.to_be_bytes()); // lowestRecPPEM
        out.extend(&2u16.to_be_bytes()); // fontDirectionHint
        out.extend(&0u16.to_be_bytes()); // indexToLocFormat: short
        out.extend(&0u16.to_be_bytes()); // glyphDataFormat
        out
    }

    fn encode_maxp(&self, nglyphs: u16) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(&[0x00, 0x01, 0x00, 0x00]);
        out.extend(&nglyphs.to_be_bytes());
        out.extend(&[0x00; 26]); // profile limits, unused by the decoder
        out
    }

    fn encode_hhea(&self, nglyphs: u16) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(&[0x00, 0x01, 0x00, 0x00]); // version
        out.extend(&800i16.to_be_bytes()); // ascender
        out.extend(&(-200i16).to_be_bytes()); // descender
        out.extend(&90i16.to_be_bytes()); // lineGap
        out.extend(&self.advance_width.to_be_bytes()); // advanceWidthMax
        out.extend(&0i16.to_be_bytes()); // minLeftSideBearing
        out.extend(&0i16.to_be_bytes()); // minRightSideBearing
        out.extend(&self.advance_width.to_be_bytes()); // xMaxExtent
        out.extend(&1i16.to_be_bytes()); // caretSlopeRise
        out.extend(&0i16.to_be_bytes()); // caretSlopeRun
        out.extend(&0i16.to_be_bytes()); // caretOffset
        out.extend(&[0x00; 8]); // reserved
        out.extend(&0i16.to_be_bytes()); // metricDataFormat
        out.extend(&nglyphs.to_be_bytes()); // numberOfHMetrics
        out
    }

    fn encode_hmtx(&self, nglyphs: u16) -> Vec<u8> {
        let mut out = Vec::new();
        for _ in 0..nglyphs {
            out.extend(&self.advance_width.to_be_bytes());
            out.extend(&self.left_bearing.to_be_bytes());
        }
        out
    }

    fn encode_os2(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(&0u16.to_be_bytes()); // version
        out.extend(&500i16.to_be_bytes()); // xAvgCharWidth
        out.extend(&self.weight_class.to_be_bytes());
        out.extend(&5u16.to_be_bytes()); // usWidthClass: medium
        out.extend(&0u16.to_be_bytes()); // fsType
        out.extend(&[0x00; 16]); // sub/superscript boxes
        out.extend(&50i16.to_be_bytes()); // yStrikeoutSize
        out.extend(&250i16.to_be_bytes()); // yStrikeoutPosition
        out.extend(&0i16.to_be_bytes()); // sFamilyClass
        out.extend(&[0u8; 10]); // panose
        out.extend(&[0x00; 16]); // ulUnicodeRange
        out.extend(b"TEST"); // achVendID
        out.extend(&self.fs_selection.to_be_bytes());
        out.extend(&0x0020u16.to_be_bytes()); // usFirstCharIndex
        out.extend(&0x00FFu16.to_be_bytes()); // usLastCharIndex
        out.extend(&800i16.to_be_bytes()); // sTypoAscender
        out.extend(&(-200i16).to_be_bytes()); // sTypoDescender
        out.extend(&90i16.to_be_bytes()); // sTypoLineGap
        out.extend(&1000u16.to_be_bytes()); // usWinAscent
        out.extend(&300u16.to_be_bytes()); // usWinDescent
        out
    }

    fn encode_name(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(&0u16.to_be_bytes()); // format
        out.extend(&(self.names.len() as u16).to_be_bytes());
        let string_offset = 6 + self.names.len() * 12;
        out.extend(&(string_offset as u16).to_be_bytes());
        let mut storage = Vec::new();
        for (name_id, value) in &self.names {
            out.extend(&1u16.to_be_bytes()); // platform: Macintosh
            out.extend(&0u16.to_be_bytes()); // encoding: Roman
            out.extend(&0u16.to_be_bytes()); // language
            out.extend(&name_id.to_be_bytes());
            out.extend(&(value.len() as u16).to_be_bytes());
            out.extend(&(storage.len() as u16).to_be_bytes());
            storage.extend(value.as_bytes());
        }
        out.extend(&storage);
        out
    }

    /// Format-4 cmap, one segment per mapped character.
    fn encode_cmap(&self) -> Vec<u8> {
        let mut pairs = self.char_map.clone();
        pairs.sort();
        let seg_count = pairs.len() + 1; // plus the 0xFFFF terminator

        let mut sub = Vec::new();
        sub.extend(&4u16.to_be_bytes()); // format
        sub.extend(&((16 + seg_count * 8) as u16).to_be_bytes()); // length
        sub.extend(&0u16.to_be_bytes()); // language
        sub.extend(&((seg_count * 2) as u16).to_be_bytes()); // segCountX2
        sub.extend(&[0x00; 6]); // search helpers, unused
        for &(code, _) in &pairs {
            sub.extend(&code.to_be_bytes()); // endCode
        }
        sub.extend(&0xFFFFu16.to_be_bytes());
        sub.extend(&0u16.to_be_bytes()); // reservedPad
        for &(code, _) in &pairs {
            sub.extend(&code.to_be_bytes()); // startCode
        }
        sub.extend(&0xFFFFu16.to_be_bytes());
        for &(code, glyph) in &pairs {
            let delta = (glyph as i32 - code as i32) as i16;
            sub.extend(&delta.to_be_bytes()); // idDelta
        }
        sub.extend(&1i16.to_be_bytes());
        for _ in 0..seg_count {
            sub.extend(&0u16.to_be_bytes()); // idRangeOffset
        }

        let mut out = Vec::new();
        out.extend(&0u16.to_be_bytes()); // version
        out.extend(&1u16.to_be_bytes()); // numTables
        out.extend(&3u16.to_be_bytes()); // platform: Windows
        out.extend(&1u16.to_be_bytes()); // encoding: Unicode BMP
        out.extend(&12u32.to_be_bytes()); // subtable offset
        out.extend(&sub);
        out
    }
}

fn encode_glyf_entry(glyph: &GlyphDef) -> Vec<u8> {
    match glyph {
        GlyphDef::Empty => Vec::new(),
        GlyphDef::Raw(bytes) => bytes.clone(),
        GlyphDef::Simple(contours) => {
            let mut out = Vec::new();
            out.extend(&(contours.len() as i16).to_be_bytes());
            let all: Vec<&(i16, i16, bool)> = contours.iter().flatten().collect();
            let x_min = all.iter().map(|p| p.0).min().unwrap_or(0);
            let x_max = all.iter().map(|p| p.0).max().unwrap_or(0);
            let y_min = all.iter().map(|p| p.1).min().unwrap_or(0);
            let y_max = all.iter().map(|p| p.1).max().unwrap_or(0);
            for v in [x_min, y_min, x_max, y_max] {
                out.extend(&v.to_be_bytes());
            }
            let mut end = -1i32;
            for contour in contours {
                end += contour.len() as i32;
                out.extend(&(end as u16).to_be_bytes());
            }
            out.extend(&0u16.to_be_bytes()); // instructionLength
            for &(_, _, on_curve) in &all {
                out.push(if *on_curve { 0x01 } else { 0x00 });
            }
            // full 16-bit deltas, no packing
            let mut prev = 0i16;
            for &(x, _, _) in &all {
                out.extend(&(x - prev).to_be_bytes());
                prev = *x;
            }
            let mut prev = 0i16;
            for &(_, y, _) in &all {
                out.extend(&(y - prev).to_be_bytes());
                prev = *y;
            }
            out
        }
        GlyphDef::Composite(components) => {
            let mut out = Vec::new();
            out.extend(&(-1i16).to_be_bytes());
            out.extend(&[0x00; 8]); // bounds
            for (i, &(glyph, dx, dy)) in components.iter().enumerate() {
                let mut flags = 0x0001 | 0x0002; // words | xy values
                if i + 1 < components.len() {
                    flags |= 0x0020; // more components
                }
                out.extend(&(flags as u16).to_be_bytes());
                out.extend(&glyph.to_be_bytes());
                out.extend(&dx.to_be_bytes());
                out.extend(&dy.to_be_bytes());
            }
            out
        }
    }
}

fn assemble(tables: &[([u8; 4], Vec<u8>)]) -> Vec<u8> {
    let num_tables = tables.len() as u16;
    let mut out = Vec::new();
    out.extend(&0x00010000u32.to_be_bytes()); // sfntVersion
    out.extend(&num_tables.to_be_bytes());
    out.extend(&[0x00; 6]); // search helpers, unused

    let mut offset = 12 + tables.len() * 16;
    let mut head_offset = None;
    for (tag, data) in tables {
        out.extend(tag);
        out.extend(&sfnt_checksum(data).to_be_bytes());
        out.extend(&(offset as u32).to_be_bytes());
        out.extend(&(data.len() as u32).to_be_bytes());
        if tag == b"head" {
            head_offset = Some(offset);
        }
        offset += (data.len() + 3) & !3;
    }
    for (_, data) in tables {
        out.extend(data);
        while out.len() % 4 != 0 {
            out.push(0);
        }
    }

    // whole-file sum must land on the magic constant
    let head_offset = head_offset.expect("head table present");
    let sum = sfnt_checksum(&out);
    let adjustment = 0xB1B0AFBAu32.wrapping_sub(sum);
    out[head_offset + 8..head_offset + 12].copy_from_slice(&adjustment.to_be_bytes());
    out
}

pub fn sfnt_checksum(data: &[u8]) -> u32 {
    let mut sum = 0u32;
    for chunk in data.chunks(4) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum = sum.wrapping_add(u32::from_be_bytes(word));
    }
    sum
}

/// Repairs the whole-file checksum after a test mutated table bytes.
pub fn fix_file_checksum(data: &mut [u8]) {
    let num_tables = u16::from_be_bytes([data[4], data[5]]) as usize;
    for i in 0..num_tables {
        let record = 12 + i * 16;
        if &data[record..record + 4] == b"head" {
            let offset = u32::from_be_bytes([
                data[record + 8],
                data[record + 9],
                data[record + 10],
                data[record + 11],
            ]) as usize;
            data[offset + 8..offset + 12].copy_from_slice(&[0; 4]);
            let sum = sfnt_checksum(data);
            let adjustment = 0xB1B0AFBAu32.wrapping_sub(sum);
            data[offset + 8..offset + 12].copy_from_slice(&adjustment.to_be_bytes());
            return;
        }
    }
    panic!("no head table in fixture");
}

/// Byte range of a table inside a built font, straight from the
/// directory.
pub fn table_range(data: &[u8], tag: &[u8; 4]) -> (usize, usize) {
    let num_tables = u16::from_be_bytes([data[4], data[5]]) as usize;
    for i in 0..num_tables {
        let record = 12 + i * 16;
        if &data[record..record + 4] == tag {
            let offset = u32::from_be_bytes([
                data[record + 8],
                data[record + 9],
                data[record + 10],
                data[record + 11],
            ]) as usize;
            let length = u32::from_be_bytes([
                data[record + 12],
                data[record + 13],
                data[record + 14],
                data[record + 15],
            ]) as usize;
            return (offset, length);
        }
    }
    panic!("table {:?} not in fixture", String::from_utf8_lossy(tag));
}

/// Square contour in font units, counter-clockwise.
pub fn square_contour(x0: i16, y0: i16, size: i16) -> Vec<(i16, i16, bool)> {
    vec![
        (x0, y0, true),
        (x0 + size, y0, true),
        (x0 + size, y0 + size, true),
        (x0, y0 + size, true),
    ]
}

/// Builds the canonical two-glyph test font: notdef plus a glyph for 'A'
/// whose outline is a convex octagon of 8 on-curve points.
pub fn letter_a_font() -> Vec<u8> {
    let mut builder = FontBuilder::minimal();
    let octagon: Vec<(i16, i16, bool)> = vec![
        (200, 0, true),
        (500, 0, true),
        (700, 200, true),
        (700, 500, true),
        (500, 700, true),
        (200, 700, true),
        (0, 500, true),
        (0, 200, true),
    ];
    let glyph = builder.add_simple_glyph(&[octagon]);
    builder.map_char('A', glyph);
    builder.family("Testface");
    builder.build()
}
