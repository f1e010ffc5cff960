//! One decoded glyph: metrics, bounding box and (for outline glyphs) the
//! original contour data, plus the conversions into polylines and meshes.

use crate::error::{FontError, Result};
use crate::mesh::{Mesh2D, Mesh3D, MeshFeatures};
use crate::outline::{linearize_outline, split_outline, Outline};

/// A glyph of a loaded font. All metric fields are in em units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Glyph {
    /// Index of this glyph in the font.
    pub index: usize,
    /// Code point mapped to this glyph, when the cmap references it.
    pub code_point: Option<u32>,
    /// Total points over all contours.
    pub npoints: usize,
    /// Number of contours in the outline.
    pub ncontours: usize,
    /// Assembled from subglyph references rather than drawn directly.
    pub composite: bool,
    /// min/max along x.
    pub x_bounds: [f32; 2],
    /// min/max along y.
    pub y_bounds: [f32; 2],
    /// Advance width.
    pub advance: f32,
    /// Left side bearing.
    pub left_bearing: f32,
    /// Right side bearing, `advance - (lsb + xMax - xMin)`.
    pub right_bearing: f32,
    /// Original outline, absent for empty glyphs.
    pub outline: Option<Outline>,
}

impl Glyph {
    fn outline(&self) -> Result<&Outline> {
        self.outline.as_ref().ok_or(FontError::NoOutline)
    }

    /// Converts the outline into a pure polyline at the given quality
    /// (clamped to `[8, 128]`, see [`crate::mesh::QUALITY_NORMAL`] and
    /// friends for presets).
    pub fn linear_outline(&self, quality: u8) -> Result<Outline> {
        let quality = quality.clamp(8, 128);
        Ok(linearize_outline(self.outline()?, quality))
    }

    /// Converts chained quadratic curves into their explicit three-point
    /// form, keeping curves as curves.
    pub fn split_outline(&self) -> Result<Outline> {
        Ok(split_outline(self.outline()?))
    }

    /// Triangulates the glyph interior.
    pub fn to_mesh_2d(&self, quality: u8, features: MeshFeatures) -> Result<Mesh2D> {
        let outline = self.linear_outline(quality)?;
        Mesh2D::from_outline(outline, features)
    }

    /// Triangulates and extrudes the glyph to the given depth along z.
    pub fn to_mesh_3d(&self, quality: u8, features: MeshFeatures, depth: f32) -> Result<Mesh3D> {
        let outline = self.linear_outline(quality)?;
        Mesh3D::from_outline(outline, features, depth)
    }
}
