//! # glyphmesh
//!
//! A pure Rust library that decodes TrueType fonts and converts glyph
//! outlines into 2D triangle meshes and their 3D extrusions.
//!
//! ## Features
//!
//! - **TrueType decoding**: bounds-checked parsing of the sfnt container
//!   and the `head`, `maxp`, `OS/2`, `hhea`, `hmtx`, `name`, `cmap`
//!   (formats 4 and 12), `loca` and `glyf` tables, simple and composite
//!   glyphs included
//! - **Character mapping**: sorted code-point lookup and a 163-range
//!   Unicode coverage set per font
//! - **Font matching**: requirement-based selection over a font list
//!   (bold/italic/weight/family/text coverage)
//! - **Outline processing**: adaptive quadratic-Bézier linearization,
//!   three-point-Bézier splitting, even-odd hole discovery
//! - **Meshing**: constrained Delaunay triangulation by a sweep-line
//!   front, with local edge-flip optimization and hole removal
//! - **Extrusion**: closed 3D meshes with per-vertex flat normals
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use glyphmesh::{Font, MeshFeatures, QUALITY_NORMAL};
//!
//! # fn main() -> glyphmesh::Result<()> {
//! let font = Font::load_from_file("DejaVuSans.ttf", false)?;
//! let glyph = &font.glyphs[font.find_glyph('A' as u32).unwrap()];
//!
//! let mesh = glyph.to_mesh_2d(QUALITY_NORMAL, MeshFeatures::empty())?;
//! println!("{} vertices, {} triangles", mesh.vertices.len(), mesh.faces.len());
//!
//! let solid = glyph.to_mesh_3d(QUALITY_NORMAL, MeshFeatures::empty(), 0.2)?;
//! println!("{} vertices with normals", solid.vertices.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`font`] - the TrueType decoder and font matching
//! - [`outline`] - outline types, linearization and even-odd tests
//! - [`mesher`] - the constrained Delaunay triangulator
//! - [`mesh`] - packed meshes and the 3D extrusion
//! - [`geometry`] - the small planar toolbox everything shares
//!
//! All metrics and coordinates are em-normalized: raw font units divided
//! by `unitsPerEm` at decode time.

pub mod error;
pub mod font;
pub mod geometry;
pub mod glyph;
pub mod mesh;
pub mod mesher;
pub mod outline;

pub use error::{FontError, Result};
pub use font::{
    match_fonts, CharMap, Font, FontNames, HeadInfo, HheaInfo, MacStyleFlags, Os2Info, Requirement,
    SelectionFlags, StyleRequest,
};
pub use geometry::{Vec2, Vec3};
pub use glyph::Glyph;
pub use mesh::{Mesh2D, Mesh3D, MeshFeatures, QUALITY_HIGH, QUALITY_LOW, QUALITY_NORMAL};
pub use mesher::{Mesher, MesherStatus, StepFlow, StepProbe};
pub use outline::{Contour, ContourRole, Outline, OutlinePoint};

/// Font files above this size are rejected by the file loader.
pub const MAX_FILE_SIZE: usize = 32 * 1024 * 1024;
