//! Packed triangle meshes and the 3D extrusion.
//!
//! The mesher's pooled result is flattened into plain vertex and face
//! arrays. The 3D variant duplicates the cap at `z = ±depth/2` and joins
//! the two planes with one quad per contour edge.

use bitflags::bitflags;
use tracing::debug;

use crate::error::{FontError, Result};
use crate::geometry::{face_normal, Vec2, Vec3};
use crate::mesher::{Mesher, MesherStatus};
use crate::outline::Outline;

/// Fast preview tessellation.
pub const QUALITY_LOW: u8 = 10;
/// The default tessellation density.
pub const QUALITY_NORMAL: u8 = 20;
/// Dense tessellation for close-ups.
pub const QUALITY_HIGH: u8 = 50;

bitflags! {
    /// Options of the mesh building operations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MeshFeatures: u32 {
        /// Accept meshes the triangulator finished with a warning.
        const IGNORE_MESHER_WARNINGS = 0x0001;
    }
}

/// A 2D triangle mesh of a glyph interior.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh2D {
    /// Vertex positions in em units.
    pub vertices: Vec<Vec2>,
    /// Counter-clockwise triangles indexing `vertices`.
    pub faces: Vec<[u32; 3]>,
    /// The linearized outline the mesh was built from.
    pub outline: Outline,
}

/// An extruded glyph mesh: two caps and the side walls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh3D {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
    /// One unit normal per vertex; side-wall vertices are duplicated per
    /// quad so each wall keeps its own flat normal.
    pub normals: Vec<Vec3>,
    /// The linearized outline the mesh was built from.
    pub outline: Outline,
}

/// Runs the triangulator over a linearized outline, mapping its status
/// onto the error taxonomy.
fn run_mesher(outline: &Outline, features: MeshFeatures) -> Result<Mesher> {
    if outline.total_points() < 3 {
        return Err(FontError::NoOutline);
    }
    let mut mesher = Mesher::new(outline);
    match mesher.run(128) {
        MesherStatus::Done => Ok(mesher),
        MesherStatus::Warn if features.contains(MeshFeatures::IGNORE_MESHER_WARNINGS) => Ok(mesher),
        MesherStatus::Warn => Err(FontError::MesherFailed(
            "triangulation incomplete".to_string(),
        )),
        MesherStatus::Failed | MesherStatus::Trapped => {
            Err(FontError::MesherFailed(mesher.message().to_string()))
        }
    }
}

impl Mesh2D {
    /// Triangulates an already linearized outline.
    pub fn from_outline(outline: Outline, features: MeshFeatures) -> Result<Mesh2D> {
        let mut mesher = run_mesher(&outline, features)?;

        let vertices: Vec<Vec2> = (0..mesher.point_count()).map(|i| mesher.point(i)).collect();
        let mut faces = Vec::new();
        for t in mesher.surviving_triangles() {
            faces.push(mesher.face_2d(t));
        }
        debug!(
            nvert = vertices.len(),
            nfaces = faces.len(),
            "packed 2d mesh"
        );
        Ok(Mesh2D {
            vertices,
            faces,
            outline,
        })
    }
}

impl Mesh3D {
    /// Triangulates and extrudes an already linearized outline to the
    /// given depth along z.
    pub fn from_outline(outline: Outline, features: MeshFeatures, depth: f32) -> Result<Mesh3D> {
        let mut mesher = run_mesher(&outline, features)?;

        let nv = mesher.point_count();
        let half = depth * 0.5;

        let mut vertices: Vec<Vec3> = Vec::with_capacity(nv * 2);
        for i in 0..nv {
            let p = mesher.point(i);
            vertices.push(Vec3::new(p.x, p.y, half));
        }
        for i in 0..nv {
            let p = mesher.point(i);
            vertices.push(Vec3::new(p.x, p.y, -half));
        }

        let triangles = mesher.surviving_triangles();
        let mut front = Vec::with_capacity(triangles.len());
        let mut back = Vec::with_capacity(triangles.len());
        let mut sides = Vec::new();

        for t in triangles {
            let ([v1, v2, v3], contour_flags) = mesher.face_3d(t);
            front.push([v1, v2, v3]);
            back.push([v3 + nv as u32, v2 + nv as u32, v1 + nv as u32]);

            // one quad per contour edge, with its own four vertices
            let quad_pairs = [(v1, v3), (v2, v1), (v3, v2)];
            for (is_contour, (a, b)) in contour_flags.into_iter().zip(quad_pairs) {
                if !is_contour {
                    continue;
                }
                let base = vertices.len() as u32;
                let pa = mesher.point(a as usize);
                let pb = mesher.point(b as usize);
                vertices.push(Vec3::new(pa.x, pa.y, half));
                vertices.push(Vec3::new(pb.x, pb.y, half));
                vertices.push(Vec3::new(pa.x, pa.y, -half));
                vertices.push(Vec3::new(pb.x, pb.y, -half));
                sides.push([base, base + 1, base + 2]);
                sides.push([base + 2, base + 1, base + 3]);
            }
        }

        let mut faces = front;
        faces.append(&mut back);
        faces.append(&mut sides);

        // flat shading: each vertex takes the normal of the first face
        // that owns it
        let mut normals = vec![Vec3::ZERO; vertices.len()];
        let mut assigned = vec![false; vertices.len()];
        for face in &faces {
            let n = face_normal(
                vertices[face[0] as usize],
                vertices[face[1] as usize],
                vertices[face[2] as usize],
            );
            for &v in face {
                if !assigned[v as usize] {
                    normals[v as usize] = n;
                    assigned[v as usize] = true;
                }
            }
        }

        debug!(
            nvert = vertices.len(),
            nfaces = faces.len(),
            "packed 3d mesh"
        );
        Ok(Mesh3D {
            vertices,
            faces,
            normals,
            outline,
        })
    }
}
