//! Constrained Delaunay triangulation of linearized glyph outlines.
//!
//! The pipeline is a modified Domiter-Žalik sweep: per triangulation
//! object (one filled outer contour plus its holes) the vertices are
//! swept bottom-up into a convex triangulation, locally optimized by
//! edge flips, constrained to the contour edges by strip carving, and
//! stripped of outside/hole triangles by an even-odd flood fill.

mod arena;
mod constraint;
mod delaunay;
mod sweep;

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::geometry::{segment_cross_params, Vec2, EPSILON};
use crate::outline::Outline;
use arena::{Arena, TriId, VertId, Vertex};

/// Result of a mesher run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MesherStatus {
    /// Triangulation complete.
    Done,
    /// Some contour edge is missing from the result, but it is usable.
    Warn,
    /// Data or algorithmic failure; see [`Mesher::message`].
    Failed,
    /// The probe callback requested a stop.
    Trapped,
}

/// Verdict of the step probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepFlow {
    Continue,
    Stop,
}

/// Optional single-stepping callback: step index and a state description
/// in, [`StepFlow`] out.
pub type StepProbe = Box<dyn FnMut(usize, &str) -> StepFlow>;

/// Internal control flow: a failure message or a probe trap.
pub(crate) enum Halt {
    Fail(String),
    Trap(String),
}

pub(crate) type Flow<T> = std::result::Result<T, Halt>;

pub(crate) fn fail<T>(message: impl Into<String>) -> Flow<T> {
    Err(Halt::Fail(message.into()))
}

/// Upper bounds of the pools: triangles from the vertex count, edges
/// from the triangle count.
fn max_triangles(maxv: usize) -> usize {
    maxv.saturating_sub(3) * 2 + 1
}

fn max_edges(maxt: usize) -> usize {
    maxt * 2 + 1
}

/// The sweep-line triangulator over one linearized outline.
pub struct Mesher {
    arena: Arena,
    /// Vertex ids sorted by (y, x).
    sorted: Vec<VertId>,
    /// The two synthetic sweep seeds below the glyph.
    seed: [VertId; 2],
    /// Number of source contours (for the object map).
    ncontours: usize,
    steps: usize,
    message: String,
    probe: Option<StepProbe>,
}

impl Mesher {
    /// Builds the arena from a linearized outline: pool bounds from the
    /// point count, one vertex per contour point, hole classification by
    /// majority vote, and the two sweep seeds just outside the bounding
    /// box.
    pub fn new(outline: &Outline) -> Self {
        let total = outline.total_points();
        let maxt = max_triangles(total + 2);
        let maxe = max_edges(maxt);
        let mut arena = Arena::with_capacity(maxe, maxt);

        for (i, contour) in outline.contours.iter().enumerate() {
            if contour.len() < 3 {
                continue;
            }
            // duplicated contours appear in real fonts (U+2592 is the
            // classic case) and would make the sweep reject its own input
            let duplicated = outline.contours[..i]
                .iter()
                .any(|earlier| contours_coincide(earlier, contour));
            if duplicated {
                warn!(contour = i, "skipping duplicated contour");
                continue;
            }

            let role = outline.contour_info_majority(Some(contour.subglyph_order), i);

            let base = arena.verts.len() as u32;
            let len = contour.len() as u32;
            for (j, point) in contour.points.iter().enumerate() {
                let j = j as u32;
                let prev = if j == 0 { base + len - 1 } else { base + j - 1 };
                let next = if j == len - 1 { base } else { base + j + 1 };
                arena.push_vertex(Vertex {
                    pos: point.pos(),
                    contour: i,
                    subglyph: contour.subglyph_order,
                    is_hole: role.is_hole,
                    nested_to: role.parent,
                    object: -1,
                    edges_root: 0,
                    prev_in_contour: VertId(prev),
                    next_in_contour: VertId(next),
                });
            }
        }
        let nv = arena.verts.len();
        arena.nv = nv;

        // seed vertices: a horizontal gap below the glyph, wider than its
        // x-range (12% / 21% padding)
        let mut min = Vec2::new(f32::MAX, f32::MAX);
        let mut max = Vec2::new(f32::MIN, f32::MIN);
        for vertex in &arena.verts {
            min.x = min.x.min(vertex.pos.x);
            min.y = min.y.min(vertex.pos.y);
            max.x = max.x.max(vertex.pos.x);
            max.y = max.y.max(vertex.pos.y);
        }
        if nv == 0 {
            min = Vec2::ZERO;
            max = Vec2::ZERO;
        }
        let seed_y = min.y - (max.y - min.y) * 0.21;
        let seed = [
            Vec2::new(min.x - (max.x - min.x) * 0.12, seed_y),
            Vec2::new(max.x + (max.x - min.x) * 0.12, seed_y),
        ];
        let seed: [VertId; 2] = seed.map(|pos| {
            let id = VertId(arena.verts.len() as u32);
            arena.push_vertex(Vertex {
                pos,
                contour: usize::MAX,
                subglyph: usize::MAX,
                is_hole: false,
                nested_to: None,
                object: 0,
                edges_root: 0,
                prev_in_contour: id,
                next_in_contour: id,
            });
            id
        });

        let mut sorted: Vec<VertId> = (0..nv as u32).map(VertId).collect();
        let mut mesher = Mesher {
            arena,
            sorted: Vec::new(),
            seed,
            ncontours: outline.contours.len(),
            steps: 0,
            message: String::new(),
            probe: None,
        };
        sort_by_sweep_order(&mesher.arena, &mut sorted);
        mesher.sorted = sorted;
        mesher
    }

    /// Installs the single-stepping probe.
    pub fn set_probe(&mut self, probe: StepProbe) {
        self.probe = Some(probe);
    }

    /// Failure or trap description of the last run.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Steps taken by the last run.
    pub fn step_count(&self) -> usize {
        self.steps
    }

    /// Runs the full pipeline; `deep` bounds the flip recursion of the
    /// optimization passes.
    pub fn run(&mut self, deep: usize) -> MesherStatus {
        match self.run_pipeline(deep) {
            Ok(()) => {
                if self.has_missing_constraints() {
                    warn!("triangulation finished with missing contour edges");
                    MesherStatus::Warn
                } else {
                    MesherStatus::Done
                }
            }
            Err(Halt::Fail(message)) => {
                self.message = message;
                MesherStatus::Failed
            }
            Err(Halt::Trap(message)) => {
                self.message = message;
                MesherStatus::Trapped
            }
        }
    }

    fn run_pipeline(&mut self, deep: usize) -> Flow<()> {
        self.fix_contour_bugs()?;

        let nobjects = self.prepare_objects();
        if nobjects == 0 {
            return fail("get_triangulation_objects");
        }
        debug!(
            nobjects,
            nv = self.arena.nv,
            "starting sweep triangulation"
        );

        for object in 0..nobjects as i32 {
            self.sweep(object)?;
            self.optimize_all(deep, object)?;
            self.insert_constraints(object)?;
            self.remove_excess_triangles()?;
            self.optimize_all(deep, object)?;
        }
        Ok(())
    }

    /// Reports a step to the probe, if installed.
    pub(crate) fn checkpoint(&mut self, describe: impl FnOnce() -> String) -> Flow<()> {
        if let Some(probe) = &mut self.probe {
            let text = describe();
            if probe(self.steps, &text) == StepFlow::Stop {
                return Err(Halt::Trap(text));
            }
        }
        self.steps += 1;
        Ok(())
    }

    fn resort(&mut self) {
        let mut sorted = std::mem::take(&mut self.sorted);
        sort_by_sweep_order(&self.arena, &mut sorted);
        self.sorted = sorted;
    }

    /// Repairs the two classes of authoring bugs that break the sweep:
    /// coincident points (nudged apart along their neighbor directions)
    /// and contour self-twists (untangled by swapping the two middle
    /// points).
    fn fix_contour_bugs(&mut self) -> Flow<()> {
        let mut need_resort = false;
        for i in 0..self.sorted.len().saturating_sub(1) {
            let v1 = self.sorted[i];
            let v2 = self.sorted[i + 1];
            let p1 = self.arena.pos(v1);
            let p2 = self.arena.pos(v2);
            if (p1.x - p2.x).abs() > EPSILON || (p1.y - p2.y).abs() > EPSILON {
                continue;
            }
            self.checkpoint(|| format!("separate p{} and p{}", v1.0, v2.0))?;
            for v in [v1, v2] {
                let pos = self.arena.pos(v);
                let to_prev = self.arena.pos(self.arena.vert(v).prev_in_contour) - pos;
                let to_next = self.arena.pos(self.arena.vert(v).next_in_contour) - pos;
                let delta =
                    to_prev * (1e-4 * to_prev.length()) + to_next * (1e-4 * to_next.length());
                self.arena.vert_mut(v).pos = pos + delta;
            }
            need_resort = true;
        }
        if need_resort {
            self.resort();
        }

        for i in 0..self.arena.nv as u32 {
            let a = VertId(i);
            let b = self.arena.vert(a).next_in_contour;
            let c = self.arena.vert(b).next_in_contour;
            let d = self.arena.vert(c).next_in_contour;
            if a == b || a == c || a == d {
                continue;
            }
            let cross = segment_cross_params(
                self.arena.pos(a),
                self.arena.pos(b),
                self.arena.pos(c),
                self.arena.pos(d),
            );
            let Some((s, t)) = cross else { continue };
            if !(s > 0.0 && s < 1.0 && t > 0.0 && t < 1.0) {
                continue;
            }
            self.checkpoint(|| format!("untangle p{} and p{}", b.0, c.0))?;
            self.arena.vert_mut(a).next_in_contour = c;
            self.arena.vert_mut(c).next_in_contour = b;
            self.arena.vert_mut(b).next_in_contour = d;
            self.arena.vert_mut(c).prev_in_contour = a;
            self.arena.vert_mut(b).prev_in_contour = c;
            self.arena.vert_mut(d).prev_in_contour = b;
        }
        Ok(())
    }

    /// Assigns each vertex its triangulation object: one object per
    /// filled contour, holes joining the object of their parent. Holes
    /// nested inside holes end up objectless and are ignored.
    fn prepare_objects(&mut self) -> usize {
        let mut contour_to_object = vec![-1i32; self.ncontours];
        let mut count = 0i32;
        for i in 0..self.arena.nv {
            let vertex = &self.arena.verts[i];
            if vertex.is_hole {
                continue;
            }
            if contour_to_object[vertex.contour] == -1 {
                contour_to_object[vertex.contour] = count;
                count += 1;
            }
        }
        for i in 0..self.arena.nv {
            let vertex = &mut self.arena.verts[i];
            vertex.object = if vertex.is_hole {
                vertex
                    .nested_to
                    .map(|parent| contour_to_object[parent])
                    .unwrap_or(-1)
            } else {
                contour_to_object[vertex.contour]
            };
        }
        count as usize
    }

    /// Even-odd flood fill over the triangulation graph: parity starts at
    /// 0 on a triangle touching a sweep seed, flips across contour edges,
    /// and every parity-0 triangle is deleted.
    fn remove_excess_triangles(&mut self) -> Flow<()> {
        self.checkpoint(|| "removing triangles".to_string())?;

        let seed_edges = self.arena.incident_edges(self.seed[0]);
        let Some(&first_edge) = seed_edges.first() else {
            return fail("remove_excess_triangles");
        };
        let Some(start) = self.arena.edge(first_edge).tri[0] else {
            return fail("remove_excess_triangles");
        };
        self.arena.tri_mut(start).helper = 0;

        let mut queue = VecDeque::from([start]);
        let mut visited = vec![start];
        while let Some(t) = queue.pop_front() {
            for k in 0..3 {
                let e = self.arena.tri(t).edges[k];
                let Some(neighbor) = self.arena.neighbor(t, e) else {
                    continue;
                };
                if self.arena.tri(neighbor).helper >= 0 {
                    continue;
                }
                let label = if self.arena.is_contour_edge(e) {
                    self.arena.tri(t).helper ^ 1
                } else {
                    self.arena.tri(t).helper
                };
                self.arena.tri_mut(neighbor).helper = label;
                queue.push_back(neighbor);
                visited.push(neighbor);
            }
        }

        for t in visited {
            if self.arena.tri(t).helper == 0 {
                self.arena.free_triangle(t, true);
            }
        }
        Ok(())
    }

    /// A contour edge that never made it into the triangulation leaves
    /// the result usable but incomplete.
    fn has_missing_constraints(&self) -> bool {
        (0..self.arena.nv as u32).any(|i| {
            let v = VertId(i);
            self.arena.vert(v).object >= 0
                && self
                    .arena
                    .find_edge(v, self.arena.vert(v).prev_in_contour)
                    .is_none()
        })
    }

    // -- emission --------------------------------------------------------

    /// Number of emitted vertices (sweep seeds excluded).
    pub(crate) fn point_count(&self) -> usize {
        self.arena.nv
    }

    pub(crate) fn point(&self, index: usize) -> Vec2 {
        self.arena.verts[index].pos
    }

    pub(crate) fn surviving_triangles(&self) -> Vec<TriId> {
        self.arena.used_triangles()
    }

    /// Emits one face with the contour-side edge (when the triangle has
    /// one) first in the canonical numbering and counter-clockwise
    /// vertex order.
    pub(crate) fn face_2d(&mut self, t: TriId) -> [u32; 3] {
        let edges = self.arena.tri(t).edges;
        if self.arena.is_contour_edge(edges[1]) {
            self.arena.tri_mut(t).edges.swap(0, 1);
        } else if self.arena.is_contour_edge(edges[2]) {
            self.arena.tri_mut(t).edges.swap(0, 2);
        }
        let edges = self.arena.tri(t).edges;
        let mut v1 = self.arena.common_vert(edges[0], edges[1]);
        let mut v2 = self.arena.common_vert(edges[0], edges[2]);
        let v3 = self.arena.common_vert(edges[1], edges[2]);
        let d1 = self.arena.pos(v1) - self.arena.pos(v2);
        let d2 = self.arena.pos(v1) - self.arena.pos(v3);
        if d1.cross(d2) < 0.0 {
            std::mem::swap(&mut v1, &mut v2);
        }
        [v1.0, v2.0, v3.0]
    }

    /// Emits one face for extrusion: counter-clockwise vertices plus the
    /// contour flag of each edge, ordered to pair off as the side quads
    /// `(v1,v3)`, `(v2,v1)`, `(v3,v2)`.
    pub(crate) fn face_3d(&mut self, t: TriId) -> ([u32; 3], [bool; 3]) {
        let edges = self.arena.tri(t).edges;
        let mut v1 = self.arena.common_vert(edges[1], edges[0]);
        let mut v2 = self.arena.common_vert(edges[1], edges[2]);
        let v3 = self.arena.common_vert(edges[0], edges[2]);
        let d1 = self.arena.pos(v2) - self.arena.pos(v3);
        let d2 = self.arena.pos(v3) - self.arena.pos(v1);
        if d1.cross(d2) < 0.0 {
            self.arena.tri_mut(t).edges.swap(0, 2);
            std::mem::swap(&mut v1, &mut v2);
        }
        let edges = self.arena.tri(t).edges;
        (
            [v1.0, v2.0, v3.0],
            [
                self.arena.is_contour_edge(edges[0]),
                self.arena.is_contour_edge(edges[1]),
                self.arena.is_contour_edge(edges[2]),
            ],
        )
    }
}

/// Sweep order: ascending y, ties broken by x.
fn sort_by_sweep_order(arena: &Arena, ids: &mut [VertId]) {
    ids.sort_by(|&a, &b| {
        let pa = arena.pos(a);
        let pb = arena.pos(b);
        pa.y.total_cmp(&pb.y).then(pa.x.total_cmp(&pb.x))
    });
}

/// Pointwise comparison of two contours within epsilon; designers
/// sometimes ship exact duplicates.
fn contours_coincide(a: &crate::outline::Contour, b: &crate::outline::Contour) -> bool {
    a.len() == b.len()
        && a.points
            .iter()
            .zip(&b.points)
            .all(|(p, q)| (p.x - q.x).abs() <= EPSILON && (p.y - q.y).abs() <= EPSILON)
}
