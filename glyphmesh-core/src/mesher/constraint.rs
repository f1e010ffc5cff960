//! Constraint-edge insertion by triangle-strip carving.
//!
//! Every contour edge missing from the unconstrained triangulation is
//! forced in: the strip of triangles its segment crosses is located and
//! deleted, the two open polylines bordering the cavity are collected,
//! the constraint edge is created, and both halves are retriangulated by
//! repeatedly attaching the cavity vertex closest to the base edge.

use crate::geometry::segments_touch;
use crate::mesher::arena::{EdgeId, VertId};
use crate::mesher::{fail, Flow, Mesher};

impl Mesher {
    /// Inserts every missing contour edge of the object.
    pub(crate) fn insert_constraints(&mut self, object: i32) -> Flow<()> {
        for i in 0..self.arena.nv as u32 {
            let v = VertId(i);
            if self.arena.vert(v).object != object {
                continue;
            }
            let prev = self.arena.vert(v).prev_in_contour;
            if self.arena.find_edge(v, prev).is_some() {
                continue;
            }
            self.insert_constraint_edge(v, prev)?;
        }
        Ok(())
    }

    /// Walks the strip of triangles crossed by the segment `v1-v2`,
    /// detaching each crossed edge into the returned track. Along the
    /// track every edge ends up with `tri[1]` pointing at the triangle
    /// farther from `v1`.
    fn find_triangle_track(&mut self, v1: VertId, v2: VertId) -> Flow<Vec<EdgeId>> {
        self.checkpoint(|| format!("find track p{}->p{}", v1.0, v2.0))?;

        let p1 = self.arena.pos(v1);
        let p2 = self.arena.pos(v2);

        // starting triangle: incident to v1 with its opposite edge
        // crossing the segment
        let mut current_tri = None;
        let mut current_edge = EdgeId::default();
        'search: for e in self.arena.incident_edges(v1) {
            for slot in 0..2 {
                let Some(t) = self.arena.edge(e).tri[slot] else {
                    continue;
                };
                let opposite = self.arena.opposite_edge(t, v1);
                let (a, b) = {
                    let edge = self.arena.edge(opposite);
                    (self.arena.pos(edge.v1), self.arena.pos(edge.v2))
                };
                if !segments_touch(p1, p2, a, b) {
                    continue;
                }
                current_tri = Some(t);
                current_edge = opposite;
                break 'search;
            }
        }
        let Some(mut current_tri) = current_tri else {
            return fail("find_triangles_track #1");
        };

        self.arena.tri_mut(current_tri).helper = -2;
        let mut track = Vec::new();
        loop {
            if self.arena.edge(current_edge).tri[1].is_none() {
                return fail("find_triangles_track #2");
            }
            // orient the crossed edge so tri[1] is the far triangle
            if self.arena.edge(current_edge).tri[1] == Some(current_tri) {
                self.arena.edge_mut(current_edge).tri.swap(0, 1);
            }
            self.arena.edge_detach(current_edge);
            track.push(current_edge);

            current_tri = self.arena.edge(current_edge).tri[1].unwrap();
            if self.arena.tri(current_tri).helper == -2 {
                return fail("find_triangles_track #3");
            }
            self.arena.tri_mut(current_tri).helper = -2;
            if self.arena.opposite_vert(current_tri, current_edge) == v2 {
                break;
            }

            let (second, third) = self.arena.other_edges(current_tri, current_edge);
            let crossing = [second, third].into_iter().find(|&e| {
                let edge = self.arena.edge(e);
                segments_touch(p1, p2, self.arena.pos(edge.v1), self.arena.pos(edge.v2))
            });
            match crossing {
                Some(e) => current_edge = e,
                None => return fail("find_triangles_track #4"),
            }
        }

        Ok(track)
    }

    fn insert_constraint_edge(&mut self, v1: VertId, v2: VertId) -> Flow<()> {
        let track = self.find_triangle_track(v1, v2)?;

        // the two cavity polylines start with the edges joining v1 to the
        // first crossed edge
        let first = track[0];
        let (fv1, fv2) = {
            let edge = self.arena.edge(first);
            (edge.v1, edge.v2)
        };
        let (Some(start1), Some(start2)) =
            (self.arena.find_edge(v1, fv1), self.arena.find_edge(v1, fv2))
        else {
            return fail("insert_fixed_edge #1");
        };
        let mut upper = vec![start1];
        let mut lower = vec![start2];

        for (k, &e) in track.iter().enumerate() {
            let far = self.arena.edge(e).tri[1].unwrap();
            let (second, third) = self.arena.other_edges(far, e);
            let next_track = track.get(k + 1).copied();
            // classify both border edges against the current polyline
            // tails before appending either
            let classify = |cand: EdgeId, mesher: &Mesher| -> Option<bool> {
                if Some(cand) == next_track {
                    None
                } else {
                    Some(mesher.arena.edges_connected(cand, *upper.last().unwrap()))
                }
            };
            let second_goes_upper = classify(second, self);
            let third_goes_upper = classify(third, self);
            for (cand, goes_upper) in [(second, second_goes_upper), (third, third_goes_upper)] {
                match goes_upper {
                    Some(true) => upper.push(cand),
                    Some(false) => lower.push(cand),
                    None => {}
                }
            }
        }

        self.checkpoint(|| format!("remove track v{}->v{} triangles", v1.0, v2.0))?;

        for &e in &track {
            if let Some(t) = self.arena.edge(e).tri[1] {
                self.arena.free_triangle(t, false);
            }
            if let Some(t) = self.arena.edge(e).tri[0] {
                self.arena.free_triangle(t, false);
            }
        }
        for &e in &track {
            if self.arena.is_contour_edge(e) {
                return fail("Contours intersect");
            }
            self.arena.free_edge(e);
        }

        // both polylines must run v1 to v2 without gaps
        for cavity in [&upper, &lower] {
            let mut at = v1;
            for &e in cavity.iter() {
                if !self.arena.edge_has_vert(e, at) {
                    return fail("insert_fixed_edge #2");
                }
                at = self.arena.edge_second_vert(e, at);
            }
            if at != v2 {
                return fail("insert_fixed_edge #3");
            }
        }

        self.checkpoint(|| format!("insert edge v{}->v{}", v1.0, v2.0))?;
        let Some(inserted) = self.arena.create_edge(v1, v2) else {
            return fail("insertion");
        };

        self.triangulate_cavity(upper, inserted)?;
        self.triangulate_cavity(lower, inserted)?;
        Ok(())
    }

    /// Retriangulates one side of a carved cavity against its base edge.
    ///
    /// Work items replace the recursion of the textbook formulation: the
    /// cavity vertex with the smallest projection distance onto the base
    /// is joined to both base endpoints, splitting the polyline in two.
    fn triangulate_cavity(&mut self, cavity: Vec<EdgeId>, base: EdgeId) -> Flow<()> {
        let mut work = vec![(cavity, base)];
        while let Some((cavity, base)) = work.pop() {
            if cavity.len() <= 1 {
                continue;
            }
            if cavity.len() == 2 {
                self.checkpoint(|| format!("make triangle on e{}", base.0))?;
                if self
                    .arena
                    .create_triangle(cavity[0], cavity[1], base)
                    .is_none()
                {
                    return fail("triangulate_hole #1");
                }
                continue;
            }

            self.checkpoint(|| format!("find closest point to e{}", base.0))?;

            let (bv1, bv2) = {
                let edge = self.arena.edge(base);
                (edge.v1, edge.v2)
            };
            let dir = self.arena.pos(bv2) - self.arena.pos(bv1);
            let orth = crate::geometry::Vec2::new(dir.y, -dir.x);

            let mut closest: Option<(usize, VertId, f32)> = None;
            for k in 0..cavity.len() - 1 {
                let v = self.arena.common_vert(cavity[k], cavity[k + 1]);
                let offset = self.arena.pos(v) - self.arena.pos(bv1);
                let proj = orth.dot(offset).abs();
                if closest.is_none() || proj < closest.unwrap().2 {
                    closest = Some((k, v, proj));
                }
            }
            let (split, vertex, _) = closest.unwrap();
            if vertex == bv1 || vertex == bv2 {
                return fail("triangulate_hole #2");
            }

            let left = match self.arena.find_edge(bv1, vertex) {
                Some(e) => e,
                None => match self.arena.create_edge(bv1, vertex) {
                    Some(e) => e,
                    None => return fail("triangulate_hole #3"),
                },
            };
            let right = match self.arena.find_edge(vertex, bv2) {
                Some(e) => e,
                None => match self.arena.create_edge(vertex, bv2) {
                    Some(e) => e,
                    None => return fail("triangulate_hole #3"),
                },
            };
            self.checkpoint(|| format!("make triangle on e{} and p{}", base.0, vertex.0))?;
            if self.arena.create_triangle(base, left, right).is_none() {
                return fail("triangulate_hole #4");
            }

            let mut first_half = cavity;
            let second_half = first_half.split_off(split + 1);
            work.push((first_half, left));
            work.push((second_half, right));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::mesher::{Mesher, MesherStatus};
    use crate::outline::{Contour, Outline, OutlinePoint};

    fn contour(points: &[(f32, f32)], order: usize) -> Contour {
        Contour {
            points: points
                .iter()
                .map(|&(x, y)| OutlinePoint::new(x, y, true))
                .collect(),
            subglyph_id: 0,
            subglyph_order: order,
        }
    }

    /// A deliberately spiky star: the unconstrained sweep will not
    /// produce all its rim edges, so the insertion path must run.
    #[test]
    fn test_star_contour_edges_all_present() {
        let mut points = Vec::new();
        for i in 0..10 {
            let a = std::f32::consts::TAU * i as f32 / 10.0;
            let r = if i % 2 == 0 { 10.0 } else { 2.0 };
            points.push((r * a.cos(), r * a.sin()));
        }
        let outline = Outline::new(vec![contour(&points, 0)]);
        let mut mesher = Mesher::new(&outline);
        let status = mesher.run(128);
        assert_eq!(status, MesherStatus::Done, "message: {}", mesher.message());

        // every rim edge appears in some surviving triangle
        let tris = mesher.surviving_triangles();
        let mut faces = Vec::new();
        for t in tris {
            faces.push(mesher.face_2d(t));
        }
        for i in 0..10u32 {
            let a = i;
            let b = (i + 1) % 10;
            let found = faces.iter().any(|f| {
                f.contains(&a) && f.contains(&b)
            });
            assert!(found, "rim edge {a}-{b} missing from the mesh");
        }
        // the star has 10 rim vertices and no interior ones: 8 faces
        assert_eq!(faces.len(), 8);
    }

    /// A hole whose boundary escapes through its parent cannot be meshed
    /// and must fail cleanly rather than loop or panic.
    #[test]
    fn test_hole_crossing_its_parent_fails() {
        let outline = Outline::new(vec![
            contour(
                &[(0.0, 0.0), (12.0, 0.0), (12.0, 12.0), (0.0, 12.0)],
                0,
            ),
            // sampled points lie inside the square, one vertex far outside
            contour(
                &[
                    (2.0, 2.0),
                    (6.0, 2.0),
                    (10.0, 2.0),
                    (10.0, 15.0),
                    (2.0, 6.0),
                ],
                0,
            ),
        ]);
        let mut mesher = Mesher::new(&outline);
        let status = mesher.run(128);
        assert_eq!(status, MesherStatus::Failed);
        assert!(!mesher.message().is_empty());
    }
}
