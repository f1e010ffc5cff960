//! Local Delaunay optimization by edge flips.
//!
//! An interior edge is flipped when the two triangles a flip would create
//! have a smaller circumradius sum than the current pair. Circumcircles
//! are cached per triangle and the "flip alternative" circles per edge,
//! so repeated passes stay cheap; a successful flip recurses into the
//! four surrounding edges.

use crate::geometry::{circumcircle, is_convex_quad};
use crate::mesher::arena::{EdgeId, TriId, VertId, EDGE_USED};
use crate::mesher::{fail, Flow, Mesher};

impl Mesher {
    /// One optimization sweep over every used edge of the object.
    pub(crate) fn optimize_all(&mut self, deep: usize, object: i32) -> Flow<()> {
        let mut e = self.arena.edge_next(EDGE_USED);
        while e != EDGE_USED {
            let current = e;
            e = self.arena.edge_next(e);
            if self.arena.vert(self.arena.edge(current).v1).object != object {
                continue;
            }
            self.optimize(current, deep)?;
        }
        Ok(())
    }

    /// Tests the flip criterion on one edge and flips when beneficial,
    /// recursing up to `deep` levels into the surrounding edges.
    pub(crate) fn optimize(&mut self, e: EdgeId, deep: usize) -> Flow<()> {
        if deep == 0 {
            return Ok(());
        }
        let (t0, t1) = {
            let edge = self.arena.edge(e);
            match (edge.tri[0], edge.tri[1]) {
                (Some(t0), Some(t1)) => (t0, t1),
                _ => return Ok(()),
            }
        };
        if self.arena.is_contour_edge(e) {
            return Ok(());
        }

        let (v1, v2) = {
            let edge = self.arena.edge(e);
            (edge.v1, edge.v2)
        };
        let o0 = self.arena.opposite_vert(t0, e);
        let o1 = self.arena.opposite_vert(t1, e);

        // a concave quadrilateral is already locally optimal
        if !is_convex_quad(
            self.arena.pos(v1),
            self.arena.pos(o0),
            self.arena.pos(v2),
            self.arena.pos(o1),
        ) {
            return Ok(());
        }

        let mut current_known = true;
        current_known &= self.ensure_triangle_cc(t0, v1, o0, v2);
        current_known &= self.ensure_triangle_cc(t1, v1, o1, v2);

        let mut alternative_known = true;
        alternative_known &= self.ensure_alt_cc(e, 0, o0, v1, o1);
        alternative_known &= self.ensure_alt_cc(e, 1, o0, v2, o1);
        if !alternative_known {
            return Ok(());
        }

        if current_known {
            let edge = self.arena.edge(e);
            let alt = edge.alt_cc[0].radius + edge.alt_cc[1].radius;
            let cur = self.arena.tri(t0).cc.radius + self.arena.tri(t1).cc.radius;
            if alt >= cur {
                return Ok(());
            }
        }

        self.flip_edge(e)?;

        let deep = deep - 1;
        if deep == 0 {
            return Ok(());
        }
        let (t0, t1) = {
            let edge = self.arena.edge(e);
            (edge.tri[0].unwrap(), edge.tri[1].unwrap())
        };
        let (s0, u0) = self.arena.other_edges(t0, e);
        let (s1, u1) = self.arena.other_edges(t1, e);
        self.optimize(s0, deep)?;
        self.optimize(s1, deep)?;
        self.optimize(u0, deep)?;
        self.optimize(u1, deep)?;
        Ok(())
    }

    /// Fills the cached circumcircle of a triangle; false when the
    /// triangle is too degenerate to solve.
    fn ensure_triangle_cc(&mut self, t: TriId, a: VertId, b: VertId, c: VertId) -> bool {
        if !self.arena.tri(t).cc.is_unset() {
            return true;
        }
        match circumcircle(self.arena.pos(a), self.arena.pos(b), self.arena.pos(c)) {
            Some(cc) => {
                self.arena.tri_mut(t).cc = cc;
                true
            }
            None => false,
        }
    }

    fn ensure_alt_cc(&mut self, e: EdgeId, slot: usize, a: VertId, b: VertId, c: VertId) -> bool {
        if !self.arena.edge(e).alt_cc[slot].is_unset() {
            return true;
        }
        match circumcircle(self.arena.pos(a), self.arena.pos(b), self.arena.pos(c)) {
            Some(cc) => {
                self.arena.edge_mut(e).alt_cc[slot] = cc;
                true
            }
            None => false,
        }
    }

    /// Replaces the diagonal of the quadrilateral around `e`: the two
    /// adjacent triangles are rebuilt over the other diagonal, cached
    /// circles migrating so nothing is recomputed.
    pub(crate) fn flip_edge(&mut self, e: EdgeId) -> Flow<()> {
        let (t0, t1) = {
            let edge = self.arena.edge(e);
            (edge.tri[0].unwrap(), edge.tri[1].unwrap())
        };
        let v1 = self.arena.edge(e).v1;
        let (mut a, mut b) = self.arena.other_edges(t0, e);
        let (mut c, mut d) = self.arena.other_edges(t1, e);
        if !self.arena.edge_has_vert(a, v1) {
            std::mem::swap(&mut a, &mut b);
        }
        if !self.arena.edge_has_vert(c, v1) {
            std::mem::swap(&mut c, &mut d);
        }
        let va = self.arena.common_vert(a, b);
        let vb = self.arena.common_vert(c, d);

        self.checkpoint(|| format!("flip edge {}", e.0))?;

        let t0_helper = self.arena.tri(t0).helper;
        let t1_helper = self.arena.tri(t1).helper;
        let t0_cc = self.arena.tri(t0).cc;
        let t1_cc = self.arena.tri(t1).cc;
        let e_alt = self.arena.edge(e).alt_cc;

        self.arena.free_triangle(t0, false);
        self.arena.free_triangle(t1, false);
        self.arena.reset_edge(e, va, vb);
        let new0 = self.arena.create_triangle(a, c, e);
        let new1 = self.arena.create_triangle(b, d, e);
        let (Some(new0), Some(new1)) = (new0, new1) else {
            return fail("flip_edge");
        };

        // the alternatives of the old edge are the circles of the new
        // triangles, and vice versa (crossed: the flip swaps sides)
        self.arena.tri_mut(new0).helper = t0_helper;
        self.arena.tri_mut(new1).helper = t1_helper;
        self.arena.tri_mut(new0).cc = e_alt[0];
        self.arena.tri_mut(new1).cc = e_alt[1];
        self.arena.edge_mut(e).alt_cc = [t1_cc, t0_cc];

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesher::MesherStatus;
    use crate::outline::{Contour, Outline, OutlinePoint};

    /// A fan-shaped polygon that the raw sweep triangulates with skinny
    /// triangles, forcing the optimizer to flip.
    #[test]
    fn test_optimization_improves_min_angle() {
        let points = [
            (0.0, 0.0),
            (10.0, 0.1),
            (20.0, 0.0),
            (20.0, 10.0),
            (10.0, 9.9),
            (0.0, 10.0),
        ];
        let outline = Outline::new(vec![Contour {
            points: points
                .iter()
                .map(|&(x, y)| OutlinePoint::new(x, y, true))
                .collect(),
            subglyph_id: 0,
            subglyph_order: 0,
        }]);
        let mut mesher = Mesher::new(&outline);
        assert_eq!(mesher.run(128), MesherStatus::Done);
        let tris = mesher.surviving_triangles();
        assert_eq!(tris.len(), 4);
        // no sliver triangles survive: every face keeps a reasonable
        // minimum angle
        for t in tris {
            let [a, b, c] = mesher.face_2d(t);
            let pa = mesher.point(a as usize);
            let pb = mesher.point(b as usize);
            let pc = mesher.point(c as usize);
            let area = (pb - pa).cross(pc - pa).abs() / 2.0;
            let longest = (pb - pa)
                .length()
                .max((pc - pb).length())
                .max((pa - pc).length());
            let min_height = 2.0 * area / longest;
            assert!(
                min_height > 0.5,
                "sliver triangle survived optimization: height {min_height}"
            );
        }
    }
}
