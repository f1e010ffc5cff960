//! The sweep phase: unconstrained convex triangulation by a moving front.
//!
//! Vertices arrive in (y, x) order. Each one is dropped onto the front
//! edge bracketing its x, forming one triangle and replacing that edge by
//! two; the fresh corner is then merged with its neighbors while they
//! meet at convex corners of at most 90 degrees. After the last vertex
//! the front is closed up to a fully convex boundary.
//!
//! The front walk is amortized near-constant: consecutive contour points
//! cluster in x, so the bracketing edge is almost always at or next to
//! the cursor.

use crate::geometry::EPSILON;
use crate::mesher::arena::{EdgeId, EDGE_FRONT};
use crate::mesher::{fail, Flow, Mesher};

impl Mesher {
    pub(crate) fn sweep(&mut self, object: i32) -> Flow<()> {
        let Some(seed_edge) = self.arena.create_edge(self.seed[0], self.seed[1]) else {
            return fail("sweep_contour");
        };
        self.arena.reset_front();
        self.arena.edge_insert_after(seed_edge, EDGE_FRONT);
        let mut curr = seed_edge;

        for idx in 0..self.sorted.len() {
            let v = self.sorted[idx];
            if self.arena.vert(v).object != object {
                continue;
            }
            self.checkpoint(|| format!("sweeping point {}", v.0))?;

            let vp = self.arena.pos(v);

            // locate the front edge whose x-range brackets the new vertex
            if self.arena.pos(self.arena.edge(curr).v1).x > vp.x {
                loop {
                    curr = self.arena.edge_prev(curr);
                    if curr == EDGE_FRONT {
                        return fail("sweep: front walk");
                    }
                    let dx1 = self.arena.pos(self.arena.edge(curr).v1).x - vp.x;
                    let dx2 = self.arena.pos(self.arena.edge(curr).v2).x - vp.x;
                    if dx1 * dx2 <= 0.0 && (dx1 != 0.0 || dx2 != 0.0) {
                        break;
                    }
                }
            } else if self.arena.pos(self.arena.edge(curr).v2).x < vp.x {
                loop {
                    curr = self.arena.edge_next(curr);
                    if curr == EDGE_FRONT {
                        return fail("sweep: front walk");
                    }
                    let dx1 = self.arena.pos(self.arena.edge(curr).v1).x - vp.x;
                    let dx2 = self.arena.pos(self.arena.edge(curr).v2).x - vp.x;
                    if dx1 * dx2 <= 0.0 && (dx1 != 0.0 || dx2 != 0.0) {
                        break;
                    }
                }
            }

            let (cv1, cv2) = {
                let edge = self.arena.edge(curr);
                (edge.v1, edge.v2)
            };
            if self.arena.pos(cv1).nearly_equal(vp) || self.arena.pos(cv2).nearly_equal(vp) {
                return fail("sweep: dup points");
            }

            // replace the bracket edge by the two new flanks
            let (left, right) = match (self.arena.create_edge(cv1, v), self.arena.create_edge(v, cv2))
            {
                (Some(l), Some(r)) => (l, r),
                _ => return fail("sweep: create_edge"),
            };
            self.arena.edge_insert_after(left, curr);
            self.arena.edge_insert_after(right, left);
            self.arena.edge_to_used(curr);
            if self.arena.create_triangle(left, right, curr).is_none() {
                return fail("sweep: create_triangle");
            }

            self.checkpoint(|| "sweep: make_convex".to_string())?;

            // near-vertical flanks must be swept away immediately
            let mut left = left;
            let mut right = right;
            if self.vertical_flank(left) {
                let prev = self.arena.edge_prev(left);
                let Some(merged) = self.make_convex(prev, left, left) else {
                    return fail("sweep: make_convex");
                };
                left = merged;
            }
            if self.vertical_flank(right) {
                let next = self.arena.edge_next(right);
                let Some(merged) = self.make_convex(right, next, right) else {
                    return fail("sweep: make_convex");
                };
                right = merged;
            }

            while self.arena.edge_prev(left) != EDGE_FRONT {
                let prev = self.arena.edge_prev(left);
                let Some(merged) = self.make_convex90(prev, left, left) else {
                    return fail("sweep: make_convex90");
                };
                if merged == left {
                    break;
                }
                left = merged;
            }

            while self.arena.edge_next(right) != EDGE_FRONT {
                let next = self.arena.edge_next(right);
                let Some(merged) = self.make_convex90(right, next, right) else {
                    return fail("sweep: make_convex90");
                };
                if merged == right {
                    break;
                }
                right = merged;
            }

            // either flank would do as the next cursor
            curr = right;
        }

        // close the remaining front to a convex boundary
        let mut merged_any = true;
        while merged_any {
            merged_any = false;
            let mut e1 = self.arena.edge_next(EDGE_FRONT);
            let mut e2 = self.arena.edge_next(e1);
            while e1 != EDGE_FRONT && e2 != EDGE_FRONT {
                self.checkpoint(|| "sweep finishing".to_string())?;
                let Some(next) = self.make_convex(e1, e2, e2) else {
                    return fail("sweep finishing: make_convex");
                };
                if next != e2 {
                    merged_any = true;
                }
                e1 = next;
                e2 = self.arena.edge_next(e1);
            }
        }

        while !self.arena.front_is_empty() {
            let e = self.arena.front_first();
            self.arena.edge_to_used(e);
        }

        Ok(())
    }

    fn vertical_flank(&self, e: EdgeId) -> bool {
        let edge = self.arena.edge(e);
        (self.arena.pos(edge.v1).x - self.arena.pos(edge.v2).x).abs() <= EPSILON
    }

    /// Merges two adjacent front edges into one when they turn left,
    /// closing the corner with a triangle. Returns `fallback` when the
    /// corner is not convex, `None` when the pools are exhausted.
    pub(crate) fn make_convex(
        &mut self,
        e1: EdgeId,
        e2: EdgeId,
        fallback: EdgeId,
    ) -> Option<EdgeId> {
        let d1 = self.arena.pos(self.arena.edge(e1).v2) - self.arena.pos(self.arena.edge(e1).v1);
        let d2 = self.arena.pos(self.arena.edge(e2).v2) - self.arena.pos(self.arena.edge(e2).v1);
        if d1.cross(d2) <= 0.0 {
            return Some(fallback);
        }
        self.merge_front_pair(e1, e2)
    }

    /// As [`Mesher::make_convex`] but only for corners of at most 90
    /// degrees (positive turn, non-positive dot product).
    pub(crate) fn make_convex90(
        &mut self,
        e1: EdgeId,
        e2: EdgeId,
        fallback: EdgeId,
    ) -> Option<EdgeId> {
        let d1 = self.arena.pos(self.arena.edge(e1).v2) - self.arena.pos(self.arena.edge(e1).v1);
        let d2 = self.arena.pos(self.arena.edge(e2).v2) - self.arena.pos(self.arena.edge(e2).v1);
        let inv = 1.0 / (d1.length() * d2.length());
        let sin = d1.cross(d2) * inv;
        let cos = d1.dot(d2) * inv;
        if sin < 0.0 || cos > 0.0 {
            return Some(fallback);
        }
        self.merge_front_pair(e1, e2)
    }

    fn merge_front_pair(&mut self, e1: EdgeId, e2: EdgeId) -> Option<EdgeId> {
        let v1 = self.arena.edge(e1).v1;
        let v2 = self.arena.edge(e2).v2;
        let merged = self.arena.create_edge(v1, v2)?;
        self.arena.edge_insert_after(merged, e2);
        self.arena.edge_to_used(e1);
        self.arena.edge_to_used(e2);
        self.arena.create_triangle(e1, e2, merged)?;
        Some(merged)
    }
}
