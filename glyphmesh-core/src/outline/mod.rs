//! Glyph outlines: closed contours of on- and off-curve points, plus the
//! even-odd classification used for hole discovery.

mod linearize;

pub(crate) use linearize::{linearize_outline, split_outline};

use crate::geometry::{Vec2, EPSILON};

/// One point of a glyph contour, in em units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OutlinePoint {
    pub x: f32,
    pub y: f32,
    /// Lies on the curve (straight joint) rather than acting as a
    /// quadratic control handle.
    pub on_curve: bool,
    /// Synthesized midpoint marker set by the splitting transform.
    pub split: bool,
}

impl OutlinePoint {
    pub fn new(x: f32, y: f32, on_curve: bool) -> Self {
        Self {
            x,
            y,
            on_curve,
            split: false,
        }
    }

    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// One closed boundary loop. The last point connects back to the first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contour {
    pub points: Vec<OutlinePoint>,
    /// Glyph index of the subcomponent this contour came from.
    pub subglyph_id: usize,
    /// Reading order of that subcomponent within a composite glyph.
    pub subglyph_order: usize,
}

impl Contour {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Role of a contour within its outline, as decided by the even-odd test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContourRole {
    /// A hole rather than a filled region.
    pub is_hole: bool,
    /// The immediately enclosing contour, when one exists.
    pub parent: Option<usize>,
}

/// A glyph boundary: one or more closed contours.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    pub contours: Vec<Contour>,
}

impl Outline {
    pub fn new(contours: Vec<Contour>) -> Self {
        Self { contours }
    }

    /// Total number of points over all contours.
    pub fn total_points(&self) -> usize {
        self.contours.iter().map(Contour::len).sum()
    }

    /// Counts crossings of the horizontal ray cast from `point` against a
    /// single contour, and reports the distance to the nearest crossing.
    ///
    /// Edges are normalized so the upper endpoint is inclusive and the
    /// lower exclusive; horizontal edges never cross. Only crossings at
    /// `x <= point.x` count, which makes the parity identical to the
    /// usual rightward ray.
    pub fn evenodd_base(&self, point: Vec2, contour: usize) -> (usize, f32) {
        let pts = &self.contours[contour].points;
        if pts.is_empty() {
            return (0, 0.0);
        }
        let mut counter = 0;
        let mut closest_dx = 0.0f32;

        let mut prev = pts.len() - 1;
        for i in 0..pts.len() {
            let (upper, lower) = if pts[i].y > pts[prev].y {
                (&pts[i], &pts[prev])
            } else {
                (&pts[prev], &pts[i])
            };
            if point.y <= upper.y && point.y > lower.y && (point.x >= upper.x || point.x >= lower.x)
            {
                let dy = upper.y - lower.y;
                if dy.abs() > EPSILON {
                    let dx = point.x - (point.y - lower.y) / dy * (upper.x - lower.x) - lower.x;
                    if dx >= 0.0 {
                        if counter == 0 || dx < closest_dx {
                            closest_dx = dx;
                        }
                        counter += 1;
                    }
                }
            }
            prev = i;
        }
        (counter, closest_dx)
    }

    /// Even-odd test over every contour of the given subglyph (or the
    /// whole outline when `subglyph` is `None`).
    pub fn contains(&self, point: Vec2, subglyph: Option<usize>) -> bool {
        let mut count = 0;
        for (i, contour) in self.contours.iter().enumerate() {
            if subglyph.is_some_and(|order| contour.subglyph_order != order) {
                continue;
            }
            count += self.evenodd_base(point, i).0;
        }
        count & 1 == 1
    }

    /// Classifies one contour against its siblings using the sample point
    /// at `test_point`.
    ///
    /// The parent reported for holes is the enclosing sibling whose
    /// crossing lies nearest to the left of the sample.
    pub fn contour_info(
        &self,
        subglyph: Option<usize>,
        contour: usize,
        test_point: usize,
    ) -> ContourRole {
        let sample = self.contours[contour].points[test_point].pos();
        let mut count = 0;
        let mut parent = None;
        let mut closest = 0.0f32;
        for i in 0..self.contours.len() {
            if i == contour {
                continue;
            }
            if subglyph.is_some_and(|order| self.contours[i].subglyph_order != order) {
                continue;
            }
            let (crossings, dist) = self.evenodd_base(sample, i);
            count += crossings;
            if crossings & 1 == 0 {
                continue;
            }
            if parent.is_none() || dist < closest {
                closest = dist;
                parent = Some(i);
            }
        }
        ContourRole {
            is_hole: count & 1 == 1,
            parent,
        }
    }

    /// Majority vote of [`Outline::contour_info`] over three samples at
    /// indices 0, L/3 and 2L/3, robust against tangential ray hits.
    pub fn contour_info_majority(&self, subglyph: Option<usize>, contour: usize) -> ContourRole {
        let step = self.contours[contour].len() / 3;
        let votes = [
            self.contour_info(subglyph, contour, 0),
            self.contour_info(subglyph, contour, step),
            self.contour_info(subglyph, contour, step * 2),
        ];
        let mut index = usize::MAX;
        for (i, vote) in votes.iter().enumerate() {
            if vote.parent.is_none() {
                index = i;
            }
        }
        if index == usize::MAX {
            index = if votes[0].parent == votes[1].parent || votes[0].parent == votes[2].parent {
                0
            } else {
                1
            };
        }
        votes[index]
    }
}
