//! Conversion of quadratic-Bézier contours into polylines and into the
//! explicit three-point-Bézier form.
//!
//! TrueType chains quadratic curves with implied on-curve midpoints
//! between consecutive control points. The linearizer walks each contour
//! with a small state machine, subdividing every curve by the angle
//! between its end tangents.

use crate::geometry::{herons_area, Vec2, DEGENERATE_AREA, EPSILON};
use crate::outline::{Contour, Outline, OutlinePoint};

/// Quadratic Bézier evaluated at `t`.
fn qbezier(p0: f32, p1: f32, p2: f32, t: f32) -> f32 {
    let tt = 1.0 - t;
    tt * tt * p0 + 2.0 * t * tt * p1 + t * t * p2
}

/// First derivative of the quadratic Bézier at `t`.
fn qbezier_diff1(p0: f32, p1: f32, p2: f32, t: f32) -> f32 {
    2.0 * (t * (p0 - 2.0 * p1 + p2) - p0 + p1)
}

/// Samples the interior of the curve `(p0, p1, p2)` into `out`.
///
/// The sample count follows the turn of the curve: the angle between the
/// end tangents over a full turn, times `quality`.
fn linearize_qbezier(p0: Vec2, p1: Vec2, p2: Vec2, quality: u8, out: &mut Vec<OutlinePoint>) {
    let v1 = Vec2::new(
        qbezier_diff1(p0.x, p1.x, p2.x, 0.0),
        qbezier_diff1(p0.y, p1.y, p2.y, 0.0),
    );
    let v2 = Vec2::new(
        qbezier_diff1(p0.x, p1.x, p2.x, 1.0),
        qbezier_diff1(p0.y, p1.y, p2.y, 1.0),
    );

    let mut angle = v1.cross(v2).abs();
    if angle < EPSILON {
        return;
    }
    angle /= v1.length();
    angle /= v2.length();
    let angle = angle.min(1.0).asin();

    let count = (angle / (2.0 * std::f32::consts::PI) * quality as f32).round() as i32;
    if count <= 0 {
        return;
    }

    let step = 1.0 / (count + 1) as f32;
    for i in 0..count {
        let t = step * (i + 1) as f32;
        out.push(OutlinePoint::new(
            qbezier(p0.x, p1.x, p2.x, t),
            qbezier(p0.y, p1.y, p2.y, t),
            true,
        ));
    }
}

/// The three walking states of the contour linearizer.
enum Walk {
    Start,
    JustOnCurve(Vec2),
    ControlPending(Vec2, Vec2),
}

fn emit_curve(p0: Vec2, p1: Vec2, p2: Vec2, quality: u8, out: &mut Vec<OutlinePoint>) {
    if herons_area(p0, p1, p2) > DEGENERATE_AREA {
        linearize_qbezier(p0, p1, p2, quality, out);
    }
}

fn linearize_contour(src: &Contour, quality: u8) -> Vec<OutlinePoint> {
    let mut out = Vec::with_capacity(src.len());
    let mut state = Walk::Start;

    for point in &src.points {
        let pos = point.pos();
        state = match state {
            Walk::Start => {
                out.push(OutlinePoint::new(pos.x, pos.y, true));
                Walk::JustOnCurve(pos)
            }
            Walk::JustOnCurve(p0) => {
                if point.on_curve {
                    out.push(OutlinePoint::new(pos.x, pos.y, true));
                    Walk::JustOnCurve(pos)
                } else {
                    Walk::ControlPending(p0, pos)
                }
            }
            Walk::ControlPending(p0, p1) => {
                if point.on_curve {
                    emit_curve(p0, p1, pos, quality, &mut out);
                    out.push(OutlinePoint::new(pos.x, pos.y, true));
                    Walk::JustOnCurve(pos)
                } else {
                    // two consecutive controls imply an on-curve midpoint
                    let mid = (p1 + pos) * 0.5;
                    if herons_area(p0, p1, mid) > DEGENERATE_AREA {
                        linearize_qbezier(p0, p1, mid, quality, &mut out);
                        out.push(OutlinePoint::new(mid.x, mid.y, true));
                        Walk::ControlPending(mid, pos)
                    } else {
                        Walk::ControlPending(p0, mid)
                    }
                }
            }
        };
    }

    // close back to the first source point
    if let Walk::ControlPending(p0, p1) = state {
        if let Some(first) = src.points.first() {
            emit_curve(p0, p1, first.pos(), quality, &mut out);
        }
    }

    out
}

/// Collapses collinear runs and trims trailing points equal to the first,
/// leaving a clean simple cycle. Contours reduced below a triangle come
/// back empty.
fn fix_linear_bags(points: &mut Vec<OutlinePoint>) {
    if points.len() < 3 {
        points.clear();
        return;
    }
    let mut n = 1;
    for i in 1..points.len() - 1 {
        if herons_area(points[n - 1].pos(), points[i].pos(), points[i + 1].pos()) > EPSILON {
            points[n] = points[i];
            n += 1;
        }
    }
    points[n] = points[points.len() - 1];
    n += 1;
    while n > 1 {
        let dx = points[0].x - points[n - 1].x;
        let dy = points[0].y - points[n - 1].y;
        if dx.abs() > EPSILON || dy.abs() > EPSILON {
            break;
        }
        n -= 1;
    }
    if n >= 3 {
        points.truncate(n);
    } else {
        points.clear();
    }
}

/// Converts every contour of `outline` to a polyline at the given quality.
pub(crate) fn linearize_outline(outline: &Outline, quality: u8) -> Outline {
    let contours = outline
        .contours
        .iter()
        .map(|contour| {
            let mut points = linearize_contour(contour, quality);
            fix_linear_bags(&mut points);
            Contour {
                points,
                subglyph_id: contour.subglyph_id,
                subglyph_order: contour.subglyph_order,
            }
        })
        .collect();
    Outline::new(contours)
}

/// Rewrites a contour so that every curve is an explicit three-point
/// Bézier, synthesizing marked midpoints between consecutive controls.
fn split_contour(src: &Contour) -> Vec<OutlinePoint> {
    let mut out = Vec::with_capacity(src.len() * 2);
    let mut after_control = false;

    for (i, point) in src.points.iter().enumerate() {
        if i == 0 || point.on_curve || !after_control {
            out.push(*point);
            after_control = i > 0 && !point.on_curve;
            continue;
        }
        // consecutive off-curve points: insert the implied midpoint
        let prev = out[out.len() - 1];
        let mid = OutlinePoint {
            x: (prev.x + point.x) / 2.0,
            y: (prev.y + point.y) / 2.0,
            on_curve: true,
            split: true,
        };
        out.push(mid);
        out.push(*point);
    }
    out
}

/// Three-point-Bézier form of the whole outline.
pub(crate) fn split_outline(outline: &Outline) -> Outline {
    let contours = outline
        .contours
        .iter()
        .map(|contour| Contour {
            points: split_contour(contour),
            subglyph_id: contour.subglyph_id,
            subglyph_order: contour.subglyph_order,
        })
        .collect();
    Outline::new(contours)
}
