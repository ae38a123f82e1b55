//! Detects sharp direction changes in a cut path and assigns each corner a
//! feed factor, so the safety chain can slow the machine into tight turns.

use gcam_core::{ArcDirection, LinePoint, Point2D};

const DEGENERATE_TOLERANCE: f64 = 0.0001;

/// Angle in degrees between segments `p1->p2` and `p2->p3`, measured at
/// `p2`. `180.0` is straight-through; `0.0` is a full reversal.
pub fn segment_angle(p1: Point2D, p2: Point2D, p3: Point2D) -> f64 {
    let v1 = (p2.x - p1.x, p2.y - p1.y);
    let v2 = (p3.x - p2.x, p3.y - p2.y);
    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
    if mag1 < DEGENERATE_TOLERANCE || mag2 < DEGENERATE_TOLERANCE {
        return 180.0;
    }
    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

/// Unit direction vector from `p1` to `p2`; `(1.0, 0.0)` for a degenerate
/// (zero-length) segment.
fn direction_vector(p1: Point2D, p2: Point2D) -> (f64, f64) {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let mag = (dx * dx + dy * dy).sqrt();
    if mag < DEGENERATE_TOLERANCE {
        (1.0, 0.0)
    } else {
        (dx / mag, dy / mag)
    }
}

/// Unit tangent of an arc at `point`, given its `center` and travel
/// direction. CCW tangent is the radius vector rotated +90°; CW is -90°.
fn arc_tangent_at_point(center: Point2D, point: Point2D, direction: ArcDirection) -> (f64, f64) {
    let rx = point.x - center.x;
    let ry = point.y - center.y;
    let (tx, ty) = match direction {
        ArcDirection::Ccw => (-ry, rx),
        ArcDirection::Cw => (ry, -rx),
    };
    let mag = (tx * tx + ty * ty).sqrt();
    if mag < DEGENERATE_TOLERANCE {
        (1.0, 0.0)
    } else {
        (tx / mag, ty / mag)
    }
}

fn angle_between_vectors(v1: (f64, f64), v2: (f64, f64)) -> f64 {
    let dot = (v1.0 * v2.0 + v1.1 * v2.1).clamp(-1.0, 1.0);
    dot.acos().to_degrees()
}

/// A detected corner: path index, location, and deviation-from-straight
/// angle in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    pub index: usize,
    pub point: Point2D,
    pub angle: f64,
}

/// Finds every interior point of `path` where the incoming and outgoing
/// travel directions diverge by more than `angle_threshold` degrees from
/// straight. Arc endpoints use the arc's tangent, not the chord direction.
pub fn identify_corners(path: &[LinePoint], angle_threshold: f64) -> Vec<Corner> {
    if path.len() < 3 {
        return Vec::new();
    }

    let mut corners = Vec::new();
    for i in 1..path.len() - 1 {
        let prev = path[i - 1];
        let curr = path[i];
        let next = path[i + 1];

        let p1 = Point2D::new(prev.x, prev.y);
        let p2 = Point2D::new(curr.x, curr.y);
        let p3 = Point2D::new(next.x, next.y);

        let incoming = match (curr.segment_type, curr.arc_center, curr.arc_direction) {
            (gcam_core::LineSegmentType::Arc, Some((cx, cy)), Some(dir)) => {
                arc_tangent_at_point(Point2D::new(cx, cy), p2, dir)
            }
            _ => direction_vector(p1, p2),
        };

        let outgoing = match (next.segment_type, next.arc_center, next.arc_direction) {
            (gcam_core::LineSegmentType::Arc, Some((cx, cy)), Some(dir)) => {
                arc_tangent_at_point(Point2D::new(cx, cy), p2, dir)
            }
            _ => direction_vector(p2, p3),
        };

        let angle = angle_between_vectors(incoming, outgoing);
        if angle < angle_threshold {
            corners.push(Corner { index: i, point: p2, angle });
        }
    }
    corners
}

/// Feed factor for a corner of the given angle: `1.00` (no corner) down to
/// `0.30` for a near-reversal.
pub fn corner_feed_factor(angle: f64) -> f64 {
    if angle >= 120.0 {
        1.0
    } else if angle >= 90.0 {
        0.75
    } else if angle >= 60.0 {
        0.50
    } else if angle >= 30.0 {
        0.40
    } else {
        0.30
    }
}

/// Per-path-point corner feed factors, `1.0` everywhere except at detected
/// corners (indexed as in `path`).
pub fn path_corner_factors(path: &[LinePoint], angle_threshold: f64) -> Vec<f64> {
    let mut factors = vec![1.0; path.len()];
    for corner in identify_corners(path, angle_threshold) {
        factors[corner.index] = corner_feed_factor(corner.angle);
    }
    factors
}
