//! Tool-radius compensation: offsetting a feature's nominal geometry by the
//! cutting tool's radius so the tool's edge, not its center, traces the
//! feature boundary.

use gcam_core::{ArcDirection, Compensation, LinePoint, LineSegmentType, Point2D};

use crate::error::CamError;

/// Radial offset added to a feature's nominal radius to get the toolpath
/// (tool-center) radius.
pub fn compensation_offset(tool_diameter: f64, compensation: Compensation) -> f64 {
    let tool_radius = tool_diameter / 2.0;
    match compensation {
        Compensation::Interior => -tool_radius,
        Compensation::Exterior => tool_radius,
        Compensation::None => 0.0,
    }
}

/// Radius for a circular cut's toolpath, given the desired feature diameter.
pub fn cut_radius(feature_diameter: f64, tool_diameter: f64, compensation: Compensation) -> f64 {
    feature_diameter / 2.0 + compensation_offset(tool_diameter, compensation)
}

fn is_path_closed(path: &[LinePoint], tolerance: f64) -> bool {
    if path.len() < 2 {
        return false;
    }
    let first = path[0];
    let last = path[path.len() - 1];
    (first.x - last.x).abs() < tolerance && (first.y - last.y).abs() < tolerance
}

/// Signed area via the shoelace formula. Positive = counter-clockwise.
fn path_winding(path: &[LinePoint]) -> f64 {
    if path.len() < 3 {
        return 0.0;
    }
    let n = path.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += path[i].x * path[j].y;
        area -= path[j].x * path[i].y;
    }
    area / 2.0
}

fn offset_line_segment(p1: Point2D, p2: Point2D, offset: f64) -> (Point2D, Point2D) {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return (p1, p2);
    }
    // Left-of-direction normal.
    let nx = -dy / length;
    let ny = dx / length;
    (
        Point2D::new(p1.x + nx * offset, p1.y + ny * offset),
        Point2D::new(p2.x + nx * offset, p2.y + ny * offset),
    )
}

fn line_intersection(
    l1p1: Point2D,
    l1p2: Point2D,
    l2p1: Point2D,
    l2p2: Point2D,
) -> Option<Point2D> {
    let denom = (l1p1.x - l1p2.x) * (l2p1.y - l2p2.y) - (l1p1.y - l1p2.y) * (l2p1.x - l2p2.x);
    if denom.abs() < 1e-10 {
        return None;
    }
    let t = ((l1p1.x - l2p1.x) * (l2p1.y - l2p2.y) - (l1p1.y - l2p1.y) * (l2p1.x - l2p2.x)) / denom;
    Some(Point2D::new(
        l1p1.x + t * (l1p2.x - l1p1.x),
        l1p1.y + t * (l1p2.y - l1p1.y),
    ))
}

fn line_circle_intersection(
    line_p1: Point2D,
    line_p2: Point2D,
    center: Point2D,
    radius: f64,
    prefer_near: Point2D,
) -> Option<Point2D> {
    let dx = line_p2.x - line_p1.x;
    let dy = line_p2.y - line_p1.y;
    let ax = line_p1.x - center.x;
    let ay = line_p1.y - center.y;

    let a = dx * dx + dy * dy;
    let b = 2.0 * (ax * dx + ay * dy);
    let c = ax * ax + ay * ay - radius * radius;

    if a.abs() < 1e-10 {
        return None;
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_disc = discriminant.sqrt();
    let t1 = (-b - sqrt_disc) / (2.0 * a);
    let t2 = (-b + sqrt_disc) / (2.0 * a);

    let p1 = Point2D::new(line_p1.x + t1 * dx, line_p1.y + t1 * dy);
    let p2 = Point2D::new(line_p1.x + t2 * dx, line_p1.y + t2 * dy);

    let dist1 = (p1.x - prefer_near.x).powi(2) + (p1.y - prefer_near.y).powi(2);
    let dist2 = (p2.x - prefer_near.x).powi(2) + (p2.y - prefer_near.y).powi(2);
    Some(if dist1 <= dist2 { p1 } else { p2 })
}

#[derive(Debug, Clone, Copy)]
enum OffsetSegment {
    Straight {
        start: Point2D,
        end: Point2D,
    },
    Arc {
        start: Point2D,
        end: Point2D,
        center: Point2D,
    },
}

impl OffsetSegment {
    fn start(&self) -> Point2D {
        match *self {
            OffsetSegment::Straight { start, .. } => start,
            OffsetSegment::Arc { start, .. } => start,
        }
    }

    fn end(&self) -> Point2D {
        match *self {
            OffsetSegment::Straight { end, .. } => end,
            OffsetSegment::Arc { end, .. } => end,
        }
    }
}

/// Offsets one arc segment's endpoints by scaling each radially from the
/// arc's center, per-endpoint, so the arc's swept radius shifts by
/// `radius_change` at both ends independently.
fn offset_arc_segment(
    p1: Point2D,
    p2: Point2D,
    center: Point2D,
    radius_change: f64,
) -> Result<(Point2D, Point2D), CamError> {
    let dx1 = p1.x - center.x;
    let dy1 = p1.y - center.y;
    let dx2 = p2.x - center.x;
    let dy2 = p2.y - center.y;

    let radius1 = (dx1 * dx1 + dy1 * dy1).sqrt();
    let radius2 = (dx2 * dx2 + dy2 * dy2).sqrt();

    let new_radius1 = radius1 + radius_change;
    let new_radius2 = radius2 + radius_change;

    if new_radius1 <= 0.0 || new_radius2 <= 0.0 {
        let min_radius = radius1.min(radius2);
        return Err(CamError::CompensationFailed(format!(
            "arc radius ({min_radius:.4}) is too small for compensation with the given tool radius"
        )));
    }

    let scale1 = if radius1 > 0.0 { new_radius1 / radius1 } else { 1.0 };
    let scale2 = if radius2 > 0.0 { new_radius2 / radius2 } else { 1.0 };

    Ok((
        Point2D::new(center.x + dx1 * scale1, center.y + dy1 * scale1),
        Point2D::new(center.x + dx2 * scale2, center.y + dy2 * scale2),
    ))
}

/// Whether the arc's midpoint (sampled angularly) lies left of the chord
/// from `p1` to `p2`.
fn arc_bulges_left(p1: Point2D, p2: Point2D, center: Point2D, direction: Option<ArcDirection>) -> bool {
    let mut start_angle = (p1.y - center.y).atan2(p1.x - center.x);
    let mut end_angle = (p2.y - center.y).atan2(p2.x - center.x);

    let mid_angle = if direction == Some(ArcDirection::Cw) {
        if start_angle < end_angle {
            start_angle += std::f64::consts::TAU;
        }
        (start_angle + end_angle) / 2.0
    } else {
        if end_angle < start_angle {
            end_angle += std::f64::consts::TAU;
        }
        (start_angle + end_angle) / 2.0
    };

    let radius = ((p1.x - center.x).powi(2) + (p1.y - center.y).powi(2)).sqrt();
    let arc_mid = Point2D::new(
        center.x + radius * mid_angle.cos(),
        center.y + radius * mid_angle.sin(),
    );

    let chord_dx = p2.x - p1.x;
    let chord_dy = p2.y - p1.y;
    let to_arc_dx = arc_mid.x - p1.x;
    let to_arc_dy = arc_mid.y - p1.y;
    let cross = chord_dx * to_arc_dy - chord_dy * to_arc_dx;
    cross > 0.0
}

/// Apply tool-radius compensation to a path, returning a new path whose
/// offset from the input equals `tool_diameter / 2`. `Compensation::None`
/// and paths shorter than 2 points pass through unchanged.
pub fn compensate_path(
    path: &[LinePoint],
    tool_diameter: f64,
    compensation: Compensation,
) -> Result<Vec<LinePoint>, CamError> {
    if compensation == Compensation::None || path.len() < 2 {
        return Ok(path.to_vec());
    }

    let tool_radius = tool_diameter / 2.0;
    let closed = is_path_closed(path, 1e-4);
    let closing_segment_source: Option<LinePoint> = if closed { Some(path[path.len() - 1]) } else { None };

    let winding = path_winding(path);
    let offset = match compensation {
        Compensation::Exterior => if winding >= 0.0 { -tool_radius } else { tool_radius },
        Compensation::Interior => if winding >= 0.0 { tool_radius } else { -tool_radius },
        Compensation::None => unreachable!(),
    };

    let n = if closed { path.len() - 1 } else { path.len() };
    let mut offset_segments: Vec<OffsetSegment> = Vec::new();
    let mut segment_sources: Vec<LinePoint> = Vec::new();

    let segment_count = if closed { n } else { n - 1 };
    for i in 0..segment_count {
        let j = (i + 1) % n;
        let p1 = Point2D::new(path[i].x, path[i].y);
        let p2 = Point2D::new(path[j].x, path[j].y);

        let segment_source = if closed && j == 0 {
            closing_segment_source.unwrap()
        } else {
            path[j]
        };
        segment_sources.push(segment_source);

        match segment_source.segment_type {
            LineSegmentType::Arc => {
                let (cx, cy) = segment_source.arc_center.ok_or_else(|| {
                    CamError::CompensationFailed("arc segment missing center".into())
                })?;
                let center = Point2D::new(cx, cy);
                let want_offset_left = offset > 0.0;
                let bulges_left = arc_bulges_left(p1, p2, center, segment_source.arc_direction);
                let radius_change = if bulges_left == want_offset_left {
                    tool_radius.abs()
                } else {
                    -tool_radius.abs()
                };
                let (new_p1, new_p2) = offset_arc_segment(p1, p2, center, radius_change)?;
                offset_segments.push(OffsetSegment::Arc {
                    start: new_p1,
                    end: new_p2,
                    center,
                });
            }
            LineSegmentType::Straight => {
                let (new_p1, new_p2) = offset_line_segment(p1, p2, offset);
                offset_segments.push(OffsetSegment::Straight {
                    start: new_p1,
                    end: new_p2,
                });
            }
        }
    }

    if offset_segments.is_empty() {
        return Ok(path.to_vec());
    }

    let mut result: Vec<LinePoint> = Vec::new();
    let m = offset_segments.len();

    for i in 0..m {
        let seg = offset_segments[i];
        let original_point = segment_sources[i];

        if i == 0 {
            let first_point = if closed {
                let prev = offset_segments[m - 1];
                stitch(prev, seg)
            } else {
                seg.start()
            };
            let mut p = path[0];
            p.x = first_point.x;
            p.y = first_point.y;
            result.push(p);
        }

        if i < m - 1 || closed {
            let next = offset_segments[(i + 1) % m];
            match (seg, next) {
                (OffsetSegment::Arc { end, .. }, OffsetSegment::Arc { start: next_start, .. }) => {
                    let mut arc_end = original_point;
                    arc_end.x = end.x;
                    arc_end.y = end.y;
                    result.push(arc_end);

                    result.push(LinePoint {
                        x: next_start.x,
                        y: next_start.y,
                        segment_type: LineSegmentType::Straight,
                        arc_center: None,
                        arc_direction: None,
                    });
                    continue;
                }
                _ => {
                    let corner_point = stitch(seg, next);
                    let mut p = original_point;
                    p.x = corner_point.x;
                    p.y = corner_point.y;
                    result.push(p);
                }
            }
        } else {
            let end = seg.end();
            let mut p = original_point;
            p.x = end.x;
            p.y = end.y;
            result.push(p);
        }
    }

    Ok(result)
}

fn stitch(seg: OffsetSegment, next: OffsetSegment) -> Point2D {
    match (seg, next) {
        (OffsetSegment::Straight { start, end }, OffsetSegment::Straight { start: ns, end: ne }) => {
            line_intersection(start, end, ns, ne).unwrap_or(end)
        }
        (OffsetSegment::Arc { end, center, .. }, OffsetSegment::Straight { start: ns, end: ne }) => {
            let radius = ((end.x - center.x).powi(2) + (end.y - center.y).powi(2)).sqrt();
            line_circle_intersection(ns, ne, center, radius, end).unwrap_or(end)
        }
        (OffsetSegment::Straight { start, end }, OffsetSegment::Arc { start: ns, center, .. }) => {
            let radius = ((ns.x - center.x).powi(2) + (ns.y - center.y).powi(2)).sqrt();
            line_circle_intersection(start, end, center, radius, ns).unwrap_or(ns)
        }
        (OffsetSegment::Arc { .. }, OffsetSegment::Arc { start, .. }) => start,
    }
}
