//! Computes lead-in geometry: where the tool approaches a profile from, and
//! how it transitions from a vertical plunge into the cut without shock
//! loading the tool. Ramp lead-ins are a straight XY+Z move; helical
//! lead-ins spiral down on an arc. G-code emission lives downstream; this
//! module only produces the geometry and timing those moves need.

use gcam_core::{ApproachAngle, Compensation, LinePoint, Point2D};

/// Tool must not spiral inside a radius smaller than this; below it helical
/// entry is infeasible and the caller should fall back to a plunge.
pub const MIN_HELIX_RADIUS: f64 = 0.05;

/// Distance back from the profile start at which the ramp begins, derived
/// from the ramp angle and the per-pass depth: a shallower angle means a
/// longer, gentler ramp. Falls back to `0.25` for a non-positive angle or
/// depth.
pub fn lead_in_distance(ramp_angle_degrees: f64, pass_depth: f64) -> f64 {
    if ramp_angle_degrees <= 0.0 || pass_depth <= 0.0 {
        return 0.25;
    }
    pass_depth / ramp_angle_degrees.to_radians().tan()
}

/// Lead-in start point for a circular cut: radially outward from the
/// profile (at `cut_radius`) by `lead_in_distance`, in the direction of
/// `approach_angle`.
pub fn circle_lead_in_point(
    center: Point2D,
    cut_radius: f64,
    lead_in_distance: f64,
    approach_angle: ApproachAngle,
) -> Point2D {
    let math_angle = approach_angle.to_math_radians();
    Point2D::new(
        center.x + (cut_radius + lead_in_distance) * math_angle.cos(),
        center.y + (cut_radius + lead_in_distance) * math_angle.sin(),
    )
}

/// Lead-in start point for a hexagonal cut. With an approach angle, the
/// point is radial from `center` through the first vertex's distance plus
/// `lead_in_distance`. Without one, it extends the `v0->v1` edge backward
/// past `v0`.
pub fn hexagon_lead_in_point(
    vertices: &[Point2D; 6],
    lead_in_distance: f64,
    center: Point2D,
    approach_angle: Option<ApproachAngle>,
) -> Point2D {
    let v0 = vertices[0];

    if let Some(angle) = approach_angle {
        let math_angle = angle.to_math_radians();
        let vertex_dist = ((v0.x - center.x).powi(2) + (v0.y - center.y).powi(2)).sqrt();
        return Point2D::new(
            center.x + (vertex_dist + lead_in_distance) * math_angle.cos(),
            center.y + (vertex_dist + lead_in_distance) * math_angle.sin(),
        );
    }

    let v1 = vertices[1];
    let dx = v1.x - v0.x;
    let dy = v1.y - v0.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length < 0.0001 {
        return v0;
    }
    Point2D::new(v0.x - dx / length * lead_in_distance, v0.y - dy / length * lead_in_distance)
}

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

fn is_closed_path(path: &[LinePoint], tolerance: f64) -> bool {
    if path.len() < 2 {
        return false;
    }
    let first = path[0];
    let last = path[path.len() - 1];
    (first.x - last.x).abs() < tolerance && (first.y - last.y).abs() < tolerance
}

/// Lead-in start point for a line cut. With an explicit approach angle the
/// tool comes from that direction unconditionally. Otherwise: open paths
/// (or uncompensated closed paths) extend backward along the first
/// segment's direction; compensated closed paths offset perpendicular
/// toward the waste side, using the path's winding to resolve which side
/// that is.
pub fn line_lead_in_point(
    path: &[LinePoint],
    lead_in_distance: f64,
    compensation: Compensation,
    approach_angle: Option<ApproachAngle>,
) -> Point2D {
    if path.is_empty() {
        return Point2D::new(0.0, 0.0);
    }
    let p0 = Point2D::new(path[0].x, path[0].y);
    if path.len() < 2 {
        return p0;
    }

    if let Some(angle) = approach_angle {
        let math_angle = angle.to_math_radians();
        return Point2D::new(
            p0.x + lead_in_distance * math_angle.cos(),
            p0.y + lead_in_distance * math_angle.sin(),
        );
    }

    let p1 = Point2D::new(path[1].x, path[1].y);
    let dx = p1.x - p0.x;
    let dy = p1.y - p0.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length < 0.0001 {
        return p0;
    }
    let (dx, dy) = (dx / length, dy / length);

    let closed = is_closed_path(path, 0.0001);
    if closed && compensation != Compensation::None {
        let (nx, ny) = (-dy, dx);
        let winding = path_winding(path);
        let ccw = winding >= 0.0;
        let inside_is_left = ccw;
        let offset_left = match compensation {
            Compensation::Interior => inside_is_left,
            Compensation::Exterior => !inside_is_left,
            Compensation::None => unreachable!(),
        };
        return if offset_left {
            Point2D::new(p0.x + nx * lead_in_distance, p0.y + ny * lead_in_distance)
        } else {
            Point2D::new(p0.x - nx * lead_in_distance, p0.y - ny * lead_in_distance)
        };
    }

    Point2D::new(p0.x - dx * lead_in_distance, p0.y - dy * lead_in_distance)
}

/// Helix radius for a circular cut: must stay inside `cut_radius` with
/// `clearance` to spare, and is capped at `tool_radius + clearance` so the
/// spiral doesn't grow needlessly large. Returns `None` if the circle is
/// too small for helical entry.
pub fn helix_radius_for_circle(cut_radius: f64, tool_diameter: f64, clearance: f64) -> Option<f64> {
    let tool_radius = tool_diameter / 2.0;
    let max_helix_radius = cut_radius - clearance;
    if max_helix_radius < MIN_HELIX_RADIUS {
        return None;
    }
    let helix_radius = max_helix_radius.min(tool_radius + clearance);
    (helix_radius >= MIN_HELIX_RADIUS).then_some(helix_radius)
}

/// Helix radius for a hexagonal cut, bounded by the inscribed-circle
/// (apothem) radius rather than a circumradius.
pub fn helix_radius_for_hexagon(
    flat_to_flat: f64,
    tool_diameter: f64,
    compensation: Compensation,
    clearance: f64,
) -> Option<f64> {
    let tool_radius = tool_diameter / 2.0;
    let apothem = flat_to_flat / 2.0;
    let available_radius = match compensation {
        Compensation::Interior => apothem - tool_radius - clearance,
        _ => apothem - clearance,
    };
    if available_radius < MIN_HELIX_RADIUS {
        return None;
    }
    let helix_radius = available_radius.min(tool_radius + clearance);
    (helix_radius >= MIN_HELIX_RADIUS).then_some(helix_radius)
}

/// Start point of a helical lead-in: on the helix circle, at `approach_angle`.
pub fn helix_start_point(center: Point2D, helix_radius: f64, approach_angle: ApproachAngle) -> Point2D {
    let math_angle = approach_angle.to_math_radians();
    Point2D::new(
        center.x + helix_radius * math_angle.cos(),
        center.y + helix_radius * math_angle.sin(),
    )
}

/// Number of full spiral revolutions needed to descend `target_depth` at
/// `helix_pitch` per revolution; always at least one. A non-positive pitch
/// forces a single revolution.
pub fn helix_revolutions(target_depth: f64, helix_pitch: f64) -> u32 {
    if helix_pitch <= 0.0 {
        return 1;
    }
    ((target_depth / helix_pitch).ceil() as u32).max(1)
}

/// Per-revolution feed rate when ramping from `plunge_rate` up toward
/// `end_feed` across a helical descent. The helix covers the first three
/// ramp steps (25%/50%/75%); the caller's transition move completes the
/// ramp at 100%. `rev` is zero-indexed.
pub fn helical_step_feed(rev: u32, revolutions: u32, plunge_rate: f64, end_feed: Option<f64>) -> f64 {
    let Some(end_feed) = end_feed else {
        return plunge_rate;
    };
    const STEPS: [f64; 3] = [0.25, 0.50, 0.75];
    let step_pct = if revolutions == 1 {
        0.75
    } else if revolutions == 2 {
        STEPS[(rev + 1) as usize]
    } else {
        STEPS[(rev as usize).min(2)]
    };
    plunge_rate + (end_feed - plunge_rate) * step_pct
}
