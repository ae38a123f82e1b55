//! Point-up hexagon vertex geometry.

use gcam_core::{Compensation, Point2D};

/// The six vertices of a point-up regular hexagon, starting at the top
/// vertex and proceeding clockwise (matching the G-code controller's
/// clockwise-increasing angle convention).
pub fn hexagon_vertices(center_x: f64, center_y: f64, flat_to_flat: f64) -> [Point2D; 6] {
    let circumradius = flat_to_flat / 3f64.sqrt();
    std::array::from_fn(|i| {
        let angle = std::f64::consts::FRAC_PI_2 - i as f64 * std::f64::consts::FRAC_PI_3;
        Point2D::new(
            center_x + circumradius * angle.cos(),
            center_y + circumradius * angle.sin(),
        )
    })
}

/// Apothem (center-to-flat-side distance) of a flat-to-flat hexagon.
pub fn apothem(flat_to_flat: f64) -> f64 {
    flat_to_flat / 2.0
}

/// Circumradius (center-to-vertex distance) of a flat-to-flat hexagon.
pub fn circumradius(flat_to_flat: f64) -> f64 {
    flat_to_flat / 3f64.sqrt()
}

/// The hexagon's axis-aligned bounding box: `apothem × circumradius`.
pub fn bounds(center_x: f64, center_y: f64, flat_to_flat: f64) -> (f64, f64, f64, f64) {
    let a = apothem(flat_to_flat);
    let c = circumradius(flat_to_flat);
    (center_x - a, center_y - c, center_x + a, center_y + c)
}

/// Hexagon vertices with tool-radius compensation applied: each vertex is
/// offset along its bisector from the center, by `tool_radius * 2 / sqrt(3)`
/// (the radial displacement that shifts every flat side by exactly
/// `tool_radius`).
pub fn compensated_vertices(
    center_x: f64,
    center_y: f64,
    flat_to_flat: f64,
    tool_diameter: f64,
    compensation: Compensation,
) -> [Point2D; 6] {
    let vertices = hexagon_vertices(center_x, center_y, flat_to_flat);
    if compensation == Compensation::None {
        return vertices;
    }

    let tool_radius = tool_diameter / 2.0;
    let base_offset = tool_radius * 2.0 / 3f64.sqrt();
    let offset_distance = match compensation {
        Compensation::Interior => base_offset,
        Compensation::Exterior => -base_offset,
        Compensation::None => unreachable!(),
    };

    let center = Point2D::new(center_x, center_y);
    vertices.map(|v| offset_toward(v, center, offset_distance))
}

fn offset_toward(point: Point2D, center: Point2D, offset_distance: f64) -> Point2D {
    let dx = center.x - point.x;
    let dy = center.y - point.y;
    let distance = (dx * dx + dy * dy).sqrt();
    if distance == 0.0 {
        return point;
    }
    Point2D::new(
        point.x + dx / distance * offset_distance,
        point.y + dy / distance * offset_distance,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_vertex_is_on_positive_y_axis() {
        let vertices = hexagon_vertices(0.0, 0.0, 1.0);
        assert!(vertices[0].x.abs() < 1e-10);
        assert!(vertices[0].y > 0.0);
    }

    #[test]
    fn test_vertices_proceed_clockwise() {
        // Second vertex should have moved to the right (+X) and down from the top.
        let vertices = hexagon_vertices(0.0, 0.0, 1.0);
        assert!(vertices[1].x > 0.0);
        assert!(vertices[1].y < vertices[0].y);
    }

    #[test]
    fn test_apothem_and_circumradius() {
        assert!((apothem(1.0) - 0.5).abs() < 1e-10);
        assert!((circumradius(1.0) - 1.0 / 3f64.sqrt()).abs() < 1e-10);
    }

    #[test]
    fn test_compensation_none_passes_through() {
        let v1 = hexagon_vertices(1.0, 1.0, 2.0);
        let v2 = compensated_vertices(1.0, 1.0, 2.0, 0.25, Compensation::None);
        assert_eq!(v1, v2);
    }

    #[test]
    fn test_interior_compensation_moves_toward_center() {
        let v1 = hexagon_vertices(0.0, 0.0, 1.0);
        let v2 = compensated_vertices(0.0, 0.0, 1.0, 0.25, Compensation::Interior);
        // Top vertex moves down toward center.
        assert!(v2[0].y < v1[0].y);
    }

    #[test]
    fn test_exterior_compensation_moves_away_from_center() {
        let v1 = hexagon_vertices(0.0, 0.0, 1.0);
        let v2 = compensated_vertices(0.0, 0.0, 1.0, 0.25, Compensation::Exterior);
        assert!(v2[0].y > v1[0].y);
    }
}
