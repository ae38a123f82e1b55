//! Partitions expanded operations into those that remove material and those
//! that fall entirely inside a tube's hollow interior.

use gcam_core::{CircularCut, HexagonalCut, Stock};

use crate::pattern::ExpandedOperations;

/// Expanded operations split into the ones that survive and the ones
/// skipped because they lie entirely inside the tube void.
#[derive(Debug, Clone, Default)]
pub struct FilteredOperations {
    pub drill: Vec<(f64, f64)>,
    pub circular: Vec<CircularCut>,
    pub hexagonal: Vec<HexagonalCut>,
    pub line: Vec<gcam_core::LineCut>,
    pub skipped_drill: Vec<(f64, f64)>,
    pub skipped_circular: Vec<CircularCut>,
    pub skipped_hexagonal: Vec<HexagonalCut>,
}

/// `material` must be `Stock::Tube`; `tube_void_skip` gates whether filtering
/// runs at all. Drill outer extent is `drill_radius` (0 for true drills, half
/// the mill diameter when a mill is used for drilling). `mill_radius` is the
/// end mill's cutting radius, used for circles and hexagons.
pub fn filter_for_tube(
    expanded: &ExpandedOperations,
    material: &Stock,
    tube_void_skip: bool,
    drill_radius: f64,
    mill_radius: f64,
) -> FilteredOperations {
    let Stock::Tube { .. } = material else {
        return FilteredOperations {
            drill: expanded.drill.clone(),
            circular: expanded.circular.clone(),
            hexagonal: expanded.hexagonal.clone(),
            line: expanded.line.clone(),
            ..Default::default()
        };
    };
    if !tube_void_skip {
        return FilteredOperations {
            drill: expanded.drill.clone(),
            circular: expanded.circular.clone(),
            hexagonal: expanded.hexagonal.clone(),
            line: expanded.line.clone(),
            ..Default::default()
        };
    }

    let mut result = FilteredOperations {
        line: expanded.line.clone(),
        ..Default::default()
    };

    for &(x, y) in &expanded.drill {
        if material.point_in_void(x, y, drill_radius) {
            result.skipped_drill.push((x, y));
        } else {
            result.drill.push((x, y));
        }
    }

    for circle in &expanded.circular {
        // Outer extent of a circular cut is the cut outer radius (half the
        // feature diameter), regardless of compensation side.
        let cut_radius = circle.diameter / 2.0;
        if material.point_in_void(circle.center_x, circle.center_y, cut_radius) {
            result.skipped_circular.push(*circle);
        } else {
            result.circular.push(*circle);
        }
    }

    for hex in &expanded.hexagonal {
        let circumradius = hex.flat_to_flat / 3f64.sqrt();
        if material.point_in_void(hex.center_x, hex.center_y, circumradius) {
            result.skipped_hexagonal.push(*hex);
        } else {
            result.hexagonal.push(*hex);
        }
    }

    let _ = mill_radius; // reserved: mill_radius informs drill_radius at the call site, not the void test itself
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcam_core::{Compensation, LeadInMode};

    fn tube() -> Stock {
        Stock::Tube {
            outer_width: 2.0,
            outer_height: 1.0,
            wall_thickness: 0.125,
        }
    }

    fn circle(cx: f64, cy: f64, diameter: f64) -> CircularCut {
        CircularCut {
            center_x: cx,
            center_y: cy,
            diameter,
            compensation: Compensation::Interior,
            lead_in_mode: LeadInMode::Auto,
            lead_in_type: None,
            approach_angle: Default::default(),
            hold_time: 0.0,
            pattern: None,
        }
    }

    #[test]
    fn test_non_tube_material_skips_nothing() {
        let sheet = Stock::Sheet { thickness: 0.75 };
        let expanded = ExpandedOperations {
            drill: vec![(1.0, 0.5)],
            ..Default::default()
        };
        let filtered = filter_for_tube(&expanded, &sheet, true, 0.0, 0.125);
        assert_eq!(filtered.drill.len(), 1);
        assert!(filtered.skipped_drill.is_empty());
    }

    #[test]
    fn test_tube_void_skip_disabled_keeps_everything() {
        let expanded = ExpandedOperations {
            drill: vec![(1.0, 0.5)],
            ..Default::default()
        };
        let filtered = filter_for_tube(&expanded, &tube(), false, 0.0, 0.125);
        assert_eq!(filtered.drill.len(), 1);
        assert!(filtered.skipped_drill.is_empty());
    }

    #[test]
    fn test_drill_point_in_void_is_skipped() {
        let expanded = ExpandedOperations {
            drill: vec![(1.0, 0.5), (0.05, 0.5)],
            ..Default::default()
        };
        let filtered = filter_for_tube(&expanded, &tube(), true, 0.0, 0.125);
        assert_eq!(filtered.drill, vec![(0.05, 0.5)]);
        assert_eq!(filtered.skipped_drill, vec![(1.0, 0.5)]);
    }

    #[test]
    fn test_circle_entirely_in_void_is_skipped() {
        let expanded = ExpandedOperations {
            circular: vec![circle(1.0, 0.5, 0.25)],
            ..Default::default()
        };
        let filtered = filter_for_tube(&expanded, &tube(), true, 0.0, 0.125);
        assert!(filtered.circular.is_empty());
        assert_eq!(filtered.skipped_circular.len(), 1);
    }

    #[test]
    fn test_circle_crossing_void_boundary_is_kept() {
        let expanded = ExpandedOperations {
            circular: vec![circle(0.2, 0.5, 0.5)],
            ..Default::default()
        };
        let filtered = filter_for_tube(&expanded, &tube(), true, 0.0, 0.125);
        assert_eq!(filtered.circular.len(), 1);
        assert!(filtered.skipped_circular.is_empty());
    }

    #[test]
    fn test_line_cuts_are_never_filtered() {
        let line = gcam_core::LineCut {
            points: vec![gcam_core::LinePoint::straight(1.0, 0.5)],
            compensation: Compensation::None,
            lead_in_mode: LeadInMode::Auto,
            lead_in_type: None,
            approach_angle: Default::default(),
            hold_time: 0.0,
        };
        let expanded = ExpandedOperations {
            line: vec![line],
            ..Default::default()
        };
        let filtered = filter_for_tube(&expanded, &tube(), true, 0.0, 0.125);
        assert_eq!(filtered.line.len(), 1);
    }
}
