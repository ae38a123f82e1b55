//! Flattens the linear/grid patterns a project can attach to drill, circular,
//! and hexagonal operations into singleton lists. Line cuts pass through
//! unchanged — they have no pattern variant.

use gcam_core::{Axis, CircularCut, DrillOp, HexagonalCut, LineCut, LinearPattern, Operations};

/// The four operation lists with every pattern flattened to singletons.
#[derive(Debug, Clone, Default)]
pub struct ExpandedOperations {
    pub drill: Vec<(f64, f64)>,
    pub circular: Vec<CircularCut>,
    pub hexagonal: Vec<HexagonalCut>,
    pub line: Vec<LineCut>,
}

fn expand_linear(start_x: f64, start_y: f64, axis: Axis, spacing: f64, count: u32) -> Vec<(f64, f64)> {
    (0..count)
        .map(|i| match axis {
            Axis::X => (start_x + i as f64 * spacing, start_y),
            Axis::Y => (start_x, start_y + i as f64 * spacing),
        })
        .collect()
}

fn expand_grid(
    start_x: f64,
    start_y: f64,
    x_spacing: f64,
    y_spacing: f64,
    x_count: u32,
    y_count: u32,
) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity((x_count * y_count) as usize);
    for row in 0..y_count {
        for col in 0..x_count {
            points.push((
                start_x + col as f64 * x_spacing,
                start_y + row as f64 * y_spacing,
            ));
        }
    }
    points
}

fn expand_drill_op(op: &DrillOp) -> Vec<(f64, f64)> {
    match *op {
        DrillOp::Single { x, y } => vec![(x, y)],
        DrillOp::Linear {
            start_x,
            start_y,
            axis,
            spacing,
            count,
        } => expand_linear(start_x, start_y, axis, spacing, count),
        DrillOp::Grid {
            start_x,
            start_y,
            x_spacing,
            y_spacing,
            x_count,
            y_count,
        } => expand_grid(start_x, start_y, x_spacing, y_spacing, x_count, y_count),
    }
}

fn expand_circular_op(op: &CircularCut) -> Vec<CircularCut> {
    match op.pattern {
        None => vec![*op],
        Some(LinearPattern { axis, spacing, count }) => {
            expand_linear(op.center_x, op.center_y, axis, spacing, count)
                .into_iter()
                .map(|(cx, cy)| CircularCut {
                    center_x: cx,
                    center_y: cy,
                    pattern: None,
                    ..*op
                })
                .collect()
        }
    }
}

fn expand_hexagonal_op(op: &HexagonalCut) -> Vec<HexagonalCut> {
    match op.pattern {
        None => vec![*op],
        Some(LinearPattern { axis, spacing, count }) => {
            expand_linear(op.center_x, op.center_y, axis, spacing, count)
                .into_iter()
                .map(|(cx, cy)| HexagonalCut {
                    center_x: cx,
                    center_y: cy,
                    pattern: None,
                    ..*op
                })
                .collect()
        }
    }
}

/// Expand a project's raw operation lists into singletons.
pub fn expand_operations(operations: &Operations) -> ExpandedOperations {
    ExpandedOperations {
        drill: operations.drill.iter().flat_map(expand_drill_op).collect(),
        circular: operations
            .circular
            .iter()
            .flat_map(expand_circular_op)
            .collect(),
        hexagonal: operations
            .hexagonal
            .iter()
            .flat_map(expand_hexagonal_op)
            .collect(),
        line: operations.line.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_pattern_along_x() {
        let pts = expand_linear(1.0, 2.0, Axis::X, 0.5, 4);
        assert_eq!(
            pts,
            vec![(1.0, 2.0), (1.5, 2.0), (2.0, 2.0), (2.5, 2.0)]
        );
    }

    #[test]
    fn test_linear_pattern_count_zero_is_empty() {
        assert!(expand_linear(0.0, 0.0, Axis::X, 1.0, 0).is_empty());
    }

    #[test]
    fn test_linear_pattern_negative_spacing_reverses() {
        let pts = expand_linear(5.0, 0.0, Axis::X, -1.0, 3);
        assert_eq!(pts, vec![(5.0, 0.0), (4.0, 0.0), (3.0, 0.0)]);
    }

    #[test]
    fn test_grid_pattern_row_major_inner_loop_over_x() {
        let pts = expand_grid(0.0, 0.0, 1.0, 2.0, 2, 2);
        assert_eq!(pts, vec![(0.0, 0.0), (1.0, 0.0), (0.0, 2.0), (1.0, 2.0)]);
    }

    #[test]
    fn test_grid_pattern_zero_counts_is_empty() {
        assert!(expand_grid(0.0, 0.0, 1.0, 1.0, 0, 3).is_empty());
    }

    #[test]
    fn test_drill_single_passes_through() {
        let ops = Operations {
            drill: vec![DrillOp::Single { x: 1.0, y: 1.0 }],
            ..Default::default()
        };
        let expanded = expand_operations(&ops);
        assert_eq!(expanded.drill, vec![(1.0, 1.0)]);
    }

    #[test]
    fn test_drill_grid_expands() {
        let ops = Operations {
            drill: vec![DrillOp::Grid {
                start_x: 0.0,
                start_y: 0.0,
                x_spacing: 1.0,
                y_spacing: 1.0,
                x_count: 2,
                y_count: 2,
            }],
            ..Default::default()
        };
        let expanded = expand_operations(&ops);
        assert_eq!(expanded.drill.len(), 4);
    }
}
