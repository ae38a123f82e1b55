//! Pre-generation checks that block code generation, and post-generation
//! warnings that flag geometry worth a second look.

use gcam_core::{CutStandards, Project, ProjectType, ToolKind};
use gcam_cam::ExpandedOperations;

use crate::machine::MachineProfile;

/// Blocking and non-blocking findings from one validation pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// A structural problem that must be resolved before code generation runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    WrongToolKindForProjectType {
        project_type: ProjectType,
        tool_kind: ToolKind,
    },
    MissingCutParameters {
        material_label: String,
        tool_kind: ToolKind,
        diameter: f64,
    },
    PassDepthExceedsToolDiameter {
        pass_depth: f64,
        tool_diameter: f64,
    },
    MachineBoundsExceeded {
        axis: char,
        value: f64,
        limit: f64,
    },
    InvalidArcGeometry {
        start_radius: f64,
        end_radius: f64,
    },
    EmptyOperations {
        project_type: ProjectType,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongToolKindForProjectType { project_type, tool_kind } => write!(
                f,
                "project type {project_type:?} cannot use a {tool_kind:?} tool"
            ),
            Self::MissingCutParameters { material_label, tool_kind, diameter } => write!(
                f,
                "no cut parameters for ({material_label}, {tool_kind:?}, {diameter:.4})"
            ),
            Self::PassDepthExceedsToolDiameter { pass_depth, tool_diameter } => write!(
                f,
                "pass depth {pass_depth:.4} exceeds tool diameter {tool_diameter:.4}"
            ),
            Self::MachineBoundsExceeded { axis, value, limit } => write!(
                f,
                "{axis} coordinate {value:.4} exceeds machine travel limit {limit:.4}"
            ),
            Self::InvalidArcGeometry { start_radius, end_radius } => write!(
                f,
                "arc radii differ: start {start_radius:.4}, end {end_radius:.4}"
            ),
            Self::EmptyOperations { project_type } => write!(
                f,
                "project type {project_type:?} has no operations to generate"
            ),
        }
    }
}

/// A non-blocking observation surfaced alongside generated code.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    AggressiveStepdown { pass_depth: f64, tool_diameter: f64, max_stepdown_factor: f64 },
    PlungeExceedsFeed { plunge_rate: f64, feed_rate: f64 },
    LeadInDisabledWithProfileCuts,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AggressiveStepdown { pass_depth, tool_diameter, max_stepdown_factor } => write!(
                f,
                "pass depth {pass_depth:.4} exceeds {:.0}% of tool diameter {tool_diameter:.4}",
                max_stepdown_factor * 100.0
            ),
            Self::PlungeExceedsFeed { plunge_rate, feed_rate } => write!(
                f,
                "plunge rate {plunge_rate:.1} exceeds feed rate {feed_rate:.1}"
            ),
            Self::LeadInDisabledWithProfileCuts => write!(
                f,
                "lead-in is disabled but the project has profile cuts"
            ),
        }
    }
}

fn expected_tool_kinds(project_type: ProjectType) -> &'static [ToolKind] {
    match project_type {
        ProjectType::Drill => &[ToolKind::Drill, ToolKind::EndMill1Flute, ToolKind::EndMill2Flute],
        ProjectType::Cut => &[ToolKind::EndMill1Flute, ToolKind::EndMill2Flute],
    }
}

/// Runs the structural checks that must pass before any code is generated:
/// tool/project-type compatibility, cut-parameter lookups, pass-depth vs.
/// tool diameter, machine bounds, arc geometry, and non-empty operations.
pub fn validate_project(
    project: &Project,
    expanded: &ExpandedOperations,
    machine: &MachineProfile,
    standards: &CutStandards,
) -> ValidationResult {
    let mut result = ValidationResult::new();

    if !expected_tool_kinds(project.project_type).contains(&project.tool.kind) {
        result.errors.push(ValidationError::WrongToolKindForProjectType {
            project_type: project.project_type,
            tool_kind: project.tool.kind,
        });
    }

    let total_ops = expanded.drill.len() + expanded.circular.len() + expanded.hexagonal.len() + expanded.line.len();
    if total_ops == 0 {
        result.errors.push(ValidationError::EmptyOperations { project_type: project.project_type });
    }

    match standards.lookup(&project.material_label, project.tool.kind, project.tool.diameter) {
        Ok(params) => {
            if let Some(pass_depth) = params.pass_depth {
                if pass_depth > project.tool.diameter {
                    result.errors.push(ValidationError::PassDepthExceedsToolDiameter {
                        pass_depth,
                        tool_diameter: project.tool.diameter,
                    });
                }
                if pass_depth > machine.general.max_stepdown_factor * project.tool.diameter {
                    result.warnings.push(ValidationWarning::AggressiveStepdown {
                        pass_depth,
                        tool_diameter: project.tool.diameter,
                        max_stepdown_factor: machine.general.max_stepdown_factor,
                    });
                }
            }
            if params.plunge_rate > params.feed_rate {
                result.warnings.push(ValidationWarning::PlungeExceedsFeed {
                    plunge_rate: params.plunge_rate,
                    feed_rate: params.feed_rate,
                });
            }
        }
        Err(_) => {
            result.errors.push(ValidationError::MissingCutParameters {
                material_label: project.material_label.clone(),
                tool_kind: project.tool.kind,
                diameter: project.tool.diameter,
            });
        }
    }

    result.merge(check_machine_bounds(expanded, machine));

    for line in &expanded.line {
        if let Err(e) = validate_arc_geometry(&line.points, 1e-4) {
            result.errors.push(e);
        }
    }

    let has_profile_cuts = !expanded.circular.is_empty() || !expanded.hexagonal.is_empty() || !expanded.line.is_empty();
    if has_profile_cuts {
        use gcam_core::{LeadInMode, LeadInType};
        let lead_in_disabled = expanded
            .circular
            .iter()
            .map(|c| (c.lead_in_mode, c.lead_in_type))
            .chain(expanded.hexagonal.iter().map(|h| (h.lead_in_mode, h.lead_in_type)))
            .chain(expanded.line.iter().map(|l| (l.lead_in_mode, l.lead_in_type)))
            .all(|(mode, ty)| mode == LeadInMode::Manual && ty == Some(LeadInType::Plunge));
        if lead_in_disabled {
            result.warnings.push(ValidationWarning::LeadInDisabledWithProfileCuts);
        }
    }

    result
}

fn check_machine_bounds(expanded: &ExpandedOperations, machine: &MachineProfile) -> ValidationResult {
    let mut result = ValidationResult::new();
    let max_x = machine.machine.max_x;
    let max_y = machine.machine.max_y;
    let allow_negative = machine.general.allow_negative_coordinates;

    let mut check_point = |result: &mut ValidationResult, x: f64, y: f64, extent: f64| {
        let (min_x, max_x_extent) = (x - extent, x + extent);
        let (min_y, max_y_extent) = (y - extent, y + extent);
        if !allow_negative && (min_x < 0.0) {
            result.errors.push(ValidationError::MachineBoundsExceeded { axis: 'X', value: min_x, limit: 0.0 });
        }
        if !allow_negative && (min_y < 0.0) {
            result.errors.push(ValidationError::MachineBoundsExceeded { axis: 'Y', value: min_y, limit: 0.0 });
        }
        if max_x_extent > max_x {
            result.errors.push(ValidationError::MachineBoundsExceeded { axis: 'X', value: max_x_extent, limit: max_x });
        }
        if max_y_extent > max_y {
            result.errors.push(ValidationError::MachineBoundsExceeded { axis: 'Y', value: max_y_extent, limit: max_y });
        }
    };

    for &(x, y) in &expanded.drill {
        check_point(&mut result, x, y, 0.0);
    }
    for circle in &expanded.circular {
        check_point(&mut result, circle.center_x, circle.center_y, circle.diameter / 2.0);
    }
    for hex in &expanded.hexagonal {
        let apothem = hex.flat_to_flat / 2.0;
        let circumradius = hex.flat_to_flat / 3f64.sqrt();
        check_point(&mut result, hex.center_x, hex.center_y, apothem.max(circumradius));
    }
    for line in &expanded.line {
        for point in &line.points {
            check_point(&mut result, point.x, point.y, 0.0);
        }
    }

    result
}

/// Checks that every arc segment's endpoints are equidistant from its
/// center within `tolerance`; violating arcs are reported by center and
/// endpoint radii so the caller can drop the offending operation.
pub fn validate_arc_geometry(
    points: &[gcam_core::LinePoint],
    tolerance: f64,
) -> Result<(), ValidationError> {
    for window in points.windows(2) {
        let (prev, curr) = (window[0], window[1]);
        if curr.segment_type != gcam_core::LineSegmentType::Arc {
            continue;
        }
        let Some((cx, cy)) = curr.arc_center else { continue };
        let start_radius = ((prev.x - cx).powi(2) + (prev.y - cy).powi(2)).sqrt();
        let end_radius = ((curr.x - cx).powi(2) + (curr.y - cy).powi(2)).sqrt();
        if (start_radius - end_radius).abs() > tolerance {
            return Err(ValidationError::InvalidArcGeometry { start_radius, end_radius });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcam_core::{Compensation, LeadInMode, Tool};

    fn machine() -> MachineProfile {
        MachineProfile::small_format_router()
    }

    fn standards_with_entry() -> CutStandards {
        let mut s = CutStandards::new();
        s.insert(
            "baltic_birch_ply",
            ToolKind::EndMill2Flute,
            0.25,
            gcam_core::CutParams {
                spindle_speed: 18000,
                feed_rate: 80.0,
                plunge_rate: 20.0,
                pecking_depth: None,
                pass_depth: Some(0.1),
            },
        );
        s
    }

    fn sample_project() -> Project {
        Project {
            project_type: ProjectType::Cut,
            material_label: "baltic_birch_ply".to_string(),
            material: gcam_core::Stock::Sheet { thickness: 0.75 },
            tool: Tool::new(ToolKind::EndMill2Flute, 0.25),
            operations: gcam_core::Operations {
                circular: vec![gcam_core::CircularCut {
                    center_x: 5.0,
                    center_y: 5.0,
                    diameter: 1.0,
                    compensation: Compensation::Interior,
                    lead_in_mode: LeadInMode::Auto,
                    lead_in_type: None,
                    approach_angle: Default::default(),
                    hold_time: 0.0,
                    pattern: None,
                }],
                ..Default::default()
            },
            tube_void_skip: false,
            working_length: None,
            tube_orientation: None,
        }
    }

    fn expand(project: &Project) -> ExpandedOperations {
        gcam_cam::expand_operations(&project.operations)
    }

    #[test]
    fn test_valid_project_passes() {
        let project = sample_project();
        let expanded = expand(&project);
        let result = validate_project(&project, &expanded, &machine(), &standards_with_entry());
        assert!(result.is_ok(), "expected no errors: {:?}", result.errors);
    }

    #[test]
    fn test_missing_cut_parameters_is_error() {
        let project = sample_project();
        let expanded = expand(&project);
        let empty_standards = CutStandards::new();
        let result = validate_project(&project, &expanded, &machine(), &empty_standards);
        assert!(result.errors.iter().any(|e| matches!(e, ValidationError::MissingCutParameters { .. })));
    }

    #[test]
    fn test_wrong_tool_kind_for_project_type() {
        let mut project = sample_project();
        project.project_type = ProjectType::Drill;
        project.tool = Tool::new(ToolKind::EndMill2Flute, 0.25);
        let expanded = expand(&project);
        let result = validate_project(&project, &expanded, &machine(), &standards_with_entry());
        assert!(result.errors.iter().any(|e| matches!(e, ValidationError::WrongToolKindForProjectType { .. })));
    }

    #[test]
    fn test_empty_operations_is_error() {
        let mut project = sample_project();
        project.operations = Default::default();
        let expanded = expand(&project);
        let result = validate_project(&project, &expanded, &machine(), &standards_with_entry());
        assert!(result.errors.iter().any(|e| matches!(e, ValidationError::EmptyOperations { .. })));
    }

    #[test]
    fn test_out_of_bounds_circle_is_error() {
        let mut project = sample_project();
        project.operations.circular[0].center_x = 1000.0;
        let expanded = expand(&project);
        let result = validate_project(&project, &expanded, &machine(), &standards_with_entry());
        assert!(result.errors.iter().any(|e| matches!(e, ValidationError::MachineBoundsExceeded { axis: 'X', .. })));
    }

    #[test]
    fn test_arc_geometry_consistent_radii_passes() {
        let points = vec![
            gcam_core::LinePoint::straight(1.0, 0.0),
            gcam_core::LinePoint {
                x: 0.0,
                y: 1.0,
                segment_type: gcam_core::LineSegmentType::Arc,
                arc_center: Some((0.0, 0.0)),
                arc_direction: Some(gcam_core::ArcDirection::Ccw),
            },
        ];
        assert!(validate_arc_geometry(&points, 1e-3).is_ok());
    }

    #[test]
    fn test_arc_geometry_mismatched_radii_fails() {
        let points = vec![
            gcam_core::LinePoint::straight(1.0, 0.0),
            gcam_core::LinePoint {
                x: 0.0,
                y: 2.0,
                segment_type: gcam_core::LineSegmentType::Arc,
                arc_center: Some((0.0, 0.0)),
                arc_direction: Some(gcam_core::ArcDirection::Ccw),
            },
        ];
        assert!(validate_arc_geometry(&points, 1e-3).is_err());
    }

    #[test]
    fn test_mismatched_arc_radii_blocks_validation() {
        let mut project = sample_project();
        project.operations.circular.clear();
        project.operations.line.push(gcam_core::LineCut {
            points: vec![
                gcam_core::LinePoint::straight(1.0, 0.0),
                gcam_core::LinePoint {
                    x: 0.0,
                    y: 2.0,
                    segment_type: gcam_core::LineSegmentType::Arc,
                    arc_center: Some((0.0, 0.0)),
                    arc_direction: Some(gcam_core::ArcDirection::Ccw),
                },
            ],
            compensation: Compensation::None,
            lead_in_mode: LeadInMode::Auto,
            lead_in_type: None,
            approach_angle: Default::default(),
            hold_time: 0.0,
        });
        let expanded = expand(&project);
        let result = validate_project(&project, &expanded, &machine(), &standards_with_entry());
        assert!(result.errors.iter().any(|e| matches!(e, ValidationError::InvalidArcGeometry { .. })));
    }

    #[test]
    fn test_aggressive_stepdown_warns() {
        let project = sample_project();
        let expanded = expand(&project);
        let mut standards = CutStandards::new();
        standards.insert(
            "baltic_birch_ply",
            ToolKind::EndMill2Flute,
            0.25,
            gcam_core::CutParams {
                spindle_speed: 18000,
                feed_rate: 80.0,
                plunge_rate: 20.0,
                pecking_depth: None,
                pass_depth: Some(0.24), // 96% of diameter, exceeds default 50% factor
            },
        );
        let result = validate_project(&project, &expanded, &machine(), &standards);
        assert!(result.warnings.iter().any(|w| matches!(w, ValidationWarning::AggressiveStepdown { .. })));
    }
}
