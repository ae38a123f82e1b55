use crate::angle::ApproachAngle;
use crate::stock::{Stock, TubeOrientation};
use crate::tool::Tool;
use serde::{Deserialize, Serialize};

/// Which family of operations a project consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Drill,
    Cut,
}

/// An axis for linear patterns. Parsing lowercases user input before
/// matching, so `"x"`, `"X"`, and any other casing all parse the same; this
/// type itself only ever holds the normalized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
}

impl<'de> Deserialize<'de> for Axis {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;
        let s = String::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            other => Err(D::Error::custom(format!("invalid axis: {other}"))),
        }
    }
}

/// Tool-radius compensation side, relative to the path's interior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compensation {
    None,
    Interior,
    Exterior,
}

/// Whether a cut's lead-in strategy is chosen by the machine profile's
/// defaults or pinned explicitly on the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadInMode {
    Auto,
    Manual,
}

/// An explicit lead-in strategy, used when `lead_in_mode` is `Manual`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadInType {
    Helical,
    Ramp,
    Plunge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcDirection {
    Cw,
    Ccw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineSegmentType {
    Straight,
    Arc,
}

/// One point of a line cut's ordered path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub x: f64,
    pub y: f64,
    pub segment_type: LineSegmentType,
    #[serde(default)]
    pub arc_center: Option<(f64, f64)>,
    #[serde(default)]
    pub arc_direction: Option<ArcDirection>,
}

impl LinePoint {
    pub fn straight(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            segment_type: LineSegmentType::Straight,
            arc_center: None,
            arc_direction: None,
        }
    }
}

/// A drill operation: a single point, or a pattern that expands to many.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "pattern")]
pub enum DrillOp {
    Single {
        x: f64,
        y: f64,
    },
    Linear {
        start_x: f64,
        start_y: f64,
        axis: Axis,
        spacing: f64,
        count: u32,
    },
    Grid {
        start_x: f64,
        start_y: f64,
        x_spacing: f64,
        y_spacing: f64,
        x_count: u32,
        y_count: u32,
    },
}

/// A circular cut, drilled either as a single feature or as a linear pattern
/// of identical circles (see the pattern expander).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircularCut {
    pub center_x: f64,
    pub center_y: f64,
    pub diameter: f64,
    pub compensation: Compensation,
    pub lead_in_mode: LeadInMode,
    #[serde(default)]
    pub lead_in_type: Option<LeadInType>,
    #[serde(default)]
    pub approach_angle: ApproachAngle,
    #[serde(default)]
    pub hold_time: f64,
    #[serde(default)]
    pub pattern: Option<LinearPattern>,
}

/// A hexagonal cut. Identical in shape to `CircularCut` except it carries
/// `flat_to_flat` instead of `diameter`; hexagons are point-up, with one
/// vertex on +Y from the center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HexagonalCut {
    pub center_x: f64,
    pub center_y: f64,
    pub flat_to_flat: f64,
    pub compensation: Compensation,
    pub lead_in_mode: LeadInMode,
    #[serde(default)]
    pub lead_in_type: Option<LeadInType>,
    #[serde(default)]
    pub approach_angle: ApproachAngle,
    #[serde(default)]
    pub hold_time: f64,
    #[serde(default)]
    pub pattern: Option<LinearPattern>,
}

/// A linear repeat applied to a circular or hexagonal cut: `count` copies
/// stepping `spacing` along `axis` from the declared center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearPattern {
    pub axis: Axis,
    pub spacing: f64,
    pub count: u32,
}

/// A line cut: an ordered path of points, with compensation and lead-in
/// settings applying to the whole path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineCut {
    pub points: Vec<LinePoint>,
    pub compensation: Compensation,
    pub lead_in_mode: LeadInMode,
    #[serde(default)]
    pub lead_in_type: Option<LeadInType>,
    #[serde(default)]
    pub approach_angle: ApproachAngle,
    #[serde(default)]
    pub hold_time: f64,
}

/// The four parallel operation lists a project declares.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operations {
    #[serde(default)]
    pub drill: Vec<DrillOp>,
    #[serde(default)]
    pub circular: Vec<CircularCut>,
    #[serde(default)]
    pub hexagonal: Vec<HexagonalCut>,
    #[serde(default)]
    pub line: Vec<LineCut>,
}

/// A declarative project description: material, one tool, and operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub project_type: ProjectType,
    /// Label used to look up cut parameters in the cut-standards table
    /// (e.g. `"baltic_birch_ply"`), distinct from `material`'s geometry.
    pub material_label: String,
    pub material: Stock,
    pub tool: Tool,
    #[serde(default)]
    pub operations: Operations,
    #[serde(default)]
    pub tube_void_skip: bool,
    #[serde(default)]
    pub working_length: Option<f64>,
    #[serde(default)]
    pub tube_orientation: Option<TubeOrientation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operations_default_is_all_empty() {
        let ops = Operations::default();
        assert!(ops.drill.is_empty());
        assert!(ops.circular.is_empty());
        assert!(ops.hexagonal.is_empty());
        assert!(ops.line.is_empty());
    }

    #[test]
    fn test_drill_op_toml_round_trip() {
        let op = DrillOp::Linear {
            start_x: 0.5,
            start_y: 0.5,
            axis: Axis::X,
            spacing: 1.0,
            count: 4,
        };
        let s = toml::to_string_pretty(&op).unwrap();
        let op2: DrillOp = toml::from_str(&s).unwrap();
        assert_eq!(op, op2);
    }

    #[derive(Debug, Deserialize)]
    struct AxisHolder {
        axis: Axis,
    }

    #[test]
    fn test_axis_parsing_is_case_insensitive() {
        assert_eq!(toml::from_str::<AxisHolder>("axis = \"x\"").unwrap().axis, Axis::X);
        assert_eq!(toml::from_str::<AxisHolder>("axis = \"X\"").unwrap().axis, Axis::X);
        assert_eq!(toml::from_str::<AxisHolder>("axis = \"y\"").unwrap().axis, Axis::Y);
        assert_eq!(toml::from_str::<AxisHolder>("axis = \"Y\"").unwrap().axis, Axis::Y);
    }

    #[test]
    fn test_axis_parsing_rejects_unknown_value() {
        assert!(toml::from_str::<AxisHolder>("axis = \"z\"").is_err());
    }

    #[test]
    fn test_project_toml_round_trip() {
        use crate::tool::ToolKind;

        let project = Project {
            project_type: ProjectType::Cut,
            material_label: "baltic_birch_ply".to_string(),
            material: Stock::Sheet { thickness: 0.75 },
            tool: Tool::new(ToolKind::EndMill2Flute, 0.25),
            operations: Operations {
                drill: vec![],
                circular: vec![CircularCut {
                    center_x: 1.0,
                    center_y: 1.0,
                    diameter: 1.0,
                    compensation: Compensation::Interior,
                    lead_in_mode: LeadInMode::Auto,
                    lead_in_type: None,
                    approach_angle: ApproachAngle::default(),
                    hold_time: 0.0,
                    pattern: None,
                }],
                hexagonal: vec![],
                line: vec![],
            },
            tube_void_skip: false,
            working_length: None,
            tube_orientation: None,
        };
        let s = toml::to_string_pretty(&project).unwrap();
        let project2: Project = toml::from_str(&s).unwrap();
        assert_eq!(project2.operations.circular.len(), 1);
        assert_eq!(project2.project_type, ProjectType::Cut);
    }
}
