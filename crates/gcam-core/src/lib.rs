pub mod angle;
pub mod cutstandards;
pub mod error;
pub mod geometry;
pub mod project;
pub mod stock;
pub mod tool;

pub use angle::ApproachAngle;
pub use cutstandards::{CutParams, CutStandards};
pub use error::Error;
pub use geometry::{LineSegment, Point2D, Rect, Vector2D};
pub use project::{
    ArcDirection, Axis, CircularCut, Compensation, DrillOp, HexagonalCut, LeadInMode, LeadInType,
    LineCut, LinePoint, LineSegmentType, LinearPattern, Operations, Project, ProjectType,
};
pub use stock::{Stock, TubeOrientation};
pub use tool::{Tool, ToolKind};
