use serde::{Deserialize, Serialize};

/// A cutting tool as referenced by a project's operations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub kind: ToolKind,

    /// Cutting diameter in project units.
    pub diameter: f64,

    /// Added to drill depth to account for point geometry. `None` means no
    /// adjustment. Has no effect on cutting radius or on end mills.
    #[serde(default)]
    pub tip_compensation: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Drill,
    EndMill1Flute,
    EndMill2Flute,
}

impl Tool {
    pub fn new(kind: ToolKind, diameter: f64) -> Self {
        Self {
            kind,
            diameter,
            tip_compensation: None,
        }
    }

    /// Nominal cutting radius.
    pub fn radius(&self) -> f64 {
        self.diameter / 2.0
    }

    /// Depth to drill to, given the nominal material depth. Adds
    /// `tip_compensation` for drills only; end mills are unaffected.
    pub fn drill_depth(&self, material_depth: f64) -> f64 {
        match self.kind {
            ToolKind::Drill => material_depth + self.tip_compensation.unwrap_or(0.0),
            _ => material_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_no_compensation() {
        let t = Tool::new(ToolKind::EndMill2Flute, 0.25);
        assert!((t.radius() - 0.125).abs() < 1e-10);
    }

    #[test]
    fn test_radius_ignores_tip_compensation() {
        let mut t = Tool::new(ToolKind::EndMill1Flute, 0.125);
        t.tip_compensation = Some(0.002);
        assert!((t.radius() - 0.0625).abs() < 1e-10);
    }

    #[test]
    fn test_drill_depth_adds_tip_compensation() {
        let mut t = Tool::new(ToolKind::Drill, 0.125);
        t.tip_compensation = Some(0.02);
        assert!((t.drill_depth(0.5) - 0.52).abs() < 1e-10);
    }

    #[test]
    fn test_end_mill_depth_ignores_tip_compensation() {
        let mut t = Tool::new(ToolKind::EndMill2Flute, 0.25);
        t.tip_compensation = Some(0.02);
        assert!((t.drill_depth(0.5) - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_tool_toml_round_trip() {
        let t = Tool::new(ToolKind::Drill, 0.0625);
        let s = toml::to_string_pretty(&t).unwrap();
        let t2: Tool = toml::from_str(&s).unwrap();
        assert_eq!(t, t2);
    }
}
