use crate::error::Error;
use crate::tool::ToolKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cut parameters for a single (material, tool kind, diameter) combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutParams {
    pub spindle_speed: u32,
    pub feed_rate: f64,
    pub plunge_rate: f64,
    #[serde(default)]
    pub pecking_depth: Option<f64>,
    #[serde(default)]
    pub pass_depth: Option<f64>,
}

/// One row of the on-disk cut standards table, as loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CutStandardEntry {
    material: String,
    tool_kind: ToolKind,
    diameter: f64,
    #[serde(flatten)]
    params: CutParams,
}

/// The on-disk shape of a cut standards file: a flat `[[standards]]` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CutStandardsFile {
    #[serde(default)]
    standards: Vec<CutStandardEntry>,
}

/// Quantize a diameter to the same 4-decimal precision the emitter uses for
/// coordinates, so lookups never miss on floating-point fuzz.
fn quantize(diameter: f64) -> i64 {
    (diameter * 10_000.0).round() as i64
}

/// Lookup table mapping `(material, tool kind, diameter)` to cut parameters.
#[derive(Debug, Clone, Default)]
pub struct CutStandards {
    table: HashMap<(String, ToolKind, i64), CutParams>,
}

impl CutStandards {
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    pub fn insert(&mut self, material_label: &str, tool_kind: ToolKind, diameter: f64, params: CutParams) {
        self.table
            .insert((material_label.to_string(), tool_kind, quantize(diameter)), params);
    }

    pub fn lookup(&self, material_label: &str, tool_kind: ToolKind, diameter: f64) -> Result<CutParams, Error> {
        self.table
            .get(&(material_label.to_string(), tool_kind, quantize(diameter)))
            .copied()
            .ok_or_else(|| {
                Error::ParameterNotFound(format!(
                    "{material_label}/{tool_kind:?}/{diameter}"
                ))
            })
    }

    pub fn from_toml_str(s: &str) -> Result<Self, Error> {
        let file: CutStandardsFile = toml::from_str(s)?;
        let mut table = CutStandards::new();
        for e in file.standards {
            table.insert(&e.material, e.tool_kind, e.diameter, e.params);
        }
        Ok(table)
    }
}
