//! Machine profile and general settings: the per-shop configuration the
//! Code Emitter reads alongside a project.

use serde::{Deserialize, Serialize};

use gcam_core::Error;

/// Physical machine limits and controller capabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSettings {
    pub max_x: f64,
    pub max_y: f64,
    pub supports_subroutines: bool,
    pub supports_canned_cycles: bool,
    pub gcode_base_path: String,
}

/// Shop defaults: safety heights, warmup, lead-in strategy, and the safety
/// chain's slowdown factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadInPolicy {
    None,
    Ramp,
    Helical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralSettings {
    pub safety_height: f64,
    pub travel_height: f64,
    pub spindle_warmup_seconds: f64,
    pub lead_in_policy: LeadInPolicy,
    pub ramp_angle: f64,
    pub helix_pitch: f64,
    pub first_pass_feed_factor: f64,
    pub max_stepdown_factor: f64,
    pub corner_slowdown_enabled: bool,
    pub corner_feed_factor: f64,
    pub arc_slowdown_enabled: bool,
    pub arc_feed_factor: f64,
    pub allow_negative_coordinates: bool,
    pub cut_through_buffer: f64,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            safety_height: 0.5,
            travel_height: 0.25,
            spindle_warmup_seconds: 2.0,
            lead_in_policy: LeadInPolicy::Ramp,
            ramp_angle: 3.0,
            helix_pitch: 0.05,
            first_pass_feed_factor: 0.7,
            max_stepdown_factor: 1.0,
            corner_slowdown_enabled: true,
            corner_feed_factor: 0.5,
            arc_slowdown_enabled: true,
            arc_feed_factor: 0.8,
            allow_negative_coordinates: false,
            cut_through_buffer: 0.02,
        }
    }
}

/// A complete machine profile: physical limits plus shop defaults, loaded
/// from the machine TOML file alongside the project and cut-standards
/// files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineProfile {
    pub machine: MachineSettings,
    pub general: GeneralSettings,
}

impl MachineProfile {
    /// A representative small-format router profile, used as the default
    /// when no machine file is supplied.
    pub fn small_format_router() -> Self {
        Self {
            machine: MachineSettings {
                max_x: 24.0,
                max_y: 18.0,
                supports_subroutines: true,
                supports_canned_cycles: false,
                gcode_base_path: "C:\\gcode".to_string(),
            },
            general: GeneralSettings::default(),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents).map_err(Error::from)
    }

    pub fn to_toml(&self) -> Result<String, Error> {
        toml::to_string_pretty(self).map_err(Error::from)
    }
}
