//! The approach-angle convention used throughout lead-in geometry.
//!
//! User-facing angles follow the convention 0° = +Y (top), 90° = +X (right),
//! clockwise increasing. All trigonometry is done in the standard math
//! convention (0 = +X, counter-clockwise). `ApproachAngle` is the only type
//! allowed to cross that boundary, so a raw `f64` degrees value can never be
//! handed to `f64::cos`/`sin` by accident.

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// A user-convention angle in degrees: 0° = top, 90° = right, clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApproachAngle(f64);

impl ApproachAngle {
    pub fn degrees(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Convert to standard math-convention radians (0 = +X, CCW positive).
    pub fn to_math_radians(self) -> f64 {
        FRAC_PI_2 - self.0.to_radians()
    }
}

impl Default for ApproachAngle {
    /// 90° (3 o'clock) is the conventional default approach direction.
    fn default() -> Self {
        Self(90.0)
    }
}
