use serde::{Deserialize, Serialize};

/// The material stock a project cuts into.
///
/// A `Tube`, laid flat on the machine bed, exposes one rectangular face;
/// the working rectangle is `working_length × selected_face_dimension` and
/// the interior void is the inset rectangle `wall_thickness` from every edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Stock {
    Sheet {
        thickness: f64,
    },
    Tube {
        outer_width: f64,
        outer_height: f64,
        wall_thickness: f64,
    },
}

/// Orientation of a tube on the machine bed, selecting which face is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TubeOrientation {
    Wide,
    Narrow,
}

impl Stock {
    /// Depth to cut through for a single pass of this stock (no buffer added).
    pub fn material_depth(&self) -> f64 {
        match self {
            Stock::Sheet { thickness } => *thickness,
            Stock::Tube { wall_thickness, .. } => *wall_thickness,
        }
    }

    /// The interior void rectangle of a tube, as `(x_min, y_min, x_max, y_max)`.
    /// Returns `None` for sheet stock, which has no cavity.
    pub fn void_bounds(&self) -> Option<(f64, f64, f64, f64)> {
        match self {
            Stock::Sheet { .. } => None,
            Stock::Tube {
                outer_width,
                outer_height,
                wall_thickness,
            } => Some((
                *wall_thickness,
                *wall_thickness,
                outer_width - wall_thickness,
                outer_height - wall_thickness,
            )),
        }
    }

    /// True if a point, expanded by `tool_radius` in every direction, lies
    /// strictly inside the void (boundary-touching does not count).
    pub fn point_in_void(&self, x: f64, y: f64, tool_radius: f64) -> bool {
        match self.void_bounds() {
            None => false,
            Some((x_min, y_min, x_max, y_max)) => {
                x - tool_radius > x_min
                    && x + tool_radius < x_max
                    && y - tool_radius > y_min
                    && y + tool_radius < y_max
            }
        }
    }
}
