//! Low-level G-code line formatting. No function here emits a comment —
//! every line produced is pure G-code for the Mach3-style interpreter.

/// Formats a coordinate with the given number of decimal places.
pub fn format_coordinate(value: f64, precision: usize) -> String {
    format!("{value:.precision$}")
}

/// Standard header: inch mode, absolute positioning, home, safety height,
/// spindle start, warmup dwell.
pub fn generate_header(spindle_speed: u32, warmup_seconds: u32, safety_height: f64) -> Vec<String> {
    vec![
        "G20 G90".to_string(),
        "G00 X0 Y0 Z0".to_string(),
        format!("G00 Z{}", format_coordinate(safety_height, 4)),
        format!("M03 S{spindle_speed}"),
        format!("G04 P{warmup_seconds}"),
    ]
}

/// Standard footer: spindle stop, retract, home, program end.
pub fn generate_footer(safety_height: f64) -> Vec<String> {
    vec![
        "M05".to_string(),
        format!("G00 Z{}", format_coordinate(safety_height, 4)),
        "G00 X0 Y0".to_string(),
        "M30".to_string(),
    ]
}

/// A G00 rapid move. Axis parts are omitted when `None`.
pub fn generate_rapid_move(x: Option<f64>, y: Option<f64>, z: Option<f64>) -> String {
    let mut parts = vec!["G00".to_string()];
    if let Some(x) = x {
        parts.push(format!("X{}", format_coordinate(x, 4)));
    }
    if let Some(y) = y {
        parts.push(format!("Y{}", format_coordinate(y, 4)));
    }
    if let Some(z) = z {
        parts.push(format!("Z{}", format_coordinate(z, 4)));
    }
    parts.join(" ")
}

/// A G01 linear move. Axis and feed parts are omitted when `None`.
pub fn generate_linear_move(x: Option<f64>, y: Option<f64>, z: Option<f64>, feed: Option<f64>) -> String {
    let mut parts = vec!["G01".to_string()];
    if let Some(x) = x {
        parts.push(format!("X{}", format_coordinate(x, 4)));
    }
    if let Some(y) = y {
        parts.push(format!("Y{}", format_coordinate(y, 4)));
    }
    if let Some(z) = z {
        parts.push(format!("Z{}", format_coordinate(z, 4)));
    }
    if let Some(feed) = feed {
        parts.push(format!("F{}", format_coordinate(feed, 1)));
    }
    parts.join(" ")
}

/// Arc direction, matching the controller's G02 (CW) / G03 (CCW) codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcCode {
    Cw,
    Ccw,
}

impl ArcCode {
    fn as_str(self) -> &'static str {
        match self {
            ArcCode::Cw => "G02",
            ArcCode::Ccw => "G03",
        }
    }
}

/// A G02/G03 arc move. `z` makes this a helical move (spiral descent).
#[allow(clippy::too_many_arguments)]
pub fn generate_arc_move(
    direction: ArcCode,
    x: f64,
    y: f64,
    i: f64,
    j: f64,
    z: Option<f64>,
    feed: Option<f64>,
) -> String {
    let mut parts = vec![
        direction.as_str().to_string(),
        format!("X{}", format_coordinate(x, 4)),
        format!("Y{}", format_coordinate(y, 4)),
    ];
    if let Some(z) = z {
        parts.push(format!("Z{}", format_coordinate(z, 4)));
    }
    parts.push(format!("I{}", format_coordinate(i, 4)));
    parts.push(format!("J{}", format_coordinate(j, 4)));
    if let Some(feed) = feed {
        parts.push(format!("F{}", format_coordinate(feed, 1)));
    }
    parts.join(" ")
}

/// Determines arc direction from a cross product of center-to-current and
/// center-to-destination vectors; `hint` overrides the calculation for
/// semicircles where the cross product is zero.
pub fn arc_direction(
    current: (f64, f64),
    destination: (f64, f64),
    center: (f64, f64),
    hint: Option<gcam_core::ArcDirection>,
) -> ArcCode {
    if let Some(hint) = hint {
        return match hint {
            gcam_core::ArcDirection::Cw => ArcCode::Cw,
            gcam_core::ArcDirection::Ccw => ArcCode::Ccw,
        };
    }
    let vec_to_current = (current.0 - center.0, current.1 - center.1);
    let vec_to_dest = (destination.0 - center.0, destination.1 - center.1);
    let cross = vec_to_current.0 * vec_to_dest.1 - vec_to_current.1 * vec_to_dest.0;
    if cross > 0.0 {
        ArcCode::Ccw
    } else {
        ArcCode::Cw
    }
}

/// I/J offsets from the current position to the arc center.
pub fn arc_ij_offsets(current: (f64, f64), center: (f64, f64)) -> (f64, f64) {
    (center.0 - current.0, center.1 - current.1)
}

/// An M98 subroutine call, in the Mach3-required `(-path)` syntax.
pub fn generate_subroutine_call(file_path: &str, loop_count: u32) -> String {
    format!("M98 (-{file_path}) L{loop_count}")
}

/// M99 followed by the `%` required for the L parameter to repeat correctly.
pub fn generate_subroutine_end() -> Vec<String> {
    vec!["M99".to_string(), "%".to_string()]
}

/// Cleans a project name for filesystem use: spaces become underscores,
/// everything but alphanumerics/underscore/hyphen is dropped, truncated to
/// 50 characters.
pub fn sanitize_project_name(name: &str) -> String {
    let replaced = name.replace(' ', "_");
    let filtered: String = replaced
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    filtered.chars().take(50).collect()
}
