//! Code Emitter: turns expanded, validated operations into G-code — a main
//! program plus numbered subroutine files wired together with M98 calls.

use std::collections::BTreeMap;

use gcam_cam::{
    circle_lead_in_point, compensate_path, compensated_vertices, cut_radius, hexagon_lead_in_point,
    iter_passes, lead_in_distance as calc_lead_in_distance, line_lead_in_point, path_corner_factors,
    helical_step_feed, helix_radius_for_circle, helix_radius_for_hexagon, helix_revolutions,
    helix_start_point, standard_chain, FeedContext, SafetyChain,
};
use gcam_core::{
    ApproachAngle, CircularCut, Compensation, CutParams, HexagonalCut, LeadInMode, LineCut,
    LinePoint, LineSegmentType, Point2D,
};

use crate::format::{
    arc_direction, arc_ij_offsets, generate_arc_move, generate_footer, generate_header,
    generate_linear_move, generate_rapid_move, generate_subroutine_call, generate_subroutine_end,
    sanitize_project_name, ArcCode,
};
use crate::machine::{LeadInPolicy, MachineProfile};

/// One of the four fixed subroutine number bands, matched to the feature
/// kind so numbers stay stable and human-readable across a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubroutineKind {
    Drill,
    Circular,
    Hexagonal,
    Line,
}

fn subroutine_range(kind: SubroutineKind) -> (u32, u32) {
    match kind {
        SubroutineKind::Drill => (1000, 1099),
        SubroutineKind::Circular => (1100, 1199),
        SubroutineKind::Hexagonal => (1200, 1299),
        SubroutineKind::Line => (1300, 1399),
    }
}

/// First unused number in `kind`'s range, or `end + 1` if the range is
/// exhausted.
pub fn next_subroutine_number(kind: SubroutineKind, used: &[u32]) -> u32 {
    let (start, end) = subroutine_range(kind);
    for n in start..=end {
        if !used.contains(&n) {
            return n;
        }
    }
    end + 1
}

/// Full Mach3 path for an M98 call: always Windows backslashes, regardless
/// of host platform.
pub fn build_subroutine_path(base_path: &str, project_name: &str, number: u32) -> String {
    format!("{base_path}\\{project_name}\\{number}.nc").replace('/', "\\")
}

/// The complete output of a generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerationResult {
    pub main_program: String,
    pub subroutines: BTreeMap<u32, String>,
    pub sanitized_project_name: String,
    pub warnings: Vec<String>,
}

fn quantize(value: f64) -> i64 {
    (value * 10_000.0).round() as i64
}

fn compensation_tag(compensation: Compensation) -> u8 {
    match compensation {
        Compensation::None => 0,
        Compensation::Interior => 1,
        Compensation::Exterior => 2,
    }
}

fn is_path_closed(path: &[LinePoint], tolerance: f64) -> bool {
    if path.len() < 2 {
        return false;
    }
    let first = path[0];
    let last = path[path.len() - 1];
    (first.x - last.x).abs() < tolerance && (first.y - last.y).abs() < tolerance
}

/// Drives subroutine numbering and accumulates G-code, warnings, and output
/// files across a whole project's worth of operations.
pub struct Emitter<'a> {
    machine: &'a MachineProfile,
    project_name: String,
    subroutines: BTreeMap<u32, String>,
    used_numbers: Vec<u32>,
    warnings: Vec<String>,
    lead_in_distance: f64,
    chain: SafetyChain,
}

impl<'a> Emitter<'a> {
    pub fn new(machine: &'a MachineProfile, project_name: &str, cut_pass_depth: Option<f64>) -> Self {
        let lead_in_distance = match cut_pass_depth {
            Some(depth) if depth > 0.0 => calc_lead_in_distance(machine.general.ramp_angle, depth),
            _ => 0.25,
        };
        let chain = standard_chain(
            machine.general.first_pass_feed_factor,
            machine.general.corner_slowdown_enabled,
            machine.general.corner_feed_factor,
            machine.general.arc_slowdown_enabled,
            machine.general.arc_feed_factor,
        );
        Self {
            machine,
            project_name: sanitize_project_name(project_name),
            subroutines: BTreeMap::new(),
            used_numbers: Vec::new(),
            warnings: Vec::new(),
            lead_in_distance,
            chain,
        }
    }

    fn reserve_number(&mut self, kind: SubroutineKind) -> u32 {
        let n = next_subroutine_number(kind, &self.used_numbers);
        self.used_numbers.push(n);
        n
    }

    fn subroutine_path(&self, number: u32) -> String {
        build_subroutine_path(&self.machine.machine.gcode_base_path, &self.project_name, number)
    }

    fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Drilling is always inline: pattern identity (single/linear/grid) is
    /// consumed by the pattern expander upstream, so there is nothing left
    /// here to group into a repeated subroutine call.
    pub fn emit_drill(&mut self, points: &[(f64, f64)], cut: &CutParams, material_depth: f64) -> Vec<String> {
        if points.is_empty() {
            return Vec::new();
        }
        let pecking_depth = cut.pecking_depth.unwrap_or(0.05);
        let pecks = iter_passes(material_depth, pecking_depth);
        let travel = self.machine.general.travel_height;
        let safety = self.machine.general.safety_height;

        let mut lines = Vec::new();
        for &(x, y) in points {
            lines.push(generate_rapid_move(Some(x), Some(y), Some(travel)));
            lines.push(generate_rapid_move(None, None, Some(0.0)));
            for (i, peck) in pecks.iter().enumerate() {
                lines.push(generate_linear_move(None, None, Some(-peck.cumulative_depth), Some(cut.plunge_rate)));
                lines.push(generate_rapid_move(None, None, Some(safety)));
                if i + 1 < pecks.len() {
                    lines.push(generate_rapid_move(None, None, Some(0.0)));
                }
            }
        }
        lines
    }

    /// Effective lead-in policy for a single circle, folding in the
    /// small-feature fallback (helical -> ramp) and recording the warning.
    fn resolve_circle_lead_in(&mut self, cut_r: f64, tool_diameter: f64, diameter: f64) -> (LeadInPolicy, Option<f64>) {
        if self.machine.general.lead_in_policy != LeadInPolicy::Helical {
            return (self.machine.general.lead_in_policy.clone(), None);
        }
        match helix_radius_for_circle(cut_r, tool_diameter, self.machine.general.cut_through_buffer) {
            Some(r) => (LeadInPolicy::Helical, Some(r)),
            None => {
                self.warn(format!("circle d={diameter:.4}\" too small for helical lead-in, using ramp"));
                (LeadInPolicy::Ramp, None)
            }
        }
    }

    fn resolve_hexagon_lead_in(
        &mut self,
        flat_to_flat: f64,
        tool_diameter: f64,
        compensation: Compensation,
        cx: f64,
        cy: f64,
    ) -> (LeadInPolicy, Option<f64>) {
        if self.machine.general.lead_in_policy != LeadInPolicy::Helical {
            return (self.machine.general.lead_in_policy.clone(), None);
        }
        match helix_radius_for_hexagon(flat_to_flat, tool_diameter, compensation, self.machine.general.cut_through_buffer) {
            Some(r) => (LeadInPolicy::Helical, Some(r)),
            None => {
                self.warn(format!("hexagon ftf={flat_to_flat:.4}\" at ({cx}, {cy}) too small for helical lead-in, using ramp"));
                (LeadInPolicy::Ramp, None)
            }
        }
    }

    /// Subroutine body for one pass of a full circle, entered by plunge,
    /// ramp, or helix, and left at the same position it started from so a
    /// repeated M98 call descends cleanly into the next pass.
    fn circle_pass_body(
        &self,
        cut_r: f64,
        pass_depth: f64,
        cut: &CutParams,
        lead_in: &LeadInPolicy,
        helix_radius: Option<f64>,
        approach: ApproachAngle,
        hold_time: f64,
        pass_num: u32,
    ) -> String {
        let math_angle = approach.to_math_radians();
        let arc_feed = self.chain.adjusted_feed(
            cut.feed_rate,
            &FeedContext { pass_num, is_arc: true, corner_factor: 1.0 },
        );
        let linear_feed = self.chain.adjusted_feed(
            cut.feed_rate,
            &FeedContext { pass_num, is_arc: false, corner_factor: 1.0 },
        );

        let mut lines = Vec::new();
        match (lead_in, helix_radius) {
            (LeadInPolicy::Helical, Some(hr)) => {
                lines.push("G00 Z0".to_string());
                let revs = helix_revolutions(pass_depth, self.machine.general.helix_pitch);
                let depth_per_rev = pass_depth / revs as f64;
                let i = -hr * math_angle.cos();
                let j = -hr * math_angle.sin();
                lines.push("G91".to_string());
                for rev in 0..revs {
                    let feed = helical_step_feed(rev, revs, cut.plunge_rate, Some(arc_feed));
                    lines.push(generate_arc_move(ArcCode::Cw, 0.0, 0.0, i, j, Some(-depth_per_rev), Some(feed)));
                }
                lines.push("G90".to_string());
                if (hr - cut_r).abs() > 0.001 {
                    lines.push("G91".to_string());
                    let dx = (cut_r - hr) * math_angle.cos();
                    let dy = (cut_r - hr) * math_angle.sin();
                    lines.push(generate_arc_move(ArcCode::Cw, dx, dy, i, j, None, Some(arc_feed)));
                    lines.push("G90".to_string());
                }
            }
            (LeadInPolicy::Ramp, _) if self.lead_in_distance > 0.0 => {
                let dx = -self.lead_in_distance * math_angle.cos();
                let dy = -self.lead_in_distance * math_angle.sin();
                lines.push("G91".to_string());
                if dy.abs() < 0.0001 {
                    lines.push(format!("G01 X{dx:.4} Z{:.4} F{:.1}", -pass_depth, cut.plunge_rate));
                } else {
                    lines.push(format!("G01 X{dx:.4} Y{dy:.4} Z{:.4} F{:.1}", -pass_depth, cut.plunge_rate));
                }
                lines.push("G90".to_string());
            }
            _ => {
                lines.push("G91".to_string());
                lines.push(format!("G01 Z{:.4} F{:.1}", -pass_depth, cut.plunge_rate));
                lines.push("G90".to_string());
            }
        }

        if hold_time > 0.0 {
            let ms = (hold_time * 1000.0) as i64;
            lines.insert(1, format!("G04 P{ms}"));
        }

        let i_offset = -cut_r * math_angle.cos();
        let j_offset = -cut_r * math_angle.sin();
        lines.push(format!("G02 I{i_offset:.4} J{j_offset:.4} F{arc_feed:.1}"));

        match (lead_in, helix_radius) {
            (LeadInPolicy::Helical, Some(hr)) if (hr - cut_r).abs() > 0.001 => {
                let dx = (hr - cut_r) * math_angle.cos();
                let dy = (hr - cut_r) * math_angle.sin();
                lines.push("G91".to_string());
                lines.push(format!(
                    "G02 X{dx:.4} Y{dy:.4} I{i_offset:.4} J{j_offset:.4} F{arc_feed:.1}"
                ));
                lines.push("G90".to_string());
            }
            (LeadInPolicy::Ramp, _) if self.lead_in_distance > 0.0 => {
                let dx = self.lead_in_distance * math_angle.cos();
                let dy = self.lead_in_distance * math_angle.sin();
                lines.push("G91".to_string());
                if dy.abs() < 0.0001 {
                    lines.push(format!("G01 X{dx:.4} F{linear_feed:.1}"));
                } else {
                    lines.push(format!("G01 X{dx:.4} Y{dy:.4} F{linear_feed:.1}"));
                }
                lines.push("G90".to_string());
            }
            _ => {}
        }

        let mut file = lines;
        file.extend(generate_subroutine_end());
        file.join("\n")
    }

    fn emit_circle_inline(&mut self, circle: &CircularCut, cut: &CutParams, tool_diameter: f64, material_depth: f64) -> Vec<String> {
        let cr = cut_radius(circle.diameter, tool_diameter, circle.compensation);
        let pass_depth = cut.pass_depth.unwrap_or(0.025);
        let passes = iter_passes(material_depth, pass_depth);
        let center = Point2D::new(circle.center_x, circle.center_y);
        let approach = circle.approach_angle;

        let (lead_in, helix_radius) = if circle.lead_in_mode == LeadInMode::Manual {
            match circle.lead_in_type {
                Some(gcam_core::LeadInType::Helical) => {
                    let hr = helix_radius_for_circle(cr, tool_diameter, self.machine.general.cut_through_buffer);
                    if hr.is_some() {
                        (LeadInPolicy::Helical, hr)
                    } else {
                        self.warn(format!("circle d={:.4}\" too small for helical lead-in, using ramp", circle.diameter));
                        (LeadInPolicy::Ramp, None)
                    }
                }
                Some(gcam_core::LeadInType::Ramp) => (LeadInPolicy::Ramp, None),
                _ => (LeadInPolicy::None, None),
            }
        } else {
            self.resolve_circle_lead_in(cr, tool_diameter, circle.diameter)
        };

        let mut lines = Vec::new();
        let start = match lead_in {
            LeadInPolicy::Helical if helix_radius.is_some() => helix_start_point(center, helix_radius.unwrap(), approach),
            LeadInPolicy::Ramp if self.lead_in_distance > 0.0 => circle_lead_in_point(center, cr, self.lead_in_distance, approach),
            _ => {
                let math_angle = approach.to_math_radians();
                Point2D::new(center.x + cr * math_angle.cos(), center.y + cr * math_angle.sin())
            }
        };
        lines.push(generate_rapid_move(Some(start.x), Some(start.y), Some(self.machine.general.travel_height)));
        lines.push(generate_rapid_move(None, None, Some(0.0)));

        for pass in &passes {
            let body = self.circle_pass_body(
                cr, pass.per_pass_depth, cut, &lead_in, helix_radius, approach, circle.hold_time, pass.pass_num,
            );
            lines.extend(body.lines().map(str::to_string));
        }
        lines.push(generate_rapid_move(None, None, Some(self.machine.general.safety_height)));
        lines
    }

    /// Circular cuts: operations with a manual lead-in run inline (one body
    /// per feature, since a custom approach angle isn't shared); auto-mode
    /// operations that share `(diameter, compensation, hold_time)` share one
    /// subroutine, called once per instance.
    pub fn emit_circular(&mut self, circles: &[CircularCut], cut: &CutParams, tool_diameter: f64, material_depth: f64) -> Vec<String> {
        if circles.is_empty() {
            return Vec::new();
        }
        let pass_depth = cut.pass_depth.unwrap_or(0.025);
        let passes = iter_passes(material_depth, pass_depth);
        let num_passes = passes.len() as u32;
        let actual_pass_depth = material_depth / num_passes as f64;

        let (manual, auto): (Vec<_>, Vec<_>) = circles.iter().partition(|c| c.lead_in_mode == LeadInMode::Manual);

        let mut lines = Vec::new();
        for circle in &manual {
            lines.extend(self.emit_circle_inline(circle, cut, tool_diameter, material_depth));
        }

        if auto.is_empty() {
            return lines;
        }

        if !self.machine.machine.supports_subroutines {
            for circle in &auto {
                lines.extend(self.emit_circle_inline(circle, cut, tool_diameter, material_depth));
            }
            return lines;
        }

        let mut groups: BTreeMap<(i64, u8, i64, i64), Vec<&CircularCut>> = BTreeMap::new();
        for c in &auto {
            let key = (
                quantize(c.diameter),
                compensation_tag(c.compensation),
                quantize(c.hold_time),
                quantize(c.approach_angle.value()),
            );
            groups.entry(key).or_default().push(c);
        }

        for group in groups.into_values() {
            let sample = group[0];
            let cr = cut_radius(sample.diameter, tool_diameter, sample.compensation);
            let (lead_in, helix_radius) = self.resolve_circle_lead_in(cr, tool_diameter, sample.diameter);
            let approach = sample.approach_angle;

            // Shared body, called repeatedly via M98 L<n>: it cannot express a
            // feed difference between passes, so pass_num is pinned away from
            // the first-pass slowdown.
            let sub_num = self.reserve_number(SubroutineKind::Circular);
            let body = self.circle_pass_body(cr, actual_pass_depth, cut, &lead_in, helix_radius, approach, sample.hold_time, 1);
            self.subroutines.insert(sub_num, body);
            let sub_path = self.subroutine_path(sub_num);

            for circle in group {
                let center = Point2D::new(circle.center_x, circle.center_y);
                let start = match (&lead_in, helix_radius) {
                    (LeadInPolicy::Helical, Some(hr)) => helix_start_point(center, hr, approach),
                    (LeadInPolicy::Ramp, _) if self.lead_in_distance > 0.0 => {
                        circle_lead_in_point(center, cr, self.lead_in_distance, approach)
                    }
                    _ => Point2D::new(center.x + cr, center.y),
                };
                lines.push(generate_rapid_move(Some(start.x), Some(start.y), Some(self.machine.general.travel_height)));
                lines.push(generate_rapid_move(None, None, Some(0.0)));
                lines.push(generate_subroutine_call(&sub_path, num_passes));
                lines.push(generate_rapid_move(None, None, Some(self.machine.general.safety_height)));
            }
        }
        lines
    }

    /// Subroutine body for one pass of a hexagon: plunge/ramp/helix entry,
    /// straight cuts to each vertex, close, and lead-out back to the entry
    /// point.
    fn hexagon_pass_body(
        &self,
        vertices: &[Point2D; 6],
        pass_depth: f64,
        cut: &CutParams,
        lead_in: &LeadInPolicy,
        lead_in_point: Option<Point2D>,
        center: Option<Point2D>,
        helix_radius: Option<f64>,
        approach: ApproachAngle,
        hold_time: f64,
        pass_num: u32,
    ) -> String {
        let mut lines = Vec::new();
        let profile_start = vertices[0];
        let math_angle = approach.to_math_radians();
        let arc_feed = self.chain.adjusted_feed(
            cut.feed_rate,
            &FeedContext { pass_num, is_arc: true, corner_factor: 1.0 },
        );
        let linear_feed = self.chain.adjusted_feed(
            cut.feed_rate,
            &FeedContext { pass_num, is_arc: false, corner_factor: 1.0 },
        );

        let mut helix_end: Option<Point2D> = None;
        match (lead_in, center, helix_radius) {
            (LeadInPolicy::Helical, Some(c), Some(hr)) => {
                lines.push("G00 Z0".to_string());
                let revs = helix_revolutions(pass_depth, self.machine.general.helix_pitch);
                let depth_per_rev = pass_depth / revs as f64;
                let start = helix_start_point(c, hr, approach);
                let i = -hr * math_angle.cos();
                let j = -hr * math_angle.sin();
                lines.push("G91".to_string());
                for rev in 0..revs {
                    let feed = helical_step_feed(rev, revs, cut.plunge_rate, Some(arc_feed));
                    lines.push(generate_arc_move(ArcCode::Cw, 0.0, 0.0, i, j, Some(-depth_per_rev), Some(feed)));
                }
                lines.push("G90".to_string());
                lines.push(format!("G01 X{:.4} Y{:.4} F{linear_feed:.1}", profile_start.x, profile_start.y));
                helix_end = Some(start);
            }
            (LeadInPolicy::Ramp, ..) => {
                if let Some(p) = lead_in_point {
                    let dx = profile_start.x - p.x;
                    let dy = profile_start.y - p.y;
                    lines.push("G91".to_string());
                    lines.push(format!("G01 X{dx:.4} Y{dy:.4} Z{:.4} F{:.1}", -pass_depth, cut.plunge_rate));
                    lines.push("G90".to_string());
                } else {
                    lines.push("G91".to_string());
                    lines.push(format!("G01 Z{:.4} F{:.1}", -pass_depth, cut.plunge_rate));
                    lines.push("G90".to_string());
                }
            }
            _ => {
                lines.push("G91".to_string());
                lines.push(format!("G01 Z{:.4} F{:.1}", -pass_depth, cut.plunge_rate));
                lines.push("G90".to_string());
            }
        }

        if hold_time > 0.0 {
            let ms = (hold_time * 1000.0) as i64;
            lines.insert(1, format!("G04 P{ms}"));
        }

        for v in &vertices[1..] {
            lines.push(format!("G01 X{:.4} Y{:.4} F{linear_feed:.1}", v.x, v.y));
        }
        lines.push(format!("G01 X{:.4} Y{:.4}", profile_start.x, profile_start.y));

        match lead_in {
            LeadInPolicy::Helical => {
                if let Some(end) = helix_end {
                    lines.push(format!("G01 X{:.4} Y{:.4}", end.x, end.y));
                }
            }
            LeadInPolicy::Ramp => {
                if let Some(p) = lead_in_point {
                    lines.push(format!("G01 X{:.4} Y{:.4}", p.x, p.y));
                }
            }
            LeadInPolicy::None => {}
        }

        let mut file = lines;
        file.extend(generate_subroutine_end());
        file.join("\n")
    }

    /// Hexagon subroutines carry absolute vertex coordinates, so each
    /// hexagon (a distinct center) gets its own subroutine rather than
    /// sharing one the way same-size circles do.
    pub fn emit_hexagonal(&mut self, hexagons: &[HexagonalCut], cut: &CutParams, tool_diameter: f64, material_depth: f64) -> Vec<String> {
        if hexagons.is_empty() {
            return Vec::new();
        }
        let pass_depth = cut.pass_depth.unwrap_or(0.025);
        let passes = iter_passes(material_depth, pass_depth);
        let num_passes = passes.len() as u32;
        let actual_pass_depth = material_depth / num_passes as f64;

        let mut lines = Vec::new();
        for hex in hexagons {
            let vertices = compensated_vertices(hex.center_x, hex.center_y, hex.flat_to_flat, tool_diameter, hex.compensation);
            let center = Point2D::new(hex.center_x, hex.center_y);
            let approach = hex.approach_angle;

            let (lead_in, helix_radius) = if hex.lead_in_mode == LeadInMode::Manual {
                match hex.lead_in_type {
                    Some(gcam_core::LeadInType::Helical) => {
                        let hr = helix_radius_for_hexagon(hex.flat_to_flat, tool_diameter, hex.compensation, self.machine.general.cut_through_buffer);
                        if hr.is_some() {
                            (LeadInPolicy::Helical, hr)
                        } else {
                            self.warn(format!("hexagon ftf={:.4}\" at ({}, {}) too small for helical lead-in, using ramp", hex.flat_to_flat, hex.center_x, hex.center_y));
                            (LeadInPolicy::Ramp, None)
                        }
                    }
                    Some(gcam_core::LeadInType::Ramp) => (LeadInPolicy::Ramp, None),
                    _ => (LeadInPolicy::None, None),
                }
            } else {
                self.resolve_hexagon_lead_in(hex.flat_to_flat, tool_diameter, hex.compensation, hex.center_x, hex.center_y)
            };

            let manual_angle = if hex.lead_in_mode == LeadInMode::Manual { Some(approach) } else { None };
            let lead_in_point = match lead_in {
                LeadInPolicy::Ramp if self.lead_in_distance > 0.0 => {
                    Some(hexagon_lead_in_point(&vertices, self.lead_in_distance, center, manual_angle))
                }
                _ => None,
            };

            // Hexagons always use a shared subroutine body, called repeatedly
            // via M98 L<n>, so pass_num is pinned away from the first-pass
            // slowdown.
            let sub_num = self.reserve_number(SubroutineKind::Hexagonal);
            let body = self.hexagon_pass_body(
                &vertices,
                actual_pass_depth,
                cut,
                &lead_in,
                lead_in_point,
                if matches!(lead_in, LeadInPolicy::Helical) { Some(center) } else { None },
                helix_radius,
                approach,
                hex.hold_time,
                1,
            );
            self.subroutines.insert(sub_num, body);
            let sub_path = self.subroutine_path(sub_num);

            let start = match (&lead_in, helix_radius) {
                (LeadInPolicy::Helical, Some(hr)) => helix_start_point(center, hr, approach),
                (LeadInPolicy::Ramp, _) => lead_in_point.unwrap_or(vertices[0]),
                _ => vertices[0],
            };
            lines.push(generate_rapid_move(Some(start.x), Some(start.y), Some(self.machine.general.travel_height)));
            lines.push(generate_rapid_move(None, None, Some(0.0)));
            lines.push(generate_subroutine_call(&sub_path, num_passes));
            lines.push(generate_rapid_move(None, None, Some(self.machine.general.safety_height)));
        }
        lines
    }

    /// Subroutine body for one pass of a line (or arc-segmented) path:
    /// plunge or ramp entry, each segment in sequence, and a lead-out back
    /// to the lead-in point when the path is closed. `feed_factors[i]`
    /// scales the feed rate used to travel into `path[i]`, so corners can
    /// run slower than straight runs.
    fn line_path_body(
        &self,
        path: &[LinePoint],
        pass_depth: f64,
        cut: &CutParams,
        lead_in_point: Option<Point2D>,
        hold_time: f64,
        feed_factors: &[f64],
        pass_num: u32,
    ) -> String {
        if path.is_empty() {
            return generate_subroutine_end().join("\n");
        }
        let mut lines = Vec::new();
        let profile_start = Point2D::new(path[0].x, path[0].y);

        if let Some(p) = lead_in_point {
            let dx = profile_start.x - p.x;
            let dy = profile_start.y - p.y;
            lines.push("G91".to_string());
            lines.push(format!("G01 X{dx:.4} Y{dy:.4} Z{:.4} F{:.1}", -pass_depth, cut.plunge_rate));
            lines.push("G90".to_string());
        } else {
            lines.push("G91".to_string());
            lines.push(format!("G01 Z{:.4} F{:.1}", -pass_depth, cut.plunge_rate));
            lines.push("G90".to_string());
        }

        if hold_time > 0.0 {
            let ms = (hold_time * 1000.0) as i64;
            lines.insert(1, format!("G04 P{ms}"));
        }

        let mut current = profile_start;
        for (idx, point) in path.iter().enumerate().skip(1) {
            let dest = Point2D::new(point.x, point.y);
            let corner_factor = feed_factors.get(idx).copied().unwrap_or(1.0);
            let is_arc = point.segment_type == LineSegmentType::Arc;
            let feed = self.chain.adjusted_feed(cut.feed_rate, &FeedContext { pass_num, is_arc, corner_factor });
            if point.segment_type == LineSegmentType::Arc {
                let center = point.arc_center.map(|(x, y)| Point2D::new(x, y)).unwrap_or(dest);
                let direction = arc_direction((current.x, current.y), (dest.x, dest.y), (center.x, center.y), point.arc_direction);
                let (i, j) = arc_ij_offsets((current.x, current.y), (center.x, center.y));
                lines.push(generate_arc_move(direction, dest.x, dest.y, i, j, None, Some(feed)));
            } else {
                lines.push(generate_linear_move(Some(dest.x), Some(dest.y), None, Some(feed)));
            }
            current = dest;
        }

        if let Some(p) = lead_in_point {
            if is_path_closed(path, 0.0001) {
                lines.push(format!("G01 X{:.4} Y{:.4}", p.x, p.y));
            }
        }

        let mut file = lines;
        file.extend(generate_subroutine_end());
        file.join("\n")
    }

    /// Line cuts: arc geometry is expected to have passed validation already;
    /// compensation is applied here via [`compensate_path`].
    pub fn emit_line(&mut self, line_cuts: &[LineCut], cut: &CutParams, tool_diameter: f64, material_depth: f64) -> Vec<String> {
        if line_cuts.is_empty() {
            return Vec::new();
        }
        let pass_depth = cut.pass_depth.unwrap_or(0.025);
        let passes = iter_passes(material_depth, pass_depth);
        let num_passes = passes.len() as u32;
        let actual_pass_depth = material_depth / num_passes as f64;

        let mut lines = Vec::new();
        for line_cut in line_cuts {
            if line_cut.points.is_empty() {
                continue;
            }

            let compensated = if line_cut.compensation != Compensation::None {
                match compensate_path(&line_cut.points, tool_diameter, line_cut.compensation) {
                    Ok(p) => p,
                    Err(e) => {
                        self.warn(e.to_string());
                        continue;
                    }
                }
            } else {
                line_cut.points.clone()
            };

            let feed_factors = if self.machine.general.corner_slowdown_enabled {
                path_corner_factors(&compensated, 120.0)
            } else {
                vec![1.0; compensated.len()]
            };

            let manual = line_cut.lead_in_mode == LeadInMode::Manual;
            let use_lead_in = if manual {
                !matches!(line_cut.lead_in_type, Some(gcam_core::LeadInType::Plunge) | None) && self.lead_in_distance > 0.0
            } else {
                self.lead_in_distance > 0.0
            };
            let approach_angle = if manual { Some(line_cut.approach_angle) } else { None };

            let lead_in_point = if use_lead_in {
                Some(line_lead_in_point(&compensated, self.lead_in_distance, line_cut.compensation, approach_angle))
            } else {
                None
            };

            if self.machine.machine.supports_subroutines {
                // Shared body, called repeatedly via M98 L<n>: pass_num is
                // pinned away from the first-pass slowdown.
                let sub_num = self.reserve_number(SubroutineKind::Line);
                let body = self.line_path_body(&compensated, actual_pass_depth, cut, lead_in_point, line_cut.hold_time, &feed_factors, 1);
                self.subroutines.insert(sub_num, body);
                let sub_path = self.subroutine_path(sub_num);

                let start = lead_in_point.unwrap_or_else(|| Point2D::new(compensated[0].x, compensated[0].y));
                lines.push(generate_rapid_move(Some(start.x), Some(start.y), Some(self.machine.general.travel_height)));
                lines.push(generate_rapid_move(None, None, Some(0.0)));
                lines.push(generate_subroutine_call(&sub_path, num_passes));
                lines.push(generate_rapid_move(None, None, Some(self.machine.general.safety_height)));
            } else {
                let start = lead_in_point.unwrap_or_else(|| Point2D::new(compensated[0].x, compensated[0].y));
                lines.push(generate_rapid_move(Some(start.x), Some(start.y), Some(self.machine.general.travel_height)));
                lines.push(generate_rapid_move(None, None, Some(0.0)));
                for pass in &passes {
                    let body = self.line_path_body(
                        &compensated, pass.per_pass_depth, cut, lead_in_point, line_cut.hold_time, &feed_factors, pass.pass_num,
                    );
                    lines.extend(body.lines().map(str::to_string));
                }
                lines.push(generate_rapid_move(None, None, Some(self.machine.general.safety_height)));
            }
        }
        lines
    }

    /// Assembles the header, every operation kind present, and the footer
    /// into the finished result.
    pub fn finish(self, main_lines: Vec<String>) -> GenerationResult {
        GenerationResult {
            main_program: main_lines.join("\n"),
            subroutines: self.subroutines,
            sanitized_project_name: self.project_name,
            warnings: self.warnings,
        }
    }
}

pub fn generate_header_lines(spindle_speed: u32, machine: &MachineProfile) -> Vec<String> {
    generate_header(spindle_speed, machine.general.spindle_warmup_seconds as u32, machine.general.safety_height)
}

pub fn generate_footer_lines(machine: &MachineProfile) -> Vec<String> {
    generate_footer(machine.general.safety_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cut_params() -> CutParams {
        CutParams {
            spindle_speed: 18000,
            feed_rate: 60.0,
            plunge_rate: 20.0,
            pecking_depth: Some(0.1),
            pass_depth: Some(0.125),
        }
    }

    fn machine() -> MachineProfile {
        MachineProfile::small_format_router()
    }

    #[test]
    fn test_next_subroutine_number_fills_gaps() {
        assert_eq!(next_subroutine_number(SubroutineKind::Circular, &[1100, 1101]), 1102);
    }

    #[test]
    fn test_next_subroutine_number_falls_back_past_range() {
        let used: Vec<u32> = (1000..=1099).collect();
        assert_eq!(next_subroutine_number(SubroutineKind::Drill, &used), 1100);
    }

    #[test]
    fn test_build_subroutine_path_uses_backslashes() {
        let path = build_subroutine_path("C:\\gcode", "MyProject", 1100);
        assert_eq!(path, "C:\\gcode\\MyProject\\1100.nc");
    }

    #[test]
    fn test_emit_drill_produces_peck_cycle_per_point() {
        let m = machine();
        let mut emitter = Emitter::new(&m, "test", None);
        let lines = emitter.emit_drill(&[(1.0, 1.0)], &cut_params(), 0.2);
        assert!(lines.iter().any(|l| l.starts_with("G00 X1.0000 Y1.0000")));
        assert!(lines.iter().any(|l| l.starts_with("G01")));
    }

    #[test]
    fn test_emit_circular_auto_shares_one_subroutine() {
        let m = machine();
        let mut emitter = Emitter::new(&m, "test", Some(0.125));
        let circles = vec![
            CircularCut {
                center_x: 1.0,
                center_y: 1.0,
                diameter: 0.5,
                compensation: Compensation::Interior,
                lead_in_mode: LeadInMode::Auto,
                lead_in_type: None,
                approach_angle: ApproachAngle::default(),
                hold_time: 0.0,
                pattern: None,
            },
            CircularCut {
                center_x: 3.0,
                center_y: 1.0,
                diameter: 0.5,
                compensation: Compensation::Interior,
                lead_in_mode: LeadInMode::Auto,
                lead_in_type: None,
                approach_angle: ApproachAngle::default(),
                hold_time: 0.0,
                pattern: None,
            },
        ];
        let _ = emitter.emit_circular(&circles, &cut_params(), 0.25, 0.25);
        assert_eq!(emitter.subroutines.len(), 1);
    }

    #[test]
    fn test_emit_hexagonal_gives_each_hexagon_its_own_subroutine() {
        let m = machine();
        let mut emitter = Emitter::new(&m, "test", Some(0.125));
        let hexagons = vec![
            HexagonalCut {
                center_x: 1.0,
                center_y: 1.0,
                flat_to_flat: 1.0,
                compensation: Compensation::Interior,
                lead_in_mode: LeadInMode::Auto,
                lead_in_type: None,
                approach_angle: ApproachAngle::default(),
                hold_time: 0.0,
                pattern: None,
            },
            HexagonalCut {
                center_x: 3.0,
                center_y: 1.0,
                flat_to_flat: 1.0,
                compensation: Compensation::Interior,
                lead_in_mode: LeadInMode::Auto,
                lead_in_type: None,
                approach_angle: ApproachAngle::default(),
                hold_time: 0.0,
                pattern: None,
            },
        ];
        let _ = emitter.emit_hexagonal(&hexagons, &cut_params(), 0.25, 0.25);
        assert_eq!(emitter.subroutines.len(), 2);
    }

    #[test]
    fn test_emit_line_closed_path_leads_out() {
        let m = machine();
        let mut emitter = Emitter::new(&m, "test", Some(0.125));
        let points = vec![
            LinePoint::straight(0.0, 0.0),
            LinePoint::straight(1.0, 0.0),
            LinePoint::straight(1.0, 1.0),
            LinePoint::straight(0.0, 0.0),
        ];
        let line_cut = LineCut {
            points,
            compensation: Compensation::None,
            lead_in_mode: LeadInMode::Auto,
            lead_in_type: None,
            approach_angle: ApproachAngle::default(),
            hold_time: 0.0,
        };
        let lines = emitter.emit_line(&[line_cut], &cut_params(), 0.25, 0.25);
        assert!(lines.iter().any(|l| l.starts_with("M98")));
        assert_eq!(emitter.subroutines.len(), 1);
    }

    #[test]
    fn test_emit_line_skips_non_compensable_and_warns() {
        let m = machine();
        let mut emitter = Emitter::new(&m, "test", Some(0.125));
        let points = vec![
            LinePoint::straight(0.0, 0.0),
            gcam_core::LinePoint {
                x: 1.0,
                y: 0.0,
                segment_type: LineSegmentType::Arc,
                arc_center: None,
                arc_direction: None,
            },
            LinePoint::straight(0.0, 0.0),
        ];
        let line_cut = LineCut {
            points,
            compensation: Compensation::Interior,
            lead_in_mode: LeadInMode::Auto,
            lead_in_type: None,
            approach_angle: ApproachAngle::default(),
            hold_time: 0.0,
        };
        let lines = emitter.emit_line(&[line_cut], &cut_params(), 0.25, 0.25);
        assert!(lines.is_empty());
        assert!(emitter.warnings.iter().any(|w| w.contains("arc segment missing center")));
    }

    #[test]
    fn test_small_circle_falls_back_from_helical_with_warning() {
        let mut m = machine();
        m.general.lead_in_policy = LeadInPolicy::Helical;
        let mut emitter = Emitter::new(&m, "test", Some(0.125));
        let circles = vec![CircularCut {
            center_x: 0.0,
            center_y: 0.0,
            diameter: 0.1,
            compensation: Compensation::None,
            lead_in_mode: LeadInMode::Auto,
            lead_in_type: None,
            approach_angle: ApproachAngle::default(),
            hold_time: 0.0,
            pattern: None,
        }];
        let _ = emitter.emit_circular(&circles, &cut_params(), 0.25, 0.25);
        assert!(emitter.warnings.iter().any(|w| w.contains("too small for helical")));
    }

    #[test]
    fn test_generation_result_assembles_header_and_footer() {
        let m = machine();
        let emitter = Emitter::new(&m, "My Project", Some(0.125));
        let mut main = generate_header_lines(18000, &m);
        main.extend(generate_footer_lines(&m));
        let result = emitter.finish(main);
        assert_eq!(result.sanitized_project_name, "My_Project");
        assert!(result.main_program.starts_with("G20 G90"));
        assert!(result.main_program.ends_with("M30"));
    }
}
