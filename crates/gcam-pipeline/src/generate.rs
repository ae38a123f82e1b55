use gcam_cam::{expand_operations, filter_for_tube};
use gcam_core::{CutStandards, Project, ToolKind};
use gcam_post::{
    generate_footer_lines, generate_header_lines, validate_project, Emitter, GenerationResult,
    MachineProfile,
};

use crate::error::PipelineError;

/// Configuration for the generation pipeline.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub skip_validation: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            skip_validation: false,
        }
    }
}

/// Output from the full generation pipeline: the emitted program plus how
/// many operations the tube void filter dropped before emission.
#[derive(Debug)]
pub struct GenerateResult {
    pub generation: GenerationResult,
    pub skipped_drill: usize,
    pub skipped_circular: usize,
    pub skipped_hexagonal: usize,
}

/// Progress reporting trait for pipeline events.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Events emitted during pipeline execution.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    OperationsExpanded { drill: usize, circular: usize, hexagonal: usize, line: usize },
    TubeVoidFiltered { skipped_drill: usize, skipped_circular: usize, skipped_hexagonal: usize },
    DrillEmitted { count: usize },
    CircularEmitted { count: usize },
    HexagonalEmitted { count: usize },
    LineEmitted { count: usize },
    Complete,
}

/// No-op reporter for when progress isn't needed.
pub struct NullReporter;
impl ProgressReporter for NullReporter {
    fn report(&self, _event: ProgressEvent) {}
}

/// Runs the full pipeline for one project: expand patterns, drop tube-void
/// operations, validate what remains, and emit G-code for each operation
/// kind in turn.
pub fn generate_pipeline(
    project_name: &str,
    project: &Project,
    machine: &MachineProfile,
    standards: &CutStandards,
    config: &GenerateConfig,
    reporter: &dyn ProgressReporter,
) -> Result<GenerateResult, PipelineError> {
    let expanded = expand_operations(&project.operations);
    reporter.report(ProgressEvent::OperationsExpanded {
        drill: expanded.drill.len(),
        circular: expanded.circular.len(),
        hexagonal: expanded.hexagonal.len(),
        line: expanded.line.len(),
    });

    let drill_radius = match project.tool.kind {
        ToolKind::Drill => 0.0,
        _ => project.tool.radius(),
    };
    let filtered = filter_for_tube(
        &expanded,
        &project.material,
        project.tube_void_skip,
        drill_radius,
        project.tool.radius(),
    );
    reporter.report(ProgressEvent::TubeVoidFiltered {
        skipped_drill: filtered.skipped_drill.len(),
        skipped_circular: filtered.skipped_circular.len(),
        skipped_hexagonal: filtered.skipped_hexagonal.len(),
    });

    if !config.skip_validation {
        // Validated against the pre-filter operation set: emptiness, tool
        // compatibility, and cut parameters are properties of what the
        // project declares, not of what the void filter happens to drop.
        let validation = validate_project(project, &expanded, machine, standards);
        if validation.has_errors() {
            let msgs: Vec<String> = validation.errors.iter().map(ToString::to_string).collect();
            return Err(PipelineError::ProjectValidation(msgs.join("; ")));
        }
    }

    let cut = standards
        .lookup(&project.material_label, project.tool.kind, project.tool.diameter)
        .map_err(|e| PipelineError::CutParameters(e.to_string()))?;
    let material_depth = project.material.material_depth();
    let drill_depth = project.tool.drill_depth(material_depth);

    let mut emitter = Emitter::new(machine, project_name, cut.pass_depth);
    let mut main_lines = generate_header_lines(cut.spindle_speed, machine);

    main_lines.extend(emitter.emit_drill(&filtered.drill, &cut, drill_depth));
    reporter.report(ProgressEvent::DrillEmitted { count: filtered.drill.len() });

    main_lines.extend(emitter.emit_circular(&filtered.circular, &cut, project.tool.diameter, material_depth));
    reporter.report(ProgressEvent::CircularEmitted { count: filtered.circular.len() });

    main_lines.extend(emitter.emit_hexagonal(&filtered.hexagonal, &cut, project.tool.diameter, material_depth));
    reporter.report(ProgressEvent::HexagonalEmitted { count: filtered.hexagonal.len() });

    main_lines.extend(emitter.emit_line(&filtered.line, &cut, project.tool.diameter, material_depth));
    reporter.report(ProgressEvent::LineEmitted { count: filtered.line.len() });

    main_lines.extend(generate_footer_lines(machine));

    let skipped_drill = filtered.skipped_drill.len();
    let skipped_circular = filtered.skipped_circular.len();
    let skipped_hexagonal = filtered.skipped_hexagonal.len();
    let generation = emitter.finish(main_lines);

    reporter.report(ProgressEvent::Complete);

    Ok(GenerateResult {
        generation,
        skipped_drill,
        skipped_circular,
        skipped_hexagonal,
    })
}
