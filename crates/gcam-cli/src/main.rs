use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use gcam_core::{CutStandards, Project};
use gcam_pipeline::{generate_pipeline, GenerateConfig, ProgressEvent, ProgressReporter};
use gcam_post::MachineProfile;

#[derive(Parser)]
#[command(name = "gcam", version, about = "Generate CNC G-code from a TOML project description")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate G-code from a TOML project file
    Generate {
        /// Path to the project TOML file
        project_file: PathBuf,

        /// Path to the machine profile TOML file (defaults to the built-in small-format router)
        #[arg(short, long)]
        machine: Option<PathBuf>,

        /// Path to the cut-standards TOML file
        #[arg(short, long)]
        standards: PathBuf,

        /// Output directory for generated files
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Project name override (defaults to the project file's stem)
        #[arg(long)]
        name: Option<String>,

        /// Skip validation checks
        #[arg(long)]
        no_validate: bool,
    },
}

/// Prints each pipeline stage as it completes.
struct PrintReporter;

impl ProgressReporter for PrintReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::OperationsExpanded { drill, circular, hexagonal, line } => {
                println!("Expanded operations: {drill} drill, {circular} circular, {hexagonal} hexagonal, {line} line");
            }
            ProgressEvent::TubeVoidFiltered { skipped_drill, skipped_circular, skipped_hexagonal } => {
                let total = skipped_drill + skipped_circular + skipped_hexagonal;
                if total > 0 {
                    println!(
                        "Tube void filter skipped {skipped_drill} drill point(s), {skipped_circular} circle(s), {skipped_hexagonal} hexagon(s)"
                    );
                }
            }
            ProgressEvent::DrillEmitted { count } => println!("Emitted {count} drill point(s)"),
            ProgressEvent::CircularEmitted { count } => println!("Emitted {count} circular cut(s)"),
            ProgressEvent::HexagonalEmitted { count } => println!("Emitted {count} hexagonal cut(s)"),
            ProgressEvent::LineEmitted { count } => println!("Emitted {count} line cut(s)"),
            ProgressEvent::Complete => println!("Generation complete."),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate { project_file, machine, standards, output_dir, name, no_validate } => {
            run_generate(project_file, machine.as_deref(), standards, output_dir, name.as_deref(), *no_validate)
        }
    }
}

fn run_generate(
    project_file: &Path,
    machine_file: Option<&Path>,
    standards_file: &Path,
    output_dir: &Path,
    name: Option<&str>,
    no_validate: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let project_toml = fs::read_to_string(project_file)?;
    let project: Project = toml::from_str(&project_toml)?;

    let machine = match machine_file {
        Some(path) => MachineProfile::from_toml(&fs::read_to_string(path)?)?,
        None => MachineProfile::small_format_router(),
    };

    let standards_toml = fs::read_to_string(standards_file)?;
    let standards = CutStandards::from_toml_str(&standards_toml)?;

    let project_name = name.map(str::to_string).unwrap_or_else(|| {
        project_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string())
    });

    println!("Project: {project_name}");
    println!("Material: {}", project.material_label);

    let config = GenerateConfig { skip_validation: no_validate };
    let result = generate_pipeline(&project_name, &project, &machine, &standards, &config, &PrintReporter)?;

    for warning in &result.generation.warnings {
        println!("WARNING: {warning}");
    }

    let project_dir = output_dir.join(&result.generation.sanitized_project_name);
    fs::create_dir_all(&project_dir)?;
    fs::write(project_dir.join("main.tap"), &result.generation.main_program)?;
    for (number, body) in &result.generation.subroutines {
        fs::write(project_dir.join(format!("{number}.nc")), body)?;
    }
    fs::write(project_dir.join("config.txt"), render_config(&project_name, &project, &machine))?;

    println!("\nG-code written to: {}", project_dir.display());
    println!(
        "  main.tap, {} subroutine(s), config.txt",
        result.generation.subroutines.len()
    );

    Ok(())
}

/// A human-readable dump of the inputs a run was generated from, written
/// alongside the G-code so the shop floor can see what produced it.
fn render_config(project_name: &str, project: &Project, machine: &MachineProfile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "project: {project_name}");
    let _ = writeln!(out, "project_type: {:?}", project.project_type);
    let _ = writeln!(out, "material_label: {}", project.material_label);
    let _ = writeln!(out, "material: {:?}", project.material);
    let _ = writeln!(out, "tool: {:?}", project.tool);
    let _ = writeln!(out, "tube_void_skip: {}", project.tube_void_skip);
    let _ = writeln!(out);
    let _ = writeln!(out, "machine.max_x: {}", machine.machine.max_x);
    let _ = writeln!(out, "machine.max_y: {}", machine.machine.max_y);
    let _ = writeln!(out, "machine.gcode_base_path: {}", machine.machine.gcode_base_path);
    let _ = writeln!(out, "general.safety_height: {}", machine.general.safety_height);
    let _ = writeln!(out, "general.ramp_angle: {}", machine.general.ramp_angle);
    let _ = writeln!(out, "general.helix_pitch: {}", machine.general.helix_pitch);
    out
}
