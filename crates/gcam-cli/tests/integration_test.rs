//! End-to-end tests for the full TOML-project-to-G-code pipeline.

use gcam_core::{CutStandards, Project};
use gcam_pipeline::{generate_pipeline, GenerateConfig, NullReporter};
use gcam_post::MachineProfile;

const DRILL_GRID_TOML: &str = r#"
project_type = "drill"
material_label = "plywood_0.125"
tube_void_skip = false

[material]
thickness = 0.125

[tool]
kind = "drill"
diameter = 0.125

[[operations.drill]]
pattern = "grid"
start_x = 1.0
start_y = 1.0
x_spacing = 0.5
y_spacing = 0.5
x_count = 2
y_count = 2
"#;

fn drill_standards() -> CutStandards {
    let mut s = CutStandards::new();
    s.insert(
        "plywood_0.125",
        gcam_core::ToolKind::Drill,
        0.125,
        gcam_core::CutParams {
            spindle_speed: 18000,
            feed_rate: 60.0,
            plunge_rate: 20.0,
            pecking_depth: Some(0.04),
            pass_depth: None,
        },
    );
    s
}

/// Scenario A: a single drill grid expands row-major into 4 points, each
/// pecked to the full material depth.
#[test]
fn test_scenario_a_drill_grid() {
    let project: Project = toml::from_str(DRILL_GRID_TOML).expect("project parses");
    assert_eq!(project.operations.drill.len(), 1);

    let result = generate_pipeline(
        "drill_grid",
        &project,
        &MachineProfile::small_format_router(),
        &drill_standards(),
        &GenerateConfig::default(),
        &NullReporter,
    )
    .expect("pipeline succeeds");

    assert!(result.generation.warnings.is_empty());
    assert_eq!(result.skipped_drill, 0);

    let program = &result.generation.main_program;
    // Row-major expansion: (1,1), (1.5,1), (1,1.5), (1.5,1.5).
    assert!(program.contains("G00 X1.0000 Y1.0000"));
    assert!(program.contains("G00 X1.5000 Y1.0000"));
    assert!(program.contains("G00 X1.0000 Y1.5000"));
    assert!(program.contains("G00 X1.5000 Y1.5000"));
    // Pecking reaches the full material depth (0.125) in steps of 0.04.
    assert!(program.contains("Z-0.1250"));
    assert!(program.contains("M03 S18000"));
    assert!(program.contains("M30"));
}

const CIRCLE_TOML: &str = r#"
project_type = "cut"
material_label = "plywood_0.25"
tube_void_skip = false

[material]
thickness = 0.25

[tool]
kind = "end_mill_2flute"
diameter = 0.125

[[operations.circular]]
center_x = 5.0
center_y = 5.0
diameter = 1.0
compensation = "interior"
lead_in_mode = "auto"
approach_angle = 90.0
hold_time = 0.0
"#;

fn circle_standards() -> CutStandards {
    let mut s = CutStandards::new();
    s.insert(
        "plywood_0.25",
        gcam_core::ToolKind::EndMill2Flute,
        0.125,
        gcam_core::CutParams {
            spindle_speed: 18000,
            feed_rate: 80.0,
            plunge_rate: 20.0,
            pecking_depth: None,
            pass_depth: Some(0.05),
        },
    );
    s
}

/// Scenario B: an auto-lead-in interior circle, small enough that its
/// helical lead-in shares the same structure across 5 passes, is emitted as
/// one subroutine called once with `L=5` (5 passes of 0.05" through 0.25").
#[test]
fn test_scenario_b_interior_circle_helical_lead_in() {
    let project: Project = toml::from_str(CIRCLE_TOML).expect("project parses");

    let result = generate_pipeline(
        "circle_job",
        &project,
        &MachineProfile::small_format_router(),
        &circle_standards(),
        &GenerateConfig::default(),
        &NullReporter,
    )
    .expect("pipeline succeeds");

    assert_eq!(result.generation.subroutines.len(), 1);
    let (&number, body) = result.generation.subroutines.iter().next().unwrap();
    assert!((1100..1200).contains(&number));
    assert!(body.contains("G02") || body.contains("G03"));
    assert!(body.ends_with("M99\n%"));
    assert!(result.generation.main_program.contains("L5"));
}

/// Scenario E: drill points entirely inside a tube's hollow interior are
/// skipped; points in the wall are kept.
#[test]
fn test_scenario_e_tube_void_skip() {
    let mut project: Project = toml::from_str(DRILL_GRID_TOML).expect("project parses");
    project.material = gcam_core::Stock::Tube {
        outer_width: 2.0,
        outer_height: 1.0,
        wall_thickness: 0.125,
    };
    project.tube_void_skip = true;
    project.operations.drill = vec![
        gcam_core::DrillOp::Single { x: 0.05, y: 0.5 },
        gcam_core::DrillOp::Single { x: 1.0, y: 0.5 },
        gcam_core::DrillOp::Single { x: 1.9, y: 0.5 },
    ];

    let result = generate_pipeline(
        "tube_job",
        &project,
        &MachineProfile::small_format_router(),
        &drill_standards(),
        &GenerateConfig::default(),
        &NullReporter,
    )
    .expect("pipeline succeeds");

    assert_eq!(result.skipped_drill, 1);
    assert!(!result.generation.main_program.contains("X1.0000 Y0.5000"));
    assert!(result.generation.main_program.contains("X0.0500 Y0.5000"));
    assert!(result.generation.main_program.contains("X1.9000 Y0.5000"));
}

/// Scenario F: the subroutine call line is byte-exact, backslash paths and
/// all, regardless of host OS path conventions.
#[test]
fn test_scenario_f_subroutine_invocation_syntax() {
    use gcam_post::build_subroutine_path;

    let path = build_subroutine_path("C:\\Mach\\GCode", "My_Project", 1100);
    let call = format!("M98 (-{path}) L3");
    assert_eq!(call, "M98 (-C:\\Mach\\GCode\\My_Project\\1100.nc) L3");
}
