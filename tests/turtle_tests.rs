use bevy::prelude::*;
use bevy_plantgen::{
    FrameAxis, GeometrySink, InstanceRole, LSystemParams, PlacementKind, PlantGenError,
    RecordingSink, Reporter, Severity, StemStyle, TurtleCommand, TurtleFrame,
    TurtleInterpreter, TurtleState, turtle,
};
use bevy_plantgen::turtle::TurtleOutput;

fn interpret(commands: &str, angle: f32) -> (TurtleOutput, Vec<(Severity, String)>) {
    let mut reports: Vec<(Severity, String)> = Vec::new();
    let mut interpreter = TurtleInterpreter::new()
        .with_angle_degrees(angle)
        .with_step(1.0);
    interpreter.run(commands, &mut reports);
    (interpreter.finish(), reports)
}

fn distinct_positions(vertices: &[Vec3]) -> usize {
    let mut unique: Vec<Vec3> = Vec::new();
    for v in vertices {
        if !unique.iter().any(|u| u.distance(*v) < 1e-5) {
            unique.push(*v);
        }
    }
    unique.len()
}

#[test]
fn test_command_parsing() {
    assert_eq!(TurtleCommand::parse('F', None), TurtleCommand::Draw);
    assert_eq!(TurtleCommand::parse('G', None), TurtleCommand::Move);
    assert_eq!(TurtleCommand::parse('+', None), TurtleCommand::Yaw(1));
    assert_eq!(TurtleCommand::parse('^', None), TurtleCommand::Pitch(-1));
    assert_eq!(TurtleCommand::parse('\\', None), TurtleCommand::Roll(1));
    assert_eq!(TurtleCommand::parse('X', None), TurtleCommand::Ignore);
    assert_eq!(TurtleCommand::parse('L', None), TurtleCommand::Ignore);
    assert_eq!(TurtleCommand::parse('L', Some('L')), TurtleCommand::Leaf);
    // Built-in symbols cannot be shadowed by the leaf symbol
    assert_eq!(TurtleCommand::parse('F', Some('F')), TurtleCommand::Draw);
}

#[test]
fn test_frame_stays_orthonormal() {
    let mut frame = TurtleFrame::from_heading(Vec3::new(0.3, -0.7, 0.2));
    let axes = [FrameAxis::Up, FrameAxis::Left, FrameAxis::Heading];
    for i in 0..5000 {
        let angle = 0.1 + (i % 17) as f32 * 0.37;
        frame.rotate(axes[i % 3], if i % 2 == 0 { angle } else { -angle * 0.5 });
    }
    assert!(
        frame.orthonormality_error() < 1e-5,
        "Frame drifted: {}",
        frame.orthonormality_error()
    );
    assert!(frame.left.distance(frame.heading.cross(frame.up)) < 1e-5);
}

#[test]
fn test_initial_frame_handedness() {
    for heading in [Vec3::X, Vec3::Y, Vec3::Z, -Vec3::Z, Vec3::new(1.0, 1.0, 0.05)] {
        let frame = TurtleFrame::from_heading(heading);
        assert!(frame.heading.distance(heading.normalize()) < 1e-6);
        assert!(frame.orthonormality_error() < 1e-5);
        assert!(frame.left.distance(frame.heading.cross(frame.up)) < 1e-5);
    }
}

#[test]
fn test_rotation_maps_local_axes_onto_frame() {
    let frame = TurtleFrame::from_heading(Vec3::new(1.0, 2.0, 3.0));
    let q = frame.rotation();
    assert!((q * Vec3::X).distance(frame.left) < 1e-5);
    assert!((q * Vec3::Y).distance(frame.heading) < 1e-5);
    assert!((q * Vec3::Z).distance(frame.up) < 1e-5);
}

#[test]
fn test_yaw_keeps_up_axis() {
    let mut interpreter = TurtleInterpreter::new().with_angle_degrees(90.0);
    let before = interpreter.state().frame;
    interpreter.execute(TurtleCommand::Yaw(1)).unwrap();
    let after = interpreter.state().frame;
    assert!(after.up.distance(before.up) < 1e-6);
    assert!(after.heading.dot(before.heading).abs() < 1e-5);
}

#[test]
fn test_branch_returns_to_trunk() {
    let (output, reports) = interpret("F[+F]F", 90.0);
    assert!(reports.is_empty());

    let mesh = &output.mesh;
    assert_eq!(mesh.edges.len(), 3);
    assert_eq!(mesh.vertices.len(), 4);
    assert_eq!(distinct_positions(&mesh.vertices), 4);

    // Trunk continues straight up from the branch point
    let [a, b] = mesh.edges[2];
    assert!(mesh.vertices[a as usize].distance(Vec3::Z) < 1e-5);
    assert!(mesh.vertices[b as usize].distance(Vec3::Z * 2.0) < 1e-5);

    // The branch left the trunk sideways
    let [_, tip] = mesh.edges[1];
    let branch_tip = mesh.vertices[tip as usize];
    assert!((branch_tip.z - 1.0).abs() < 1e-5);
    assert!((branch_tip.truncate().length() - 1.0).abs() < 1e-5);
}

#[test]
fn test_push_pop_round_trip() {
    let mut interpreter = TurtleInterpreter::new().with_angle_degrees(33.0);
    interpreter.run("F+&F\\", &mut Vec::<(Severity, String)>::new());
    let before = *interpreter.state();

    interpreter.execute(TurtleCommand::Push).unwrap();
    assert_eq!(interpreter.stack_depth(), 1);
    interpreter.execute(TurtleCommand::Pop).unwrap();

    assert_eq!(*interpreter.state(), before);
    assert_eq!(interpreter.stack_depth(), 0);
}

#[test]
fn test_pushed_state_is_independent_copy() {
    let mut interpreter = TurtleInterpreter::new().with_angle_degrees(45.0);
    interpreter.execute(TurtleCommand::Push).unwrap();
    interpreter.run("F+F^F/F", &mut Vec::<(Severity, String)>::new());
    interpreter.execute(TurtleCommand::Pop).unwrap();
    assert_eq!(*interpreter.state(), TurtleState::default());
}

#[test]
fn test_unbalanced_pop_warns_and_keeps_state() {
    let mut interpreter = TurtleInterpreter::new();
    let mut reports: Vec<(Severity, String)> = Vec::new();
    interpreter.run("]", &mut reports);

    assert_eq!(*interpreter.state(), TurtleState::default());
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0, Severity::Warning);

    assert_eq!(
        interpreter.execute(TurtleCommand::Pop),
        Err(PlantGenError::UnbalancedBranch)
    );
}

#[test]
fn test_interpretation_continues_after_unbalanced_pop() {
    let (output, reports) = interpret("]F]F", 90.0);
    assert_eq!(output.unbalanced_pops, 2);
    assert_eq!(reports.len(), 2);
    assert_eq!(output.mesh.edges.len(), 2);
}

#[test]
fn test_move_adds_vertices_without_edges() {
    let (output, _) = interpret("GGG", 90.0);
    assert!(output.mesh.edges.is_empty());
    // Consecutive moves share their endpoints
    assert_eq!(output.mesh.vertices.len(), 4);
    assert!(output.mesh.vertices[3].distance(Vec3::Z * 3.0) < 1e-5);

    let (output, _) = interpret("FGF", 90.0);
    assert_eq!(output.mesh.edges.len(), 2);
    assert_eq!(output.mesh.vertices.len(), 4);
    let [a, _] = output.mesh.edges[1];
    assert!(output.mesh.vertices[a as usize].distance(Vec3::Z * 2.0) < 1e-5);
    // No edge spans the gap
    assert!(!output.mesh.edges.contains(&[1, 2]));
}

#[test]
fn test_move_only_plant_is_emitted() {
    let params = LSystemParams {
        axiom: "G".to_string(),
        rules: "X:X".to_string(),
        iterations: 1,
        ..Default::default()
    };
    let mut sink = RecordingSink::new();
    let mut reports: Vec<(Severity, String)> = Vec::new();

    let count = turtle::generate(&params, &mut sink, &mut reports).unwrap();

    assert_eq!(count, 1);
    assert_eq!(sink.meshes.len(), 1);
    assert_eq!(sink.meshes[0].1.vertices.len(), 2);
    assert!(sink.meshes[0].1.edges.is_empty());
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0, Severity::Info);
}

#[test]
fn test_unknown_symbols_are_ignored() {
    let (output, reports) = interpret("XFYZ", 90.0);
    assert!(reports.is_empty());
    assert_eq!(output.mesh.edges.len(), 1);
}

#[test]
fn test_leaf_quad_without_prototype() {
    let mut reports: Vec<(Severity, String)> = Vec::new();
    let mut interpreter = TurtleInterpreter::new().with_leaves('L', 0.5);
    interpreter.run("FL", &mut reports);
    let output = interpreter.finish();

    assert_eq!(output.mesh.edges.len(), 1);
    assert_eq!(output.mesh.faces.len(), 1);
    assert!(output.leaves.is_empty());

    let face = output.mesh.faces[0];
    let corners: Vec<Vec3> = face.iter().map(|&i| output.mesh.vertices[i as usize]).collect();
    assert_eq!(distinct_positions(&corners), 4);
    // The leaf grows from the tip of the segment
    let base_mid = (corners[0] + corners[1]) * 0.5;
    assert!(base_mid.distance(Vec3::Z) < 1e-5);
}

#[test]
fn test_leaves_disabled_ignores_leaf_symbol() {
    let (output, _) = interpret("FL", 90.0);
    assert!(output.mesh.faces.is_empty());
}

#[test]
fn test_degenerate_leaf_is_skipped() {
    let mut interpreter = TurtleInterpreter::new().with_leaves('L', 0.0);
    let mut reports: Vec<(Severity, String)> = Vec::new();
    interpreter.run("FL", &mut reports);
    let output = interpreter.finish();
    assert!(output.mesh.faces.is_empty());
    assert!(reports.is_empty(), "Degenerate leaves are not reported");
}

#[test]
fn test_leaf_prototype_placement() {
    let params = LSystemParams {
        axiom: "F+L".to_string(),
        rules: "X:X".to_string(),
        iterations: 1,
        angle_degrees: 90.0,
        step_length: 1.0,
        leaves_enabled: true,
        leaf_scale: 0.3,
        ..Default::default()
    };
    let mut sink = RecordingSink::new().with_prototype(InstanceRole::Leaf);
    assert!(sink.has_prototype(InstanceRole::Leaf));
    let mut reports: Vec<(Severity, String)> = Vec::new();

    turtle::generate(&params, &mut sink, &mut reports).unwrap();

    assert_eq!(sink.placements.len(), 1);
    let placement = sink.placements[0];
    assert_eq!(placement.kind, PlacementKind::Instance(InstanceRole::Leaf));
    assert!(placement.transform.translation.distance(Vec3::Z) < 1e-5);
    assert!(placement.transform.scale.distance(Vec3::splat(0.3)) < 1e-6);

    // Local forward follows the turned heading, local up stays on the turtle's up
    let mut expected = TurtleFrame::default();
    expected.rotate(FrameAxis::Up, 90f32.to_radians());
    let rotation = placement.transform.rotation;
    assert!((rotation * Vec3::Y).distance(expected.heading) < 1e-5);
    assert!((rotation * Vec3::Z).distance(expected.up) < 1e-5);

    // The leaf is an instance, not part of the stem mesh
    assert_eq!(sink.meshes.len(), 1);
    assert!(sink.meshes[0].1.faces.is_empty());
}

#[test]
fn test_generate_reports_and_emits_once() {
    let params = LSystemParams::default().validated();
    let mut sink = RecordingSink::new();
    let mut reports: Vec<(Severity, String)> = Vec::new();

    let count = turtle::generate(&params, &mut sink, &mut reports).unwrap();

    assert!(count > 0);
    assert_eq!(sink.meshes.len(), 1);
    assert_eq!(sink.meshes[0].0, "LSystemPlant");
    assert_eq!(reports.last().map(|r| r.0), Some(Severity::Info));
}

#[test]
fn test_empty_result_skips_sink() {
    let params = LSystemParams {
        axiom: "+-X".to_string(),
        rules: "X:X&".to_string(),
        ..Default::default()
    };
    let mut sink = RecordingSink::new();
    let mut reports: Vec<(Severity, String)> = Vec::new();

    let result = turtle::generate(&params, &mut sink, &mut reports);

    assert_eq!(result, Err(PlantGenError::EmptyResult("L-System")));
    assert!(sink.meshes.is_empty());
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0, Severity::Warning);
}

#[test]
fn test_leaf_placements_forwarded_with_empty_stem() {
    let params = LSystemParams {
        axiom: "L+L".to_string(),
        rules: "X:X".to_string(),
        iterations: 1,
        leaves_enabled: true,
        ..Default::default()
    };
    let mut sink = RecordingSink::new().with_prototype(InstanceRole::Leaf);
    let mut reports: Vec<(Severity, String)> = Vec::new();

    let result = turtle::generate(&params, &mut sink, &mut reports);

    assert_eq!(result, Err(PlantGenError::EmptyResult("L-System")));
    assert_eq!(sink.placements.len(), 2);
    assert!(
        sink.placements
            .iter()
            .all(|p| p.kind == PlacementKind::Instance(InstanceRole::Leaf))
    );
    assert!(sink.meshes.is_empty(), "Empty stems never reach the mesh sink");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0, Severity::Warning);
}

#[test]
fn test_tube_stems_keep_frame_orthonormal() {
    let mut interpreter = TurtleInterpreter::new()
        .with_angle_degrees(37.0)
        .with_step(0.5)
        .with_stem(StemStyle::Tubes {
            radius: 0.05,
            resolution: 6,
        });
    let mut reports: Vec<(Severity, String)> = Vec::new();
    interpreter.run(&"F&F\\F^F/F[+F&F]".repeat(200), &mut reports);

    let frame = interpreter.state().frame;
    assert!(
        frame.orthonormality_error() < 1e-5,
        "Frame drifted: {}",
        frame.orthonormality_error()
    );
    assert!(frame.left.distance(frame.heading.cross(frame.up)) < 1e-5);
    assert!(reports.is_empty());

    let output = interpreter.finish();
    assert!(output.mesh.edges.is_empty());
    assert!(!output.mesh.faces.is_empty());
    assert!(output.mesh.vertices.iter().all(|v| v.is_finite()));
    for point in output.strands.iter().flatten() {
        assert!(point.rotation.is_normalized());
    }
}

struct CountingReporter(usize);

impl Reporter for CountingReporter {
    fn report(&mut self, _severity: Severity, _message: &str) {
        self.0 += 1;
    }
}

#[test]
fn test_custom_reporter() {
    let mut reporter = CountingReporter(0);
    let mut sink = RecordingSink::new();
    let params = LSystemParams {
        axiom: "]F".to_string(),
        ..Default::default()
    };
    turtle::generate(&params, &mut sink, &mut reporter).unwrap();
    // One unbalanced pop plus the summary
    assert_eq!(reporter.0, 2);
}
