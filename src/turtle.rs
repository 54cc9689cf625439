//! 3D turtle interpretation of L-System strings.
//!
//! The turtle walks the expanded string one symbol at a time. `F` draws a
//! segment, `G` moves without drawing, `+ - & ^ \ /` yaw, pitch and roll the
//! frame by the configured angle, and `[` / `]` save and restore the whole
//! state so branches return to where they started. Everything else is ignored,
//! which lets grammars use helper symbols such as `X` that only matter during
//! rewriting.

use bevy::prelude::*;

use crate::error::PlantGenError;
use crate::frame::{FrameAxis, TurtleFrame};
use crate::geometry::{GeometrySink, InstanceRole, Placement, PlacementKind, PlantMesh};
use crate::lsystem::{self, RuleSet};
use crate::mesher::{Strand, StrandPoint, TubeMesher};
use crate::params::{LSystemParams, StemStyle};
use crate::report::{Reporter, Severity};

const MESH_NAME: &str = "LSystemPlant";

/// A symbol parsed once into the action it triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurtleCommand {
    /// `F`
    Draw,
    /// `G`
    Move,
    /// `+` (1) / `-` (-1): about the up axis.
    Yaw(i8),
    /// `&` (1) / `^` (-1): about the left axis.
    Pitch(i8),
    /// `\` (1) / `/` (-1): about the heading axis.
    Roll(i8),
    Push,
    Pop,
    Leaf,
    Ignore,
}

impl TurtleCommand {
    /// Maps a symbol to its command. Built-in symbols win over the leaf symbol.
    pub fn parse(symbol: char, leaf_symbol: Option<char>) -> Self {
        match symbol {
            'F' => TurtleCommand::Draw,
            'G' => TurtleCommand::Move,
            '+' => TurtleCommand::Yaw(1),
            '-' => TurtleCommand::Yaw(-1),
            '&' => TurtleCommand::Pitch(1),
            '^' => TurtleCommand::Pitch(-1),
            '\\' => TurtleCommand::Roll(1),
            '/' => TurtleCommand::Roll(-1),
            '[' => TurtleCommand::Push,
            ']' => TurtleCommand::Pop,
            s if Some(s) == leaf_symbol => TurtleCommand::Leaf,
            _ => TurtleCommand::Ignore,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurtleState {
    pub position: Vec3,
    pub frame: TurtleFrame,
    /// Mesh vertex sitting at `position`, reused as the start of the next `F`.
    pub vertex: Option<u32>,
}

impl TurtleState {
    pub fn new(heading: Vec3) -> Self {
        Self {
            position: Vec3::ZERO,
            frame: TurtleFrame::from_heading(heading),
            vertex: None,
        }
    }
}

impl Default for TurtleState {
    fn default() -> Self {
        Self::new(Vec3::Z)
    }
}

/// What a finished interpretation produced.
#[derive(Debug, Clone, Default)]
pub struct TurtleOutput {
    pub mesh: PlantMesh,
    /// Leaf instance requests, in the order the leaves were met.
    pub leaves: Vec<Placement>,
    pub strands: Vec<Strand>,
    /// Number of `]` skipped because the stack was empty.
    pub unbalanced_pops: usize,
}

pub struct TurtleInterpreter {
    state: TurtleState,
    stack: Vec<TurtleState>,
    angle: f32,
    step: f32,
    leaf_symbol: Option<char>,
    leaf_scale: f32,
    leaf_prototype: bool,
    stem: StemStyle,
    mesh: PlantMesh,
    leaves: Vec<Placement>,
    strands: Vec<Strand>,
    strand_open: bool,
    unbalanced_pops: usize,
}

impl Default for TurtleInterpreter {
    fn default() -> Self {
        Self {
            state: TurtleState::default(),
            stack: Vec::new(),
            angle: 25.7_f32.to_radians(),
            step: 1.0,
            leaf_symbol: None,
            leaf_scale: 0.1,
            leaf_prototype: false,
            stem: StemStyle::Lines,
            mesh: PlantMesh::new(),
            leaves: Vec::new(),
            strands: Vec::new(),
            strand_open: false,
            unbalanced_pops: 0,
        }
    }
}

impl TurtleInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures angle, step, heading, leaves and stem style from `params`.
    pub fn from_params(params: &LSystemParams) -> Self {
        let interpreter = Self::new()
            .with_angle_degrees(params.angle_degrees)
            .with_step(params.step_length)
            .with_heading(params.initial_heading)
            .with_stem(params.stem);
        if params.leaves_enabled {
            interpreter.with_leaves(params.leaf_symbol, params.leaf_scale)
        } else {
            interpreter
        }
    }

    pub fn with_angle_degrees(mut self, degrees: f32) -> Self {
        self.angle = degrees.to_radians();
        self
    }

    pub fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    pub fn with_heading(mut self, heading: Vec3) -> Self {
        self.state = TurtleState::new(heading);
        self
    }

    /// Enables leaf emission on `symbol`.
    pub fn with_leaves(mut self, symbol: char, scale: f32) -> Self {
        self.leaf_symbol = Some(symbol);
        self.leaf_scale = scale;
        self
    }

    /// Emit leaves as prototype placements instead of quads.
    pub fn with_leaf_prototype(mut self, available: bool) -> Self {
        self.leaf_prototype = available;
        self
    }

    pub fn with_stem(mut self, stem: StemStyle) -> Self {
        self.stem = stem;
        self
    }

    pub fn state(&self) -> &TurtleState {
        &self.state
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Runs every symbol of `commands`, reporting unbalanced `]` as warnings.
    pub fn run(&mut self, commands: &str, reporter: &mut dyn Reporter) {
        for symbol in commands.chars() {
            let command = TurtleCommand::parse(symbol, self.leaf_symbol);
            if let Err(err) = self.execute(command) {
                reporter.report(err.severity(), &err.to_string());
            }
        }
    }

    /// Applies one command to the live state.
    pub fn execute(&mut self, command: TurtleCommand) -> Result<(), PlantGenError> {
        match command {
            TurtleCommand::Draw => self.draw(),
            TurtleCommand::Move => self.advance(),
            TurtleCommand::Yaw(sign) => self.turn(FrameAxis::Up, sign),
            TurtleCommand::Pitch(sign) => self.turn(FrameAxis::Left, sign),
            TurtleCommand::Roll(sign) => self.turn(FrameAxis::Heading, sign),
            TurtleCommand::Push => self.stack.push(self.state),
            TurtleCommand::Pop => {
                let Some(saved) = self.stack.pop() else {
                    self.unbalanced_pops += 1;
                    return Err(PlantGenError::UnbalancedBranch);
                };
                self.state = saved;
                self.strand_open = false;
            }
            TurtleCommand::Leaf => self.leaf(),
            TurtleCommand::Ignore => {}
        }
        Ok(())
    }

    fn turn(&mut self, axis: FrameAxis, sign: i8) {
        self.state.frame.rotate(axis, self.angle * sign as f32);
    }

    /// `G`: both endpoints become vertices, but no edge joins them.
    fn advance(&mut self) {
        let start = self.state.position;
        let end = start + self.state.frame.heading * self.step;

        if matches!(self.stem, StemStyle::Lines) {
            if self.state.vertex.is_none() {
                self.mesh.add_vertex(start);
            }
            self.state.vertex = Some(self.mesh.add_vertex(end));
        }
        self.strand_open = false;
        self.state.position = end;
    }

    fn draw(&mut self) {
        let start = self.state.position;
        let end = start + self.state.frame.heading * self.step;
        let rotation = self.state.frame.rotation();

        if matches!(self.stem, StemStyle::Lines) {
            let a = match self.state.vertex {
                Some(index) => index,
                None => self.mesh.add_vertex(start),
            };
            let b = self.mesh.add_vertex(end);
            self.mesh.add_edge(a, b);
            self.state.vertex = Some(b);
        }

        if !self.strand_open || self.strands.is_empty() {
            self.strands.push(vec![StrandPoint {
                position: start,
                rotation,
            }]);
        }
        if let Some(strand) = self.strands.last_mut() {
            strand.push(StrandPoint {
                position: end,
                rotation,
            });
        }
        self.strand_open = true;
        self.state.position = end;
    }

    fn leaf(&mut self) {
        let frame = self.state.frame;
        let origin = self.state.position;

        if self.leaf_prototype {
            self.leaves.push(Placement {
                transform: Transform {
                    translation: origin,
                    rotation: frame.rotation(),
                    scale: Vec3::splat(self.leaf_scale),
                },
                kind: PlacementKind::Instance(InstanceRole::Leaf),
            });
            return;
        }

        let s = self.leaf_scale;
        let corners = [
            Vec3::new(-0.5 * s, 0.0, 0.0),
            Vec3::new(0.5 * s, 0.0, 0.0),
            Vec3::new(0.5 * s, s, 0.0),
            Vec3::new(-0.5 * s, s, 0.0),
        ]
        .map(|local| frame.transform_point(origin, local));
        // Degenerate leaves are dropped without a report
        self.mesh.add_quad(corners);
    }

    /// Finalizes the run, sweeping tubes when the stem style asks for them.
    pub fn finish(self) -> TurtleOutput {
        let mesh = match self.stem {
            StemStyle::Lines => self.mesh,
            StemStyle::Tubes { radius, resolution } => {
                let mut tubes = TubeMesher::new()
                    .with_radius(radius)
                    .with_resolution(resolution)
                    .build(&self.strands);
                tubes.append(&self.mesh);
                tubes
            }
        };

        TurtleOutput {
            mesh,
            leaves: self.leaves,
            strands: self.strands,
            unbalanced_pops: self.unbalanced_pops,
        }
    }
}

/// Expands and interprets an L-System, handing the result to `sink`.
///
/// Rule errors abort before anything reaches the sink. Leaf placements are
/// forwarded even when the stem mesh turns out empty. Returns the number of
/// interpreted commands.
pub fn generate(
    params: &LSystemParams,
    sink: &mut dyn GeometrySink,
    reporter: &mut dyn Reporter,
) -> Result<usize, PlantGenError> {
    let result = run(params, sink, reporter);
    match &result {
        Ok(count) => reporter.report(
            Severity::Info,
            &format!("L-System plant generated with {} commands.", count),
        ),
        Err(err) => reporter.report(err.severity(), &err.to_string()),
    }
    result
}

fn run(
    params: &LSystemParams,
    sink: &mut dyn GeometrySink,
    reporter: &mut dyn Reporter,
) -> Result<usize, PlantGenError> {
    let rules = RuleSet::parse(&params.rules)?;
    let commands = lsystem::expand(&params.axiom, &rules, params.iterations);
    debug!(
        "expanded L-System to {} symbols after {} iterations",
        commands.len(),
        params.iterations
    );

    let mut interpreter = TurtleInterpreter::from_params(params)
        .with_leaf_prototype(sink.has_prototype(InstanceRole::Leaf));
    interpreter.run(&commands, reporter);
    let output = interpreter.finish();

    for leaf in output.leaves {
        sink.place(leaf);
    }

    if output.mesh.is_empty() {
        return Err(PlantGenError::EmptyResult("L-System"));
    }
    sink.emit_mesh(MESH_NAME, output.mesh);
    Ok(commands.chars().count())
}
