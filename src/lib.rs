//! Procedural plant geometry for Bevy.
//!
//! Two generators, each a pure function from a parameter record to geometry:
//!
//! - **Phyllotaxis**: points on a Vogel spiral, emitted as a point cloud,
//!   spheres, or oriented instances of a prototype via [`phyllotaxis`].
//! - **L-System plants**: string rewriting via [`lsystem`], interpreted by a
//!   3D turtle with a branch stack via [`turtle`], producing a polyline or
//!   tube mesh with optional leaves.
//!
//! Generators never touch the world directly. They hand meshes and placement
//! requests to a [`GeometrySink`] and user feedback to a [`Reporter`]. The
//! [`scene`] module provides the Bevy implementations; [`RecordingSink`] plus
//! [`export`] cover headless use.
//!
//! # Example
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_plantgen::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins((DefaultPlugins, PlantGenPlugin))
//!         .add_systems(Startup, |mut commands: Commands| {
//!             commands.run_system_cached(spawn_phyllotaxis);
//!             commands.run_system_cached(spawn_lsystem);
//!         })
//!         .run();
//! }
//! ```
//!
//! Headless:
//!
//! ```ignore
//! use bevy_plantgen::prelude::*;
//!
//! let mut sink = RecordingSink::new();
//! let mut reports = Vec::new();
//! turtle::generate(&LSystemParams::default().validated(), &mut sink, &mut reports)?;
//! std::fs::write("plant.obj", sink.to_obj())?;
//! ```

pub mod error;
pub mod export;
pub mod frame;
pub mod geometry;
pub mod lsystem;
pub mod mesher;
pub mod params;
pub mod phyllotaxis;
pub mod report;
pub mod scene;
pub mod turtle;

pub use error::PlantGenError;
pub use frame::{FrameAxis, TurtleFrame};
pub use geometry::{GeometrySink, InstanceRole, Placement, PlacementKind, PlantMesh, RecordingSink};
pub use lsystem::RuleSet;
pub use mesher::TubeMesher;
pub use params::{LSystemParams, LeafOrientation, PhyllotaxisParams, StemStyle};
pub use report::{LogReporter, Reporter, Severity};
pub use scene::{PlantGenPlugin, PlantPrototypes, Prototype, SceneSink};
pub use turtle::{TurtleCommand, TurtleInterpreter, TurtleState};

pub mod prelude {
    pub use crate::scene::{spawn_lsystem, spawn_phyllotaxis};
    pub use crate::{
        GeometrySink, LSystemParams, LeafOrientation, LogReporter, PhyllotaxisParams,
        PlantGenPlugin, PlantPrototypes, RecordingSink, Reporter, Severity, StemStyle,
        lsystem, phyllotaxis, turtle,
    };
}
