//! Vogel's model of phyllotaxis.
//!
//! Point `n` sits at angle `n * golden_angle` and radius `c * sqrt(n)`, which
//! packs points evenly over a disc and produces the visible Fibonacci spiral
//! arms of a sunflower head. Optional z terms lift the disc into a cone or a
//! dome.

use std::f32::consts::FRAC_PI_2;
use std::f64::consts::TAU;

use bevy::prelude::*;

use crate::error::PlantGenError;
use crate::geometry::{GeometrySink, InstanceRole, Placement, PlacementKind, PlantMesh};
use crate::params::{LeafOrientation, PhyllotaxisParams};
use crate::report::{Reporter, Severity};

/// `π(3 − √5)`, the golden angle in radians (≈137.50776°).
pub const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Planar radius under which a point counts as the center of the field.
const CENTER_EPSILON: f32 = 1e-4;

/// Squared cross-product length under which two unit vectors are parallel.
const PARALLEL_EPSILON: f32 = 1e-10;

/// Icosphere tessellation used for sphere points.
pub const ICOSPHERE_SUBDIVISIONS: u32 = 2;

const MESH_NAME: &str = "VogelPattern";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhyllotaxisPoint {
    pub index: u32,
    pub position: Vec3,
    /// Distance from the spiral axis in the XY plane.
    pub radius: f32,
}

/// How a field is turned into geometry, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointRepresentation {
    CustomInstance,
    Icosphere,
    Vertices,
}

impl PointRepresentation {
    /// Custom instances need both the flag and a prototype to copy. A custom
    /// request without a prototype only falls back to icospheres, never to bare
    /// vertices, so `None` means nothing can be generated.
    pub fn select(params: &PhyllotaxisParams, sink: &dyn GeometrySink) -> Option<Self> {
        if params.use_custom_instance && sink.has_prototype(InstanceRole::Point) {
            Some(PointRepresentation::CustomInstance)
        } else if params.use_icospheres {
            Some(PointRepresentation::Icosphere)
        } else if params.use_custom_instance {
            None
        } else {
            Some(PointRepresentation::Vertices)
        }
    }
}

/// Computes point `n` of the spiral.
pub fn point(params: &PhyllotaxisParams, n: u32) -> PhyllotaxisPoint {
    let theta = (n as f64 * GOLDEN_ANGLE).rem_euclid(TAU) as f32;
    let sqrt_n = (n as f32).sqrt();
    let radius = params.scale * sqrt_n;
    let (sin, cos) = theta.sin_cos();
    let z = params.z_offset * sqrt_n + params.z_curvature * radius * radius;

    PhyllotaxisPoint {
        index: n,
        position: Vec3::new(radius * cos, radius * sin, z),
        radius,
    }
}

/// All `num_points` points, in spiral order. Restartable: call again for a
/// fresh iterator.
pub fn points(params: &PhyllotaxisParams) -> impl Iterator<Item = PhyllotaxisPoint> + '_ {
    (0..params.num_points).map(move |n| point(params, n))
}

/// Fixed rotation taking local +Y (forward) onto world +Z.
pub fn upward_rotation() -> Quat {
    Quat::from_rotation_x(FRAC_PI_2)
}

/// Rotation aiming local +Y exactly along `direction` while keeping local +Z
/// as close to `up` as possible.
///
/// Returns `None` when `direction` is zero or parallel to `up`.
pub fn track_to(direction: Vec3, up: Vec3) -> Option<Quat> {
    let forward = direction.try_normalize()?;
    let right = forward.cross(up);
    if right.length_squared() < PARALLEL_EPSILON {
        return None;
    }
    let right = right.normalize();
    let local_up = right.cross(forward);
    Some(Quat::from_mat3(&Mat3::from_cols(right, forward, local_up)).normalize())
}

/// Absolute orientation for an instance placed at `point`.
pub fn orientation(point: &PhyllotaxisPoint, mode: LeafOrientation, tilt_degrees: f32) -> Quat {
    match mode {
        LeafOrientation::Upward => upward_rotation(),
        LeafOrientation::Normal => {
            if point.radius <= CENTER_EPSILON {
                return upward_rotation();
            }
            let radial = Vec3::new(point.position.x, point.position.y, 0.0).normalize();
            let tilt = (tilt_degrees / 90.0).clamp(0.0, 1.0);
            let direction = radial.lerp(Vec3::Z, tilt);
            track_to(direction, Vec3::Z).unwrap_or_else(upward_rotation)
        }
    }
}

/// Generates a phyllotaxis field into `sink`.
///
/// Returns the number of created elements: one per point for instances and
/// spheres, one for the point-cloud mesh.
pub fn generate(
    params: &PhyllotaxisParams,
    sink: &mut dyn GeometrySink,
    reporter: &mut dyn Reporter,
) -> Result<usize, PlantGenError> {
    let result = run(params, sink);
    match &result {
        Ok(count) => reporter.report(
            Severity::Info,
            &format!("{} elements generated for Vogel pattern.", count),
        ),
        Err(err) => reporter.report(err.severity(), &err.to_string()),
    }
    result
}

fn run(params: &PhyllotaxisParams, sink: &mut dyn GeometrySink) -> Result<usize, PlantGenError> {
    let representation = match PointRepresentation::select(params, sink) {
        Some(representation) if params.num_points > 0 => representation,
        _ => return Err(PlantGenError::EmptyResult("Vogel pattern")),
    };

    match representation {
        PointRepresentation::CustomInstance => {
            let scale = Vec3::splat(params.instance_scale);
            for p in points(params) {
                let rotation = orientation(&p, params.orientation, params.tilt_degrees);
                sink.place(Placement {
                    transform: Transform {
                        translation: p.position,
                        rotation,
                        scale,
                    },
                    kind: PlacementKind::Instance(InstanceRole::Point),
                });
            }
            Ok(params.num_points as usize)
        }
        PointRepresentation::Icosphere => {
            let kind = PlacementKind::Icosphere {
                radius: params.point_radius,
                subdivisions: ICOSPHERE_SUBDIVISIONS,
            };
            for p in points(params) {
                sink.place(Placement {
                    transform: Transform::from_translation(p.position),
                    kind,
                });
            }
            Ok(params.num_points as usize)
        }
        PointRepresentation::Vertices => {
            let mut mesh = PlantMesh::new();
            for p in points(params) {
                mesh.add_vertex(p.position);
            }
            debug!("Vogel point cloud with {} vertices", mesh.vertices.len());
            sink.emit_mesh(MESH_NAME, mesh);
            Ok(1)
        }
    }
}
