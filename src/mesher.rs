use bevy::prelude::*;

use crate::geometry::PlantMesh;
use crate::params::{MAX_TUBE_RESOLUTION, MIN_TUBE_RESOLUTION};

/// One node of a turtle strand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrandPoint {
    pub position: Vec3,
    /// Turtle frame at the node; local +Y is the heading.
    pub rotation: Quat,
}

/// An unbranched run of `F` segments.
pub type Strand = Vec<StrandPoint>;

/// Sweeps strands into tubes of quads.
pub struct TubeMesher {
    radius: f32,
    resolution: u32,
}

impl Default for TubeMesher {
    fn default() -> Self {
        Self {
            radius: 0.02,
            resolution: 8,
        }
    }
}

impl TubeMesher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius.max(0.0);
        self
    }

    pub fn with_resolution(mut self, res: u32) -> Self {
        self.resolution = res.clamp(MIN_TUBE_RESOLUTION, MAX_TUBE_RESOLUTION);
        self
    }

    pub fn build(&self, strands: &[Strand]) -> PlantMesh {
        let mut mesh = PlantMesh::new();
        for strand in strands {
            if strand.len() < 2 {
                continue;
            }
            self.process_strand(&mut mesh, strand);
        }
        mesh
    }

    fn process_strand(&self, mesh: &mut PlantMesh, points: &[StrandPoint]) {
        // Drop zero-length segments, they have no tangent
        let mut filtered: Vec<&StrandPoint> = Vec::with_capacity(points.len());
        for point in points {
            match filtered.last() {
                Some(last) if last.position.distance_squared(point.position) <= 0.000001 => {}
                _ => filtered.push(point),
            }
        }
        if filtered.len() < 2 {
            return;
        }

        let first_tangent = (filtered[1].position - filtered[0].position).normalize_or_zero();
        let mut rotation = filtered[0].rotation;
        rotation =
            (Self::robust_rotation_arc(rotation * Vec3::Y, first_tangent) * rotation).normalize();

        let mut previous_ring = None;
        for i in 0..filtered.len() {
            let curr = filtered[i];

            // Miter tangent at joints, segment direction at the ends
            let tangent = if i == 0 {
                first_tangent
            } else if i + 1 == filtered.len() {
                (curr.position - filtered[i - 1].position).normalize_or_zero()
            } else {
                let v_in = (curr.position - filtered[i - 1].position).normalize_or_zero();
                let v_out = (filtered[i + 1].position - curr.position).normalize_or_zero();
                let sum = v_in + v_out;
                if sum.length_squared() < 0.001 {
                    v_in
                } else {
                    sum.normalize()
                }
            };

            // Parallel transport
            rotation =
                (Self::robust_rotation_arc(rotation * Vec3::Y, tangent) * rotation).normalize();

            let ring = self.add_ring(mesh, curr.position, rotation);
            if let Some(bottom) = previous_ring {
                self.connect_rings(mesh, bottom, ring);
            }
            previous_ring = Some(ring);
        }
    }

    fn robust_rotation_arc(from: Vec3, to: Vec3) -> Quat {
        const DOT_THRESHOLD: f32 = 0.9999;
        if to == Vec3::ZERO {
            return Quat::IDENTITY;
        }
        let dot = from.dot(to);
        if dot < -DOT_THRESHOLD {
            let axis = if from.x.abs() < 0.8 {
                Vec3::X.cross(from).normalize()
            } else {
                Vec3::Y.cross(from).normalize()
            };
            return Quat::from_axis_angle(axis, std::f32::consts::PI);
        } else if dot > DOT_THRESHOLD {
            return Quat::IDENTITY;
        }
        Quat::from_rotation_arc(from, to)
    }

    fn add_ring(&self, mesh: &mut PlantMesh, center: Vec3, rotation: Quat) -> u32 {
        let start_index = mesh.vertices.len() as u32;
        for i in 0..self.resolution {
            let theta = (i as f32 / self.resolution as f32) * std::f32::consts::TAU;
            let (sin, cos) = theta.sin_cos();
            let local_pos = Vec3::new(cos * self.radius, 0.0, sin * self.radius);
            mesh.add_vertex(center + rotation * local_pos);
        }
        start_index
    }

    fn connect_rings(&self, mesh: &mut PlantMesh, bottom_start: u32, top_start: u32) {
        for i in 0..self.resolution {
            let next = (i + 1) % self.resolution;
            mesh.faces.push([
                bottom_start + i,
                top_start + i,
                top_start + next,
                bottom_start + next,
            ]);
        }
    }
}
