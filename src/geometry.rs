//! Generated geometry and the sink it is handed to.
//!
//! Generators build a [`PlantMesh`] (vertices, edges and quad faces) and
//! [`Placement`] requests, then pass them to a [`GeometrySink`]. The sink owns
//! everything it receives; generators keep no reference afterwards.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

/// Squared distance under which two quad corners count as coincident.
const DEGENERATE_EPSILON: f32 = 1e-12;

/// Polyline / quad mesh accumulated by a generator run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlantMesh {
    pub vertices: Vec<Vec3>,
    pub edges: Vec<[u32; 2]>,
    pub faces: Vec<[u32; 4]>,
}

impl PlantMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a vertex and returns its index.
    pub fn add_vertex(&mut self, position: Vec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        index
    }

    pub fn add_edge(&mut self, a: u32, b: u32) {
        self.edges.push([a, b]);
    }

    /// Appends a quad from four world-space corners.
    ///
    /// Returns `false` without touching the mesh when the corners are
    /// degenerate (two coincide, or the quad has no area).
    pub fn add_quad(&mut self, corners: [Vec3; 4]) -> bool {
        for i in 0..4 {
            for j in (i + 1)..4 {
                if corners[i].distance_squared(corners[j]) <= DEGENERATE_EPSILON {
                    return false;
                }
            }
        }
        let diagonal_cross = (corners[2] - corners[0]).cross(corners[3] - corners[1]);
        if diagonal_cross.length_squared() <= DEGENERATE_EPSILON {
            return false;
        }

        let start = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        self.faces.push([start, start + 1, start + 2, start + 3]);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Appends another mesh, offsetting its indices.
    pub fn append(&mut self, other: &PlantMesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.edges
            .extend(other.edges.iter().map(|[a, b]| [a + offset, b + offset]));
        self.faces
            .extend(other.faces.iter().map(|&face| face.map(|i| i + offset)));
    }

    /// Splits the mesh into renderable Bevy meshes, one per topology.
    ///
    /// Edges become a `LineList`, quads a `TriangleList` with smooth normals.
    /// A mesh with neither becomes a `PointList` point cloud.
    pub fn to_bevy_meshes(&self) -> Vec<Mesh> {
        let mut out = Vec::new();
        if self.vertices.is_empty() {
            return out;
        }

        if !self.edges.is_empty() {
            let indices: Vec<u32> = self.edges.iter().flatten().copied().collect();
            let mut mesh = Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::default());
            mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.vertices.clone());
            mesh.insert_indices(Indices::U32(indices));
            out.push(mesh);
        }

        if !self.faces.is_empty() {
            let mut normals = vec![Vec3::ZERO; self.vertices.len()];
            let mut indices = Vec::with_capacity(self.faces.len() * 6);
            for &[a, b, c, d] in &self.faces {
                for [i, j, k] in [[a, b, c], [a, c, d]] {
                    let (p0, p1, p2) = (
                        self.vertices[i as usize],
                        self.vertices[j as usize],
                        self.vertices[k as usize],
                    );
                    let face_normal = (p1 - p0).cross(p2 - p0);
                    for idx in [i, j, k] {
                        normals[idx as usize] += face_normal;
                    }
                    indices.extend_from_slice(&[i, j, k]);
                }
            }
            let normals: Vec<Vec3> = normals
                .into_iter()
                .map(|n| n.try_normalize().unwrap_or(Vec3::Z))
                .collect();

            let mut mesh = Mesh::new(
                PrimitiveTopology::TriangleList,
                RenderAssetUsages::default(),
            );
            mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.vertices.clone());
            mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
            mesh.insert_indices(Indices::U32(indices));
            out.push(mesh);
        }

        if self.edges.is_empty() && self.faces.is_empty() {
            let mut mesh = Mesh::new(PrimitiveTopology::PointList, RenderAssetUsages::default());
            mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.vertices.clone());
            out.push(mesh);
        }

        out
    }
}

/// Which externally supplied prototype an instance request refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceRole {
    /// Object placed at every phyllotaxis point.
    Point,
    /// Object placed at every leaf symbol.
    Leaf,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementKind {
    /// A small sphere mesh of the given radius.
    Icosphere { radius: f32, subdivisions: u32 },
    /// An independent copy of the prototype registered for the role.
    Instance(InstanceRole),
}

/// Request to create one standalone object at a transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub transform: Transform,
    pub kind: PlacementKind,
}

/// Receives finished geometry from a generator run.
pub trait GeometrySink {
    /// Whether an instancing prototype is available for `role`.
    fn has_prototype(&self, _role: InstanceRole) -> bool {
        false
    }

    /// Takes ownership of a completed mesh. Called at most once per run.
    fn emit_mesh(&mut self, name: &str, mesh: PlantMesh);

    /// Creates one standalone object. Called once per point or leaf.
    fn place(&mut self, placement: Placement);
}

/// A sink that keeps everything it is given, for headless runs and export.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub meshes: Vec<(String, PlantMesh)>,
    pub placements: Vec<Placement>,
    prototypes: HashSet<InstanceRole>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretends a prototype exists for `role`.
    pub fn with_prototype(mut self, role: InstanceRole) -> Self {
        self.prototypes.insert(role);
        self
    }

    /// Exports every recorded mesh as a single OBJ document.
    pub fn to_obj(&self) -> String {
        crate::export::meshes_to_obj(&self.meshes)
    }
}

impl GeometrySink for RecordingSink {
    fn has_prototype(&self, role: InstanceRole) -> bool {
        self.prototypes.contains(&role)
    }

    fn emit_mesh(&mut self, name: &str, mesh: PlantMesh) {
        self.meshes.push((name.to_string(), mesh));
    }

    fn place(&mut self, placement: Placement) {
        self.placements.push(placement);
    }
}
