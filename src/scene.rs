//! Bevy side of the generators.
//!
//! [`SceneSink`] turns generator output into entities, [`PlantPrototypes`]
//! holds the objects to instance, and [`spawn_phyllotaxis`] /
//! [`spawn_lsystem`] are one-shot systems a UI button can trigger, e.g. with
//! `commands.run_system_cached(spawn_lsystem)`.
//!
//! Generated geometry uses Z as the world vertical. Parent the spawned
//! entities under a rotated root for a Y-up scene.

use bevy::prelude::*;

use crate::geometry::{GeometrySink, InstanceRole, Placement, PlacementKind, PlantMesh};
use crate::params::{LSystemParams, PhyllotaxisParams};
use crate::report::LogReporter;
use crate::{phyllotaxis, turtle};

/// Mesh and material shared by every instance of a prototype.
#[derive(Debug, Clone)]
pub struct Prototype {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

/// Prototypes available for instancing, plus the material for generated meshes.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlantPrototypes {
    pub point: Option<Prototype>,
    pub leaf: Option<Prototype>,
    pub material: Option<Handle<StandardMaterial>>,
}

impl PlantPrototypes {
    pub fn get(&self, role: InstanceRole) -> Option<&Prototype> {
        match role {
            InstanceRole::Point => self.point.as_ref(),
            InstanceRole::Leaf => self.leaf.as_ref(),
        }
    }
}

/// A [`GeometrySink`] spawning entities through [`Commands`].
pub struct SceneSink<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    meshes: &'a mut Assets<Mesh>,
    material: Handle<StandardMaterial>,
    prototypes: &'a PlantPrototypes,
    // All sphere placements of a run share one mesh
    sphere: Option<(f32, u32, Handle<Mesh>)>,
    spawned: Vec<Entity>,
}

impl<'a, 'w, 's> SceneSink<'a, 'w, 's> {
    pub fn new(
        commands: &'a mut Commands<'w, 's>,
        meshes: &'a mut Assets<Mesh>,
        material: Handle<StandardMaterial>,
        prototypes: &'a PlantPrototypes,
    ) -> Self {
        Self {
            commands,
            meshes,
            material,
            prototypes,
            sphere: None,
            spawned: Vec::new(),
        }
    }

    /// Entities spawned so far.
    pub fn spawned(&self) -> &[Entity] {
        &self.spawned
    }

    fn sphere_mesh(&mut self, radius: f32, subdivisions: u32) -> Option<Handle<Mesh>> {
        if let Some((r, s, handle)) = &self.sphere {
            if *r == radius && *s == subdivisions {
                return Some(handle.clone());
            }
        }
        match Sphere::new(radius).mesh().ico(subdivisions) {
            Ok(mesh) => {
                let handle = self.meshes.add(mesh);
                self.sphere = Some((radius, subdivisions, handle.clone()));
                Some(handle)
            }
            Err(err) => {
                warn!("Could not build point sphere: {}", err);
                None
            }
        }
    }
}

impl GeometrySink for SceneSink<'_, '_, '_> {
    fn has_prototype(&self, role: InstanceRole) -> bool {
        self.prototypes.get(role).is_some()
    }

    fn emit_mesh(&mut self, name: &str, mesh: PlantMesh) {
        for part in mesh.to_bevy_meshes() {
            let handle = self.meshes.add(part);
            let entity = self
                .commands
                .spawn((
                    Name::new(name.to_string()),
                    Mesh3d(handle),
                    MeshMaterial3d(self.material.clone()),
                    Transform::default(),
                ))
                .id();
            self.spawned.push(entity);
        }
    }

    fn place(&mut self, placement: Placement) {
        let (name, mesh, material) = match placement.kind {
            PlacementKind::Icosphere {
                radius,
                subdivisions,
            } => {
                let Some(mesh) = self.sphere_mesh(radius, subdivisions) else {
                    return;
                };
                ("VogelPoint", mesh, self.material.clone())
            }
            PlacementKind::Instance(role) => {
                let Some(prototype) = self.prototypes.get(role) else {
                    warn!("No prototype registered for {:?}, placement skipped", role);
                    return;
                };
                let name = match role {
                    InstanceRole::Point => "VogelInstance",
                    InstanceRole::Leaf => "Leaf",
                };
                (name, prototype.mesh.clone(), prototype.material.clone())
            }
        };

        let entity = self
            .commands
            .spawn((
                Name::new(name),
                Mesh3d(mesh),
                MeshMaterial3d(material),
                placement.transform,
            ))
            .id();
        self.spawned.push(entity);
    }
}

fn generated_material(
    prototypes: &PlantPrototypes,
    materials: &mut Assets<StandardMaterial>,
) -> Handle<StandardMaterial> {
    prototypes
        .material
        .clone()
        .unwrap_or_else(|| materials.add(StandardMaterial::default()))
}

/// Generates the configured phyllotaxis field into the scene.
pub fn spawn_phyllotaxis(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    params: Res<PhyllotaxisParams>,
    prototypes: Res<PlantPrototypes>,
) {
    let material = generated_material(&prototypes, &mut materials);
    let mut sink = SceneSink::new(&mut commands, &mut meshes, material, &prototypes);
    if phyllotaxis::generate(&params.validated(), &mut sink, &mut LogReporter).is_ok() {
        debug!("phyllotaxis spawned {} entities", sink.spawned().len());
    }
}

/// Generates the configured L-System plant into the scene.
pub fn spawn_lsystem(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    params: Res<LSystemParams>,
    prototypes: Res<PlantPrototypes>,
) {
    let material = generated_material(&prototypes, &mut materials);
    let mut sink = SceneSink::new(&mut commands, &mut meshes, material, &prototypes);
    if turtle::generate(&params.validated(), &mut sink, &mut LogReporter).is_ok() {
        debug!("L-System spawned {} entities", sink.spawned().len());
    }
}

/// Registers the generator parameter and prototype resources.
pub struct PlantGenPlugin;

impl Plugin for PlantGenPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PhyllotaxisParams>()
            .init_resource::<LSystemParams>()
            .init_resource::<PlantPrototypes>();
    }
}
