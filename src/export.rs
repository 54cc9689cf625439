//! OBJ export for generated plant meshes.
//!
//! Pure text conversion with no Bevy system dependencies. Edges are written as
//! `l` records and leaf/tube quads as `f` records, so polyline plants survive
//! the round trip into other tools.

use crate::geometry::PlantMesh;

/// Convert several named meshes into one OBJ document.
///
/// Each mesh becomes its own `o` object; indices keep counting across objects.
/// Returns the OBJ text without header comments, prepend your own.
pub fn meshes_to_obj(meshes: &[(String, PlantMesh)]) -> String {
    let mut combined = String::new();
    let mut vertex_offset = 0u32;

    for (name, mesh) in meshes {
        combined.push_str(&mesh_to_obj(mesh, name, vertex_offset));
        vertex_offset += mesh.vertices.len() as u32;
    }

    combined
}

/// Convert a single [`PlantMesh`] to OBJ text.
///
/// `vertex_offset` is added to every index so several meshes can share one
/// file. Pass `0` for a standalone mesh.
pub fn mesh_to_obj(mesh: &PlantMesh, object_name: &str, vertex_offset: u32) -> String {
    let mut obj = String::new();
    obj.push_str(&format!("o {}\n", object_name));

    for v in &mesh.vertices {
        obj.push_str(&format!("v {} {} {}\n", v.x, v.y, v.z));
    }

    let base = 1 + vertex_offset;
    for [a, b] in &mesh.edges {
        obj.push_str(&format!("l {} {}\n", a + base, b + base));
    }

    for [a, b, c, d] in &mesh.faces {
        obj.push_str(&format!(
            "f {} {} {} {}\n",
            a + base,
            b + base,
            c + base,
            d + base
        ));
    }

    obj
}
