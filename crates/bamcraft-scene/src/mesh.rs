//! Triangulated mesh data
//!
//! The host has already triangulated the mesh; every polygon here is a
//! triangle with three corner ("loop") indices into the UV layers.

use bamcraft_core::MeshId;
use serde::{Deserialize, Serialize};

use crate::material::MaterialDef;

/// A triangulated mesh datablock. Two objects may reference the same
/// datablock; `id` is the identity the geometry cache keys on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriMesh {
    /// Stable datablock identity
    pub id: MeshId,
    /// Datablock name
    pub name: String,
    /// All vertices
    pub vertices: Vec<MeshVertex>,
    /// All triangles
    pub polygons: Vec<Triangle>,
    /// UV layers, indexed per corner (loop)
    #[serde(default)]
    pub uv_layers: Vec<UvLayer>,
    /// Index of the active UV layer, if any
    #[serde(default)]
    pub active_uv: Option<usize>,
    /// Material slots; a slot may be empty
    #[serde(default)]
    pub material_slots: Vec<Option<MaterialDef>>,
}

impl TriMesh {
    /// The active UV layer, if one exists. Only one UV channel is
    /// supported; additional layers are ignored.
    pub fn active_uv_layer(&self) -> Option<&UvLayer> {
        self.active_uv.and_then(|idx| self.uv_layers.get(idx))
    }

    /// The material of the first filled slot, if any
    pub fn active_material(&self) -> Option<&MaterialDef> {
        self.material_slots.iter().flatten().next()
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.polygons.len()
    }
}

/// A single mesh vertex
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MeshVertex {
    /// Position in object space
    pub position: [f32; 3],
    /// Averaged per-vertex normal (used for smooth shading)
    pub normal: [f32; 3],
}

/// One triangle of a mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Triangle {
    /// Vertex indices
    pub vertices: [u32; 3],
    /// Corner (loop) indices into the UV layers
    pub loops: [u32; 3],
    /// Face normal (used for flat shading)
    pub normal: [f32; 3],
    /// Material slot index
    #[serde(default)]
    pub material_index: usize,
    /// Whether the polygon uses smooth shading
    #[serde(default)]
    pub use_smooth: bool,
}

/// One UV layer, with one coordinate pair per corner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UvLayer {
    pub name: String,
    /// UV coordinates indexed by loop index
    pub uvs: Vec<[f32; 2]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_mesh() -> TriMesh {
        TriMesh {
            id: MeshId::new(1),
            name: "test".into(),
            vertices: vec![
                MeshVertex { position: [0.0, 0.0, 0.0], normal: [0.0, 0.0, 1.0] },
                MeshVertex { position: [1.0, 0.0, 0.0], normal: [0.0, 0.0, 1.0] },
                MeshVertex { position: [0.0, 1.0, 0.0], normal: [0.0, 0.0, 1.0] },
            ],
            polygons: vec![Triangle {
                vertices: [0, 1, 2],
                loops: [0, 1, 2],
                normal: [0.0, 0.0, 1.0],
                material_index: 0,
                use_smooth: false,
            }],
            uv_layers: vec![UvLayer {
                name: "UVMap".into(),
                uvs: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            }],
            active_uv: Some(0),
            material_slots: Vec::new(),
        }
    }

    #[test]
    fn test_active_uv_layer() {
        let mesh = make_test_mesh();
        assert_eq!(mesh.active_uv_layer().map(|l| l.name.as_str()), Some("UVMap"));

        let mut no_uv = make_test_mesh();
        no_uv.active_uv = None;
        assert!(no_uv.active_uv_layer().is_none());
    }

    #[test]
    fn test_active_material_skips_empty_slots() {
        let mut mesh = make_test_mesh();
        assert!(mesh.active_material().is_none());

        mesh.material_slots = vec![None, Some(MaterialDef::named(5, "Mat"))];
        assert_eq!(mesh.active_material().map(|m| m.name.as_str()), Some("Mat"));
    }
}
