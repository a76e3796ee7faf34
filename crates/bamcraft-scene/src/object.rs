//! Scene objects and the scene container

use std::collections::BTreeMap;

use bamcraft_core::Mat4;
use serde::{Deserialize, Serialize};

use crate::armature::Armature;
use crate::light::Light;
use crate::mesh::TriMesh;
use crate::particles::ParticleSystem;

/// A complete scene (or selection) handed to the converter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub name: String,
    pub objects: Vec<SceneObject>,
}

/// One object of the authored scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    /// World transform of the object
    #[serde(default)]
    pub matrix_world: Mat4,
    /// Kind-specific datablock
    pub data: ObjectData,
    /// Game/user tag properties, copied verbatim onto the output node
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Level-of-detail levels; empty for ordinary objects
    #[serde(default)]
    pub lod_levels: Vec<LodLevel>,
    /// Instancing (dupli) configuration
    #[serde(default)]
    pub dupli: Dupli,
    /// Particle systems attached to this object
    #[serde(default)]
    pub particle_systems: Vec<ParticleSystem>,
}

impl SceneObject {
    /// A transform-only object with no datablock
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matrix_world: Mat4::IDENTITY,
            data: ObjectData::Empty,
            tags: BTreeMap::new(),
            lod_levels: Vec::new(),
            dupli: Dupli::None,
            particle_systems: Vec::new(),
        }
    }

    /// Kind name used in diagnostics
    pub fn kind_name(&self) -> &str {
        match &self.data {
            ObjectData::Mesh(_) => "MESH",
            ObjectData::Light(_) => "LIGHT",
            ObjectData::Empty => "EMPTY",
            ObjectData::Camera => "CAMERA",
            ObjectData::Curve => "CURVE",
            ObjectData::Font => "FONT",
            ObjectData::Lattice => "LATTICE",
            ObjectData::Armature(_) => "ARMATURE",
            ObjectData::Other(kind) => kind,
        }
    }
}

/// The datablock attached to a scene object, one variant per object kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectData {
    Mesh(TriMesh),
    Light(Light),
    Empty,
    Camera,
    Curve,
    Font,
    Lattice,
    Armature(Armature),
    /// A kind outside the known enumeration; converting it is a fatal
    /// error naming the object
    Other(String),
}

/// One level-of-detail entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LodLevel {
    /// Distance at which this level becomes visible
    pub distance: f32,
    /// Object providing the level's content
    pub object: Box<SceneObject>,
}

/// Instancing (dupli) configuration of an object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dupli {
    #[default]
    None,
    /// Group instancing; the only supported mode
    Group(DupliGroup),
    Frames,
    Verts,
    Faces,
}

/// A named group of objects repeated by a placeholder object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DupliGroup {
    pub name: String,
    pub objects: Vec<SceneObject>,
}
