//! Particle system source data

use bamcraft_core::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::object::SceneObject;

/// A particle system attached to an object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleSystem {
    pub name: String,
    #[serde(default)]
    pub render_type: ParticleRenderType,
    /// The object each live particle instances. Required for conversion.
    #[serde(default)]
    pub dupli_object: Option<Box<SceneObject>>,
    /// Whether particle transforms are expressed in world space and must
    /// be pulled back into the emitter's local space
    #[serde(default)]
    pub use_global_dupli: bool,
    #[serde(default)]
    pub particles: Vec<Particle>,
}

/// How the host renders the particle system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticleRenderType {
    #[default]
    Halo,
    Line,
    Path,
    /// Object duplication; the only mode the converter supports
    Object,
    None,
}

/// State of one live particle
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Particle {
    pub location: Vec3,
    /// Orientation quaternion (x, y, z, w)
    #[serde(default = "identity_quat")]
    pub rotation: Vec4,
    #[serde(default = "default_size")]
    pub size: f32,
}

fn identity_quat() -> Vec4 {
    Vec4::IDENTITY
}

fn default_size() -> f32 {
    1.0
}
