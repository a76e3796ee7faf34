//! Material and shading model data

use bamcraft_core::MaterialId;
use serde::{Deserialize, Serialize};

use crate::texture::TextureSlot;

/// A material resource as authored in the host application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialDef {
    /// Stable resource identity; the render-state cache keys on this
    pub id: MaterialId,
    pub name: String,
    #[serde(default)]
    pub kind: MaterialKind,
    /// Point size used when `kind` is `Halo`
    #[serde(default = "default_halo_size")]
    pub halo_size: f32,

    #[serde(default = "default_white")]
    pub diffuse_color: [f32; 3],
    #[serde(default = "default_one")]
    pub diffuse_intensity: f32,
    #[serde(default = "default_one")]
    pub alpha: f32,
    #[serde(default = "default_white")]
    pub specular_color: [f32; 3],
    #[serde(default = "default_half")]
    pub specular_intensity: f32,
    #[serde(default = "default_one")]
    pub specular_alpha: f32,
    #[serde(default)]
    pub ambient: f32,
    /// Emit factor used by the conventional encoding
    #[serde(default)]
    pub emit: f32,

    #[serde(default)]
    pub game_settings: Option<GameSettings>,
    /// Physically-based shading block; used by the packed encoding
    #[serde(default)]
    pub pbs: Option<PbsProperties>,
    #[serde(default)]
    pub texture_slots: Vec<Option<TextureSlot>>,
}

impl MaterialDef {
    /// A material with the given identity and name and neutral defaults
    pub fn named(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: MaterialId::new(id),
            name: name.into(),
            kind: MaterialKind::Surface,
            halo_size: default_halo_size(),
            diffuse_color: default_white(),
            diffuse_intensity: 1.0,
            alpha: 1.0,
            specular_color: default_white(),
            specular_intensity: 0.5,
            specular_alpha: 1.0,
            ambient: 0.0,
            emit: 0.0,
            game_settings: None,
            pbs: None,
            texture_slots: Vec::new(),
        }
    }
}

fn default_white() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_one() -> f32 {
    1.0
}

fn default_half() -> f32 {
    0.5
}

fn default_halo_size() -> f32 {
    1.0
}

/// Surface type of a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialKind {
    #[default]
    Surface,
    /// Forces wireframe rendering
    Wire,
    /// Forces point/halo rendering
    Halo,
}

/// Game-engine settings block of a material
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSettings {
    #[serde(default = "default_true")]
    pub use_backface_culling: bool,
    #[serde(default)]
    pub alpha_blend: AlphaBlend,
    #[serde(default)]
    pub face_orientation: FaceOrientation,
}

fn default_true() -> bool {
    true
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            use_backface_culling: true,
            alpha_blend: AlphaBlend::Opaque,
            face_orientation: FaceOrientation::Normal,
        }
    }
}

/// Alpha blend mode enumerants of the game settings block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlphaBlend {
    #[default]
    Opaque,
    Add,
    Clip,
    Alpha,
    AlphaAntialiasing,
}

/// Facing mode of the game settings block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FaceOrientation {
    #[default]
    Normal,
    /// Always face the eye point
    Halo,
    /// Rotate around the up axis to face the camera
    Billboard,
}

/// Physically-based shading properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PbsProperties {
    /// Shading model name, e.g. "DEFAULT" or "FOLIAGE"
    #[serde(default = "default_shading_model")]
    pub shading_model: String,
    #[serde(default)]
    pub metallic: bool,
    #[serde(default = "default_half")]
    pub roughness: f32,
    #[serde(default = "default_ior")]
    pub ior: f32,
    #[serde(default = "default_one")]
    pub normal_strength: f32,
    #[serde(default)]
    pub translucency: f32,
    #[serde(default)]
    pub emissive_factor: f32,
}

fn default_shading_model() -> String {
    "DEFAULT".into()
}

fn default_ior() -> f32 {
    1.5
}

impl Default for PbsProperties {
    fn default() -> Self {
        Self {
            shading_model: default_shading_model(),
            metallic: false,
            roughness: 0.5,
            ior: 1.5,
            normal_strength: 1.0,
            translucency: 0.0,
            emissive_factor: 0.0,
        }
    }
}
