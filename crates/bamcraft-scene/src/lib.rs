//! Read-only authoring-scene data model
//!
//! This crate describes what the host 3D-content application hands the
//! converter: objects with transforms and tags, triangulated meshes,
//! materials with texture slots, armatures, lights and particle systems.
//! The converter never mutates any of it.
//!
//! Every type derives serde so a scene can also be loaded from a JSON
//! document, which is how the CLI and the tests drive the pipeline.

pub mod armature;
pub mod light;
pub mod material;
pub mod mesh;
pub mod object;
pub mod particles;
pub mod texture;

pub use armature::{Armature, Bone};
pub use light::{Light, LightKind};
pub use material::{AlphaBlend, FaceOrientation, GameSettings, MaterialDef, MaterialKind, PbsProperties};
pub use mesh::{MeshVertex, TriMesh, Triangle, UvLayer};
pub use object::{Dupli, DupliGroup, LodLevel, ObjectData, Scene, SceneObject};
pub use particles::{Particle, ParticleRenderType, ParticleSystem};
pub use texture::{ImageDef, PackedPixels, TexCoords, TextureData, TextureDef, TextureSlot, WrapExtension};
