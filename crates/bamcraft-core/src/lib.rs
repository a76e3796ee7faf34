//! Core types shared across the bamcraft crates
//!
//! Provides the unified error type, stable resource identifiers and the
//! small amount of linear algebra the conversion pipeline needs.

pub mod error;
pub mod ids;
pub mod math;

pub use error::{Error, Result, ResultExt};
pub use ids::{ImageId, MaterialId, MeshId};
pub use math::{Mat4, Vec2, Vec3, Vec4};
