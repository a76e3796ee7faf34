//! Texture slot, texture and image data

use bamcraft_core::ImageId;
use serde::{Deserialize, Serialize};

/// One texture slot of a material
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextureSlot {
    /// Slot name; part of the texture-stage cache key
    pub name: String,
    /// UV scale applied to this slot
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
    /// Coordinate mapping mode; only `Uv` is convertible
    #[serde(default)]
    pub texture_coords: TexCoords,
    #[serde(default)]
    pub texture: Option<TextureDef>,
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

/// Texture coordinate mapping mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TexCoords {
    #[default]
    Uv,
    Global,
    Object,
    Reflection,
    Normal,
}

/// A texture resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextureDef {
    pub name: String,
    pub data: TextureData,
    #[serde(default = "default_true")]
    pub use_mipmap: bool,
    #[serde(default = "default_true")]
    pub use_interpolation: bool,
    #[serde(default)]
    pub extension: WrapExtension,
}

fn default_true() -> bool {
    true
}

/// What the texture actually contains
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextureData {
    /// An image-backed texture
    Image { image: ImageDef },
    /// A procedurally generated texture (clouds, noise, voronoi, ...).
    /// These are logged and skipped, never converted.
    Generated { kind: String },
    /// An empty texture datablock
    None,
}

/// Texture extension (wrap) mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WrapExtension {
    Extend,
    Clip,
    ClipCube,
    #[default]
    Repeat,
    Checker,
}

/// An image resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDef {
    /// Stable resource identity; the image cache keys on this
    pub id: ImageId,
    pub name: String,
    /// Host-native file path; may use backslashes, drive letters or the
    /// `//` project-relative marker. Empty for purely in-memory images.
    #[serde(default)]
    pub filepath: String,
    /// Host image format name, e.g. "PNG" or "JPEG"
    #[serde(default = "default_format")]
    pub file_format: String,
    /// Bit depth (8, 24 or 32); drives component-count inference
    #[serde(default = "default_depth")]
    pub depth: u32,
    /// Present when the image is packed into the host file instead of
    /// living on disk
    #[serde(default)]
    pub packed: Option<PackedPixels>,
}

fn default_format() -> String {
    "PNG".into()
}

fn default_depth() -> u32 {
    24
}

impl ImageDef {
    /// Whether the image data is packed in memory rather than on disk
    pub fn is_packed(&self) -> bool {
        self.packed.is_some()
    }
}

/// Raw RGBA pixels of a packed image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackedPixels {
    pub width: u32,
    pub height: u32,
    /// RGBA8, row-major
    pub rgba: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_data_tagging() {
        let json = r#"{ "type": "GENERATED", "kind": "CLOUDS" }"#;
        let data: TextureData = serde_json::from_str(json).unwrap();
        match data {
            TextureData::Generated { kind } => assert_eq!(kind, "CLOUDS"),
            _ => panic!("expected generated texture"),
        }
    }

    #[test]
    fn test_image_defaults() {
        let json = r#"{ "id": 3, "name": "tex" }"#;
        let image: ImageDef = serde_json::from_str(json).unwrap();
        assert_eq!(image.depth, 24);
        assert!(!image.is_packed());
        assert_eq!(image.file_format, "PNG");
    }
}
