//! Virtual scene graph output types
//!
//! The immutable node graph the converter builds and hands to the binary
//! container writer. Nodes form a tree: a node is owned by exactly one
//! parent. Heavy data (primitives, render states, texture stages) is
//! shared through `Arc` instead of sharing nodes.

use std::collections::BTreeMap;
use std::sync::Arc;

use bamcraft_core::{Mat4, Result, Vec2};
use serde::Serialize;

use crate::settings::BamVersion;

/// One node of the output graph
#[derive(Debug, Clone, Serialize)]
pub struct VirtualNode {
    pub name: String,
    /// Local transform; `None` means identity
    pub transform: Option<Mat4>,
    /// Game/user tags copied from the source object
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    /// Runtime re-orientation marker set by the billboard override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<BillboardEffect>,
    pub kind: NodeKind,
    pub children: Vec<VirtualNode>,
}

impl VirtualNode {
    /// A plain node with no transform and no content
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: None,
            tags: BTreeMap::new(),
            effect: None,
            kind: NodeKind::Plain,
            children: Vec::new(),
        }
    }

    /// A geometry node holding primitive/state pairs
    pub fn geometry(name: impl Into<String>, geoms: Vec<Geom>) -> Self {
        Self {
            kind: NodeKind::Geometry(geoms),
            ..Self::plain(name)
        }
    }

    pub fn add_child(&mut self, child: VirtualNode) {
        self.children.push(child);
    }

    /// Total node count of this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(VirtualNode::node_count).sum::<usize>()
    }

    /// Depth-first search for a node by name
    pub fn find(&self, name: &str) -> Option<&VirtualNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }
}

/// Node content variants
#[derive(Debug, Clone, Serialize)]
pub enum NodeKind {
    /// Transform/grouping only
    Plain,
    /// Holds draw primitives with their render states
    Geometry(Vec<Geom>),
    Light(LightNode),
    /// Distance-switched children; `switches[i]` covers `children[i]`
    Lod(Vec<LodSwitch>),
    /// A flattened armature
    Character(Character),
}

/// One primitive/state pair of a geometry node
#[derive(Debug, Clone, Serialize)]
pub struct Geom {
    pub primitive: Arc<Primitive>,
    pub state: Arc<RenderState>,
}

/// Visibility interval of one LOD level: visible in `[near, far)`,
/// `far` is infinite for the coarsest level
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LodSwitch {
    pub near: f32,
    pub far: f32,
}

/// An immutable draw primitive: interleaved vertex data plus indices
#[derive(Debug, Serialize)]
pub struct Primitive {
    pub format: VertexFormat,
    /// Interleaved vertex attributes
    pub vertices: Vec<f32>,
    pub indices: IndexBuffer,
    pub num_triangles: u32,
}

impl Primitive {
    /// Number of vertices in the buffer
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.format.floats_per_vertex()
    }
}

/// Vertex attribute layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VertexFormat {
    /// Position + normal
    V3n3,
    /// Position + normal + texcoord
    V3n3t2,
}

impl VertexFormat {
    pub fn floats_per_vertex(&self) -> usize {
        match self {
            VertexFormat::V3n3 => 6,
            VertexFormat::V3n3t2 => 8,
        }
    }
}

/// Index buffer, 16- or 32-bit depending on vertex count
#[derive(Debug, Serialize)]
pub enum IndexBuffer {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexBuffer {
    pub fn len(&self) -> usize {
        match self {
            IndexBuffer::U16(v) => v.len(),
            IndexBuffer::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append one vertex index
    pub fn push(&mut self, index: u32) {
        match self {
            IndexBuffer::U16(v) => v.push(index as u16),
            IndexBuffer::U32(v) => v.push(index),
        }
    }
}

/// Immutable render state of one primitive: material constants, texture
/// stages and auxiliary attributes. Shared between every primitive that
/// references the same material.
#[derive(Debug, Clone, Serialize)]
pub struct RenderState {
    pub material: MaterialRecord,
    pub stages: Vec<Arc<TextureStageNode>>,
    /// Per-stage UV transforms; present only when some stage has a
    /// non-unit scale
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub uv_transforms: Vec<StageUvTransform>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<RenderAttrib>,
}

/// Material constants written into the container's material record.
///
/// Under the packed physically-based encoding the `emission` slot does
/// not hold a color: it carries (shading-model index, normal-map
/// strength, auxiliary 0, auxiliary 1).
#[derive(Debug, Clone, Default, Serialize)]
pub struct MaterialRecord {
    pub name: String,
    pub diffuse: [f32; 4],
    pub ambient: [f32; 4],
    pub specular: [f32; 4],
    pub emission: [f32; 4],
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub refractive_index: f32,
}

/// UV transform of one stage, scale only
#[derive(Debug, Clone, Serialize)]
pub struct StageUvTransform {
    /// Stage name this transform applies to
    pub stage: String,
    pub scale: [f32; 3],
}

/// Auxiliary render attributes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum RenderAttrib {
    /// Force wireframe rendering
    Wireframe,
    /// Force point rendering with the given screen thickness
    PointMode { thickness: f32, perspective: bool },
    /// Disable back-face culling
    CullNone,
    Transparency(Transparency),
    /// Additive color blending
    BlendAdd,
}

/// Transparency modes of the target engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Transparency {
    None,
    /// Alpha-tested
    Binary,
    Alpha,
    MultisampleMask,
}

/// One texture binding slot within a render state
#[derive(Debug, Clone, Serialize)]
pub struct TextureStageNode {
    /// Stage name, derived from the slot name and sort
    pub name: String,
    /// Stage ordering; spaced in tens so stages can be inserted later
    pub sort: u32,
    pub priority: i32,
    pub sampler: SamplerState,
    pub uv_scale: [f32; 3],
    pub texture: TextureRef,
}

impl TextureStageNode {
    /// Whether this stage carries a non-unit UV scale
    pub fn has_uv_transform(&self) -> bool {
        self.uv_scale != [1.0, 1.0, 1.0]
    }
}

/// Sampler parameters of a texture stage
#[derive(Debug, Clone, Serialize)]
pub struct SamplerState {
    pub min_filter: FilterType,
    pub mag_filter: FilterType,
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
    pub wrap_w: WrapMode,
    pub anisotropic_degree: u8,
}

impl Default for SamplerState {
    fn default() -> Self {
        Self {
            min_filter: FilterType::Linear,
            mag_filter: FilterType::Linear,
            wrap_u: WrapMode::Repeat,
            wrap_v: WrapMode::Repeat,
            wrap_w: WrapMode::Repeat,
            anisotropic_degree: 16,
        }
    }
}

/// Texture filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FilterType {
    Nearest,
    Linear,
    LinearMipmapLinear,
}

/// Texture wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WrapMode {
    Clamp,
    BorderColor,
    Repeat,
}

/// A resolved texture reference
#[derive(Debug, Clone, Serialize)]
pub struct TextureRef {
    pub name: String,
    /// Engine-syntax path to the image
    pub filename: String,
    pub num_components: u8,
    pub format: PixelFormat,
}

/// Pixel formats of the target engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PixelFormat {
    Luminance,
    LuminanceAlpha,
    Rgb,
    Rgba,
    Srgb,
    SrgbAlpha,
}

/// A light node's payload
#[derive(Debug, Clone, Serialize)]
pub struct LightNode {
    pub kind: LightNodeKind,
    pub color: [f32; 3],
    pub energy: f32,
}

/// Kind-specific converted light parameters
#[derive(Debug, Clone, Serialize)]
pub enum LightNodeKind {
    Point { radius: f32 },
    Directional,
    Spot { fov: f32 },
    Area { size: Vec2 },
}

/// One joint of a flattened skeleton
#[derive(Debug, Clone, Serialize)]
pub struct JointNode {
    pub name: String,
    /// Bind transform relative to the parent joint
    pub transform: Mat4,
    /// Inverse of the full bind-to-root transform, used by skinning
    pub inverse_bind: Mat4,
    pub children: Vec<JointNode>,
}

impl JointNode {
    /// Depth-first search for a joint by name
    pub fn find(&self, name: &str) -> Option<&JointNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }
}

/// A named joint tree built from one armature
#[derive(Debug, Clone, Serialize)]
pub struct Character {
    pub name: String,
    /// Root joints of the hierarchy
    pub joints: Vec<JointNode>,
}

/// Marker attached to billboard/halo nodes so the engine re-orients them
/// toward the camera at runtime instead of baking a fixed rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BillboardEffect {
    /// Fully face the eye point
    PointEye,
    /// Rotate around the up axis only
    Axis,
}

/// Output boundary: consumes a finished scene root. The binary container
/// writer implements this outside the conversion core.
pub trait GraphSink {
    /// Write the graph rooted at `root` using the given container version
    fn write_graph(&mut self, root: &VirtualNode, version: BamVersion) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_count_and_find() {
        let mut root = VirtualNode::plain("root");
        let mut a = VirtualNode::plain("a");
        a.add_child(VirtualNode::plain("leaf"));
        root.add_child(a);
        root.add_child(VirtualNode::plain("b"));

        assert_eq!(root.node_count(), 4);
        assert!(root.find("leaf").is_some());
        assert!(root.find("missing").is_none());
    }

    #[test]
    fn test_vertex_count() {
        let primitive = Primitive {
            format: VertexFormat::V3n3t2,
            vertices: vec![0.0; 24],
            indices: IndexBuffer::U16(vec![0, 1, 2]),
            num_triangles: 1,
        };
        assert_eq!(primitive.vertex_count(), 3);
    }

    #[test]
    fn test_index_buffer_push() {
        let mut indices = IndexBuffer::U16(Vec::new());
        indices.push(7);
        assert_eq!(indices.len(), 1);

        let mut wide = IndexBuffer::U32(Vec::new());
        wide.push(70000);
        assert_eq!(wide.len(), 1);
    }

    #[test]
    fn test_stage_uv_transform_detection() {
        let mut stage = TextureStageNode {
            name: "s".into(),
            sort: 0,
            priority: 0,
            sampler: SamplerState::default(),
            uv_scale: [1.0, 1.0, 1.0],
            texture: TextureRef {
                name: "t".into(),
                filename: "./tex/t.png".into(),
                num_components: 3,
                format: PixelFormat::Rgb,
            },
        };
        assert!(!stage.has_uv_transform());

        stage.uv_scale = [2.0, 2.0, 1.0];
        assert!(stage.has_uv_transform());
    }
}
