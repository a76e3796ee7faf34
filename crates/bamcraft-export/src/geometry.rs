//! Mesh to primitive conversion
//!
//! Partitions a triangulated mesh by material slot and builds one draw
//! primitive per non-empty bucket, welding vertices as it goes. Results
//! are cached by the mesh datablock id, so two objects instancing the
//! same mesh share one primitive set.

use std::collections::HashMap;
use std::sync::Arc;

use bamcraft_core::{MeshId, Result};
use bamcraft_scene::{TriMesh, Triangle};
use tracing::warn;

use crate::graph::{Geom, IndexBuffer, Primitive, VertexFormat, VirtualNode};
use crate::material::MaterialResolver;
use crate::stats::ExportStats;
use crate::texture::TextureResolver;

/// Index buffers switch to 32 bits once the worst-case vertex count of a
/// bucket no longer fits 16 bits
const MAX_16BIT_VERTICES: usize = 65_535;

/// Tolerance for the approximate UV comparison key
const UV_TOLERANCE: f32 = 1e-4;

/// Collapse a UV pair into one comparison key. Cheap approximate
/// equality, good enough for seam detection; swap this out for an exact
/// pair comparison if it ever misclassifies.
fn uv_key(uv: [f32; 2]) -> f32 {
    uv[0] * 10_000.0 + uv[1]
}

/// Converts meshes into geometry nodes, cached by mesh identity
pub struct GeometryConverter {
    cache: HashMap<MeshId, Vec<Geom>>,
}

impl GeometryConverter {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Convert a mesh into a geometry node holding one primitive per
    /// material bucket. Statistics are only updated on a cache miss since
    /// a cached mesh costs no further conversion work.
    pub fn write_mesh(
        &mut self,
        mesh: &TriMesh,
        materials: &mut MaterialResolver,
        textures: &mut TextureResolver,
        stats: &mut ExportStats,
    ) -> Result<VirtualNode> {
        if let Some(geoms) = self.cache.get(&mesh.id) {
            return Ok(VirtualNode::geometry(mesh.name.clone(), geoms.clone()));
        }

        let buckets = group_by_material(mesh);
        let uvs = mesh.active_uv_layer().map(|layer| layer.uvs.as_slice());
        let mut geoms = Vec::new();

        for (index, bucket) in buckets.iter().enumerate() {
            // A slot no polygon references produces no primitive
            if bucket.is_empty() {
                continue;
            }

            let (primitive, welded) = build_primitive(mesh, bucket, uvs);
            stats.vertices += welded.vertices;
            stats.triangles += bucket.len() as u64;
            stats.duplicated_vertices += welded.duplicated;
            stats.geoms += 1;

            let slot = mesh.material_slots.get(index).and_then(Option::as_ref);
            let state = materials.resolve(slot, textures)?;

            geoms.push(Geom {
                primitive: Arc::new(primitive),
                state,
            });
        }

        self.cache.insert(mesh.id, geoms.clone());
        Ok(VirtualNode::geometry(mesh.name.clone(), geoms))
    }
}

impl Default for GeometryConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Partition triangles into buckets by material slot index. There is
/// always at least one bucket so material-less meshes still export.
fn group_by_material(mesh: &TriMesh) -> Vec<Vec<&Triangle>> {
    let mut buckets: Vec<Vec<&Triangle>> = Vec::new();
    buckets.resize_with(mesh.material_slots.len().max(1), Vec::new);

    for triangle in &mesh.polygons {
        if triangle.material_index >= buckets.len() {
            buckets.resize_with(triangle.material_index + 1, Vec::new);
        }
        buckets[triangle.material_index].push(triangle);
    }

    buckets
}

struct WeldCounters {
    vertices: u64,
    duplicated: u64,
}

/// Build one primitive from a bucket of triangles, welding vertices.
///
/// A corner reuses a previously emitted vertex only when its polygon is
/// smooth shaded and, if UVs are present, the previously emitted UV for
/// that source vertex matches within tolerance. Flat shaded polygons
/// always emit fresh vertices since they carry the face normal.
fn build_primitive(
    mesh: &TriMesh,
    bucket: &[&Triangle],
    uvs: Option<&[[f32; 2]]>,
) -> (Primitive, WeldCounters) {
    // Worst case every corner becomes its own vertex; sized up front so
    // no second welding pass is needed to pick the index width
    let max_vertex_count = bucket.len() * 3;
    let use_32bit = max_vertex_count > MAX_16BIT_VERTICES;
    if use_32bit {
        warn!(
            mesh = %mesh.name,
            triangles = bucket.len(),
            "using 32 bit indices for large geometry, consider splitting it"
        );
    }

    let format = if uvs.is_some() {
        VertexFormat::V3n3t2
    } else {
        VertexFormat::V3n3
    };

    let mut vertex_buffer: Vec<f32> =
        Vec::with_capacity(max_vertex_count * format.floats_per_vertex());
    let mut indices = if use_32bit {
        IndexBuffer::U32(Vec::with_capacity(max_vertex_count))
    } else {
        IndexBuffer::U16(Vec::with_capacity(max_vertex_count))
    };

    // Last emitted output index and UV key per source vertex
    let mut vertex_mappings: Vec<Option<u32>> = vec![None; mesh.vertices.len()];
    let mut vertex_uvs: Vec<f32> = vec![0.0; mesh.vertices.len()];

    let mut emitted: u32 = 0;
    let mut duplicated: u64 = 0;

    for triangle in bucket {
        for corner in 0..3 {
            let vertex_index = triangle.vertices[corner] as usize;
            let corner_uv = uvs.map(|layer| layer[triangle.loops[corner] as usize]);

            if triangle.use_smooth {
                if let Some(known) = vertex_mappings[vertex_index] {
                    let mut can_reuse = true;

                    if let Some(uv) = corner_uv {
                        if (vertex_uvs[vertex_index] - uv_key(uv)).abs() > UV_TOLERANCE {
                            // Most likely a UV seam, the vertex has to be
                            // duplicated
                            can_reuse = false;
                            duplicated += 1;
                        }
                    }

                    if can_reuse {
                        indices.push(known);
                        continue;
                    }
                }
            }

            let vertex = &mesh.vertices[vertex_index];
            vertex_buffer.extend_from_slice(&vertex.position);

            // Smooth polygons take the averaged vertex normal, flat ones
            // the face normal
            if triangle.use_smooth {
                vertex_buffer.extend_from_slice(&vertex.normal);
            } else {
                vertex_buffer.extend_from_slice(&triangle.normal);
            }

            if let Some(uv) = corner_uv {
                vertex_buffer.extend_from_slice(&uv);
                vertex_uvs[vertex_index] = uv_key(uv);
            }

            indices.push(emitted);
            vertex_mappings[vertex_index] = Some(emitted);
            emitted += 1;
        }
    }

    let primitive = Primitive {
        format,
        vertices: vertex_buffer,
        indices,
        num_triangles: bucket.len() as u32,
    };
    let counters = WeldCounters {
        vertices: u64::from(emitted),
        duplicated,
    };

    (primitive, counters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TextureMode;
    use bamcraft_scene::{MeshVertex, UvLayer};
    use std::path::Path;

    fn resolvers() -> (MaterialResolver, TextureResolver) {
        (
            MaterialResolver::new(true),
            TextureResolver::new(TextureMode::Absolute, "tex", Path::new("out.bam")),
        )
    }

    fn flat_triangle(vertices: [u32; 3], loops: [u32; 3]) -> Triangle {
        Triangle {
            vertices,
            loops,
            normal: [0.0, 0.0, 1.0],
            material_index: 0,
            use_smooth: false,
        }
    }

    fn quad_mesh() -> TriMesh {
        let vertex = |x: f32, y: f32| MeshVertex {
            position: [x, y, 0.0],
            normal: [0.0, 0.0, 1.0],
        };
        TriMesh {
            id: MeshId::new(1),
            name: "quad".into(),
            vertices: vec![
                vertex(0.0, 0.0),
                vertex(1.0, 0.0),
                vertex(1.0, 1.0),
                vertex(0.0, 1.0),
            ],
            polygons: vec![
                Triangle {
                    use_smooth: true,
                    ..flat_triangle([0, 1, 2], [0, 1, 2])
                },
                Triangle {
                    use_smooth: true,
                    ..flat_triangle([0, 2, 3], [3, 4, 5])
                },
            ],
            uv_layers: Vec::new(),
            active_uv: None,
            material_slots: Vec::new(),
        }
    }

    #[test]
    fn test_mesh_cache_returns_same_primitives() {
        let (mut materials, mut textures) = resolvers();
        let mut converter = GeometryConverter::new();
        let mesh = quad_mesh();
        let mut stats = ExportStats::default();

        let first = converter
            .write_mesh(&mesh, &mut materials, &mut textures, &mut stats)
            .unwrap();
        let second = converter
            .write_mesh(&mesh, &mut materials, &mut textures, &mut stats)
            .unwrap();

        let (Some(a), Some(b)) = (geoms(&first), geoms(&second)) else {
            panic!("expected geometry nodes");
        };
        assert!(Arc::ptr_eq(&a[0].primitive, &b[0].primitive));
        // The cache hit must not inflate the counters
        assert_eq!(stats.geoms, 1);
        assert_eq!(stats.triangles, 2);
    }

    fn geoms(node: &VirtualNode) -> Option<&Vec<Geom>> {
        match &node.kind {
            crate::graph::NodeKind::Geometry(geoms) => Some(geoms),
            _ => None,
        }
    }

    #[test]
    fn test_smooth_welding_shares_vertices() {
        let mesh = quad_mesh();
        let bucket: Vec<&Triangle> = mesh.polygons.iter().collect();
        let (primitive, welded) = build_primitive(&mesh, &bucket, None);

        // Four distinct vertices for two smooth triangles sharing an edge
        assert_eq!(welded.vertices, 4);
        assert_eq!(welded.duplicated, 0);
        assert_eq!(primitive.indices.len(), 6);
        assert_eq!(primitive.format, VertexFormat::V3n3);
    }

    #[test]
    fn test_flat_shading_never_welds() {
        let mut mesh = quad_mesh();
        for polygon in &mut mesh.polygons {
            polygon.use_smooth = false;
        }
        let bucket: Vec<&Triangle> = mesh.polygons.iter().collect();
        let (_, welded) = build_primitive(&mesh, &bucket, None);
        assert_eq!(welded.vertices, 6);
    }

    #[test]
    fn test_uv_seam_duplicates_vertex() {
        let mut mesh = quad_mesh();
        mesh.uv_layers = vec![UvLayer {
            name: "UVMap".into(),
            // Corner 3 re-visits source vertex 0 with a different UV;
            // corner 4 re-visits vertex 2 with a matching one
            uvs: vec![
                [0.0, 0.0],
                [1.0, 0.0],
                [1.0, 1.0],
                [0.5, 0.5],
                [1.0, 1.0],
                [0.0, 1.0],
            ],
        }];
        mesh.active_uv = Some(0);

        let bucket: Vec<&Triangle> = mesh.polygons.iter().collect();
        let uvs = mesh.active_uv_layer().map(|layer| layer.uvs.as_slice());
        let (primitive, welded) = build_primitive(&mesh, &bucket, uvs);

        assert_eq!(welded.duplicated, 1);
        assert_eq!(welded.vertices, 5);
        assert_eq!(primitive.format, VertexFormat::V3n3t2);
    }

    #[test]
    fn test_index_width_threshold() {
        // 21,845 triangles are the last count whose worst case still fits
        // 16 bit indices; one more flips the bucket to 32 bit
        let mut mesh = quad_mesh();
        mesh.polygons = (0..21_845)
            .map(|_| flat_triangle([0, 1, 2], [0, 1, 2]))
            .collect();

        let bucket: Vec<&Triangle> = mesh.polygons.iter().collect();
        let (primitive, _) = build_primitive(&mesh, &bucket, None);
        assert!(matches!(primitive.indices, IndexBuffer::U16(_)));

        mesh.polygons.push(flat_triangle([0, 1, 2], [0, 1, 2]));
        let bucket: Vec<&Triangle> = mesh.polygons.iter().collect();
        let (primitive, _) = build_primitive(&mesh, &bucket, None);
        assert!(matches!(primitive.indices, IndexBuffer::U32(_)));
    }

    #[test]
    fn test_material_less_mesh_exports_one_bucket() {
        let (mut materials, mut textures) = resolvers();
        let mut converter = GeometryConverter::new();
        let mesh = quad_mesh();
        let mut stats = ExportStats::default();

        let node = converter
            .write_mesh(&mesh, &mut materials, &mut textures, &mut stats)
            .unwrap();
        assert_eq!(geoms(&node).map(Vec::len), Some(1));
    }

    #[test]
    fn test_unreferenced_slot_produces_no_primitive() {
        let (mut materials, mut textures) = resolvers();
        let mut converter = GeometryConverter::new();
        let mut mesh = quad_mesh();
        mesh.material_slots = vec![None, None];

        let mut stats = ExportStats::default();
        let node = converter
            .write_mesh(&mesh, &mut materials, &mut textures, &mut stats)
            .unwrap();
        // All triangles sit in slot 0, slot 1 stays empty
        assert_eq!(geoms(&node).map(Vec::len), Some(1));
        assert_eq!(stats.geoms, 1);
    }
}
