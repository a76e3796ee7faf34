//! Particle system expansion
//!
//! Expands a particle system into one transform node per live particle,
//! each instancing the converted geometry of the system's duplicate
//! object. Repeated particle shapes hit the mesh cache, so a system with
//! thousands of particles converts its geometry exactly once.

use bamcraft_core::{Mat4, Result};
use bamcraft_scene::{ObjectData, ParticleRenderType, ParticleSystem};
use tracing::{info, warn};

use crate::Resolution;
use crate::geometry::GeometryConverter;
use crate::graph::VirtualNode;
use crate::material::MaterialResolver;
use crate::stats::ExportStats;
use crate::texture::TextureResolver;
use crate::transform;

/// Expand a particle system into a node holding one child per particle.
///
/// Systems not using object duplication, or without a duplicate object
/// assigned, are skipped with a warning.
pub fn expand(
    system: &ParticleSystem,
    emitter_world: &Mat4,
    geometry: &mut GeometryConverter,
    materials: &mut MaterialResolver,
    textures: &mut TextureResolver,
    stats: &mut ExportStats,
) -> Result<Resolution<VirtualNode>> {
    if system.render_type != ParticleRenderType::Object {
        warn!(
            system = %system.name,
            render_type = ?system.render_type,
            "skipping particle system, only object duplication is supported"
        );
        return Ok(Resolution::Skipped("render type is not object duplication"));
    }

    let Some(duplicate) = &system.dupli_object else {
        warn!(
            system = %system.name,
            "skipping particle system, no duplicate object assigned"
        );
        return Ok(Resolution::Skipped("no duplicate object assigned"));
    };

    let ObjectData::Mesh(mesh) = &duplicate.data else {
        warn!(
            system = %system.name,
            duplicate = %duplicate.name,
            "skipping particle system, duplicate object is not a mesh"
        );
        return Ok(Resolution::Skipped("duplicate object is not a mesh"));
    };

    // Particle transforms of a world-space system have to be pulled back
    // into the emitter's local space
    let emitter_inverse = system
        .use_global_dupli
        .then(|| emitter_world.affine_inverse());

    let mut root = VirtualNode::plain(system.name.clone());

    for (index, particle) in system.particles.iter().enumerate() {
        let mut node = VirtualNode::plain(format!("{}_{}", system.name, index));
        node.transform = Some(transform::particle_to_parent(
            emitter_inverse.as_ref(),
            particle.location,
            particle.rotation,
            particle.size,
        ));
        node.add_child(geometry.write_mesh(mesh, materials, textures, stats)?);
        root.add_child(node);
    }

    info!(
        system = %system.name,
        particles = system.particles.len(),
        "expanded particle system"
    );
    Ok(Resolution::Converted(root))
}
