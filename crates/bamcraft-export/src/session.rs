//! Export session and scene graph construction
//!
//! One [`ExportSession`] owns every cache of one export run and drives
//! the conversion: armatures first, then each selected object dispatched
//! by kind, with instancing, particle systems, tags and billboard
//! handling applied per object. A failed object decorates the error with
//! its name and aborts the whole export; there is no partial output.

use std::path::Path;

use bamcraft_core::{Error, Result, ResultExt};
use bamcraft_scene::{FaceOrientation, Light, LightKind, ObjectData, SceneObject};
use tracing::{debug, info, warn};

use crate::Resolution;
use crate::geometry::GeometryConverter;
use crate::graph::{BillboardEffect, LightNode, LightNodeKind, LodSwitch, NodeKind, VirtualNode};
use crate::material::MaterialResolver;
use crate::particles;
use crate::settings::ExportSettings;
use crate::skeleton;
use crate::stats::ExportStats;
use crate::texture::TextureResolver;
use crate::transform;

/// Name of the root node every exported object hangs under
const ROOT_NAME: &str = "SceneRoot";

/// State of one export run: settings, all conversion caches and the
/// running statistics. Sessions are not reused across exports; caches key
/// on source identity that is only stable within one run.
pub struct ExportSession {
    settings: ExportSettings,
    geometry: GeometryConverter,
    materials: MaterialResolver,
    textures: TextureResolver,
    stats: ExportStats,
}

impl ExportSession {
    pub fn new(settings: ExportSettings, output_path: &Path) -> Self {
        let textures = TextureResolver::new(
            settings.tex_mode,
            &settings.tex_copy_path,
            output_path,
        );
        Self {
            geometry: GeometryConverter::new(),
            materials: MaterialResolver::new(settings.use_pbs),
            textures,
            stats: ExportStats::default(),
            settings,
        }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Statistics accumulated so far
    pub fn stats(&self) -> &ExportStats {
        &self.stats
    }

    /// Convert the given objects into a scene graph rooted at a single
    /// node. Updates the cache counters in the statistics on success.
    pub fn build(&mut self, objects: &[SceneObject]) -> Result<VirtualNode> {
        let mut root = VirtualNode::plain(ROOT_NAME);

        // Skeletons are built before any mesh so skinned geometry can
        // reference its joints
        for object in objects {
            if let ObjectData::Armature(armature) = &object.data {
                info!(object = %object.name, "building character");
                self.stats.objects += 1;

                let character = skeleton::build_character(armature)
                    .with_context(|| format!("while exporting object '{}'", object.name))?;
                let mut node = VirtualNode::plain(object.name.clone());
                node.transform = Some(transform::object_to_parent(&object.matrix_world));
                node.kind = NodeKind::Character(character);
                root.add_child(node);
            }
        }

        for object in objects {
            if matches!(object.data, ObjectData::Armature(_)) {
                continue;
            }
            let node = self
                .handle_object(object)
                .with_context(|| format!("while exporting object '{}'", object.name))?;
            root.add_child(node);
        }

        self.stats.materials = self.materials.material_count();
        self.stats.texture_stages = self.textures.stage_count();
        self.stats.images = self.textures.image_count();

        Ok(root)
    }

    /// Convert one object into its node, recursing for LOD levels and
    /// instancing groups
    fn handle_object(&mut self, object: &SceneObject) -> Result<VirtualNode> {
        info!(object = %object.name, kind = object.kind_name(), "exporting object");
        self.stats.objects += 1;

        let mut node = if object.lod_levels.is_empty() {
            let mut node = VirtualNode::plain(object.name.clone());
            if let Some(content) = self.handle_object_data(object)? {
                node.add_child(content);
            }
            node
        } else {
            self.handle_lod(object)?
        };

        node.transform = Some(transform::object_to_parent(&object.matrix_world));
        node.tags = object.tags.clone();

        self.check_dupli(object, &mut node)?;

        for system in &object.particle_systems {
            let expanded = particles::expand(
                system,
                &object.matrix_world,
                &mut self.geometry,
                &mut self.materials,
                &mut self.textures,
                &mut self.stats,
            )?;
            if let Resolution::Converted(child) = expanded {
                node.add_child(child);
            }
        }

        self.check_billboard(object, &mut node);

        Ok(node)
    }

    /// Dispatch on the object's datablock. Returns the content child to
    /// attach, or `None` for transform-only objects.
    fn handle_object_data(&mut self, object: &SceneObject) -> Result<Option<VirtualNode>> {
        match &object.data {
            ObjectData::Mesh(mesh) => {
                let node = self.geometry.write_mesh(
                    mesh,
                    &mut self.materials,
                    &mut self.textures,
                    &mut self.stats,
                )?;
                Ok(Some(node))
            }
            ObjectData::Light(light) => {
                let mut node = VirtualNode::plain(object.name.clone());
                node.kind = NodeKind::Light(convert_light(object, light));
                Ok(Some(node))
            }
            ObjectData::Empty | ObjectData::Camera => Ok(None),
            ObjectData::Curve | ObjectData::Font | ObjectData::Lattice => {
                warn!(
                    object = %object.name,
                    kind = object.kind_name(),
                    "object kind not implemented, exporting an empty node"
                );
                Ok(None)
            }
            // Top-level armatures were already handled; one showing up
            // inside a group or LOD level is simply not duplicated
            ObjectData::Armature(_) => {
                debug!(object = %object.name, "armature reference skipped");
                Ok(None)
            }
            ObjectData::Other(kind) => Err(Error::UnsupportedObjectKind {
                object: object.name.clone(),
                kind: kind.clone(),
            }),
        }
    }

    /// Build an LOD-switch node: level *i* is visible from its own
    /// distance up to the next level's distance, the coarsest level out to
    /// infinity
    fn handle_lod(&mut self, object: &SceneObject) -> Result<VirtualNode> {
        let mut levels: Vec<_> = object.lod_levels.iter().collect();
        levels.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let mut switches = Vec::with_capacity(levels.len());
        let mut node = VirtualNode::plain(object.name.clone());

        for (index, level) in levels.iter().enumerate() {
            let far = levels
                .get(index + 1)
                .map_or(f32::INFINITY, |next| next.distance);
            switches.push(LodSwitch {
                near: level.distance,
                far,
            });

            self.stats.objects += 1;
            let content = self
                .handle_object_data(&level.object)?
                .unwrap_or_else(|| VirtualNode::plain(level.object.name.clone()));
            node.add_child(content);
        }

        node.kind = NodeKind::Lod(switches);
        Ok(node)
    }

    /// Expand an instancing group: every group member is converted with
    /// the same placement logic as a top-level object and attached under
    /// the placeholder's node
    fn check_dupli(&mut self, object: &SceneObject, node: &mut VirtualNode) -> Result<()> {
        match &object.dupli {
            bamcraft_scene::Dupli::None => Ok(()),
            bamcraft_scene::Dupli::Group(group) => {
                for member in &group.objects {
                    debug!(
                        object = %member.name,
                        group = %group.name,
                        "exporting instanced object"
                    );
                    let child = self
                        .handle_object(member)
                        .with_context(|| format!("while exporting object '{}'", member.name))?;
                    node.add_child(child);
                }
                Ok(())
            }
            other => {
                warn!(object = %object.name, dupli = ?other, "unsupported dupli type");
                Ok(())
            }
        }
    }

    /// Replace the node transform with the billboard facing transform and
    /// mark the node for runtime re-orientation when the active material
    /// asks for halo or billboard facing
    fn check_billboard(&self, object: &SceneObject, node: &mut VirtualNode) {
        let ObjectData::Mesh(mesh) = &object.data else {
            return;
        };
        let Some(game) = mesh.active_material().and_then(|m| m.game_settings.as_ref()) else {
            return;
        };

        let effect = match game.face_orientation {
            FaceOrientation::Halo => BillboardEffect::PointEye,
            FaceOrientation::Billboard => BillboardEffect::Axis,
            FaceOrientation::Normal => return,
        };

        node.transform = Some(transform::billboard_facing(&object.matrix_world));
        node.effect = Some(effect);
    }
}

/// Convert a light datablock, sizing area lights through the object
/// transform
fn convert_light(object: &SceneObject, light: &Light) -> LightNode {
    let kind = match &light.kind {
        LightKind::Point { radius } => LightNodeKind::Point { radius: *radius },
        LightKind::Sun => LightNodeKind::Directional,
        LightKind::Spot { spot_size, .. } => LightNodeKind::Spot {
            fov: spot_size.to_degrees(),
        },
        LightKind::Area { size } => LightNodeKind::Area {
            size: transform::area_light_size(&object.matrix_world, *size),
        },
    };

    LightNode {
        kind,
        color: light.color,
        energy: light.energy,
    }
}
