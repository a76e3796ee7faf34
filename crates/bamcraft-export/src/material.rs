//! Material resolution
//!
//! Turns a material resource into an immutable [`RenderState`]: material
//! constants under either the conventional or the packed physically-based
//! encoding, the resolved texture stage list and any blend/cull/render
//! mode attributes. States are cached by the material's stable id so two
//! objects referencing the same material share one state instance.

use std::collections::HashMap;
use std::sync::Arc;

use bamcraft_core::{MaterialId, Result};
use bamcraft_scene::{AlphaBlend, MaterialDef, MaterialKind, PbsProperties};
use tracing::{debug, warn};

use crate::Resolution;
use crate::graph::{
    MaterialRecord, RenderAttrib, RenderState, StageUvTransform, Transparency,
};
use crate::texture::TextureResolver;

/// Shading model lookup table of the packed encoding. The index of a
/// model in this list is written into the first emission component; the
/// order is part of the output format and must not change.
const SHADING_MODELS: [&str; 7] = [
    "DEFAULT",
    "EMISSIVE",
    "CLEARCOAT",
    "TRANSPARENT_GLASS",
    "SKIN",
    "FOLIAGE",
    "TRANSPARENT_EMISSIVE",
];

/// Texture slots below this index are expected to be pre-filled with
/// placeholder textures; an empty one gets a warning.
const REQUIRED_SLOTS: usize = 4;

/// Resolves materials into shared render states
pub struct MaterialResolver {
    use_pbs: bool,
    cache: HashMap<MaterialId, Arc<RenderState>>,
    default_state: Arc<RenderState>,
}

impl MaterialResolver {
    pub fn new(use_pbs: bool) -> Self {
        Self {
            use_pbs,
            cache: HashMap::new(),
            default_state: Arc::new(RenderState {
                material: neutral_record("default"),
                stages: Vec::new(),
                uv_transforms: Vec::new(),
                attributes: Vec::new(),
            }),
        }
    }

    /// Number of distinct materials resolved so far
    pub fn material_count(&self) -> u64 {
        self.cache.len() as u64
    }

    /// Resolve a material into its render state. `None` yields the shared
    /// default state.
    pub fn resolve(
        &mut self,
        material: Option<&MaterialDef>,
        textures: &mut TextureResolver,
    ) -> Result<Arc<RenderState>> {
        let Some(material) = material else {
            return Ok(self.default_state.clone());
        };

        if let Some(state) = self.cache.get(&material.id) {
            return Ok(state.clone());
        }

        let record = if self.use_pbs {
            encode_pbs(material)
        } else {
            encode_conventional(material)
        };

        let stages = self.resolve_stages(material, textures)?;

        // The per-stage UV transform list is written only when some stage
        // actually scales its coordinates
        let uv_transforms = if stages.iter().any(|s| s.has_uv_transform()) {
            stages
                .iter()
                .map(|s| StageUvTransform {
                    stage: s.name.clone(),
                    scale: s.uv_scale,
                })
                .collect()
        } else {
            Vec::new()
        };

        let state = Arc::new(RenderState {
            material: record,
            stages,
            uv_transforms,
            attributes: material_attributes(material),
        });

        self.cache.insert(material.id, state.clone());
        Ok(state)
    }

    fn resolve_stages(
        &self,
        material: &MaterialDef,
        textures: &mut TextureResolver,
    ) -> Result<Vec<Arc<crate::graph::TextureStageNode>>> {
        let mut stages = Vec::new();

        for idx in missing_required_slots(material) {
            warn!(
                material = %material.name,
                slot = idx,
                "empty required texture slot"
            );
        }

        for (idx, slot) in material.texture_slots.iter().enumerate() {
            let Some(slot) = slot else {
                continue;
            };

            let use_srgb = idx == 0 || srgb_slot_name(&slot.name);
            debug!(
                slot = %slot.name,
                use_srgb,
                "selected color space for texture slot"
            );

            // Sorts are spaced in tens so stages can be inserted later
            // without renumbering
            match textures.resolve(Some(slot), (idx * 10) as u32, use_srgb)? {
                Resolution::Converted(stage) => stages.push(stage),
                Resolution::Skipped(reason) => warn!(
                    material = %material.name,
                    slot = %slot.name,
                    reason,
                    "texture slot not converted"
                ),
            }
        }

        Ok(stages)
    }
}

/// Required slot indices the material leaves unfilled. A slot array
/// shorter than [`REQUIRED_SLOTS`] counts its missing tail entries too.
fn missing_required_slots(material: &MaterialDef) -> Vec<usize> {
    (0..REQUIRED_SLOTS)
        .filter(|&idx| {
            material
                .texture_slots
                .get(idx)
                .and_then(Option::as_ref)
                .is_none()
        })
        .collect()
}

/// Whether a slot name marks a color texture that wants sRGB sampling.
/// The name is lowercased and stripped of whitespace and separators first,
/// so "Base_Color" and "base color" both match.
fn srgb_slot_name(name: &str) -> bool {
    let normalized: String = name
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .collect::<String>()
        .to_lowercase();

    ["diffuse", "albedo", "basecolor"]
        .iter()
        .any(|needle| normalized.contains(needle))
}

/// Neutral gray fallback used when an object has no material assigned
fn neutral_record(name: &str) -> MaterialRecord {
    MaterialRecord {
        name: name.to_string(),
        base_color: [0.7, 0.7, 0.7, 1.0],
        metallic: 0.0,
        roughness: 0.5,
        refractive_index: 1.5,
        ..MaterialRecord::default()
    }
}

/// Conventional encoding: diffuse/ambient/specular/emission copied with
/// intensity factors applied, no compression
fn encode_conventional(material: &MaterialDef) -> MaterialRecord {
    let [dr, dg, db] = material.diffuse_color;
    let [sr, sg, sb] = material.specular_color;
    let di = material.diffuse_intensity;
    let si = material.specular_intensity;

    MaterialRecord {
        diffuse: [dr * di, dg * di, db * di, material.alpha],
        ambient: [material.ambient, material.ambient, material.ambient, 1.0],
        specular: [sr * si, sg * si, sb * si, material.specular_alpha],
        emission: [
            material.emit * dr * di,
            material.emit * dg * di,
            material.emit * db * di,
            1.0,
        ],
        ..neutral_record(&material.name)
    }
}

/// Packed physically-based encoding. The emission slot does not carry a
/// color here: it holds (shading model index, normal strength, auxiliary
/// 0, auxiliary 1) where the auxiliaries depend on the shading model.
fn encode_pbs(material: &MaterialDef) -> MaterialRecord {
    let fallback = PbsProperties::default();
    let pbs = material.pbs.as_ref().unwrap_or(&fallback);

    let model_id = match SHADING_MODELS.iter().position(|m| *m == pbs.shading_model) {
        Some(idx) => idx as f32,
        None => {
            warn!(
                material = %material.name,
                model = %pbs.shading_model,
                "unknown shading model, falling back to DEFAULT"
            );
            0.0
        }
    };

    let [dr, dg, db] = material.diffuse_color;
    let mut record = neutral_record(&material.name);

    match pbs.shading_model.as_str() {
        "EMISSIVE" | "TRANSPARENT_EMISSIVE" => {
            // Emissive surfaces bake their color into the base color and
            // fix the remaining parameters
            let factor = pbs.emissive_factor;
            record.base_color = [dr * factor, dg * factor, db * factor, 1.0];
            record.metallic = 0.0;
            record.roughness = 1.0;
            record.refractive_index = 1.51;

            let aux0 = if pbs.shading_model == "TRANSPARENT_EMISSIVE" {
                material.alpha
            } else {
                0.0
            };
            record.emission = [model_id, 0.0, aux0, 0.0];
        }
        _ => {
            record.base_color = [dr, dg, db, 1.0];
            record.metallic = if pbs.metallic && pbs.shading_model != "SKIN" {
                1.0
            } else {
                0.0
            };
            record.roughness = pbs.roughness;
            record.refractive_index = pbs.ior;

            match pbs.shading_model.as_str() {
                "CLEARCOAT" => {
                    record.metallic = 1.0;
                    record.refractive_index = 1.51;
                }
                "TRANSPARENT_GLASS" => record.metallic = 1.0,
                _ => {}
            }

            let aux0 = match pbs.shading_model.as_str() {
                "FOLIAGE" => pbs.translucency,
                "TRANSPARENT_GLASS" => material.alpha,
                _ => 0.0,
            };
            record.emission = [model_id, pbs.normal_strength, aux0, 0.0];
        }
    }

    record
}

/// Render mode, cull and blend attributes derived from the material kind
/// and its game settings block
fn material_attributes(material: &MaterialDef) -> Vec<RenderAttrib> {
    let mut attributes = Vec::new();

    match material.kind {
        MaterialKind::Wire => attributes.push(RenderAttrib::Wireframe),
        MaterialKind::Halo => attributes.push(RenderAttrib::PointMode {
            thickness: material.halo_size,
            perspective: true,
        }),
        MaterialKind::Surface => {}
    }

    if let Some(game) = &material.game_settings {
        let forced_two_sided = !matches!(material.kind, MaterialKind::Surface);
        if forced_two_sided || !game.use_backface_culling {
            attributes.push(RenderAttrib::CullNone);
        }

        attributes.push(match game.alpha_blend {
            AlphaBlend::Opaque => RenderAttrib::Transparency(Transparency::None),
            AlphaBlend::Add => RenderAttrib::BlendAdd,
            AlphaBlend::Clip => RenderAttrib::Transparency(Transparency::Binary),
            AlphaBlend::Alpha => RenderAttrib::Transparency(Transparency::Alpha),
            AlphaBlend::AlphaAntialiasing => {
                RenderAttrib::Transparency(Transparency::MultisampleMask)
            }
        });
    }

    attributes
}
