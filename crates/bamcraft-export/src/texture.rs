//! Texture slot resolution
//!
//! Turns a source texture slot into a [`TextureStageNode`]: sampler state
//! from the texture settings, a pixel format inferred from the image
//! depth, and an image reference materialized according to the configured
//! texture mode. Stages are cached by (slot name, sort) since the sort
//! value is part of a stage's identity; images are cached by their stable
//! id so a shared image is copied to disk at most once.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bamcraft_core::{Error, ImageId, Result};
use bamcraft_scene::{ImageDef, TexCoords, TextureData, TextureDef, TextureSlot, WrapExtension};
use tracing::warn;

use crate::Resolution;
use crate::graph::{
    FilterType, PixelFormat, SamplerState, TextureRef, TextureStageNode, WrapMode,
};
use crate::paths::{format_extension, relative_to, to_engine_path};
use crate::settings::TextureMode;

/// A materialized image: engine-syntax path plus component count.
/// The pixel format is not part of the handle because it depends on the
/// referencing stage's sRGB flag.
#[derive(Debug)]
struct ImageHandle {
    name: String,
    filename: String,
    num_components: u8,
}

/// Resolves texture slots into texture stages, materializing images on
/// disk when the texture mode asks for it
pub struct TextureResolver {
    mode: TextureMode,
    copy_path: String,
    /// Directory of the exported file; relative image paths are expressed
    /// against it
    output_dir: PathBuf,
    stage_cache: HashMap<(String, u32), Arc<TextureStageNode>>,
    image_cache: HashMap<ImageId, Arc<ImageHandle>>,
}

impl TextureResolver {
    pub fn new(mode: TextureMode, copy_path: &str, output_path: &Path) -> Self {
        let output_dir = output_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            mode,
            copy_path: copy_path.to_string(),
            output_dir,
            stage_cache: HashMap::new(),
            image_cache: HashMap::new(),
        }
    }

    /// Number of distinct stages resolved so far
    pub fn stage_count(&self) -> u64 {
        self.stage_cache.len() as u64
    }

    /// Number of distinct images materialized so far
    pub fn image_count(&self) -> u64 {
        self.image_cache.len() as u64
    }

    /// Resolve one texture slot into a stage.
    ///
    /// Returns `Skipped` for empty slots, none-typed textures, non-UV
    /// coordinate modes and generated textures. Fails when the texture
    /// mode is INCLUDE or KEEP, or when an image cannot be written to
    /// disk.
    pub fn resolve(
        &mut self,
        slot: Option<&TextureSlot>,
        sort: u32,
        use_srgb: bool,
    ) -> Result<Resolution<Arc<TextureStageNode>>> {
        let Some(slot) = slot else {
            return Ok(Resolution::Skipped("empty texture slot"));
        };
        let Some(texture) = &slot.texture else {
            return Ok(Resolution::Skipped("no texture assigned"));
        };
        if matches!(texture.data, TextureData::None) {
            return Ok(Resolution::Skipped("none-typed texture"));
        }

        // Refuse up front, even for slots that would be skipped further
        // down. Silently continuing would produce a file that looks valid
        // but references no textures.
        if matches!(self.mode, TextureMode::Include | TextureMode::Keep) {
            return Err(Error::UnsupportedTextureMode {
                mode: self.mode.as_str().to_string(),
            });
        }

        let cache_key = (slot.name.clone(), sort);
        if let Some(stage) = self.stage_cache.get(&cache_key) {
            return Ok(Resolution::Converted(stage.clone()));
        }

        if slot.texture_coords != TexCoords::Uv {
            warn!(
                slot = %slot.name,
                coords = ?slot.texture_coords,
                "unsupported texture coordinate mode, only UV mapping is supported"
            );
            return Ok(Resolution::Skipped("non-UV texture coordinates"));
        }

        let handle = match &texture.data {
            TextureData::Image { image } => self.image_handle(image)?,
            TextureData::Generated { kind } => {
                warn!(
                    texture = %texture.name,
                    kind = %kind,
                    "generated textures are not supported, skipping"
                );
                return Ok(Resolution::Skipped("generated texture"));
            }
            TextureData::None => unreachable!("none-typed textures are filtered above"),
        };

        let format = pixel_format(handle.num_components, use_srgb, &handle.name);
        let stage = Arc::new(TextureStageNode {
            name: format!("{}-{}", slot.name, sort),
            sort,
            priority: 0,
            sampler: sampler_for(texture),
            uv_scale: slot.scale,
            texture: TextureRef {
                name: handle.name.clone(),
                filename: handle.filename.clone(),
                num_components: handle.num_components,
                format,
            },
        });

        self.stage_cache.insert(cache_key, stage.clone());
        Ok(Resolution::Converted(stage))
    }

    /// Materialize an image according to the texture mode, cached by the
    /// image's stable id
    fn image_handle(&mut self, image: &ImageDef) -> Result<Arc<ImageHandle>> {
        if let Some(handle) = self.image_cache.get(&image.id) {
            return Ok(handle.clone());
        }

        let num_components = match image.depth {
            8 => 1,
            // 16 bits could be one wide or two narrow channels, no case
            24 => 3,
            32 => 4,
            depth => {
                warn!(
                    image = %image.name,
                    depth,
                    "cannot determine component count, assuming 3"
                );
                3
            }
        };

        let filename = match self.mode {
            TextureMode::Absolute => {
                if image.is_packed() {
                    let dest = self.save_image(image)?;
                    to_engine_path(&dest.to_string_lossy())
                } else {
                    to_engine_path(&self.host_path(&image.filepath).to_string_lossy())
                }
            }
            TextureMode::Relative => {
                let source = if image.is_packed() {
                    self.save_image(image)?
                } else {
                    self.host_path(&image.filepath)
                };
                let relative = relative_to(&source, &self.output_dir);
                to_engine_path(&relative.to_string_lossy())
            }
            TextureMode::Copy => {
                let dest = self.save_image(image)?;
                let relative = relative_to(&dest, &self.output_dir);
                to_engine_path(&relative.to_string_lossy())
            }
            TextureMode::Include | TextureMode::Keep => {
                return Err(Error::UnsupportedTextureMode {
                    mode: self.mode.as_str().to_string(),
                });
            }
        };

        let handle = Arc::new(ImageHandle {
            name: image.name.clone(),
            filename,
            num_components,
        });
        self.image_cache.insert(image.id, handle.clone());
        Ok(handle)
    }

    /// Resolve a host-syntax image path to an on-disk location. The `//`
    /// project-relative marker resolves against the output directory.
    fn host_path(&self, filepath: &str) -> PathBuf {
        let normalized = filepath.replace('\\', "/");
        match normalized.strip_prefix("//") {
            Some(rest) => self.output_dir.join(rest),
            None => PathBuf::from(normalized),
        }
    }

    /// Write an image into the texture folder beside the exported file and
    /// return its destination path. On-disk sources are copied, packed
    /// pixel data is encoded through its declared file format.
    fn save_image(&self, image: &ImageDef) -> Result<PathBuf> {
        let source = if image.filepath.is_empty() {
            // Image without a backing file, name it after itself
            PathBuf::from(format!("{}.png", image.name))
        } else {
            self.host_path(&image.filepath)
        };

        let tex_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.png", image.name));
        let mut dest = self.output_dir.join(&self.copy_path).join(tex_name);

        if let Some(target_dir) = dest.parent() {
            if !target_dir.is_dir() {
                fs::create_dir_all(target_dir)?;
            }
        }

        if source.is_file() {
            if dest.is_file() {
                if same_file_stat(&source, &dest) {
                    return Ok(dest);
                }
                fs::remove_file(&dest)?;
            }
            fs::copy(&source, &dest)?;
            return Ok(dest);
        }

        let Some(packed) = &image.packed else {
            return Err(Error::FileNotFound(source));
        };

        // Remap the extension to the declared format before encoding
        let extension = format_extension(&image.file_format).unwrap_or_else(|| {
            warn!(
                image = %image.name,
                format = %image.file_format,
                "unrecognized image file format, falling back to .png"
            );
            ".png"
        });
        dest.set_extension(&extension[1..]);

        let buffer =
            image::RgbaImage::from_raw(packed.width, packed.height, packed.rgba.clone())
                .ok_or_else(|| Error::ImageSave {
                    image: image.name.clone(),
                    message: "packed pixel data does not match the image dimensions".to_string(),
                })?;
        buffer.save(&dest).map_err(|err| Error::ImageSave {
            image: image.name.clone(),
            message: err.to_string(),
        })?;

        Ok(dest)
    }
}

/// Sampler state derived from the texture's filter and wrap settings
fn sampler_for(texture: &TextureDef) -> SamplerState {
    let min_filter = if texture.use_mipmap {
        FilterType::LinearMipmapLinear
    } else if texture.use_interpolation {
        FilterType::Linear
    } else {
        FilterType::Nearest
    };

    let wrap = match texture.extension {
        WrapExtension::Extend => WrapMode::Clamp,
        WrapExtension::Clip | WrapExtension::ClipCube => WrapMode::BorderColor,
        WrapExtension::Repeat | WrapExtension::Checker => WrapMode::Repeat,
    };

    SamplerState {
        min_filter,
        mag_filter: FilterType::Linear,
        wrap_u: wrap,
        wrap_v: wrap,
        wrap_w: wrap,
        anisotropic_degree: 16,
    }
}

/// Pixel format from the component count, sRGB-tagged when requested and
/// the image has enough channels
fn pixel_format(num_components: u8, use_srgb: bool, name: &str) -> PixelFormat {
    if use_srgb {
        match num_components {
            3 => return PixelFormat::Srgb,
            4 => return PixelFormat::SrgbAlpha,
            _ => warn!(
                texture = name,
                num_components, "cannot select an sRGB format below 3 channels"
            ),
        }
    }

    match num_components {
        1 => PixelFormat::Luminance,
        2 => PixelFormat::LuminanceAlpha,
        4 => PixelFormat::Rgba,
        _ => PixelFormat::Rgb,
    }
}

fn same_file_stat(a: &Path, b: &Path) -> bool {
    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(meta_a), Ok(meta_b)) => {
            meta_a.len() == meta_b.len()
                && matches!(
                    (meta_a.modified(), meta_b.modified()),
                    (Ok(time_a), Ok(time_b)) if time_a == time_b
                )
        }
        _ => false,
    }
}
