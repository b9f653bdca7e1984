//! Texture loading and the five-slot material texture set

use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView};

use super::sampler::SamplerConfig;
use crate::error::ResourceError;

/// Loaded texture data, always RGBA8
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub data: Vec<u8>,
    pub name: String,
}

impl TextureData {
    /// Load texture from file
    pub fn from_file<P: AsRef<Path>>(path: P, format: wgpu::TextureFormat) -> Result<Self, ResourceError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let img = image::open(path).map_err(|source| ResourceError::Decode {
            name: name.clone(),
            source,
        })?;
        Ok(Self::from_image(img, &name, format))
    }

    /// Load texture from encoded bytes
    pub fn from_bytes(bytes: &[u8], name: &str, format: wgpu::TextureFormat) -> Result<Self, ResourceError> {
        let img = image::load_from_memory(bytes).map_err(|source| ResourceError::Decode {
            name: name.to_string(),
            source,
        })?;
        Ok(Self::from_image(img, name, format))
    }

    fn from_image(img: DynamicImage, name: &str, format: wgpu::TextureFormat) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            format,
            data: img.to_rgba8().into_raw(),
            name: name.to_string(),
        }
    }

    /// Create a 1x1 solid color texture
    pub fn solid_color(color: [u8; 4], name: &str, format: wgpu::TextureFormat) -> Self {
        Self {
            width: 1,
            height: 1,
            format,
            data: color.to_vec(),
            name: name.to_string(),
        }
    }

    pub fn white() -> Self {
        Self::solid_color([255, 255, 255, 255], "white", wgpu::TextureFormat::Rgba8UnormSrgb)
    }

    pub fn black() -> Self {
        Self::solid_color([0, 0, 0, 255], "black", wgpu::TextureFormat::Rgba8Unorm)
    }

    /// Flat tangent-space normal, (0, 0, 1) encoded as (128, 128, 255)
    pub fn default_normal() -> Self {
        Self::solid_color([128, 128, 255, 255], "default_normal", wgpu::TextureFormat::Rgba8Unorm)
    }

    /// Bytes per row of the tightly packed pixel data
    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}

/// One of the five material texture slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Color,
    Normal,
    Roughness,
    Metalness,
    Displacement,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 5] = [
        TextureSlot::Color,
        TextureSlot::Normal,
        TextureSlot::Roughness,
        TextureSlot::Metalness,
        TextureSlot::Displacement,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Normal => "normal",
            Self::Roughness => "roughness",
            Self::Metalness => "metalness",
            Self::Displacement => "displacement",
        }
    }

    /// Binding within the material descriptor set of the standard program.
    pub fn binding(self) -> u32 {
        match self {
            Self::Color => 1,
            Self::Normal => 2,
            Self::Roughness => 3,
            Self::Metalness => 4,
            Self::Displacement => 5,
        }
    }

    /// Only albedo is color data; the other maps are sampled linearly.
    pub fn format(self) -> wgpu::TextureFormat {
        match self {
            Self::Color => wgpu::TextureFormat::Rgba8UnormSrgb,
            _ => wgpu::TextureFormat::Rgba8Unorm,
        }
    }

    /// Neutral stand-in used when the slot's image cannot be loaded.
    ///
    /// White leaves roughness and metalness at their uniform values, and a
    /// black displacement map leaves the surface where it is.
    pub fn placeholder(self) -> TextureData {
        match self {
            Self::Color => TextureData::white(),
            Self::Normal => TextureData::default_normal(),
            Self::Roughness | Self::Metalness => {
                TextureData::solid_color([255, 255, 255, 255], self.name(), self.format())
            }
            Self::Displacement => TextureData::black(),
        }
    }
}

/// Image location per slot. `None` means use the placeholder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TexturePaths {
    pub color: Option<PathBuf>,
    pub normal: Option<PathBuf>,
    pub roughness: Option<PathBuf>,
    pub metalness: Option<PathBuf>,
    pub displacement: Option<PathBuf>,
}

impl TexturePaths {
    /// `<dir>/<slot>.jpg` for every slot.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        let path = |slot: TextureSlot| Some(dir.join(format!("{}.jpg", slot.name())));
        Self {
            color: path(TextureSlot::Color),
            normal: path(TextureSlot::Normal),
            roughness: path(TextureSlot::Roughness),
            metalness: path(TextureSlot::Metalness),
            displacement: path(TextureSlot::Displacement),
        }
    }

    pub fn get(&self, slot: TextureSlot) -> Option<&Path> {
        match slot {
            TextureSlot::Color => self.color.as_deref(),
            TextureSlot::Normal => self.normal.as_deref(),
            TextureSlot::Roughness => self.roughness.as_deref(),
            TextureSlot::Metalness => self.metalness.as_deref(),
            TextureSlot::Displacement => self.displacement.as_deref(),
        }
    }
}

/// The five textures of a material plus their shared sampler.
///
/// Immutable after load; share it through `Arc`.
#[derive(Debug, Clone)]
pub struct TextureSet {
    textures: [TextureData; 5],
    sampler: SamplerConfig,
    placeholders: usize,
}

impl TextureSet {
    /// Load every slot, substituting a placeholder for missing or broken images.
    pub fn load(paths: &TexturePaths, sampler: SamplerConfig) -> Self {
        let mut placeholders = 0;
        let textures = TextureSlot::ALL.map(|slot| match paths.get(slot) {
            Some(path) => match TextureData::from_file(path, slot.format()) {
                Ok(texture) => {
                    log::debug!(
                        "Loaded {} texture {}x{} from {}",
                        slot.name(),
                        texture.width,
                        texture.height,
                        path.display()
                    );
                    texture
                }
                Err(err) => {
                    log::warn!("Using placeholder for {} texture: {err}", slot.name());
                    placeholders += 1;
                    slot.placeholder()
                }
            },
            None => {
                placeholders += 1;
                slot.placeholder()
            }
        });

        Self {
            textures,
            sampler,
            placeholders,
        }
    }

    /// A set made only of placeholders.
    pub fn placeholders(sampler: SamplerConfig) -> Self {
        Self::load(&TexturePaths::default(), sampler)
    }

    pub fn get(&self, slot: TextureSlot) -> &TextureData {
        // ALL lists the slots in declaration order.
        &self.textures[slot as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (TextureSlot, &TextureData)> {
        TextureSlot::ALL.into_iter().zip(self.textures.iter())
    }

    pub fn sampler(&self) -> &SamplerConfig {
        &self.sampler
    }

    /// Number of slots that fell back to a placeholder.
    pub fn placeholder_count(&self) -> usize {
        self.placeholders
    }
}
