//! wgpu upload layer.
//!
//! Thin adapters from the crate's CPU-side data to wgpu objects: uniform
//! buffers refreshed once per frame, shader modules from compiled WGSL,
//! textures and the shared material sampler.

use std::borrow::Cow;

use crate::frame::FrameUniforms;
use crate::material::{DistortionUniformData, PbrUniformData};
use crate::resources::{AddressMode, FilterMode, SamplerConfig, TextureData, TextureSet, TextureSlot};
use crate::scene::{CameraUniformData, TransformUniformData};
use crate::shader::{CompiledProgram, ComposerConfig};

/// Entry point name naga gives GLSL `main` functions.
pub const ENTRY_POINT: &str = "main";

/// Descriptor set layout of the standard program.
pub const CAMERA_SET: u32 = 0;
pub const OBJECT_SET: u32 = 1;
pub const MATERIAL_SET: u32 = 2;
/// Binding of the base material block and of the shared sampler within [`MATERIAL_SET`].
pub const MATERIAL_UNIFORM_BINDING: u32 = 0;
pub const SAMPLER_BINDING: u32 = 6;

fn uniform_buffer<T>(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<T>() as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Uniform buffers backing every block the composed program reads.
pub struct MaterialBuffers {
    pub camera: wgpu::Buffer,
    pub object: wgpu::Buffer,
    pub material: wgpu::Buffer,
    pub distortion: wgpu::Buffer,
}

impl MaterialBuffers {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            camera: uniform_buffer::<CameraUniformData>(device, "camera_uniforms"),
            object: uniform_buffer::<TransformUniformData>(device, "object_uniforms"),
            material: uniform_buffer::<PbrUniformData>(device, "material_uniforms"),
            distortion: uniform_buffer::<DistortionUniformData>(device, "distortion_uniforms"),
        }
    }

    /// Copy one frame's payload. Call once per frame, before the draw.
    pub fn upload(&self, queue: &wgpu::Queue, frame: &FrameUniforms) {
        queue.write_buffer(&self.object, 0, bytemuck::bytes_of(&frame.transform));
        queue.write_buffer(&self.material, 0, bytemuck::bytes_of(&frame.material.pbr));
        queue.write_buffer(
            &self.distortion,
            0,
            bytemuck::bytes_of(&frame.material.distortion),
        );
        log::trace!("Uploaded uniforms for frame {}", frame.frame);
    }

    pub fn upload_camera(&self, queue: &wgpu::Queue, camera: &CameraUniformData) {
        queue.write_buffer(&self.camera, 0, bytemuck::bytes_of(camera));
    }
}

/// Vertex and fragment modules of one compiled program.
pub struct ShaderModules {
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
}

pub fn create_shader_modules(
    device: &wgpu::Device,
    label: &str,
    compiled: &CompiledProgram,
) -> ShaderModules {
    let vertex_label = format!("{label}_vertex");
    let fragment_label = format!("{label}_fragment");
    ShaderModules {
        vertex: device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&vertex_label),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(&compiled.vertex_wgsl)),
        }),
        fragment: device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&fragment_label),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(&compiled.fragment_wgsl)),
        }),
    }
}

/// GPU texture with its default view
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

/// Create and upload a texture
pub fn upload_texture(device: &wgpu::Device, queue: &wgpu::Queue, data: &TextureData) -> GpuTexture {
    let size = wgpu::Extent3d {
        width: data.width,
        height: data.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(&data.name),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: data.format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &data.data,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(data.bytes_per_row()),
            rows_per_image: Some(data.height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    GpuTexture { texture, view }
}

/// The uploaded texture set and its sampler.
pub struct GpuTextureSet {
    pub textures: Vec<(TextureSlot, GpuTexture)>,
    pub sampler: wgpu::Sampler,
}

impl GpuTextureSet {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, set: &TextureSet) -> Self {
        let textures = set
            .iter()
            .map(|(slot, data)| (slot, upload_texture(device, queue, data)))
            .collect();
        Self {
            textures,
            sampler: create_sampler(device, set.sampler()),
        }
    }

    pub fn view(&self, slot: TextureSlot) -> Option<&wgpu::TextureView> {
        self.textures
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, texture)| &texture.view)
    }
}

pub fn address_mode(mode: AddressMode) -> wgpu::AddressMode {
    match mode {
        AddressMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        AddressMode::Repeat => wgpu::AddressMode::Repeat,
        AddressMode::MirrorRepeat => wgpu::AddressMode::MirrorRepeat,
    }
}

pub fn filter_mode(mode: FilterMode) -> wgpu::FilterMode {
    match mode {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    }
}

pub fn create_sampler(device: &wgpu::Device, config: &SamplerConfig) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("material_sampler"),
        address_mode_u: address_mode(config.address_mode_u),
        address_mode_v: address_mode(config.address_mode_v),
        mag_filter: filter_mode(config.mag_filter),
        min_filter: filter_mode(config.min_filter),
        mipmap_filter: filter_mode(config.mipmap_filter),
        ..Default::default()
    })
}

fn uniform_entry<T>(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
        },
        count: None,
    }
}

/// Layout entries of the material set.
///
/// The injected distortion block is part of this set when the composer
/// places it in [`MATERIAL_SET`], which is the default.
pub fn material_layout_entries(config: &ComposerConfig) -> Vec<wgpu::BindGroupLayoutEntry> {
    let mut entries = vec![uniform_entry::<PbrUniformData>(MATERIAL_UNIFORM_BINDING)];
    for slot in TextureSlot::ALL {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: slot.binding(),
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        });
    }
    entries.push(wgpu::BindGroupLayoutEntry {
        binding: SAMPLER_BINDING,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    });
    if config.uniform_set == MATERIAL_SET {
        entries.push(distortion_layout_entry(config));
    }
    entries
}

/// Layout entry of the injected distortion block.
pub fn distortion_layout_entry(config: &ComposerConfig) -> wgpu::BindGroupLayoutEntry {
    uniform_entry::<DistortionUniformData>(config.uniform_binding)
}
