//! Material state: the authoritative uniform values of one distorted material.
//!
//! [`MaterialState`] is a plain owned struct. Setters never validate; the
//! renderer copies [`MaterialState::uniforms`] into GPU buffers once per frame.

mod color;
mod uniforms;

pub use color::Color;
pub use uniforms::{
    DistortionUniformData, MaterialUniforms, PbrUniformData, UniformDescriptor, UniformDomain,
    UniformGroup, UniformKind, UniformLayout, UniformTable, UniformValue, DISTORTION_UNIFORMS,
};

use std::sync::Arc;

use glam::Vec2;

use crate::error::UniformError;
use crate::resources::TextureSet;

/// Base color of the default material (`#dba80f`).
pub fn default_base_color() -> Color {
    Color::from_rgb8(0xdb, 0xa8, 0x0f)
}

/// Uniform values of one material instance.
#[derive(Debug, Clone)]
pub struct MaterialState {
    time: f32,
    radius: f32,
    distort_speed: f32,
    distort_freq: f32,
    distort_amplitude: f32,
    threshold: f32,
    base_color: Color,
    metalness: f32,
    roughness: f32,
    displacement_scale: f32,
    displacement_bias: f32,
    uv_repeat: Vec2,
    textures: Option<Arc<TextureSet>>,
}

impl Default for MaterialState {
    fn default() -> Self {
        Self {
            time: 0.0,
            radius: 0.0,
            distort_speed: 1.0,
            distort_freq: 1.0,
            distort_amplitude: 1.0,
            threshold: 0.3,
            base_color: default_base_color(),
            metalness: 0.9,
            roughness: 0.5,
            displacement_scale: 1.0,
            displacement_bias: 0.0,
            uv_repeat: Vec2::splat(4.0),
            textures: None,
        }
    }
}

macro_rules! float_accessors {
    ($($field:ident, $setter:ident;)*) => {
        $(
            pub fn $field(&self) -> f32 {
                self.$field
            }

            pub fn $setter(&mut self, value: f32) {
                self.$field = value;
            }
        )*
    };
}

impl MaterialState {
    pub fn new() -> Self {
        Self::default()
    }

    float_accessors! {
        time, set_time;
        radius, set_radius;
        distort_speed, set_distort_speed;
        distort_freq, set_distort_freq;
        distort_amplitude, set_distort_amplitude;
        threshold, set_threshold;
        metalness, set_metalness;
        roughness, set_roughness;
        displacement_scale, set_displacement_scale;
        displacement_bias, set_displacement_bias;
    }

    pub fn base_color(&self) -> Color {
        self.base_color
    }

    pub fn set_base_color(&mut self, color: Color) {
        self.base_color = color;
    }

    pub fn uv_repeat(&self) -> Vec2 {
        self.uv_repeat
    }

    pub fn set_uv_repeat(&mut self, repeat: Vec2) {
        self.uv_repeat = repeat;
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_distort_amplitude(mut self, amplitude: f32) -> Self {
        self.distort_amplitude = amplitude;
        self
    }

    /// Bind a texture set, adopting its UV repeat factor.
    pub fn with_textures(mut self, textures: Arc<TextureSet>) -> Self {
        self.set_textures(textures);
        self
    }

    pub fn set_textures(&mut self, textures: Arc<TextureSet>) {
        self.uv_repeat = textures.sampler().repeat;
        self.textures = Some(textures);
    }

    pub fn textures(&self) -> Option<&Arc<TextureSet>> {
        self.textures.as_ref()
    }

    /// Read a uniform by host name.
    pub fn get(&self, name: &str) -> Option<UniformValue> {
        let value = match name {
            "time" => UniformValue::Float(self.time),
            "radius" => UniformValue::Float(self.radius),
            "distort_speed" => UniformValue::Float(self.distort_speed),
            "distort_freq" => UniformValue::Float(self.distort_freq),
            "distort_amplitude" => UniformValue::Float(self.distort_amplitude),
            "threshold" => UniformValue::Float(self.threshold),
            "base_color" => UniformValue::Color(self.base_color),
            "metalness" => UniformValue::Float(self.metalness),
            "roughness" => UniformValue::Float(self.roughness),
            "displacement_scale" => UniformValue::Float(self.displacement_scale),
            "displacement_bias" => UniformValue::Float(self.displacement_bias),
            "uv_repeat" => UniformValue::Vec2(self.uv_repeat),
            _ => return None,
        };
        Some(value)
    }

    /// Write a uniform by host name. Only unknown names and mismatched kinds fail.
    pub fn set(&mut self, name: &str, value: UniformValue) -> Result<(), UniformError> {
        let current = self
            .get(name)
            .ok_or_else(|| UniformError::Unknown(name.to_string()))?;
        if current.kind() != value.kind() {
            return Err(UniformError::KindMismatch {
                name: name.to_string(),
                expected: current.kind(),
                found: value.kind(),
            });
        }

        // Kinds match, so each non-float kind has exactly one field.
        match value {
            UniformValue::Color(c) => self.base_color = c,
            UniformValue::Vec2(v) => self.uv_repeat = v,
            UniformValue::Float(v) => {
                if let Some(slot) = self.float_mut(name) {
                    *slot = v;
                }
            }
            UniformValue::Vec3(_) => {}
        }
        Ok(())
    }

    fn float_mut(&mut self, name: &str) -> Option<&mut f32> {
        let slot = match name {
            "time" => &mut self.time,
            "radius" => &mut self.radius,
            "distort_speed" => &mut self.distort_speed,
            "distort_freq" => &mut self.distort_freq,
            "distort_amplitude" => &mut self.distort_amplitude,
            "threshold" => &mut self.threshold,
            "metalness" => &mut self.metalness,
            "roughness" => &mut self.roughness,
            "displacement_scale" => &mut self.displacement_scale,
            "displacement_bias" => &mut self.displacement_bias,
            _ => return None,
        };
        Some(slot)
    }

    /// Descriptor registry for composing this material's program.
    pub fn uniform_table(&self) -> UniformTable {
        use UniformGroup::{Distortion, Pbr};
        use UniformKind::{Color, Float, Vec2};

        UniformTable::new()
            .with(UniformDescriptor::new("time", "u_time", Float, Distortion))
            .with(UniformDescriptor::new("radius", "u_radius", Float, Distortion))
            .with(
                UniformDescriptor::new("distort_speed", "u_distort_speed", Float, Distortion)
                    .with_domain(0.0, 10.0, 0.01),
            )
            .with(
                UniformDescriptor::new("distort_freq", "u_distort_freq", Float, Distortion)
                    .with_domain(0.0, 2.0, 0.01),
            )
            .with(
                UniformDescriptor::new(
                    "distort_amplitude",
                    "u_distort_amplitude",
                    Float,
                    Distortion,
                )
                .with_domain(0.0, 5.0, 0.01),
            )
            .with(
                UniformDescriptor::new("threshold", "u_threshold", Float, Distortion)
                    .with_domain(0.0, 1.0, 0.01),
            )
            .with(UniformDescriptor::new("base_color", "u_base_color", Color, Pbr))
            .with(
                UniformDescriptor::new("metalness", "u_metalness", Float, Pbr)
                    .with_domain(0.0, 1.0, 0.01),
            )
            .with(
                UniformDescriptor::new("roughness", "u_roughness", Float, Pbr)
                    .with_domain(0.0, 1.0, 0.01),
            )
            .with(UniformDescriptor::new(
                "displacement_scale",
                "u_displacement_scale",
                Float,
                Pbr,
            ))
            .with(UniformDescriptor::new(
                "displacement_bias",
                "u_displacement_bias",
                Float,
                Pbr,
            ))
            .with(UniformDescriptor::new("uv_repeat", "u_uv_repeat", Vec2, Pbr))
    }

    /// Layout signature: names and kinds only.
    pub fn shape(&self) -> UniformLayout {
        self.uniform_table().layout()
    }

    pub fn distortion_uniforms(&self) -> DistortionUniformData {
        DistortionUniformData {
            time: self.time,
            radius: self.radius,
            distort_speed: self.distort_speed,
            distort_freq: self.distort_freq,
            distort_amplitude: self.distort_amplitude,
            threshold: self.threshold,
            _padding: [0.0; 2],
        }
    }

    pub fn pbr_uniforms(&self) -> PbrUniformData {
        PbrUniformData {
            base_color: self.base_color.with_alpha(1.0),
            metalness: self.metalness,
            roughness: self.roughness,
            uv_repeat: self.uv_repeat.to_array(),
            displacement_scale: self.displacement_scale,
            displacement_bias: self.displacement_bias,
            _padding: [0.0; 2],
        }
    }

    /// Snapshot of both uniform blocks for upload.
    pub fn uniforms(&self) -> MaterialUniforms {
        MaterialUniforms {
            pbr: self.pbr_uniforms(),
            distortion: self.distortion_uniforms(),
        }
    }
}
