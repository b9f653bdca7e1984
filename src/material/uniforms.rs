//! Uniform descriptors, the per-program uniform table and GPU block layouts.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use super::color::Color;

/// Type of value a uniform holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    /// Single f32 value.
    Float,
    /// 2-component float vector.
    Vec2,
    /// 3-component float vector.
    Vec3,
    /// RGB color.
    Color,
}

/// A typed uniform value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Color(Color),
}

impl UniformValue {
    /// The kind of this value.
    pub fn kind(&self) -> UniformKind {
        match self {
            Self::Float(_) => UniformKind::Float,
            Self::Vec2(_) => UniformKind::Vec2,
            Self::Vec3(_) => UniformKind::Vec3,
            Self::Color(_) => UniformKind::Color,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<Color> for UniformValue {
    fn from(v: Color) -> Self {
        Self::Color(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        Self::Vec2(v)
    }
}

/// Editing domain of a float uniform.
///
/// Only external editors look at this; the core never clamps to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformDomain {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl UniformDomain {
    pub const fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }

    /// Whether `value` lies inside `[min, max]`.
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Which GPU uniform block a uniform is packed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformGroup {
    /// Declared by the base lighting program (`MaterialUniforms`).
    Pbr,
    /// Injected by the shader composer (`DistortionUniforms`).
    Distortion,
}

/// Describes one uniform of a material.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformDescriptor {
    /// Host-side name (e.g. `distort_speed`).
    pub name: &'static str,
    /// Identifier used in shader source (e.g. `u_distort_speed`).
    pub shader_name: &'static str,
    pub kind: UniformKind,
    pub group: UniformGroup,
    pub domain: Option<UniformDomain>,
}

impl UniformDescriptor {
    pub const fn new(
        name: &'static str,
        shader_name: &'static str,
        kind: UniformKind,
        group: UniformGroup,
    ) -> Self {
        Self {
            name,
            shader_name,
            kind,
            group,
            domain: None,
        }
    }

    pub const fn with_domain(mut self, min: f32, max: f32, step: f32) -> Self {
        self.domain = Some(UniformDomain::new(min, max, step));
        self
    }
}

/// Shader identifiers of the injected distortion block, in block order.
///
/// The order matches [`DistortionUniformData`].
pub const DISTORTION_UNIFORMS: [&str; 6] = [
    "u_time",
    "u_radius",
    "u_distort_speed",
    "u_distort_freq",
    "u_distort_amplitude",
    "u_threshold",
];

/// Uniform table of a program.
///
/// Every uniform the composed program references must be registered here
/// before composition; the composer refuses to build otherwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformTable {
    entries: Vec<UniformDescriptor>,
}

impl UniformTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a uniform, replacing any entry with the same shader name.
    pub fn register(&mut self, descriptor: UniformDescriptor) {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|e| e.shader_name == descriptor.shader_name)
        {
            *existing = descriptor;
        } else {
            self.entries.push(descriptor);
        }
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, descriptor: UniformDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    /// Remove a uniform by shader name.
    pub fn unregister(&mut self, shader_name: &str) -> Option<UniformDescriptor> {
        let index = self
            .entries
            .iter()
            .position(|e| e.shader_name == shader_name)?;
        Some(self.entries.remove(index))
    }

    /// Look up by host name.
    pub fn get(&self, name: &str) -> Option<&UniformDescriptor> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Look up by shader identifier.
    pub fn get_by_shader_name(&self, shader_name: &str) -> Option<&UniformDescriptor> {
        self.entries.iter().find(|e| e.shader_name == shader_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UniformDescriptor> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value-free signature of the table, used as a program cache key.
    pub fn layout(&self) -> UniformLayout {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|e| (e.shader_name, e.kind, e.group))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        UniformLayout { entries }
    }
}

/// Shape of a uniform set: names and kinds, never values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniformLayout {
    entries: Vec<(&'static str, UniformKind, UniformGroup)>,
}

impl UniformLayout {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Injected distortion uniform block (std140).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DistortionUniformData {
    pub time: f32,
    pub radius: f32,
    pub distort_speed: f32,
    pub distort_freq: f32,
    pub distort_amplitude: f32,
    pub threshold: f32,
    pub _padding: [f32; 2],
}

/// Base lighting program material block (std140).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PbrUniformData {
    pub base_color: [f32; 4],
    pub metalness: f32,
    pub roughness: f32,
    pub uv_repeat: [f32; 2],
    pub displacement_scale: f32,
    pub displacement_bias: f32,
    pub _padding: [f32; 2],
}

/// Both uniform blocks of a material, as copied to the GPU each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialUniforms {
    pub pbr: PbrUniformData,
    pub distortion: DistortionUniformData,
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIME: UniformDescriptor =
        UniformDescriptor::new("time", "u_time", UniformKind::Float, UniformGroup::Distortion);

    #[test]
    fn test_block_sizes_match_std140() {
        assert_eq!(std::mem::size_of::<DistortionUniformData>(), 32);
        assert_eq!(std::mem::size_of::<PbrUniformData>(), 48);
    }

    #[test]
    fn test_register_replaces_same_shader_name() {
        let mut table = UniformTable::new();
        table.register(TIME);
        table.register(TIME.with_domain(0.0, 1.0, 0.1));
        assert_eq!(table.len(), 1);
        assert!(table.get("time").and_then(|d| d.domain).is_some());
    }

    #[test]
    fn test_unregister() {
        let mut table = UniformTable::new().with(TIME);
        assert!(table.unregister("u_time").is_some());
        assert!(table.is_empty());
        assert!(table.unregister("u_time").is_none());
    }

    #[test]
    fn test_layout_ignores_registration_order() {
        let radius = UniformDescriptor::new(
            "radius",
            "u_radius",
            UniformKind::Float,
            UniformGroup::Distortion,
        );
        let a = UniformTable::new().with(TIME).with(radius.clone());
        let b = UniformTable::new().with(radius).with(TIME);
        assert_eq!(a.layout(), b.layout());
    }

    #[test]
    fn test_domain_contains() {
        let domain = UniformDomain::new(0.0, 5.0, 0.01);
        assert!(domain.contains(0.0));
        assert!(domain.contains(5.0));
        assert!(!domain.contains(5.5));
    }

    #[test]
    fn test_value_kind() {
        assert_eq!(UniformValue::from(1.0_f32).kind(), UniformKind::Float);
        assert_eq!(
            UniformValue::from(Color::WHITE).kind(),
            UniformKind::Color
        );
        assert_eq!(UniformValue::from(Vec2::ONE).as_float(), None);
    }
}
