//! Mesh data structures and torus generation

use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};

/// Standard vertex with position, normal, UV, and tangent
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub tangent: Vec4,
}

impl Vertex {
    /// Attribute locations match the `a_*` inputs of the standard program.
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Float32x4
    ];

    pub fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Torus dimensions and tessellation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorusConfig {
    /// Distance from the center to the middle of the tube.
    pub radius: f32,
    /// Tube radius.
    pub tube: f32,
    /// Segments around the tube.
    pub radial_segments: u32,
    /// Segments around the ring.
    pub tubular_segments: u32,
}

impl Default for TorusConfig {
    fn default() -> Self {
        Self {
            radius: 5.0,
            tube: 1.0,
            radial_segments: 128,
            tubular_segments: 512,
        }
    }
}

/// A mesh with vertex and index data
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub name: String,
}

impl Mesh {
    pub fn new(name: &str) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            name: name.to_string(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get vertex data as bytes
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Get index data as bytes
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Create a torus lying in the XY plane around +Z.
    ///
    /// UVs run along the ring in `u` and around the tube in `v`. The seams
    /// duplicate their vertices so the UVs stay continuous.
    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        let mut mesh = Mesh::new("torus");
        let radial_segments = radial_segments.max(3);
        let tubular_segments = tubular_segments.max(3);

        mesh.vertices
            .reserve(((radial_segments + 1) * (tubular_segments + 1)) as usize);
        for j in 0..=radial_segments {
            let v = j as f32 / radial_segments as f32 * TAU;
            for i in 0..=tubular_segments {
                let u = i as f32 / tubular_segments as f32 * TAU;
                let ring = radius + tube * v.cos();
                let position = Vec3::new(ring * u.cos(), ring * u.sin(), tube * v.sin());
                let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);

                mesh.vertices.push(Vertex {
                    position,
                    normal: (position - center).normalize_or_zero(),
                    uv: Vec2::new(
                        i as f32 / tubular_segments as f32,
                        j as f32 / radial_segments as f32,
                    ),
                    // Direction of increasing u
                    tangent: Vec4::new(-u.sin(), u.cos(), 0.0, 1.0),
                });
            }
        }

        let row = tubular_segments + 1;
        mesh.indices
            .reserve((radial_segments * tubular_segments * 6) as usize);
        for j in 1..=radial_segments {
            for i in 1..=tubular_segments {
                let a = row * j + i - 1;
                let b = row * (j - 1) + i - 1;
                let c = row * (j - 1) + i;
                let d = row * j + i;
                mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        mesh
    }

    pub fn from_config(config: &TorusConfig) -> Self {
        Self::torus(
            config.radius,
            config.tube,
            config.radial_segments,
            config.tubular_segments,
        )
    }
}
