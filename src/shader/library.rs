//! Built-in shader library modules.
//!
//! | Include Path | Description |
//! |--------------|-------------|
//! | `distorted_torus/noise.glsl` | 3D simplex noise (`snoise`) |
//! | `distorted_torus/distortion.glsl` | `distort_torus`, requires the noise module |
//! | `distorted_torus/grayscale.glsl` | luma replacement (`grayscale`) |
//!
//! The base program itself is not includable: it reaches the composer as a
//! [`BaseProgram`](crate::shader::BaseProgram).

use crate::distortion::{DISTORTION_GLSL, GRAYSCALE_GLSL};
use crate::noise::NOISE_GLSL;

/// Standard metallic-roughness base program with both composition anchors.
pub const STANDARD_PBR_GLSL: &str = include_str!("../../shaders/standard_pbr.glsl");

pub const NOISE_INCLUDE: &str = "distorted_torus/noise.glsl";
pub const DISTORTION_INCLUDE: &str = "distorted_torus/distortion.glsl";
pub const GRAYSCALE_INCLUDE: &str = "distorted_torus/grayscale.glsl";

/// Collection of shader modules that can be included.
pub struct ShaderLibrary {
    modules: Vec<(&'static str, &'static str)>,
}

impl ShaderLibrary {
    /// The library every distorted material needs.
    pub fn standard() -> Self {
        Self {
            modules: vec![
                (NOISE_INCLUDE, NOISE_GLSL),
                (DISTORTION_INCLUDE, DISTORTION_GLSL),
                (GRAYSCALE_INCLUDE, GRAYSCALE_GLSL),
            ],
        }
    }

    /// Create an empty shader library.
    pub fn empty() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Get an iterator over all modules (path, source).
    pub fn modules(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.modules.iter().copied()
    }

    /// Add a custom module to the library.
    pub fn with_module(mut self, path: &'static str, source: &'static str) -> Self {
        self.modules.push((path, source));
        self
    }
}
