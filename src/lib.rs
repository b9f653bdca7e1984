//! Distorted Torus - a procedural material pipeline for an animated torus
//!
//! A stock PBR program is extended at two anchors with a noise-driven vertex
//! distortion and a patchy desaturation, then compiled to WGSL.
//!
//! # Features
//! - Shader composition with `#include` resolution, shader defs and anchor injection
//! - Program cache keyed by source, defs and uniform layout
//! - CPU reference of the noise, distortion and desaturation math
//! - Frame loop driving time, live parameters and pointer-follow orientation
//! - Texture loading with placeholder fallback and wgpu upload helpers

pub mod animation;
pub mod config;
pub mod distortion;
pub mod error;
pub mod frame;
pub mod gpu;
pub mod material;
pub mod mesh;
pub mod noise;
pub mod orientation;
pub mod resources;
pub mod scene;
pub mod shader;

pub use animation::{AnimationDriver, FrameClock, LiveParameters, ManualClock, MonotonicClock};
pub use config::{MaterialConfig, SceneConfig};
pub use error::{ComposeError, ParseColorError, ResourceError, UniformError};
pub use frame::{FrameDriver, FrameInputs, FrameUniforms};
pub use material::{Color, MaterialState, UniformValue};
pub use mesh::{Mesh, TorusConfig, Vertex};
pub use orientation::{OrientationSmoother, PointerInput, SmootherConfig, Viewport};
pub use shader::{BaseProgram, ComposedProgram, ComposerConfig, ShaderComposer, ShaderDef};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the crate banner. The binary calls this once after the logger is up.
pub fn init() {
    log::info!("distorted-torus v{VERSION}");
}
