//! Resource management
//!
//! Texture loading with placeholder fallback, and sampler configuration.

mod sampler;
mod texture;

pub use sampler::*;
pub use texture::*;
