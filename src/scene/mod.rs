//! Scene management

mod camera;
mod transform;

pub use camera::*;
pub use transform::*;
