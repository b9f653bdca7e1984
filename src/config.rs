//! Scene configuration.

use std::path::Path;
use std::sync::Arc;

use crate::animation::LiveParameters;
use crate::material::MaterialState;
use crate::mesh::{Mesh, TorusConfig};
use crate::orientation::SmootherConfig;
use crate::resources::{SamplerConfig, TexturePaths, TextureSet};
use crate::scene::Camera;
use crate::shader::ComposerConfig;

/// Directory the default texture paths point into.
pub const DEFAULT_ASSET_DIR: &str = "assets";

/// Fixed material values that the live panel does not edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialConfig {
    /// Projection radius of the distortion. Matches the ring radius of the
    /// default torus, so bulges follow the tube. Zero pushes from the center.
    pub radius: f32,
    /// Gate threshold of the patchy deformation.
    pub threshold: f32,
    pub displacement_scale: f32,
    pub displacement_bias: f32,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        let state = MaterialState::default();
        Self {
            radius: TorusConfig::default().radius,
            threshold: state.threshold(),
            displacement_scale: state.displacement_scale(),
            displacement_bias: state.displacement_bias(),
        }
    }
}

impl MaterialConfig {
    /// Build a material state with the live parameters already applied.
    pub fn build(&self, params: &LiveParameters) -> MaterialState {
        let mut state = MaterialState::new()
            .with_radius(self.radius)
            .with_threshold(self.threshold);
        state.set_displacement_scale(self.displacement_scale);
        state.set_displacement_bias(self.displacement_bias);
        state.set_base_color(params.color);
        state.set_metalness(params.metalness);
        state.set_roughness(params.roughness);
        state.set_distort_speed(params.distort_speed);
        state.set_distort_amplitude(params.distort_amplitude);
        state.set_distort_freq(params.distort_frequency);
        state
    }
}

/// Everything needed to set up the distorted torus scene.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub torus: TorusConfig,
    pub camera: Camera,
    pub material: MaterialConfig,
    pub parameters: LiveParameters,
    pub smoother: SmootherConfig,
    pub composer: ComposerConfig,
    pub textures: TexturePaths,
    pub sampler: SamplerConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            torus: TorusConfig::default(),
            camera: Camera::default(),
            material: MaterialConfig::default(),
            parameters: LiveParameters::default(),
            smoother: SmootherConfig::default(),
            composer: ComposerConfig::default(),
            textures: TexturePaths::in_dir(DEFAULT_ASSET_DIR),
            sampler: SamplerConfig::default(),
        }
    }
}

impl SceneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_torus(mut self, torus: TorusConfig) -> Self {
        self.torus = torus;
        self
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_material(mut self, material: MaterialConfig) -> Self {
        self.material = material;
        self
    }

    pub fn with_parameters(mut self, parameters: LiveParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_smoother(mut self, smoother: SmootherConfig) -> Self {
        self.smoother = smoother;
        self
    }

    pub fn with_composer(mut self, composer: ComposerConfig) -> Self {
        self.composer = composer;
        self
    }

    /// Point every texture slot at `<dir>/<slot>.jpg`.
    pub fn with_asset_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.textures = TexturePaths::in_dir(dir);
        self
    }

    pub fn with_textures(mut self, textures: TexturePaths) -> Self {
        self.textures = textures;
        self
    }

    pub fn with_sampler(mut self, sampler: SamplerConfig) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn build_mesh(&self) -> Mesh {
        Mesh::from_config(&self.torus)
    }

    /// Material state without textures.
    pub fn build_material(&self) -> MaterialState {
        self.material.build(&self.parameters)
    }

    /// Load textures, falling back to placeholders per slot, and bind them.
    pub fn load_material(&self) -> MaterialState {
        let textures = Arc::new(TextureSet::load(&self.textures, self.sampler));
        log::info!(
            "Loaded material textures ({} placeholders)",
            textures.placeholder_count()
        );
        self.build_material().with_textures(textures)
    }
}
