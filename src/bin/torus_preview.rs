//! Headless preview tool for the distorted torus material.
//!
//! ```bash
//! # Print a summary of the composed program
//! torus-preview compose
//!
//! # Write both WGSL stages, sampling the color map
//! torus-preview compose --out shaders-out --color-map
//!
//! # Run 120 frames with the pointer at the top right corner
//! torus-preview simulate --frames 120 --pointer 1 1 --fps 60
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use distorted_torus::animation::ManualClock;
use distorted_torus::config::{SceneConfig, DEFAULT_ASSET_DIR};
use distorted_torus::distortion::displace_vertex;
use distorted_torus::scene::Transform;
use distorted_torus::shader::{BaseProgram, ShaderComposer, ShaderDef, ShaderStage};
use distorted_torus::{FrameDriver, FrameInputs, PointerInput};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(
    name = "torus-preview",
    about = "Compose the distorted torus material and run its frame loop headless",
    version
)]
struct Args {
    /// Directory holding the material textures
    #[arg(long, default_value = DEFAULT_ASSET_DIR)]
    assets: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose and compile the material program to WGSL
    Compose {
        /// Write vertex.wgsl and fragment.wgsl into this directory
        #[arg(long)]
        out: Option<PathBuf>,

        /// Sample the color texture instead of the flat base color
        #[arg(long)]
        color_map: bool,
    },
    /// Run the frame loop without a window
    Simulate {
        /// Number of frames to run
        #[arg(long, default_value = "120")]
        frames: u32,

        /// Normalized pointer position in [-1, 1]
        #[arg(
            long,
            num_args = 2,
            value_names = ["X", "Y"],
            allow_negative_numbers = true,
            default_values = ["0", "0"]
        )]
        pointer: Vec<f32>,

        /// Simulated frame rate
        #[arg(long, default_value = "60")]
        fps: f32,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    distorted_torus::init();

    let args = Args::parse();
    let config = SceneConfig::new().with_asset_dir(&args.assets);

    let result = match args.command {
        Command::Compose { out, color_map } => compose(&config, out.as_deref(), color_map),
        Command::Simulate {
            frames,
            pointer,
            fps,
        } => simulate(&config, frames, &pointer, fps),
    };

    if let Err(err) = result {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn compose(config: &SceneConfig, out: Option<&Path>, color_map: bool) -> CliResult {
    let composer = ShaderComposer::with_standard_library().with_config(config.composer);
    let base = BaseProgram::standard_pbr();
    let material = config.build_material();

    let mut shader_defs = Vec::new();
    if color_map {
        shader_defs.push(("HAS_COLOR_MAP", ShaderDef::Bool(true)));
    }

    let program = composer.compose(&base, &material.uniform_table(), &shader_defs)?;
    let compiled = composer.compile(&program)?;

    match out {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            for (stage, file) in [
                (ShaderStage::Vertex, "vertex.wgsl"),
                (ShaderStage::Fragment, "fragment.wgsl"),
            ] {
                let path = dir.join(file);
                std::fs::write(&path, compiled.wgsl(stage))?;
                log::info!("Wrote {}", path.display());
            }
        }
        None => {
            for stage in ShaderStage::ALL {
                log::info!(
                    "{stage:?}: {} GLSL lines, {} WGSL lines",
                    program.source(stage).lines().count(),
                    compiled.wgsl(stage).lines().count()
                );
            }
            log::info!(
                "{} uniforms, {} shader defs",
                program.uniforms().len(),
                program.shader_defs().len()
            );
        }
    }
    Ok(())
}

fn simulate(config: &SceneConfig, frames: u32, pointer: &[f32], fps: f32) -> CliResult {
    if fps.is_nan() || fps <= 0.0 {
        return Err(format!("fps must be positive, got {fps}").into());
    }
    let pointer = match pointer {
        [x, y] => PointerInput::new(*x, *y),
        _ => return Err("pointer takes exactly two values".into()),
    };

    let mesh = config.build_mesh();
    let mut material = config.build_material();
    let mut transform = Transform::default();
    let inputs = FrameInputs {
        pointer,
        viewport: config.camera.viewport_at_target(),
    };

    let mut driver = FrameDriver::new(ManualClock::default(), config.smoother);
    driver.smoother_mut().bind(transform.rotation);

    let mut last = None;
    for _ in 0..frames {
        let uniforms = driver.tick(&inputs, &config.parameters, &mut material, &mut transform);
        log::debug!(
            "Frame {} t={:.3}s rotation={:?}",
            uniforms.frame,
            uniforms.material.distortion.time,
            transform.rotation
        );
        last = Some(uniforms);
        driver.clock_mut().advance(1.0 / fps);
    }

    let Some(uniforms) = last else {
        log::info!("No frames simulated");
        return Ok(());
    };

    let model = transform.matrix();
    let gated = mesh
        .vertices
        .iter()
        .filter(|vertex| displace_vertex(vertex.position, &model, &uniforms.material.distortion).displaced)
        .count();

    log::info!(
        "After {} frames: t={:.3}s orientation={:?}",
        uniforms.frame,
        uniforms.material.distortion.time,
        transform.rotation
    );
    log::info!(
        "{gated} of {} vertices displaced (threshold {})",
        mesh.vertex_count(),
        uniforms.material.distortion.threshold
    );
    Ok(())
}
