//! End-to-end tests of the distorted torus pipeline.
//!
//! These run the frame loop, the CPU mirror of the injected shader code and
//! the composer together, the way a renderer would drive them.
//!
//! ```bash
//! cargo test --test pipeline
//! ```

use glam::{Quat, Vec3, Vec4};
use rstest::rstest;

use distorted_torus::animation::ManualClock;
use distorted_torus::config::{MaterialConfig, SceneConfig};
use distorted_torus::distortion::{desaturate, displace_vertex, gate_factor, gate_noise};
use distorted_torus::error::ComposeError;
use distorted_torus::material::{MaterialState, UniformValue};
use distorted_torus::noise::snoise;
use distorted_torus::scene::Transform;
use distorted_torus::shader::{
    BaseProgram, ProgramCache, ShaderComposer, ShaderDef, ShaderStage, STANDARD_PBR_GLSL,
};
use distorted_torus::{FrameDriver, FrameInputs, LiveParameters, Mesh, PointerInput, SmootherConfig};

const EPS: f32 = 1e-4;

fn compose_standard(
    base: &BaseProgram,
    material: &MaterialState,
) -> Result<distorted_torus::ComposedProgram, ComposeError> {
    ShaderComposer::with_standard_library().compose(base, &material.uniform_table(), &[])
}

// ============================================================================
// Frame loop scenarios
// ============================================================================

/// At t=0 with threshold 0.3 and amplitude 2, closed-gate vertices stay put
/// and open-gate vertices move along the tube by exactly the noise offset.
#[test]
fn closed_gate_vertices_are_unchanged() {
    let config = SceneConfig::new()
        .with_material(MaterialConfig {
            radius: 5.0,
            threshold: 0.3,
            ..Default::default()
        })
        .with_parameters(LiveParameters {
            distort_amplitude: 2.0,
            ..Default::default()
        });
    let mesh = Mesh::torus(5.0, 1.0, 16, 64);
    let mut material = config.build_material();
    let mut transform = Transform::default();
    let mut driver = FrameDriver::new(ManualClock::new(0.0), config.smoother);

    let uniforms = driver.tick(
        &FrameInputs {
            pointer: PointerInput::CENTER,
            viewport: config.camera.viewport_at_target(),
        },
        &config.parameters,
        &mut material,
        &mut transform,
    );
    let distortion = uniforms.material.distortion;
    assert_eq!(distortion.time, 0.0);
    assert_eq!(distortion.distort_amplitude, 2.0);

    let model = transform.matrix();
    for vertex in &mesh.vertices {
        let p = vertex.position;
        let out = displace_vertex(p, &model, &distortion);
        assert_eq!(out.gate, gate_noise(model.transform_point3(p), 0.0));
        assert_eq!(out.displaced, out.gate > 0.3);

        if !out.displaced {
            assert_eq!(out.position, p);
            continue;
        }

        let proj = Vec3::new(p.x, p.y, 0.0).normalize() * 5.0;
        let factor = 2.0 * (out.gate - 0.3);
        let offset = snoise(p * distortion.distort_freq) * factor;
        let grown = (out.position - proj).length() - (p - proj).length();
        assert!((grown - offset).abs() < EPS, "{grown} vs {offset}");
    }
}

#[test]
fn desaturation_cutoff_is_exclusive() {
    let color = Vec4::new(0.86, 0.66, 0.06, 1.0);
    assert_eq!(desaturate(color, 0.5), color);

    let gray = desaturate(color, 0.5 + 1e-6);
    assert_eq!(gray.x, gray.y);
    assert_eq!(gray.y, gray.z);
    assert_eq!(gray.w, 1.0);
}

#[test]
fn centered_pointer_returns_to_identity() {
    let config = SceneConfig::new();
    let mut driver = FrameDriver::new(ManualClock::default(), SmootherConfig::default());
    let mut material = config.build_material();
    let mut transform = Transform::from_position_rotation(Vec3::ZERO, Quat::from_rotation_y(0.3));
    driver.smoother_mut().bind(transform.rotation);

    let inputs = FrameInputs {
        pointer: PointerInput::CENTER,
        viewport: config.camera.viewport_at_target(),
    };
    for _ in 0..60 {
        driver.clock_mut().advance(1.0 / 60.0);
        driver.tick(&inputs, &config.parameters, &mut material, &mut transform);
    }

    assert_ne!(transform.rotation, Quat::IDENTITY);
    assert!(transform.rotation.abs_diff_eq(Quat::IDENTITY, 1e-3));
    assert!((material.time() - 1.0).abs() < EPS);
}

#[test]
fn panel_values_apply_on_next_tick() {
    let config = SceneConfig::new();
    let mut params = LiveParameters::default();
    let mut material = config.build_material();
    let mut transform = Transform::default();
    let mut driver = FrameDriver::new(ManualClock::new(1.0), config.smoother);
    let inputs = FrameInputs {
        pointer: PointerInput::CENTER,
        viewport: config.camera.viewport_at_target(),
    };

    params.set("metalness", UniformValue::Float(0.25)).unwrap();
    params.set("distort_frequency", UniformValue::Float(1.75)).unwrap();
    let uniforms = driver.tick(&inputs, &params, &mut material, &mut transform);

    assert_eq!(uniforms.material.pbr.metalness, 0.25);
    assert_eq!(uniforms.material.distortion.distort_freq, 1.75);
    assert_eq!(material.metalness(), 0.25);
}

// ============================================================================
// Gate
// ============================================================================

#[rstest]
#[case::below(0.1, 0.3, 2.0, None)]
#[case::at_threshold(0.3, 0.3, 2.0, None)]
#[case::above(0.8, 0.3, 2.0, Some(1.0))]
#[case::zero_amplitude(0.8, 0.3, 0.0, Some(0.0))]
#[case::negative_threshold(0.0, -0.5, 1.0, Some(0.5))]
fn gate_factor_cases(
    #[case] n: f32,
    #[case] threshold: f32,
    #[case] amplitude: f32,
    #[case] expected: Option<f32>,
) {
    let factor = gate_factor(n, threshold, amplitude);
    match (factor, expected) {
        (None, None) => {}
        (Some(f), Some(e)) => assert!((f - e).abs() < EPS, "{f} vs {e}"),
        other => panic!("unexpected gate result {other:?}"),
    }
}

#[rstest]
#[case(1e-2)]
#[case(1e-3)]
#[case(1e-5)]
fn gate_factor_vanishes_at_boundary(#[case] above: f32) {
    let factor = gate_factor(0.3 + above, 0.3, 5.0).unwrap();
    assert!(factor <= 5.0 * above + EPS);
}

// ============================================================================
// Composition and compilation
// ============================================================================

#[rstest]
#[case::flat_color(false)]
#[case::color_map(true)]
fn standard_program_compiles(#[case] color_map: bool) {
    let composer = ShaderComposer::with_standard_library();
    let mut shader_defs = Vec::new();
    if color_map {
        shader_defs.push(("HAS_COLOR_MAP", ShaderDef::Bool(true)));
    }
    let program = composer
        .compose(
            &BaseProgram::standard_pbr(),
            &MaterialState::default().uniform_table(),
            &shader_defs,
        )
        .unwrap();

    for stage in ShaderStage::ALL {
        assert!(program.source(stage).contains("u_threshold"));
    }

    let compiled = composer.compile(&program);
    assert!(compiled.is_ok(), "Compilation failed: {:?}", compiled.err());
    let compiled = compiled.unwrap();
    assert!(compiled.wgsl(ShaderStage::Vertex).contains("@vertex"));
    assert!(compiled.wgsl(ShaderStage::Fragment).contains("@fragment"));
}

#[test]
fn value_changes_reuse_cached_program() {
    let composer = ShaderComposer::with_standard_library();
    let base = BaseProgram::standard_pbr();
    let mut cache = ProgramCache::new();
    let mut material = MaterialState::default();

    let first = cache
        .get_or_compose(&composer, &base, &material.uniform_table(), &[])
        .unwrap();
    material.set_time(12.0);
    material.set_threshold(0.8);
    material.set_distort_amplitude(4.0);
    let second = cache
        .get_or_compose(&composer, &base, &material.uniform_table(), &[])
        .unwrap();

    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(cache.builds(), 1);
    assert_eq!(cache.hits(), 1);
}

#[test]
fn missing_anchor_is_rejected() {
    let base = BaseProgram::new(
        "no_final_color",
        STANDARD_PBR_GLSL.replacen("// #anchor final_color", "", 1),
    );
    let err = compose_standard(&base, &MaterialState::default()).unwrap_err();
    assert_eq!(
        err,
        ComposeError::AnchorNotFound {
            anchor: "final_color",
            stage: ShaderStage::Fragment,
        }
    );
}

#[test]
fn duplicate_anchor_is_rejected() {
    let base = BaseProgram::new(
        "twice",
        STANDARD_PBR_GLSL.replacen(
            "// #anchor project_vertex",
            "// #anchor project_vertex\n    // #anchor project_vertex",
            1,
        ),
    );
    let err = compose_standard(&base, &MaterialState::default()).unwrap_err();
    assert_eq!(
        err,
        ComposeError::DuplicateAnchor {
            anchor: "project_vertex",
            stage: ShaderStage::Vertex,
            count: 2,
        }
    );
}

#[test]
fn wrong_version_is_rejected() {
    let base = BaseProgram::new(
        "es",
        STANDARD_PBR_GLSL.replacen("#version 450", "#version 300 es", 1),
    );
    let err = compose_standard(&base, &MaterialState::default()).unwrap_err();
    assert_eq!(err, ComposeError::UnsupportedVersion("300 es".into()));
}

#[rstest]
#[case("u_time")]
#[case("u_radius")]
#[case("u_threshold")]
fn missing_uniform_is_rejected(#[case] shader_name: &'static str) {
    let mut table = MaterialState::default().uniform_table();
    assert!(table.unregister(shader_name).is_some());

    let mut cache = ProgramCache::new();
    let err = cache
        .get_or_compose(
            &ShaderComposer::with_standard_library(),
            &BaseProgram::standard_pbr(),
            &table,
            &[],
        )
        .unwrap_err();
    assert_eq!(err, ComposeError::UnregisteredUniform(shader_name));
    assert!(cache.is_empty());
}
