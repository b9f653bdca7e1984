//! Tube-direction displacement and the two noise gates.
//!
//! Everything here mirrors the GLSL that [`ShaderComposer`](crate::shader::ShaderComposer)
//! injects, so host code can predict which vertices move and which fragments
//! go gray.

use glam::{Mat4, Vec3, Vec4};

use crate::material::DistortionUniformData;
use crate::noise::snoise;

/// GLSL source of the distortion module (`distorted_torus/distortion.glsl`).
pub const DISTORTION_GLSL: &str = include_str!("../shaders/library/distortion.glsl");
/// GLSL source of the grayscale module (`distorted_torus/grayscale.glsl`).
pub const GRAYSCALE_GLSL: &str = include_str!("../shaders/library/grayscale.glsl");

/// Divisor applied to world position before sampling the distortion gate.
pub const GATE_NOISE_SCALE: f32 = 40.0;
/// Time multiplier of the distortion gate.
pub const GATE_TIME_SCALE: f32 = 0.2;
/// Divisor applied to local position before sampling desaturation noise.
pub const DESATURATION_NOISE_SCALE: f32 = 20.0;
/// Time multiplier of the desaturation noise.
pub const DESATURATION_TIME_SCALE: f32 = 0.1;
/// Desaturation applies strictly above this value.
pub const DESATURATION_CUTOFF: f32 = 0.5;

/// Luma weights used by [`grayscale`].
pub const LUMA_WEIGHTS: Vec3 = Vec3::new(0.299, 0.587, 0.114);

/// Push `p` away from the ring circle of radius `radius` by `offset`.
///
/// The ring lies in the XY plane around +Z. With `offset == 0` the input is
/// returned untouched. On the ring axis or on the ring circle the undefined
/// direction is taken as zero, as `distort_normalize_or_zero` does in GLSL.
pub fn displace_along_tube(p: Vec3, radius: f32, offset: f32) -> Vec3 {
    if offset == 0.0 {
        return p;
    }
    let proj = Vec3::new(p.x, p.y, 0.0).normalize_or_zero() * radius;
    let tube = p - proj;
    proj + tube.normalize_or_zero() * (tube.length() + offset)
}

/// Full distortion: noise-modulated offset along the tube direction.
///
/// `noise_size` scales the sampling position, `noise_speed` scales time.
pub fn distort_torus(
    p: Vec3,
    radius: f32,
    factor: f32,
    noise_size: f32,
    noise_speed: f32,
    time: f32,
) -> Vec3 {
    let offset = snoise(p * noise_size + Vec3::splat(time * noise_speed)) * factor;
    displace_along_tube(p, radius, offset)
}

/// Gate noise at a world-space position.
pub fn gate_noise(world: Vec3, time: f32) -> f32 {
    snoise(world / Vec3::splat(GATE_NOISE_SCALE) + Vec3::splat(time * GATE_TIME_SCALE))
}

/// Distortion factor for gate sample `n`, or `None` when the gate is closed.
///
/// The factor goes to zero as `n` approaches `threshold` from above, so the
/// surface has no seam at the gate boundary.
pub fn gate_factor(n: f32, threshold: f32, amplitude: f32) -> Option<f32> {
    (n > threshold).then(|| amplitude * (n - threshold))
}

/// Result of [`displace_vertex`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplacedVertex {
    /// Local-space position after distortion.
    pub position: Vec3,
    /// Gate noise sample that decided the outcome.
    pub gate: f32,
    /// Whether the gate was open.
    pub displaced: bool,
}

/// Gate and distortion as the injected vertex code applies them.
///
/// `local` is the working position the base program holds at the
/// `project_vertex` anchor, which already carries the standard program's
/// height-map offset. The GPU samples the gate at the attribute position
/// while this samples it at `local`; the two agree when the displacement map
/// is neutral, so pass the attribute position only in that case.
pub fn displace_vertex(
    local: Vec3,
    model: &Mat4,
    uniforms: &DistortionUniformData,
) -> DisplacedVertex {
    let world = model.transform_point3(local);
    let gate = gate_noise(world, uniforms.time);
    match gate_factor(gate, uniforms.threshold, uniforms.distort_amplitude) {
        Some(factor) => DisplacedVertex {
            position: distort_torus(
                local,
                uniforms.radius,
                factor,
                uniforms.distort_freq,
                uniforms.distort_speed,
                uniforms.time,
            ),
            gate,
            displaced: true,
        },
        None => DisplacedVertex {
            position: local,
            gate,
            displaced: false,
        },
    }
}

/// Desaturation noise at a local-space position.
pub fn desaturation_noise(local: Vec3, time: f32) -> f32 {
    snoise(
        local / Vec3::splat(DESATURATION_NOISE_SCALE) + Vec3::splat(time * DESATURATION_TIME_SCALE),
    )
}

/// Whether sample `n` turns the fragment gray.
pub fn desaturation_open(n: f32) -> bool {
    n > DESATURATION_CUTOFF
}

/// Replace RGB with its luma.
pub fn grayscale(rgb: Vec3) -> Vec3 {
    Vec3::splat(rgb.dot(LUMA_WEIGHTS))
}

/// Apply the desaturation gate to a final color. Alpha is preserved.
pub fn desaturate(color: Vec4, n: f32) -> Vec4 {
    if desaturation_open(n) {
        grayscale(color.truncate()).extend(color.w)
    } else {
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn ring_proj(p: Vec3, radius: f32) -> Vec3 {
        Vec3::new(p.x, p.y, 0.0).normalize_or_zero() * radius
    }

    #[test]
    fn test_zero_offset_is_identity() {
        for p in [
            Vec3::new(5.0, 0.0, 1.0),
            Vec3::new(-3.2, 4.1, -0.7),
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 2.0),
        ] {
            assert_eq!(displace_along_tube(p, 5.0, 0.0), p);
        }
    }

    #[test]
    fn test_offset_extends_tube_distance() {
        let radius = 5.0;
        for (p, offset) in [
            (Vec3::new(6.0, 0.0, 0.0), 0.5),
            (Vec3::new(3.0, 4.0, 0.8), -0.3),
            (Vec3::new(-4.0, 2.5, -0.9), 1.25),
        ] {
            let proj = ring_proj(p, radius);
            let out = displace_along_tube(p, radius, offset);
            let before = (p - proj).length();
            let after = (out - proj).length();
            assert!((after - (before + offset)).abs() < EPS, "{p}: {after} vs {before} + {offset}");
        }
    }

    #[test]
    fn test_zero_radius_displaces_radially() {
        let p = Vec3::new(1.0, 2.0, 2.0);
        let out = displace_along_tube(p, 0.0, 1.0);
        assert!((out.length() - 4.0).abs() < EPS);
        assert!(out.normalize().abs_diff_eq(p.normalize(), EPS));
    }

    #[test]
    fn test_degenerate_inputs_stay_finite() {
        // On the ring axis and on the ring circle.
        for p in [Vec3::new(0.0, 0.0, 3.0), Vec3::new(5.0, 0.0, 0.0)] {
            let out = displace_along_tube(p, 5.0, 0.5);
            assert!(out.is_finite(), "{p} -> {out}");
        }
    }

    #[test]
    fn test_gate_factor() {
        assert_eq!(gate_factor(0.3, 0.3, 2.0), None);
        assert_eq!(gate_factor(0.1, 0.3, 2.0), None);
        let f = gate_factor(0.8, 0.3, 2.0).unwrap();
        assert!((f - 1.0).abs() < EPS);
    }

    #[test]
    fn test_gate_factor_vanishes_at_threshold() {
        let threshold = 0.3;
        let mut last = f32::MAX;
        for k in 1..=6 {
            let n = threshold + 10f32.powi(-k);
            let f = gate_factor(n, threshold, 1.0).unwrap();
            assert!(f < last);
            last = f;
        }
        assert!(last < 1e-5);
    }

    #[test]
    fn test_displace_vertex_closed_gate_keeps_position() {
        let uniforms = DistortionUniformData {
            time: 0.0,
            radius: 5.0,
            distort_speed: 1.0,
            distort_freq: 0.5,
            distort_amplitude: 2.0,
            // Above the noise range: never open.
            threshold: 2.0,
            _padding: [0.0; 2],
        };
        let local = Vec3::new(6.0, 0.0, 0.0);
        let out = displace_vertex(local, &Mat4::IDENTITY, &uniforms);
        assert!(!out.displaced);
        assert_eq!(out.position, local);
    }

    #[test]
    fn test_displace_vertex_open_gate_matches_distort_torus() {
        let uniforms = DistortionUniformData {
            time: 1.5,
            radius: 5.0,
            distort_speed: 1.0,
            distort_freq: 0.5,
            distort_amplitude: 2.0,
            // Below the noise range: always open.
            threshold: -2.0,
            _padding: [0.0; 2],
        };
        let model = Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0));
        let local = Vec3::new(3.0, 4.0, 1.0);
        let out = displace_vertex(local, &model, &uniforms);
        assert!(out.displaced);
        assert_eq!(out.gate, gate_noise(model.transform_point3(local), 1.5));
        let factor = 2.0 * (out.gate + 2.0);
        assert_eq!(out.position, distort_torus(local, 5.0, factor, 0.5, 1.0, 1.5));
    }

    #[test]
    fn test_desaturation_cutoff_is_exclusive() {
        let color = Vec4::new(1.0, 0.0, 0.0, 0.5);
        assert_eq!(desaturate(color, DESATURATION_CUTOFF), color);
        let gray = desaturate(color, 0.75);
        assert!((gray.x - 0.299).abs() < EPS);
        assert_eq!(gray.x, gray.y);
        assert_eq!(gray.y, gray.z);
        assert_eq!(gray.w, 0.5);
    }

    #[test]
    fn test_grayscale_of_white_is_white() {
        assert!(grayscale(Vec3::ONE).abs_diff_eq(Vec3::ONE, EPS));
    }

    #[test]
    fn test_glsl_modules() {
        assert!(DISTORTION_GLSL.contains("vec3 distort_torus("));
        assert!(DISTORTION_GLSL.contains("if (offset == 0.0) {"));
        assert!(!DISTORTION_GLSL.contains("normalize(tube)"));
        assert!(GRAYSCALE_GLSL.contains("vec3 grayscale(vec3 color)"));
    }
}
