//! 3D simplex noise.
//!
//! [`snoise`] is the CPU mirror of `shaders/library/noise.glsl`. Both follow the
//! same sequence of `f32` operations so that host-side predictions (gating,
//! desaturation) agree with what the GPU evaluates for matching coordinates.
//!
//! The construction is the classic one: skew the input into a simplex lattice,
//! hash the four corners with a `mod 289` permutation polynomial, pick gradients
//! from a 7×7 ring mapped onto an octahedron, and sum the corner contributions
//! weighted by a `(0.6 - r²)⁴` falloff.

use glam::{Vec3, Vec3Swizzles, Vec4, Vec4Swizzles};

/// GLSL source of the noise module, registered as `distorted_torus/noise.glsl`.
pub const NOISE_GLSL: &str = include_str!("../shaders/library/noise.glsl");

fn mod289_3(x: Vec3) -> Vec3 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn mod289_4(x: Vec4) -> Vec4 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn permute(x: Vec4) -> Vec4 {
    mod289_4((x * 34.0 + Vec4::ONE) * x)
}

fn taylor_inv_sqrt(r: Vec4) -> Vec4 {
    Vec4::splat(1.792_842_9) - r * 0.853_734_7
}

/// GLSL `step(edge, x)`: 0 where `x < edge`, 1 otherwise.
fn step(edge: f32, x: f32) -> f32 {
    if x < edge {
        0.0
    } else {
        1.0
    }
}

fn step4(edge: Vec4, x: Vec4) -> Vec4 {
    Vec4::select(x.cmplt(edge), Vec4::ZERO, Vec4::ONE)
}

/// Sample 3D simplex noise at `v`.
///
/// Returns a value in approximately `[-1, 1]`. Pure and deterministic.
pub fn snoise(v: Vec3) -> f32 {
    let i = (v + Vec3::splat(v.dot(Vec3::splat(1.0 / 3.0)))).floor();
    let x0 = v - i + Vec3::splat(i.dot(Vec3::splat(1.0 / 6.0)));

    // Ties resolve x before y before z, so each step moves along exactly one axis.
    let g = Vec3::new(
        step(x0.y, x0.x),
        step(x0.z, x0.y),
        1.0 - step(x0.z, x0.x),
    );
    let l = Vec3::ONE - g;
    let i1 = g.min(l.zxy());
    let i2 = g.max(l.zxy());

    let x1 = x0 - i1 + Vec3::splat(1.0 / 6.0);
    let x2 = x0 - i2 + Vec3::splat(1.0 / 3.0);
    let x3 = x0 - Vec3::splat(0.5);

    let i = mod289_3(i);
    let p = permute(
        permute(
            permute(Vec4::splat(i.z) + Vec4::new(0.0, i1.z, i2.z, 1.0))
                + Vec4::splat(i.y)
                + Vec4::new(0.0, i1.y, i2.y, 1.0),
        ) + Vec4::splat(i.x)
            + Vec4::new(0.0, i1.x, i2.x, 1.0),
    );

    let ns = Vec3::new(2.0 / 7.0, 0.5 / 7.0 - 1.0, 1.0 / 7.0);

    let j = p - (p * (ns.z * ns.z)).floor() * 49.0;

    let x_ = (j * ns.z).floor();
    let y_ = (j - x_ * 7.0).floor();

    let x = x_ * ns.x + Vec4::splat(ns.y);
    let y = y_ * ns.x + Vec4::splat(ns.y);
    let h = Vec4::ONE - x.abs() - y.abs();

    let b0 = Vec4::new(x.x, x.y, y.x, y.y);
    let b1 = Vec4::new(x.z, x.w, y.z, y.w);

    let s0 = b0.floor() * 2.0 + Vec4::ONE;
    let s1 = b1.floor() * 2.0 + Vec4::ONE;
    let sh = Vec4::ZERO - step4(h, Vec4::ZERO);

    let a0 = b0.xzyw() + s0.xzyw() * sh.xxyy();
    let a1 = b1.xzyw() + s1.xzyw() * sh.zzww();

    let p0 = Vec3::new(a0.x, a0.y, h.x);
    let p1 = Vec3::new(a0.z, a0.w, h.y);
    let p2 = Vec3::new(a1.x, a1.y, h.z);
    let p3 = Vec3::new(a1.z, a1.w, h.w);

    let norm = taylor_inv_sqrt(Vec4::new(p0.dot(p0), p1.dot(p1), p2.dot(p2), p3.dot(p3)));
    let p0 = p0 * norm.x;
    let p1 = p1 * norm.y;
    let p2 = p2 * norm.z;
    let p3 = p3 * norm.w;

    let m = (Vec4::splat(0.6) - Vec4::new(x0.dot(x0), x1.dot(x1), x2.dot(x2), x3.dot(x3)))
        .max(Vec4::ZERO);
    let m = m * m;
    42.0 * (m * m).dot(Vec4::new(p0.dot(x0), p1.dot(x1), p2.dot(x2), p3.dot(x3)))
}
