//! Sampling math for split-sum BRDF integration.

use std::f32::consts::PI;

use glam::{Vec2, Vec3};

/// Van der Corput radical inverse in base 2.
///
/// Mirrors the bit-twiddling version found in most GLSL LUT shaders, so CPU
/// and GPU generators produce the same sample points.
#[inline]
pub fn radical_inverse_vdc(bits: u32) -> f32 {
    bits.reverse_bits() as f32 * 2.328_306_4e-10
}

/// The `i`-th point of an `n`-point Hammersley set.
#[inline]
pub fn hammersley(i: u32, n: u32) -> Vec2 {
    Vec2::new(i as f32 / n as f32, radical_inverse_vdc(i))
}

/// Hammersley point shifted by a toroidal offset (Cranley-Patterson rotation).
#[inline]
pub fn hammersley_rotated(i: u32, n: u32, offset: Vec2) -> Vec2 {
    let p = hammersley(i, n) + offset;
    p - p.floor()
}

/// Integer hash (PCG output permutation) used to derive sequence offsets from seeds.
#[inline]
pub const fn hash_u32(value: u32) -> u32 {
    let state = value.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
    let word = ((state >> ((state >> 28) + 4)) ^ state).wrapping_mul(277_803_737);
    (word >> 22) ^ word
}

/// Maps a seed to a 2-D offset in `[0, 1)^2`.
pub fn seed_offset(seed: u32) -> Vec2 {
    let x = hash_u32(seed);
    let y = hash_u32(x ^ 0x9e37_79b9);
    Vec2::new(
        (x >> 8) as f32 / (1u32 << 24) as f32,
        (y >> 8) as f32 / (1u32 << 24) as f32,
    )
}

/// Importance-samples a GGX half vector around `n`.
///
/// `roughness` is perceptual; the lobe width is `alpha = roughness^2`.
/// A roughness of 0 returns `n` exactly (mirror lobe).
pub fn importance_sample_ggx(xi: Vec2, n: Vec3, roughness: f32) -> Vec3 {
    let a = roughness * roughness;

    let phi = 2.0 * PI * xi.x;
    let denom = 1.0 + (a * a - 1.0) * xi.y;
    let cos_theta = if denom > 0.0 {
        ((1.0 - xi.y) / denom).sqrt().clamp(0.0, 1.0)
    } else {
        1.0
    };
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

    let h = Vec3::new(phi.cos() * sin_theta, phi.sin() * sin_theta, cos_theta);

    let up = if n.z.abs() < 0.999 { Vec3::Z } else { Vec3::X };
    let tangent = up.cross(n).normalize();
    let bitangent = n.cross(tangent);

    (tangent * h.x + bitangent * h.y + n * h.z).normalize()
}

/// View vector for LUT coordinates `(u, v)`: `(sqrt(1 - v) cos 2πu, sqrt(1 - v) sin 2πu, v)`.
///
/// The result is not normalized; its z component is `v` exactly.
///
/// Returns `None` when `v` lies outside `[0, 1]`; such texels have no valid view.
pub fn lut_view_vector(u: f32, v: f32) -> Option<Vec3> {
    if !(0.0..=1.0).contains(&v) {
        return None;
    }
    let s = (1.0 - v).sqrt();
    let angle = 2.0 * PI * u;
    Some(Vec3::new(s * angle.cos(), s * angle.sin(), v))
}

/// Reflects `v` about the half vector `h`.
#[inline]
pub fn reflect_about(v: Vec3, h: Vec3) -> Vec3 {
    2.0 * v.dot(h) * h - v
}

/// Schlick Fresnel weight `(1 - cos)^5`.
#[inline]
pub fn fresnel_weight(v_dot_h: f32) -> f32 {
    (1.0 - v_dot_h).powi(5)
}
