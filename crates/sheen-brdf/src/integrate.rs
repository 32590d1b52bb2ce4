//! Monte-Carlo estimation of the split-sum specular terms.
//!
//! For a view direction `V` around the fixed normal `N = +Z` the environment
//! BRDF factors into `F0 * A + B`. Both terms are estimated by importance
//! sampling GGX half vectors with a Hammersley sequence:
//!
//! ```text
//! A = 1/N * sum (1 - Fc) * G_Vis      B = 1/N * sum Fc * G_Vis
//! Fc = (1 - V.H)^5                    G_Vis = G * V.H / (N.H * N.V)
//! ```

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use sheen_core::constants::{BASE_SAMPLE_COUNT, DENOM_EPSILON, MIN_SAMPLE_SCALE};
use sheen_core::math::{
    fresnel_weight, hammersley, hammersley_rotated, importance_sample_ggx, lut_view_vector,
    reflect_about, seed_offset,
};

/// Scale (`a`) and bias (`b`) of the split-sum approximation for one texel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct SplitSum {
    pub a: f32,
    pub b: f32,
}

impl SplitSum {
    /// No reflectance.
    pub const ZERO: Self = Self { a: 0.0, b: 0.0 };

    /// Total directional albedo `a + b` (the reflectance at `F0 = 1`).
    #[inline]
    pub fn total(self) -> f32 {
        self.a + self.b
    }
}

/// Which low-discrepancy point set drives the integration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SampleSequence {
    /// Plain Hammersley points; fully deterministic per sample count.
    #[default]
    Hammersley,
    /// Hammersley points with a seed-derived toroidal shift.
    Rotated { seed: u32 },
}

impl SampleSequence {
    fn offset(self) -> Option<Vec2> {
        match self {
            Self::Hammersley => None,
            Self::Rotated { seed } => Some(seed_offset(seed)),
        }
    }
}

/// Number of samples for a texel whose green channel holds `scale`.
pub fn sample_count_for_scale(scale: f32) -> u32 {
    let scale = if scale.is_nan() {
        MIN_SAMPLE_SCALE
    } else {
        scale.max(MIN_SAMPLE_SCALE)
    };
    ((BASE_SAMPLE_COUNT as f32 * scale).round() as u32).max(1)
}

/// Visibility term `G * V.H / (N.H * N.V)`, or `None` when a denominator vanishes.
#[inline]
pub fn visibility(n_dot_v: f32, n_dot_l: f32, n_dot_h: f32, v_dot_h: f32) -> Option<f32> {
    if v_dot_h <= DENOM_EPSILON || n_dot_h <= DENOM_EPSILON || n_dot_v <= DENOM_EPSILON {
        return None;
    }
    let g = 1.0f32
        .min(2.0 * n_dot_h * n_dot_v / v_dot_h)
        .min(2.0 * n_dot_h * n_dot_l / v_dot_h);
    Some(g * v_dot_h / (n_dot_h * n_dot_v))
}

/// Estimates the split-sum terms for `view`.
///
/// `view` need not be unit length; `view.z` is used as N·V.
pub fn integrate_split_sum(
    view: Vec3,
    roughness: f32,
    sample_count: u32,
    sequence: SampleSequence,
) -> SplitSum {
    if sample_count == 0 {
        return SplitSum::ZERO;
    }

    let normal = Vec3::Z;
    let roughness = roughness.clamp(0.0, 1.0);
    let n_dot_v = view.z.max(0.0);
    let offset = sequence.offset();

    let mut a = 0.0f32;
    let mut b = 0.0f32;

    for i in 0..sample_count {
        let xi = match offset {
            Some(offset) => hammersley_rotated(i, sample_count, offset),
            None => hammersley(i, sample_count),
        };
        let h = importance_sample_ggx(xi, normal, roughness);
        let l = reflect_about(view, h);

        let n_dot_l = l.z.max(0.0);
        if n_dot_l <= 0.0 {
            continue;
        }
        let n_dot_h = h.z.max(0.0);
        let v_dot_h = view.dot(h).max(0.0);

        if let Some(g_vis) = visibility(n_dot_v, n_dot_l, n_dot_h, v_dot_h) {
            let fc = fresnel_weight(v_dot_h);
            a += (1.0 - fc) * g_vis;
            b += fc * g_vis;
        }
    }

    SplitSum {
        a: a / sample_count as f32,
        b: b / sample_count as f32,
    }
}

/// Estimates the texel at LUT coordinates `(u, v)`.
///
/// Texels whose `v` falls outside `[0, 1]` have no valid view and store zero.
pub fn integrate_texel(
    u: f32,
    v: f32,
    roughness: f32,
    sample_count: u32,
    sequence: SampleSequence,
) -> SplitSum {
    lut_view_vector(u, v).map_or(SplitSum::ZERO, |view| {
        integrate_split_sum(view, roughness, sample_count, sequence)
    })
}
