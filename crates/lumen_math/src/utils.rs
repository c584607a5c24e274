//! Scalar helpers shared by the geometry kernel and the renderer.
//!
//! Epsilon-aware comparisons, the Halton low-discrepancy sequence, the
//! packed-pixel incremental average and the Fresnel term.

use crate::Vec3;

/// Minimum hit distance accepted by primitive intersection tests.
pub const EPSILON_LARGE: f32 = 1.0e-05;

/// Tolerance used by [`equal`] and the tangent-ray test.
pub const EPSILON: f32 = 1.0e-06;

/// Distance of an intersection record that has not hit anything yet.
pub const RAY_LENGTH_MAX: f32 = 1.0e+30;

/// Bounce depth after which path termination by Russian roulette may start.
pub const RAY_DEPTH_MIN: u32 = 1;

/// Hard limit on bounce depth.
pub const RAY_DEPTH_MAX: u32 = 6;

/// Returns true if two floats differ by less than [`EPSILON`].
#[inline]
pub fn equal(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Component-wise [`equal`] for vectors.
#[inline]
pub fn equal_vec3(a: Vec3, b: Vec3) -> bool {
    equal(a.x, b.x) && equal(a.y, b.y) && equal(a.z, b.z)
}

/// The `index`-th value of the Halton sequence in the given base.
///
/// Index 0 maps to 0.0, so a table filled with indices `0..n` for `n` a power
/// of two holds every multiple of `1/n` exactly once.
pub fn halton_sequence(mut index: u32, base: u32) -> f32 {
    let mut fraction = 1.0f32;
    let mut value = 0.0f32;
    while index > 0 {
        fraction /= base as f32;
        value += fraction * (index % base) as f32;
        index /= base;
    }
    value
}

/// Folds a new radiance sample into a packed `0xAABBGGRR` pixel.
///
/// Each 8-bit channel is updated with the exact integer running mean
/// `((n - 1) * old + new) / n` and saturated at 255; alpha is forced opaque.
/// `num_sample` is the 1-based count including the new sample.
pub fn incremental_avg(sample: Vec3, avg: u32, num_sample: u32) -> u32 {
    let n = u64::from(num_sample.max(1));

    let channel = |shift: u32, value: f32| -> u32 {
        let last = u64::from((avg >> shift) & 0xFF);
        // float -> int casts saturate, NaN becomes 0
        let new = u64::from(((value * 255.0) as u32).min(255));
        let current = ((n - 1) * last + new) / n;
        current.min(255) as u32
    };

    let red = channel(0, sample.x);
    let green = channel(8, sample.y);
    let blue = channel(16, sample.z);

    0xFF00_0000 | (blue << 16) | (green << 8) | red
}

/// Fresnel reflectance for an incident direction `i` on a surface with
/// normal `n` and index of refraction `ior`.
///
/// Returns 1.0 on total internal reflection.
pub fn fresnel(i: Vec3, n: Vec3, ior: f32) -> f32 {
    let mut cos_i = i.dot(n).clamp(-1.0, 1.0);
    let (eta_i, eta_t) = if cos_i > 0.0 { (ior, 1.0) } else { (1.0, ior) };
    let sin_t = eta_i / eta_t * (1.0 - cos_i * cos_i).max(0.0).sqrt();
    if sin_t >= 1.0 {
        return 1.0;
    }
    let cos_t = (1.0 - sin_t * sin_t).max(0.0).sqrt();
    cos_i = cos_i.abs();
    let rs = ((eta_t * cos_i) - (eta_i * cos_t)) / ((eta_t * cos_i) + (eta_i * cos_t));
    let rp = ((eta_i * cos_i) - (eta_t * cos_t)) / ((eta_i * cos_i) + (eta_t * cos_t));
    (rs * rs + rp * rp) / 2.0
}
