//! Random samplers used to initialise parameters through
//! [`Tensor::map_`](crate::tensor::Tensor::map_).
//!
//! The random source is passed explicitly so that seeded generators give
//! reproducible weights.

use rand::Rng;

/// Uniform sample in `[-1, 1)`.
pub fn random_uniform<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen_range(-1.0f32..1.0f32)
}

/// Returns `x` offset by a uniform sample in `[-1, 1)`.
pub fn random_offset<R: Rng + ?Sized>(rng: &mut R, x: f32) -> f32 {
    x + random_uniform(rng)
}

/// He uniform sample: `U(-1, 1) * sqrt(6 / fan_in)`.
pub fn he_uniform<R: Rng + ?Sized>(rng: &mut R, fan_in: usize) -> f32 {
    random_uniform(rng) * (6.0 / fan_in as f32).sqrt()
}

/// Glorot/Xavier uniform sample: `U(-1, 1) * sqrt(6 / (fan_in + fan_out))`.
pub fn glorot_uniform<R: Rng + ?Sized>(rng: &mut R, fan_in: usize, fan_out: usize) -> f32 {
    random_uniform(rng) * (6.0 / (fan_in + fan_out) as f32).sqrt()
}
