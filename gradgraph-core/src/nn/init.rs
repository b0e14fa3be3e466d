use crate::error::GradGraphError;
use crate::functions::{glorot_uniform, he_uniform, random_uniform};
use crate::tensor::Tensor;
use rand::Rng;

/// Parameter initialisation scheme. The discriminant is the stable checkpoint code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Initialization {
    #[default]
    He = 0,
    Glorot = 1,
    RandomUniform = 2,
}

impl Initialization {
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Option<Initialization> {
        match code {
            0 => Some(Initialization::He),
            1 => Some(Initialization::Glorot),
            2 => Some(Initialization::RandomUniform),
            _ => None,
        }
    }
}

/// Overwrites every element of `tensor` with a sample drawn according to `init`.
///
/// # Arguments
/// * `tensor` - Tensor to fill in place.
/// * `init` - Sampling scheme.
/// * `fan_in`, `fan_out` - Layer extents used by He and Glorot scaling.
/// * `rng` - Random source.
pub fn initialize_<R: Rng + ?Sized>(
    tensor: &mut Tensor,
    init: Initialization,
    fan_in: usize,
    fan_out: usize,
    rng: &mut R,
) -> Result<(), GradGraphError> {
    if fan_in == 0 || fan_out == 0 {
        return Err(GradGraphError::InvalidShape {
            rows: fan_in,
            cols: fan_out,
        });
    }
    match init {
        Initialization::He => tensor.map_(|_| he_uniform(rng, fan_in)),
        Initialization::Glorot => tensor.map_(|_| glorot_uniform(rng, fan_in, fan_out)),
        Initialization::RandomUniform => tensor.map_(|_| random_uniform(rng)),
    }
    Ok(())
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
