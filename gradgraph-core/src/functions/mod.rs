//! # Element-wise Function Library
//!
//! Pure scalar functions passed to [`Tensor::map`](crate::tensor::Tensor::map) and its
//! in-place variants. Forward evaluators use the activations, backward evaluators use
//! their derivatives, and optimizers combine the arithmetic helpers into update rules.

pub mod activation;
pub mod init;
pub mod math;

pub use activation::*;
pub use init::{glorot_uniform, he_uniform, random_offset, random_uniform};
pub use math::*;

#[cfg(test)]
mod functions_test;
