// src/tensor/mod.rs

use crate::error::GradGraphError;
use std::sync::{Arc, RwLock};

pub mod broadcast_utils;
pub mod create;
mod arithmetic_methods;
mod debug;
mod linalg_methods;
mod reduction_methods;

pub use create::{full, zeros};

#[cfg(test)]
mod arithmetic_methods_test;
#[cfg(test)]
mod create_test;

/// Maximum tensor rank. Scalars are `(1, 1)`, row vectors `(1, n)`, column vectors `(m, 1)`.
pub const MAX_RANK: usize = 2;

/// A leaf tensor owned by the caller and shared with one or more graphs.
///
/// Parameters (weights, biases) live behind this handle so that they outlive the
/// graphs built around them and can be updated between passes.
pub type SharedTensor = Arc<RwLock<Tensor>>;

/// Dense single-precision matrix with shape and stride metadata.
///
/// The buffer holds exactly `rows * cols` elements and is exclusively owned by this
/// value. Element `(i, j)` lives at `i * strides[0] + j * strides[1]`. Strides are
/// row-major unless the tensor has been flipped in place with [`Tensor::transpose_`],
/// in which case the same buffer is read through swapped axes.
#[derive(Debug, Clone)]
pub struct Tensor {
    pub(crate) shape: [usize; MAX_RANK],
    pub(crate) strides: [usize; MAX_RANK],
    pub(crate) data: Vec<f32>,
}

impl Tensor {
    /// Returns the `(rows, cols)` shape.
    pub fn shape(&self) -> [usize; MAX_RANK] {
        self.shape
    }

    /// Returns the per-axis element steps.
    pub fn strides(&self) -> [usize; MAX_RANK] {
        self.strides
    }

    pub fn rows(&self) -> usize {
        self.shape[0]
    }

    pub fn cols(&self) -> usize {
        self.shape[1]
    }

    /// Returns the number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.shape[0] * self.shape[1]
    }

    /// Checks if the tensor is laid out row-major.
    pub fn is_contiguous(&self) -> bool {
        self.strides == [self.shape[1], 1]
    }

    #[inline]
    pub(crate) fn offset(&self, i: usize, j: usize) -> usize {
        i * self.strides[0] + j * self.strides[1]
    }

    /// Reads element `(i, j)` through the tensor's strides.
    pub fn get(&self, i: usize, j: usize) -> Result<f32, GradGraphError> {
        self.check_index(i, j)?;
        Ok(self.data[self.offset(i, j)])
    }

    /// Writes element `(i, j)` through the tensor's strides.
    pub fn set_at(&mut self, i: usize, j: usize, value: f32) -> Result<(), GradGraphError> {
        self.check_index(i, j)?;
        let idx = self.offset(i, j);
        self.data[idx] = value;
        Ok(())
    }

    fn check_index(&self, i: usize, j: usize) -> Result<(), GradGraphError> {
        if i >= self.shape[0] || j >= self.shape[1] {
            return Err(GradGraphError::IndexOutOfBounds {
                index: [i, j],
                shape: self.shape,
            });
        }
        Ok(())
    }

    /// Returns the elements in logical row-major order, honouring strides.
    pub fn to_vec(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.numel());
        for i in 0..self.shape[0] {
            for j in 0..self.shape[1] {
                out.push(self.data[self.offset(i, j)]);
            }
        }
        out
    }

    /// Raw access to the underlying buffer, in storage order.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Mutable raw access to the underlying buffer, in storage order.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Wraps the tensor into a [`SharedTensor`] handle.
    pub fn into_shared(self) -> SharedTensor {
        Arc::new(RwLock::new(self))
    }
}

/// Two tensors are equal when they have the same shape and the same elements read
/// through their respective strides. A transposed view equals its physical copy.
impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        if self.shape != other.shape {
            return false;
        }
        (0..self.shape[0]).all(|i| {
            (0..self.shape[1]).all(|j| self.data[self.offset(i, j)] == other.data[other.offset(i, j)])
        })
    }
}
