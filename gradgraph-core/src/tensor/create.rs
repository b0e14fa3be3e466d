// src/tensor/create.rs

use crate::error::GradGraphError;
use crate::tensor::Tensor;

/// Allocates a buffer of `len` elements set to `value`, reporting allocation failure
/// instead of aborting the process.
pub(crate) fn alloc_buffer(len: usize, value: f32) -> Result<Vec<f32>, GradGraphError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| GradGraphError::AllocationFailure { elements: len })?;
    buffer.resize(len, value);
    Ok(buffer)
}

fn checked_numel(rows: usize, cols: usize) -> Result<usize, GradGraphError> {
    if rows == 0 || cols == 0 {
        return Err(GradGraphError::InvalidShape { rows, cols });
    }
    rows.checked_mul(cols)
        .ok_or(GradGraphError::AllocationFailure { elements: usize::MAX })
}

/// Creates a new zero-filled `(rows, cols)` tensor.
pub fn zeros(rows: usize, cols: usize) -> Result<Tensor, GradGraphError> {
    full(rows, cols, 0.0)
}

/// Creates a new `(rows, cols)` tensor with every element set to `value`.
pub fn full(rows: usize, cols: usize, value: f32) -> Result<Tensor, GradGraphError> {
    let numel = checked_numel(rows, cols)?;
    Ok(Tensor {
        shape: [rows, cols],
        strides: [cols, 1],
        data: alloc_buffer(numel, value)?,
    })
}

impl Tensor {
    /// Creates a tensor from row-major data.
    ///
    /// # Arguments
    /// * `data` - The elements, row after row. Its length must equal `rows * cols`.
    /// * `rows`, `cols` - The extents, both non-zero.
    pub fn new(data: Vec<f32>, rows: usize, cols: usize) -> Result<Self, GradGraphError> {
        let numel = checked_numel(rows, cols)?;
        if data.len() != numel {
            return Err(GradGraphError::InvalidArgument(format!(
                "data length {} does not match shape ({}, {})",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Tensor {
            shape: [rows, cols],
            strides: [cols, 1],
            data,
        })
    }

    /// Creates a zero-filled tensor. See [`zeros`].
    pub fn zeros(rows: usize, cols: usize) -> Result<Self, GradGraphError> {
        zeros(rows, cols)
    }

    /// Creates a tensor filled with `value`. See [`full`].
    pub fn full(rows: usize, cols: usize, value: f32) -> Result<Self, GradGraphError> {
        full(rows, cols, value)
    }

    /// Creates a `(1, 1)` tensor.
    pub fn scalar(value: f32) -> Self {
        Tensor {
            shape: [1, 1],
            strides: [1, 1],
            data: vec![value],
        }
    }

    /// Builds a tensor from a slice of equally sized rows.
    pub fn from_rows(rows: &[&[f32]]) -> Result<Self, GradGraphError> {
        let cols = rows.first().map_or(0, |r| r.len());
        if rows.iter().any(|r| r.len() != cols) {
            return Err(GradGraphError::InvalidArgument(
                "rows of unequal length".to_string(),
            ));
        }
        Tensor::new(rows.concat(), rows.len(), cols)
    }

    /// Creates a zero-filled tensor with the same shape as `self`.
    pub fn zeros_like(&self) -> Result<Self, GradGraphError> {
        zeros(self.shape[0], self.shape[1])
    }

    /// Returns a row-major copy of the tensor, dropping any transposed view.
    pub fn contiguous(&self) -> Result<Self, GradGraphError> {
        let mut data = alloc_buffer(self.numel(), 0.0)?;
        let cols = self.shape[1];
        for i in 0..self.shape[0] {
            for j in 0..cols {
                data[i * cols + j] = self.data[self.offset(i, j)];
            }
        }
        Ok(Tensor {
            shape: self.shape,
            strides: [cols, 1],
            data,
        })
    }
}
