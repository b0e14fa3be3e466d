//! Forward and backward evaluators for activations.
//!
//! Backward formulas use the output-based derivatives on the cached forward value `d`.

use crate::error::GradGraphError;
use crate::functions::{
    exp, leaky_relu, leaky_relu_odx, relu, relu_odx, sigmoid, sigmoid_odx, tanh, tanh_odx,
};
use crate::tensor::Tensor;

/// Row-wise softmax, shifted by the row maximum.
pub fn softmax_forward(a: &Tensor) -> Result<Tensor, GradGraphError> {
    let row_max = a.max_over_axis(1)?;
    let mut out = a.sub(&row_max)?;
    out.map_(exp);
    let row_sum = out.sum_over_axis(1)?;
    out.div_(&row_sum)?;
    Ok(out)
}

/// `g * f'(d)` with `f'` given in terms of the output.
fn local_backward<F>(grad: &Tensor, output: &Tensor, odx: F) -> Result<Vec<Tensor>, GradGraphError>
where
    F: Fn(f32) -> f32,
{
    let mut local = output.map(odx)?;
    local.mul_(grad)?;
    Ok(vec![local])
}

pub fn sigmoid_backward(grad: &Tensor, output: &Tensor) -> Result<Vec<Tensor>, GradGraphError> {
    local_backward(grad, output, sigmoid_odx)
}

pub fn relu_backward(grad: &Tensor, output: &Tensor) -> Result<Vec<Tensor>, GradGraphError> {
    local_backward(grad, output, relu_odx)
}

pub fn leaky_relu_backward(grad: &Tensor, output: &Tensor) -> Result<Vec<Tensor>, GradGraphError> {
    local_backward(grad, output, leaky_relu_odx)
}

pub fn tanh_backward(grad: &Tensor, output: &Tensor) -> Result<Vec<Tensor>, GradGraphError> {
    local_backward(grad, output, tanh_odx)
}

/// Jacobian-vector product of a row-wise softmax: `y ⊙ (g - Σ_row(g ⊙ y))`.
pub fn softmax_backward(grad: &Tensor, output: &Tensor) -> Result<Vec<Tensor>, GradGraphError> {
    let weighted = grad.mul(output)?;
    let row_sum = weighted.sum_over_axis(1)?;
    let mut local = grad.sub(&row_sum)?;
    local.mul_(output)?;
    Ok(vec![local])
}

pub(crate) fn sigmoid_forward(a: &Tensor) -> Result<Tensor, GradGraphError> {
    a.map(sigmoid)
}

pub(crate) fn relu_forward(a: &Tensor) -> Result<Tensor, GradGraphError> {
    a.map(relu)
}

pub(crate) fn leaky_relu_forward(a: &Tensor) -> Result<Tensor, GradGraphError> {
    a.map(leaky_relu)
}

pub(crate) fn tanh_forward(a: &Tensor) -> Result<Tensor, GradGraphError> {
    a.map(tanh)
}
