//! Backward formulas for element-wise binary operations.
//!
//! The second operand may have been broadcast onto the first during the forward pass,
//! so its sensitivity is summed back down to its own shape.

use crate::error::GradGraphError;
use crate::functions::neg;
use crate::tensor::Tensor;

/// `d(a + b)`: `g` to both operands.
pub fn add_backward(grad: &Tensor, _a: &Tensor, b: &Tensor) -> Result<Vec<Tensor>, GradGraphError> {
    Ok(vec![grad.contiguous()?, grad.reduce_to_shape(b.shape())?])
}

/// `d(a - b)`: `g` to the first operand, `-g` to the second.
pub fn sub_backward(grad: &Tensor, _a: &Tensor, b: &Tensor) -> Result<Vec<Tensor>, GradGraphError> {
    let grad_b = grad.map(neg)?.reduce_to_shape(b.shape())?;
    Ok(vec![grad.contiguous()?, grad_b])
}

/// `d(a * b)`: `g * b` to the first operand, `g * a` to the second.
pub fn mul_backward(grad: &Tensor, a: &Tensor, b: &Tensor) -> Result<Vec<Tensor>, GradGraphError> {
    let grad_a = grad.mul(b)?;
    let grad_b = grad.mul(a)?.reduce_to_shape(b.shape())?;
    Ok(vec![grad_a, grad_b])
}

/// `d(a / b)`: `g / b` to the first operand, `-g * a / b²` to the second.
pub fn div_backward(grad: &Tensor, a: &Tensor, b: &Tensor) -> Result<Vec<Tensor>, GradGraphError> {
    let grad_a = grad.div(b)?;
    let mut grad_b = grad.mul(a)?;
    grad_b.div_(b)?;
    grad_b.div_(b)?;
    grad_b.map_(neg);
    Ok(vec![grad_a, grad_b.reduce_to_shape(b.shape())?])
}
