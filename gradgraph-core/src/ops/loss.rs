//! Loss functions. Each reduces a prediction `a` and a target `b` of identical shape to a
//! `(1, 1)` tensor, averaged over the number of rows (samples) in the batch.

use crate::error::GradGraphError;
use crate::functions::{ln, neg, scale, subtract_from};
use crate::tensor::Tensor;

fn batch_size(a: &Tensor) -> f32 {
    a.rows() as f32
}

fn ln_complement(p: f32) -> f32 {
    (1.0 - p).ln()
}

/// `Σ (a - b)² / m`
pub fn mse_forward(a: &Tensor, b: &Tensor) -> Result<Tensor, GradGraphError> {
    let mut diff = a.sub(b)?;
    diff.map_(|x| x * x);
    Ok(Tensor::scalar(diff.sum() / batch_size(a)))
}

/// `(2/m)(a - b)·g` to the prediction and its negation to the target.
pub fn mse_backward(grad: &Tensor, a: &Tensor, b: &Tensor) -> Result<Vec<Tensor>, GradGraphError> {
    let g = grad.get(0, 0)?;
    let mut grad_a = a.sub(b)?;
    grad_a.map_(scale(2.0 * g / batch_size(a)));
    let grad_b = grad_a.map(neg)?;
    Ok(vec![grad_a, grad_b])
}

/// `-(1/m) Σ b·ln(a)` for predicted probabilities `a` and target distribution `b`.
pub fn cross_entropy_forward(a: &Tensor, b: &Tensor) -> Result<Tensor, GradGraphError> {
    let mut terms = a.map(ln)?;
    terms.mul_(b)?;
    Ok(Tensor::scalar(-terms.sum() / batch_size(a)))
}

pub fn cross_entropy_backward(
    grad: &Tensor,
    a: &Tensor,
    b: &Tensor,
) -> Result<Vec<Tensor>, GradGraphError> {
    let factor = -grad.get(0, 0)? / batch_size(a);
    let mut grad_a = b.div(a)?;
    grad_a.map_(scale(factor));
    let mut grad_b = a.map(ln)?;
    grad_b.map_(scale(factor));
    Ok(vec![grad_a, grad_b])
}

/// `-(1/m) Σ [b·ln(a) + (1 - b)·ln(1 - a)]`
pub fn binary_cross_entropy_forward(a: &Tensor, b: &Tensor) -> Result<Tensor, GradGraphError> {
    let mut terms = a.map(ln)?;
    terms.mul_(b)?;
    let mut complement = a.map(ln_complement)?;
    complement.mul_(&b.map(subtract_from(1.0))?)?;
    terms.add_(&complement)?;
    Ok(Tensor::scalar(-terms.sum() / batch_size(a)))
}

/// `(a - b) / (a(1 - a)m)·g` to the prediction, `-(ln a - ln(1 - a))/m·g` to the target.
pub fn binary_cross_entropy_backward(
    grad: &Tensor,
    a: &Tensor,
    b: &Tensor,
) -> Result<Vec<Tensor>, GradGraphError> {
    let g = grad.get(0, 0)?;
    let m = batch_size(a);

    let mut grad_a = a.sub(b)?;
    grad_a.div_(&a.map(|p| p * (1.0 - p))?)?;
    grad_a.map_(scale(g / m));

    let mut grad_b = a.map(ln)?;
    grad_b.sub_(&a.map(ln_complement)?)?;
    grad_b.map_(scale(-g / m));
    Ok(vec![grad_a, grad_b])
}
