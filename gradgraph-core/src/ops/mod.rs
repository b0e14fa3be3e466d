//! # Operation Table
//!
//! Forward and backward evaluators for every [`NodeKind`], dispatched by pattern match.
//! Adding an operation means extending [`NodeKind`] (code, arity, shape rule) and the two
//! dispatch functions below.

pub mod activation;
pub mod arithmetic;
pub mod linalg;
pub mod loss;

use crate::error::GradGraphError;
use crate::graph::NodeKind;
use crate::tensor::Tensor;

#[cfg(test)]
mod linalg_test;
#[cfg(test)]
mod loss_test;

fn second<'a>(kind: NodeKind, b: Option<&'a Tensor>) -> Result<&'a Tensor, GradGraphError> {
    b.ok_or(GradGraphError::ArityMismatch {
        kind,
        expected: 2,
        actual: 1,
    })
}

/// Evaluates `kind` on the operands' current values.
pub fn forward(kind: NodeKind, a: &Tensor, b: Option<&Tensor>) -> Result<Tensor, GradGraphError> {
    match kind {
        NodeKind::Data => a.contiguous(),
        NodeKind::Transpose => a.transpose(),
        NodeKind::Contract => a.contract(second(kind, b)?),
        NodeKind::Add => a.add(second(kind, b)?),
        NodeKind::Sub => a.sub(second(kind, b)?),
        NodeKind::Mul => a.mul(second(kind, b)?),
        NodeKind::Div => a.div(second(kind, b)?),
        NodeKind::Sigmoid => activation::sigmoid_forward(a),
        NodeKind::Relu => activation::relu_forward(a),
        NodeKind::LeakyRelu => activation::leaky_relu_forward(a),
        NodeKind::Tanh => activation::tanh_forward(a),
        NodeKind::Softmax => activation::softmax_forward(a),
        NodeKind::Mse => loss::mse_forward(a, second(kind, b)?),
        NodeKind::CrossEntropy => loss::cross_entropy_forward(a, second(kind, b)?),
        NodeKind::BinaryCrossEntropy => loss::binary_cross_entropy_forward(a, second(kind, b)?),
    }
}

/// Computes the sensitivity of each operand, in operand order, given the node's
/// gradient `grad` and forward value `output`.
///
/// The results are shaped like their operands and are meant to be added into the
/// operands' gradient buffers.
pub fn backward(
    kind: NodeKind,
    grad: &Tensor,
    output: &Tensor,
    a: &Tensor,
    b: Option<&Tensor>,
) -> Result<Vec<Tensor>, GradGraphError> {
    match kind {
        NodeKind::Data => Ok(Vec::new()),
        NodeKind::Transpose => linalg::transpose_backward(grad),
        NodeKind::Contract => linalg::contract_backward(grad, a, second(kind, b)?),
        NodeKind::Add => arithmetic::add_backward(grad, a, second(kind, b)?),
        NodeKind::Sub => arithmetic::sub_backward(grad, a, second(kind, b)?),
        NodeKind::Mul => arithmetic::mul_backward(grad, a, second(kind, b)?),
        NodeKind::Div => arithmetic::div_backward(grad, a, second(kind, b)?),
        NodeKind::Sigmoid => activation::sigmoid_backward(grad, output),
        NodeKind::Relu => activation::relu_backward(grad, output),
        NodeKind::LeakyRelu => activation::leaky_relu_backward(grad, output),
        NodeKind::Tanh => activation::tanh_backward(grad, output),
        NodeKind::Softmax => activation::softmax_backward(grad, output),
        NodeKind::Mse => loss::mse_backward(grad, a, second(kind, b)?),
        NodeKind::CrossEntropy => loss::cross_entropy_backward(grad, a, second(kind, b)?),
        NodeKind::BinaryCrossEntropy => {
            loss::binary_cross_entropy_backward(grad, a, second(kind, b)?)
        }
    }
}
