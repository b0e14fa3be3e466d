use crate::error::GradGraphError;
use crate::tensor::Tensor;

/// `d(a · b)`: `g · bᵀ` to the first operand, `aᵀ · g` to the second.
pub fn contract_backward(grad: &Tensor, a: &Tensor, b: &Tensor) -> Result<Vec<Tensor>, GradGraphError> {
    let b_t = b.transpose()?;
    let a_t = a.transpose()?;
    Ok(vec![grad.contract(&b_t)?, a_t.contract(grad)?])
}

/// `d(aᵀ)`: `gᵀ`.
pub fn transpose_backward(grad: &Tensor) -> Result<Vec<Tensor>, GradGraphError> {
    Ok(vec![grad.transpose()?])
}
