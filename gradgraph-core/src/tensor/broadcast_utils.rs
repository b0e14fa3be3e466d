use crate::error::GradGraphError;
use crate::tensor::{Tensor, MAX_RANK};

/// Computes the strides with which `b` is read when broadcast onto a tensor of shape `onto`.
///
/// Broadcasting is one-directional: on every axis `b` must either match `onto` or have
/// extent 1, in which case it is read with stride 0 (replicated). `onto` itself is never
/// stretched to fit `b`.
pub(crate) fn broadcast_strides(
    onto: [usize; MAX_RANK],
    b: &Tensor,
) -> Result<[usize; MAX_RANK], GradGraphError> {
    let mut strides = [0; MAX_RANK];
    for axis in (0..MAX_RANK).rev() {
        if onto[axis] == b.shape[axis] {
            strides[axis] = b.strides[axis];
        } else if b.shape[axis] == 1 {
            strides[axis] = 0;
        } else {
            return Err(GradGraphError::BroadcastError {
                from: b.shape,
                onto,
            });
        }
    }
    Ok(strides)
}

impl Tensor {
    /// Reduces the tensor (gradient) to `target` by summing along broadcast axes.
    ///
    /// This is the counterpart of [`broadcast_strides`]: when an operand of extent 1 was
    /// replicated along an axis during a forward pass, its gradient is the sum of the
    /// upstream gradient along that axis.
    pub fn reduce_to_shape(&self, target: [usize; MAX_RANK]) -> Result<Tensor, GradGraphError> {
        let mut reduced: Option<Tensor> = None;
        for axis in 0..MAX_RANK {
            let current = reduced.as_ref().unwrap_or(self);
            if current.shape[axis] == target[axis] {
                continue;
            }
            if target[axis] != 1 {
                return Err(GradGraphError::BroadcastError {
                    from: target,
                    onto: self.shape,
                });
            }
            reduced = Some(current.sum_over_axis(axis)?);
        }
        match reduced {
            Some(t) => Ok(t),
            None => self.contiguous(),
        }
    }
}
