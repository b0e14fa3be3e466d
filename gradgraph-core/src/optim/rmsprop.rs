use crate::error::GradGraphError;
use crate::functions::{power, scale, shift, square};
use crate::optim::{check_step_shapes, Optimizer, OptimizerConfig, OptimizerKind};
use crate::tensor::{Tensor, MAX_RANK};

/// RMSProp: `s = ρs + (1 - ρ)g²`, `p -= lr * g / (√s + ε)`.
#[derive(Debug, Clone)]
pub struct RmsProp {
    learning_rate: f32,
    decay: f32,
    epsilon: f32,
    mean_square: Tensor,
}

impl RmsProp {
    pub fn new(config: &OptimizerConfig, shape: [usize; MAX_RANK]) -> Result<Self, GradGraphError> {
        Ok(RmsProp {
            learning_rate: config.learning_rate,
            decay: config.rms_decay,
            epsilon: config.epsilon,
            mean_square: Tensor::zeros(shape[0], shape[1])?,
        })
    }

    pub fn mean_square(&self) -> &Tensor {
        &self.mean_square
    }
}

impl Optimizer for RmsProp {
    fn step(&mut self, param: &mut Tensor, grad: &Tensor) -> Result<(), GradGraphError> {
        check_step_shapes(param, grad, "rmsprop")?;
        check_step_shapes(param, &self.mean_square, "rmsprop")?;

        let mut fresh = grad.map(square)?;
        fresh.map_(scale(1.0 - self.decay));
        self.mean_square.map_(scale(self.decay));
        self.mean_square.add_(&fresh)?;

        let mut denom = self.mean_square.map(power(0.5))?;
        denom.map_(shift(self.epsilon));
        let mut update = grad.map(scale(self.learning_rate))?;
        update.div_(&denom)?;
        param.sub_(&update)
    }

    fn kind(&self) -> OptimizerKind {
        OptimizerKind::RmsProp
    }
}

#[cfg(test)]
#[path = "rmsprop_test.rs"]
mod tests;
