use crate::error::GradGraphError;
use crate::functions::{divide_by, power, scale, shift, square};
use crate::optim::{check_step_shapes, Optimizer, OptimizerConfig, OptimizerKind};
use crate::tensor::{Tensor, MAX_RANK};

/// Adam with bias-corrected first and second moment estimates.
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    /// First moment (moving average of gradients).
    m: Tensor,
    /// Second moment (moving average of squared gradients).
    v: Tensor,
    iterations: u64,
}

impl Adam {
    pub fn new(config: &OptimizerConfig, shape: [usize; MAX_RANK]) -> Result<Self, GradGraphError> {
        Ok(Adam {
            learning_rate: config.learning_rate,
            beta1: config.beta1,
            beta2: config.beta2,
            epsilon: config.epsilon,
            m: Tensor::zeros(shape[0], shape[1])?,
            v: Tensor::zeros(shape[0], shape[1])?,
            iterations: 0,
        })
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}

impl Optimizer for Adam {
    fn step(&mut self, param: &mut Tensor, grad: &Tensor) -> Result<(), GradGraphError> {
        check_step_shapes(param, grad, "adam")?;
        check_step_shapes(param, &self.m, "adam")?;
        self.iterations += 1;
        let t = self.iterations.min(i32::MAX as u64) as i32;

        self.m.map_(scale(self.beta1));
        self.m.add_(&grad.map(scale(1.0 - self.beta1))?)?;

        let mut g2 = grad.map(square)?;
        g2.map_(scale(1.0 - self.beta2));
        self.v.map_(scale(self.beta2));
        self.v.add_(&g2)?;

        let bias_correction1 = 1.0 - self.beta1.powi(t);
        let bias_correction2 = 1.0 - self.beta2.powi(t);

        let mut denom = self.v.map(divide_by(bias_correction2))?;
        denom.map_(power(0.5));
        denom.map_(shift(self.epsilon));
        let mut update = self.m.map(scale(self.learning_rate / bias_correction1))?;
        update.div_(&denom)?;
        param.sub_(&update)
    }

    fn kind(&self) -> OptimizerKind {
        OptimizerKind::Adam
    }
}

#[cfg(test)]
#[path = "adam_test.rs"]
mod tests;
