use crate::error::GradGraphError;
use crate::functions::scale;
use crate::optim::{check_step_shapes, Optimizer, OptimizerConfig, OptimizerKind};
use crate::tensor::{Tensor, MAX_RANK};

/// Plain stochastic gradient descent: `p -= lr * g`.
#[derive(Debug, Clone)]
pub struct Sgd {
    learning_rate: f32,
}

impl Sgd {
    pub fn new(learning_rate: f32) -> Self {
        Sgd { learning_rate }
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, param: &mut Tensor, grad: &Tensor) -> Result<(), GradGraphError> {
        check_step_shapes(param, grad, "sgd")?;
        let update = grad.map(scale(self.learning_rate))?;
        param.sub_(&update)
    }

    fn kind(&self) -> OptimizerKind {
        OptimizerKind::Sgd
    }
}

/// Gradient descent with momentum: `v = μv - lr * g`, `p += v`.
#[derive(Debug, Clone)]
pub struct Momentum {
    learning_rate: f32,
    momentum: f32,
    velocity: Tensor,
}

impl Momentum {
    pub fn new(config: &OptimizerConfig, shape: [usize; MAX_RANK]) -> Result<Self, GradGraphError> {
        Ok(Momentum {
            learning_rate: config.learning_rate,
            momentum: config.momentum,
            velocity: Tensor::zeros(shape[0], shape[1])?,
        })
    }

    pub fn velocity(&self) -> &Tensor {
        &self.velocity
    }
}

impl Optimizer for Momentum {
    fn step(&mut self, param: &mut Tensor, grad: &Tensor) -> Result<(), GradGraphError> {
        check_step_shapes(param, grad, "momentum")?;
        check_step_shapes(param, &self.velocity, "momentum")?;
        self.velocity.map_(scale(self.momentum));
        self.velocity.sub_(&grad.map(scale(self.learning_rate))?)?;
        param.add_(&self.velocity)
    }

    fn kind(&self) -> OptimizerKind {
        OptimizerKind::Momentum
    }
}

#[cfg(test)]
#[path = "sgd_test.rs"]
mod tests;
