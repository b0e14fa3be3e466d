//! # Optimizers
//!
//! Update rules applied to a layer's parameters after [`Graph::trace`](crate::graph::Graph::trace).
//! Every optimizer instance owns the state for exactly one parameter tensor.

pub mod adam;
pub mod rmsprop;
pub mod sgd;

pub use adam::Adam;
pub use rmsprop::RmsProp;
pub use sgd::{Momentum, Sgd};

use crate::error::GradGraphError;
use crate::tensor::{Tensor, MAX_RANK};
use std::fmt::Debug;

/// Per-parameter update rule.
pub trait Optimizer: Debug + Send + Sync {
    /// Updates `param` in place from its gradient.
    ///
    /// # Arguments
    /// * `param` - The parameter tensor.
    /// * `grad` - Gradient of the loss with respect to `param`; must have the same shape.
    fn step(&mut self, param: &mut Tensor, grad: &Tensor) -> Result<(), GradGraphError>;

    fn kind(&self) -> OptimizerKind;
}

/// Hyperparameters shared by all optimizers. Each optimizer reads only the fields it needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerConfig {
    pub learning_rate: f32,
    pub momentum: f32,
    pub rms_decay: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            learning_rate: 0.01,
            momentum: 0.9,
            rms_decay: 0.9,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

impl OptimizerConfig {
    /// Default hyperparameters with the given learning rate.
    pub fn with_learning_rate(learning_rate: f32) -> Self {
        OptimizerConfig {
            learning_rate,
            ..OptimizerConfig::default()
        }
    }

    pub fn validate(&self) -> Result<(), GradGraphError> {
        if !(self.learning_rate > 0.0) {
            return Err(GradGraphError::InvalidArgument(
                "learning rate must be positive".to_string(),
            ));
        }
        for (name, value) in [
            ("momentum", self.momentum),
            ("rms_decay", self.rms_decay),
            ("beta1", self.beta1),
            ("beta2", self.beta2),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(GradGraphError::InvalidArgument(format!(
                    "{} must be in [0, 1), got {}",
                    name, value
                )));
            }
        }
        if !(self.epsilon > 0.0) {
            return Err(GradGraphError::InvalidArgument(
                "epsilon must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Optimizer selector. The discriminant is the stable code written to checkpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimizerKind {
    Sgd = 0,
    Momentum = 1,
    RmsProp = 2,
    Adam = 3,
}

impl OptimizerKind {
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Option<OptimizerKind> {
        match code {
            0 => Some(OptimizerKind::Sgd),
            1 => Some(OptimizerKind::Momentum),
            2 => Some(OptimizerKind::RmsProp),
            3 => Some(OptimizerKind::Adam),
            _ => None,
        }
    }

    /// Creates an optimizer holding zeroed state for a parameter of the given shape.
    pub fn build(
        self,
        config: &OptimizerConfig,
        shape: [usize; MAX_RANK],
    ) -> Result<Box<dyn Optimizer>, GradGraphError> {
        config.validate()?;
        Ok(match self {
            OptimizerKind::Sgd => Box::new(Sgd::new(config.learning_rate)),
            OptimizerKind::Momentum => Box::new(Momentum::new(config, shape)?),
            OptimizerKind::RmsProp => Box::new(RmsProp::new(config, shape)?),
            OptimizerKind::Adam => Box::new(Adam::new(config, shape)?),
        })
    }
}

/// Shared precondition of every update rule.
pub(crate) fn check_step_shapes(
    param: &Tensor,
    grad: &Tensor,
    operation: &str,
) -> Result<(), GradGraphError> {
    if param.shape() != grad.shape() {
        return Err(GradGraphError::ShapeMismatch {
            expected: param.shape(),
            actual: grad.shape(),
            operation: operation.to_string(),
        });
    }
    Ok(())
}
