use crate::error::GradGraphError;
use crate::graph::{Graph, NodeId, NodeKind};
use crate::nn::init::{initialize_, Initialization};
use crate::optim::{Optimizer, OptimizerConfig, OptimizerKind};
use crate::tensor::{SharedTensor, Tensor};
use log::trace;
use rand::Rng;

/// Fully connected layer: `activation(x · W + b)`.
///
/// Weights `(fan_in, fan_out)` and biases `(1, fan_out)` are caller-owned leaves that
/// persist across graphs. A layer is attached to one graph at a time: [`Dense::attach`]
/// appends its parameters, [`Dense::detach`] forgets their node ids so that it can be
/// attached to the next graph.
#[derive(Debug)]
pub struct Dense {
    weights: SharedTensor,
    biases: SharedTensor,
    activation: NodeKind,
    initialization: Initialization,
    weights_optimizer: Box<dyn Optimizer>,
    biases_optimizer: Box<dyn Optimizer>,
    weights_id: NodeId,
    biases_id: NodeId,
}

fn lock_error<E: std::fmt::Display>(e: E) -> GradGraphError {
    GradGraphError::LockPoisoned(e.to_string())
}

impl Dense {
    /// Creates a randomly initialised layer. Biases are drawn with the same scheme as weights.
    ///
    /// # Arguments
    /// * `fan_in` - Input features.
    /// * `fan_out` - Output features (neurons).
    /// * `initialization` - Weight sampling scheme.
    /// * `activation` - Activation kind; must satisfy [`NodeKind::is_activation`].
    /// * `optimizer` - Update rule, instantiated once per parameter.
    /// * `config` - Optimizer hyperparameters.
    /// * `rng` - Random source for initialisation.
    pub fn new<R: Rng + ?Sized>(
        fan_in: usize,
        fan_out: usize,
        initialization: Initialization,
        activation: NodeKind,
        optimizer: OptimizerKind,
        config: &OptimizerConfig,
        rng: &mut R,
    ) -> Result<Self, GradGraphError> {
        let mut weights = Tensor::zeros(fan_in, fan_out)?;
        let mut biases = Tensor::zeros(1, fan_out)?;
        initialize_(&mut weights, initialization, fan_in, fan_out, rng)?;
        initialize_(&mut biases, initialization, fan_in, fan_out, rng)?;
        Dense::from_parameters(weights, biases, initialization, activation, optimizer, config)
    }

    /// Creates a layer around existing parameters, e.g. restored from a checkpoint.
    pub fn from_parameters(
        weights: Tensor,
        biases: Tensor,
        initialization: Initialization,
        activation: NodeKind,
        optimizer: OptimizerKind,
        config: &OptimizerConfig,
    ) -> Result<Self, GradGraphError> {
        if !activation.is_activation() {
            return Err(GradGraphError::InvalidArgument(format!(
                "{:?} is not an activation",
                activation
            )));
        }
        let fan_out = weights.cols();
        if biases.shape() != [1, fan_out] {
            return Err(GradGraphError::ShapeMismatch {
                expected: [1, fan_out],
                actual: biases.shape(),
                operation: "dense".to_string(),
            });
        }
        Ok(Dense {
            weights_optimizer: optimizer.build(config, weights.shape())?,
            biases_optimizer: optimizer.build(config, biases.shape())?,
            weights: weights.into_shared(),
            biases: biases.into_shared(),
            activation,
            initialization,
            weights_id: NodeId::NONE,
            biases_id: NodeId::NONE,
        })
    }

    pub fn fan_in(&self) -> Result<usize, GradGraphError> {
        Ok(self.weights.read().map_err(lock_error)?.rows())
    }

    pub fn fan_out(&self) -> Result<usize, GradGraphError> {
        Ok(self.weights.read().map_err(lock_error)?.cols())
    }

    pub fn activation(&self) -> NodeKind {
        self.activation
    }

    pub fn initialization(&self) -> Initialization {
        self.initialization
    }

    pub fn optimizer(&self) -> OptimizerKind {
        self.weights_optimizer.kind()
    }

    pub fn weights(&self) -> &SharedTensor {
        &self.weights
    }

    pub fn biases(&self) -> &SharedTensor {
        &self.biases
    }

    pub fn weights_id(&self) -> NodeId {
        self.weights_id
    }

    pub fn biases_id(&self) -> NodeId {
        self.biases_id
    }

    pub fn is_attached(&self) -> bool {
        !self.weights_id.is_none()
    }

    /// Appends the weights and biases to `graph` as leaves.
    pub fn attach(&mut self, graph: &mut Graph) -> Result<(), GradGraphError> {
        if self.is_attached() {
            return Err(GradGraphError::InvalidArgument(
                "layer is already attached to a graph; detach it first".to_string(),
            ));
        }
        let weights_id = graph.append_data(&self.weights)?;
        let biases_id = graph.append_data(&self.biases)?;
        self.weights_id = weights_id;
        self.biases_id = biases_id;
        Ok(())
    }

    /// Forgets the node ids of the current graph.
    pub fn detach(&mut self) {
        self.weights_id = NodeId::NONE;
        self.biases_id = NodeId::NONE;
    }

    fn require_attached(&self) -> Result<(), GradGraphError> {
        if !self.is_attached() {
            return Err(GradGraphError::InvalidArgument(
                "layer is not attached to a graph".to_string(),
            ));
        }
        Ok(())
    }

    /// Chains contraction, bias addition and activation onto `input`.
    ///
    /// # Returns
    /// The id of the activation node.
    pub fn forward(&self, graph: &mut Graph, input: NodeId) -> Result<NodeId, GradGraphError> {
        self.require_attached()?;
        let z = graph.execute(input, Some(self.weights_id), NodeKind::Contract)?;
        let z = graph.execute(z, Some(self.biases_id), NodeKind::Add)?;
        let out = graph.execute(z, None, self.activation)?;
        trace!("Dense layer forward: input {} -> output {}", input, out);
        Ok(out)
    }

    /// Applies the optimizer to both parameters using their gradients in `graph`.
    pub fn update(&mut self, graph: &Graph) -> Result<(), GradGraphError> {
        self.require_attached()?;
        let weights_grad = graph.gradient(self.weights_id)?;
        let mut weights = self.weights.write().map_err(lock_error)?;
        self.weights_optimizer.step(&mut weights, weights_grad)?;
        drop(weights);

        let biases_grad = graph.gradient(self.biases_id)?;
        let mut biases = self.biases.write().map_err(lock_error)?;
        self.biases_optimizer.step(&mut biases, biases_grad)
    }
}

#[cfg(test)]
#[path = "dense_test.rs"]
mod tests;
