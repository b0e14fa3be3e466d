use crate::error::ModelError;
use gradgraph_core::nn::Initialization;
use gradgraph_core::optim::{OptimizerConfig, OptimizerKind};
use gradgraph_core::NodeKind;

/// One dense layer of the network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerConfig {
    pub neurons: usize,
    pub initialization: Initialization,
    pub activation: NodeKind,
}

impl LayerConfig {
    pub fn new(neurons: usize, initialization: Initialization, activation: NodeKind) -> Self {
        LayerConfig {
            neurons,
            initialization,
            activation,
        }
    }
}

/// When the training dashboard is refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardConfig {
    pub show: bool,
    /// Refresh every `passes_interval` passes within an epoch.
    pub passes_interval: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            show: false,
            passes_interval: 1,
        }
    }
}

/// Everything needed to build and train a [`Model`](crate::Model).
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub epochs: usize,
    pub batch_size: usize,
    /// Samples per epoch; an epoch runs `data_size / batch_size` passes.
    pub data_size: usize,
    pub input_size: usize,
    pub output_size: usize,
    pub layers: Vec<LayerConfig>,
    pub optimizer: OptimizerKind,
    pub optimizer_config: OptimizerConfig,
    pub loss: NodeKind,
    pub dashboard: DashboardConfig,
}

impl ModelConfig {
    /// Number of layers.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    pub fn learning_rate(&self) -> f32 {
        self.optimizer_config.learning_rate
    }

    /// Passes per epoch.
    pub fn passes_per_epoch(&self) -> usize {
        if self.batch_size == 0 {
            0
        } else {
            self.data_size / self.batch_size
        }
    }

    /// Checks the configuration for inconsistencies before any layer is allocated.
    pub fn validate(&self) -> Result<(), ModelError> {
        let invalid = |msg: String| Err(ModelError::InvalidConfig(msg));
        if self.layers.is_empty() {
            return invalid("at least one layer is required".to_string());
        }
        if self.input_size == 0 || self.output_size == 0 {
            return invalid("input and output sizes must be non-zero".to_string());
        }
        if self.batch_size == 0 {
            return invalid("batch size must be non-zero".to_string());
        }
        if self.data_size < self.batch_size {
            return invalid(format!(
                "data size {} is smaller than batch size {}",
                self.data_size, self.batch_size
            ));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.neurons == 0 {
                return invalid(format!("layer {} has no neurons", i));
            }
            if !layer.activation.is_activation() {
                return invalid(format!(
                    "layer {} uses {:?}, which is not an activation",
                    i, layer.activation
                ));
            }
        }
        let last = self.layers[self.layers.len() - 1].neurons;
        if last != self.output_size {
            return invalid(format!(
                "last layer has {} neurons but output size is {}",
                last, self.output_size
            ));
        }
        if !self.loss.is_loss() {
            return invalid(format!("{:?} is not a loss", self.loss));
        }
        if self.dashboard.show && self.dashboard.passes_interval == 0 {
            return invalid("dashboard interval must be non-zero".to_string());
        }
        self.optimizer_config.validate()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
