use crate::config::ModelConfig;
use crate::dashboard::TrainingObserver;
use crate::data::DataSource;
use crate::error::ModelError;
use gradgraph_core::nn::Dense;
use gradgraph_core::{Graph, NodeId, Tensor};
use log::{debug, info};
use rand::Rng;

/// Training progress, persisted in checkpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelState {
    /// Index of the last epoch that ran a pass.
    pub epoch_count: usize,
    /// Index of the last pass within that epoch.
    pub pass_count: usize,
    /// Loss of the last pass; NaN before any training.
    pub training_loss: f32,
}

impl Default for ModelState {
    fn default() -> Self {
        ModelState {
            epoch_count: 0,
            pass_count: 0,
            training_loss: f32::NAN,
        }
    }
}

/// A stack of dense layers trained against a loss.
///
/// Each training pass builds a fresh [`Graph`]: the layers attach their parameters,
/// the loss is traced, every layer applies its optimizer and then detaches.
#[derive(Debug)]
pub struct Model {
    config: ModelConfig,
    state: ModelState,
    layers: Vec<Dense>,
}

impl Model {
    /// Builds a randomly initialised model seeded from the thread-local generator.
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        Model::with_rng(config, &mut rand::thread_rng())
    }

    /// Builds a randomly initialised model drawing from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(config: ModelConfig, rng: &mut R) -> Result<Self, ModelError> {
        config.validate()?;
        let mut layers = Vec::with_capacity(config.depth());
        let mut fan_in = config.input_size;
        for layer in &config.layers {
            layers.push(Dense::new(
                fan_in,
                layer.neurons,
                layer.initialization,
                layer.activation,
                config.optimizer,
                &config.optimizer_config,
                rng,
            )?);
            fan_in = layer.neurons;
        }
        debug!(
            "Built model with {} layers ({} -> {})",
            layers.len(),
            config.input_size,
            config.output_size
        );
        Ok(Model {
            config,
            state: ModelState::default(),
            layers,
        })
    }

    /// Reassembles a model from restored parts. Layer shapes must match `config`.
    pub(crate) fn from_parts(
        config: ModelConfig,
        state: ModelState,
        layers: Vec<Dense>,
    ) -> Result<Self, ModelError> {
        config.validate()?;
        if layers.len() != config.depth() {
            return Err(ModelError::InvalidConfig(format!(
                "{} layers given for a depth of {}",
                layers.len(),
                config.depth()
            )));
        }
        let mut fan_in = config.input_size;
        for (i, (layer, layer_config)) in layers.iter().zip(&config.layers).enumerate() {
            if layer.fan_in()? != fan_in || layer.fan_out()? != layer_config.neurons {
                return Err(ModelError::InvalidConfig(format!(
                    "layer {} parameters do not match its configuration",
                    i
                )));
            }
            fan_in = layer_config.neurons;
        }
        Ok(Model {
            config,
            state,
            layers,
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    /// Runs every configured epoch without a dashboard.
    pub fn fit<D: DataSource + ?Sized>(&mut self, data: &mut D) -> Result<(), ModelError> {
        self.run_epochs(data, None)
    }

    /// Runs every configured epoch, reporting to `observer` every
    /// `dashboard.passes_interval` passes when `dashboard.show` is set.
    pub fn fit_with_observer<D: DataSource + ?Sized>(
        &mut self,
        data: &mut D,
        observer: &mut dyn TrainingObserver,
    ) -> Result<(), ModelError> {
        self.run_epochs(data, Some(observer))
    }

    fn run_epochs<D: DataSource + ?Sized>(
        &mut self,
        data: &mut D,
        mut observer: Option<&mut (dyn TrainingObserver + '_)>,
    ) -> Result<(), ModelError> {
        for epoch in 0..self.config.epochs {
            self.fit_epoch(epoch, data, observer.as_deref_mut())?;
            info!(
                "Epoch {}/{}: loss {:.6}",
                epoch + 1,
                self.config.epochs,
                self.state.training_loss
            );
        }
        Ok(())
    }

    /// Runs `data_size / batch_size` passes, each on a fresh graph.
    pub fn fit_epoch<D: DataSource + ?Sized>(
        &mut self,
        epoch: usize,
        data: &mut D,
        mut observer: Option<&mut (dyn TrainingObserver + '_)>,
    ) -> Result<(), ModelError> {
        let passes = self.config.passes_per_epoch();
        let show = self.config.dashboard.show;
        let interval = self.config.dashboard.passes_interval.max(1);
        for pass in 0..passes {
            let (input, expected) = data.next_batch(self.config.batch_size)?;
            let mut graph = Graph::new();
            let result = self.run_pass(&mut graph, input, expected).and_then(|loss| {
                self.state = ModelState {
                    epoch_count: epoch,
                    pass_count: pass,
                    training_loss: loss,
                };
                debug!("Epoch {} pass {}: loss {:.6}", epoch, pass, loss);
                self.optimize(&graph)?;
                match observer.as_deref_mut() {
                    Some(obs) if show && pass % interval == 0 => obs.on_pass(&graph, self),
                    _ => Ok(()),
                }
            });
            self.detach_layers();
            result?;
        }
        Ok(())
    }

    /// Trains on a single batch and returns its loss. Does not touch the pass counters.
    pub fn train_step(&mut self, input: Tensor, expected: Tensor) -> Result<f32, ModelError> {
        let mut graph = Graph::new();
        let result = self.run_pass(&mut graph, input, expected).and_then(|loss| {
            self.state.training_loss = loss;
            self.optimize(&graph)?;
            Ok(loss)
        });
        self.detach_layers();
        result
    }

    /// Runs the network on `input` and returns an owned copy of the output.
    pub fn infer(&mut self, input: &Tensor) -> Result<Tensor, ModelError> {
        let mut graph = Graph::new();
        let result = self
            .forward(&mut graph, input.clone())
            .and_then(|out| Ok(graph.data(out)?.contiguous()?));
        self.detach_layers();
        result
    }

    /// Forward, loss and trace. Leaves the layers attached to `graph`.
    fn run_pass(&mut self, graph: &mut Graph, input: Tensor, expected: Tensor) -> Result<f32, ModelError> {
        let output = self.forward(graph, input)?;
        let expected = graph.append_tensor(expected)?;
        let loss = graph.execute(output, Some(expected), self.config.loss)?;
        graph.trace()?;
        let value = graph.data(loss)?.get(0, 0)?;
        Ok(value)
    }

    fn forward(&mut self, graph: &mut Graph, input: Tensor) -> Result<NodeId, ModelError> {
        if input.cols() != self.config.input_size {
            return Err(ModelError::Core(gradgraph_core::GradGraphError::ShapeMismatch {
                expected: [input.rows(), self.config.input_size],
                actual: input.shape(),
                operation: "model input".to_string(),
            }));
        }
        let mut current = graph.append_tensor(input)?;
        for layer in self.layers.iter_mut() {
            layer.attach(graph)?;
            current = layer.forward(graph, current)?;
        }
        Ok(current)
    }

    fn optimize(&mut self, graph: &Graph) -> Result<(), ModelError> {
        for layer in self.layers.iter_mut() {
            layer.update(graph)?;
        }
        Ok(())
    }

    fn detach_layers(&mut self) {
        for layer in self.layers.iter_mut() {
            layer.detach();
        }
    }
}
