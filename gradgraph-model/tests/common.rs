use gradgraph_core::nn::Initialization;
use gradgraph_core::optim::{OptimizerConfig, OptimizerKind};
use gradgraph_core::{NodeKind, Tensor};
use gradgraph_model::{DashboardConfig, InMemoryDataset, LayerConfig, ModelConfig};

#[allow(dead_code)]
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[allow(dead_code)]
pub fn xor_inputs() -> Tensor {
    Tensor::from_rows(&[&[0.0, 0.0], &[0.0, 1.0], &[1.0, 0.0], &[1.0, 1.0]]).unwrap()
}

#[allow(dead_code)]
pub fn xor_targets() -> Tensor {
    Tensor::from_rows(&[&[0.0], &[1.0], &[1.0], &[0.0]]).unwrap()
}

#[allow(dead_code)]
pub fn xor_dataset() -> InMemoryDataset {
    InMemoryDataset::new(xor_inputs(), xor_targets()).unwrap()
}

/// 2-8-1 network over the four XOR samples, one full-batch pass per epoch.
#[allow(dead_code)]
pub fn xor_config(epochs: usize) -> ModelConfig {
    ModelConfig {
        epochs,
        batch_size: 4,
        data_size: 4,
        input_size: 2,
        output_size: 1,
        layers: vec![
            LayerConfig::new(8, Initialization::Glorot, NodeKind::Tanh),
            LayerConfig::new(1, Initialization::Glorot, NodeKind::Sigmoid),
        ],
        optimizer: OptimizerKind::Adam,
        optimizer_config: OptimizerConfig::with_learning_rate(0.05),
        loss: NodeKind::Mse,
        dashboard: DashboardConfig::default(),
    }
}
