//! Trains a small network on XOR with the console dashboard enabled.
//!
//! Run with `RUST_LOG=info cargo run -p gradgraph-model --example xor`.

use gradgraph_core::nn::Initialization;
use gradgraph_core::optim::{OptimizerConfig, OptimizerKind};
use gradgraph_core::{NodeKind, Tensor};
use gradgraph_model::{
    Dashboard, DashboardConfig, InMemoryDataset, LayerConfig, Model, ModelConfig, ModelError,
};

fn main() -> Result<(), ModelError> {
    env_logger::init();

    let inputs = Tensor::from_rows(&[&[0.0, 0.0], &[0.0, 1.0], &[1.0, 0.0], &[1.0, 1.0]])?;
    let targets = Tensor::from_rows(&[&[0.0], &[1.0], &[1.0], &[0.0]])?;
    let mut data = InMemoryDataset::new(inputs.clone(), targets)?;

    let config = ModelConfig {
        epochs: 500,
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
        loss: NodeKind::BinaryCrossEntropy,
        dashboard: DashboardConfig {
            show: true,
            passes_interval: 1,
        },
    };

    let mut model = Model::new(config)?;
    let mut dashboard = Dashboard::new(std::io::stdout());
    model.fit_with_observer(&mut data, &mut dashboard)?;

    let predictions = model.infer(&inputs)?;
    for i in 0..inputs.rows() {
        println!(
            "{} XOR {} = {:.3}",
            inputs.get(i, 0)?,
            inputs.get(i, 1)?,
            predictions.get(i, 0)?
        );
    }

    let path = std::env::temp_dir().join("xor.gradgraph");
    model.save(&path)?;
    let mut restored = Model::load(&path)?;
    println!("restored model predicts {:?}", restored.infer(&inputs)?.to_vec());
    Ok(())
}
