use super::*;
use gradgraph_core::nn::Initialization;

fn xor_config() -> ModelConfig {
    ModelConfig {
        epochs: 1,
        batch_size: 4,
        data_size: 4,
        input_size: 2,
        output_size: 1,
        layers: vec![
            LayerConfig::new(4, Initialization::Glorot, NodeKind::Tanh),
            LayerConfig::new(1, Initialization::Glorot, NodeKind::Sigmoid),
        ],
        optimizer: OptimizerKind::Adam,
        optimizer_config: OptimizerConfig::default(),
        loss: NodeKind::Mse,
        dashboard: DashboardConfig::default(),
    }
}

fn assert_invalid(config: ModelConfig) {
    let result = config.validate();
    assert!(
        matches!(result, Err(ModelError::InvalidConfig(_)) | Err(ModelError::Core(_))),
        "expected rejection, got {:?}",
        result
    );
}

#[test]
fn test_valid_config() {
    let config = xor_config();
    assert!(config.validate().is_ok());
    assert_eq!(config.depth(), 2);
    assert_eq!(config.passes_per_epoch(), 1);
}

#[test]
fn test_passes_per_epoch_truncates() {
    let mut config = xor_config();
    config.data_size = 10;
    config.batch_size = 4;
    assert_eq!(config.passes_per_epoch(), 2);
}

#[test]
fn test_rejects_inconsistent_configs() {
    let mut c = xor_config();
    c.layers.clear();
    assert_invalid(c);

    let mut c = xor_config();
    c.batch_size = 0;
    assert_invalid(c);

    let mut c = xor_config();
    c.data_size = 2;
    assert_invalid(c);

    let mut c = xor_config();
    c.output_size = 3;
    assert_invalid(c);

    let mut c = xor_config();
    c.loss = NodeKind::Sigmoid;
    assert_invalid(c);

    let mut c = xor_config();
    c.layers[0].activation = NodeKind::Contract;
    assert_invalid(c);

    let mut c = xor_config();
    c.layers[0].neurons = 0;
    assert_invalid(c);

    let mut c = xor_config();
    c.dashboard = DashboardConfig {
        show: true,
        passes_interval: 0,
    };
    assert_invalid(c);

    let mut c = xor_config();
    c.optimizer_config.learning_rate = -1.0;
    assert_invalid(c);
}
