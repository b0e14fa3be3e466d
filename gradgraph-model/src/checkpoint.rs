//! Binary model checkpoints.
//!
//! All fields are little-endian. Layout:
//!
//! ```text
//! u64  magic (0x4004)
//! u64  epochs, depth, batch_size, data_size, input_size, output_size,
//!      epoch_count, pass_count
//! f64  training_loss, learning_rate
//! i64  optimizer code, loss code
//! u64  layer count
//!      per layer: u64 neurons, i64 initialization code, i64 activation code
//!      per layer: f32 weights (fan_in x neurons, row-major), f32 biases (neurons)
//! ```

use crate::config::{DashboardConfig, LayerConfig, ModelConfig};
use crate::error::ModelError;
use crate::model::{Model, ModelState};
use gradgraph_core::nn::{Dense, Initialization};
use gradgraph_core::optim::{OptimizerConfig, OptimizerKind};
use gradgraph_core::{GradGraphError, NodeKind, Tensor};
use log::info;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

pub const CHECKPOINT_MAGIC: u64 = 0x4004;

fn lock_error<E: std::fmt::Display>(e: E) -> ModelError {
    ModelError::Core(GradGraphError::LockPoisoned(e.to_string()))
}

fn write_u64<W: Write>(w: &mut W, value: usize) -> Result<(), ModelError> {
    w.write_all(&(value as u64).to_le_bytes())?;
    Ok(())
}

fn write_i64<W: Write>(w: &mut W, value: i64) -> Result<(), ModelError> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_f64<W: Write>(w: &mut W, value: f32) -> Result<(), ModelError> {
    w.write_all(&f64::from(value).to_le_bytes())?;
    Ok(())
}

fn write_tensor<W: Write>(w: &mut W, tensor: &Tensor) -> Result<(), ModelError> {
    for value in tensor.to_vec() {
        w.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

fn read_bytes<const N: usize, R: Read>(r: &mut R, field: &'static str) -> Result<[u8; N], ModelError> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => ModelError::Truncated(field),
        _ => ModelError::Io(e),
    })?;
    Ok(buf)
}

fn read_u64<R: Read>(r: &mut R, field: &'static str) -> Result<u64, ModelError> {
    Ok(u64::from_le_bytes(read_bytes(r, field)?))
}

fn read_usize<R: Read>(r: &mut R, field: &'static str) -> Result<usize, ModelError> {
    let value = read_u64(r, field)?;
    usize::try_from(value)
        .map_err(|_| ModelError::InvalidConfig(format!("{} {} does not fit in memory", field, value)))
}

fn read_i64<R: Read>(r: &mut R, field: &'static str) -> Result<i64, ModelError> {
    Ok(i64::from_le_bytes(read_bytes(r, field)?))
}

fn read_f64<R: Read>(r: &mut R, field: &'static str) -> Result<f32, ModelError> {
    Ok(f64::from_le_bytes(read_bytes(r, field)?) as f32)
}

fn read_tensor<R: Read>(
    r: &mut R,
    rows: usize,
    cols: usize,
    field: &'static str,
) -> Result<Tensor, ModelError> {
    let mut tensor = Tensor::zeros(rows, cols)?;
    for value in tensor.as_mut_slice() {
        *value = f32::from_le_bytes(read_bytes(r, field)?);
    }
    Ok(tensor)
}

fn read_activation<R: Read>(r: &mut R) -> Result<NodeKind, ModelError> {
    let code = read_i64(r, "activation")?;
    NodeKind::from_code(code)
        .filter(|kind| kind.is_activation())
        .ok_or(ModelError::UnknownCode {
            what: "activation",
            code,
        })
}

/// Serialises `model` into `w`.
pub fn write_checkpoint<W: Write>(model: &Model, w: &mut W) -> Result<(), ModelError> {
    let config = model.config();
    let state = model.state();

    write_u64(w, CHECKPOINT_MAGIC as usize)?;
    for value in [
        config.epochs,
        config.depth(),
        config.batch_size,
        config.data_size,
        config.input_size,
        config.output_size,
        state.epoch_count,
        state.pass_count,
    ] {
        write_u64(w, value)?;
    }
    write_f64(w, state.training_loss)?;
    write_f64(w, config.learning_rate())?;
    write_i64(w, config.optimizer.code())?;
    write_i64(w, config.loss.code())?;

    write_u64(w, config.depth())?;
    for layer in &config.layers {
        write_u64(w, layer.neurons)?;
        write_i64(w, layer.initialization.code())?;
        write_i64(w, layer.activation.code())?;
    }
    for layer in model.layers() {
        let weights = layer
            .weights()
            .read()
            .map_err(lock_error)?;
        write_tensor(w, &weights)?;
        drop(weights);
        let biases = layer
            .biases()
            .read()
            .map_err(lock_error)?;
        write_tensor(w, &biases)?;
    }
    w.flush()?;
    Ok(())
}

/// Restores a model written by [`write_checkpoint`].
///
/// Optimizer state is not persisted: the restored model starts with fresh moments and
/// the default hyperparameters except for the learning rate. The dashboard is disabled.
pub fn read_checkpoint<R: Read>(r: &mut R) -> Result<Model, ModelError> {
    let magic = read_u64(r, "magic")?;
    if magic != CHECKPOINT_MAGIC {
        return Err(ModelError::BadMagic {
            found: magic,
            expected: CHECKPOINT_MAGIC,
        });
    }
    let epochs = read_usize(r, "epochs")?;
    let depth = read_usize(r, "depth")?;
    let batch_size = read_usize(r, "batch size")?;
    let data_size = read_usize(r, "data size")?;
    let input_size = read_usize(r, "input size")?;
    let output_size = read_usize(r, "output size")?;
    let epoch_count = read_usize(r, "epoch count")?;
    let pass_count = read_usize(r, "pass count")?;
    let training_loss = read_f64(r, "training loss")?;
    let learning_rate = read_f64(r, "learning rate")?;

    let code = read_i64(r, "optimizer")?;
    let optimizer = OptimizerKind::from_code(code).ok_or(ModelError::UnknownCode {
        what: "optimizer",
        code,
    })?;
    let code = read_i64(r, "loss")?;
    let loss = NodeKind::from_code(code)
        .filter(|kind| kind.is_loss())
        .ok_or(ModelError::UnknownCode { what: "loss", code })?;

    let layer_count = read_usize(r, "layer count")?;
    if layer_count != depth {
        return Err(ModelError::InvalidConfig(format!(
            "header depth {} disagrees with layer count {}",
            depth, layer_count
        )));
    }
    let mut layers = Vec::new();
    for _ in 0..layer_count {
        let neurons = read_usize(r, "neurons")?;
        let code = read_i64(r, "initialization")?;
        let initialization = Initialization::from_code(code).ok_or(ModelError::UnknownCode {
            what: "initialization",
            code,
        })?;
        let activation = read_activation(r)?;
        layers.push(LayerConfig::new(neurons, initialization, activation));
    }

    let config = ModelConfig {
        epochs,
        batch_size,
        data_size,
        input_size,
        output_size,
        layers,
        optimizer,
        optimizer_config: OptimizerConfig::with_learning_rate(learning_rate),
        loss,
        dashboard: DashboardConfig::default(),
    };
    // Shapes are checked before any parameter buffer is sized from them.
    config.validate()?;

    let mut dense = Vec::with_capacity(config.depth());
    let mut fan_in = config.input_size;
    for layer in &config.layers {
        let weights = read_tensor(r, fan_in, layer.neurons, "weights")?;
        let biases = read_tensor(r, 1, layer.neurons, "biases")?;
        dense.push(Dense::from_parameters(
            weights,
            biases,
            layer.initialization,
            layer.activation,
            optimizer,
            &config.optimizer_config,
        )?);
        fan_in = layer.neurons;
    }

    let state = ModelState {
        epoch_count,
        pass_count,
        training_loss,
    };
    Model::from_parts(config, state, dense)
}

impl Model {
    /// Writes a checkpoint to `path`, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        write_checkpoint(self, &mut writer)?;
        info!("Saved model checkpoint to {}", path.display());
        Ok(())
    }

    /// Reads a checkpoint from `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Model, ModelError> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let model = read_checkpoint(&mut reader)?;
        info!("Loaded model checkpoint from {}", path.display());
        Ok(model)
    }
}
