use crate::error::ModelError;
use crate::model::Model;
use gradgraph_core::nn::Dense;
use gradgraph_core::{Graph, NodeKind, Tensor};
use std::collections::VecDeque;
use std::fmt;
use std::io::Write;

/// Number of losses kept for the chart.
pub const LOSS_HISTORY_LENGTH: usize = 60;
/// Vertical resolution of the chart.
pub const LOSS_BINS: usize = 12;
/// Gradients at or below this magnitude count as zero for sparsity.
pub const SPARSITY_THRESHOLD: f32 = 1e-8;

/// Receives the graph of a training pass before its layers are detached.
pub trait TrainingObserver {
    fn on_pass(&mut self, graph: &Graph, model: &Model) -> Result<(), ModelError>;
}

/// Per-layer gradient health, averaged over weights and biases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerStats {
    pub gradient_l2: f32,
    pub parameter_l2: f32,
    /// Percentage of gradient elements with magnitude at most [`SPARSITY_THRESHOLD`].
    pub sparsity: f32,
}

fn sparsity(grad: &Tensor) -> f32 {
    if grad.numel() == 0 {
        return 0.0;
    }
    let zeros = grad
        .to_vec()
        .iter()
        .filter(|g| g.abs() <= SPARSITY_THRESHOLD)
        .count();
    zeros as f32 / grad.numel() as f32 * 100.0
}

/// Computes [`LayerStats`] for a layer attached to `graph`.
pub fn layer_stats(graph: &Graph, layer: &Dense) -> Result<LayerStats, ModelError> {
    let weights_grad = graph.gradient(layer.weights_id())?;
    let biases_grad = graph.gradient(layer.biases_id())?;
    let weights_l2 = graph.data(layer.weights_id())?.l2_norm();
    let biases_l2 = graph.data(layer.biases_id())?.l2_norm();
    Ok(LayerStats {
        gradient_l2: (weights_grad.l2_norm() + biases_grad.l2_norm()) / 2.0,
        parameter_l2: (weights_l2 + biases_l2) / 2.0,
        sparsity: (sparsity(weights_grad) + sparsity(biases_grad)) / 2.0,
    })
}

fn activation_label(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Sigmoid => "SIGMD",
        NodeKind::Tanh => "TANH",
        NodeKind::Relu => "RELU",
        NodeKind::LeakyRelu => "LRELU",
        NodeKind::Softmax => "SFTMX",
        _ => "?",
    }
}

/// Console training dashboard: a rolling loss chart and a per-layer table.
#[derive(Debug)]
pub struct Dashboard<W: Write> {
    out: W,
    history: VecDeque<f32>,
}

impl<W: Write> Dashboard<W> {
    pub fn new(out: W) -> Self {
        Dashboard {
            out,
            history: VecDeque::with_capacity(LOSS_HISTORY_LENGTH),
        }
    }

    /// Losses recorded so far, oldest first.
    pub fn history(&self) -> &VecDeque<f32> {
        &self.history
    }

    /// Appends `loss`, dropping the oldest entry once the history is full.
    /// Non-finite losses are ignored.
    pub fn record(&mut self, loss: f32) {
        if !loss.is_finite() {
            return;
        }
        if self.history.len() == LOSS_HISTORY_LENGTH {
            self.history.pop_front();
        }
        self.history.push_back(loss);
    }

    /// Chart rows from top to bottom, each `LOSS_HISTORY_LENGTH` columns wide.
    ///
    /// Each column is the height of one recorded loss relative to the largest,
    /// newest losses on the right.
    pub fn chart(&self) -> Vec<String> {
        let max = self.history.iter().cloned().fold(0.0f32, f32::max);
        let heights: Vec<usize> = self
            .history
            .iter()
            .map(|&loss| {
                if max <= 0.0 {
                    0
                } else {
                    ((loss / max * LOSS_BINS as f32).ceil() as usize).min(LOSS_BINS)
                }
            })
            .collect();
        let padding = LOSS_HISTORY_LENGTH - heights.len();
        (0..LOSS_BINS)
            .rev()
            .map(|level| {
                let mut row = " ".repeat(padding);
                row.extend(heights.iter().map(|&h| if h > level { '.' } else { ' ' }));
                row
            })
            .collect()
    }

    /// Records the current loss and renders the dashboard for `model` as attached to `graph`.
    pub fn render(&mut self, graph: &Graph, model: &Model) -> Result<String, ModelError> {
        self.record(model.state().training_loss);
        let rows = model
            .layers()
            .iter()
            .enumerate()
            .map(|(i, layer)| -> Result<(String, LayerStats), ModelError> {
                let label = format!(
                    "#L{}-N{:04}-{}",
                    i,
                    layer.fan_out()?,
                    activation_label(layer.activation())
                );
                Ok((label, layer_stats(graph, layer)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut text = String::new();
        self.write_report(&mut text, model, &rows)?;
        Ok(text)
    }

    fn write_report(
        &self,
        out: &mut impl fmt::Write,
        model: &Model,
        rows: &[(String, LayerStats)],
    ) -> fmt::Result {
        let state = model.state();
        let max = self.history.iter().cloned().fold(0.0f32, f32::max);

        writeln!(out, "{:>7.2}% ┐", max * 100.0)?;
        for row in self.chart() {
            writeln!(out, "         │{}", row)?;
        }
        writeln!(out, "{:>7.2}% └{}", 0.0, "─".repeat(LOSS_HISTORY_LENGTH))?;
        writeln!(out, "EPOCH COUNT: {}", state.epoch_count)?;
        writeln!(out, "PASS COUNT:  {}", state.pass_count)?;
        writeln!(out, "LOSS:        {:.4}%", state.training_loss * 100.0)?;
        writeln!(out, "ACCURACY:    {:.4}%", (1.0 - state.training_loss) * 100.0)?;
        writeln!(
            out,
            "{:<20} {:>12} {:>12} {:>10}",
            "LAYER", "GRAD L2", "PARAM L2", "SPARSITY"
        )?;
        for (label, stats) in rows {
            writeln!(
                out,
                "{:<20} {:>12.6} {:>12.6} {:>9.2}%",
                label, stats.gradient_l2, stats.parameter_l2, stats.sparsity
            )?;
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TrainingObserver for Dashboard<W> {
    fn on_pass(&mut self, graph: &Graph, model: &Model) -> Result<(), ModelError> {
        let text = self.render(graph, model)?;
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
