use crate::error::GradGraphError;
use crate::graph::{Graph, NodeId};
use crate::tensor::{SharedTensor, Tensor};
use log::debug;
use thiserror::Error;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for input {input_index}, element {element_index}: analytical {analytical_grad:?} != numerical {numerical_grad:?} (difference {difference:?})")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
        difference: f64,
    },
    #[error("Numerical gradient is NaN or infinite for input {input_index}, element {element_index}. Loss+: {loss_plus:?}, Loss-: {loss_minus:?}")]
    NumericalGradNaNOrInfinite {
        input_index: usize,
        element_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },
    #[error("Analytical gradient is NaN or infinite for input {input_index}, element {element_index}. Value: {value:?}")]
    AnalyticalGradNaNOrInfinite {
        input_index: usize,
        element_index: usize,
        value: f64,
    },
    #[error("Graph error during gradient check: {0}")]
    Graph(GradGraphError),
}

impl From<GradGraphError> for GradCheckError {
    fn from(err: GradGraphError) -> Self {
        GradCheckError::Graph(err)
    }
}

/// Builds a fresh graph over `inputs` and returns it with the leaf ids and the output id.
fn build_graph<F>(build: &F, inputs: &[SharedTensor]) -> Result<(Graph, Vec<NodeId>, NodeId), GradGraphError>
where
    F: Fn(&mut Graph, &[NodeId]) -> Result<NodeId, GradGraphError>,
{
    let mut graph = Graph::new();
    let ids = inputs
        .iter()
        .map(|t| graph.append_data(t))
        .collect::<Result<Vec<_>, _>>()?;
    let output = build(&mut graph, &ids)?;
    Ok((graph, ids, output))
}

/// Scalar objective whose gradient with respect to the output is `seed`: `Σ output ⊙ seed`.
fn objective<F>(build: &F, inputs: &[SharedTensor], seed: &Tensor) -> Result<f64, GradGraphError>
where
    F: Fn(&mut Graph, &[NodeId]) -> Result<NodeId, GradGraphError>,
{
    let (graph, _, output) = build_graph(build, inputs)?;
    let weighted = graph.data(output)?.mul(seed)?;
    Ok(weighted.to_vec().iter().map(|&x| x as f64).sum())
}

fn write_element(t: &SharedTensor, i: usize, j: usize, value: f32) -> Result<(), GradGraphError> {
    t.write()
        .map_err(|e| GradGraphError::LockPoisoned(e.to_string()))?
        .set_at(i, j, value)
}

fn read_element(t: &SharedTensor, i: usize, j: usize) -> Result<f32, GradGraphError> {
    t.read()
        .map_err(|e| GradGraphError::LockPoisoned(e.to_string()))?
        .get(i, j)
}

/// Checks analytical gradients against numerical gradients using central differences.
///
/// `build` appends operation nodes over the leaf ids it is given and returns the
/// graph's unique sink. It is called once for the analytical pass and twice per input
/// element for the numerical one, each time on a fresh graph.
///
/// # Arguments
/// * `build` - Graph constructor.
/// * `inputs` - Leaves to differentiate with respect to. Every input must be used by `build`.
/// * `output_grad` - Gradient seeded at the output. Ignored for loss sinks, which seed 1.
/// * `epsilon` - Perturbation step.
/// * `tolerance` - Accepted `|analytical - numerical|`, scaled by `1 + |numerical|`.
///
/// # Returns
/// `Ok(())` when every element agrees. The inputs are restored before returning.
pub fn check_gradients<F>(
    build: F,
    inputs: &[SharedTensor],
    output_grad: &Tensor,
    epsilon: f32,
    tolerance: f64,
) -> Result<(), GradCheckError>
where
    F: Fn(&mut Graph, &[NodeId]) -> Result<NodeId, GradGraphError>,
{
    // --- Analytical pass ---
    let (mut graph, ids, output) = build_graph(&build, inputs)?;
    Tensor::map_into(graph.gradient_mut(output)?, output_grad, |g| g)?;
    graph.trace()?;
    let seed = graph.gradient(output)?.clone();
    let analytical: Vec<Tensor> = ids
        .iter()
        .map(|&id| graph.gradient(id).cloned())
        .collect::<Result<_, _>>()?;
    drop(graph);

    // --- Numerical pass ---
    let two_eps = 2.0 * epsilon as f64;
    for (input_index, input) in inputs.iter().enumerate() {
        let [rows, cols] = analytical[input_index].shape();
        for i in 0..rows {
            for j in 0..cols {
                let element_index = i * cols + j;
                let original = read_element(input, i, j)?;

                write_element(input, i, j, original + epsilon)?;
                let loss_plus = objective(&build, inputs, &seed);
                write_element(input, i, j, original - epsilon)?;
                let loss_minus = objective(&build, inputs, &seed);
                write_element(input, i, j, original)?;
                let (loss_plus, loss_minus) = (loss_plus?, loss_minus?);

                let numerical_grad = (loss_plus - loss_minus) / two_eps;
                let analytical_grad = analytical[input_index].get(i, j)? as f64;

                if !numerical_grad.is_finite() {
                    return Err(GradCheckError::NumericalGradNaNOrInfinite {
                        input_index,
                        element_index,
                        loss_plus,
                        loss_minus,
                    });
                }
                if !analytical_grad.is_finite() {
                    return Err(GradCheckError::AnalyticalGradNaNOrInfinite {
                        input_index,
                        element_index,
                        value: analytical_grad,
                    });
                }
                let difference = (analytical_grad - numerical_grad).abs();
                if difference > tolerance * (1.0 + numerical_grad.abs()) {
                    return Err(GradCheckError::GradientMismatch {
                        input_index,
                        element_index,
                        analytical_grad,
                        numerical_grad,
                        difference,
                    });
                }
            }
        }
        debug!("Gradient check passed for input {} ({}x{})", input_index, rows, cols);
    }
    Ok(())
}

#[cfg(test)]
#[path = "grad_check_test.rs"]
mod tests;
