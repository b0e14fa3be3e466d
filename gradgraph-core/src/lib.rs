//! Reverse-mode automatic differentiation over rank-2 tensors.
//!
//! Client code appends leaves to a [`Graph`], chains operation nodes with
//! [`Graph::execute`] (each evaluated eagerly) and calls [`Graph::trace`] to propagate
//! gradients from the graph's unique sink back to every leaf.

pub mod error;
pub mod functions;
pub mod grad_check;
pub mod graph;
pub mod nn;
pub mod ops;
pub mod optim;
pub mod tensor;
pub mod utils;

pub use error::GradGraphError;
pub use graph::{Graph, NodeId, NodeKind};
pub use tensor::{SharedTensor, Tensor};
