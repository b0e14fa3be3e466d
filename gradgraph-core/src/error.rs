use crate::graph::{NodeId, NodeKind};
use thiserror::Error;

/// Custom error type for the gradgraph engine.
///
/// Every variant is local and recoverable by the caller: the engine reports the
/// failure at the point of detection and never retries or rolls back a partially
/// built graph.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum GradGraphError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Operation {kind:?} expects {expected} operand(s), got {actual}")]
    ArityMismatch {
        kind: NodeKind,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid tensor dimensions ({rows}, {cols}): both extents must be non-zero")]
    InvalidShape { rows: usize, cols: usize },

    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: [usize; 2],
        actual: [usize; 2],
        operation: String,
    },

    #[error("Cannot broadcast shape {from:?} onto {onto:?}")]
    BroadcastError { from: [usize; 2], onto: [usize; 2] },

    #[error("Index out of bounds: index {index:?} for shape {shape:?}")]
    IndexOutOfBounds { index: [usize; 2], shape: [usize; 2] },

    #[error("Invalid axis {axis}: tensors have rank 2")]
    InvalidAxis { axis: usize },

    #[error("Allocation of {elements} elements failed")]
    AllocationFailure { elements: usize },

    #[error("Graph capacity exhausted: at most {limit} nodes")]
    CapacityExhausted { limit: usize },

    #[error("Node {id:?} does not exist in a graph of {len} nodes")]
    UnknownNode { id: NodeId, len: usize },

    #[error("Graph must have exactly one node without successors, found {found}")]
    NoUniqueSink { found: usize },

    #[error("Cycle detected in the computation graph at node {0:?}")]
    CycleDetected(NodeId),

    #[error("Lock on a shared leaf tensor is poisoned: {0}")]
    LockPoisoned(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
