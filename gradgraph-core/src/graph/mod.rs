//! # Computation Graph
//!
//! An append-only arena of [`Node`]s addressed by [`NodeId`]. Operation nodes are
//! evaluated eagerly when they are appended; [`Graph::trace`] then sorts the nodes
//! topologically from the unique sink and propagates gradients in reverse order.
//!
//! Leaves appended with [`Graph::append_data`] refer to caller-owned tensors, which
//! outlive the graph and can be attached to the next one. Everything else is owned by
//! the graph and dropped with it.

pub mod node;

pub use node::{DataRef, Node, NodeId, NodeKind, NodeValue, ShapeRule, MAX_DEPS};

use crate::error::GradGraphError;
use crate::ops;
use crate::tensor::{SharedTensor, Tensor};
use log::{debug, trace};
use std::sync::Arc;

#[cfg(test)]
mod graph_test;

/// Node slots allocated on first use when no capacity hint is given.
pub const DEFAULT_CAPACITY: usize = 64;

/// Hard ceiling on the number of nodes. `u16::MAX` itself is the [`NodeId::NONE`] sentinel.
pub const MAX_NODES: usize = u16::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Visited,
}

/// Growable registry of nodes forming a directed acyclic computation graph.
#[derive(Debug)]
pub struct Graph {
    nodes: Vec<Node>,
    initial_capacity: usize,
}

impl Default for Graph {
    fn default() -> Self {
        Graph::new()
    }
}

impl Graph {
    /// Creates an empty graph. No node slots are allocated until the first append.
    pub fn new() -> Self {
        Graph {
            nodes: Vec::new(),
            initial_capacity: DEFAULT_CAPACITY,
        }
    }

    /// Creates an empty graph with room for `hint` nodes (rounded up to a power of two).
    ///
    /// # Arguments
    /// * `hint` - Expected node count. `0` selects [`DEFAULT_CAPACITY`].
    ///
    /// # Returns
    /// The graph, or `AllocationFailure` if the node slots cannot be reserved.
    pub fn with_capacity(hint: usize) -> Result<Self, GradGraphError> {
        let capacity = if hint == 0 {
            DEFAULT_CAPACITY
        } else {
            hint.checked_next_power_of_two()
                .unwrap_or(MAX_NODES)
                .min(MAX_NODES)
        };
        let mut nodes = Vec::new();
        nodes
            .try_reserve_exact(capacity)
            .map_err(|_| GradGraphError::AllocationFailure { elements: capacity })?;
        Ok(Graph {
            nodes,
            initial_capacity: capacity,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of node slots currently allocated.
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Makes room for one more node, doubling the allocation when it is full.
    fn reserve_slot(&mut self) -> Result<(), GradGraphError> {
        let len = self.nodes.len();
        if len >= MAX_NODES {
            return Err(GradGraphError::CapacityExhausted { limit: MAX_NODES });
        }
        let capacity = self.nodes.capacity();
        if len < capacity {
            return Ok(());
        }
        let target = if capacity == 0 {
            self.initial_capacity
        } else {
            capacity.saturating_mul(2).min(MAX_NODES)
        };
        self.nodes
            .try_reserve_exact(target - len)
            .map_err(|_| GradGraphError::AllocationFailure { elements: target })?;
        debug!("Graph grown from {} to {} node slots", capacity, target);
        Ok(())
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u16);
        self.nodes.push(node);
        id
    }

    fn check_id(&self, id: NodeId) -> Result<(), GradGraphError> {
        if id.index() >= self.nodes.len() {
            return Err(GradGraphError::UnknownNode {
                id,
                len: self.nodes.len(),
            });
        }
        Ok(())
    }

    /// Appends a leaf wrapping a caller-owned tensor.
    ///
    /// The graph keeps a handle to `tensor` and allocates a zeroed gradient of the same
    /// shape. The tensor is not copied, so updates made through the handle between
    /// graphs are seen by the next graph it is attached to.
    pub fn append_data(&mut self, tensor: &SharedTensor) -> Result<NodeId, GradGraphError> {
        self.reserve_slot()?;
        let gradient = {
            let guard = tensor
                .read()
                .map_err(|e| GradGraphError::LockPoisoned(e.to_string()))?;
            guard.zeros_like()?
        };
        let node = Node::new(
            NodeKind::Data,
            NodeValue::Leaf(Arc::clone(tensor)),
            gradient,
            [NodeId::NONE; MAX_DEPS],
        );
        Ok(self.push(node))
    }

    /// Appends a leaf that the graph owns, such as a batch of inputs or targets.
    pub fn append_tensor(&mut self, tensor: Tensor) -> Result<NodeId, GradGraphError> {
        self.reserve_slot()?;
        let gradient = tensor.zeros_like()?;
        let node = Node::new(
            NodeKind::Data,
            NodeValue::Computed(tensor),
            gradient,
            [NodeId::NONE; MAX_DEPS],
        );
        Ok(self.push(node))
    }

    /// Appends an operation node and evaluates it immediately.
    ///
    /// # Arguments
    /// * `a` - First operand.
    /// * `b` - Second operand for binary kinds; `None` (or [`NodeId::NONE`]) for unary ones.
    /// * `kind` - The operation. [`NodeKind::Data`] is rejected; use [`Graph::append_data`].
    ///
    /// # Returns
    /// The id of the new node. On failure nothing is appended.
    pub fn execute(
        &mut self,
        a: NodeId,
        b: Option<NodeId>,
        kind: NodeKind,
    ) -> Result<NodeId, GradGraphError> {
        let arity = kind.arity();
        if arity == 0 {
            return Err(GradGraphError::InvalidArgument(
                "data nodes are appended with append_data".to_string(),
            ));
        }
        let b = b.filter(|id| !id.is_none());
        let supplied = usize::from(!a.is_none()) + usize::from(b.is_some());
        if supplied != arity {
            return Err(GradGraphError::ArityMismatch {
                kind,
                expected: arity,
                actual: supplied,
            });
        }
        self.check_id(a)?;
        if let Some(b) = b {
            self.check_id(b)?;
        }
        self.reserve_slot()?;

        let output = {
            let a_ref = self.nodes[a.index()].data()?;
            let b_ref = match b {
                Some(b) if b != a => Some(self.nodes[b.index()].data()?),
                _ => None,
            };
            let b_tensor: Option<&Tensor> = match b {
                Some(b) if b == a => Some(&*a_ref),
                _ => b_ref.as_deref(),
            };
            let shape = kind
                .shape_rule()
                .infer(a_ref.shape(), b_tensor.map(Tensor::shape))?;
            let output = ops::forward(kind, &a_ref, b_tensor)?;
            if output.shape() != shape {
                return Err(GradGraphError::InternalError(format!(
                    "{:?} produced shape {:?}, expected {:?}",
                    kind,
                    output.shape(),
                    shape
                )));
            }
            output
        };
        let gradient = output.zeros_like()?;
        let node = Node::new(
            kind,
            NodeValue::Computed(output),
            gradient,
            [a, b.unwrap_or(NodeId::NONE)],
        );
        let id = self.push(node);
        trace!("Executed {:?} -> node {}", kind, id);
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, GradGraphError> {
        self.nodes.get(id.index()).ok_or(GradGraphError::UnknownNode {
            id,
            len: self.nodes.len(),
        })
    }

    /// Forward value of a node.
    pub fn data(&self, id: NodeId) -> Result<DataRef<'_>, GradGraphError> {
        self.node(id)?.data()
    }

    /// Accumulated gradient of a node.
    pub fn gradient(&self, id: NodeId) -> Result<&Tensor, GradGraphError> {
        Ok(&self.node(id)?.gradient)
    }

    /// Mutable gradient of a node, e.g. to seed a non-loss sink before [`Graph::trace`].
    pub fn gradient_mut(&mut self, id: NodeId) -> Result<&mut Tensor, GradGraphError> {
        let len = self.nodes.len();
        self.nodes
            .get_mut(id.index())
            .map(|node| &mut node.gradient)
            .ok_or(GradGraphError::UnknownNode { id, len })
    }

    /// Resets every gradient in the graph to zero.
    pub fn zero_grad(&mut self) {
        for node in &mut self.nodes {
            node.gradient.reset();
        }
    }

    /// For each node, how many nodes list it as a dependency.
    pub fn outdegrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.nodes.len()];
        for node in &self.nodes {
            for dep in node.dependencies() {
                if let Some(d) = degrees.get_mut(dep.index()) {
                    *d += 1;
                }
            }
        }
        degrees
    }

    /// The only node without successors.
    ///
    /// # Returns
    /// `NoUniqueSink` if the graph is empty or several nodes have no successors.
    pub fn sink(&self) -> Result<NodeId, GradGraphError> {
        let sinks: Vec<usize> = self
            .outdegrees()
            .iter()
            .enumerate()
            .filter(|(_, &d)| d == 0)
            .map(|(i, _)| i)
            .collect();
        match sinks.as_slice() {
            [only] => Ok(NodeId(*only as u16)),
            _ => Err(GradGraphError::NoUniqueSink { found: sinks.len() }),
        }
    }

    /// Nodes reachable from the sink, each after all of its dependencies; the sink is last.
    ///
    /// The depth-first walk is iterative, so deep graphs do not grow the call stack.
    pub fn topological_order(&self) -> Result<Vec<NodeId>, GradGraphError> {
        let sink = self.sink()?;
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        // (node, index of the next dependency to visit)
        let mut stack: Vec<(NodeId, usize)> = vec![(sink, 0)];
        marks[sink.index()] = Mark::Visiting;

        while let Some(top) = stack.last_mut() {
            let (id, cursor) = *top;
            let deps = self.node(id)?.dependencies();
            if cursor < deps.len() {
                top.1 += 1;
                let dep = deps[cursor];
                self.check_id(dep)?;
                match marks[dep.index()] {
                    Mark::Unvisited => {
                        marks[dep.index()] = Mark::Visiting;
                        stack.push((dep, 0));
                    }
                    Mark::Visiting => return Err(GradGraphError::CycleDetected(dep)),
                    Mark::Visited => {}
                }
            } else {
                marks[id.index()] = Mark::Visited;
                order.push(id);
                stack.pop();
            }
        }
        Ok(order)
    }

    /// Local sensitivities of `id`'s operands, in operand order.
    fn local_gradients(&self, id: NodeId) -> Result<Vec<Tensor>, GradGraphError> {
        let node = self.node(id)?;
        let deps = node.dependencies();
        let (a, b) = match deps {
            [a] => (*a, None),
            [a, b] => (*a, Some(*b)),
            _ => return Ok(Vec::new()),
        };
        let output = node.data()?;
        let a_ref = self.data(a)?;
        let b_ref = match b {
            Some(b) if b != a => Some(self.data(b)?),
            _ => None,
        };
        let b_tensor: Option<&Tensor> = match b {
            Some(b) if b == a => Some(&*a_ref),
            _ => b_ref.as_deref(),
        };
        ops::backward(node.kind, &node.gradient, &output, &a_ref, b_tensor)
    }

    /// Propagates gradients from the sink back to every node it depends on.
    ///
    /// Interior gradients are cleared first so that the sink's gradient is distributed
    /// exactly once per call. Leaf gradients are added to, never overwritten: tracing
    /// twice without [`Graph::zero_grad`] doubles them. A loss sink is seeded with 1;
    /// any other sink keeps whatever gradient the caller wrote into it.
    ///
    /// # Returns
    /// `NoUniqueSink` or `CycleDetected` if the graph has no well-defined order, or any
    /// shape/allocation error raised by a backward formula. Gradients may be partially
    /// updated when an error is returned.
    pub fn trace(&mut self) -> Result<(), GradGraphError> {
        let order = self.topological_order()?;
        let sink = match order.last() {
            Some(&sink) => sink,
            None => return Err(GradGraphError::NoUniqueSink { found: 0 }),
        };
        debug!("Tracing {} nodes back from sink {}", order.len(), sink);

        for &id in &order {
            let node = &mut self.nodes[id.index()];
            if id != sink && node.kind != NodeKind::Data {
                node.gradient.reset();
            }
        }
        let sink_node = &mut self.nodes[sink.index()];
        if sink_node.kind.is_loss() {
            sink_node.gradient.fill(1.0);
        }

        for &id in order.iter().rev() {
            let kind = self.nodes[id.index()].kind;
            if kind == NodeKind::Data {
                continue;
            }
            trace!("Backward through {:?} at node {}", kind, id);
            let locals = self.local_gradients(id)?;
            let deps = self.nodes[id.index()].deps;
            for (dep, local) in deps.iter().zip(locals.iter()) {
                self.nodes[dep.index()].gradient.add_(local)?;
            }
        }
        Ok(())
    }
}
