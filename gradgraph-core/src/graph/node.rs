use crate::error::GradGraphError;
use crate::tensor::{SharedTensor, Tensor, MAX_RANK};
use std::fmt;
use std::ops::Deref;
use std::sync::RwLockReadGuard;

/// Maximum number of dependencies a node may have.
pub const MAX_DEPS: usize = 2;

/// Dense index of a node inside its [`Graph`](super::Graph).
///
/// Indices are stable for the lifetime of the graph. `NodeId::NONE` (`u16::MAX`) is
/// never assigned and marks an absent operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u16);

impl NodeId {
    /// The "no node" sentinel.
    pub const NONE: NodeId = NodeId(u16::MAX);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_none(self) -> bool {
        self == NodeId::NONE
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "#none")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// How the output shape of a node is derived from its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeRule {
    /// Leaf: the shape of the wrapped tensor.
    Leaf,
    /// Shaped like the first operand; a second operand must broadcast onto it.
    SameAsFirst,
    /// `(cols, rows)` of the operand.
    Transposed,
    /// `(a.rows, b.cols)`, requiring `a.cols == b.rows`.
    Contracted,
    /// `(1, 1)`; both operands must have the same shape.
    Scalar,
}

impl ShapeRule {
    /// Computes the output shape, or reports why the operands are incompatible.
    pub fn infer(
        self,
        a: [usize; MAX_RANK],
        b: Option<[usize; MAX_RANK]>,
    ) -> Result<[usize; MAX_RANK], GradGraphError> {
        match (self, b) {
            (ShapeRule::Leaf, _) => Ok(a),
            (ShapeRule::SameAsFirst, None) => Ok(a),
            (ShapeRule::SameAsFirst, Some(b)) => {
                let compatible = (0..MAX_RANK).all(|axis| b[axis] == a[axis] || b[axis] == 1);
                if compatible {
                    Ok(a)
                } else {
                    Err(GradGraphError::BroadcastError { from: b, onto: a })
                }
            }
            (ShapeRule::Transposed, _) => Ok([a[1], a[0]]),
            (ShapeRule::Contracted, Some(b)) => {
                if a[1] != b[0] {
                    return Err(GradGraphError::ShapeMismatch {
                        expected: [a[1], b[1]],
                        actual: b,
                        operation: "contract".to_string(),
                    });
                }
                Ok([a[0], b[1]])
            }
            (ShapeRule::Scalar, Some(b)) => {
                if a != b {
                    return Err(GradGraphError::ShapeMismatch {
                        expected: a,
                        actual: b,
                        operation: "loss".to_string(),
                    });
                }
                Ok([1, 1])
            }
            (rule, None) => Err(GradGraphError::InternalError(format!(
                "shape rule {:?} needs a second operand",
                rule
            ))),
        }
    }
}

/// Closed set of operations a node can represent.
///
/// The discriminant is the stable integer code written to checkpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Data = 0,
    Transpose = 1,
    Contract = 2,
    Add = 3,
    Sub = 4,
    Mul = 5,
    Div = 6,
    Sigmoid = 7,
    Relu = 8,
    LeakyRelu = 9,
    Mse = 10,
    CrossEntropy = 11,
    Softmax = 12,
    Tanh = 13,
    BinaryCrossEntropy = 14,
}

impl NodeKind {
    pub const ALL: [NodeKind; 15] = [
        NodeKind::Data,
        NodeKind::Transpose,
        NodeKind::Contract,
        NodeKind::Add,
        NodeKind::Sub,
        NodeKind::Mul,
        NodeKind::Div,
        NodeKind::Sigmoid,
        NodeKind::Relu,
        NodeKind::LeakyRelu,
        NodeKind::Mse,
        NodeKind::CrossEntropy,
        NodeKind::Softmax,
        NodeKind::Tanh,
        NodeKind::BinaryCrossEntropy,
    ];

    /// Stable integer code.
    pub fn code(self) -> i64 {
        self as i64
    }

    /// Looks up a kind by its integer code.
    pub fn from_code(code: i64) -> Option<NodeKind> {
        NodeKind::ALL.iter().copied().find(|k| k.code() == code)
    }

    /// Number of operands the operation consumes.
    pub fn arity(self) -> usize {
        match self {
            NodeKind::Data => 0,
            NodeKind::Transpose
            | NodeKind::Sigmoid
            | NodeKind::Relu
            | NodeKind::LeakyRelu
            | NodeKind::Softmax
            | NodeKind::Tanh => 1,
            NodeKind::Contract
            | NodeKind::Add
            | NodeKind::Sub
            | NodeKind::Mul
            | NodeKind::Div
            | NodeKind::Mse
            | NodeKind::CrossEntropy
            | NodeKind::BinaryCrossEntropy => 2,
        }
    }

    pub fn shape_rule(self) -> ShapeRule {
        match self {
            NodeKind::Data => ShapeRule::Leaf,
            NodeKind::Transpose => ShapeRule::Transposed,
            NodeKind::Contract => ShapeRule::Contracted,
            NodeKind::Mse | NodeKind::CrossEntropy | NodeKind::BinaryCrossEntropy => {
                ShapeRule::Scalar
            }
            _ => ShapeRule::SameAsFirst,
        }
    }

    /// Loss kinds produce a scalar and seed their own gradient to 1 when they are the sink.
    pub fn is_loss(self) -> bool {
        matches!(
            self,
            NodeKind::Mse | NodeKind::CrossEntropy | NodeKind::BinaryCrossEntropy
        )
    }

    /// Kinds usable as a layer activation.
    pub fn is_activation(self) -> bool {
        matches!(
            self,
            NodeKind::Sigmoid
                | NodeKind::Relu
                | NodeKind::LeakyRelu
                | NodeKind::Softmax
                | NodeKind::Tanh
        )
    }
}

impl TryFrom<i64> for NodeKind {
    type Error = GradGraphError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        NodeKind::from_code(code).ok_or_else(|| {
            GradGraphError::InvalidArgument(format!("unknown node kind code {}", code))
        })
    }
}

/// Where a node's forward value lives.
#[derive(Debug)]
pub enum NodeValue {
    /// Owned by the graph and dropped with it.
    Computed(Tensor),
    /// Owned by the caller; the graph only holds a handle.
    Leaf(SharedTensor),
}

/// Read access to a node's forward value, whichever way it is stored.
pub enum DataRef<'a> {
    Owned(&'a Tensor),
    Shared(RwLockReadGuard<'a, Tensor>),
}

impl Deref for DataRef<'_> {
    type Target = Tensor;

    fn deref(&self) -> &Tensor {
        match self {
            DataRef::Owned(t) => t,
            DataRef::Shared(guard) => guard,
        }
    }
}

/// One vertex of the computation graph.
#[derive(Debug)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) value: NodeValue,
    pub(crate) gradient: Tensor,
    pub(crate) deps: [NodeId; MAX_DEPS],
}

impl Node {
    pub(crate) fn new(kind: NodeKind, value: NodeValue, gradient: Tensor, deps: [NodeId; MAX_DEPS]) -> Self {
        Node {
            kind,
            value,
            gradient,
            deps,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The node's predecessors, in operand order.
    pub fn dependencies(&self) -> &[NodeId] {
        &self.deps[..self.kind.arity()]
    }

    /// True when the graph owns the forward value.
    pub fn is_transient(&self) -> bool {
        matches!(self.value, NodeValue::Computed(_))
    }

    /// Forward value. Locks the caller's tensor for reading when the node is a shared leaf.
    pub fn data(&self) -> Result<DataRef<'_>, GradGraphError> {
        match &self.value {
            NodeValue::Computed(t) => Ok(DataRef::Owned(t)),
            NodeValue::Leaf(shared) => shared
                .read()
                .map(DataRef::Shared)
                .map_err(|e| GradGraphError::LockPoisoned(e.to_string())),
        }
    }

    pub fn gradient(&self) -> &Tensor {
        &self.gradient
    }
}
