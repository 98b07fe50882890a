//! Graph-specific error types.

use wf_core::{NodeHandle, PipeHandle};

use crate::node::NodeKind;

pub type GraphResult<T> = Result<T, GraphError>;

/// Rejections raised by circuit mutations.
///
/// Every rejection leaves the circuit untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A node type tag that is not one of the five known kinds.
    InvalidType { tag: String },

    /// An endpoint already carries `max` pipes.
    CapacityExceeded { node: NodeHandle, max: u32 },

    /// The two endpoints are already joined by a pipe (in either direction).
    DuplicateEdge { a: NodeHandle, b: NodeHandle },

    /// Both endpoints are sources or both are sinks.
    DirectionConflict { a: NodeKind, b: NodeKind },

    /// A pipe from a node to itself.
    SelfLoop { node: NodeHandle },

    /// The circuit already holds its pump.
    DuplicatePump,

    /// Node handle not present in the circuit.
    UnknownNode { node: NodeHandle },

    /// Pipe handle not present in the circuit.
    UnknownPipe { pipe: PipeHandle },

    /// An internal invariant check failed.
    InvariantViolated { what: String },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::InvalidType { tag } => write!(f, "Unknown node type '{}'", tag),
            GraphError::CapacityExceeded { node, max } => {
                write!(
                    f,
                    "Node {} already has its maximum of {} connection(s)",
                    node, max
                )
            }
            GraphError::DuplicateEdge { a, b } => {
                write!(f, "Nodes {} and {} are already connected", a, b)
            }
            GraphError::DirectionConflict { a, b } => {
                write!(
                    f,
                    "Cannot connect {} to {}: flow direction conflict",
                    a.label(),
                    b.label()
                )
            }
            GraphError::SelfLoop { node } => write!(f, "Node {} cannot connect to itself", node),
            GraphError::DuplicatePump => write!(f, "The circuit already has a pump"),
            GraphError::UnknownNode { node } => write!(f, "Node {} does not exist", node),
            GraphError::UnknownPipe { pipe } => write!(f, "Pipe {} does not exist", pipe),
            GraphError::InvariantViolated { what } => write!(f, "Invariant violated: {}", what),
        }
    }
}

impl std::error::Error for GraphError {}

impl GraphError {
    /// Constraint rejections are user-facing warnings; the rest are bugs or stale handles.
    pub fn is_constraint(&self) -> bool {
        matches!(
            self,
            GraphError::CapacityExceeded { .. }
                | GraphError::DuplicateEdge { .. }
                | GraphError::DirectionConflict { .. }
                | GraphError::SelfLoop { .. }
                | GraphError::DuplicatePump
        )
    }
}
