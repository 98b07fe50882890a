//! wf-graph: circuit graph model for washflow.
//!
//! Provides:
//! - Typed circuit nodes (pump, washing component, connectors) and pipes
//! - The per-pump `Circuit` store with capacity, direction and uniqueness rules
//! - Snapshot/restore with handle remapping
//! - Interpretation of a circuit into per-output lists of reached components
//!
//! # Example
//!
//! ```
//! use wf_core::{CanvasRect, Point};
//! use wf_graph::{Circuit, NodeSpec, PipeParameters, PlacementRules};
//!
//! let mut circuit = Circuit::new(CanvasRect::new(800.0, 600.0), PlacementRules::default());
//! let pump = circuit
//!     .place_node(NodeSpec::pump("p1", "Pump A", 1), Point::new(200.0, 200.0))
//!     .unwrap();
//! let nozzle = circuit
//!     .place_node(NodeSpec::component("w1", "W"), Point::new(500.0, 200.0))
//!     .unwrap();
//! circuit.connect(pump, nozzle, PipeParameters::default()).unwrap();
//!
//! assert_eq!(circuit.pipes().count(), 1);
//! ```

pub mod circuit;
pub mod direction;
pub mod error;
pub mod interpret;
pub mod node;
pub mod pipe;
pub mod snapshot;
pub mod validate;

// Re-exports for ergonomics
pub use circuit::{Circuit, Connection, PlacementRules, RemovedNode};
pub use direction::{resolve_orientation, Orientation};
pub use error::{GraphError, GraphResult};
pub use interpret::{
    interpret, ComponentRef, InterpretationIssue, PumpInterpretation, ReachedComponent,
};
pub use node::{CircuitNode, Direction, NodeKind, NodeSpec};
pub use pipe::{Inclination, Pipe, PipeParameters};
pub use snapshot::{
    fingerprint, CircuitSnapshot, RestoreIssue, RestoreReport, SnapshotNode, SnapshotPipe,
};
pub use validate::check_invariants;
