//! Structural invariant checks for a circuit.

use std::collections::{BTreeMap, HashSet};

use crate::circuit::Circuit;
use crate::error::{GraphError, GraphResult};
use crate::node::NodeKind;

/// Check every structural invariant of `circuit`.
///
/// Mutations keep these by construction, so a failure here is a bug.
pub fn check_invariants(circuit: &Circuit) -> GraphResult<()> {
    let pumps = circuit
        .nodes()
        .filter(|n| n.kind == NodeKind::Pump)
        .count();
    if pumps > 1 {
        return violated(format!("{} pump nodes in one circuit", pumps));
    }

    let mut degree = BTreeMap::new();
    let mut pairs = HashSet::new();
    for pipe in circuit.pipes() {
        let (Some(source), Some(target)) = (circuit.node(pipe.source), circuit.node(pipe.target))
        else {
            return violated(format!("pipe {} has a dangling endpoint", pipe.handle));
        };
        if pipe.source == pipe.target {
            return violated(format!("pipe {} is a self loop", pipe.handle));
        }
        let key = if pipe.source < pipe.target {
            (pipe.source, pipe.target)
        } else {
            (pipe.target, pipe.source)
        };
        if !pairs.insert(key) {
            return violated(format!(
                "nodes {} and {} joined twice",
                pipe.source, pipe.target
            ));
        }
        if !source.direction.can_send() || !target.direction.can_receive() {
            return violated(format!(
                "pipe {} runs from {} to {}",
                pipe.handle,
                source.kind.label(),
                target.kind.label()
            ));
        }
        *degree.entry(pipe.source).or_insert(0u32) += 1;
        *degree.entry(pipe.target).or_insert(0u32) += 1;
    }

    let canvas = circuit.canvas();
    for node in circuit.nodes() {
        if node.current_connections > node.max_connections {
            return violated(format!(
                "node {} has {} of {} connections",
                node.handle, node.current_connections, node.max_connections
            ));
        }
        let counted = degree.get(&node.handle).copied().unwrap_or(0);
        if counted != node.current_connections {
            return violated(format!(
                "node {} counts {} connections but touches {} pipes",
                node.handle, node.current_connections, counted
            ));
        }
        if circuit.clamp(node.kind, node.position) != node.position {
            return violated(format!(
                "node {} at ({}, {}) lies outside the {}x{} canvas",
                node.handle, node.position.x, node.position.y, canvas.width, canvas.height
            ));
        }
    }
    Ok(())
}

fn violated(what: String) -> GraphResult<()> {
    Err(GraphError::InvariantViolated { what })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::PlacementRules;
    use crate::node::NodeSpec;
    use crate::pipe::PipeParameters;
    use wf_core::{CanvasRect, Point};

    #[test]
    fn empty_circuit_is_valid() {
        let c = Circuit::new(CanvasRect::default(), PlacementRules::default());
        assert!(check_invariants(&c).is_ok());
    }

    #[test]
    fn built_circuit_is_valid() {
        let mut c = Circuit::new(CanvasRect::default(), PlacementRules::default());
        let p = c
            .place_node(NodeSpec::pump("p", "P", 2), Point::new(100.0, 300.0))
            .unwrap();
        let y = c
            .place_node(
                NodeSpec::connector(NodeKind::YConnector, "y", "Y").unwrap(),
                Point::new(300.0, 300.0),
            )
            .unwrap();
        let a = c
            .place_node(NodeSpec::component("a", "A"), Point::new(500.0, 200.0))
            .unwrap();
        c.connect(p, y, PipeParameters::default()).unwrap();
        c.connect(a, y, PipeParameters::default()).unwrap();
        assert!(check_invariants(&c).is_ok());
    }
}
