//! Snapshot and restore of a circuit.
//!
//! Saved node ids are local to the session that wrote them. Restore treats
//! them as opaque keys into a fresh handle map and never dereferences them.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::warn;
use wf_core::{NodeHandle, Point};

use crate::circuit::Circuit;
use crate::error::GraphError;
use crate::node::{NodeKind, NodeSpec};
use crate::pipe::PipeParameters;

/// A node as stored in the `circuits` section.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotNode {
    pub saved_id: u32,
    pub kind: NodeKind,
    /// Original (unsuffixed) name.
    pub name: String,
    pub position: Point,
    pub connections: u32,
}

/// A pipe as stored in the `circuits` section.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotPipe {
    pub from: u32,
    pub to: u32,
    pub from_name: String,
    pub to_name: String,
    pub parameters: PipeParameters,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CircuitSnapshot {
    pub nodes: Vec<SnapshotNode>,
    pub pipes: Vec<SnapshotPipe>,
}

impl CircuitSnapshot {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.pipes.is_empty()
    }
}

/// Something a restore had to skip.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RestoreIssue {
    #[error("{kind:?} '{name}' (saved id {saved_id}) no longer exists in the document")]
    UnresolvedNode {
        saved_id: u32,
        kind: NodeKind,
        name: String,
    },

    #[error("'{name}' (saved id {saved_id}) could not be placed: {reason}")]
    NodeRejected {
        saved_id: u32,
        name: String,
        reason: GraphError,
    },

    #[error("pipe {from_name} -> {to_name} references a node that was not restored")]
    MissingEndpoint { from_name: String, to_name: String },

    #[error("pipe {from_name} -> {to_name} could not be recreated: {reason}")]
    PipeRejected {
        from_name: String,
        to_name: String,
        reason: GraphError,
    },
}

/// Result of `Circuit::restore`.
#[derive(Debug, Clone, Default)]
pub struct RestoreReport {
    /// Saved id to freshly allocated handle.
    pub handle_map: BTreeMap<u32, NodeHandle>,
    pub issues: Vec<RestoreIssue>,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

impl Circuit {
    /// Capture nodes and pipes, nodes in handle order.
    pub fn snapshot(&self) -> CircuitSnapshot {
        let nodes = self
            .nodes()
            .map(|n| SnapshotNode {
                saved_id: n.handle.index(),
                kind: n.kind,
                name: n.original_name.clone(),
                position: n.position,
                connections: n.current_connections,
            })
            .collect();
        let name_of = |h: NodeHandle| {
            self.node(h)
                .map(|n| n.original_name.clone())
                .unwrap_or_default()
        };
        let pipes = self
            .pipes()
            .map(|p| SnapshotPipe {
                from: p.source.index(),
                to: p.target.index(),
                from_name: name_of(p.source),
                to_name: name_of(p.target),
                parameters: p.parameters.clone(),
            })
            .collect();
        CircuitSnapshot { nodes, pipes }
    }

    /// Replace the circuit contents with `snapshot`.
    ///
    /// `resolve` turns a saved node into a placeable spec (identity, display
    /// name, capacity) or `None` when the document no longer knows it.
    /// Unresolvable nodes and pipes are skipped and reported; restore never aborts.
    pub fn restore<F>(&mut self, snapshot: &CircuitSnapshot, mut resolve: F) -> RestoreReport
    where
        F: FnMut(&SnapshotNode) -> Option<NodeSpec>,
    {
        self.clear();
        let mut report = RestoreReport::default();

        // Phase 1: place every resolvable node at its saved position.
        let mut placed: Vec<(NodeHandle, NodeKind, String, Point)> = Vec::new();
        for saved in &snapshot.nodes {
            let Some(spec) = resolve(saved) else {
                warn!(saved_id = saved.saved_id, name = %saved.name, "skipping node missing from document");
                report.issues.push(RestoreIssue::UnresolvedNode {
                    saved_id: saved.saved_id,
                    kind: saved.kind,
                    name: saved.name.clone(),
                });
                continue;
            };
            let kind = spec.kind;
            let name = spec.original_name.clone();
            match self.place_node(spec, saved.position) {
                Ok(handle) => {
                    let at = self.node(handle).map(|n| n.position).unwrap_or(saved.position);
                    placed.push((handle, kind, name, at));
                }
                Err(reason) => {
                    warn!(saved_id = saved.saved_id, %reason, "skipping node during restore");
                    report.issues.push(RestoreIssue::NodeRejected {
                        saved_id: saved.saved_id,
                        name: saved.name.clone(),
                        reason,
                    });
                }
            }
        }

        // Map saved ids by (kind, name), nearest placed position wins.
        // The pump is unique, so a renamed pump still maps.
        let mut claimed = vec![false; placed.len()];
        for saved in &snapshot.nodes {
            let target = self.clamp(saved.kind, saved.position);
            let best = placed
                .iter()
                .enumerate()
                .filter(|(i, (_, kind, name, _))| {
                    !claimed[*i]
                        && *kind == saved.kind
                        && (saved.kind == NodeKind::Pump || *name == saved.name)
                })
                .min_by(|(_, a), (_, b)| a.3.distance(target).total_cmp(&b.3.distance(target)))
                .map(|(i, (handle, ..))| (i, *handle));
            if let Some((i, handle)) = best {
                claimed[i] = true;
                report.handle_map.insert(saved.saved_id, handle);
            }
        }

        // Phase 2: recreate pipes through the handle map.
        for pipe in &snapshot.pipes {
            let ends = (
                report.handle_map.get(&pipe.from).copied(),
                report.handle_map.get(&pipe.to).copied(),
            );
            let (Some(from), Some(to)) = ends else {
                warn!(from = pipe.from, to = pipe.to, "skipping pipe with unmapped endpoint");
                report.issues.push(RestoreIssue::MissingEndpoint {
                    from_name: pipe.from_name.clone(),
                    to_name: pipe.to_name.clone(),
                });
                continue;
            };
            if let Err(reason) = self.connect(from, to, pipe.parameters.clone()) {
                warn!(from = pipe.from, to = pipe.to, %reason, "skipping pipe during restore");
                report.issues.push(RestoreIssue::PipeRejected {
                    from_name: pipe.from_name.clone(),
                    to_name: pipe.to_name.clone(),
                    reason,
                });
            }
        }

        report
    }
}

/// Hex SHA-256 over node kinds, names, positions and pipe endpoints.
///
/// Cheap enough to compare on a timer. Nodes are hashed by their rank in
/// handle order rather than by handle, so two restores of the same document
/// fingerprint identically.
pub fn fingerprint(circuit: &Circuit) -> String {
    let rank: BTreeMap<NodeHandle, u32> = circuit
        .nodes()
        .enumerate()
        .map(|(i, n)| (n.handle, i as u32))
        .collect();
    let rank_of = |h: NodeHandle| rank.get(&h).copied().unwrap_or(u32::MAX);
    let mut hasher = Sha256::new();
    for node in circuit.nodes() {
        hasher.update(rank_of(node.handle).to_le_bytes());
        hasher.update(node.kind.tag().as_bytes());
        hasher.update([0]);
        hasher.update(node.original_name.as_bytes());
        hasher.update([0]);
        hasher.update(node.position.x.to_le_bytes());
        hasher.update(node.position.y.to_le_bytes());
    }
    hasher.update(b"|");
    for pipe in circuit.pipes() {
        hasher.update(rank_of(pipe.source).to_le_bytes());
        hasher.update(rank_of(pipe.target).to_le_bytes());
        hasher.update(pipe.parameters.length_mm.to_le_bytes());
        hasher.update(pipe.parameters.diameter_mm.to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::PlacementRules;
    use crate::validate::check_invariants;
    use wf_core::CanvasRect;

    fn resolver(saved: &SnapshotNode) -> Option<NodeSpec> {
        match saved.kind {
            NodeKind::Pump => Some(NodeSpec::pump("p", saved.name.clone(), 2)),
            NodeKind::Component => Some(NodeSpec::component(
                format!("id-{}", saved.name),
                saved.name.clone(),
            )),
            kind => NodeSpec::connector(kind, format!("c{}", saved.saved_id), saved.name.clone()),
        }
    }

    fn split_circuit() -> Circuit {
        let mut c = Circuit::new(CanvasRect::new(800.0, 600.0), PlacementRules::default());
        let p = c
            .place_node(NodeSpec::pump("p", "P", 1), Point::new(100.0, 300.0))
            .unwrap();
        let t = c
            .place_node(
                NodeSpec::connector(NodeKind::TConnector, "t", "T-Connector").unwrap(),
                Point::new(300.0, 300.0),
            )
            .unwrap();
        let a = c
            .place_node(NodeSpec::component("a", "A"), Point::new(500.0, 200.0))
            .unwrap();
        let b = c
            .place_node(NodeSpec::component("b", "B"), Point::new(600.0, 400.0))
            .unwrap();
        c.connect(p, t, PipeParameters::default()).unwrap();
        c.connect(t, a, PipeParameters::default()).unwrap();
        c.connect(b, t, PipeParameters::default()).unwrap();
        c
    }

    #[test]
    fn snapshot_restore_preserves_structure() {
        let original = split_circuit();
        let snap = original.snapshot();

        let mut restored = Circuit::new(CanvasRect::new(800.0, 600.0), PlacementRules::default());
        let report = restored.restore(&snap, resolver);
        assert!(report.is_clean(), "{:?}", report.issues);
        assert_eq!(restored.node_count(), 4);
        assert_eq!(restored.pipe_count(), 3);
        check_invariants(&restored).unwrap();

        let names: Vec<_> = restored
            .nodes()
            .map(|n| (n.original_name.clone(), n.position))
            .collect();
        let expected: Vec<_> = original
            .nodes()
            .map(|n| (n.original_name.clone(), n.position))
            .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn missing_component_is_skipped_with_its_pipe() {
        let snap = split_circuit().snapshot();
        let mut restored = Circuit::new(CanvasRect::new(800.0, 600.0), PlacementRules::default());
        let report = restored.restore(&snap, |saved| {
            if saved.name == "B" {
                None
            } else {
                resolver(saved)
            }
        });
        assert_eq!(restored.node_count(), 3);
        assert_eq!(restored.pipe_count(), 2);
        assert!(report
            .issues
            .iter()
            .any(|i| matches!(i, RestoreIssue::UnresolvedNode { name, .. } if name == "B")));
        assert!(report
            .issues
            .iter()
            .any(|i| matches!(i, RestoreIssue::MissingEndpoint { .. })));
    }

    #[test]
    fn saved_ids_are_opaque_keys() {
        let mut snap = split_circuit().snapshot();
        for node in &mut snap.nodes {
            node.saved_id += 1000;
        }
        for pipe in &mut snap.pipes {
            pipe.from += 1000;
            pipe.to += 1000;
        }
        let mut restored = Circuit::new(CanvasRect::new(800.0, 600.0), PlacementRules::default());
        let report = restored.restore(&snap, resolver);
        assert!(report.is_clean());
        assert_eq!(restored.pipe_count(), 3);
        assert!(report.handle_map.contains_key(&1000));
    }

    #[test]
    fn fingerprint_tracks_structure() {
        let mut c = split_circuit();
        let before = fingerprint(&c);
        assert_eq!(before, fingerprint(&c.clone()));
        let a = c.nodes().find(|n| n.original_name == "A").unwrap().handle;
        c.move_node(a, Point::new(520.0, 210.0)).unwrap();
        assert_ne!(before, fingerprint(&c));
    }
}
