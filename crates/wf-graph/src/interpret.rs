//! Circuit interpretation: which washing components each pump output reaches.

use std::collections::{BTreeMap, HashSet};

use tracing::warn;
use wf_core::NodeHandle;

use crate::circuit::Circuit;
use crate::node::{CircuitNode, NodeKind};

/// A washing-component row as listed in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRef {
    pub id: String,
    pub name: String,
}

impl ComponentRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A component reached from a pump output, with its resolved identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachedComponent {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
}

/// Problems found while interpreting one circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterpretationIssue {
    /// The circuit has no pump node.
    MissingPump,
    /// Every document row named `name` was already used by an earlier
    /// emission of this pump, so `id` is reached more than once.
    DuplicateIdentity {
        id: String,
        name: String,
        output: u32,
    },
    /// No document row is named `name`; the node identity was used as is.
    UnknownComponent { name: String, output: u32 },
}

impl std::fmt::Display for InterpretationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterpretationIssue::MissingPump => write!(f, "The circuit has no pump"),
            InterpretationIssue::DuplicateIdentity { name, output, .. } => write!(
                f,
                "'{}' is reached more than once (again on output {})",
                name, output
            ),
            InterpretationIssue::UnknownComponent { name, output } => write!(
                f,
                "'{}' on output {} is not in the washing components list",
                name, output
            ),
        }
    }
}

/// Interpretation of one pump circuit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PumpInterpretation {
    pub pump_index: usize,
    pub pump_id: String,
    pub pump_name: String,
    /// 1-based output index to reached components in traversal order.
    pub outputs: BTreeMap<u32, Vec<ReachedComponent>>,
    pub issues: Vec<InterpretationIssue>,
}

impl PumpInterpretation {
    pub fn has_duplicates(&self) -> bool {
        self.issues
            .iter()
            .any(|i| matches!(i, InterpretationIssue::DuplicateIdentity { .. }))
    }

    pub fn component_count(&self) -> usize {
        self.outputs.values().map(Vec::len).sum()
    }
}

/// Derive per-output component lists for the circuit of pump `pump_index`.
///
/// Outputs are the pump's direct pipes ranked by target x. Each output is
/// walked depth first, children visited left to right; connectors are
/// traversed but not emitted.
pub fn interpret(
    circuit: &Circuit,
    pump_index: usize,
    washing_components: &[ComponentRef],
) -> PumpInterpretation {
    let mut result = PumpInterpretation {
        pump_index,
        ..Default::default()
    };
    let Some(pump) = circuit.pump() else {
        result.issues.push(InterpretationIssue::MissingPump);
        return result;
    };
    result.pump_id = pump.identity.clone();
    result.pump_name = pump.original_name.clone();

    let mut consumed: HashSet<&str> = HashSet::new();
    for (output, start) in (1u32..).zip(sorted_targets(circuit, pump.handle)) {
        let mut reached = Vec::new();
        for node in walk(circuit, start) {
            if node.kind != NodeKind::Component {
                continue;
            }
            let id = resolve_identity(
                node,
                output,
                washing_components,
                &mut consumed,
                &mut result.issues,
                pump_index,
            );
            reached.push(ReachedComponent {
                id,
                name: node.original_name.clone(),
                kind: node.kind,
            });
        }
        result.outputs.insert(output, reached);
    }
    result
}

/// Targets of outgoing pipes from `node`, ordered left to right.
fn sorted_targets(circuit: &Circuit, node: NodeHandle) -> Vec<NodeHandle> {
    let mut targets: Vec<&CircuitNode> = circuit
        .outgoing(node)
        .filter_map(|p| circuit.node(p.target))
        .collect();
    targets.sort_by(|a, b| {
        a.position
            .x
            .total_cmp(&b.position.x)
            .then(a.position.y.total_cmp(&b.position.y))
            .then(a.handle.cmp(&b.handle))
    });
    targets.into_iter().map(|n| n.handle).collect()
}

/// Pre-order depth-first walk from `start` along outgoing pipes.
fn walk(circuit: &Circuit, start: NodeHandle) -> Vec<&CircuitNode> {
    let mut visited = HashSet::new();
    let mut order = Vec::new();
    let mut stack = vec![start];
    while let Some(handle) = stack.pop() {
        if !visited.insert(handle) {
            continue;
        }
        let Some(node) = circuit.node(handle) else {
            continue;
        };
        order.push(node);
        let children = sorted_targets(circuit, handle);
        stack.extend(children.into_iter().rev());
    }
    order
}

fn resolve_identity<'a>(
    node: &CircuitNode,
    output: u32,
    rows: &'a [ComponentRef],
    consumed: &mut HashSet<&'a str>,
    issues: &mut Vec<InterpretationIssue>,
    pump_index: usize,
) -> String {
    let mut matches = rows.iter().filter(|r| r.name == node.original_name);
    let Some(first) = matches.clone().next() else {
        issues.push(InterpretationIssue::UnknownComponent {
            name: node.original_name.clone(),
            output,
        });
        return node.identity.clone();
    };
    if let Some(free) = matches.find(|r| !consumed.contains(r.id.as_str())) {
        consumed.insert(free.id.as_str());
        return free.id.clone();
    }
    warn!(
        pump_index,
        component_id = %first.id,
        name = %first.name,
        output,
        "component reached more than once; reusing identity"
    );
    issues.push(InterpretationIssue::DuplicateIdentity {
        id: first.id.clone(),
        name: first.name.clone(),
        output,
    });
    first.id.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::PlacementRules;
    use crate::node::NodeSpec;
    use crate::pipe::PipeParameters;
    use wf_core::{CanvasRect, Point};

    fn rows() -> Vec<ComponentRef> {
        vec![
            ComponentRef::new("wc-a", "A"),
            ComponentRef::new("wc-b", "B"),
            ComponentRef::new("wc-c", "C"),
        ]
    }

    fn circuit() -> Circuit {
        Circuit::new(CanvasRect::new(1000.0, 600.0), PlacementRules::default())
    }

    #[test]
    fn no_pump_yields_empty_outputs() {
        let result = interpret(&circuit(), 3, &rows());
        assert_eq!(result.pump_index, 3);
        assert!(result.outputs.is_empty());
        assert_eq!(result.issues, vec![InterpretationIssue::MissingPump]);
    }

    #[test]
    fn outputs_ranked_by_target_x() {
        let mut c = circuit();
        let p = c
            .place_node(NodeSpec::pump("p1", "P", 2), Point::new(100.0, 300.0))
            .unwrap();
        let b = c
            .place_node(NodeSpec::component("x", "B"), Point::new(700.0, 100.0))
            .unwrap();
        let a = c
            .place_node(NodeSpec::component("y", "A"), Point::new(400.0, 500.0))
            .unwrap();
        c.connect(p, b, PipeParameters::default()).unwrap();
        c.connect(p, a, PipeParameters::default()).unwrap();

        let result = interpret(&c, 0, &rows());
        assert_eq!(result.pump_id, "p1");
        assert_eq!(result.outputs[&1][0].name, "A");
        assert_eq!(result.outputs[&1][0].id, "wc-a");
        assert_eq!(result.outputs[&2][0].name, "B");
        assert!(result.issues.is_empty());
    }

    #[test]
    fn connectors_are_transparent() {
        let mut c = circuit();
        let p = c
            .place_node(NodeSpec::pump("p1", "P", 1), Point::new(100.0, 300.0))
            .unwrap();
        let t = c
            .place_node(
                NodeSpec::connector(NodeKind::TConnector, "t", "T").unwrap(),
                Point::new(300.0, 300.0),
            )
            .unwrap();
        let s = c
            .place_node(
                NodeSpec::connector(NodeKind::StraightConnector, "s", "S").unwrap(),
                Point::new(450.0, 200.0),
            )
            .unwrap();
        let a = c
            .place_node(NodeSpec::component("a", "A"), Point::new(600.0, 200.0))
            .unwrap();
        let b = c
            .place_node(NodeSpec::component("b", "B"), Point::new(500.0, 450.0))
            .unwrap();
        c.connect(p, t, PipeParameters::default()).unwrap();
        c.connect(t, s, PipeParameters::default()).unwrap();
        c.connect(s, a, PipeParameters::default()).unwrap();
        c.connect(t, b, PipeParameters::default()).unwrap();

        let result = interpret(&c, 0, &rows());
        let names: Vec<_> = result.outputs[&1].iter().map(|r| r.name.as_str()).collect();
        // S (x=450) is visited before B (x=500), and A hangs off S.
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn duplicate_rows_consume_distinct_ids() {
        let mut c = circuit();
        let p = c
            .place_node(NodeSpec::pump("p1", "P", 2), Point::new(100.0, 300.0))
            .unwrap();
        let a1 = c
            .place_node(NodeSpec::component("n1", "A"), Point::new(400.0, 100.0))
            .unwrap();
        let a2 = c
            .place_node(NodeSpec::component("n2", "A"), Point::new(600.0, 100.0))
            .unwrap();
        c.connect(p, a1, PipeParameters::default()).unwrap();
        c.connect(p, a2, PipeParameters::default()).unwrap();

        let with_two = vec![ComponentRef::new("a-1", "A"), ComponentRef::new("a-2", "A")];
        let result = interpret(&c, 0, &with_two);
        assert_eq!(result.outputs[&1][0].id, "a-1");
        assert_eq!(result.outputs[&2][0].id, "a-2");
        assert!(!result.has_duplicates());

        let with_one = vec![ComponentRef::new("a-1", "A")];
        let result = interpret(&c, 0, &with_one);
        assert_eq!(result.outputs[&2][0].id, "a-1");
        assert!(result.has_duplicates());
    }

    #[test]
    fn unknown_component_keeps_node_identity() {
        let mut c = circuit();
        let p = c
            .place_node(NodeSpec::pump("p1", "P", 1), Point::new(100.0, 300.0))
            .unwrap();
        let z = c
            .place_node(NodeSpec::component("node-z", "Z"), Point::new(400.0, 100.0))
            .unwrap();
        c.connect(p, z, PipeParameters::default()).unwrap();
        let result = interpret(&c, 0, &rows());
        assert_eq!(result.outputs[&1][0].id, "node-z");
        assert!(matches!(
            result.issues[0],
            InterpretationIssue::UnknownComponent { .. }
        ));
    }
}
