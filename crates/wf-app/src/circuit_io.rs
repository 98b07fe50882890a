//! Conversions between the graph model and the `circuits` document section.

use std::collections::{BTreeMap, HashSet};

use tracing::warn;
use wf_core::Point;
use wf_graph::{
    interpret, Circuit, CircuitSnapshot, ComponentRef, Inclination, NodeKind, NodeSpec,
    PipeParameters, PumpInterpretation, ReachedComponent, RestoreReport, SnapshotNode,
    SnapshotPipe,
};
use wf_project::{
    CircuitDef, CircuitNodeDef, CircuitPipeDef, Configuration, InclinationDef, PipeParametersDef,
    PumpRow, PumpSummaryDef, SummaryEntryDef, WashingComponentRow,
};

use crate::settings::AppSettings;

pub fn params_to_def(p: &PipeParameters) -> PipeParametersDef {
    PipeParametersDef {
        diameter: p.diameter_mm,
        pipe_type: p.pipe_type.clone(),
        length: p.length_mm,
        inclination: match p.inclination {
            Inclination::Straight => InclinationDef::Straight,
            Inclination::Bent => InclinationDef::Bent,
        },
        bend_radius: p.bend_radius_mm,
        bend_angle: p.bend_angle_deg,
        pipe_ref: p.pipe_ref.clone(),
        supplier: p.supplier.clone(),
    }
}

pub fn params_from_def(d: &PipeParametersDef) -> PipeParameters {
    PipeParameters {
        diameter_mm: d.diameter,
        pipe_type: d.pipe_type.clone(),
        length_mm: d.length,
        inclination: match d.inclination {
            InclinationDef::Straight => Inclination::Straight,
            InclinationDef::Bent => Inclination::Bent,
        },
        bend_radius_mm: d.bend_radius,
        bend_angle_deg: d.bend_angle,
        pipe_ref: d.pipe_ref.clone(),
        supplier: d.supplier.clone(),
    }
}

pub fn snapshot_to_def(snapshot: &CircuitSnapshot) -> CircuitDef {
    CircuitDef {
        components: snapshot
            .nodes
            .iter()
            .map(|n| CircuitNodeDef {
                id: n.saved_id,
                kind: n.kind.tag().to_string(),
                name: n.name.clone(),
                position: n.position.into(),
                connections: n.connections,
            })
            .collect(),
        connections: snapshot
            .pipes
            .iter()
            .map(|p| CircuitPipeDef {
                from: p.from,
                to: p.to,
                from_name: p.from_name.clone(),
                to_name: p.to_name.clone(),
                parameters: params_to_def(&p.parameters),
            })
            .collect(),
    }
}

/// Nodes with an unknown type tag are dropped (and logged); their pipes
/// surface later as missing endpoints.
pub fn def_to_snapshot(def: &CircuitDef) -> CircuitSnapshot {
    let mut nodes = Vec::with_capacity(def.components.len());
    for n in &def.components {
        match n.kind.parse::<NodeKind>() {
            Ok(kind) => nodes.push(SnapshotNode {
                saved_id: n.id,
                kind,
                name: n.name.clone(),
                position: Point::from(n.position),
                connections: n.connections,
            }),
            Err(err) => warn!(saved_id = n.id, error = %err, "skipping saved node"),
        }
    }
    let pipes = def
        .connections
        .iter()
        .map(|c| SnapshotPipe {
            from: c.from,
            to: c.to,
            from_name: c.from_name.clone(),
            to_name: c.to_name.clone(),
            parameters: params_from_def(&c.parameters),
        })
        .collect();
    CircuitSnapshot { nodes, pipes }
}

pub fn component_refs(rows: &[WashingComponentRow]) -> Vec<ComponentRef> {
    rows.iter()
        .map(|r| ComponentRef::new(r.id.clone(), r.name.clone()))
        .collect()
}

/// Resolves saved nodes against the current document for one pump's circuit.
///
/// Components match by name, each document row used at most once per
/// circuit; `claimed` lists ids already placed elsewhere.
pub struct NodeResolver<'a> {
    pump: Option<&'a PumpRow>,
    rows: &'a [WashingComponentRow],
    used: HashSet<&'a str>,
}

impl<'a> NodeResolver<'a> {
    pub fn new(
        pump: Option<&'a PumpRow>,
        rows: &'a [WashingComponentRow],
        claimed: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            pump,
            rows,
            used: claimed.into_iter().collect(),
        }
    }

    pub fn resolve(&mut self, saved: &SnapshotNode) -> Option<NodeSpec> {
        match saved.kind {
            NodeKind::Pump => self
                .pump
                .map(|p| NodeSpec::pump(p.id.clone(), p.name.clone(), p.outputs.count())),
            NodeKind::Component => {
                let row = self
                    .rows
                    .iter()
                    .find(|r| r.name == saved.name && !self.used.contains(r.id.as_str()))?;
                self.used.insert(row.id.as_str());
                Some(NodeSpec::component(row.id.clone(), row.name.clone()))
            }
            kind => NodeSpec::connector(
                kind,
                format!("{}-{}", kind.tag(), saved.saved_id),
                saved.name.clone(),
            ),
        }
    }
}

/// Rebuild a pump circuit from its saved form without an editor.
pub fn restore_circuit(
    def: &CircuitDef,
    pump: Option<&PumpRow>,
    rows: &[WashingComponentRow],
    settings: &AppSettings,
) -> (Circuit, RestoreReport) {
    let mut circuit = Circuit::new(settings.canvas_rect(), settings.placement_rules());
    let mut resolver = NodeResolver::new(pump, rows, std::iter::empty());
    let report = circuit.restore(&def_to_snapshot(def), |saved| resolver.resolve(saved));
    (circuit, report)
}

pub fn interpretation_to_summary(interp: &PumpInterpretation) -> PumpSummaryDef {
    PumpSummaryDef {
        pump_index: interp.pump_index,
        pump_id: interp.pump_id.clone(),
        pump_name: interp.pump_name.clone(),
        outputs: interp
            .outputs
            .iter()
            .map(|(output, reached)| {
                let entries = reached
                    .iter()
                    .map(|r| SummaryEntryDef {
                        id: r.id.clone(),
                        name: r.name.clone(),
                        kind: r.kind.tag().to_string(),
                    })
                    .collect();
                (output.to_string(), entries)
            })
            .collect(),
    }
}

/// Read a saved summary back. Output keys that are not numbers are skipped.
pub fn summary_to_interpretation(summary: &PumpSummaryDef) -> PumpInterpretation {
    let mut outputs = BTreeMap::new();
    for (key, entries) in &summary.outputs {
        let Ok(output) = key.trim().parse::<u32>() else {
            warn!(pump_index = summary.pump_index, key = %key, "skipping summary output");
            continue;
        };
        let reached = entries
            .iter()
            .map(|e| ReachedComponent {
                id: e.id.clone(),
                name: e.name.clone(),
                kind: e.kind.parse().unwrap_or(NodeKind::Component),
            })
            .collect();
        outputs.insert(output, reached);
    }
    PumpInterpretation {
        pump_index: summary.pump_index,
        pump_id: summary.pump_id.clone(),
        pump_name: summary.pump_name.clone(),
        outputs,
        issues: Vec::new(),
    }
}

/// Interpret every saved pump circuit of a document.
pub fn summarize_document(config: &Configuration, settings: &AppSettings) -> Vec<PumpInterpretation> {
    let refs = component_refs(&config.washing_components);
    config
        .circuits
        .circuits
        .iter()
        .map(|entry| {
            let (circuit, report) = restore_circuit(
                &entry.circuit,
                config.pump(entry.pump_index),
                &config.washing_components,
                settings,
            );
            for issue in &report.issues {
                warn!(pump_index = entry.pump_index, %issue, "restore issue");
            }
            interpret(&circuit, entry.pump_index, &refs)
        })
        .collect()
}
