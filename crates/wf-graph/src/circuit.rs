//! The per-pump circuit store.

use std::collections::BTreeMap;

use wf_core::{clamp_to_canvas, CanvasRect, HandleAllocator, NodeHandle, PipeHandle, Point};

use crate::direction::{resolve_orientation, Orientation};
use crate::error::{GraphError, GraphResult};
use crate::node::{CircuitNode, NodeKind, NodeSpec};
use crate::pipe::{Pipe, PipeParameters};

/// Icon sizes and margin used to keep nodes inside the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRules {
    pub pump_icon: f64,
    pub component_icon: f64,
    pub connector_icon: f64,
    pub margin: f64,
}

impl Default for PlacementRules {
    fn default() -> Self {
        Self {
            pump_icon: 64.0,
            component_icon: 48.0,
            connector_icon: 32.0,
            margin: 4.0,
        }
    }
}

impl PlacementRules {
    pub fn icon_size(&self, kind: NodeKind) -> f64 {
        match kind {
            NodeKind::Pump => self.pump_icon,
            NodeKind::Component => self.component_icon,
            _ => self.connector_icon,
        }
    }

    /// Distance kept between a node centre and every canvas border.
    pub fn inset(&self, kind: NodeKind) -> f64 {
        self.icon_size(kind) / 2.0 + self.margin
    }
}

/// Outcome of a successful `connect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub pipe: PipeHandle,
    pub orientation: Orientation,
}

/// What `delete_node` took out of the circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedNode {
    pub node: CircuitNode,
    pub pipes: Vec<Pipe>,
}

/// Typed node and pipe store for one pump's circuit.
///
/// Every public mutation either succeeds with all invariants holding or
/// returns an error with the circuit unchanged.
#[derive(Debug, Clone)]
pub struct Circuit {
    canvas: CanvasRect,
    rules: PlacementRules,
    nodes: BTreeMap<NodeHandle, CircuitNode>,
    pipes: BTreeMap<PipeHandle, Pipe>,
    node_handles: HandleAllocator,
    pipe_handles: HandleAllocator,
    revision: u64,
}

impl Circuit {
    pub fn new(canvas: CanvasRect, rules: PlacementRules) -> Self {
        Self {
            canvas,
            rules,
            nodes: BTreeMap::new(),
            pipes: BTreeMap::new(),
            node_handles: HandleAllocator::new(),
            pipe_handles: HandleAllocator::new(),
            revision: 0,
        }
    }

    pub fn canvas(&self) -> CanvasRect {
        self.canvas
    }

    pub fn rules(&self) -> PlacementRules {
        self.rules
    }

    /// Counter bumped by every mutation; cheap dirty check for views.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &CircuitNode> {
        self.nodes.values()
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&CircuitNode> {
        self.nodes.get(&handle)
    }

    pub fn pipes(&self) -> impl Iterator<Item = &Pipe> {
        self.pipes.values()
    }

    pub fn pipe(&self, handle: PipeHandle) -> Option<&Pipe> {
        self.pipes.get(&handle)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn pipe_count(&self) -> usize {
        self.pipes.len()
    }

    pub fn pump(&self) -> Option<&CircuitNode> {
        self.nodes.values().find(|n| n.kind == NodeKind::Pump)
    }

    /// Pipes leaving `node`, in pipe-handle order.
    pub fn outgoing(&self, node: NodeHandle) -> impl Iterator<Item = &Pipe> {
        self.pipes.values().filter(move |p| p.source == node)
    }

    pub fn incident(&self, node: NodeHandle) -> impl Iterator<Item = &Pipe> {
        self.pipes.values().filter(move |p| p.touches(node))
    }

    pub fn pipe_between(&self, a: NodeHandle, b: NodeHandle) -> Option<&Pipe> {
        self.pipes.values().find(|p| p.joins(a, b))
    }

    /// Clamp `pos` with the inset for `kind`.
    pub fn clamp(&self, kind: NodeKind, pos: Point) -> Point {
        clamp_to_canvas(pos, self.canvas, self.rules.inset(kind))
    }

    /// Place a node, clamped into the canvas. The new node has no connections.
    pub fn place_node(&mut self, spec: NodeSpec, position: Point) -> GraphResult<NodeHandle> {
        if spec.kind == NodeKind::Pump && self.pump().is_some() {
            return Err(GraphError::DuplicatePump);
        }
        let handle = self.node_handles.allocate();
        let position = self.clamp(spec.kind, position);
        self.nodes.insert(
            handle,
            CircuitNode {
                handle,
                kind: spec.kind,
                direction: spec.kind.direction(),
                identity: spec.identity,
                original_name: spec.original_name,
                display_name: spec.display_name,
                position,
                max_connections: spec.max_connections,
                current_connections: 0,
            },
        );
        self.revision += 1;
        Ok(handle)
    }

    /// Check whether `first` and `second` may be joined, without mutating.
    pub fn can_connect(&self, first: NodeHandle, second: NodeHandle) -> GraphResult<Orientation> {
        let a = self.node_ref(first)?;
        let b = self.node_ref(second)?;
        if first == second {
            return Err(GraphError::SelfLoop { node: first });
        }
        for n in [a, b] {
            if n.is_full() {
                return Err(GraphError::CapacityExceeded {
                    node: n.handle,
                    max: n.max_connections,
                });
            }
        }
        if self.pipe_between(first, second).is_some() {
            return Err(GraphError::DuplicateEdge {
                a: first,
                b: second,
            });
        }
        resolve_orientation((first, a.kind), (second, b.kind))
    }

    /// Join two nodes with a pipe oriented by the direction rules.
    pub fn connect(
        &mut self,
        first: NodeHandle,
        second: NodeHandle,
        parameters: PipeParameters,
    ) -> GraphResult<Connection> {
        let orientation = self.can_connect(first, second)?;
        let handle = self.pipe_handles.allocate();
        self.pipes.insert(
            handle,
            Pipe {
                handle,
                source: orientation.source,
                target: orientation.target,
                parameters,
            },
        );
        for end in [orientation.source, orientation.target] {
            if let Some(node) = self.nodes.get_mut(&end) {
                node.current_connections += 1;
            }
        }
        self.revision += 1;
        Ok(Connection {
            pipe: handle,
            orientation,
        })
    }

    /// Remove a node and every pipe touching it.
    pub fn delete_node(&mut self, handle: NodeHandle) -> GraphResult<RemovedNode> {
        let node = self
            .nodes
            .remove(&handle)
            .ok_or(GraphError::UnknownNode { node: handle })?;
        let incident: Vec<PipeHandle> = self
            .pipes
            .values()
            .filter(|p| p.touches(handle))
            .map(|p| p.handle)
            .collect();
        let mut pipes = Vec::with_capacity(incident.len());
        for pipe_handle in incident {
            if let Some(pipe) = self.pipes.remove(&pipe_handle) {
                if let Some(other) = pipe.other_end(handle) {
                    self.release_connection(other);
                }
                pipes.push(pipe);
            }
        }
        self.revision += 1;
        Ok(RemovedNode { node, pipes })
    }

    /// Remove one pipe.
    pub fn delete_pipe(&mut self, handle: PipeHandle) -> GraphResult<Pipe> {
        let pipe = self
            .pipes
            .remove(&handle)
            .ok_or(GraphError::UnknownPipe { pipe: handle })?;
        self.release_connection(pipe.source);
        self.release_connection(pipe.target);
        self.revision += 1;
        Ok(pipe)
    }

    /// Move a node (clamped). Pipes reference nodes by handle so they follow.
    pub fn move_node(&mut self, handle: NodeHandle, position: Point) -> GraphResult<Point> {
        let kind = self.node_ref(handle)?.kind;
        let clamped = self.clamp(kind, position);
        if let Some(node) = self.nodes.get_mut(&handle) {
            if node.position != clamped {
                node.position = clamped;
                self.revision += 1;
            }
        }
        Ok(clamped)
    }

    pub fn set_pipe_parameters(
        &mut self,
        handle: PipeHandle,
        parameters: PipeParameters,
    ) -> GraphResult<()> {
        let pipe = self
            .pipes
            .get_mut(&handle)
            .ok_or(GraphError::UnknownPipe { pipe: handle })?;
        pipe.parameters = parameters;
        self.revision += 1;
        Ok(())
    }

    /// Display names belong to the view; changing one never touches the persisted name.
    pub fn set_display_name(&mut self, handle: NodeHandle, name: String) -> GraphResult<()> {
        let node = self
            .nodes
            .get_mut(&handle)
            .ok_or(GraphError::UnknownNode { node: handle })?;
        node.display_name = name;
        Ok(())
    }

    /// Resize the drawable area and re-clamp every node.
    pub fn set_canvas(&mut self, canvas: CanvasRect) {
        if canvas == self.canvas {
            return;
        }
        self.canvas = canvas;
        let rules = self.rules;
        for node in self.nodes.values_mut() {
            node.position = clamp_to_canvas(node.position, canvas, rules.inset(node.kind));
        }
        self.revision += 1;
    }

    /// Remove every node and pipe. Handles keep counting up.
    pub fn clear(&mut self) -> Vec<CircuitNode> {
        self.pipes.clear();
        let removed = std::mem::take(&mut self.nodes).into_values().collect();
        self.revision += 1;
        removed
    }

    /// Topmost node whose icon contains `point` (later placements are drawn on top).
    pub fn node_at(&self, point: Point) -> Option<NodeHandle> {
        self.nodes
            .values()
            .rev()
            .find(|n| {
                let half = self.rules.icon_size(n.kind) / 2.0;
                (point.x - n.position.x).abs() <= half && (point.y - n.position.y).abs() <= half
            })
            .map(|n| n.handle)
    }

    /// Nearest pipe whose centre line passes within `tolerance` of `point`.
    pub fn pipe_near(&self, point: Point, tolerance: f64) -> Option<PipeHandle> {
        self.pipes
            .values()
            .filter_map(|p| {
                let a = self.nodes.get(&p.source)?.position;
                let b = self.nodes.get(&p.target)?.position;
                let d = point.distance_to_segment(a, b);
                (d <= tolerance).then_some((d, p.handle))
            })
            .min_by(|x, y| x.0.total_cmp(&y.0))
            .map(|(_, h)| h)
    }

    fn node_ref(&self, handle: NodeHandle) -> GraphResult<&CircuitNode> {
        self.nodes
            .get(&handle)
            .ok_or(GraphError::UnknownNode { node: handle })
    }

    fn release_connection(&mut self, handle: NodeHandle) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.current_connections = node.current_connections.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::check_invariants;

    fn circuit() -> Circuit {
        Circuit::new(CanvasRect::new(800.0, 600.0), PlacementRules::default())
    }

    fn pipe() -> PipeParameters {
        PipeParameters {
            diameter_mm: 8.0,
            length_mm: 1500.0,
            ..Default::default()
        }
    }

    #[test]
    fn place_clamps_into_canvas() {
        let mut c = circuit();
        let h = c
            .place_node(NodeSpec::pump("p", "P", 1), Point::new(-100.0, 5000.0))
            .unwrap();
        let inset = PlacementRules::default().inset(NodeKind::Pump);
        assert_eq!(c.node(h).unwrap().position, Point::new(inset, 600.0 - inset));
        assert_eq!(c.node(h).unwrap().current_connections, 0);
    }

    #[test]
    fn second_pump_rejected() {
        let mut c = circuit();
        c.place_node(NodeSpec::pump("p", "P", 1), Point::new(100.0, 100.0))
            .unwrap();
        assert_eq!(
            c.place_node(NodeSpec::pump("q", "Q", 2), Point::new(300.0, 100.0)),
            Err(GraphError::DuplicatePump)
        );
        assert_eq!(c.node_count(), 1);
    }

    #[test]
    fn connect_updates_degrees() {
        let mut c = circuit();
        let p = c
            .place_node(NodeSpec::pump("p", "P", 2), Point::new(100.0, 100.0))
            .unwrap();
        let w = c
            .place_node(NodeSpec::component("w", "W"), Point::new(400.0, 100.0))
            .unwrap();
        let conn = c.connect(w, p, pipe()).unwrap();
        let created = c.pipe(conn.pipe).unwrap();
        assert_eq!((created.source, created.target), (p, w));
        assert_eq!(c.node(p).unwrap().current_connections, 1);
        assert_eq!(c.node(w).unwrap().current_connections, 1);
        check_invariants(&c).unwrap();
    }

    #[test]
    fn capacity_checked_before_direction() {
        let mut c = circuit();
        let p = c
            .place_node(NodeSpec::pump("p", "P", 1), Point::new(100.0, 100.0))
            .unwrap();
        let a = c
            .place_node(NodeSpec::component("a", "A"), Point::new(400.0, 100.0))
            .unwrap();
        let b = c
            .place_node(NodeSpec::component("b", "B"), Point::new(400.0, 300.0))
            .unwrap();
        c.connect(p, a, pipe()).unwrap();
        assert!(matches!(
            c.connect(p, b, pipe()),
            Err(GraphError::CapacityExceeded { .. })
        ));
        assert_eq!(c.pipe_count(), 1);
    }

    #[test]
    fn duplicate_edge_rejected_in_either_direction() {
        let mut c = circuit();
        let t = c
            .place_node(
                NodeSpec::connector(NodeKind::TConnector, "t1", "T").unwrap(),
                Point::new(200.0, 200.0),
            )
            .unwrap();
        let s = c
            .place_node(
                NodeSpec::connector(NodeKind::StraightConnector, "s1", "S").unwrap(),
                Point::new(300.0, 200.0),
            )
            .unwrap();
        c.connect(t, s, pipe()).unwrap();
        assert!(matches!(
            c.connect(s, t, pipe()),
            Err(GraphError::DuplicateEdge { .. })
        ));
    }

    #[test]
    fn self_loop_rejected() {
        let mut c = circuit();
        let t = c
            .place_node(
                NodeSpec::connector(NodeKind::TConnector, "t1", "T").unwrap(),
                Point::new(200.0, 200.0),
            )
            .unwrap();
        assert_eq!(
            c.connect(t, t, pipe()),
            Err(GraphError::SelfLoop { node: t })
        );
    }

    #[test]
    fn delete_node_releases_neighbours() {
        let mut c = circuit();
        let p = c
            .place_node(NodeSpec::pump("p", "P", 1), Point::new(100.0, 100.0))
            .unwrap();
        let t = c
            .place_node(
                NodeSpec::connector(NodeKind::TConnector, "t1", "T").unwrap(),
                Point::new(200.0, 200.0),
            )
            .unwrap();
        let a = c
            .place_node(NodeSpec::component("a", "A"), Point::new(400.0, 100.0))
            .unwrap();
        c.connect(p, t, pipe()).unwrap();
        c.connect(t, a, pipe()).unwrap();

        let removed = c.delete_node(t).unwrap();
        assert_eq!(removed.pipes.len(), 2);
        assert_eq!(c.node(p).unwrap().current_connections, 0);
        assert_eq!(c.node(a).unwrap().current_connections, 0);
        assert_eq!(c.pipe_count(), 0);
        check_invariants(&c).unwrap();
    }

    #[test]
    fn delete_pipe_and_unknown_handles() {
        let mut c = circuit();
        let p = c
            .place_node(NodeSpec::pump("p", "P", 1), Point::new(100.0, 100.0))
            .unwrap();
        let a = c
            .place_node(NodeSpec::component("a", "A"), Point::new(400.0, 100.0))
            .unwrap();
        let conn = c.connect(p, a, pipe()).unwrap();
        c.delete_pipe(conn.pipe).unwrap();
        assert_eq!(c.node(p).unwrap().current_connections, 0);
        assert!(matches!(
            c.delete_pipe(conn.pipe),
            Err(GraphError::UnknownPipe { .. })
        ));
        c.delete_node(a).unwrap();
        assert!(matches!(
            c.delete_node(a),
            Err(GraphError::UnknownNode { .. })
        ));
    }

    #[test]
    fn move_is_clamped_and_resize_reclamps() {
        let mut c = circuit();
        let a = c
            .place_node(NodeSpec::component("a", "A"), Point::new(400.0, 100.0))
            .unwrap();
        let pos = c.move_node(a, Point::new(10_000.0, 300.0)).unwrap();
        let inset = PlacementRules::default().inset(NodeKind::Component);
        assert_eq!(pos, Point::new(800.0 - inset, 300.0));

        c.set_canvas(CanvasRect::new(400.0, 200.0));
        assert_eq!(
            c.node(a).unwrap().position,
            Point::new(400.0 - inset, 200.0 - inset)
        );
    }

    #[test]
    fn hit_tests() {
        let mut c = circuit();
        let p = c
            .place_node(NodeSpec::pump("p", "P", 1), Point::new(100.0, 100.0))
            .unwrap();
        let a = c
            .place_node(NodeSpec::component("a", "A"), Point::new(500.0, 100.0))
            .unwrap();
        let conn = c.connect(p, a, pipe()).unwrap();
        assert_eq!(c.node_at(Point::new(110.0, 90.0)), Some(p));
        assert_eq!(c.node_at(Point::new(300.0, 300.0)), None);
        assert_eq!(c.pipe_near(Point::new(300.0, 104.0), 6.0), Some(conn.pipe));
        assert_eq!(c.pipe_near(Point::new(300.0, 130.0), 6.0), None);
    }

    #[test]
    fn revision_tracks_mutations() {
        let mut c = circuit();
        let r0 = c.revision();
        let a = c
            .place_node(NodeSpec::component("a", "A"), Point::new(400.0, 100.0))
            .unwrap();
        assert!(c.revision() > r0);
        let r1 = c.revision();
        c.move_node(a, Point::new(400.0, 100.0)).unwrap();
        assert_eq!(c.revision(), r1);
    }
}
