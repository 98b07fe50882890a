//! Canvas editor: the pointer state machine over one pump's circuit.
//!
//! The editor owns its `Circuit` and never talks to sibling editors directly.
//! Placements and removals go out through the `EventBus`, which keeps the
//! shared availability set current before the handler returns.

use std::collections::BTreeMap;

use tracing::{debug, info};
use wf_core::{CanvasRect, NodeHandle, Point};
use wf_graph::{
    fingerprint, interpret, Circuit, CircuitNode, ComponentRef, NodeKind, NodeSpec,
    PumpInterpretation, RestoreReport,
};
use wf_project::{Catalog, CircuitDef, PumpRow, WashingComponentRow};

use crate::circuit_io::{def_to_snapshot, snapshot_to_def, NodeResolver};
use crate::error::{AppError, AppResult};
use crate::events::EventBus;
use crate::pipe_dialog::{PipeDialog, PipeTarget};
use crate::settings::AppSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Move,
    Connect,
    Delete,
    Place,
}

/// What a press in `Place` mode will put down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Component { id: String, name: String },
    Connector(NodeKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message for the user, drained by the UI after each event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    Ignored,
    /// The press landed on the reset button; the UI asks for confirmation.
    ResetRequested,
    Placed(NodeHandle),
    DragStarted(NodeHandle),
    SourceSelected(NodeHandle),
    ConnectCancelled,
    DialogOpened,
    Deleted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    #[default]
    Default,
    Grab,
    Grabbing,
    Crosshair,
    PointingHand,
    NotAllowed,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    node: NodeHandle,
    offset: Point,
    moved: bool,
}

pub struct CanvasEditor {
    pump_index: usize,
    pump: PumpRow,
    circuit: Circuit,
    mode: EditorMode,
    selection: Option<Selection>,
    drag: Option<Drag>,
    connect_source: Option<NodeHandle>,
    dialog: Option<PipeDialog>,
    notices: Vec<Notice>,
    reset_button_size: f64,
    pick_tolerance: f64,
    connector_serial: u32,
}

impl CanvasEditor {
    /// New editor with the pump already placed at the left middle of the canvas.
    pub fn new(
        pump_index: usize,
        pump: &PumpRow,
        settings: &AppSettings,
        bus: &mut EventBus,
    ) -> AppResult<Self> {
        let mut editor = Self {
            pump_index,
            pump: pump.clone(),
            circuit: Circuit::new(settings.canvas_rect(), settings.placement_rules()),
            mode: EditorMode::Move,
            selection: None,
            drag: None,
            connect_source: None,
            dialog: None,
            notices: Vec::new(),
            reset_button_size: settings.canvas.reset_button_size,
            pick_tolerance: settings.pick_tolerance,
            connector_serial: 0,
        };
        editor.place_pump(bus)?;
        Ok(editor)
    }

    pub fn pump_index(&self) -> usize {
        self.pump_index
    }

    pub fn pump_row(&self) -> &PumpRow {
        &self.pump
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn connect_source(&self) -> Option<NodeHandle> {
        self.connect_source
    }

    pub fn dragging(&self) -> Option<NodeHandle> {
        self.drag.map(|d| d.node)
    }

    /// Switch mode. Any pending connect or drag is dropped.
    pub fn set_mode(&mut self, mode: EditorMode) {
        if mode != self.mode {
            debug!(pump_index = self.pump_index, ?mode, "editor mode");
        }
        self.mode = mode;
        self.connect_source = None;
        self.drag = None;
        if mode != EditorMode::Place {
            self.selection = None;
        }
    }

    /// Pick a washing component from the palette; the editor enters `Place`.
    pub fn select_component(
        &mut self,
        id: &str,
        rows: &[WashingComponentRow],
        bus: &EventBus,
    ) -> AppResult<()> {
        let row = rows
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::MissingReference(format!("washing component {id}")))?;
        if !bus.availability.is_available(id, rows) {
            return Err(AppError::InputValidation {
                field: row.name.clone(),
                reason: "already placed on a circuit".to_string(),
            });
        }
        self.set_mode(EditorMode::Place);
        self.selection = Some(Selection::Component {
            id: row.id.clone(),
            name: row.name.clone(),
        });
        Ok(())
    }

    pub fn select_connector(&mut self, kind: NodeKind) -> AppResult<()> {
        if !kind.is_connector() {
            return Err(AppError::InvalidState(format!("{} is not a connector", kind.label())));
        }
        self.set_mode(EditorMode::Place);
        self.selection = Some(Selection::Connector(kind));
        Ok(())
    }

    /// Top-right reset button area: (top-left corner, side).
    pub fn reset_button(&self) -> (Point, f64) {
        let side = self.reset_button_size;
        (Point::new(self.circuit.canvas().width - side, 0.0), side)
    }

    fn in_reset_button(&self, p: Point) -> bool {
        let (origin, side) = self.reset_button();
        p.x >= origin.x && p.x <= origin.x + side && p.y >= origin.y && p.y <= origin.y + side
    }

    pub fn pointer_press(&mut self, pos: Point, bus: &mut EventBus, catalog: &Catalog) -> PointerOutcome {
        if self.in_reset_button(pos) {
            return PointerOutcome::ResetRequested;
        }
        if self.dialog.is_some() {
            return PointerOutcome::Ignored;
        }
        match self.mode {
            EditorMode::Move => self.press_move(pos),
            EditorMode::Connect => self.press_connect(pos, catalog),
            EditorMode::Delete => self.press_delete(pos, bus),
            EditorMode::Place => self.press_place(pos, bus, catalog),
        }
    }

    pub fn pointer_motion(&mut self, pos: Point) {
        let Some(mut drag) = self.drag else {
            return;
        };
        let target = Point::new(pos.x + drag.offset.x, pos.y + drag.offset.y);
        let before = self.circuit.revision();
        if self.circuit.move_node(drag.node, target).is_err() {
            self.drag = None;
            return;
        }
        if self.circuit.revision() != before {
            drag.moved = true;
        }
        self.drag = Some(drag);
    }

    pub fn pointer_release(&mut self, pos: Point, bus: &mut EventBus) {
        self.pointer_motion(pos);
        if let Some(drag) = self.drag.take() {
            if drag.moved {
                bus.changed(self.pump_index);
            }
        }
    }

    /// Cursor feedback for `pos`. Never mutates the circuit.
    pub fn hover(&self, pos: Point) -> CursorShape {
        if self.in_reset_button(pos) {
            return CursorShape::PointingHand;
        }
        let node = self.circuit.node_at(pos);
        let pipe = || self.circuit.pipe_near(pos, self.pick_tolerance);
        match self.mode {
            EditorMode::Move if self.drag.is_some() => CursorShape::Grabbing,
            EditorMode::Move if node.is_some() => CursorShape::Grab,
            EditorMode::Connect if node.is_some() => CursorShape::Crosshair,
            EditorMode::Connect if pipe().is_some() => CursorShape::PointingHand,
            EditorMode::Delete => match node {
                Some(h) if self.is_pump(h) => CursorShape::NotAllowed,
                Some(_) => CursorShape::PointingHand,
                None if pipe().is_some() => CursorShape::PointingHand,
                None => CursorShape::Default,
            },
            EditorMode::Place if self.selection.is_some() => CursorShape::Crosshair,
            EditorMode::Place => CursorShape::NotAllowed,
            _ => CursorShape::Default,
        }
    }

    fn is_pump(&self, handle: NodeHandle) -> bool {
        self.circuit
            .node(handle)
            .is_some_and(|n| n.kind == NodeKind::Pump)
    }

    fn press_move(&mut self, pos: Point) -> PointerOutcome {
        let Some(handle) = self.circuit.node_at(pos) else {
            return PointerOutcome::Ignored;
        };
        let Some(node) = self.circuit.node(handle) else {
            return PointerOutcome::Ignored;
        };
        self.drag = Some(Drag {
            node: handle,
            offset: Point::new(node.position.x - pos.x, node.position.y - pos.y),
            moved: false,
        });
        PointerOutcome::DragStarted(handle)
    }

    fn press_connect(&mut self, pos: Point, catalog: &Catalog) -> PointerOutcome {
        let Some(handle) = self.circuit.node_at(pos) else {
            let Some(pipe) = self.circuit.pipe_near(pos, self.pick_tolerance) else {
                return PointerOutcome::Ignored;
            };
            let Some(current) = self.circuit.pipe(pipe) else {
                return PointerOutcome::Ignored;
            };
            self.connect_source = None;
            self.dialog = Some(PipeDialog::edit_pipe(pipe, &current.parameters));
            return PointerOutcome::DialogOpened;
        };

        let Some(source) = self.connect_source else {
            self.connect_source = Some(handle);
            return PointerOutcome::SourceSelected(handle);
        };
        self.connect_source = None;
        if source == handle {
            return PointerOutcome::ConnectCancelled;
        }
        match self.circuit.can_connect(source, handle) {
            Ok(orientation) => {
                if orientation.ambiguous {
                    self.notices.push(Notice::info(
                        "Both ends can send and receive; the pipe follows the clicked order.",
                    ));
                }
                self.dialog = Some(PipeDialog::new_pipe(source, handle, catalog));
                PointerOutcome::DialogOpened
            }
            Err(err) => {
                info!(pump_index = self.pump_index, %err, "connection rejected");
                let text = self.describe(err);
                self.notices.push(Notice::warning(text));
                PointerOutcome::Rejected
            }
        }
    }

    fn press_delete(&mut self, pos: Point, bus: &mut EventBus) -> PointerOutcome {
        if let Some(handle) = self.circuit.node_at(pos) {
            if self.is_pump(handle) {
                self.notices
                    .push(Notice::warning("The pump cannot be removed from its own circuit."));
                return PointerOutcome::Rejected;
            }
            return match self.circuit.delete_node(handle) {
                Ok(removed) => {
                    bus.node_removed(self.pump_index, &removed.node);
                    self.refresh_display_names();
                    PointerOutcome::Deleted
                }
                Err(err) => {
                    self.notices.push(Notice::error(err.to_string()));
                    PointerOutcome::Rejected
                }
            };
        }
        let Some(pipe) = self.circuit.pipe_near(pos, self.pick_tolerance) else {
            return PointerOutcome::Ignored;
        };
        match self.circuit.delete_pipe(pipe) {
            Ok(_) => {
                bus.changed(self.pump_index);
                PointerOutcome::Deleted
            }
            Err(err) => {
                self.notices.push(Notice::error(err.to_string()));
                PointerOutcome::Rejected
            }
        }
    }

    fn press_place(&mut self, pos: Point, bus: &mut EventBus, catalog: &Catalog) -> PointerOutcome {
        let spec = match &self.selection {
            None => return PointerOutcome::Ignored,
            Some(Selection::Component { id, name }) => {
                if bus.availability.is_placed(id) {
                    self.notices
                        .push(Notice::warning(format!("{name} is already placed on a circuit.")));
                    self.set_mode(EditorMode::Move);
                    return PointerOutcome::Rejected;
                }
                NodeSpec::component(id.clone(), name.clone())
            }
            Some(Selection::Connector(kind)) => {
                let name = catalog
                    .connector_names(kind.tag())
                    .first()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| kind.default_connector_name().to_string());
                self.connector_serial += 1;
                let identity = format!("{}-{}", kind.tag(), self.connector_serial);
                match NodeSpec::connector(*kind, identity, name) {
                    Some(spec) => spec,
                    None => return PointerOutcome::Rejected,
                }
            }
        };
        match self.circuit.place_node(spec, pos) {
            Ok(handle) => {
                if let Some(node) = self.circuit.node(handle) {
                    bus.node_placed(self.pump_index, node);
                }
                self.refresh_display_names();
                self.set_mode(EditorMode::Move);
                PointerOutcome::Placed(handle)
            }
            Err(err) => {
                let text = self.describe(err);
                self.notices.push(Notice::warning(text));
                PointerOutcome::Rejected
            }
        }
    }

    pub fn dialog(&self) -> Option<&PipeDialog> {
        self.dialog.as_ref()
    }

    pub fn dialog_mut(&mut self) -> Option<&mut PipeDialog> {
        self.dialog.as_mut()
    }

    /// Close the dialog without committing.
    pub fn cancel_dialog(&mut self) {
        self.dialog = None;
    }

    /// Commit the open dialog.
    ///
    /// An invalid form keeps the dialog open with its message. A graph
    /// rejection closes it and leaves the circuit unchanged.
    pub fn confirm_dialog(&mut self, bus: &mut EventBus) -> AppResult<()> {
        let Some(dialog) = self.dialog.as_mut() else {
            return Err(AppError::InvalidState("no pipe dialog is open".to_string()));
        };
        let params = match dialog.form.validate() {
            Ok(params) => params,
            Err(err) => {
                dialog.error = Some(err.to_string());
                return Err(err.into());
            }
        };
        let target = dialog.target;
        self.dialog = None;
        let result = match target {
            PipeTarget::New { first, second } => {
                self.circuit.connect(first, second, params).map(|_| ())
            }
            PipeTarget::Edit(pipe) => self.circuit.set_pipe_parameters(pipe, params),
        };
        match result {
            Ok(()) => {
                bus.changed(self.pump_index);
                Ok(())
            }
            Err(err) => {
                info!(pump_index = self.pump_index, %err, "pipe rejected");
                let text = self.describe(err.clone());
                self.notices.push(Notice::warning(text));
                Err(err.into())
            }
        }
    }

    /// Remove everything except the pump and release placed components.
    pub fn reset(&mut self, bus: &mut EventBus) {
        let doomed: Vec<NodeHandle> = self
            .circuit
            .nodes()
            .filter(|n| n.kind != NodeKind::Pump)
            .map(|n| n.handle)
            .collect();
        for handle in doomed {
            if let Ok(removed) = self.circuit.delete_node(handle) {
                bus.node_removed(self.pump_index, &removed.node);
            }
        }
        self.set_mode(EditorMode::Move);
        self.dialog = None;
        self.refresh_display_names();
        bus.changed(self.pump_index);
        info!(pump_index = self.pump_index, "circuit reset");
    }

    /// Release every placed node on the bus, e.g. before the page drops this editor.
    pub fn release_all(&mut self, bus: &mut EventBus) {
        for node in self.circuit.clear() {
            bus.node_removed(self.pump_index, &node);
        }
    }

    /// Replace the circuit with a saved one.
    ///
    /// Components already placed on other canvases are not placed again.
    /// A missing pump is put back at its default position.
    pub fn restore(
        &mut self,
        def: &CircuitDef,
        rows: &[WashingComponentRow],
        bus: &mut EventBus,
    ) -> RestoreReport {
        self.release_all(bus);
        self.set_mode(EditorMode::Move);
        self.dialog = None;

        let claimed: Vec<String> = bus.availability.placed_ids().map(str::to_string).collect();
        let mut resolver = NodeResolver::new(
            Some(&self.pump),
            rows,
            claimed.iter().map(String::as_str),
        );
        let snapshot = def_to_snapshot(def);
        let report = self.circuit.restore(&snapshot, |saved| resolver.resolve(saved));

        if self.circuit.pump().is_none() {
            if let Err(err) = self.place_pump_quietly() {
                self.notices.push(Notice::error(err.to_string()));
            }
        }
        let placed: Vec<CircuitNode> = self.circuit.nodes().cloned().collect();
        for node in &placed {
            bus.node_placed(self.pump_index, node);
        }
        // Restored connectors are named after their saved id.
        let highest_saved = snapshot.nodes.iter().map(|n| n.saved_id).max().unwrap_or(0);
        self.connector_serial = self.connector_serial.max(highest_saved);
        self.refresh_display_names();
        for issue in &report.issues {
            self.notices.push(Notice::warning(issue.to_string()));
        }
        report
    }

    pub fn to_def(&self) -> CircuitDef {
        snapshot_to_def(&self.circuit.snapshot())
    }

    pub fn interpret(&self, rows: &[WashingComponentRow]) -> PumpInterpretation {
        let refs: Vec<ComponentRef> = crate::circuit_io::component_refs(rows);
        interpret(&self.circuit, self.pump_index, &refs)
    }

    pub fn fingerprint(&self) -> String {
        fingerprint(&self.circuit)
    }

    /// Resize the drawable area; nodes are re-clamped.
    pub fn set_canvas_size(&mut self, width: f64, height: f64, bus: &mut EventBus) {
        let before = self.circuit.revision();
        self.circuit.set_canvas(CanvasRect::new(width, height));
        if self.circuit.revision() != before {
            bus.changed(self.pump_index);
        }
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn place_pump(&mut self, bus: &mut EventBus) -> AppResult<()> {
        let handle = self.place_pump_quietly()?;
        if let Some(node) = self.circuit.node(handle) {
            bus.node_placed(self.pump_index, node);
        }
        Ok(())
    }

    fn place_pump_quietly(&mut self) -> AppResult<NodeHandle> {
        let spec = NodeSpec::pump(
            self.pump.id.clone(),
            self.pump.name.clone(),
            self.pump.outputs.count(),
        );
        let at = Point::new(0.0, self.circuit.canvas().height / 2.0);
        Ok(self.circuit.place_node(spec, at)?)
    }

    /// "Name", "Name (2)", "Name (3)" in placement order; persisted names stay bare.
    fn refresh_display_names(&mut self) {
        let mut seen: BTreeMap<String, u32> = BTreeMap::new();
        let renames: Vec<(NodeHandle, String)> = self
            .circuit
            .nodes()
            .map(|n| {
                let count = seen.entry(n.original_name.clone()).or_insert(0);
                *count += 1;
                let display = if *count == 1 {
                    n.original_name.clone()
                } else {
                    format!("{} ({})", n.original_name, count)
                };
                (n.handle, display)
            })
            .collect();
        for (handle, name) in renames {
            let _ = self.circuit.set_display_name(handle, name);
        }
    }

    fn describe(&self, err: wf_graph::GraphError) -> String {
        use wf_graph::GraphError;
        let name = |h: NodeHandle| {
            self.circuit
                .node(h)
                .map(|n| n.display_name.clone())
                .unwrap_or_else(|| h.to_string())
        };
        match err {
            GraphError::CapacityExceeded { node, max } => {
                format!("{} already has its maximum of {max} connection(s).", name(node))
            }
            GraphError::DuplicateEdge { a, b } => {
                format!("{} and {} are already connected.", name(a), name(b))
            }
            GraphError::SelfLoop { node } => format!("{} cannot connect to itself.", name(node)),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_project::OutputCount;

    fn setup() -> (CanvasEditor, EventBus, Catalog, Vec<WashingComponentRow>) {
        let mut bus = EventBus::new();
        let pump = PumpRow::new("p1", "WP", OutputCount::Two);
        let editor = CanvasEditor::new(0, &pump, &AppSettings::default(), &mut bus).unwrap();
        let rows = vec![
            WashingComponentRow::new("a", "A"),
            WashingComponentRow::new("b", "B"),
        ];
        (editor, bus, Catalog::fallback(), rows)
    }

    fn place(
        ed: &mut CanvasEditor,
        bus: &mut EventBus,
        cat: &Catalog,
        rows: &[WashingComponentRow],
        id: &str,
        at: Point,
    ) -> NodeHandle {
        ed.select_component(id, rows, bus).unwrap();
        match ed.pointer_press(at, bus, cat) {
            PointerOutcome::Placed(h) => h,
            other => panic!("unexpected {other:?}"),
        }
    }

    fn pump_pos(ed: &CanvasEditor) -> Point {
        ed.circuit().pump().unwrap().position
    }

    #[test]
    fn new_editor_holds_only_the_pump() {
        let (ed, bus, _, _) = setup();
        assert_eq!(ed.circuit().node_count(), 1);
        let pump = ed.circuit().pump().unwrap();
        assert_eq!(pump.max_connections, 2);
        assert_eq!(pump.position.y, 300.0);
        assert!(bus.is_dirty());
    }

    #[test]
    fn placing_a_component_updates_availability_and_reverts_to_move() {
        let (mut ed, mut bus, cat, rows) = setup();
        place(&mut ed, &mut bus, &cat, &rows, "a", Point::new(500.0, 200.0));
        assert!(bus.availability.is_placed("a"));
        assert_eq!(ed.mode(), EditorMode::Move);
        assert!(ed.select_component("a", &rows, &bus).is_err());
    }

    #[test]
    fn connect_flow_with_dialog() {
        let (mut ed, mut bus, cat, rows) = setup();
        let a_pos = Point::new(500.0, 200.0);
        place(&mut ed, &mut bus, &cat, &rows, "a", a_pos);
        ed.set_mode(EditorMode::Connect);
        let p = pump_pos(&ed);
        assert!(matches!(
            ed.pointer_press(a_pos, &mut bus, &cat),
            PointerOutcome::SourceSelected(_)
        ));
        assert_eq!(ed.pointer_press(p, &mut bus, &cat), PointerOutcome::DialogOpened);
        {
            let form = &mut ed.dialog_mut().unwrap().form;
            form.length = "1500".into();
            form.diameter = "8".into();
        }
        ed.confirm_dialog(&mut bus).unwrap();
        assert!(ed.dialog().is_none());
        let pipe = ed.circuit().pipes().next().unwrap();
        // Flipped to run from the pump.
        assert_eq!(pipe.source, ed.circuit().pump().unwrap().handle);
        assert_eq!(pipe.parameters.length_mm, 1500.0);
    }

    #[test]
    fn invalid_form_keeps_dialog_open() {
        let (mut ed, mut bus, cat, rows) = setup();
        let a_pos = Point::new(500.0, 200.0);
        place(&mut ed, &mut bus, &cat, &rows, "a", a_pos);
        ed.set_mode(EditorMode::Connect);
        ed.pointer_press(pump_pos(&ed), &mut bus, &cat);
        ed.pointer_press(a_pos, &mut bus, &cat);
        ed.dialog_mut().unwrap().form.length = "-3".into();
        assert!(ed.confirm_dialog(&mut bus).is_err());
        assert!(ed.dialog().unwrap().error.is_some());
        assert_eq!(ed.circuit().pipe_count(), 0);
        ed.cancel_dialog();
        assert!(ed.dialog().is_none());
    }

    #[test]
    fn second_press_on_source_cancels() {
        let (mut ed, mut bus, cat, _) = setup();
        ed.set_mode(EditorMode::Connect);
        let p = pump_pos(&ed);
        ed.pointer_press(p, &mut bus, &cat);
        assert_eq!(ed.pointer_press(p, &mut bus, &cat), PointerOutcome::ConnectCancelled);
        assert!(ed.connect_source().is_none());
    }

    #[test]
    fn component_to_component_is_rejected_with_notice() {
        let (mut ed, mut bus, cat, rows) = setup();
        let a = Point::new(500.0, 200.0);
        let b = Point::new(700.0, 200.0);
        place(&mut ed, &mut bus, &cat, &rows, "a", a);
        place(&mut ed, &mut bus, &cat, &rows, "b", b);
        ed.set_mode(EditorMode::Connect);
        ed.pointer_press(a, &mut bus, &cat);
        assert_eq!(ed.pointer_press(b, &mut bus, &cat), PointerOutcome::Rejected);
        assert!(ed.dialog().is_none());
        let notices = ed.drain_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Warning);
    }

    #[test]
    fn mode_change_cancels_pending_connect() {
        let (mut ed, mut bus, cat, _) = setup();
        ed.set_mode(EditorMode::Connect);
        ed.pointer_press(pump_pos(&ed), &mut bus, &cat);
        ed.set_mode(EditorMode::Move);
        assert!(ed.connect_source().is_none());
    }

    #[test]
    fn reset_button_never_reaches_the_graph() {
        let (mut ed, mut bus, cat, _) = setup();
        ed.select_connector(NodeKind::TConnector).unwrap();
        let (origin, side) = ed.reset_button();
        let inside = Point::new(origin.x + side / 2.0, side / 2.0);
        assert_eq!(ed.pointer_press(inside, &mut bus, &cat), PointerOutcome::ResetRequested);
        assert_eq!(ed.circuit().node_count(), 1);
    }

    #[test]
    fn pump_cannot_be_deleted() {
        let (mut ed, mut bus, cat, _) = setup();
        ed.set_mode(EditorMode::Delete);
        assert_eq!(ed.pointer_press(pump_pos(&ed), &mut bus, &cat), PointerOutcome::Rejected);
        assert_eq!(ed.circuit().node_count(), 1);
    }

    #[test]
    fn deleting_a_component_releases_it() {
        let (mut ed, mut bus, cat, rows) = setup();
        let a = Point::new(500.0, 200.0);
        place(&mut ed, &mut bus, &cat, &rows, "a", a);
        ed.set_mode(EditorMode::Delete);
        assert_eq!(ed.pointer_press(a, &mut bus, &cat), PointerOutcome::Deleted);
        assert!(!bus.availability.is_placed("a"));
    }

    #[test]
    fn drag_is_clamped_and_marks_dirty() {
        let (mut ed, mut bus, cat, rows) = setup();
        let a = Point::new(500.0, 200.0);
        let h = place(&mut ed, &mut bus, &cat, &rows, "a", a);
        bus.take_dirty();
        assert_eq!(ed.pointer_press(a, &mut bus, &cat), PointerOutcome::DragStarted(h));
        ed.pointer_motion(Point::new(-500.0, 200.0));
        ed.pointer_release(Point::new(-500.0, 200.0), &mut bus);
        let inset = ed.circuit().rules().inset(NodeKind::Component);
        assert_eq!(ed.circuit().node(h).unwrap().position.x, inset);
        assert!(bus.is_dirty());
    }

    #[test]
    fn hover_never_mutates() {
        let (mut ed, _, _, _) = setup();
        ed.set_mode(EditorMode::Delete);
        let rev = ed.circuit().revision();
        assert_eq!(ed.hover(pump_pos(&ed)), CursorShape::NotAllowed);
        assert_eq!(ed.circuit().revision(), rev);
    }

    #[test]
    fn connectors_get_suffixed_display_names() {
        let (mut ed, mut bus, cat, _) = setup();
        for x in [300.0, 400.0] {
            ed.select_connector(NodeKind::TConnector).unwrap();
            ed.pointer_press(Point::new(x, 100.0), &mut bus, &cat);
        }
        let names: Vec<_> = ed
            .circuit()
            .nodes()
            .filter(|n| n.kind == NodeKind::TConnector)
            .map(|n| (n.original_name.clone(), n.display_name.clone()))
            .collect();
        assert_eq!(names[0].0, names[1].0);
        assert_eq!(names[1].1, format!("{} (2)", names[1].0));
    }

    #[test]
    fn reset_keeps_only_the_pump() {
        let (mut ed, mut bus, cat, rows) = setup();
        place(&mut ed, &mut bus, &cat, &rows, "a", Point::new(500.0, 200.0));
        ed.reset(&mut bus);
        assert_eq!(ed.circuit().node_count(), 1);
        assert!(ed.circuit().pump().is_some());
        assert!(!bus.availability.is_placed("a"));
    }

    #[test]
    fn restore_round_trips_and_reclaims_availability() {
        let (mut ed, mut bus, cat, rows) = setup();
        let a = Point::new(500.0, 200.0);
        place(&mut ed, &mut bus, &cat, &rows, "a", a);
        ed.set_mode(EditorMode::Connect);
        ed.pointer_press(pump_pos(&ed), &mut bus, &cat);
        ed.pointer_press(a, &mut bus, &cat);
        ed.dialog_mut().unwrap().form.length = "10".into();
        ed.confirm_dialog(&mut bus).unwrap();
        let def = ed.to_def();
        let before = ed.fingerprint();

        let report = ed.restore(&def, &rows, &mut bus);
        assert!(report.is_clean());
        assert_eq!(ed.fingerprint(), before);
        assert!(bus.availability.is_placed("a"));
        let restored = ed.to_def();
        let shape = |d: &CircuitDef| {
            d.components
                .iter()
                .map(|c| (c.kind.clone(), c.name.clone(), c.position))
                .collect::<Vec<_>>()
        };
        assert_eq!(shape(&restored), shape(&def));
        assert_eq!(restored.connections.len(), 1);
    }

    #[test]
    fn connectors_placed_after_restore_get_fresh_identities() {
        let (mut ed, mut bus, cat, rows) = setup();
        let mut spots = Vec::new();
        for x in [300.0, 400.0, 500.0, 600.0, 700.0] {
            ed.select_connector(NodeKind::TConnector).unwrap();
            match ed.pointer_press(Point::new(x, 100.0), &mut bus, &cat) {
                PointerOutcome::Placed(h) => spots.push(ed.circuit().node(h).unwrap().position),
                other => panic!("unexpected {other:?}"),
            }
        }
        ed.set_mode(EditorMode::Delete);
        for at in &spots[..4] {
            ed.pointer_press(*at, &mut bus, &cat);
        }
        assert_eq!(ed.circuit().node_count(), 2);
        let def = ed.to_def();

        let (mut fresh, mut fresh_bus, _, _) = setup();
        fresh.restore(&def, &rows, &mut fresh_bus);
        for x in [300.0, 400.0, 500.0] {
            fresh.select_connector(NodeKind::TConnector).unwrap();
            fresh.pointer_press(Point::new(x, 100.0), &mut fresh_bus, &cat);
        }
        let mut identities: Vec<_> = fresh
            .circuit()
            .nodes()
            .filter(|n| n.kind == NodeKind::TConnector)
            .map(|n| n.identity.clone())
            .collect();
        assert_eq!(identities.len(), 4);
        identities.sort();
        identities.dedup();
        assert_eq!(identities.len(), 4);
    }
}
