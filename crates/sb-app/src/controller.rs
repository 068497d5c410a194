//! The canvas controller.
//!
//! Orchestrates user gestures and AI collaborator results into document
//! store and history engine calls. Every undoable operation snapshots the
//! document before mutating it; continuous gestures (node drags) wrap
//! their moves in a history batch so one gesture is one undo step.
//!
//! AI calls are the only suspension points. A single `busy` flag refuses
//! re-entrant requests and is cleared on every exit path. Each request
//! also captures the document **epoch** — a counter bumped by every
//! snapshot, undo, and redo — and a result whose starting epoch no longer
//! matches is discarded instead of being applied to a diverged document.

use crate::ai::{
    FlowGenerator, SketchProcessor, SketchUpload, process_sketch_with_retry, validate_upload,
};
use crate::error::{AiError, ControllerError};
use sb_core::document::CanvasDocument;
use sb_core::history::History;
use sb_core::id::ElementId;
use sb_core::layout::{FlowSpec, layout_flow};
use sb_core::model::{
    ArrowPatch, Color, Node, NodePayload, PayloadPatch, Point, ShapeData,
};
use sb_editor::arrow_tool::ArrowTool;
use sb_editor::input::{InputEvent, Modifiers};
use sb_editor::shortcuts::{ShortcutAction, ShortcutMap};
use sb_prefs::autosave::DocumentAutosave;
use sb_prefs::local::LocalSlots;
use std::time::Duration;

/// Offset applied to pasted and duplicated nodes.
const PASTE_OFFSET: f32 = 50.0;

/// Token for an in-flight AI request. Captures the epoch at request start
/// so the completion can detect that the document diverged underneath it.
#[derive(Debug)]
pub struct PendingAi {
    epoch: u64,
}

pub struct CanvasController<G, S> {
    doc: CanvasDocument,
    history: History,
    arrow_tool: ArrowTool,
    generator: G,
    sketcher: S,

    clipboard: Option<Node>,
    selected_arrow: Option<ElementId>,
    summary: Option<String>,
    active_color: Option<Color>,

    busy: bool,
    epoch: u64,
    autosave: Option<DocumentAutosave>,
    sketch_retry_delay: Duration,
}

impl<G: FlowGenerator, S: SketchProcessor> CanvasController<G, S> {
    pub fn new(generator: G, sketcher: S) -> Self {
        Self {
            doc: CanvasDocument::new(),
            history: History::new(),
            arrow_tool: ArrowTool::new(),
            generator,
            sketcher,
            clipboard: None,
            selected_arrow: None,
            summary: None,
            active_color: None,
            busy: false,
            epoch: 0,
            autosave: None,
            sketch_retry_delay: crate::ai::SKETCH_BASE_DELAY,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn document(&self) -> &CanvasDocument {
        &self.doc
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn active_color(&self) -> Option<Color> {
        self.active_color
    }

    pub fn selected_arrow(&self) -> Option<ElementId> {
        self.selected_arrow
    }

    pub fn arrow_mode(&self) -> bool {
        self.arrow_tool.is_enabled()
    }

    // ─── Bookkeeping ─────────────────────────────────────────────────────

    /// Snapshot the document as the undo point for the mutation that
    /// follows, and advance the epoch.
    fn checkpoint(&mut self) {
        self.history.take_snapshot(&self.doc);
        self.epoch += 1;
    }

    /// Note a document change for the debounced autosave.
    fn touch(&mut self) {
        if let Some(autosave) = &mut self.autosave {
            autosave.mark_dirty();
        }
    }

    // ─── Persistence wiring ──────────────────────────────────────────────

    /// Attach a debounced autosave. Every mutation marks it dirty;
    /// [`Self::pump_autosave`] flushes once the debounce window passes.
    pub fn attach_autosave(&mut self, autosave: DocumentAutosave) {
        self.autosave = Some(autosave);
    }

    /// Flush the autosave if its debounce window elapsed. Hosts call this
    /// from their idle tick.
    pub fn pump_autosave(&mut self) -> bool {
        match &mut self.autosave {
            Some(autosave) => autosave.flush_if_due(&self.doc),
            None => false,
        }
    }

    /// Restore a previously persisted document. Drops all history.
    pub fn load_from_slots(&mut self, slots: &LocalSlots) -> bool {
        let Some(persisted) = slots.load_document() else {
            return false;
        };
        self.doc.replace_flow(persisted.nodes, persisted.edges);
        self.doc.arrows = slots.load_arrows().unwrap_or_default();
        self.selected_arrow = None;
        self.history.clear();
        self.epoch += 1;
        true
    }

    /// Place the starter node on a blank canvas.
    pub fn seed_if_empty(&mut self) {
        if !self.doc.is_empty() {
            return;
        }
        self.doc.add_node(Node::new(
            ElementId::intern("1"),
            Point::default(),
            NodePayload::Shape(ShapeData {
                label: "Start here".into(),
                details: Some("Right-click for options.".into()),
                ..Default::default()
            }),
        ));
    }

    // ─── Node operations (all undoable) ──────────────────────────────────

    pub fn add_node(&mut self, position: Point, payload: NodePayload) -> ElementId {
        self.checkpoint();
        let id = ElementId::generate("node");
        self.doc.add_node(Node::new(id, position, payload));
        self.touch();
        id
    }

    /// Paste the clipboard node at an offset from the original, selecting
    /// the copy. No-op without a clipboard entry.
    pub fn paste(&mut self) -> Option<ElementId> {
        let original = self.clipboard.clone()?;
        self.checkpoint();
        let id = ElementId::generate("node");
        let position = Point::new(
            original.position.x + PASTE_OFFSET,
            original.position.y + PASTE_OFFSET,
        );
        self.doc.add_node(Node::new(id, position, original.payload));
        self.doc.set_selection(&[id]);
        self.touch();
        Some(id)
    }

    /// Duplicate an existing node at an offset. No-op if absent.
    pub fn duplicate(&mut self, id: ElementId) -> Option<ElementId> {
        let original = self.doc.node(id)?.clone();
        self.checkpoint();
        let copy_id = ElementId::generate("node");
        let position = Point::new(
            original.position.x + PASTE_OFFSET,
            original.position.y + PASTE_OFFSET,
        );
        self.doc
            .add_node(Node::new(copy_id, position, original.payload));
        self.doc.set_selection(&[copy_id]);
        self.touch();
        Some(copy_id)
    }

    /// Delete a node and its edges. No-op if absent.
    pub fn delete_node(&mut self, id: ElementId) {
        if self.doc.node(id).is_none() {
            return;
        }
        self.checkpoint();
        self.doc.remove_node(id);
        self.touch();
    }

    /// Merge a patch into a node's payload (inline edits, shape and color
    /// changes). Returns whether the patch applied.
    pub fn update_node(&mut self, id: ElementId, patch: &PayloadPatch) -> bool {
        if self.doc.node(id).is_none() {
            return false;
        }
        self.checkpoint();
        let applied = self.doc.update_node_payload(id, patch);
        if applied {
            self.touch();
        }
        applied
    }

    pub fn connect(&mut self, source: ElementId, target: ElementId) -> ElementId {
        self.checkpoint();
        let id = self.doc.connect(source, target);
        self.touch();
        id
    }

    /// Empty the canvas.
    pub fn clear(&mut self) {
        self.checkpoint();
        self.doc.clear();
        self.selected_arrow = None;
        self.summary = None;
        self.active_color = None;
        self.touch();
    }

    // ─── Drag gesture (one undo step per gesture) ────────────────────────

    pub fn begin_node_drag(&mut self) {
        self.history.begin_batch(&self.doc);
    }

    pub fn drag_node(&mut self, id: ElementId, to: Point) {
        self.history.take_snapshot(&self.doc);
        self.doc.move_node(id, to);
        self.touch();
    }

    pub fn end_node_drag(&mut self) {
        self.history.end_batch();
        self.epoch += 1;
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Replace the node selection. Clearing the selection also clears the
    /// transient summary and active-color view state; a single-node
    /// selection arms the clipboard.
    pub fn set_selection(&mut self, ids: &[ElementId]) {
        self.doc.set_selection(ids);
        if ids.is_empty() {
            self.summary = None;
            self.active_color = None;
        } else if ids.len() == 1 {
            self.clipboard = self.doc.node(ids[0]).cloned();
        }
    }

    pub fn set_active_color(&mut self, color: Color) {
        self.active_color = Some(color);
    }

    // ─── Arrow connectors ────────────────────────────────────────────────

    pub fn set_arrow_mode(&mut self, enabled: bool) {
        self.arrow_tool.set_enabled(enabled);
    }

    pub fn toggle_arrow_mode(&mut self) {
        let enabled = self.arrow_tool.is_enabled();
        self.arrow_tool.set_enabled(!enabled);
    }

    /// Feed a canvas pointer event into the arrow drawing session.
    /// Returns the id of the committed arrow, when the gesture completed
    /// one.
    pub fn handle_pointer(&mut self, event: &InputEvent) -> Option<ElementId> {
        let arrow = self.arrow_tool.handle(event)?;
        let id = arrow.id;
        self.checkpoint();
        self.doc.add_arrow(arrow);
        self.touch();
        Some(id)
    }

    /// The live preview segment of an in-flight arrow gesture.
    pub fn arrow_preview(&self) -> Option<(Point, Point)> {
        self.arrow_tool.preview()
    }

    /// Click an arrow: select it, or deselect when already selected.
    pub fn click_arrow(&mut self, id: ElementId) {
        if self.doc.arrow(id).is_none() {
            return;
        }
        self.selected_arrow = if self.selected_arrow == Some(id) {
            None
        } else {
            Some(id)
        };
    }

    pub fn update_arrow(&mut self, id: ElementId, patch: &ArrowPatch) {
        if self.doc.arrow(id).is_none() {
            return;
        }
        self.checkpoint();
        self.doc.update_arrow(id, patch);
        self.touch();
    }

    /// Delete the selected arrow and clear the arrow selection.
    pub fn delete_selected_arrow(&mut self) -> bool {
        let Some(id) = self.selected_arrow.take() else {
            return false;
        };
        if self.doc.arrow(id).is_none() {
            return false;
        }
        self.checkpoint();
        self.doc.remove_arrow(id);
        self.touch();
        true
    }

    // ─── Undo / redo ─────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.doc);
        if undone {
            self.epoch += 1;
            self.touch();
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.doc);
        if redone {
            self.epoch += 1;
            self.touch();
        }
        redone
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Dispatch a key event through the shortcut map. Returns the action
    /// that was handled, if any.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let action = ShortcutMap::resolve(key, modifiers)?;
        match action {
            ShortcutAction::Undo => {
                self.undo();
            }
            ShortcutAction::Redo => {
                self.redo();
            }
            ShortcutAction::DeleteSelection => {
                if !self.delete_selected_arrow() {
                    let selected: Vec<ElementId> = self.doc.selection().to_vec();
                    if !selected.is_empty() {
                        self.checkpoint();
                        for id in selected {
                            self.doc.remove_node(id);
                        }
                        self.touch();
                    }
                }
            }
            ShortcutAction::Deselect => {
                self.set_selection(&[]);
                self.selected_arrow = None;
            }
            ShortcutAction::ToggleArrowMode => {
                self.toggle_arrow_mode();
            }
        }
        Some(action)
    }

    // ─── AI orchestration ────────────────────────────────────────────────

    /// Claim the busy flag for an AI request. Refused while another
    /// request is in flight.
    pub fn begin_ai(&mut self) -> Result<PendingAi, ControllerError> {
        if self.busy {
            return Err(ControllerError::Busy);
        }
        self.busy = true;
        Ok(PendingAi { epoch: self.epoch })
    }

    /// Release the busy flag. Returns whether the document is still the
    /// one the request started from.
    fn end_ai(&mut self, pending: PendingAi) -> bool {
        self.busy = false;
        pending.epoch == self.epoch
    }

    /// Apply a finished flow-generation result. A stale result (the
    /// document changed while the request was in flight) is discarded
    /// with a warning rather than applied.
    pub fn complete_generation(
        &mut self,
        pending: PendingAi,
        result: Result<Option<FlowSpec>, AiError>,
    ) -> Result<(), ControllerError> {
        let fresh = self.end_ai(pending);
        match result {
            Ok(Some(spec)) => {
                if !fresh {
                    log::warn!("discarding stale flow generation result");
                    return Ok(());
                }
                let (nodes, edges) = layout_flow(&spec);
                self.checkpoint();
                self.doc.replace_flow(nodes, edges);
                self.touch();
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => Err(ControllerError::Generation(e)),
        }
    }

    /// Generate a flow from a prompt and replace the canvas with the
    /// laid-out result.
    pub async fn generate(&mut self, prompt: &str) -> Result<(), ControllerError> {
        let pending = self.begin_ai()?;
        let result = self.generator.generate_flow(prompt).await;
        self.complete_generation(pending, result)
    }

    /// Summarize the selected nodes. The text lands in [`Self::summary`]
    /// and is also returned.
    pub async fn summarize(&mut self) -> Result<String, ControllerError> {
        let labels = self.doc.selected_labels();
        if labels.is_empty() {
            return Err(ControllerError::EmptySelection);
        }
        let pending = self.begin_ai()?;
        let result = self.generator.summarize(&labels).await;
        self.end_ai(pending);
        match result {
            Ok(text) => {
                self.summary = Some(text.clone());
                Ok(text)
            }
            Err(e) => Err(ControllerError::Summarization(e)),
        }
    }

    /// Import a hand-drawn sketch: validate synchronously, process with
    /// bounded retries, then append the recognized elements. Returns the
    /// number of imported nodes.
    pub async fn import_sketch(&mut self, upload: SketchUpload) -> Result<usize, ControllerError> {
        validate_upload(&upload)?;
        let pending = self.begin_ai()?;
        let result =
            process_sketch_with_retry(&self.sketcher, &upload, self.sketch_retry_delay).await;
        let fresh = self.end_ai(pending);
        match result {
            Ok(import) => {
                if !fresh {
                    log::warn!("discarding stale sketch import result");
                    return Ok(0);
                }
                let (nodes, edges) = import.into_document_parts();
                if nodes.is_empty() && edges.is_empty() {
                    return Ok(0);
                }
                self.checkpoint();
                let count = nodes.len();
                for node in nodes {
                    self.doc.add_node(node);
                }
                for edge in edges {
                    self.doc.add_edge(edge);
                }
                self.touch();
                Ok(count)
            }
            Err(e) => Err(ControllerError::SketchProcessing(e)),
        }
    }

    /// Shorten the sketch retry backoff (tests).
    pub fn set_sketch_retry_delay(&mut self, delay: Duration) {
        self.sketch_retry_delay = delay;
    }
}
