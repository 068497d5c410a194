//! Undo/redo history engine.
//!
//! Every undoable operation is preceded by a snapshot of the full document
//! (nodes, edges, arrows). Undo and redo swap snapshots between a bounded
//! `past` stack and a `future` stack; any new snapshot invalidates the
//! redo history (linear timeline, not a tree).
//!
//! Continuous gestures (node drags) use **batching**: the document is
//! captured once at gesture start, and one history entry is committed at
//! gesture end — per-frame moves never flood the stack.

use crate::document::CanvasDocument;
use crate::model::{Arrow, Edge, Node};

/// Maximum number of past snapshots kept; the oldest entry is evicted
/// first when the stack overflows.
pub const MAX_HISTORY_DEPTH: usize = 50;

/// An immutable deep copy of the document at one instant. Snapshots never
/// share mutable sub-structure with the live document or with each other —
/// mutating the document after capture cannot alter a snapshot.
#[derive(Debug, Clone)]
pub struct Snapshot {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    arrows: Vec<Arrow>,
}

impl Snapshot {
    fn capture(doc: &CanvasDocument) -> Self {
        Self {
            nodes: doc.nodes.clone(),
            edges: doc.edges.clone(),
            arrows: doc.arrows.clone(),
        }
    }

    fn restore(self, doc: &mut CanvasDocument) {
        doc.nodes = self.nodes;
        doc.edges = self.edges;
        doc.arrows = self.arrows;
        doc.rebuild_selection();
    }
}

/// Bounded linear undo/redo stacks over document snapshots.
pub struct History {
    past: Vec<Snapshot>,
    future: Vec<Snapshot>,
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Snapshot captured at the start of the outermost batch.
    batch_start: Option<Snapshot>,
    /// Whether any snapshot request happened during the current batch.
    batch_dirty: bool,
}

impl History {
    pub fn new() -> Self {
        Self::with_depth(MAX_HISTORY_DEPTH)
    }

    pub fn with_depth(max_depth: usize) -> Self {
        Self {
            past: Vec::with_capacity(max_depth.min(MAX_HISTORY_DEPTH)),
            future: Vec::new(),
            max_depth,
            batch_depth: 0,
            batch_start: None,
            batch_dirty: false,
        }
    }

    /// Record the current document state as the undo point for the next
    /// mutation. Call BEFORE mutating. Inside an open batch this only
    /// marks the batch dirty — the batch-start snapshot is the undo point.
    pub fn take_snapshot(&mut self, doc: &CanvasDocument) {
        if self.batch_depth > 0 {
            self.batch_dirty = true;
            return;
        }
        self.push_past(Snapshot::capture(doc));
        self.future.clear();
    }

    /// Open a gesture batch. The document is captured once here; nested
    /// calls are counted and only the outermost pair commits.
    pub fn begin_batch(&mut self, doc: &CanvasDocument) {
        if self.batch_depth == 0 {
            self.batch_start = Some(Snapshot::capture(doc));
            self.batch_dirty = false;
        }
        self.batch_depth += 1;
    }

    /// Close a gesture batch. When the outermost batch closes and at least
    /// one snapshot was requested inside it, the batch-start state becomes
    /// a single undo step.
    pub fn end_batch(&mut self) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            if self.batch_dirty
                && let Some(start) = self.batch_start.take()
            {
                self.push_past(start);
                self.future.clear();
            }
            self.batch_start = None;
            self.batch_dirty = false;
        }
    }

    /// Restore the most recent past snapshot, moving the current state to
    /// the front of the redo stack. Returns false (and does nothing) when
    /// there is nothing to undo.
    pub fn undo(&mut self, doc: &mut CanvasDocument) -> bool {
        let Some(previous) = self.past.pop() else {
            return false;
        };
        self.future.insert(0, Snapshot::capture(doc));
        previous.restore(doc);
        true
    }

    /// Re-apply the most recently undone snapshot, moving the current
    /// state to the end of the past stack. Returns false when there is
    /// nothing to redo.
    pub fn redo(&mut self, doc: &mut CanvasDocument) -> bool {
        if self.future.is_empty() {
            return false;
        }
        let next = self.future.remove(0);
        self.past.push(Snapshot::capture(doc));
        next.restore(doc);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    /// Drop all history (document load, canvas handoff).
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.batch_depth = 0;
        self.batch_start = None;
        self.batch_dirty = false;
    }

    fn push_past(&mut self, snapshot: Snapshot) {
        self.past.push(snapshot);
        while self.past.len() > self.max_depth {
            self.past.remove(0);
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ElementId;
    use crate::model::{NodePayload, Point, TextData};
    use pretty_assertions::assert_eq;

    fn doc_with(ids: &[&str]) -> CanvasDocument {
        let mut doc = CanvasDocument::new();
        for id in ids {
            doc.add_node(Node::new(
                ElementId::intern(id),
                Point::default(),
                NodePayload::Text(TextData {
                    text: (*id).into(),
                }),
            ));
        }
        doc
    }

    #[test]
    fn undo_redo_remove_node() {
        // The concrete walk-through: one node A, snapshot, remove, undo, redo.
        let mut doc = doc_with(&["a"]);
        let mut history = History::new();

        history.take_snapshot(&doc);
        doc.remove_node(ElementId::intern("a"));
        assert_eq!(history.past_len(), 1);
        assert!(doc.nodes.is_empty());

        assert!(history.undo(&mut doc));
        assert_eq!(doc.nodes.len(), 1);
        assert_eq!(history.past_len(), 0);
        assert_eq!(history.future_len(), 1);

        assert!(history.redo(&mut doc));
        assert!(doc.nodes.is_empty());
        assert_eq!(history.past_len(), 1);
        assert_eq!(history.future_len(), 0);
    }

    #[test]
    fn undo_on_empty_history_is_noop() {
        let mut doc = doc_with(&["a"]);
        let mut history = History::new();
        assert!(!history.undo(&mut doc));
        assert!(!history.redo(&mut doc));
        assert_eq!(doc.nodes.len(), 1);
    }

    #[test]
    fn new_snapshot_clears_redo() {
        let mut doc = doc_with(&["a"]);
        let mut history = History::new();

        history.take_snapshot(&doc);
        doc.remove_node(ElementId::intern("a"));
        history.undo(&mut doc);
        assert!(history.can_redo());

        history.take_snapshot(&doc);
        doc.add_node(Node::new(
            ElementId::intern("b"),
            Point::default(),
            NodePayload::Text(TextData { text: "b".into() }),
        ));
        assert!(!history.can_redo());
    }

    #[test]
    fn depth_bound_evicts_oldest_first() {
        let mut doc = CanvasDocument::new();
        let mut history = History::with_depth(3);

        for i in 0..5 {
            doc.add_node(Node::new(
                ElementId::generate("n"),
                Point::new(i as f32, 0.0),
                NodePayload::Text(TextData {
                    text: i.to_string(),
                }),
            ));
            history.take_snapshot(&doc);
        }
        assert_eq!(history.past_len(), 3);

        // The oldest surviving snapshot holds 3 nodes (taken after the
        // third insert), so three undos bottom out there.
        while history.undo(&mut doc) {}
        assert_eq!(doc.nodes.len(), 3);
    }

    #[test]
    fn batch_commits_single_undo_step() {
        let mut doc = doc_with(&["a"]);
        let mut history = History::new();
        let a = ElementId::intern("a");

        history.begin_batch(&doc);
        for i in 1..=5 {
            history.take_snapshot(&doc);
            doc.move_node(a, Point::new(i as f32 * 10.0, 0.0));
        }
        history.end_batch();

        assert_eq!(history.past_len(), 1);
        assert!(history.undo(&mut doc));
        assert_eq!(doc.node(a).unwrap().position, Point::default());
        assert!(!history.can_undo());
    }

    #[test]
    fn empty_batch_leaves_no_entry() {
        let doc = doc_with(&["a"]);
        let mut history = History::new();
        history.begin_batch(&doc);
        history.end_batch();
        assert!(!history.can_undo());
    }

    #[test]
    fn snapshot_is_isolated_from_live_mutation() {
        let mut doc = doc_with(&["a"]);
        let mut history = History::new();
        history.take_snapshot(&doc);

        // Mutate the live payload after the snapshot was taken.
        doc.update_node_payload(
            ElementId::intern("a"),
            &crate::model::PayloadPatch::Text(crate::model::TextPatch {
                text: Some("changed".into()),
            }),
        );

        history.undo(&mut doc);
        match &doc.node(ElementId::intern("a")).unwrap().payload {
            NodePayload::Text(d) => assert_eq!(d.text, "a"),
            _ => panic!("unexpected payload"),
        }
    }
}
