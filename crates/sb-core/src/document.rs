//! The document store — single source of truth for canvas contents.
//!
//! All mutation goes through the primitives here so the history engine can
//! snapshot consistently. Operations are total: a missing target id is a
//! silent no-op, never an error. The one integrity rule the store enforces
//! is cascade delete — removing a node removes every edge that references
//! it as source or target.

use crate::id::ElementId;
use crate::model::{Arrow, ArrowPatch, Edge, Node, NodePayload, PayloadPatch, Point};
use smallvec::SmallVec;

/// The canonical in-memory canvas document.
#[derive(Debug, Clone, Default)]
pub struct CanvasDocument {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub arrows: Vec<Arrow>,
    /// Ids of currently selected nodes. Kept in sync with each node's
    /// `selected` flag.
    selection: SmallVec<[ElementId; 4]>,
}

impl CanvasDocument {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Nodes ───────────────────────────────────────────────────────────

    /// Append a node. The id must be unique — collisions are a caller
    /// error and are not validated here.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Remove a node and cascade-remove every edge referencing it.
    /// No-op if the node is absent.
    pub fn remove_node(&mut self, id: ElementId) {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        if self.nodes.len() == before {
            return;
        }
        self.remove_edges_touching(id);
        self.selection.retain(|s| *s != id);
    }

    /// Merge a patch into a node's payload. Returns false when the node is
    /// absent or the patch targets a different payload variant.
    pub fn update_node_payload(&mut self, id: ElementId, patch: &PayloadPatch) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => node.payload.apply(patch),
            None => false,
        }
    }

    /// Move a node to a new canvas position. No-op if absent.
    pub fn move_node(&mut self, id: ElementId, to: Point) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
            node.position = to;
        }
    }

    pub fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Replace the selection set and sync each node's `selected` flag.
    pub fn set_selection(&mut self, ids: &[ElementId]) {
        self.selection = ids.iter().copied().collect();
        for node in &mut self.nodes {
            node.selected = self.selection.contains(&node.id);
        }
    }

    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    pub fn selected_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.selected)
    }

    /// Recompute the selection set from node flags. Used after a snapshot
    /// restore, where the node arrays are replaced wholesale.
    pub(crate) fn rebuild_selection(&mut self) {
        self.selection = self
            .nodes
            .iter()
            .filter(|n| n.selected)
            .map(|n| n.id)
            .collect();
    }

    // ─── Edges ───────────────────────────────────────────────────────────

    /// Connect two nodes with a generated edge id. Endpoints are not
    /// validated against the node set.
    pub fn connect(&mut self, source: ElementId, target: ElementId) -> ElementId {
        let id = ElementId::generate("edge");
        let mut edge = Edge::new(id, source, target);
        edge.animated = true;
        self.edges.push(edge);
        id
    }

    /// Append an already-built edge (AI and sketch imports).
    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    pub fn remove_edge(&mut self, id: ElementId) {
        self.edges.retain(|e| e.id != id);
    }

    /// Remove every edge whose source or target is the given node id.
    pub fn remove_edges_touching(&mut self, node_id: ElementId) {
        self.edges
            .retain(|e| e.source != node_id && e.target != node_id);
    }

    // ─── Arrows ──────────────────────────────────────────────────────────

    pub fn add_arrow(&mut self, arrow: Arrow) {
        self.arrows.push(arrow);
    }

    /// Merge a patch into an arrow. No-op if absent.
    pub fn update_arrow(&mut self, id: ElementId, patch: &ArrowPatch) {
        if let Some(arrow) = self.arrows.iter_mut().find(|a| a.id == id) {
            arrow.apply(patch);
        }
    }

    pub fn remove_arrow(&mut self, id: ElementId) {
        self.arrows.retain(|a| a.id != id);
    }

    pub fn arrow(&self, id: ElementId) -> Option<&Arrow> {
        self.arrows.iter().find(|a| a.id == id)
    }

    // ─── Whole document ──────────────────────────────────────────────────

    /// Empty nodes, edges, and arrows in one step.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.arrows.clear();
        self.selection.clear();
    }

    /// Replace the node and edge collections (AI-generated layouts).
    /// Arrows are left untouched; selection is reset.
    pub fn replace_flow(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.nodes = nodes;
        self.edges = edges;
        self.selection.clear();
        for node in &mut self.nodes {
            node.selected = false;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.arrows.is_empty()
    }

    /// Labels of the selected shape/text nodes, in document order. Feeds
    /// the summarizer.
    pub fn selected_labels(&self) -> Vec<String> {
        self.selected_nodes()
            .map(|n| match &n.payload {
                NodePayload::Shape(d) => d.label.clone(),
                NodePayload::Text(d) => d.text.clone(),
                NodePayload::PostIt(d) => d.text.clone(),
                NodePayload::ResizableText(d) => d.text.clone(),
                NodePayload::Image(d) => d.alt.clone().unwrap_or_default(),
                NodePayload::Sticker(_) => String::new(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ShapeData, ShapePatch, TextData, TextPatch};
    use pretty_assertions::assert_eq;

    fn shape_node(id: &str, label: &str) -> Node {
        Node::new(
            ElementId::intern(id),
            Point::default(),
            NodePayload::Shape(ShapeData {
                label: label.into(),
                ..Default::default()
            }),
        )
    }

    #[test]
    fn remove_node_cascades_edges() {
        let mut doc = CanvasDocument::new();
        doc.add_node(shape_node("a", "A"));
        doc.add_node(shape_node("b", "B"));
        doc.add_node(shape_node("c", "C"));

        let a = ElementId::intern("a");
        let b = ElementId::intern("b");
        let c = ElementId::intern("c");
        doc.connect(a, b);
        doc.connect(b, c);
        let unrelated = doc.connect(c, a);

        doc.remove_node(b);

        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.edges.len(), 1);
        assert_eq!(doc.edges[0].id, unrelated);
    }

    #[test]
    fn remove_missing_node_is_noop() {
        let mut doc = CanvasDocument::new();
        doc.add_node(shape_node("a", "A"));
        doc.remove_node(ElementId::intern("ghost"));
        assert_eq!(doc.nodes.len(), 1);
    }

    #[test]
    fn update_payload_merges_patch() {
        let mut doc = CanvasDocument::new();
        doc.add_node(shape_node("a", "Old"));

        let applied = doc.update_node_payload(
            ElementId::intern("a"),
            &PayloadPatch::Shape(ShapePatch {
                label: Some("New".into()),
                ..Default::default()
            }),
        );
        assert!(applied);
        match &doc.node(ElementId::intern("a")).unwrap().payload {
            NodePayload::Shape(d) => assert_eq!(d.label, "New"),
            _ => panic!("unexpected payload"),
        }

        // Absent node: no-op, reported as not applied
        assert!(!doc.update_node_payload(
            ElementId::intern("ghost"),
            &PayloadPatch::Text(TextPatch { text: None }),
        ));
    }

    #[test]
    fn selection_syncs_node_flags() {
        let mut doc = CanvasDocument::new();
        doc.add_node(shape_node("a", "A"));
        doc.add_node(shape_node("b", "B"));

        let a = ElementId::intern("a");
        doc.set_selection(&[a]);
        assert!(doc.node(a).unwrap().selected);
        assert_eq!(doc.selection(), &[a]);
        assert_eq!(doc.selected_labels(), vec!["A".to_string()]);

        doc.set_selection(&[]);
        assert!(!doc.node(a).unwrap().selected);
        assert!(doc.selection().is_empty());
    }

    #[test]
    fn selection_drops_removed_node() {
        let mut doc = CanvasDocument::new();
        doc.add_node(shape_node("a", "A"));
        let a = ElementId::intern("a");
        doc.set_selection(&[a]);

        doc.remove_node(a);
        assert!(doc.selection().is_empty());
    }

    #[test]
    fn dangling_edge_is_accepted() {
        // The store preserves the source behavior: creation-time endpoint
        // validation is the caller's concern.
        let mut doc = CanvasDocument::new();
        doc.connect(ElementId::intern("nowhere"), ElementId::intern("nothing"));
        assert_eq!(doc.edges.len(), 1);
    }

    #[test]
    fn clear_empties_everything() {
        let mut doc = CanvasDocument::new();
        doc.add_node(shape_node("a", "A"));
        doc.connect(ElementId::intern("a"), ElementId::intern("b"));
        doc.add_arrow(Arrow::with_endpoints(
            ElementId::intern("ar"),
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
        ));
        doc.set_selection(&[ElementId::intern("a")]);

        doc.clear();
        assert!(doc.is_empty());
        assert!(doc.selection().is_empty());
    }

    #[test]
    fn text_node_label_feeds_summary() {
        let mut doc = CanvasDocument::new();
        doc.add_node(Node::new(
            ElementId::intern("t"),
            Point::default(),
            NodePayload::Text(TextData {
                text: "remember".into(),
            }),
        ));
        doc.set_selection(&[ElementId::intern("t")]);
        assert_eq!(doc.selected_labels(), vec!["remember".to_string()]);
    }
}
