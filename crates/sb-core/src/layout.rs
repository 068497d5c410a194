//! Layered layout for AI-generated flows.
//!
//! Converts a [`FlowSpec`] (the wire shape returned by the flow generator)
//! into positioned shape nodes and animated edges. Single deterministic
//! pass: roots are nodes with no incoming edge (or the first node when the
//! graph is cyclic), breadth-first leveling assigns each node the deepest
//! level any incoming path reaches, and every level is laid out as one
//! centered horizontal row.

use crate::id::ElementId;
use crate::model::{Edge, Node, NodePayload, Point, ShapeData};
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Horizontal spacing between nodes on the same level.
pub const X_SPACING: f32 = 250.0;

/// Vertical spacing between levels.
pub const Y_SPACING: f32 = 150.0;

/// A node as described by the flow generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub details: Option<String>,
}

/// An edge as described by the flow generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// The flow generator's response: a graph of labelled concepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowSpec {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

/// Lay out a flow response into positioned canvas nodes and edges.
///
/// Edges whose endpoints are not in the node list still appear in the
/// output (the store accepts dangling edges) but do not influence
/// leveling.
pub fn layout_flow(spec: &FlowSpec) -> (Vec<Node>, Vec<Edge>) {
    if spec.nodes.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for n in &spec.nodes {
        graph.add_node(n.id.as_str());
    }
    for e in &spec.edges {
        if graph.contains_node(e.source.as_str()) && graph.contains_node(e.target.as_str()) {
            graph.add_edge(e.source.as_str(), e.target.as_str(), ());
        }
    }

    let levels = assign_levels(spec, &graph);

    // Group ids per level, preserving the generator's node order.
    let deepest = levels.values().copied().max().unwrap_or(0);
    let mut rows: Vec<Vec<&FlowNode>> = vec![Vec::new(); deepest + 1];
    for n in &spec.nodes {
        let level = levels.get(n.id.as_str()).copied().unwrap_or(0);
        rows[level].push(n);
    }

    let mut nodes = Vec::with_capacity(spec.nodes.len());
    for (level, row) in rows.iter().enumerate() {
        let start_x = -(row.len() as f32 * X_SPACING) / 2.0;
        for (i, flow_node) in row.iter().enumerate() {
            nodes.push(Node::new(
                ElementId::intern(&flow_node.id),
                Point::new(start_x + i as f32 * X_SPACING, level as f32 * Y_SPACING),
                NodePayload::Shape(ShapeData {
                    label: flow_node.label.clone(),
                    details: flow_node.details.clone(),
                    ..Default::default()
                }),
            ));
        }
    }

    let edges = spec
        .edges
        .iter()
        .map(|e| {
            let mut edge = Edge::new(
                ElementId::intern(&e.id),
                ElementId::intern(&e.source),
                ElementId::intern(&e.target),
            );
            edge.animated = true;
            edge.label = e.label.clone();
            edge
        })
        .collect();

    (nodes, edges)
}

/// Level per node id: the deepest level any incoming path reaches.
///
/// Acyclic graphs get exact longest-path levels via a topological walk.
/// A cyclic graph has no topological order; it degrades to breadth-first
/// first-visit levels from the fallback root (the generator's first node),
/// which keeps the walk terminating and the output stable.
fn assign_levels<'a>(spec: &'a FlowSpec, graph: &DiGraphMap<&'a str, ()>) -> HashMap<&'a str, usize> {
    let mut levels: HashMap<&str, usize> = HashMap::new();

    if let Ok(order) = petgraph::algo::toposort(graph, None) {
        for id in order {
            let level = graph
                .neighbors_directed(id, petgraph::Direction::Incoming)
                .filter_map(|pred| levels.get(pred).map(|l| l + 1))
                .max()
                .unwrap_or(0);
            levels.insert(id, level);
        }
        return levels;
    }

    let mut queue: VecDeque<(&str, usize)> = spec
        .nodes
        .iter()
        .map(|n| n.id.as_str())
        .filter(|id| {
            graph
                .neighbors_directed(id, petgraph::Direction::Incoming)
                .next()
                .is_none()
        })
        .map(|id| (id, 0usize))
        .collect();
    if queue.is_empty() {
        log::debug!("flow graph is cyclic with no roots; leveling from the first node");
        queue.push_back((spec.nodes[0].id.as_str(), 0));
    }
    while let Some((id, level)) = queue.pop_front() {
        if levels.contains_key(id) {
            continue;
        }
        levels.insert(id, level);
        for child in graph.neighbors_directed(id, petgraph::Direction::Outgoing) {
            queue.push_back((child, level + 1));
        }
    }
    levels
}
