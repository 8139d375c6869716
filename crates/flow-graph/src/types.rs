//! Core types for flow graphs
//!
//! These types define the structure the canvas edits and the engines
//! traverse: nodes, edges, the aggregate graph, and the viewport that
//! is persisted alongside it.

use serde::{Deserialize, Serialize};

use crate::kind::NodeKind;

/// Unique identifier for a node
pub type NodeId = String;

/// Unique identifier for an edge
pub type EdgeId = String;

/// Unique identifier for a persisted flow
pub type FlowId = String;

/// Open string-keyed presentation/config data.
///
/// Untyped on purpose: the canvas stores whatever presentation fields it
/// needs (url, method, text, colors, width/height, opacity) without a
/// schema migration. Behavioral fields stay strongly typed on the node.
pub type AttrMap = serde_json::Map<String, serde_json::Value>;

/// A 2D canvas coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// The saved canvas viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// A node instance in a flow graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    /// Unique identifier, stable for the node's lifetime
    pub id: NodeId,
    /// Behavioral classification; immutable once created
    pub kind: NodeKind,
    /// Canvas position
    pub position: Position,
    /// Presentation/config data, open schema
    #[serde(default)]
    pub attributes: AttrMap,
    /// Group nodes are visual containers only, excluded from execution
    /// and from page/service classification
    #[serde(default)]
    pub is_group: bool,
}

impl FlowNode {
    /// The name shown to users: the `label` attribute when present,
    /// otherwise the kind's display label.
    pub fn display_name(&self) -> &str {
        self.attributes
            .get("label")
            .and_then(|v| v.as_str())
            .unwrap_or_else(|| self.kind.label())
    }

    /// Whether this node renders as a page in a generated website.
    pub fn is_page_capable(&self) -> bool {
        !self.is_group && self.kind.is_page_capable()
    }

    /// Whether this node is simulated as a background service during
    /// website generation.
    pub fn is_service_capable(&self) -> bool {
        !self.is_group && self.kind.is_service_capable()
    }
}

/// A directed edge connecting two nodes' ports
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdge {
    /// Unique identifier, conventionally derived from source-target
    pub id: EdgeId,
    /// Source node ID
    pub source: NodeId,
    /// Source port ("output"; at most one output port per node)
    pub source_handle: String,
    /// Target node ID
    pub target: NodeId,
    /// Target port ("input"; at most one input port per node)
    pub target_handle: String,
    /// Visual style/animation/marker data, inherited across a splice
    #[serde(default)]
    pub attributes: AttrMap,
}

/// A complete flow graph: the aggregate the editor session owns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowGraph {
    /// Nodes in the graph
    pub nodes: Vec<FlowNode>,
    /// Edges connecting nodes
    pub edges: Vec<FlowEdge>,
}

impl FlowGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a node by ID
    pub fn find_node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Find a node by ID (mutable)
    pub fn find_node_mut(&mut self, id: &str) -> Option<&mut FlowNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Find an edge by ID
    pub fn find_edge(&self, id: &str) -> Option<&FlowEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Check whether a node with this ID exists
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Get edges coming into a node
    pub fn incoming_edges<'a>(
        &'a self,
        node_id: &'a str,
    ) -> impl Iterator<Item = &'a FlowEdge> + 'a {
        self.edges.iter().filter(move |e| e.target == node_id)
    }

    /// Get edges going out of a node
    pub fn outgoing_edges<'a>(
        &'a self,
        node_id: &'a str,
    ) -> impl Iterator<Item = &'a FlowEdge> + 'a {
        self.edges.iter().filter(move |e| e.source == node_id)
    }

    /// Nodes that participate in execution and classification
    pub fn non_group_nodes(&self) -> impl Iterator<Item = &FlowNode> {
        self.nodes.iter().filter(|n| !n.is_group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_node(id: &str, kind: NodeKind) -> FlowNode {
        FlowNode {
            id: id.to_string(),
            kind,
            position: Position::default(),
            attributes: AttrMap::new(),
            is_group: false,
        }
    }

    #[test]
    fn test_display_name_falls_back_to_kind() {
        let mut node = make_node("n1", NodeKind::ApiCall);
        assert_eq!(node.display_name(), "API Call");

        node.attributes
            .insert("label".to_string(), serde_json::json!("Fetch users"));
        assert_eq!(node.display_name(), "Fetch users");
    }

    #[test]
    fn test_group_flag_overrides_classification() {
        let mut node = make_node("g1", NodeKind::Page);
        node.is_group = true;
        assert!(!node.is_page_capable());
        assert!(!node.is_service_capable());
    }

    #[test]
    fn test_edge_iterators() {
        let mut graph = FlowGraph::new();
        graph.nodes.push(make_node("a", NodeKind::ApiCall));
        graph.nodes.push(make_node("b", NodeKind::Database));
        graph.edges.push(FlowEdge {
            id: "e1".to_string(),
            source: "a".to_string(),
            source_handle: "output".to_string(),
            target: "b".to_string(),
            target_handle: "input".to_string(),
            attributes: AttrMap::new(),
        });

        assert_eq!(graph.outgoing_edges("a").count(), 1);
        assert_eq!(graph.incoming_edges("b").count(), 1);
        assert_eq!(graph.incoming_edges("a").count(), 0);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut graph = FlowGraph::new();
        graph.nodes.push(make_node("a", NodeKind::Page));
        let json = serde_json::to_string(&graph).unwrap();
        let restored: FlowGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.nodes.len(), 1);
        assert_eq!(restored.nodes[0].kind, NodeKind::Page);
        assert!(!restored.nodes[0].is_group);
    }
}
