//! Fluent builder for flow graphs
//!
//! Programmatic construction surface, used heavily by tests and by
//! hosts that seed starter flows.
//!
//! # Example
//!
//! ```
//! use flow_graph::{GraphBuilder, NodeKind};
//!
//! let graph = GraphBuilder::new()
//!     .node("fetch", NodeKind::ApiCall, (0.0, 0.0))
//!     .node("home", NodeKind::Page, (200.0, 0.0))
//!     .edge("fetch", "home")
//!     .build();
//! assert_eq!(graph.nodes.len(), 2);
//! ```

use crate::kind::NodeKind;
use crate::mutation::{INPUT_HANDLE, OUTPUT_HANDLE};
use crate::types::{AttrMap, FlowEdge, FlowGraph, FlowNode, Position};

/// Fluent builder for constructing flow graphs with explicit ids.
pub struct GraphBuilder {
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
    edge_counter: usize,
}

impl GraphBuilder {
    /// Create a new empty builder
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            edge_counter: 0,
        }
    }

    /// Add a node with an explicit id
    pub fn node(
        mut self,
        id: impl Into<String>,
        kind: NodeKind,
        position: impl Into<Position>,
    ) -> Self {
        let is_group = matches!(kind, NodeKind::Group);
        self.nodes.push(FlowNode {
            id: id.into(),
            kind,
            position: position.into(),
            attributes: AttrMap::new(),
            is_group,
        });
        self
    }

    /// Add a group container node
    pub fn group(self, id: impl Into<String>, position: impl Into<Position>) -> Self {
        self.node(id, NodeKind::Group, position)
    }

    /// Set attributes on the most recently added node
    ///
    /// Must be called immediately after `node`.
    pub fn with_attributes(mut self, attributes: serde_json::Value) -> Self {
        if let (Some(node), serde_json::Value::Object(map)) = (self.nodes.last_mut(), attributes) {
            node.attributes = map;
        }
        self
    }

    /// Add an edge between two nodes on the default ports
    /// (auto-generates the edge id)
    pub fn edge(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.edge_counter += 1;
        self.edges.push(FlowEdge {
            id: format!("edge-{}", self.edge_counter),
            source: source.into(),
            source_handle: OUTPUT_HANDLE.to_string(),
            target: target.into(),
            target_handle: INPUT_HANDLE.to_string(),
            attributes: AttrMap::new(),
        });
        self
    }

    /// Add an edge with an explicit id
    pub fn edge_with_id(
        mut self,
        edge_id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.edges.push(FlowEdge {
            id: edge_id.into(),
            source: source.into(),
            source_handle: OUTPUT_HANDLE.to_string(),
            target: target.into(),
            target_handle: INPUT_HANDLE.to_string(),
            attributes: AttrMap::new(),
        });
        self
    }

    /// Build the graph without validation
    pub fn build(self) -> FlowGraph {
        FlowGraph {
            nodes: self.nodes,
            edges: self.edges,
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_basic() {
        let graph = GraphBuilder::new()
            .node("a", NodeKind::ApiCall, (0.0, 0.0))
            .with_attributes(serde_json::json!({"label": "Fetch"}))
            .node("b", NodeKind::Page, (200.0, 0.0))
            .edge("a", "b")
            .build();

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.nodes[0].display_name(), "Fetch");
        assert_eq!(graph.edges[0].source_handle, OUTPUT_HANDLE);
    }

    #[test]
    fn test_builder_auto_edge_ids() {
        let graph = GraphBuilder::new()
            .node("a", NodeKind::ApiCall, (0.0, 0.0))
            .node("b", NodeKind::Database, (100.0, 0.0))
            .node("c", NodeKind::Display, (200.0, 0.0))
            .edge("a", "b")
            .edge("b", "c")
            .build();

        assert_eq!(graph.edges[0].id, "edge-1");
        assert_eq!(graph.edges[1].id, "edge-2");
    }

    #[test]
    fn test_builder_group_sets_flag() {
        let graph = GraphBuilder::new().group("g", (0.0, 0.0)).build();
        assert!(graph.nodes[0].is_group);
        assert_eq!(graph.nodes[0].kind, NodeKind::Group);
    }
}
