//! Graph mutation engine
//!
//! All structural edits go through these methods. Each operation is a
//! single `&mut self` call, so callers never observe a half-applied
//! edit. Operations referencing ids that no longer exist are no-ops:
//! the canvas may deliver stale events after a deletion and must not
//! fault the session.

use uuid::Uuid;

use crate::catalog;
use crate::kind::NodeKind;
use crate::types::{AttrMap, EdgeId, FlowEdge, FlowGraph, FlowNode, NodeId, Position};

/// Port name every node receives connections on.
pub const INPUT_HANDLE: &str = "input";
/// Port name every node emits connections from.
pub const OUTPUT_HANDLE: &str = "output";

impl FlowGraph {
    /// Create a node of `kind` at `position` with the kind's default
    /// attributes and append it to the graph.
    ///
    /// Ids are `node-{uuid}`: collision-free within a session without
    /// any coordination.
    pub fn add_node(&mut self, kind: NodeKind, position: impl Into<Position>) -> NodeId {
        let id = format!("node-{}", Uuid::new_v4());
        let is_group = matches!(kind, NodeKind::Group);
        let attributes = catalog::default_attributes(&kind);

        log::debug!("add_node: {} ({})", id, kind.label());
        self.nodes.push(FlowNode {
            id: id.clone(),
            kind,
            position: position.into(),
            attributes,
            is_group,
        });
        id
    }

    /// Create an edge between two existing nodes.
    ///
    /// Returns `None` without touching the graph when either endpoint
    /// is missing. Duplicate and cyclic edges are accepted; the
    /// execution engine carries its own cycle guard.
    pub fn connect(
        &mut self,
        source: &str,
        source_handle: &str,
        target: &str,
        target_handle: &str,
    ) -> Option<EdgeId> {
        if !self.contains_node(source) || !self.contains_node(target) {
            log::debug!("connect: missing endpoint {source} -> {target}, ignoring");
            return None;
        }

        let id = self.fresh_edge_id(source, target);
        self.edges.push(FlowEdge {
            id: id.clone(),
            source: source.to_string(),
            source_handle: source_handle.to_string(),
            target: target.to_string(),
            target_handle: target_handle.to_string(),
            attributes: AttrMap::new(),
        });
        Some(id)
    }

    /// Splice `node_id` into the middle of `edge_id`.
    ///
    /// The original edge `A -> B` is replaced by `A -> node` (into the
    /// node's input port) and `node -> B` (out of its output port),
    /// both inheriting the original edge's visual attributes. The whole
    /// splice happens inside this one call: the graph never holds the
    /// original edge alongside the replacements, nor the new node
    /// disconnected between them.
    ///
    /// Returns `false` (no-op) when the edge or node is missing, or
    /// when the splice would create a self-loop.
    pub fn insert_node_on_edge(&mut self, node_id: &str, edge_id: &str) -> bool {
        if !self.contains_node(node_id) {
            return false;
        }
        let Some(pos) = self.edges.iter().position(|e| e.id == edge_id) else {
            return false;
        };
        if self.edges[pos].source == node_id || self.edges[pos].target == node_id {
            return false;
        }

        let original = self.edges.remove(pos);
        log::debug!(
            "splice: {} replaces {} ({} -> {})",
            node_id,
            original.id,
            original.source,
            original.target
        );

        let incoming_id = self.fresh_edge_id(&original.source, node_id);
        self.edges.push(FlowEdge {
            id: incoming_id,
            source: original.source.clone(),
            source_handle: original.source_handle.clone(),
            target: node_id.to_string(),
            target_handle: INPUT_HANDLE.to_string(),
            attributes: original.attributes.clone(),
        });

        let outgoing_id = self.fresh_edge_id(node_id, &original.target);
        self.edges.push(FlowEdge {
            id: outgoing_id,
            source: node_id.to_string(),
            source_handle: OUTPUT_HANDLE.to_string(),
            target: original.target.clone(),
            target_handle: original.target_handle.clone(),
            attributes: original.attributes,
        });

        true
    }

    /// Remove a node and every edge whose source or target is the node,
    /// in the same operation.
    ///
    /// Idempotent: deleting an absent node is a no-op returning `false`.
    pub fn delete_node(&mut self, node_id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != node_id);
        if self.nodes.len() == before {
            return false;
        }

        self.edges
            .retain(|e| e.source != node_id && e.target != node_id);
        log::debug!("delete_node: {node_id}");
        true
    }

    /// Shallow-merge `patch` into a node's attribute map.
    ///
    /// Keys are not validated: this is open presentation data. Missing
    /// node is a no-op.
    pub fn update_node_attributes(&mut self, node_id: &str, patch: AttrMap) -> bool {
        let Some(node) = self.find_node_mut(node_id) else {
            return false;
        };
        for (key, value) in patch {
            node.attributes.insert(key, value);
        }
        true
    }

    /// Store a resize result in the node's attribute map.
    pub fn update_node_size(&mut self, node_id: &str, width: f64, height: f64) -> bool {
        let mut patch = AttrMap::new();
        patch.insert("width".to_string(), serde_json::json!(width));
        patch.insert("height".to_string(), serde_json::json!(height));
        self.update_node_attributes(node_id, patch)
    }

    /// Conventional `edge-{source}-{target}` id, uniquified with a uuid
    /// suffix when a duplicate edge already took it.
    fn fresh_edge_id(&self, source: &str, target: &str) -> EdgeId {
        let id = format!("edge-{source}-{target}");
        if self.edges.iter().any(|e| e.id == id) {
            format!("{}-{}", id, Uuid::new_v4())
        } else {
            id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;

    #[test]
    fn test_add_node_applies_kind_defaults() {
        let mut graph = FlowGraph::new();
        let id = graph.add_node(NodeKind::Group, (10.0, 20.0));

        let node = graph.find_node(&id).unwrap();
        assert!(node.is_group);
        assert_eq!(node.attributes.get("width"), Some(&serde_json::json!(300.0)));

        let other = graph.add_node(NodeKind::Group, (0.0, 0.0));
        assert_ne!(id, other);
    }

    #[test]
    fn test_connect_missing_endpoint_is_noop() {
        let mut graph = FlowGraph::new();
        let a = graph.add_node(NodeKind::ApiCall, (0.0, 0.0));

        assert!(graph.connect(&a, "output", "ghost", "input").is_none());
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_duplicate_edges_get_distinct_ids() {
        let mut graph = GraphBuilder::new()
            .node("a", NodeKind::ApiCall, (0.0, 0.0))
            .node("b", NodeKind::Database, (100.0, 0.0))
            .build();

        let first = graph.connect("a", "output", "b", "input").unwrap();
        let second = graph.connect("a", "output", "b", "input").unwrap();
        assert_ne!(first, second);
        assert_eq!(graph.edges.len(), 2);
    }

    #[test]
    fn test_splice_replaces_edge_with_two() {
        let mut graph = GraphBuilder::new()
            .node("a", NodeKind::ApiCall, (0.0, 0.0))
            .node("b", NodeKind::Database, (200.0, 0.0))
            .edge_with_id("e1", "a", "b")
            .build();
        let d = graph.add_node(NodeKind::Transform, (100.0, 0.0));

        assert!(graph.insert_node_on_edge(&d, "e1"));

        assert_eq!(graph.edges.len(), 2);
        assert!(graph.find_edge("e1").is_none());
        assert!(graph
            .edges
            .iter()
            .any(|e| e.source == "a" && e.target == d && e.target_handle == INPUT_HANDLE));
        assert!(graph
            .edges
            .iter()
            .any(|e| e.source == d && e.target == "b" && e.source_handle == OUTPUT_HANDLE));
    }

    #[test]
    fn test_splice_inherits_edge_attributes() {
        let mut graph = GraphBuilder::new()
            .node("a", NodeKind::ApiCall, (0.0, 0.0))
            .node("b", NodeKind::Database, (200.0, 0.0))
            .edge_with_id("e1", "a", "b")
            .build();
        let mut style = AttrMap::new();
        style.insert("animated".to_string(), serde_json::json!(true));
        graph.edges[0].attributes = style;

        let d = graph.add_node(NodeKind::Transform, (100.0, 0.0));
        assert!(graph.insert_node_on_edge(&d, "e1"));

        for edge in &graph.edges {
            assert_eq!(edge.attributes.get("animated"), Some(&serde_json::json!(true)));
        }
    }

    #[test]
    fn test_splice_missing_edge_is_noop() {
        let mut graph = FlowGraph::new();
        let d = graph.add_node(NodeKind::Transform, (0.0, 0.0));
        assert!(!graph.insert_node_on_edge(&d, "ghost"));
        assert_eq!(graph.nodes.len(), 1);
    }

    #[test]
    fn test_delete_node_removes_incident_edges() {
        // 2 incoming, 1 outgoing around "c"
        let mut graph = GraphBuilder::new()
            .node("a", NodeKind::ApiCall, (0.0, 0.0))
            .node("b", NodeKind::Database, (0.0, 100.0))
            .node("c", NodeKind::Transform, (100.0, 50.0))
            .node("d", NodeKind::Display, (200.0, 50.0))
            .edge("a", "c")
            .edge("b", "c")
            .edge("c", "d")
            .build();
        assert_eq!(graph.edges.len(), 3);

        assert!(graph.delete_node("c"));
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.edges.len(), 0);
    }

    #[test]
    fn test_delete_node_is_idempotent() {
        let mut graph = FlowGraph::new();
        let id = graph.add_node(NodeKind::ApiCall, (0.0, 0.0));

        assert!(graph.delete_node(&id));
        assert!(!graph.delete_node(&id));
        assert!(graph.nodes.is_empty());
    }

    #[test]
    fn test_edge_node_integrity_after_mutations() {
        let mut graph = GraphBuilder::new()
            .node("a", NodeKind::ApiCall, (0.0, 0.0))
            .node("b", NodeKind::Database, (100.0, 0.0))
            .node("c", NodeKind::Display, (200.0, 0.0))
            .edge("a", "b")
            .edge("b", "c")
            .build();

        let d = graph.add_node(NodeKind::Transform, (50.0, 0.0));
        let edge_id = graph.edges[0].id.clone();
        graph.insert_node_on_edge(&d, &edge_id);
        graph.delete_node("b");

        for edge in &graph.edges {
            assert!(graph.contains_node(&edge.source));
            assert!(graph.contains_node(&edge.target));
        }
    }

    #[test]
    fn test_update_attributes_shallow_merge() {
        let mut graph = FlowGraph::new();
        let id = graph.add_node(NodeKind::Page, (0.0, 0.0));

        let mut patch = AttrMap::new();
        patch.insert("label".to_string(), serde_json::json!("Home"));
        assert!(graph.update_node_attributes(&id, patch));

        let node = graph.find_node(&id).unwrap();
        assert_eq!(node.display_name(), "Home");
        // Untouched defaults survive the merge
        assert!(node.attributes.contains_key("icon"));

        assert!(!graph.update_node_attributes("ghost", AttrMap::new()));
    }

    #[test]
    fn test_update_size_writes_attributes() {
        let mut graph = FlowGraph::new();
        let id = graph.add_node(NodeKind::Group, (0.0, 0.0));
        graph.update_node_size(&id, 420.0, 180.0);

        let node = graph.find_node(&id).unwrap();
        assert_eq!(node.attributes.get("width"), Some(&serde_json::json!(420.0)));
        assert_eq!(node.attributes.get("height"), Some(&serde_json::json!(180.0)));
    }
}
