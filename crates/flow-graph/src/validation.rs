//! Structural validation for flow graphs
//!
//! Advisory checks the editor can run before enabling a flow run.
//! The engines do not consult these: the execution engine carries its
//! own cycle guard, and the mutation engine maintains edge-node
//! integrity by construction. Validation exists to surface graphs that
//! arrived broken from storage or an older snapshot format.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::types::FlowGraph;

/// Validation finding with location context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// An edge references a node that is not in the node set
    DanglingEdge { edge_id: String, node_id: String },
    /// Two nodes share an id
    DuplicateNodeId { node_id: String },
    /// An edge connects a node to itself
    SelfLoop { edge_id: String },
    /// The non-group subgraph contains a cycle
    CycleDetected,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DanglingEdge { edge_id, node_id } => {
                write!(f, "Edge '{}' references unknown node '{}'", edge_id, node_id)
            }
            Self::DuplicateNodeId { node_id } => {
                write!(f, "Duplicate node id '{}'", node_id)
            }
            Self::SelfLoop { edge_id } => write!(f, "Edge '{}' is a self-loop", edge_id),
            Self::CycleDetected => write!(f, "Cycle detected in graph"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a flow graph
///
/// Returns all findings, not just the first.
pub fn validate(graph: &FlowGraph) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    validate_node_ids(graph, &mut errors);
    validate_edge_references(graph, &mut errors);
    detect_cycles(graph, &mut errors);

    errors
}

fn validate_node_ids(graph: &FlowGraph, errors: &mut Vec<ValidationError>) {
    let mut seen: HashSet<&str> = HashSet::new();
    for node in &graph.nodes {
        if !seen.insert(&node.id) {
            errors.push(ValidationError::DuplicateNodeId {
                node_id: node.id.clone(),
            });
        }
    }
}

fn validate_edge_references(graph: &FlowGraph, errors: &mut Vec<ValidationError>) {
    let node_ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();

    for edge in &graph.edges {
        if !node_ids.contains(edge.source.as_str()) {
            errors.push(ValidationError::DanglingEdge {
                edge_id: edge.id.clone(),
                node_id: edge.source.clone(),
            });
        }
        if !node_ids.contains(edge.target.as_str()) {
            errors.push(ValidationError::DanglingEdge {
                edge_id: edge.id.clone(),
                node_id: edge.target.clone(),
            });
        }
        if edge.source == edge.target {
            errors.push(ValidationError::SelfLoop {
                edge_id: edge.id.clone(),
            });
        }
    }
}

/// Detect cycles in the non-group subgraph using Kahn's algorithm
fn detect_cycles(graph: &FlowGraph, errors: &mut Vec<ValidationError>) {
    let executable: HashSet<&str> = graph
        .non_group_nodes()
        .map(|n| n.id.as_str())
        .collect();

    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    for id in &executable {
        in_degree.insert(id, 0);
    }
    for edge in &graph.edges {
        if executable.contains(edge.source.as_str()) && executable.contains(edge.target.as_str()) {
            *in_degree.entry(&edge.target).or_insert(0) += 1;
        }
    }

    let mut queue: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, &deg)| deg == 0)
        .map(|(&id, _)| id)
        .collect();

    let mut visited = 0;
    while let Some(node_id) = queue.pop_front() {
        visited += 1;
        for edge in &graph.edges {
            if edge.source == node_id && executable.contains(edge.target.as_str()) {
                if let Some(deg) = in_degree.get_mut(edge.target.as_str()) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(&edge.target);
                    }
                }
            }
        }
    }

    if visited < executable.len() {
        errors.push(ValidationError::CycleDetected);
    }
}
