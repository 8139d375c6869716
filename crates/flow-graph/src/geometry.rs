//! Edge hit-testing for drop-on-edge insertion
//!
//! Approximates each node's anchor as its stored position plus a fixed
//! center-of-box offset, then measures the perpendicular distance from
//! the drop point to the straight segment between the two anchors. This
//! is deliberately not hit-testing against the rendered curve: the
//! straight-line approximation is cheap and close enough for
//! drag-and-drop, and changing it would change drop behavior.

use crate::types::{FlowEdge, FlowGraph, Position};

/// Maximum distance (canvas px) between a drop point and an edge's
/// segment for the edge to count as hit.
pub const EDGE_HIT_TOLERANCE: f64 = 20.0;

/// Offset from a node's stored position to its approximate center.
pub const NODE_ANCHOR_OFFSET: (f64, f64) = (75.0, 25.0);

/// The approximate center of a node's rendered box.
pub fn node_anchor(position: Position) -> Position {
    Position::new(
        position.x + NODE_ANCHOR_OFFSET.0,
        position.y + NODE_ANCHOR_OFFSET.1,
    )
}

/// Distance from `point` to the segment `a`-`b`.
pub fn segment_distance(point: Position, a: Position, b: Position) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;

    if len_sq == 0.0 {
        // Degenerate segment: both anchors coincide
        return ((point.x - a.x).powi(2) + (point.y - a.y).powi(2)).sqrt();
    }

    let t = ((point.x - a.x) * dx + (point.y - a.y) * dy) / len_sq;
    let t = t.clamp(0.0, 1.0);
    let proj = Position::new(a.x + t * dx, a.y + t * dy);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

impl FlowGraph {
    /// Find the first edge whose approximated path lies within
    /// [`EDGE_HIT_TOLERANCE`] of `point`.
    ///
    /// Edges whose endpoints are missing from the node set are skipped.
    pub fn edge_hit(&self, point: Position) -> Option<&FlowEdge> {
        self.edges.iter().find(|edge| {
            let (Some(source), Some(target)) =
                (self.find_node(&edge.source), self.find_node(&edge.target))
            else {
                return false;
            };
            let a = node_anchor(source.position);
            let b = node_anchor(target.position);
            segment_distance(point, a, b) < EDGE_HIT_TOLERANCE
        })
    }
}
