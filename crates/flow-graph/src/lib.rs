//! Flow Graph - graph model and mutation engine for Loomflow
//!
//! This crate owns the data model behind the visual flow editor:
//!
//! - Nodes, edges, and the aggregate graph the canvas renders
//! - The kind taxonomy driving execution and website classification
//! - Mutation rules: add, connect, splice-on-drop, cascading delete
//! - Straight-line edge hit-testing for drop-on-edge insertion
//! - Structural validation (dangling edges, duplicate ids, cycles)
//!
//! The engines that traverse graphs (execution simulation, website
//! generation) live in `loomflow-site-service`; per-kind behaviors live
//! in `flow-nodes`. This crate stays synchronous: every mutation is a
//! single `&mut self` call and atomic from the caller's perspective.

pub mod builder;
pub mod catalog;
pub mod geometry;
pub mod kind;
pub mod mutation;
pub mod types;
pub mod validation;

// Re-export key types
pub use builder::GraphBuilder;
pub use geometry::{EDGE_HIT_TOLERANCE, NODE_ANCHOR_OFFSET};
pub use kind::NodeKind;
pub use mutation::{INPUT_HANDLE, OUTPUT_HANDLE};
pub use types::{
    AttrMap, EdgeId, FlowEdge, FlowGraph, FlowId, FlowNode, NodeId, Position, Viewport,
};
pub use validation::{validate, ValidationError};
