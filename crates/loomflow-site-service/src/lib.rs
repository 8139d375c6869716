//! Loomflow Site Service - flow execution and website generation
//!
//! Host-agnostic application services behind the flow editor:
//!
//! - `FlowExecutor`: depth-first simulated execution producing an
//!   ordered step trace and a run report ("Run Flow")
//! - `SiteGenerator`: projects the page-capable subgraph into a
//!   standalone multi-page document bundle and fires off background
//!   service simulations ("Run Website")
//! - `FlowStore`: the persistence contract for `{nodes, edges,
//!   viewport}` snapshots, with an in-memory implementation
//! - `EditorSession`: the facade the canvas talks to. Mutations in,
//!   events out
//!
//! # Architecture
//!
//! The graph model lives in `flow-graph`, per-kind behaviors in
//! `flow-nodes`. Engines only ever read the graph; mutations happen
//! synchronously on the session before or after a run, never during
//! one. Progress streams through the `EventSink` trait so hosts choose
//! their own transport.

pub mod error;
pub mod events;
pub mod executor;
pub mod session;
pub mod site;
pub mod store;

// Re-export key types
pub use error::{EngineError, Result, StoreError};
pub use events::{EventError, EventSink, FlowEvent, NullEventSink, VecEventSink};
pub use executor::{ExecutionReport, ExecutionStep, FlowExecutor, ReportSummary};
pub use session::EditorSession;
pub use site::{
    entry_point, site_structure, GeneratedSite, PageEntry, ServiceBatch, SiteGenerator,
    SiteStructure,
};
pub use store::{FlowRecord, FlowSnapshot, FlowStore, FlowSummary, InMemoryFlowStore};

// Re-export the domain crates consumers will need
pub use flow_graph::{FlowEdge, FlowGraph, FlowNode, GraphBuilder, NodeKind};
pub use flow_nodes::{NodeOutcome, OutcomeStatus, SiteTheme, Simulator};
