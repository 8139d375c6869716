//! Error types for the flow engines

use thiserror::Error;

/// Result type alias using EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by the execution and site generation engines.
///
/// Simulated per-node failures and per-service failures are recorded
/// outcome statuses, not errors; a per-page render fault is isolated
/// inside the site engine. What remains here either aborts a run or
/// prevents one from starting.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Execution requested on a graph where every eligible node has an
    /// incoming connection
    #[error("Flow has no entry point: add a node without incoming connections")]
    NoEntryPoint,

    /// Website generation requested with zero page-capable nodes
    #[error("Flow has no page nodes to build a website from")]
    NoPageNodes,

    /// Traversal hit a node id that is not in the graph (dangling edge)
    #[error("Traversal references unknown node '{0}'")]
    MissingNode(String),

    /// Persistence adapter failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from a persistence backend.
///
/// The in-memory store never produces these; the variants exist for
/// fallible backends behind the same trait. "Not found" is not an
/// error; loads return `None`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend-specific failure
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Snapshot could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
