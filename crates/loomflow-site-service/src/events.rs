//! Event types for streaming editor and engine progress
//!
//! Events are sent from the engines to the frontend (or any consumer)
//! to report run progress, the live execution highlight, and graph
//! change notifications. The "currently executing" highlight is the
//! [`FlowEvent::ExecutingNodeChanged`] notification rather than shared
//! mutable state: consumers subscribe instead of polling a global.

use serde::{Deserialize, Serialize};

use flow_graph::{FlowId, NodeId};
use flow_nodes::{NodeOutcome, OutcomeStatus};

use crate::executor::ReportSummary;

/// Trait for sending flow events
///
/// Abstracts over the transport mechanism (channel, webview bridge,
/// test buffer) so the engines can be used in different hosts.
pub trait EventSink: Send + Sync {
    /// Send an event
    ///
    /// Returns an error if the event could not be sent (e.g., channel
    /// closed). Engines treat send failures as non-fatal.
    fn send(&self, event: FlowEvent) -> Result<(), EventError>;
}

/// Error when sending events fails
#[derive(Debug, Clone)]
pub struct EventError {
    pub message: String,
}

impl std::fmt::Display for EventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event error: {}", self.message)
    }
}

impl std::error::Error for EventError {}

impl EventError {
    pub fn channel_closed() -> Self {
        Self {
            message: "Channel closed".to_string(),
        }
    }
}

/// Events emitted by the editor session and the engines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FlowEvent {
    /// The graph was mutated; the canvas should re-render
    #[serde(rename_all = "camelCase")]
    GraphChanged {
        #[serde(skip_serializing_if = "Option::is_none")]
        flow_id: Option<FlowId>,
    },

    /// A flow run started
    #[serde(rename_all = "camelCase")]
    ExecutionStarted { execution_id: String },

    /// The live execution highlight moved; `None` clears it
    #[serde(rename_all = "camelCase")]
    ExecutingNodeChanged {
        #[serde(skip_serializing_if = "Option::is_none")]
        node_id: Option<NodeId>,
    },

    /// A node finished its simulated execution (success or failure)
    #[serde(rename_all = "camelCase")]
    NodeCompleted {
        node_id: NodeId,
        outcome: NodeOutcome,
    },

    /// A flow run completed; the full trace is in the returned report
    #[serde(rename_all = "camelCase")]
    ExecutionCompleted {
        execution_id: String,
        summary: ReportSummary,
    },

    /// A flow run aborted on an internal fault
    #[serde(rename_all = "camelCase")]
    ExecutionFailed {
        execution_id: String,
        error: String,
    },

    /// Website generation produced a document bundle
    #[serde(rename_all = "camelCase")]
    SiteGenerated {
        #[serde(skip_serializing_if = "Option::is_none")]
        flow_id: Option<FlowId>,
        page_count: usize,
    },

    /// Website generation could not start
    #[serde(rename_all = "camelCase")]
    SiteGenerationFailed {
        #[serde(skip_serializing_if = "Option::is_none")]
        flow_id: Option<FlowId>,
        error: String,
    },

    /// A background service simulation finished
    #[serde(rename_all = "camelCase")]
    ServiceCompleted {
        node_id: NodeId,
        status: OutcomeStatus,
    },
}

/// A no-op event sink that discards all events
///
/// Useful for testing or when events aren't needed.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send(&self, _event: FlowEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// A vector-based event sink that collects events
///
/// Useful for testing to verify events were emitted correctly.
pub struct VecEventSink {
    events: parking_lot::Mutex<Vec<FlowEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self {
            events: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Get all collected events
    pub fn events(&self) -> Vec<FlowEvent> {
        self.events.lock().clone()
    }

    /// Clear all collected events
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Default for VecEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for VecEventSink {
    fn send(&self, event: FlowEvent) -> Result<(), EventError> {
        self.events.lock().push(event);
        Ok(())
    }
}
