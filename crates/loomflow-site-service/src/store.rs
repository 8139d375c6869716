//! Persistence adapter for flow snapshots
//!
//! The engines never touch storage; the editor session reads and
//! writes full `{nodes, edges, viewport}` snapshots through the
//! [`FlowStore`] trait. The in-memory implementation backs tests and
//! single-process hosts; disk or service backends implement the same
//! trait.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use flow_graph::{FlowEdge, FlowId, FlowNode, Viewport};

use crate::error::StoreError;

/// The persisted shape of a flow: a full graph snapshot plus viewport.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSnapshot {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
    #[serde(default)]
    pub viewport: Viewport,
}

/// A saved flow record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRecord {
    pub id: FlowId,
    pub name: String,
    pub snapshot: FlowSnapshot,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing entry without the snapshot payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSummary {
    pub id: FlowId,
    pub name: String,
    pub updated_at: DateTime<Utc>,
}

/// Storage contract for flows.
///
/// Create-or-update semantics: saving without an id creates a fresh
/// record; saving with an unknown id creates a record under that id.
/// A missing flow on load is `None`, never an error; the editor
/// treats it as a new, empty graph.
#[async_trait]
pub trait FlowStore: Send + Sync {
    /// Load a flow by id.
    async fn load(&self, flow_id: &str) -> Result<Option<FlowRecord>, StoreError>;

    /// Create or update a flow.
    async fn save(
        &self,
        flow_id: Option<&str>,
        name: &str,
        snapshot: FlowSnapshot,
    ) -> Result<FlowRecord, StoreError>;

    /// List saved flows, most recently updated first.
    async fn list(&self) -> Result<Vec<FlowSummary>, StoreError>;

    /// Delete a flow. Returns whether a record existed.
    async fn delete(&self, flow_id: &str) -> Result<bool, StoreError>;
}

/// In-memory flow store.
pub struct InMemoryFlowStore {
    records: RwLock<HashMap<FlowId, FlowRecord>>,
}

impl InMemoryFlowStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryFlowStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FlowStore for InMemoryFlowStore {
    async fn load(&self, flow_id: &str) -> Result<Option<FlowRecord>, StoreError> {
        Ok(self.records.read().get(flow_id).cloned())
    }

    async fn save(
        &self,
        flow_id: Option<&str>,
        name: &str,
        snapshot: FlowSnapshot,
    ) -> Result<FlowRecord, StoreError> {
        let now = Utc::now();
        let mut records = self.records.write();

        let id = match flow_id {
            Some(id) => id.to_string(),
            None => format!("flow-{}", Uuid::new_v4()),
        };

        let record = match records.get(&id) {
            Some(existing) => FlowRecord {
                id: id.clone(),
                name: name.to_string(),
                snapshot,
                created_at: existing.created_at,
                updated_at: now,
            },
            None => FlowRecord {
                id: id.clone(),
                name: name.to_string(),
                snapshot,
                created_at: now,
                updated_at: now,
            },
        };

        records.insert(id, record.clone());
        log::debug!("saved flow '{}' ({})", record.name, record.id);
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<FlowSummary>, StoreError> {
        let mut summaries: Vec<FlowSummary> = self
            .records
            .read()
            .values()
            .map(|r| FlowSummary {
                id: r.id.clone(),
                name: r.name.clone(),
                updated_at: r.updated_at,
            })
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    async fn delete(&self, flow_id: &str) -> Result<bool, StoreError> {
        Ok(self.records.write().remove(flow_id).is_some())
    }
}
