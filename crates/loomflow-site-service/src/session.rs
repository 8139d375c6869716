//! Editor session: the boundary between the canvas and the engines
//!
//! One session owns one graph. Canvas events (drop, connect, delete,
//! resize, select) arrive as method calls, mutate the graph through
//! the mutation engine, and emit `GraphChanged`; run triggers hand the
//! graph read-only to the engines. Mutations are synchronous and the
//! engines never mutate, so a run always sees a consistent snapshot.

use std::sync::Arc;

use flow_graph::{
    AttrMap, EdgeId, FlowGraph, FlowId, NodeId, NodeKind, Position, Viewport,
};
use flow_nodes::SiteTheme;

use crate::error::Result;
use crate::events::{EventSink, FlowEvent};
use crate::executor::{ExecutionReport, FlowExecutor};
use crate::site::{GeneratedSite, SiteGenerator};
use crate::store::{FlowRecord, FlowSnapshot, FlowStore};

/// An editing session over one flow.
pub struct EditorSession<S: FlowStore> {
    flow_id: Option<FlowId>,
    name: String,
    graph: FlowGraph,
    viewport: Viewport,
    selection: Option<NodeId>,
    store: Arc<S>,
    events: Arc<dyn EventSink>,
    executor: FlowExecutor,
    generator: SiteGenerator,
}

impl<S: FlowStore> EditorSession<S> {
    /// Create a session over a new, unsaved flow.
    pub fn new(store: Arc<S>, events: Arc<dyn EventSink>) -> Self {
        let executor = FlowExecutor::new(Arc::clone(&events));
        let generator = SiteGenerator::new(Arc::clone(&events));
        Self {
            flow_id: None,
            name: "Untitled Flow".to_string(),
            graph: FlowGraph::new(),
            viewport: Viewport::default(),
            selection: None,
            store,
            events,
            executor,
            generator,
        }
    }

    /// Replace the execution engine (tests use seeded, zero-delay).
    pub fn with_executor(mut self, executor: FlowExecutor) -> Self {
        self.executor = executor;
        self
    }

    /// Replace the site generator.
    pub fn with_generator(mut self, generator: SiteGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn flow_id(&self) -> Option<&str> {
        self.flow_id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    /// Select a node; `None` clears the selection. Selecting an
    /// unknown id clears it too (the canvas may race a deletion).
    pub fn select(&mut self, node_id: Option<&str>) {
        self.selection = node_id
            .filter(|id| self.graph.contains_node(id))
            .map(|id| id.to_string());
    }

    // -----------------------------------------------------------------
    // Load / save
    // -----------------------------------------------------------------

    /// Open a flow by id. A missing record is a new empty graph under
    /// that id, not an error.
    pub async fn open(&mut self, flow_id: &str) -> Result<()> {
        match self.store.load(flow_id).await? {
            Some(record) => {
                log::info!("opened flow '{}' ({})", record.name, record.id);
                self.name = record.name;
                self.graph = FlowGraph {
                    nodes: record.snapshot.nodes,
                    edges: record.snapshot.edges,
                };
                self.viewport = record.snapshot.viewport;
            }
            None => {
                log::info!("flow '{}' not found, starting empty", flow_id);
                self.graph = FlowGraph::new();
                self.viewport = Viewport::default();
            }
        }
        self.flow_id = Some(flow_id.to_string());
        self.selection = None;
        self.emit_graph_changed();
        Ok(())
    }

    /// Save the current graph, adopting the store-assigned id when the
    /// flow was new.
    pub async fn save(&mut self) -> Result<FlowRecord> {
        let snapshot = FlowSnapshot {
            nodes: self.graph.nodes.clone(),
            edges: self.graph.edges.clone(),
            viewport: self.viewport,
        };
        let record = self
            .store
            .save(self.flow_id.as_deref(), &self.name, snapshot)
            .await?;
        self.flow_id = Some(record.id.clone());
        Ok(record)
    }

    // -----------------------------------------------------------------
    // Canvas mutations
    // -----------------------------------------------------------------

    /// Drop a new node onto the canvas. When the drop point lands
    /// within tolerance of an existing edge's path, the node is
    /// spliced into that edge.
    pub fn drop_node(&mut self, kind: NodeKind, position: Position) -> NodeId {
        let hit_edge = self.graph.edge_hit(position).map(|e| e.id.clone());
        let node_id = self.graph.add_node(kind, position);
        if let Some(edge_id) = hit_edge {
            self.graph.insert_node_on_edge(&node_id, &edge_id);
        }
        self.emit_graph_changed();
        node_id
    }

    /// Connect two nodes' ports.
    pub fn connect(
        &mut self,
        source: &str,
        source_handle: &str,
        target: &str,
        target_handle: &str,
    ) -> Option<EdgeId> {
        let edge_id = self
            .graph
            .connect(source, source_handle, target, target_handle);
        if edge_id.is_some() {
            self.emit_graph_changed();
        }
        edge_id
    }

    /// Delete a node and its incident edges. Clears the selection when
    /// the deleted node was selected.
    pub fn delete_node(&mut self, node_id: &str) -> bool {
        let deleted = self.graph.delete_node(node_id);
        if deleted {
            if self.selection.as_deref() == Some(node_id) {
                self.selection = None;
            }
            self.emit_graph_changed();
        }
        deleted
    }

    /// Apply a resize result.
    pub fn resize_node(&mut self, node_id: &str, width: f64, height: f64) -> bool {
        let updated = self.graph.update_node_size(node_id, width, height);
        if updated {
            self.emit_graph_changed();
        }
        updated
    }

    /// Merge an attribute patch into a node.
    pub fn patch_node(&mut self, node_id: &str, patch: AttrMap) -> bool {
        let updated = self.graph.update_node_attributes(node_id, patch);
        if updated {
            self.emit_graph_changed();
        }
        updated
    }

    // -----------------------------------------------------------------
    // Run triggers
    // -----------------------------------------------------------------

    /// "Run Flow": simulate execution over the current graph.
    /// `Ok(None)` when a run is already in flight.
    pub async fn run_flow(&self) -> Result<Option<ExecutionReport>> {
        self.executor.run(&self.graph).await
    }

    /// "Run Website": generate the document bundle for the current
    /// graph with the given theme. `Ok(None)` when a generation is
    /// already in flight.
    pub async fn run_website(&self, theme: SiteTheme) -> Result<Option<GeneratedSite>> {
        self.generator
            .generate(self.flow_id.as_ref(), &self.graph, theme)
            .await
    }

    fn emit_graph_changed(&self) {
        let _ = self.events.send(FlowEvent::GraphChanged {
            flow_id: self.flow_id.clone(),
        });
    }
}
