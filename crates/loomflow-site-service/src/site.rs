//! Website generation engine
//!
//! Projects the page-capable subgraph into a standalone multi-page
//! document bundle with client-side navigation, and fires off the
//! service-capable nodes as simulated background work. Generation is
//! read-only with respect to the graph.
//!
//! Failure domains differ deliberately from the execution engine: a
//! page that fails to render is replaced by a fallback document and
//! the batch continues; a service simulation that fails is recorded in
//! the results map and never surfaces.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use rand::Rng;

use flow_graph::{FlowGraph, FlowId, FlowNode, NodeId};
use flow_nodes::{
    fallback_page, index_document, render_page, NavTarget, NodeOutcome, SiteTheme, Simulator,
};

use crate::error::{EngineError, Result};
use crate::events::{EventSink, FlowEvent};

/// Randomized pre-simulation delay for background services, in ms.
const DEFAULT_SERVICE_DELAY_MS: (u64, u64) = (500, 2000);

/// One page node and its navigation targets.
#[derive(Debug, Clone)]
pub struct PageEntry {
    pub node: FlowNode,
    /// Page-capable targets of this node's outgoing edges, in edge
    /// order. Edges into non-page nodes are not navigation.
    pub connections: Vec<NodeId>,
}

/// The navigation structure: page-node id to entry.
///
/// Built fresh from the graph on every generation; never persisted.
pub type SiteStructure = HashMap<NodeId, PageEntry>;

/// Restrict the graph to page-capable nodes and their page-to-page
/// edges. Deterministic for a fixed graph.
pub fn site_structure(graph: &FlowGraph) -> SiteStructure {
    let page_ids: std::collections::HashSet<&str> = graph
        .nodes
        .iter()
        .filter(|n| n.is_page_capable())
        .map(|n| n.id.as_str())
        .collect();

    graph
        .nodes
        .iter()
        .filter(|n| n.is_page_capable())
        .map(|node| {
            let connections = graph
                .outgoing_edges(&node.id)
                .filter(|e| page_ids.contains(e.target.as_str()))
                .map(|e| e.target.clone())
                .collect();
            (
                node.id.clone(),
                PageEntry {
                    node: node.clone(),
                    connections,
                },
            )
        })
        .collect()
}

/// Pick the entry page: the first page-capable node (graph order) that
/// no other page links to; if every page has an inbound page link
/// (e.g., the pages form a cycle), fall back to the first page node.
pub fn entry_point(graph: &FlowGraph, structure: &SiteStructure) -> Option<NodeId> {
    let linked: std::collections::HashSet<&str> = structure
        .values()
        .flat_map(|entry| entry.connections.iter().map(|c| c.as_str()))
        .collect();

    let mut first_page = None;
    for node in &graph.nodes {
        if !structure.contains_key(&node.id) {
            continue;
        }
        if first_page.is_none() {
            first_page = Some(node.id.clone());
        }
        if !linked.contains(node.id.as_str()) {
            return Some(node.id.clone());
        }
    }
    first_page
}

/// Results of the fire-and-forget service pass.
///
/// Dispatch never blocks generation; `snapshot` reads whatever has
/// finished so far and `wait` joins every task first.
#[derive(Debug)]
pub struct ServiceBatch {
    results: Arc<RwLock<HashMap<NodeId, NodeOutcome>>>,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl ServiceBatch {
    fn empty() -> Self {
        Self {
            results: Arc::new(RwLock::new(HashMap::new())),
            handles: Vec::new(),
        }
    }

    /// Number of dispatched service simulations.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Results completed so far.
    pub fn snapshot(&self) -> HashMap<NodeId, NodeOutcome> {
        self.results.read().clone()
    }

    /// Wait for every dispatched service to finish, then return the
    /// full results map.
    pub async fn wait(self) -> HashMap<NodeId, NodeOutcome> {
        for handle in self.handles {
            let _ = handle.await;
        }
        let results = self.results.read().clone();
        results
    }
}

/// A generated website: the document table plus the index that seeds
/// the client-side page lookup and boots the entry page.
#[derive(Debug)]
pub struct GeneratedSite {
    pub entry_point: NodeId,
    pub theme: SiteTheme,
    /// Page-node id to self-contained document
    pub documents: HashMap<NodeId, String>,
    pub index: String,
    /// Background service simulations, already dispatched
    pub services: ServiceBatch,
}

/// Website generator over a flow graph.
pub struct SiteGenerator {
    events: Arc<dyn EventSink>,
    service_delay_ms: (u64, u64),
    seed: Option<u64>,
    running: AtomicBool,
}

impl SiteGenerator {
    pub fn new(events: Arc<dyn EventSink>) -> Self {
        Self {
            events,
            service_delay_ms: DEFAULT_SERVICE_DELAY_MS,
            seed: None,
            running: AtomicBool::new(false),
        }
    }

    /// Override the randomized service delay range (tests use zero).
    pub fn with_service_delay_ms(mut self, low: u64, high: u64) -> Self {
        self.service_delay_ms = (low, high);
        self
    }

    /// Use deterministic simulator seeds for service results.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Whether a generation is currently in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Generate the website. Returns `Ok(None)` when a generation is
    /// already in flight (the re-entrant trigger is a no-op).
    pub async fn generate(
        &self,
        flow_id: Option<&FlowId>,
        graph: &FlowGraph,
        theme: SiteTheme,
    ) -> Result<Option<GeneratedSite>> {
        if self.running.swap(true, Ordering::SeqCst) {
            log::debug!("generate ignored: generation already in flight");
            return Ok(None);
        }

        let result = self.generate_inner(graph, theme);
        self.running.store(false, Ordering::SeqCst);

        match result {
            Ok(site) => {
                log::info!(
                    "website generated: {} pages, {} services dispatched",
                    site.documents.len(),
                    site.services.len()
                );
                let _ = self.events.send(FlowEvent::SiteGenerated {
                    flow_id: flow_id.cloned(),
                    page_count: site.documents.len(),
                });
                Ok(Some(site))
            }
            Err(err) => {
                let _ = self.events.send(FlowEvent::SiteGenerationFailed {
                    flow_id: flow_id.cloned(),
                    error: err.to_string(),
                });
                Err(err)
            }
        }
    }

    fn generate_inner(&self, graph: &FlowGraph, theme: SiteTheme) -> Result<GeneratedSite> {
        let structure = site_structure(graph);
        if structure.is_empty() {
            return Err(EngineError::NoPageNodes);
        }
        let entry = entry_point(graph, &structure).ok_or(EngineError::NoPageNodes)?;

        // Dispatch background services first; page rendering does not
        // wait on them.
        let services = self.dispatch_services(graph);

        let mut documents = HashMap::new();
        for node in &graph.nodes {
            let Some(entry_for_node) = structure.get(&node.id) else {
                continue;
            };
            let nav: Vec<NavTarget> = entry_for_node
                .connections
                .iter()
                .filter_map(|target_id| {
                    structure.get(target_id).map(|target| NavTarget {
                        id: target_id.clone(),
                        label: target.node.display_name().to_string(),
                    })
                })
                .collect();

            let html = match render_page(node, &nav, theme) {
                Ok(html) => html,
                Err(err) => {
                    // Partial-failure isolation: this node only
                    log::warn!("page '{}' failed to render: {}", node.id, err);
                    fallback_page(node)
                }
            };
            documents.insert(node.id.clone(), html);
        }

        let index = index_document(&entry, &documents);
        Ok(GeneratedSite {
            entry_point: entry,
            theme,
            documents,
            index,
            services,
        })
    }

    /// Spawn one fire-and-forget simulation per service-capable node.
    ///
    /// No ordering guarantee across services or relative to page
    /// rendering; each task records its own outcome, failures
    /// included.
    fn dispatch_services(&self, graph: &FlowGraph) -> ServiceBatch {
        let mut batch = ServiceBatch::empty();

        for (index, node) in graph
            .nodes
            .iter()
            .filter(|n| n.is_service_capable())
            .enumerate()
        {
            let node = node.clone();
            let results = Arc::clone(&batch.results);
            let events = Arc::clone(&self.events);
            let (delay_low, delay_high) = self.service_delay_ms;
            let seed = self.seed.map(|s| s.wrapping_add(index as u64));

            batch.handles.push(tokio::spawn(async move {
                if delay_high > 0 {
                    let delay = rand::rng().random_range(delay_low..=delay_high);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }

                let mut simulator = match seed {
                    Some(seed) => Simulator::seeded(seed),
                    None => Simulator::new(),
                };
                let outcome = simulator.simulate(&node);
                let _ = events.send(FlowEvent::ServiceCompleted {
                    node_id: node.id.clone(),
                    status: outcome.status,
                });
                results.write().insert(node.id.clone(), outcome);
            }));
        }

        batch
    }
}
