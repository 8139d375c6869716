//! Flow execution engine
//!
//! Walks the graph depth-first from its root nodes, simulating each
//! node and collecting an ordered step trace. Execution is dramatized:
//! a fixed pacing delay between nodes gives the canvas time to show
//! the live highlight; the per-node "execution time" in the trace is
//! randomized and reported, never slept.
//!
//! A naive recursive walk would never terminate on a cyclic graph;
//! the engine keeps a per-run visited set and treats revisiting a node
//! as a no-op.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use flow_graph::{FlowGraph, NodeId};
use flow_nodes::{NodeOutcome, Simulator};

use crate::error::{EngineError, Result};
use crate::events::{EventSink, FlowEvent};

/// Pacing delay between node visits unless overridden.
const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(400);

/// One entry of the execution trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStep {
    pub node_id: NodeId,
    pub node_name: String,
    pub result: NodeOutcome,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate numbers for a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_steps: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_time_ms: u64,
    pub average_time_ms: u64,
}

/// The full result of one flow run: the ordered trace plus summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub execution_id: String,
    pub steps: Vec<ExecutionStep>,
    pub summary: ReportSummary,
}

/// Depth-first simulated execution over a flow graph.
///
/// The engine only reads the graph; a run holds no locks on it beyond
/// the borrow. One run at a time: triggering a run while one is in
/// flight is a no-op.
pub struct FlowExecutor {
    events: Arc<dyn EventSink>,
    simulator: Mutex<Simulator>,
    step_delay: Duration,
    running: AtomicBool,
}

impl FlowExecutor {
    pub fn new(events: Arc<dyn EventSink>) -> Self {
        Self {
            events,
            simulator: Mutex::new(Simulator::new()),
            step_delay: DEFAULT_STEP_DELAY,
            running: AtomicBool::new(false),
        }
    }

    /// Override the pacing delay (tests use zero).
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    /// Use a deterministic simulator seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.simulator = Mutex::new(Simulator::seeded(seed));
        self
    }

    /// Whether a run is currently in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run the flow. Returns `Ok(None)` when a run is already in
    /// flight (the re-entrant trigger is a no-op).
    ///
    /// Whatever the outcome (success, simulated failures, or an
    /// internal fault), the engine resets to idle and clears the live
    /// highlight before returning.
    pub async fn run(&self, graph: &FlowGraph) -> Result<Option<ExecutionReport>> {
        if self.running.swap(true, Ordering::SeqCst) {
            log::debug!("run ignored: execution already in flight");
            return Ok(None);
        }

        let execution_id = format!("exec-{}", Uuid::new_v4());
        log::info!("flow run {} started", execution_id);
        let _ = self.events.send(FlowEvent::ExecutionStarted {
            execution_id: execution_id.clone(),
        });

        let result = self.run_inner(graph).await;

        // Hard postcondition: idle again, highlight cleared
        self.running.store(false, Ordering::SeqCst);
        let _ = self
            .events
            .send(FlowEvent::ExecutingNodeChanged { node_id: None });

        match result {
            Ok(steps) => {
                let summary = summarize(&steps);
                log::info!(
                    "flow run {} completed: {}/{} steps succeeded",
                    execution_id,
                    summary.succeeded,
                    summary.total_steps
                );
                let _ = self.events.send(FlowEvent::ExecutionCompleted {
                    execution_id: execution_id.clone(),
                    summary: summary.clone(),
                });
                Ok(Some(ExecutionReport {
                    execution_id,
                    steps,
                    summary,
                }))
            }
            Err(err) => {
                log::warn!("flow run {} failed: {}", execution_id, err);
                let _ = self.events.send(FlowEvent::ExecutionFailed {
                    execution_id,
                    error: err.to_string(),
                });
                Err(err)
            }
        }
    }

    async fn run_inner(&self, graph: &FlowGraph) -> Result<Vec<ExecutionStep>> {
        // Group containers take no part in execution: edges touching
        // them are invisible to the adjacency list and to root
        // discovery.
        let group_ids: HashSet<&str> = graph
            .nodes
            .iter()
            .filter(|n| n.is_group)
            .map(|n| n.id.as_str())
            .collect();

        let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
        let mut has_inbound: HashSet<&str> = HashSet::new();
        for edge in &graph.edges {
            if group_ids.contains(edge.source.as_str()) || group_ids.contains(edge.target.as_str())
            {
                continue;
            }
            adjacency
                .entry(edge.source.clone())
                .or_default()
                .push(edge.target.clone());
            has_inbound.insert(edge.target.as_str());
        }

        let roots: Vec<String> = graph
            .non_group_nodes()
            .filter(|n| !has_inbound.contains(n.id.as_str()))
            .map(|n| n.id.clone())
            .collect();
        if roots.is_empty() {
            return Err(EngineError::NoEntryPoint);
        }

        let mut visited: HashSet<String> = HashSet::new();
        let mut trace: Vec<ExecutionStep> = Vec::new();
        for root in &roots {
            self.visit(graph, &adjacency, root, &mut visited, &mut trace)
                .await?;
        }
        Ok(trace)
    }

    /// Pre-order depth-first visit: simulate the node, then recurse
    /// into its successors in edge order. Revisits are no-ops.
    fn visit<'a>(
        &'a self,
        graph: &'a FlowGraph,
        adjacency: &'a HashMap<String, Vec<String>>,
        node_id: &'a str,
        visited: &'a mut HashSet<String>,
        trace: &'a mut Vec<ExecutionStep>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            if !visited.insert(node_id.to_string()) {
                return Ok(());
            }

            let node = graph
                .find_node(node_id)
                .ok_or_else(|| EngineError::MissingNode(node_id.to_string()))?;
            if node.is_group {
                return Ok(());
            }

            let _ = self.events.send(FlowEvent::ExecutingNodeChanged {
                node_id: Some(node.id.clone()),
            });

            let outcome = self.simulator.lock().simulate(node);
            trace.push(ExecutionStep {
                node_id: node.id.clone(),
                node_name: node.display_name().to_string(),
                result: outcome.clone(),
                timestamp: Utc::now(),
            });
            let _ = self.events.send(FlowEvent::NodeCompleted {
                node_id: node.id.clone(),
                outcome,
            });

            if !self.step_delay.is_zero() {
                tokio::time::sleep(self.step_delay).await;
            }

            if let Some(successors) = adjacency.get(node_id) {
                for next in successors {
                    self.visit(graph, adjacency, next, visited, trace).await?;
                }
            }
            Ok(())
        })
    }
}

fn summarize(steps: &[ExecutionStep]) -> ReportSummary {
    let succeeded = steps.iter().filter(|s| s.result.is_success()).count();
    let total_time_ms: u64 = steps.iter().map(|s| s.result.execution_time_ms).sum();
    let average_time_ms = if steps.is_empty() {
        0
    } else {
        total_time_ms / steps.len() as u64
    };
    ReportSummary {
        total_steps: steps.len(),
        succeeded,
        failed: steps.len() - succeeded,
        total_time_ms,
        average_time_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{NullEventSink, VecEventSink};
    use flow_graph::{GraphBuilder, NodeKind};

    fn make_executor() -> FlowExecutor {
        FlowExecutor::new(Arc::new(NullEventSink))
            .with_step_delay(Duration::ZERO)
            .with_seed(7)
    }

    fn trace_ids(report: &ExecutionReport) -> Vec<&str> {
        report.steps.iter().map(|s| s.node_id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_linear_flow_trace() {
        let graph = GraphBuilder::new()
            .node("a", NodeKind::ApiCall, (0.0, 0.0))
            .node("b", NodeKind::UiComponent, (200.0, 0.0))
            .edge("a", "b")
            .build();

        let report = make_executor().run(&graph).await.unwrap().unwrap();
        assert_eq!(trace_ids(&report), vec!["a", "b"]);
        assert_eq!(report.steps[0].result.result_type, "api_call");
        assert_eq!(report.summary.total_steps, 2);
    }

    #[tokio::test]
    async fn test_no_entry_point_on_group_only_graph() {
        let graph = GraphBuilder::new().group("g", (0.0, 0.0)).build();

        let executor = make_executor();
        let err = executor.run(&graph).await.unwrap_err();
        assert!(matches!(err, EngineError::NoEntryPoint));
        assert!(!executor.is_running());
    }

    #[tokio::test]
    async fn test_preorder_branch_order() {
        // a -> b -> d, a -> c: the b subtree completes before c starts
        let graph = GraphBuilder::new()
            .node("a", NodeKind::ApiCall, (0.0, 0.0))
            .node("b", NodeKind::Logic, (100.0, -50.0))
            .node("c", NodeKind::Database, (100.0, 50.0))
            .node("d", NodeKind::Display, (200.0, -50.0))
            .edge("a", "b")
            .edge("a", "c")
            .edge("b", "d")
            .build();

        let report = make_executor().run(&graph).await.unwrap().unwrap();
        assert_eq!(trace_ids(&report), vec!["a", "b", "d", "c"]);
    }

    #[tokio::test]
    async fn test_diamond_visits_shared_node_once() {
        let graph = GraphBuilder::new()
            .node("a", NodeKind::ApiCall, (0.0, 0.0))
            .node("b", NodeKind::Logic, (100.0, -50.0))
            .node("c", NodeKind::Logic, (100.0, 50.0))
            .node("d", NodeKind::Display, (200.0, 0.0))
            .edge("a", "b")
            .edge("a", "c")
            .edge("b", "d")
            .edge("c", "d")
            .build();

        let report = make_executor().run(&graph).await.unwrap().unwrap();
        assert_eq!(trace_ids(&report), vec!["a", "b", "d", "c"]);
    }

    #[tokio::test]
    async fn test_cycle_terminates() {
        // r -> a -> b -> a: the back edge is a no-op revisit
        let graph = GraphBuilder::new()
            .node("r", NodeKind::ApiCall, (0.0, 0.0))
            .node("a", NodeKind::Logic, (100.0, 0.0))
            .node("b", NodeKind::Logic, (200.0, 0.0))
            .edge("r", "a")
            .edge("a", "b")
            .edge("b", "a")
            .build();

        let report = make_executor().run(&graph).await.unwrap().unwrap();
        assert_eq!(trace_ids(&report), vec!["r", "a", "b"]);
    }

    #[tokio::test]
    async fn test_group_successors_are_skipped() {
        let graph = GraphBuilder::new()
            .node("a", NodeKind::ApiCall, (0.0, 0.0))
            .group("g", (100.0, 0.0))
            .node("b", NodeKind::Database, (0.0, 100.0))
            .edge("a", "g")
            .build();

        let report = make_executor().run(&graph).await.unwrap().unwrap();
        // "b" is disconnected but still a root; "g" never executes
        assert_eq!(trace_ids(&report), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_dangling_edge_aborts_and_resets() {
        let graph = GraphBuilder::new()
            .node("a", NodeKind::ApiCall, (0.0, 0.0))
            .edge("a", "ghost")
            .build();

        let sink = Arc::new(VecEventSink::new());
        let executor = FlowExecutor::new(sink.clone())
            .with_step_delay(Duration::ZERO)
            .with_seed(1);

        let err = executor.run(&graph).await.unwrap_err();
        assert!(matches!(err, EngineError::MissingNode(ref id) if id == "ghost"));
        assert!(!executor.is_running());

        let events = sink.events();
        assert!(matches!(
            events.last(),
            Some(FlowEvent::ExecutionFailed { .. })
        ));
        // The highlight was cleared before the failure was reported
        assert!(matches!(
            events[events.len() - 2],
            FlowEvent::ExecutingNodeChanged { node_id: None }
        ));
    }

    #[tokio::test]
    async fn test_simulated_failure_does_not_stop_traversal() {
        // With enough downstream nodes some will fail on this seed;
        // the trace still covers every reachable node.
        let graph = GraphBuilder::new()
            .node("a", NodeKind::ApiCall, (0.0, 0.0))
            .node("b", NodeKind::ApiCall, (100.0, 0.0))
            .node("c", NodeKind::ApiCall, (200.0, 0.0))
            .node("d", NodeKind::ApiCall, (300.0, 0.0))
            .edge("a", "b")
            .edge("b", "c")
            .edge("c", "d")
            .build();

        let mut failures = 0;
        for seed in 0..40 {
            let executor = FlowExecutor::new(Arc::new(NullEventSink))
                .with_step_delay(Duration::ZERO)
                .with_seed(seed);
            let report = executor.run(&graph).await.unwrap().unwrap();
            assert_eq!(report.steps.len(), 4, "trace must cover all nodes");
            failures += report.summary.failed;
        }
        assert!(failures > 0, "expected at least one simulated failure");
    }

    #[tokio::test]
    async fn test_reentrant_run_is_noop() {
        let graph = GraphBuilder::new()
            .node("a", NodeKind::ApiCall, (0.0, 0.0))
            .build();

        let executor = FlowExecutor::new(Arc::new(NullEventSink))
            .with_step_delay(Duration::from_millis(30))
            .with_seed(3);

        let (first, second) = tokio::join!(executor.run(&graph), executor.run(&graph));
        assert!(first.unwrap().is_some());
        assert!(second.unwrap().is_none());
        assert!(!executor.is_running());
    }

    #[tokio::test]
    async fn test_events_follow_trace_order() {
        let graph = GraphBuilder::new()
            .node("a", NodeKind::ApiCall, (0.0, 0.0))
            .node("b", NodeKind::Database, (100.0, 0.0))
            .edge("a", "b")
            .build();

        let sink = Arc::new(VecEventSink::new());
        let executor = FlowExecutor::new(sink.clone())
            .with_step_delay(Duration::ZERO)
            .with_seed(9);
        executor.run(&graph).await.unwrap();

        let highlighted: Vec<String> = sink
            .events()
            .iter()
            .filter_map(|e| match e {
                FlowEvent::ExecutingNodeChanged {
                    node_id: Some(id), ..
                } => Some(id.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(highlighted, vec!["a", "b"]);
        assert!(matches!(
            sink.events().last(),
            Some(FlowEvent::ExecutionCompleted { .. })
        ));
    }
}
