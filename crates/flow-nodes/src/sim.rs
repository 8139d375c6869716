//! Simulated per-kind node execution
//!
//! Nothing here does real work: each kind maps to a canned result shape
//! with randomized timing, used by the execution engine to produce a
//! step trace and by the site engine's background service pass. Where a
//! kind can fail, the failure probability is 10%; failures are recorded
//! outcomes, not errors.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use flow_graph::{FlowNode, NodeKind};

/// Probability that a fallible kind succeeds.
const SUCCESS_PROBABILITY: f64 = 0.9;

/// Bounds of the randomized reported execution time, in milliseconds.
const EXECUTION_TIME_MS: std::ops::RangeInclusive<u64> = 200..=1000;

/// Terminal status of one simulated execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    Failed,
}

/// The canned result of simulating one node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeOutcome {
    /// Kind tag, e.g. "api_call"
    #[serde(rename = "type")]
    pub result_type: String,
    pub status: OutcomeStatus,
    /// Kind-specific payload
    pub data: serde_json::Value,
    /// Failure message when status is Failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Simulated duration; reported, never actually slept
    pub execution_time_ms: u64,
}

impl NodeOutcome {
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    fn success(result_type: impl Into<String>, data: serde_json::Value, time_ms: u64) -> Self {
        Self {
            result_type: result_type.into(),
            status: OutcomeStatus::Success,
            data,
            error: None,
            execution_time_ms: time_ms,
        }
    }

    fn failure(
        result_type: impl Into<String>,
        error: impl Into<String>,
        data: serde_json::Value,
        time_ms: u64,
    ) -> Self {
        Self {
            result_type: result_type.into(),
            status: OutcomeStatus::Failed,
            data,
            error: Some(error.into()),
            execution_time_ms: time_ms,
        }
    }
}

/// Simulates node execution with a private RNG.
///
/// `new()` seeds from the OS; `seeded()` gives deterministic sequences
/// for tests.
pub struct Simulator {
    rng: StdRng,
}

impl Simulator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Simulate one node and return its canned outcome.
    ///
    /// Group nodes are filtered out by the engines before dispatch;
    /// simulating one anyway yields a zero-cost skipped outcome.
    pub fn simulate(&mut self, node: &FlowNode) -> NodeOutcome {
        let slug = node.kind.slug();
        let time_ms = self.rng.random_range(EXECUTION_TIME_MS);

        let outcome = match &node.kind {
            NodeKind::ApiCall => self.simulate_api_call(node, time_ms),
            NodeKind::Database => self.simulate_database(time_ms),
            NodeKind::Logic | NodeKind::Condition => {
                let branch = self.rng.random_bool(0.5);
                NodeOutcome::success(
                    slug,
                    serde_json::json!({ "branch": if branch { "true" } else { "false" } }),
                    time_ms,
                )
            }
            NodeKind::Loop => self.simulate_loop(slug),
            NodeKind::Transform => {
                let fields_mapped = self.random_count(1, 12);
                self.fallible(
                    slug,
                    serde_json::json!({ "fieldsMapped": fields_mapped }),
                    "Transform failed: incompatible shape",
                    time_ms,
                )
            }
            NodeKind::Function => self.fallible(
                slug,
                serde_json::json!({ "returnValue": null, "invocations": 1 }),
                "Function raised an exception",
                time_ms,
            ),
            NodeKind::Service => self.fallible(
                slug,
                serde_json::json!({ "state": "dispatched" }),
                "Service did not acknowledge",
                time_ms,
            ),
            NodeKind::Page
            | NodeKind::UiComponent
            | NodeKind::Button
            | NodeKind::Form
            | NodeKind::Display
            | NodeKind::Chart
            | NodeKind::Table => NodeOutcome::success(
                slug.clone(),
                serde_json::json!({ "rendered": true, "element": slug }),
                time_ms,
            ),
            NodeKind::Group => NodeOutcome::success(
                slug,
                serde_json::json!({ "skipped": true }),
                0,
            ),
            NodeKind::Custom(_) => self.fallible(
                slug,
                serde_json::json!({ "message": "Step completed" }),
                "Step failed",
                time_ms,
            ),
        };

        log::debug!(
            "simulate: {} ({}) -> {:?} in {}ms",
            node.id,
            node.kind.label(),
            outcome.status,
            outcome.execution_time_ms
        );
        outcome
    }

    fn simulate_api_call(&mut self, node: &FlowNode, time_ms: u64) -> NodeOutcome {
        let url = node
            .attributes
            .get("url")
            .and_then(|v| v.as_str())
            .unwrap_or("https://api.example.com/data")
            .to_string();
        let method = node
            .attributes
            .get("method")
            .and_then(|v| v.as_str())
            .unwrap_or("GET")
            .to_string();

        if self.rng.random_bool(SUCCESS_PROBABILITY) {
            NodeOutcome::success(
                "api_call",
                serde_json::json!({
                    "statusCode": 200,
                    "url": url,
                    "method": method,
                    "response": { "message": "OK" },
                }),
                time_ms,
            )
        } else {
            NodeOutcome::failure(
                "api_call",
                "Request timed out",
                serde_json::json!({ "url": url, "method": method }),
                time_ms,
            )
        }
    }

    fn simulate_database(&mut self, time_ms: u64) -> NodeOutcome {
        if self.rng.random_bool(SUCCESS_PROBABILITY) {
            let rows = self.rng.random_range(1..=250);
            NodeOutcome::success(
                "database",
                serde_json::json!({ "rowsAffected": rows, "queryTimeMs": time_ms }),
                time_ms,
            )
        } else {
            NodeOutcome::failure(
                "database",
                "Query failed: connection reset",
                serde_json::json!({}),
                time_ms,
            )
        }
    }

    /// Loop execution time scales with the drawn iteration count.
    fn simulate_loop(&mut self, slug: String) -> NodeOutcome {
        let iterations: u64 = self.rng.random_range(1..=5);
        let per_iteration: u64 = self.rng.random_range(100..=250);
        NodeOutcome::success(
            slug,
            serde_json::json!({ "iterations": iterations }),
            iterations * per_iteration,
        )
    }

    fn fallible(
        &mut self,
        slug: String,
        data: serde_json::Value,
        error: &str,
        time_ms: u64,
    ) -> NodeOutcome {
        if self.rng.random_bool(SUCCESS_PROBABILITY) {
            NodeOutcome::success(slug, data, time_ms)
        } else {
            NodeOutcome::failure(slug, error, serde_json::json!({}), time_ms)
        }
    }

    fn random_count(&mut self, low: u64, high: u64) -> u64 {
        self.rng.random_range(low..=high)
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}
