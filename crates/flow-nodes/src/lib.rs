//! Flow Nodes - per-kind behaviors for Loomflow
//!
//! Everything that varies by node kind lives here, behind exhaustive
//! enum dispatch:
//!
//! - Simulated execution: each kind maps to a canned, randomized result
//!   shape used for the run-flow trace and background service passes
//! - Page templates: each page-capable kind maps to a content template
//!   plus the embedded client-side navigation shared by every document
//!
//! The engines orchestrating these behaviors live in
//! `loomflow-site-service`; the graph model in `flow-graph`.

pub mod sim;
pub mod site;

// Re-export key types
pub use sim::{NodeOutcome, OutcomeStatus, Simulator};
pub use site::{
    fallback_page, index_document, render_page, NavTarget, PageRenderError, SiteTheme,
};
