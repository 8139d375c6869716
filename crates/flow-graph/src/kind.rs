//! Node kind taxonomy
//!
//! Every node carries a kind that drives both execution dispatch and
//! website classification. Kinds arrive from the canvas as display
//! labels ("API Call", "UI Component", ...); unknown labels are kept
//! verbatim as [`NodeKind::Custom`] so palettes can grow without a
//! schema migration.

use serde::{Deserialize, Serialize};

/// The behavioral classification of a node.
///
/// Serialized as its display label, so graph snapshots stay readable
/// and round-trip labels the model does not know about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    /// Simulated HTTP call
    ApiCall,
    /// Simulated query execution
    Database,
    /// Boolean branch decision
    Logic,
    /// Conditional branch (alias of Logic in behavior)
    Condition,
    /// Repeated execution with an iteration count
    Loop,
    /// Data shaping step
    Transform,
    /// User-defined function step
    Function,
    /// Long-running background worker
    Service,
    /// A website page
    Page,
    /// A reusable UI building block
    UiComponent,
    /// Call-to-action element
    Button,
    /// Input form
    Form,
    /// Static content block
    Display,
    /// Chart placeholder
    Chart,
    /// Tabular data placeholder
    Table,
    /// Visual container, excluded from execution and classification
    Group,
    /// Any label the model does not know about
    Custom(String),
}

impl NodeKind {
    /// The display label, as shown on the canvas and stored in snapshots.
    pub fn label(&self) -> &str {
        match self {
            NodeKind::ApiCall => "API Call",
            NodeKind::Database => "Database",
            NodeKind::Logic => "Logic",
            NodeKind::Condition => "Condition",
            NodeKind::Loop => "Loop",
            NodeKind::Transform => "Transform",
            NodeKind::Function => "Function",
            NodeKind::Service => "Service",
            NodeKind::Page => "Page",
            NodeKind::UiComponent => "UI Component",
            NodeKind::Button => "Button",
            NodeKind::Form => "Form",
            NodeKind::Display => "Display",
            NodeKind::Chart => "Chart",
            NodeKind::Table => "Table",
            NodeKind::Group => "Group",
            NodeKind::Custom(label) => label,
        }
    }

    /// Snake-case tag used in simulated execution results.
    pub fn slug(&self) -> String {
        self.label().to_lowercase().replace(' ', "_")
    }

    /// Whether nodes of this kind become pages in a generated website.
    ///
    /// The page and service allow-lists are disjoint; `Group` and
    /// `Custom` kinds belong to neither.
    pub fn is_page_capable(&self) -> bool {
        matches!(
            self,
            NodeKind::Page
                | NodeKind::UiComponent
                | NodeKind::Button
                | NodeKind::Form
                | NodeKind::Display
                | NodeKind::Chart
                | NodeKind::Table
        )
    }

    /// Whether nodes of this kind are simulated as background services
    /// during website generation.
    pub fn is_service_capable(&self) -> bool {
        matches!(
            self,
            NodeKind::Service
                | NodeKind::ApiCall
                | NodeKind::Database
                | NodeKind::Logic
                | NodeKind::Transform
                | NodeKind::Function
        )
    }
}

impl From<String> for NodeKind {
    fn from(label: String) -> Self {
        match label.as_str() {
            "API Call" => NodeKind::ApiCall,
            "Database" => NodeKind::Database,
            "Logic" => NodeKind::Logic,
            "Condition" => NodeKind::Condition,
            "Loop" => NodeKind::Loop,
            "Transform" => NodeKind::Transform,
            "Function" => NodeKind::Function,
            "Service" => NodeKind::Service,
            "Page" => NodeKind::Page,
            "UI Component" => NodeKind::UiComponent,
            "Button" => NodeKind::Button,
            "Form" => NodeKind::Form,
            "Display" => NodeKind::Display,
            "Chart" => NodeKind::Chart,
            "Table" => NodeKind::Table,
            "Group" => NodeKind::Group,
            _ => NodeKind::Custom(label),
        }
    }
}

impl From<&str> for NodeKind {
    fn from(label: &str) -> Self {
        NodeKind::from(label.to_string())
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.label().to_string()
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_roundtrip() {
        let kinds = [
            NodeKind::ApiCall,
            NodeKind::UiComponent,
            NodeKind::Group,
            NodeKind::Custom("Webhook".to_string()),
        ];
        for kind in kinds {
            let label = kind.label().to_string();
            assert_eq!(NodeKind::from(label), kind);
        }
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&NodeKind::UiComponent).unwrap();
        assert_eq!(json, "\"UI Component\"");

        let kind: NodeKind = serde_json::from_str("\"API Call\"").unwrap();
        assert_eq!(kind, NodeKind::ApiCall);

        let kind: NodeKind = serde_json::from_str("\"Webhook\"").unwrap();
        assert_eq!(kind, NodeKind::Custom("Webhook".to_string()));
    }

    #[test]
    fn test_classification_is_disjoint() {
        let all = [
            NodeKind::ApiCall,
            NodeKind::Database,
            NodeKind::Logic,
            NodeKind::Condition,
            NodeKind::Loop,
            NodeKind::Transform,
            NodeKind::Function,
            NodeKind::Service,
            NodeKind::Page,
            NodeKind::UiComponent,
            NodeKind::Button,
            NodeKind::Form,
            NodeKind::Display,
            NodeKind::Chart,
            NodeKind::Table,
            NodeKind::Group,
            NodeKind::Custom("Webhook".to_string()),
        ];
        for kind in &all {
            assert!(
                !(kind.is_page_capable() && kind.is_service_capable()),
                "{kind} is in both allow-lists"
            );
        }
        assert!(!NodeKind::Group.is_page_capable());
        assert!(!NodeKind::Group.is_service_capable());
    }

    #[test]
    fn test_slug() {
        assert_eq!(NodeKind::ApiCall.slug(), "api_call");
        assert_eq!(NodeKind::UiComponent.slug(), "ui_component");
        assert_eq!(NodeKind::Custom("Edge Worker".to_string()).slug(), "edge_worker");
    }
}
