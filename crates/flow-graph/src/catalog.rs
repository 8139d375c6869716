//! Default presentation attributes per node kind
//!
//! When the canvas drops a fresh node, it gets an icon, a description,
//! and for group kinds a default container box. These are presentation
//! defaults only; nothing in the engines reads them back.

use crate::kind::NodeKind;
use crate::types::AttrMap;

/// Default width of a fresh group container.
pub const GROUP_DEFAULT_WIDTH: f64 = 300.0;
/// Default height of a fresh group container.
pub const GROUP_DEFAULT_HEIGHT: f64 = 200.0;

/// Icon name for a kind, matching the canvas icon set.
pub fn default_icon(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::ApiCall => "globe",
        NodeKind::Database => "database",
        NodeKind::Logic | NodeKind::Condition => "git-branch",
        NodeKind::Loop => "repeat",
        NodeKind::Transform => "shuffle",
        NodeKind::Function => "code",
        NodeKind::Service => "server",
        NodeKind::Page => "file",
        NodeKind::UiComponent => "layout",
        NodeKind::Button => "square",
        NodeKind::Form => "list",
        NodeKind::Display => "monitor",
        NodeKind::Chart => "bar-chart",
        NodeKind::Table => "table",
        NodeKind::Group => "folder",
        NodeKind::Custom(_) => "box",
    }
}

/// One-line description shown in the node body.
pub fn default_description(kind: &NodeKind) -> String {
    match kind {
        NodeKind::ApiCall => "Calls an external HTTP endpoint".to_string(),
        NodeKind::Database => "Runs a query against a data source".to_string(),
        NodeKind::Logic => "Branches on a boolean decision".to_string(),
        NodeKind::Condition => "Routes the flow on a condition".to_string(),
        NodeKind::Loop => "Repeats the downstream steps".to_string(),
        NodeKind::Transform => "Reshapes data between steps".to_string(),
        NodeKind::Function => "Runs a user-defined function".to_string(),
        NodeKind::Service => "Background worker".to_string(),
        NodeKind::Page => "A page of the generated website".to_string(),
        NodeKind::UiComponent => "Reusable interface block".to_string(),
        NodeKind::Button => "Call-to-action element".to_string(),
        NodeKind::Form => "Collects user input".to_string(),
        NodeKind::Display => "Static content block".to_string(),
        NodeKind::Chart => "Data visualization".to_string(),
        NodeKind::Table => "Tabular data".to_string(),
        NodeKind::Group => "Visual container".to_string(),
        NodeKind::Custom(label) => format!("{label} step"),
    }
}

/// The full default attribute map for a freshly created node.
pub fn default_attributes(kind: &NodeKind) -> AttrMap {
    let mut attrs = AttrMap::new();
    attrs.insert(
        "icon".to_string(),
        serde_json::Value::String(default_icon(kind).to_string()),
    );
    attrs.insert(
        "description".to_string(),
        serde_json::Value::String(default_description(kind)),
    );

    if matches!(kind, NodeKind::Group) {
        attrs.insert("width".to_string(), serde_json::json!(GROUP_DEFAULT_WIDTH));
        attrs.insert("height".to_string(), serde_json::json!(GROUP_DEFAULT_HEIGHT));
        attrs.insert(
            "background".to_string(),
            serde_json::Value::String("#f1f5f9".to_string()),
        );
        attrs.insert("opacity".to_string(), serde_json::json!(0.6));
    }

    attrs
}
