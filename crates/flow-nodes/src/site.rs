//! Page templates for generated websites
//!
//! Each page-capable kind maps to a content template; every rendered
//! document is self-contained (inline styles, embedded client-side
//! navigation). The site engine composes these into a document table
//! plus an index page that seeds the in-memory page lookup.

use std::collections::HashMap;

use thiserror::Error;

use flow_graph::{FlowNode, NodeKind};

/// A page failed to render; the site engine substitutes a fallback
/// document for that node only.
#[derive(Debug, Error)]
pub enum PageRenderError {
    /// An attribute that must be numeric could not be parsed
    #[error("Invalid value for attribute '{key}': {value}")]
    InvalidAttribute { key: String, value: String },
}

/// Named visual theme for a generated site.
///
/// Theme identity only affects presentation; the navigation structure
/// and document table are theme-independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SiteTheme {
    #[default]
    Modern,
    Classic,
    Creative,
    Minimal,
    Dark,
}

impl SiteTheme {
    pub fn name(&self) -> &'static str {
        match self {
            SiteTheme::Modern => "modern",
            SiteTheme::Classic => "classic",
            SiteTheme::Creative => "creative",
            SiteTheme::Minimal => "minimal",
            SiteTheme::Dark => "dark",
        }
    }

    /// Resolve a template identifier from the fixed named set.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "modern" => Some(SiteTheme::Modern),
            "classic" => Some(SiteTheme::Classic),
            "creative" => Some(SiteTheme::Creative),
            "minimal" => Some(SiteTheme::Minimal),
            "dark" => Some(SiteTheme::Dark),
            _ => None,
        }
    }

    /// (background, surface, text, accent, font stack)
    fn palette(&self) -> (&'static str, &'static str, &'static str, &'static str, &'static str) {
        match self {
            SiteTheme::Modern => ("#f8fafc", "#ffffff", "#0f172a", "#2563eb", "system-ui, sans-serif"),
            SiteTheme::Classic => ("#fdf6e3", "#fffdf5", "#433422", "#8b5a2b", "Georgia, serif"),
            SiteTheme::Creative => ("#fdf2f8", "#ffffff", "#3b0764", "#db2777", "'Segoe UI', sans-serif"),
            SiteTheme::Minimal => ("#ffffff", "#fafafa", "#171717", "#525252", "Helvetica, Arial, sans-serif"),
            SiteTheme::Dark => ("#0f172a", "#1e293b", "#e2e8f0", "#38bdf8", "system-ui, sans-serif"),
        }
    }
}

/// A navigation destination: an outgoing edge to another page node.
#[derive(Debug, Clone)]
pub struct NavTarget {
    pub id: String,
    pub label: String,
}

/// Render one page node into a self-contained document.
///
/// Content is dispatched on the node's kind; unknown and generic kinds
/// get a placeholder telling the user the page is customizable. The
/// failure path is a malformed numeric attribute (width/height).
pub fn render_page(
    node: &FlowNode,
    nav: &[NavTarget],
    theme: SiteTheme,
) -> Result<String, PageRenderError> {
    let width = numeric_attribute(node, "width")?;
    let _ = numeric_attribute(node, "height")?;

    let name = escape_html(node.display_name());
    let content = match &node.kind {
        NodeKind::Button => {
            let text = string_attribute(node, "text").unwrap_or_else(|| "Get Started".to_string());
            format!(
                "<h1>{name}</h1>\n<a class=\"cta\" href=\"#\">{}</a>",
                escape_html(&text)
            )
        }
        NodeKind::Form => format!(
            "<h1>{name}</h1>\n<form onsubmit=\"return false\">\n\
             <label>Name <input type=\"text\" placeholder=\"Your name\"></label>\n\
             <label>Email <input type=\"email\" placeholder=\"you@example.com\"></label>\n\
             <button type=\"submit\">Submit</button>\n</form>"
        ),
        NodeKind::Display => {
            let text = string_attribute(node, "text")
                .unwrap_or_else(|| "Welcome to your generated page.".to_string());
            format!("<h1>{name}</h1>\n<p class=\"display\">{}</p>", escape_html(&text))
        }
        NodeKind::Chart => format!(
            "<h1>{name}</h1>\n<div class=\"chart\">\
             <span style=\"height:40%\"></span>\
             <span style=\"height:75%\"></span>\
             <span style=\"height:55%\"></span>\
             <span style=\"height:90%\"></span></div>"
        ),
        NodeKind::Table => format!(
            "<h1>{name}</h1>\n<table>\n<tr><th>Item</th><th>Value</th></tr>\n\
             <tr><td>Sample A</td><td>120</td></tr>\n\
             <tr><td>Sample B</td><td>87</td></tr>\n</table>"
        ),
        // Page, UI Component, and anything else page-capable: the
        // customizable placeholder
        _ => format!(
            "<h1>{name}</h1>\n<p class=\"placeholder\">This page has no content yet. \
             open it in the editor to customize it.</p>"
        ),
    };

    let nav_buttons: String = nav
        .iter()
        .map(|t| {
            format!(
                "<button class=\"nav\" onclick=\"loomflowNavigate('{}')\">{}</button>\n",
                escape_js_string(&t.id),
                escape_html(&t.label)
            )
        })
        .collect();

    let (background, surface, text_color, accent, font) = theme.palette();
    let max_width = width.unwrap_or(720.0);

    Ok(format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{name}</title>\n\
         <style>\n\
         body {{ margin: 0; background: {background}; color: {text_color}; font-family: {font}; }}\n\
         main {{ max-width: {max_width}px; margin: 3rem auto; padding: 2rem; background: {surface}; border-radius: 8px; }}\n\
         .cta, button {{ background: {accent}; color: #fff; border: 0; border-radius: 6px; padding: 0.6rem 1.2rem; text-decoration: none; display: inline-block; cursor: pointer; }}\n\
         nav {{ margin-top: 2rem; display: flex; gap: 0.5rem; }}\n\
         .chart {{ display: flex; align-items: flex-end; gap: 8px; height: 160px; }}\n\
         .chart span {{ flex: 1; background: {accent}; border-radius: 4px 4px 0 0; }}\n\
         table {{ border-collapse: collapse; }} td, th {{ border: 1px solid {text_color}33; padding: 0.4rem 0.8rem; }}\n\
         label {{ display: block; margin: 0.5rem 0; }}\n\
         </style>\n\
         <script>{nav_script}</script>\n\
         </head>\n<body>\n<main>\n{content}\n<nav>\n{nav_buttons}</nav>\n</main>\n</body>\n</html>\n",
        nav_script = NAVIGATION_SCRIPT,
    ))
}

/// Minimal substitute document used when a page fails to render.
pub fn fallback_page(node: &FlowNode) -> String {
    let name = escape_html(node.display_name());
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{name}</title>\n\
         <script>{NAVIGATION_SCRIPT}</script>\n</head>\n<body>\n\
         <main><h1>{name}</h1><p>This page could not be generated.</p></main>\n\
         </body>\n</html>\n"
    )
}

/// The index document: seeds the in-memory page table with every
/// generated document, then boots the entry page without a reload.
pub fn index_document(entry_id: &str, documents: &HashMap<String, String>) -> String {
    // `</` must not appear verbatim inside the inline script
    let table = serde_json::to_string(documents)
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/");

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Generated site</title>\n\
         <script>{NAVIGATION_SCRIPT}</script>\n\
         <script>\nwindow.__loomflowPages = {table};\nloomflowNavigate('{entry}');\n</script>\n\
         </head>\n<body></body>\n</html>\n",
        entry = escape_js_string(entry_id),
    )
}

/// Client-side router embedded in every document.
///
/// Looks the target page up in the shared in-memory table and swaps the
/// active document in place; when the table is unavailable (a document
/// saved and opened standalone), falls back to a fresh viewing context.
const NAVIGATION_SCRIPT: &str = "\
function loomflowNavigate(id) {\n\
  var pages = window.__loomflowPages;\n\
  if (pages && pages[id]) {\n\
    document.open();\n\
    document.write(pages[id]);\n\
    document.close();\n\
    window.__loomflowPages = pages;\n\
  } else {\n\
    window.open('', '_blank');\n\
  }\n\
}";

fn string_attribute(node: &FlowNode, key: &str) -> Option<String> {
    node.attributes
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Numeric attributes may arrive as numbers or numeric strings; any
/// other shape is the render failure path.
fn numeric_attribute(node: &FlowNode, key: &str) -> Result<Option<f64>, PageRenderError> {
    match node.attributes.get(key) {
        None => Ok(None),
        Some(serde_json::Value::Number(n)) => Ok(n.as_f64()),
        Some(serde_json::Value::String(s)) => match s.parse::<f64>() {
            Ok(v) => Ok(Some(v)),
            Err(_) => Err(PageRenderError::InvalidAttribute {
                key: key.to_string(),
                value: s.clone(),
            }),
        },
        Some(other) => Err(PageRenderError::InvalidAttribute {
            key: key.to_string(),
            value: other.to_string(),
        }),
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn escape_js_string(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_graph::{AttrMap, Position};

    fn make_page(id: &str, kind: NodeKind) -> FlowNode {
        FlowNode {
            id: id.to_string(),
            kind,
            position: Position::default(),
            attributes: AttrMap::new(),
            is_group: false,
        }
    }

    #[test]
    fn test_button_page_renders_cta() {
        let mut node = make_page("p1", NodeKind::Button);
        node.attributes
            .insert("text".to_string(), serde_json::json!("Sign up"));

        let html = render_page(&node, &[], SiteTheme::Modern).unwrap();
        assert!(html.contains("class=\"cta\""));
        assert!(html.contains("Sign up"));
        assert!(html.contains("loomflowNavigate"));
    }

    #[test]
    fn test_generic_page_renders_placeholder() {
        let node = make_page("p1", NodeKind::Page);
        let html = render_page(&node, &[], SiteTheme::Minimal).unwrap();
        assert!(html.contains("customize"));
    }

    #[test]
    fn test_nav_buttons_use_target_labels() {
        let node = make_page("p1", NodeKind::Page);
        let nav = vec![NavTarget {
            id: "p2".to_string(),
            label: "Contact".to_string(),
        }];
        let html = render_page(&node, &nav, SiteTheme::Dark).unwrap();
        assert!(html.contains("loomflowNavigate('p2')"));
        assert!(html.contains(">Contact</button>"));
    }

    #[test]
    fn test_malformed_width_fails_render() {
        let mut node = make_page("p1", NodeKind::Form);
        node.attributes
            .insert("width".to_string(), serde_json::json!("wide"));

        let err = render_page(&node, &[], SiteTheme::Classic).unwrap_err();
        assert!(matches!(err, PageRenderError::InvalidAttribute { ref key, .. } if key == "width"));
    }

    #[test]
    fn test_numeric_string_width_is_accepted() {
        let mut node = make_page("p1", NodeKind::Display);
        node.attributes
            .insert("width".to_string(), serde_json::json!("640"));
        assert!(render_page(&node, &[], SiteTheme::Modern).is_ok());
    }

    #[test]
    fn test_html_is_escaped() {
        let mut node = make_page("p1", NodeKind::Display);
        node.attributes
            .insert("label".to_string(), serde_json::json!("<script>alert(1)</script>"));

        let html = render_page(&node, &[], SiteTheme::Modern).unwrap();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_index_document_embeds_table_safely() {
        let mut documents = HashMap::new();
        documents.insert("p1".to_string(), "<html><script></script></html>".to_string());

        let index = index_document("p1", &documents);
        assert!(index.contains("window.__loomflowPages"));
        assert!(!index.contains("</script></html>"));
        assert!(index.contains("loomflowNavigate('p1')"));
    }

    #[test]
    fn test_theme_names_roundtrip() {
        for theme in [
            SiteTheme::Modern,
            SiteTheme::Classic,
            SiteTheme::Creative,
            SiteTheme::Minimal,
            SiteTheme::Dark,
        ] {
            assert_eq!(SiteTheme::from_name(theme.name()), Some(theme));
        }
        assert_eq!(SiteTheme::from_name("vaporwave"), None);
    }

    #[test]
    fn test_fallback_page_is_self_contained() {
        let node = make_page("p1", NodeKind::Chart);
        let html = fallback_page(&node);
        assert!(html.contains("could not be generated"));
        assert!(html.contains("loomflowNavigate"));
    }
}
