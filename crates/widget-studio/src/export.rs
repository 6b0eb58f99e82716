//! Export of payloads as JSON files, static HTML pages and React snippets

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use widget_engine::render::{Component, RenderNode};
use widget_engine::types::Direction;
use widget_engine::{LayoutType, Renderer};

/// Errors that can occur while exporting
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Nothing to export: the payload has no renderable content")]
    Empty,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown export format: {0}")]
    UnknownFormat(String),
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Html,
    Component,
}

impl ExportFormat {
    pub fn from_name(name: &str) -> Result<Self, ExportError> {
        match name {
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            "component" | "react" | "tsx" => Ok(Self::Component),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Html => "html",
            Self::Component => "tsx",
        }
    }
}

/// Export a payload in the given format
pub fn export(payload: &Value, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Json => to_json_file(payload),
        ExportFormat::Html => to_html_file(payload),
        ExportFormat::Component => Ok(to_component_source(payload)?.into_bytes()),
    }
}

/// Pretty-printed JSON bytes
pub fn to_json_file(payload: &Value) -> Result<Vec<u8>, ExportError> {
    let mut bytes = serde_json::to_vec_pretty(payload)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// A standalone HTML page showing the rendered payload
pub fn to_html_file(payload: &Value) -> Result<Vec<u8>, ExportError> {
    let tree = Renderer::new().render(payload);
    let root = match tree.root.as_ref() {
        Some(RenderNode::Placeholder { .. }) | None => return Err(ExportError::Empty),
        Some(root) => root,
    };

    let mut body = String::new();
    write_node(&mut body, root, 2);

    let title = escape_html(&crate::storage::display_name(payload));
    let page = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"utf-8\">\n  \
         <title>{title}</title>\n  <style>\n{STYLE}  </style>\n</head>\n<body>\n{body}</body>\n</html>\n"
    );
    Ok(page.into_bytes())
}

const STYLE: &str = "    body { font-family: system-ui, sans-serif; background: #0f172a; color: #e2e8f0; padding: 24px; }
    .widget { background: #1e293b; border-radius: 12px; padding: 16px; }
    .widget h3 { margin: 0 0 8px; font-size: 1rem; }
    .widget p { margin: 4px 0; color: #cbd5e1; }
    .progress { height: 8px; background: #334155; border-radius: 4px; overflow: hidden; margin-top: 8px; }
    .progress > div { height: 100%; background: #22c55e; }
    .placeholder { border: 1px dashed #64748b; border-radius: 12px; padding: 16px; color: #94a3b8; }
";

fn write_node(out: &mut String, node: &RenderNode, indent: usize) {
    let pad = " ".repeat(indent);
    match node {
        RenderNode::Container {
            layout,
            direction,
            gap,
            columns,
            children,
        } => {
            let style = container_style(*layout, *direction, *gap, *columns);
            let _ = writeln!(out, "{pad}<div class=\"layout-{}\" style=\"{style}\">", layout.as_str());
            for child in children {
                write_node(out, child, indent + 2);
            }
            let _ = writeln!(out, "{pad}</div>");
        }
        RenderNode::Component(component) => write_component(out, component, indent),
        RenderNode::Placeholder { message, .. } => {
            let _ = writeln!(out, "{pad}<div class=\"placeholder\">{}</div>", escape_html(message));
        }
        RenderNode::Draggable { child, .. } => write_node(out, child, indent),
    }
}

fn container_style(layout: LayoutType, direction: Direction, gap: f64, columns: u8) -> String {
    match layout {
        LayoutType::Grid => format!(
            "display: grid; grid-template-columns: repeat({columns}, 1fr); gap: {gap}px;"
        ),
        LayoutType::Stack | LayoutType::Single => {
            let flex = match direction {
                Direction::Vertical => "column",
                Direction::Horizontal => "row",
            };
            format!("display: flex; flex-direction: {flex}; gap: {gap}px;")
        }
    }
}

fn write_component(out: &mut String, component: &Component, indent: usize) {
    let pad = " ".repeat(indent);
    let _ = writeln!(
        out,
        "{pad}<div class=\"widget widget-{}\">",
        component.kind.type_name()
    );
    let _ = writeln!(out, "{pad}  <h3>{}</h3>", escape_html(&component.heading));
    for line in &component.lines {
        let _ = writeln!(out, "{pad}  <p>{}</p>", escape_html(line));
    }
    if let Some(progress) = component.progress {
        let percent = (progress.clamp(0.0, 1.0) * 100.0).round();
        let _ = writeln!(
            out,
            "{pad}  <div class=\"progress\"><div style=\"width: {percent}%\"></div></div>"
        );
    }
    let _ = writeln!(out, "{pad}</div>");
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// React component source embedding the payload, for the clipboard
pub fn to_component_source(payload: &Value) -> Result<String, ExportError> {
    let json = serde_json::to_string_pretty(payload)?;
    let indented = json.replace('\n', "\n  ");
    Ok(format!(
        "import {{ WidgetRenderer }} from \"./WidgetRenderer\";\n\n\
         const payload = {indented} as const;\n\n\
         export default function {}() {{\n  return <WidgetRenderer payload={{payload}} />;\n}}\n",
        component_name(payload)
    ))
}

/// PascalCase component name derived from the payload's type
pub fn component_name(payload: &Value) -> String {
    let type_name = payload
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("widget");
    let mut name: String = type_name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, "Widget");
    }
    name.push_str("Widget");
    name
}

/// Suggested file name for an export
pub fn file_name(payload: &Value, format: ExportFormat) -> String {
    let stem = payload
        .get("type")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .unwrap_or("widget");
    format!("{}.{}", stem, format.extension())
}

/// Write an export to `dir`, returning the path written
pub async fn write_export(
    payload: &Value,
    format: ExportFormat,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let bytes = export(payload, format)?;
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name(payload, format));
    tokio::fs::write(&path, bytes).await?;
    log::info!("Exported {:?}", path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dashboard() -> Value {
        json!({
            "type": "grid",
            "columns": 2,
            "gap": 12,
            "widgets": [
                {"type": "stat-card", "props": {"label": "Resting <HR>", "value": 58, "unit": "bpm"}},
                {"type": "progress-ring", "props": {"label": "Steps", "value": 5000, "goal": 10000}}
            ]
        })
    }

    #[test]
    fn test_json_export_is_pretty() {
        let bytes = to_json_file(&dashboard()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\n  \"type\": \"grid\""));
        let reparsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(reparsed, dashboard());
    }

    #[test]
    fn test_html_export() {
        let html = String::from_utf8(to_html_file(&dashboard()).unwrap()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("grid-template-columns: repeat(2, 1fr)"));
        assert!(html.contains("Resting &lt;HR&gt;"));
        assert!(html.contains("width: 50%"));
    }

    #[test]
    fn test_html_export_of_unrenderable_root_is_empty() {
        assert!(matches!(to_html_file(&json!(null)), Err(ExportError::Empty)));
        assert!(matches!(
            to_html_file(&json!({"type": "mystery", "props": {}})),
            Err(ExportError::Empty)
        ));
        assert!(matches!(
            export(&json!([1, 2]), ExportFormat::Html),
            Err(ExportError::Empty)
        ));
    }

    #[test]
    fn test_html_export_keeps_nested_placeholders() {
        let payload = json!({"type": "stack", "widgets": [{"type": "mystery", "props": {}}]});
        let html = String::from_utf8(to_html_file(&payload).unwrap()).unwrap();
        assert!(html.contains("class=\"placeholder\""));
    }

    #[test]
    fn test_component_source() {
        let payload = json!({"type": "water-tracker", "props": {"consumed": 3, "goal": 8}});
        let source = to_component_source(&payload).unwrap();
        assert!(source.contains("export default function WaterTrackerWidget()"));
        assert!(source.contains("\"consumed\": 3"));
        assert!(source.contains("<WidgetRenderer payload={payload} />"));
    }

    #[test]
    fn test_file_names() {
        assert_eq!(file_name(&dashboard(), ExportFormat::Html), "grid.html");
        assert_eq!(file_name(&json!({}), ExportFormat::Component), "widget.tsx");
    }

    #[test]
    fn test_format_names() {
        assert_eq!(ExportFormat::from_name("react").unwrap(), ExportFormat::Component);
        assert!(matches!(
            ExportFormat::from_name("pdf"),
            Err(ExportError::UnknownFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_write_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_export(&dashboard(), ExportFormat::Json, dir.path())
            .await
            .unwrap();
        assert!(path.ends_with("grid.json"));
        assert!(tokio::fs::try_exists(&path).await.unwrap());
    }
}
