//! Core types for widget payloads
//!
//! A payload is either a single widget or a layout whose `widgets` array
//! holds further widgets and layouts. The two are told apart purely
//! structurally: any object carrying a `widgets` array is a layout, even if
//! it also looks like a widget.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{defaults, limits};
use crate::error::{EngineError, Result};
use crate::props::WidgetProps;

/// Wire shape of a single widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetPayload {
    /// Catalog type name, e.g. `workout-card`
    #[serde(rename = "type")]
    pub widget_type: String,
    #[serde(default)]
    pub props: Map<String, Value>,
    /// Model reasoning attached by the generator, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,
}

impl WidgetPayload {
    pub fn new(widget_type: impl Into<String>, props: Map<String, Value>) -> Self {
        Self {
            widget_type: widget_type.into(),
            props,
            thought: None,
        }
    }

}

impl From<WidgetPayload> for Value {
    fn from(payload: WidgetPayload) -> Self {
        let mut object = Map::new();
        object.insert("type".to_string(), Value::String(payload.widget_type));
        object.insert("props".to_string(), Value::Object(payload.props));
        if let Some(thought) = payload.thought {
            object.insert("thought".to_string(), Value::String(thought));
        }
        Value::Object(object)
    }
}

/// Container arrangement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutType {
    #[default]
    Stack,
    Grid,
    Single,
}

impl LayoutType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "stack" => Some(Self::Stack),
            "grid" => Some(Self::Grid),
            "single" => Some(Self::Single),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stack => "stack",
            Self::Grid => "grid",
            Self::Single => "single",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Vertical,
    Horizontal,
}

/// A decoded layout node
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetLayout {
    pub layout_type: LayoutType,
    pub direction: Direction,
    pub gap: f64,
    pub columns: u8,
    pub widgets: Vec<PayloadNode>,
}

/// A decoded widget node
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetNode {
    pub props: WidgetProps,
    pub thought: Option<String>,
}

/// One node of a decoded payload tree
///
/// Decoding never fails: anything that cannot be understood becomes
/// `Invalid` with a reason, so the rest of the tree stays usable.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadNode {
    Layout(WidgetLayout),
    Widget(WidgetNode),
    Invalid { reason: String, raw: Value },
}

impl PayloadNode {
    /// Decode a parsed payload into a typed tree
    pub fn decode(value: &Value) -> Self {
        Self::decode_at(value, 0)
    }

    fn decode_at(value: &Value, depth: usize) -> Self {
        let Some(object) = value.as_object() else {
            return Self::invalid("Not a JSON object", value);
        };

        if is_layout_object(object) {
            if depth > limits::MAX_NESTING_DEPTH {
                return Self::invalid(
                    format!("Nested deeper than {} layouts", limits::MAX_NESTING_DEPTH),
                    value,
                );
            }
            return Self::Layout(decode_layout(object, depth));
        }

        let type_name = match object.get("type") {
            Some(Value::String(name)) if !name.trim().is_empty() => name.as_str(),
            _ => return Self::invalid("Widget has no type", value),
        };
        let Some(props) = object.get("props").filter(|p| p.is_object()) else {
            return Self::invalid(format!("Widget \"{}\" has no props", type_name), value);
        };

        match WidgetProps::decode(type_name, props) {
            Ok(props) => Self::Widget(WidgetNode {
                props,
                thought: object
                    .get("thought")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }),
            Err(e) => {
                log::debug!("Props of \"{}\" failed to decode: {}", type_name, e);
                Self::invalid(
                    format!(
                        "Widget \"{}\" has props of the wrong shape; see validation errors",
                        type_name
                    ),
                    value,
                )
            }
        }
    }

    fn invalid(reason: impl Into<String>, raw: &Value) -> Self {
        Self::Invalid {
            reason: reason.into(),
            raw: raw.clone(),
        }
    }

    /// Count widget leaves (recognized or not) in this subtree
    pub fn widget_count(&self) -> usize {
        match self {
            Self::Layout(layout) => layout.widgets.iter().map(Self::widget_count).sum(),
            Self::Widget(_) => 1,
            Self::Invalid { .. } => 0,
        }
    }
}

/// Layout type of a layout object; unknown or missing types act as `stack`
fn layout_type_of(object: &Map<String, Value>) -> LayoutType {
    object
        .get("type")
        .and_then(Value::as_str)
        .and_then(LayoutType::from_name)
        .unwrap_or_default()
}

fn decode_layout(object: &Map<String, Value>, depth: usize) -> WidgetLayout {
    let layout_type = layout_type_of(object);
    let direction = match object.get("direction").and_then(Value::as_str) {
        Some("horizontal") => Direction::Horizontal,
        _ => Direction::Vertical,
    };
    let gap = object
        .get("gap")
        .and_then(Value::as_f64)
        .filter(|g| *g >= 0.0)
        .unwrap_or(defaults::GAP);
    let columns = object
        .get("columns")
        .and_then(Value::as_u64)
        .map(|c| c.clamp(limits::MIN_COLUMNS, limits::MAX_COLUMNS) as u8)
        .unwrap_or(defaults::COLUMNS);
    let widgets = object
        .get("widgets")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| PayloadNode::decode_at(item, depth + 1))
                .collect()
        })
        .unwrap_or_default();

    WidgetLayout {
        layout_type,
        direction,
        gap,
        columns,
        widgets,
    }
}

/// The structural layout test: an object with a `widgets` array
pub fn is_layout_object(object: &Map<String, Value>) -> bool {
    matches!(object.get("widgets"), Some(Value::Array(_)))
}

/// The root layout's `widgets` array, if the payload is a layout
pub fn root_widgets(payload: &Value) -> Option<&Vec<Value>> {
    payload
        .as_object()
        .filter(|object| is_layout_object(object))
        .and_then(|object| object.get("widgets"))
        .and_then(Value::as_array)
}

/// The root `widgets` array when its children can be drag-reordered
///
/// Only root `stack` and `grid` layouts are reorderable; a `single` layout
/// shows just its first child, so reordering would swap what is shown.
pub fn reorderable_root_widgets(payload: &Value) -> Option<&Vec<Value>> {
    let object = payload.as_object()?;
    match layout_type_of(object) {
        LayoutType::Stack | LayoutType::Grid => root_widgets(payload),
        LayoutType::Single => None,
    }
}

/// Return a copy of a layout payload with its root `widgets` replaced
pub fn with_root_widgets(payload: &Value, widgets: Vec<Value>) -> Result<Value> {
    let mut object = payload
        .as_object()
        .filter(|object| is_layout_object(object))
        .cloned()
        .ok_or(EngineError::NotALayout)?;
    object.insert("widgets".to_string(), Value::Array(widgets));
    Ok(Value::Object(object))
}

/// Append a segment to a dot/bracket path
pub fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else if segment.starts_with('[') {
        format!("{}{}", prefix, segment)
    } else {
        format!("{}.{}", prefix, segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::WidgetKind;
    use serde_json::json;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "widgets[0]"), "widgets[0]");
        assert_eq!(join_path("widgets[0]", "props"), "widgets[0].props");
        assert_eq!(join_path("props.sets", "[2]"), "props.sets[2]");
    }

    #[test]
    fn test_decode_layout_tree() {
        let payload = json!({
            "type": "grid",
            "columns": 3,
            "gap": 8,
            "widgets": [
                {"type": "rest-timer", "props": {"seconds": 90}},
                {"type": "stack", "widgets": []},
                "junk"
            ]
        });
        let PayloadNode::Layout(layout) = PayloadNode::decode(&payload) else {
            panic!("expected layout");
        };
        assert_eq!(layout.layout_type, LayoutType::Grid);
        assert_eq!(layout.columns, 3);
        assert_eq!(layout.gap, 8.0);
        assert_eq!(layout.widgets.len(), 3);
        assert!(matches!(
            &layout.widgets[0],
            PayloadNode::Widget(w) if w.props.kind() == Some(WidgetKind::RestTimer)
        ));
        assert!(matches!(layout.widgets[1], PayloadNode::Layout(_)));
        assert!(matches!(layout.widgets[2], PayloadNode::Invalid { .. }));
    }

    #[test]
    fn test_decode_lenient_layout_defaults() {
        let payload = json!({"type": "carousel", "columns": 40, "gap": -1, "widgets": []});
        let PayloadNode::Layout(layout) = PayloadNode::decode(&payload) else {
            panic!("expected layout");
        };
        assert_eq!(layout.layout_type, LayoutType::Stack);
        assert_eq!(layout.columns, 12);
        assert_eq!(layout.gap, defaults::GAP);
    }

    #[test]
    fn test_decode_widget_without_props() {
        let node = PayloadNode::decode(&json!({"type": "insight"}));
        assert!(matches!(node, PayloadNode::Invalid { .. }));
    }

    #[test]
    fn test_widget_payload_serde() {
        let payload: WidgetPayload =
            serde_json::from_value(json!({"type": "insight", "props": {"title": "Hi"}})).unwrap();
        assert_eq!(payload.widget_type, "insight");
        assert!(payload.thought.is_none());
        let value = Value::from(payload.clone());
        assert!(value.get("thought").is_none());
        assert_eq!(serde_json::from_value::<WidgetPayload>(value).unwrap(), payload);
    }

    #[test]
    fn test_reorderable_root_widgets() {
        let widgets = json!([{"type": "a"}, {"type": "b"}]);
        for layout in ["stack", "grid", "carousel"] {
            let payload = json!({"type": layout, "widgets": widgets.clone()});
            assert_eq!(reorderable_root_widgets(&payload), widgets.as_array());
        }
        let single = json!({"type": "single", "widgets": widgets.clone()});
        assert!(root_widgets(&single).is_some());
        assert!(reorderable_root_widgets(&single).is_none());
        assert!(reorderable_root_widgets(&json!({"type": "insight", "props": {}})).is_none());
    }

    #[test]
    fn test_wrong_shape_reason_hides_decoder_text() {
        let node = PayloadNode::decode(&json!({"type": "rest-timer", "props": {"seconds": "ninety"}}));
        let PayloadNode::Invalid { reason, .. } = node else {
            panic!("expected invalid node");
        };
        assert_eq!(
            reason,
            "Widget \"rest-timer\" has props of the wrong shape; see validation errors"
        );
    }

    #[test]
    fn test_replace_root_widgets() {
        let payload = json!({"type": "stack", "gap": 4, "widgets": [1, 2]});
        let replaced = with_root_widgets(&payload, vec![json!(2), json!(1)]).unwrap();
        assert_eq!(replaced, json!({"type": "stack", "gap": 4, "widgets": [2, 1]}));
        assert!(with_root_widgets(&json!({"type": "insight"}), vec![]).is_err());
    }
}
