//! Payload validation against the widget catalog
//!
//! Classifies a parsed JSON value as a single widget or a layout, walks the
//! whole tree, and accumulates path-addressed errors and advisory warnings.
//! Validation never stops at the first problem and never fails: the result
//! is always a fresh [`ValidationResult`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog;
use crate::constants::limits::{MAX_COLUMNS, MAX_NESTING_DEPTH, MIN_COLUMNS};
use crate::types::{is_layout_object, join_path, LayoutType};

/// Machine-readable validation error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Root value is null
    InvalidPayload,
    /// A value has the wrong JSON type
    InvalidType,
    /// Widget or layout has no `type`
    MissingType,
    /// Widget has no `props` object
    MissingProps,
    /// Widget `props` is not an object
    InvalidProps,
    /// A required prop is missing or empty
    Required,
    /// A numeric prop or array length is out of bounds
    OutOfRange,
    /// A string prop is not one of the allowed values
    InvalidEnum,
    /// Layout `type` is not stack/grid/single
    InvalidLayoutType,
    /// Layout `direction` is not vertical/horizontal
    InvalidDirection,
    /// Layout `gap` is not a non-negative number
    InvalidGap,
    /// Layout `columns` is not an integer in 1..=12
    InvalidColumns,
    /// Layouts nest deeper than the engine follows
    MaxDepthExceeded,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidPayload => "INVALID_PAYLOAD",
            Self::InvalidType => "INVALID_TYPE",
            Self::MissingType => "MISSING_TYPE",
            Self::MissingProps => "MISSING_PROPS",
            Self::InvalidProps => "INVALID_PROPS",
            Self::Required => "REQUIRED",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::InvalidEnum => "INVALID_ENUM",
            Self::InvalidLayoutType => "INVALID_LAYOUT_TYPE",
            Self::InvalidDirection => "INVALID_DIRECTION",
            Self::InvalidGap => "INVALID_GAP",
            Self::InvalidColumns => "INVALID_COLUMNS",
            Self::MaxDepthExceeded => "MAX_DEPTH_EXCEEDED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation error with its location in the payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Dot/bracket path, e.g. `widgets[2].props.weight`; empty for the root
    pub path: String,
    pub message: String,
    pub code: ErrorCode,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "root" } else { &self.path };
        write!(f, "{}: {} [{}]", path, self.message, self.code)
    }
}

/// Outcome of one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True iff `errors` is empty
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<String>,
}

/// Validate a parsed payload
pub fn validate(parsed: &Value) -> ValidationResult {
    let mut pass = ValidationPass::default();

    match parsed {
        Value::Null => pass.error("", "Payload is empty", ErrorCode::InvalidPayload),
        Value::Object(object) => pass.node(object, "", 0),
        _ => pass.error("", "Payload must be a JSON object", ErrorCode::InvalidType),
    }

    let result = pass.finish();
    log::debug!(
        "Validated payload: {} errors, {} warnings",
        result.errors.len(),
        result.warnings.len()
    );
    result
}

#[derive(Default)]
struct ValidationPass {
    errors: Vec<ValidationError>,
    warnings: Vec<String>,
}

impl ValidationPass {
    fn error(&mut self, path: &str, message: impl Into<String>, code: ErrorCode) {
        self.errors.push(ValidationError {
            path: path.to_string(),
            message: message.into(),
            code,
        });
    }

    fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    fn finish(self) -> ValidationResult {
        ValidationResult {
            valid: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    /// Classify structurally and dispatch
    fn node(&mut self, object: &Map<String, Value>, path: &str, depth: usize) {
        if is_layout_object(object) {
            self.layout(object, path, depth);
        } else {
            self.widget(object, path);
        }
    }

    fn layout(&mut self, object: &Map<String, Value>, path: &str, depth: usize) {
        if depth > MAX_NESTING_DEPTH {
            self.error(
                path,
                format!("Layouts may nest at most {} levels deep", MAX_NESTING_DEPTH),
                ErrorCode::MaxDepthExceeded,
            );
            return;
        }

        let layout_type = self.layout_type(object, path);
        self.layout_options(object, path, layout_type);

        let Some(Value::Array(widgets)) = object.get("widgets") else {
            return;
        };

        if widgets.is_empty() {
            self.warn(format!("{} has no widgets", describe(path, "Layout")));
        }
        if layout_type == Some(LayoutType::Single) && widgets.len() > 1 {
            self.warn(format!(
                "{} is a single layout; only the first of {} widgets is shown",
                describe(path, "Layout"),
                widgets.len()
            ));
        }

        for (i, child) in widgets.iter().enumerate() {
            let child_path = join_path(path, &format!("widgets[{}]", i));
            match child {
                Value::Object(child_object) => self.node(child_object, &child_path, depth + 1),
                _ => self.error(
                    &child_path,
                    "Widget entry must be a JSON object",
                    ErrorCode::InvalidType,
                ),
            }
        }
    }

    fn layout_type(&mut self, object: &Map<String, Value>, path: &str) -> Option<LayoutType> {
        let type_path = join_path(path, "type");
        match object.get("type") {
            None | Some(Value::Null) => {
                self.error(&type_path, "Layout type is required", ErrorCode::MissingType);
                None
            }
            Some(Value::String(name)) => match LayoutType::from_name(name) {
                Some(layout_type) => Some(layout_type),
                None => {
                    self.error(
                        &type_path,
                        format!("Layout type must be one of stack, grid, single (got \"{}\")", name),
                        ErrorCode::InvalidLayoutType,
                    );
                    None
                }
            },
            Some(_) => {
                self.error(&type_path, "Layout type must be a string", ErrorCode::InvalidLayoutType);
                None
            }
        }
    }

    fn layout_options(
        &mut self,
        object: &Map<String, Value>,
        path: &str,
        layout_type: Option<LayoutType>,
    ) {
        match object.get("direction") {
            None | Some(Value::Null) => {}
            Some(Value::String(d)) if d == "vertical" || d == "horizontal" => {
                if layout_type == Some(LayoutType::Grid) {
                    self.warn(format!(
                        "{} is a grid; direction is ignored",
                        describe(path, "Layout")
                    ));
                }
            }
            Some(_) => self.error(
                &join_path(path, "direction"),
                "Direction must be \"vertical\" or \"horizontal\"",
                ErrorCode::InvalidDirection,
            ),
        }

        match object.get("gap") {
            None | Some(Value::Null) => {}
            Some(Value::Number(n)) if n.as_f64().is_some_and(|g| g >= 0.0) => {}
            Some(_) => self.error(
                &join_path(path, "gap"),
                "Gap must be a non-negative number",
                ErrorCode::InvalidGap,
            ),
        }

        match object.get("columns") {
            None | Some(Value::Null) => {}
            Some(Value::Number(n))
                if n.as_u64()
                    .is_some_and(|c| (MIN_COLUMNS..=MAX_COLUMNS).contains(&c)) =>
            {
                if layout_type != Some(LayoutType::Grid) {
                    self.warn(format!(
                        "{} is not a grid; columns is ignored",
                        describe(path, "Layout")
                    ));
                }
            }
            Some(_) => self.error(
                &join_path(path, "columns"),
                format!(
                    "Columns must be an integer between {} and {}",
                    MIN_COLUMNS, MAX_COLUMNS
                ),
                ErrorCode::InvalidColumns,
            ),
        }
    }

    fn widget(&mut self, object: &Map<String, Value>, path: &str) {
        let type_name = match object.get("type") {
            None | Some(Value::Null) => {
                self.error(
                    &join_path(path, "type"),
                    "Widget type is required",
                    ErrorCode::MissingType,
                );
                None
            }
            Some(Value::String(name)) if name.trim().is_empty() => {
                self.error(
                    &join_path(path, "type"),
                    "Widget type must be a non-empty string",
                    ErrorCode::InvalidType,
                );
                None
            }
            Some(Value::String(name)) => Some(name.as_str()),
            Some(_) => {
                self.error(
                    &join_path(path, "type"),
                    "Widget type must be a string",
                    ErrorCode::InvalidType,
                );
                None
            }
        };

        if let Some(thought) = object.get("thought") {
            if !thought.is_string() && !thought.is_null() {
                self.error(
                    &join_path(path, "thought"),
                    "Thought must be a string",
                    ErrorCode::InvalidType,
                );
            }
        }

        let props_path = join_path(path, "props");
        let props = match object.get("props") {
            None | Some(Value::Null) => {
                self.error(&props_path, "Widget props are required", ErrorCode::MissingProps);
                None
            }
            Some(Value::Object(props)) => Some(props),
            Some(_) => {
                self.error(&props_path, "Widget props must be an object", ErrorCode::InvalidProps);
                None
            }
        };

        let Some(type_name) = type_name else {
            return;
        };

        match catalog::lookup(type_name) {
            Some(schema) => {
                if let Some(props) = props {
                    for field_error in schema.validate(props) {
                        self.error(
                            &join_path(&props_path, &field_error.field),
                            field_error.message,
                            field_error.code,
                        );
                    }
                }
            }
            None => self.warn(format!(
                "Unknown widget type \"{}\" at {}; it will render as a placeholder",
                type_name,
                describe(path, "root")
            )),
        }
    }
}

fn describe(path: &str, root_name: &str) -> String {
    if path.is_empty() {
        root_name.to_string()
    } else {
        format!("'{}'", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ring(value: Value) -> Value {
        json!({"type": "progress-ring", "props": {"label": "Steps", "value": value, "goal": 10000}})
    }

    #[test]
    fn test_valid_single_widget() {
        let result = validate(&ring(json!(4200)));
        assert!(result.valid, "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_null_and_non_object_root() {
        let result = validate(&Value::Null);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, ErrorCode::InvalidPayload);

        let result = validate(&json!([1, 2, 3]));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, ErrorCode::InvalidType);
        assert_eq!(result.errors[0].path, "");
    }

    #[test]
    fn test_unknown_type_is_warning() {
        let result = validate(&json!({"type": "totally-unknown-widget-xyz", "props": {}}));
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_missing_props_on_known_type() {
        let result = validate(&json!({"type": "water-tracker"}));
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, ErrorCode::MissingProps);
        assert_eq!(result.errors[0].path, "props");
    }

    #[test]
    fn test_props_not_object() {
        let result = validate(&json!({"type": "water-tracker", "props": [1]}));
        assert_eq!(result.errors[0].code, ErrorCode::InvalidProps);
    }

    #[test]
    fn test_missing_and_empty_type() {
        let result = validate(&json!({"props": {}}));
        assert_eq!(result.errors[0].code, ErrorCode::MissingType);

        let result = validate(&json!({"type": "  ", "props": {}}));
        assert_eq!(result.errors[0].code, ErrorCode::InvalidType);
    }

    #[test]
    fn test_nested_path_addressing() {
        let payload = json!({
            "type": "stack",
            "widgets": [
                ring(json!(1)),
                {
                    "type": "grid",
                    "columns": 2,
                    "widgets": [ring(json!(-3))]
                }
            ]
        });
        let result = validate(&payload);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, "widgets[1].widgets[0].props.value");
        assert_eq!(result.errors[0].code, ErrorCode::OutOfRange);
    }

    #[test]
    fn test_layout_shape_errors() {
        let payload = json!({
            "type": "carousel",
            "direction": "diagonal",
            "gap": -4,
            "columns": 13,
            "widgets": [ring(json!(1))]
        });
        let result = validate(&payload);
        let codes: Vec<ErrorCode> = result.errors.iter().map(|e| e.code).collect();
        assert_eq!(
            codes,
            vec![
                ErrorCode::InvalidLayoutType,
                ErrorCode::InvalidDirection,
                ErrorCode::InvalidGap,
                ErrorCode::InvalidColumns,
            ]
        );
        assert_eq!(result.errors[3].path, "columns");
    }

    #[test]
    fn test_empty_widgets_is_valid_with_warning() {
        let result = validate(&json!({"type": "stack", "widgets": []}));
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_non_object_child() {
        let result = validate(&json!({"type": "stack", "widgets": [ring(json!(1)), "oops"]}));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, "widgets[1]");
    }

    #[test]
    fn test_widgets_prop_is_classified_as_layout() {
        // A widget that carries a `widgets` array is treated as a layout
        let payload = json!({"type": "stat-card", "props": {"label": "x", "value": 1}, "widgets": []});
        let result = validate(&payload);
        assert_eq!(result.errors[0].code, ErrorCode::InvalidLayoutType);
    }

    #[test]
    fn test_nesting_limit() {
        let mut payload = ring(json!(1));
        for _ in 0..40 {
            payload = json!({"type": "stack", "widgets": [payload]});
        }
        let result = validate(&payload);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, ErrorCode::MaxDepthExceeded);
        assert_eq!(
            result.errors[0].path.matches("widgets[0]").count(),
            MAX_NESTING_DEPTH + 1
        );
    }

    #[test]
    fn test_deterministic() {
        let payload = json!({
            "type": "grid",
            "columns": 3,
            "widgets": [ring(json!("x")), {"type": "mystery", "props": {}}, {"type": "insight"}]
        });
        assert_eq!(validate(&payload), validate(&payload));
    }

    #[test]
    fn test_error_display_is_copyable_line() {
        let result = validate(&json!({"type": "water-tracker"}));
        assert_eq!(
            result.errors[0].to_string(),
            "props: Widget props are required [MISSING_PROPS]"
        );
    }

    #[test]
    fn test_valid_widgets_always_decode() {
        use crate::types::PayloadNode;

        let max = u64::from(u32::MAX);
        let cases = [
            // accepted at the edges
            json!({"type": "water-tracker", "props": {"consumed": max, "goal": 8, "glassSizeMl": null}}),
            json!({"type": "habit-streak", "props": {"habit": "Walk", "currentStreak": max, "bestStreak": max, "days": null}}),
            json!({"type": "rest-timer", "props": {"seconds": 3600, "autoStart": null, "label": null}}),
            json!({"type": "insight", "props": {"title": "t", "message": "m", "tone": null}}),
            json!({"type": "set-tracker", "props": {"exercise": "Row", "sets": [{"reps": 0, "completed": null}]}}),
            json!({"type": "workout-card", "props": {"title": "Legs", "exercises": [{"name": "Squat", "sets": 5, "reps": 5, "weight": 100.0}], "difficulty": null}}),
            json!({"type": "progress-ring", "props": {"label": "Steps", "value": 1.5, "goal": 2}}),
            json!({"type": "stat-card", "props": {"label": "VO2", "value": 48.5, "trend": null}}),
            json!({"type": "macro-breakdown", "props": {"protein": 1, "carbs": 2.5, "fat": 0}}),
            // rejected: the typed props could not hold these
            json!({"type": "water-tracker", "props": {"consumed": 3.0, "goal": 8}}),
            json!({"type": "habit-streak", "props": {"habit": "Walk", "currentStreak": 5_000_000_000u64}}),
            json!({"type": "rest-timer", "props": {"seconds": 60, "autoStart": "yes"}}),
            json!({"type": "workout-card", "props": {"title": "Arms", "exercises": [{"name": "Curl", "sets": 3.0, "reps": 10}]}}),
        ];

        let mut valid = 0;
        for payload in &cases {
            if validate(payload).valid {
                valid += 1;
                assert!(
                    matches!(PayloadNode::decode(payload), PayloadNode::Widget(_)),
                    "validated but failed to decode: {}",
                    payload
                );
            }
        }
        assert_eq!(valid, 9);
    }
}
