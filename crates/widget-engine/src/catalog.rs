//! Widget schema catalog
//!
//! Maps each payload `type` string to a [`Schema`] that checks that kind's
//! `props` bag. The catalog is a static table over [`WidgetKind::ALL`]; it is
//! never mutated at runtime. A `None` from [`lookup`] is the "unknown type"
//! signal: the validator turns it into a warning, not an error.

use serde_json::{Map, Value};

use crate::constants::limits;
use crate::props::WidgetKind;
use crate::validation::ErrorCode;

/// A field-level problem inside a props bag
///
/// `field` is relative to `props` (e.g. `exercises[0].weight`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub code: ErrorCode,
}

/// Prop validator for one widget kind
pub struct Schema {
    /// The kind this schema validates
    pub kind: WidgetKind,
    /// Short description for palettes and prompts
    pub description: &'static str,
    validator: fn(&mut PropChecker<'_>),
}

impl Schema {
    /// Validate a props mapping, returning every field error found
    pub fn validate(&self, props: &Map<String, Value>) -> Vec<FieldError> {
        let mut checker = PropChecker::new(props, String::new());
        (self.validator)(&mut checker);
        checker.errors
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("kind", &self.kind)
            .field("description", &self.description)
            .finish()
    }
}

static SCHEMAS: [Schema; 9] = [
    Schema {
        kind: WidgetKind::WorkoutCard,
        description: "A planned workout: title, exercises with sets/reps/weight",
        validator: validate_workout_card,
    },
    Schema {
        kind: WidgetKind::SetTracker,
        description: "Per-set logging for a single exercise",
        validator: validate_set_tracker,
    },
    Schema {
        kind: WidgetKind::ProgressRing,
        description: "Circular progress toward a numeric goal",
        validator: validate_progress_ring,
    },
    Schema {
        kind: WidgetKind::WaterTracker,
        description: "Glasses of water consumed against a daily goal",
        validator: validate_water_tracker,
    },
    Schema {
        kind: WidgetKind::StatCard,
        description: "A single headline metric with optional trend",
        validator: validate_stat_card,
    },
    Schema {
        kind: WidgetKind::RestTimer,
        description: "Countdown timer between sets",
        validator: validate_rest_timer,
    },
    Schema {
        kind: WidgetKind::MacroBreakdown,
        description: "Protein, carbs and fat in grams with calorie total",
        validator: validate_macro_breakdown,
    },
    Schema {
        kind: WidgetKind::HabitStreak,
        description: "Consecutive-day habit counter with weekly check-ins",
        validator: validate_habit_streak,
    },
    Schema {
        kind: WidgetKind::Insight,
        description: "Coaching note or alert with a tone",
        validator: validate_insight,
    },
];

/// Look up the schema for a payload `type`
pub fn lookup(widget_type: &str) -> Option<&'static Schema> {
    let kind = WidgetKind::from_type_name(widget_type)?;
    SCHEMAS.iter().find(|schema| schema.kind == kind)
}

/// All schemas in palette order
pub fn schemas() -> &'static [Schema] {
    &SCHEMAS
}

fn validate_workout_card(c: &mut PropChecker<'_>) {
    c.required_str("title");
    c.optional_str("subtitle");
    if let Some(exercises) = c.required_array("exercises") {
        if exercises.is_empty() {
            c.error("exercises", "must contain at least 1 exercise", ErrorCode::OutOfRange);
        }
        c.each_object("exercises", exercises, |e| {
            e.required_str("name");
            if let Some(sets) = e.required_integer("sets") {
                e.check_range("sets", sets as f64, Some(1.0), Some(20.0));
            }
            if let Some(reps) = e.required_integer("reps") {
                e.check_range("reps", reps as f64, Some(1.0), Some(100.0));
            }
            if let Some(weight) = e.optional_number("weight") {
                e.check_range("weight", weight, Some(0.0), None);
            }
        });
    }
    if let Some(minutes) = c.optional_integer("durationMinutes") {
        c.check_range("durationMinutes", minutes as f64, Some(1.0), Some(600.0));
    }
    c.optional_enum("difficulty", &["beginner", "intermediate", "advanced"]);
}

fn validate_set_tracker(c: &mut PropChecker<'_>) {
    c.required_str("exercise");
    if let Some(sets) = c.required_array("sets") {
        if sets.is_empty() {
            c.error("sets", "must contain at least 1 set", ErrorCode::OutOfRange);
        }
        c.each_object("sets", sets, |s| {
            if let Some(reps) = s.required_integer("reps") {
                s.check_range("reps", reps as f64, Some(0.0), Some(100.0));
            }
            if let Some(weight) = s.optional_number("weight") {
                s.check_range("weight", weight, Some(0.0), None);
            }
            s.optional_bool("completed");
        });
    }
}

fn validate_progress_ring(c: &mut PropChecker<'_>) {
    c.required_str("label");
    if let Some(value) = c.required_number("value") {
        c.check_range("value", value, Some(0.0), None);
    }
    if let Some(goal) = c.required_number("goal") {
        c.check_positive("goal", goal);
    }
    c.optional_str("unit");
    c.optional_str("color");
}

fn validate_water_tracker(c: &mut PropChecker<'_>) {
    if let Some(consumed) = c.required_integer("consumed") {
        c.check_range("consumed", consumed as f64, Some(0.0), None);
    }
    if let Some(goal) = c.required_integer("goal") {
        c.check_range("goal", goal as f64, Some(1.0), Some(30.0));
    }
    if let Some(size) = c.optional_integer("glassSizeMl") {
        c.check_range("glassSizeMl", size as f64, Some(50.0), Some(2000.0));
    }
}

fn validate_stat_card(c: &mut PropChecker<'_>) {
    c.required_str("label");
    match c.get("value") {
        None | Some(Value::Null) => c.error("value", "is required", ErrorCode::Required),
        Some(Value::String(_)) | Some(Value::Number(_)) => {}
        Some(_) => c.error("value", "must be a string or number", ErrorCode::InvalidType),
    }
    c.optional_str("unit");
    c.optional_enum("trend", &["up", "down", "flat"]);
    c.optional_str("change");
}

fn validate_rest_timer(c: &mut PropChecker<'_>) {
    if let Some(seconds) = c.required_integer("seconds") {
        c.check_range("seconds", seconds as f64, Some(5.0), Some(3600.0));
    }
    c.optional_str("label");
    c.optional_bool("autoStart");
}

fn validate_macro_breakdown(c: &mut PropChecker<'_>) {
    for field in ["protein", "carbs", "fat"] {
        if let Some(grams) = c.required_number(field) {
            c.check_range(field, grams, Some(0.0), None);
        }
    }
    if let Some(calories) = c.optional_number("calories") {
        c.check_range("calories", calories, Some(0.0), None);
    }
    if let Some(goal) = c.optional_number("goalCalories") {
        c.check_positive("goalCalories", goal);
    }
}

fn validate_habit_streak(c: &mut PropChecker<'_>) {
    c.required_str("habit");
    let current = c.required_integer("currentStreak");
    if let Some(current) = current {
        c.check_range("currentStreak", current as f64, Some(0.0), None);
    }
    if let Some(best) = c.optional_integer("bestStreak") {
        c.check_range("bestStreak", best as f64, Some(0.0), None);
        if matches!(current, Some(current) if best < current) {
            c.error(
                "bestStreak",
                "must be at least currentStreak",
                ErrorCode::OutOfRange,
            );
        }
    }
    if let Some(days) = c.optional_array("days") {
        if days.len() > 7 {
            c.error("days", "must contain at most 7 entries", ErrorCode::OutOfRange);
        }
        for (i, day) in days.iter().enumerate() {
            if !day.is_boolean() {
                c.error(
                    &format!("days[{}]", i),
                    "must be a boolean",
                    ErrorCode::InvalidType,
                );
            }
        }
    }
}

fn validate_insight(c: &mut PropChecker<'_>) {
    c.required_str("title");
    c.required_str("message");
    c.optional_enum("tone", &["info", "success", "warning", "error"]);
}

/// Accumulates field errors while walking a props object
///
/// Every accessor records an error and returns `None` when the field is
/// present with the wrong shape, so validators can chain range checks on
/// the `Some` branch without re-checking types.
pub struct PropChecker<'a> {
    object: &'a Map<String, Value>,
    prefix: String,
    errors: Vec<FieldError>,
}

impl<'a> PropChecker<'a> {
    fn new(object: &'a Map<String, Value>, prefix: String) -> Self {
        Self {
            object,
            prefix,
            errors: Vec::new(),
        }
    }

    fn path(&self, field: &str) -> String {
        if self.prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", self.prefix, field)
        }
    }

    /// Record an error on a field of this object
    pub fn error(&mut self, field: &str, message: &str, code: ErrorCode) {
        let field = self.path(field);
        self.errors.push(FieldError {
            field,
            message: message.to_string(),
            code,
        });
    }

    /// Raw access to a field; `null` counts as absent in the typed accessors
    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.object.get(field)
    }

    fn present(&self, field: &str) -> Option<&'a Value> {
        self.object.get(field).filter(|v| !v.is_null())
    }

    pub fn required_str(&mut self, field: &str) -> Option<&'a str> {
        match self.present(field) {
            None => {
                self.error(field, "is required", ErrorCode::Required);
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                self.error(field, "must be a non-empty string", ErrorCode::Required);
                None
            }
            Some(Value::String(s)) => Some(s),
            Some(_) => {
                self.error(field, "must be a string", ErrorCode::InvalidType);
                None
            }
        }
    }

    pub fn optional_str(&mut self, field: &str) -> Option<&'a str> {
        match self.present(field) {
            None => None,
            Some(Value::String(s)) => Some(s),
            Some(_) => {
                self.error(field, "must be a string", ErrorCode::InvalidType);
                None
            }
        }
    }

    pub fn required_number(&mut self, field: &str) -> Option<f64> {
        if self.present(field).is_none() {
            self.error(field, "is required", ErrorCode::Required);
            return None;
        }
        self.optional_number(field)
    }

    pub fn optional_number(&mut self, field: &str) -> Option<f64> {
        match self.present(field) {
            None => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(_) => {
                self.error(field, "must be a number", ErrorCode::InvalidType);
                None
            }
        }
    }

    pub fn required_integer(&mut self, field: &str) -> Option<i64> {
        if self.present(field).is_none() {
            self.error(field, "is required", ErrorCode::Required);
            return None;
        }
        self.optional_integer(field)
    }

    /// An integer literal that fits the `u32` it decodes into
    ///
    /// Whole floats such as `3.0` are rejected; negative values are left to
    /// the caller's range check.
    pub fn optional_integer(&mut self, field: &str) -> Option<i64> {
        let number = match self.present(field) {
            None => return None,
            Some(Value::Number(n)) => n,
            Some(_) => {
                self.error(field, "must be a number", ErrorCode::InvalidType);
                return None;
            }
        };
        match number.as_i64() {
            Some(value) if value <= limits::MAX_INTEGER_PROP => Some(value),
            Some(_) => {
                self.out_of_integer_range(field);
                None
            }
            None if number.is_u64() => {
                self.out_of_integer_range(field);
                None
            }
            None => {
                self.error(field, "must be a whole number", ErrorCode::InvalidType);
                None
            }
        }
    }

    fn out_of_integer_range(&mut self, field: &str) {
        let message = format!("must be at most {}", limits::MAX_INTEGER_PROP);
        self.error(field, &message, ErrorCode::OutOfRange);
    }

    pub fn optional_bool(&mut self, field: &str) -> Option<bool> {
        match self.present(field) {
            None => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => {
                self.error(field, "must be a boolean", ErrorCode::InvalidType);
                None
            }
        }
    }

    pub fn optional_enum(&mut self, field: &str, allowed: &[&str]) -> Option<&'a str> {
        let value = self.optional_str(field)?;
        if allowed.contains(&value) {
            Some(value)
        } else {
            self.error(
                field,
                &format!("must be one of: {}", allowed.join(", ")),
                ErrorCode::InvalidEnum,
            );
            None
        }
    }

    pub fn required_array(&mut self, field: &str) -> Option<&'a Vec<Value>> {
        if self.present(field).is_none() {
            self.error(field, "is required", ErrorCode::Required);
            return None;
        }
        self.optional_array(field)
    }

    pub fn optional_array(&mut self, field: &str) -> Option<&'a Vec<Value>> {
        match self.present(field) {
            None => None,
            Some(Value::Array(items)) => Some(items),
            Some(_) => {
                self.error(field, "must be an array", ErrorCode::InvalidType);
                None
            }
        }
    }

    /// Run `check` against every element of an array of objects
    pub fn each_object(
        &mut self,
        field: &str,
        items: &'a [Value],
        mut check: impl FnMut(&mut PropChecker<'a>),
    ) {
        for (i, item) in items.iter().enumerate() {
            let item_path = format!("{}[{}]", field, i);
            match item.as_object() {
                Some(object) => {
                    let mut nested = PropChecker::new(object, self.path(&item_path));
                    check(&mut nested);
                    self.errors.append(&mut nested.errors);
                }
                None => self.error(&item_path, "must be an object", ErrorCode::InvalidType),
            }
        }
    }

    pub fn check_range(&mut self, field: &str, value: f64, min: Option<f64>, max: Option<f64>) {
        let message = match (min, max) {
            (Some(min), Some(max)) if value < min || value > max => {
                format!("must be between {} and {}", min, max)
            }
            (Some(min), None) if value < min => format!("must be at least {}", min),
            (None, Some(max)) if value > max => format!("must be at most {}", max),
            _ => return,
        };
        self.error(field, &message, ErrorCode::OutOfRange);
    }

    pub fn check_positive(&mut self, field: &str, value: f64) {
        if value <= 0.0 {
            self.error(field, "must be greater than 0", ErrorCode::OutOfRange);
        }
    }
}
