//! Typed widget kinds and their prop shapes
//!
//! The widget catalog is closed: every kind the studio knows about is a
//! variant of [`WidgetKind`], and each kind decodes its `props` bag into its
//! own struct. Types outside the catalog decode to
//! [`WidgetProps::Unrecognized`], which keeps the raw payload for display.
//!
//! Decoding is lenient (missing fields fall back to defaults) so that a
//! half-written payload still previews. Strictness lives in the catalog
//! validators in [`crate::catalog`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every widget kind known to the studio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    /// A planned workout with its exercise list
    WorkoutCard,
    /// Per-set logging for one exercise
    SetTracker,
    /// Circular progress toward a numeric goal
    ProgressRing,
    /// Glasses of water against a daily goal
    WaterTracker,
    /// A single headline metric
    StatCard,
    /// Countdown between sets
    RestTimer,
    /// Protein/carbs/fat split
    MacroBreakdown,
    /// Consecutive-day habit counter
    HabitStreak,
    /// Coaching note or alert
    Insight,
}

impl WidgetKind {
    /// All catalog kinds, in palette order
    pub const ALL: [WidgetKind; 9] = [
        WidgetKind::WorkoutCard,
        WidgetKind::SetTracker,
        WidgetKind::ProgressRing,
        WidgetKind::WaterTracker,
        WidgetKind::StatCard,
        WidgetKind::RestTimer,
        WidgetKind::MacroBreakdown,
        WidgetKind::HabitStreak,
        WidgetKind::Insight,
    ];

    /// The `type` string used in payloads
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::WorkoutCard => "workout-card",
            Self::SetTracker => "set-tracker",
            Self::ProgressRing => "progress-ring",
            Self::WaterTracker => "water-tracker",
            Self::StatCard => "stat-card",
            Self::RestTimer => "rest-timer",
            Self::MacroBreakdown => "macro-breakdown",
            Self::HabitStreak => "habit-streak",
            Self::Insight => "insight",
        }
    }

    /// Resolve a payload `type` string
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_name() == name)
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::WorkoutCard => "Workout Card",
            Self::SetTracker => "Set Tracker",
            Self::ProgressRing => "Progress Ring",
            Self::WaterTracker => "Water Tracker",
            Self::StatCard => "Stat Card",
            Self::RestTimer => "Rest Timer",
            Self::MacroBreakdown => "Macro Breakdown",
            Self::HabitStreak => "Habit Streak",
            Self::Insight => "Insight",
        }
    }
}

impl std::fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Exercise {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkoutCardProps {
    pub title: String,
    pub subtitle: Option<String>,
    pub exercises: Vec<Exercise>,
    pub duration_minutes: Option<u32>,
    pub difficulty: Option<Difficulty>,
}

impl WorkoutCardProps {
    /// Total planned volume (sets × reps × weight) across weighted exercises
    pub fn total_volume(&self) -> f64 {
        self.exercises
            .iter()
            .filter_map(|e| e.weight.map(|w| w * f64::from(e.sets) * f64::from(e.reps)))
            .sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackedSet {
    pub reps: u32,
    pub weight: Option<f64>,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SetTrackerProps {
    pub exercise: String,
    pub sets: Vec<TrackedSet>,
}

impl SetTrackerProps {
    pub fn completed_count(&self) -> usize {
        self.sets.iter().filter(|s| s.completed).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressRingProps {
    pub label: String,
    pub value: f64,
    pub goal: f64,
    pub unit: Option<String>,
    pub color: Option<String>,
}

impl ProgressRingProps {
    /// Fraction of the goal reached, clamped to `0.0..=1.0`
    pub fn fraction(&self) -> f64 {
        if self.goal <= 0.0 {
            return 0.0;
        }
        (self.value / self.goal).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WaterTrackerProps {
    pub consumed: u32,
    pub goal: u32,
    pub glass_size_ml: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

/// A stat value may be a number or preformatted text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Number(f64),
    Text(String),
}

impl Default for StatValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl std::fmt::Display for StatValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatCardProps {
    pub label: String,
    pub value: StatValue,
    pub unit: Option<String>,
    pub trend: Option<Trend>,
    pub change: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RestTimerProps {
    pub seconds: u32,
    pub label: Option<String>,
    pub auto_start: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MacroBreakdownProps {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub calories: Option<f64>,
    pub goal_calories: Option<f64>,
}

impl MacroBreakdownProps {
    /// Explicit calories, or the 4/4/9 estimate from grams
    pub fn total_calories(&self) -> f64 {
        self.calories
            .unwrap_or(self.protein * 4.0 + self.carbs * 4.0 + self.fat * 9.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HabitStreakProps {
    pub habit: String,
    pub current_streak: u32,
    pub best_streak: Option<u32>,
    pub days: Vec<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InsightProps {
    pub title: String,
    pub message: String,
    pub tone: Tone,
}

/// Decoded props, one variant per catalog kind
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetProps {
    WorkoutCard(WorkoutCardProps),
    SetTracker(SetTrackerProps),
    ProgressRing(ProgressRingProps),
    WaterTracker(WaterTrackerProps),
    StatCard(StatCardProps),
    RestTimer(RestTimerProps),
    MacroBreakdown(MacroBreakdownProps),
    HabitStreak(HabitStreakProps),
    Insight(InsightProps),
    /// A `type` outside the catalog, kept verbatim for diagnostics
    Unrecognized { type_name: String, raw: Value },
}

impl WidgetProps {
    /// Decode a props bag for the given payload `type`
    ///
    /// Unknown types never fail; they produce `Unrecognized`. Known types
    /// fail only when a present field has the wrong JSON shape. `null`
    /// members count as absent, as they do in the catalog validators.
    pub fn decode(type_name: &str, props: &Value) -> Result<Self, serde_json::Error> {
        let Some(kind) = WidgetKind::from_type_name(type_name) else {
            return Ok(Self::Unrecognized {
                type_name: type_name.to_string(),
                raw: props.clone(),
            });
        };
        let props = &without_nulls(props);

        Ok(match kind {
            WidgetKind::WorkoutCard => Self::WorkoutCard(WorkoutCardProps::deserialize(props)?),
            WidgetKind::SetTracker => Self::SetTracker(SetTrackerProps::deserialize(props)?),
            WidgetKind::ProgressRing => Self::ProgressRing(ProgressRingProps::deserialize(props)?),
            WidgetKind::WaterTracker => Self::WaterTracker(WaterTrackerProps::deserialize(props)?),
            WidgetKind::StatCard => Self::StatCard(StatCardProps::deserialize(props)?),
            WidgetKind::RestTimer => Self::RestTimer(RestTimerProps::deserialize(props)?),
            WidgetKind::MacroBreakdown => {
                Self::MacroBreakdown(MacroBreakdownProps::deserialize(props)?)
            }
            WidgetKind::HabitStreak => Self::HabitStreak(HabitStreakProps::deserialize(props)?),
            WidgetKind::Insight => Self::Insight(InsightProps::deserialize(props)?),
        })
    }

    /// The catalog kind, or `None` for unrecognized types
    pub fn kind(&self) -> Option<WidgetKind> {
        Some(match self {
            Self::WorkoutCard(_) => WidgetKind::WorkoutCard,
            Self::SetTracker(_) => WidgetKind::SetTracker,
            Self::ProgressRing(_) => WidgetKind::ProgressRing,
            Self::WaterTracker(_) => WidgetKind::WaterTracker,
            Self::StatCard(_) => WidgetKind::StatCard,
            Self::RestTimer(_) => WidgetKind::RestTimer,
            Self::MacroBreakdown(_) => WidgetKind::MacroBreakdown,
            Self::HabitStreak(_) => WidgetKind::HabitStreak,
            Self::Insight(_) => WidgetKind::Insight,
            Self::Unrecognized { .. } => return None,
        })
    }

    /// The payload `type` string this value was decoded from
    pub fn type_name(&self) -> &str {
        match self {
            Self::Unrecognized { type_name, .. } => type_name,
            other => other.kind().map(|k| k.type_name()).unwrap_or_default(),
        }
    }
}

/// Copy of `value` with `null` object members dropped at every depth
fn without_nulls(value: &Value) -> Value {
    match value {
        Value::Object(object) => Value::Object(
            object
                .iter()
                .filter(|(_, member)| !member.is_null())
                .map(|(key, member)| (key.clone(), without_nulls(member)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(without_nulls).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_name_round_trip() {
        for kind in WidgetKind::ALL {
            assert_eq!(WidgetKind::from_type_name(kind.type_name()), Some(kind));
        }
        assert_eq!(WidgetKind::from_type_name("Workout-Card"), None);
    }

    #[test]
    fn test_decode_unknown_type() {
        let props = WidgetProps::decode("mystery", &json!({"a": 1})).unwrap();
        assert_eq!(props.kind(), None);
        assert_eq!(props.type_name(), "mystery");
    }

    #[test]
    fn test_decode_treats_null_as_absent() {
        let props = WidgetProps::decode(
            "set-tracker",
            &json!({"exercise": "Squat", "sets": [{"reps": 5, "completed": null, "weight": null}]}),
        )
        .unwrap();
        match props {
            WidgetProps::SetTracker(p) => {
                assert!(!p.sets[0].completed);
                assert_eq!(p.sets[0].weight, None);
            }
            other => panic!("unexpected {:?}", other),
        }

        let props =
            WidgetProps::decode("insight", &json!({"title": "t", "message": "m", "tone": null}))
                .unwrap();
        assert!(matches!(props, WidgetProps::Insight(p) if p.tone == Tone::Info));
    }

    #[test]
    fn test_decode_partial_props_uses_defaults() {
        let props = WidgetProps::decode("water-tracker", &json!({"consumed": 3})).unwrap();
        match props {
            WidgetProps::WaterTracker(p) => {
                assert_eq!(p.consumed, 3);
                assert_eq!(p.goal, 0);
            }
            other => panic!("unexpected props: {:?}", other),
        }
    }

    #[test]
    fn test_decode_wrong_shape_fails() {
        assert!(WidgetProps::decode("water-tracker", &json!({"consumed": "lots"})).is_err());
    }

    #[test]
    fn test_macro_calorie_estimate() {
        let props = MacroBreakdownProps {
            protein: 100.0,
            carbs: 200.0,
            fat: 50.0,
            ..Default::default()
        };
        assert_eq!(props.total_calories(), 1650.0);
    }

    #[test]
    fn test_stat_value_display() {
        assert_eq!(StatValue::Number(42.0).to_string(), "42");
        assert_eq!(StatValue::Number(4.5).to_string(), "4.5");
        assert_eq!(StatValue::Text("1:05".into()).to_string(), "1:05");
    }
}
