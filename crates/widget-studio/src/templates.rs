//! Starter templates loadable into the editor

use serde_json::{json, Value};

/// A named starting payload
#[derive(Debug, Clone)]
pub struct Template {
    pub name: &'static str,
    pub description: &'static str,
    build: fn() -> Value,
}

impl Template {
    pub fn payload(&self) -> Value {
        (self.build)()
    }

    /// Pretty-printed editor text for this template
    pub fn text(&self) -> String {
        serde_json::to_string_pretty(&self.payload()).unwrap_or_default()
    }
}

static TEMPLATES: [Template; 3] = [
    Template {
        name: "workout",
        description: "Upper body workout card",
        build: workout,
    },
    Template {
        name: "dashboard",
        description: "Daily dashboard grid of metrics",
        build: dashboard,
    },
    Template {
        name: "hydration",
        description: "Single water tracker",
        build: hydration,
    },
];

pub fn templates() -> &'static [Template] {
    &TEMPLATES
}

pub fn find(name: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.name == name)
}

fn workout() -> Value {
    json!({
        "type": "workout-card",
        "props": {
            "title": "Upper Body Power",
            "subtitle": "Week 3 · Day 2",
            "exercises": [
                {"name": "Bench Press", "sets": 4, "reps": 6, "weight": 80},
                {"name": "Pull-ups", "sets": 4, "reps": 8},
                {"name": "Overhead Press", "sets": 3, "reps": 10, "weight": 40}
            ],
            "durationMinutes": 50,
            "difficulty": "intermediate"
        },
        "thought": "A compound-first session with a clear volume summary."
    })
}

fn dashboard() -> Value {
    json!({
        "type": "grid",
        "columns": 2,
        "gap": 16,
        "widgets": [
            {"type": "progress-ring", "props": {"label": "Steps", "value": 6400, "goal": 10000, "unit": "steps"}},
            {"type": "stat-card", "props": {"label": "Resting HR", "value": 58, "unit": "bpm", "trend": "down", "change": "-3 this week"}},
            {"type": "macro-breakdown", "props": {"protein": 140, "carbs": 210, "fat": 60, "goalCalories": 2400}},
            {"type": "habit-streak", "props": {"habit": "Mobility", "currentStreak": 5, "bestStreak": 12, "days": [true, true, false, true, true, true, true]}}
        ]
    })
}

fn hydration() -> Value {
    json!({
        "type": "single",
        "widgets": [
            {"type": "water-tracker", "props": {"consumed": 3, "goal": 8, "glassSizeMl": 250}}
        ]
    })
}
