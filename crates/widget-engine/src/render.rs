//! Widget dispatch renderer
//!
//! Maps a parsed payload (valid or not) onto a [`RenderTree`]. Layouts become
//! containers, catalog widgets become [`Component`]s built by one render
//! function per [`WidgetKind`], and everything else becomes a visible
//! placeholder. A bad subtree never prevents its siblings from rendering.
//!
//! Leaf components advertise their interactions as [`ActionBinding`]s; when
//! the host reports one firing, [`RenderTree::dispatch`] forwards it to the
//! [`ActionSink`] untouched.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::props::{
    HabitStreakProps, InsightProps, MacroBreakdownProps, ProgressRingProps, RestTimerProps,
    SetTrackerProps, StatCardProps, Trend, WaterTrackerProps, WidgetKind, WidgetProps,
    WorkoutCardProps,
};
use crate::reorder::DragReorder;
use crate::types::{Direction, LayoutType, PayloadNode, WidgetLayout, WidgetNode};

/// Receiver for user interactions raised by rendered widgets
pub trait ActionSink: Send + Sync {
    fn on_action(&self, id: &str, value: Value);
}

/// Sink that ignores every action
pub struct NullActionSink;

impl ActionSink for NullActionSink {
    fn on_action(&self, _id: &str, _value: Value) {}
}

/// An interaction a component offers, e.g. "mark set complete"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionBinding {
    pub id: String,
    pub label: String,
    pub value: Value,
}

impl ActionBinding {
    fn new(id: &str, label: impl Into<String>, value: Value) -> Self {
        Self {
            id: id.to_string(),
            label: label.into(),
            value,
        }
    }
}

/// A catalog widget ready for the component library
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub kind: WidgetKind,
    pub heading: String,
    /// Body lines in display order
    pub lines: Vec<String>,
    /// Progress bar fill in `0.0..=1.0`, for kinds that show one
    pub progress: Option<f64>,
    pub actions: Vec<ActionBinding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,
}

/// One node of the render tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "camelCase")]
pub enum RenderNode {
    Container {
        layout: LayoutType,
        direction: Direction,
        gap: f64,
        columns: u8,
        children: Vec<RenderNode>,
    },
    Component(Component),
    /// "Nothing to show" stand-in for an unrenderable node
    Placeholder { message: String, raw: Value },
    /// Edit-mode wrapper carrying drag affordances for a root child
    #[serde(rename_all = "camelCase")]
    Draggable {
        index: usize,
        dragging: bool,
        drag_over: bool,
        child: Box<RenderNode>,
    },
}

impl RenderNode {
    fn placeholder(message: impl Into<String>, raw: &Value) -> Self {
        Self::Placeholder {
            message: message.into(),
            raw: raw.clone(),
        }
    }

    /// Visit this node and all descendants, parents first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a RenderNode)) {
        visit(self);
        match self {
            Self::Container { children, .. } => {
                for child in children {
                    child.walk(visit);
                }
            }
            Self::Draggable { child, .. } => child.walk(visit),
            Self::Component(_) | Self::Placeholder { .. } => {}
        }
    }
}

/// The renderer's output for one payload revision
#[derive(Clone)]
pub struct RenderTree {
    /// `None` when there is nothing to preview (e.g. unparseable text)
    pub root: Option<RenderNode>,
    actions: Arc<dyn ActionSink>,
}

impl RenderTree {
    /// A tree with nothing to preview
    pub fn empty(actions: Arc<dyn ActionSink>) -> Self {
        Self {
            root: None,
            actions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Forward a component interaction to the host
    pub fn dispatch(&self, id: &str, value: Value) {
        self.actions.on_action(id, value);
    }

    /// All components in document order
    pub fn components(&self) -> Vec<&Component> {
        let mut found = Vec::new();
        if let Some(root) = &self.root {
            root.walk(&mut |node| {
                if let RenderNode::Component(component) = node {
                    found.push(component);
                }
            });
        }
        found
    }

    /// Number of placeholder nodes in the tree
    pub fn placeholder_count(&self) -> usize {
        let mut count = 0;
        if let Some(root) = &self.root {
            root.walk(&mut |node| {
                if matches!(node, RenderNode::Placeholder { .. }) {
                    count += 1;
                }
            });
        }
        count
    }

    /// Indented plain-text outline of the tree
    pub fn outline(&self) -> String {
        let mut out = String::new();
        match &self.root {
            Some(root) => write_outline(root, 0, &mut out),
            None => out.push_str("(nothing to preview)\n"),
        }
        out
    }
}

impl fmt::Debug for RenderTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderTree").field("root", &self.root).finish()
    }
}

fn write_outline(node: &RenderNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match node {
        RenderNode::Container {
            layout,
            children,
            columns,
            ..
        } => {
            if *layout == LayoutType::Grid {
                out.push_str(&format!("{}[grid x{}]\n", indent, columns));
            } else {
                out.push_str(&format!("{}[{}]\n", indent, layout.as_str()));
            }
            for child in children {
                write_outline(child, depth + 1, out);
            }
        }
        RenderNode::Component(component) => {
            out.push_str(&format!("{}{} ({})\n", indent, component.heading, component.kind));
            for line in &component.lines {
                out.push_str(&format!("{}  - {}\n", indent, line));
            }
        }
        RenderNode::Placeholder { message, .. } => {
            out.push_str(&format!("{}<{}>\n", indent, message));
        }
        RenderNode::Draggable {
            index,
            dragging,
            drag_over,
            child,
        } => {
            let marker = match (*dragging, *drag_over) {
                (true, _) => " dragging",
                (_, true) => " drop-target",
                _ => "",
            };
            out.push_str(&format!("{}#{}{}\n", indent, index, marker));
            write_outline(child, depth + 1, out);
        }
    }
}

/// Renders payloads into render trees
pub struct Renderer {
    actions: Arc<dyn ActionSink>,
    edit: Option<DragReorder>,
}

impl Renderer {
    /// A renderer in preview mode with a sink that drops actions
    pub fn new() -> Self {
        Self {
            actions: Arc::new(NullActionSink),
            edit: None,
        }
    }

    pub fn with_actions(mut self, actions: Arc<dyn ActionSink>) -> Self {
        self.actions = actions;
        self
    }

    /// Enable edit mode, wrapping root children with the given drag state
    pub fn with_edit_mode(mut self, drag: DragReorder) -> Self {
        self.edit = Some(drag);
        self
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit.is_some()
    }

    /// Render a parsed payload
    pub fn render(&self, payload: &Value) -> RenderTree {
        let node = PayloadNode::decode(payload);
        let root = match node {
            PayloadNode::Layout(layout) => self.render_layout(&layout, true),
            other => self.render_node(&other),
        };
        RenderTree {
            root: Some(root),
            actions: Arc::clone(&self.actions),
        }
    }

    /// The "nothing to preview" tree used for unparseable text
    pub fn render_nothing(&self) -> RenderTree {
        RenderTree::empty(Arc::clone(&self.actions))
    }

    fn render_node(&self, node: &PayloadNode) -> RenderNode {
        match node {
            PayloadNode::Layout(layout) => self.render_layout(layout, false),
            PayloadNode::Widget(widget) => render_widget(widget),
            PayloadNode::Invalid { reason, raw } => RenderNode::placeholder(reason.clone(), raw),
        }
    }

    fn render_layout(&self, layout: &WidgetLayout, is_root: bool) -> RenderNode {
        let visible = match layout.layout_type {
            LayoutType::Single => &layout.widgets[..layout.widgets.len().min(1)],
            LayoutType::Stack | LayoutType::Grid => &layout.widgets[..],
        };

        let drag = match (&self.edit, layout.layout_type) {
            (Some(drag), LayoutType::Stack | LayoutType::Grid) if is_root => Some(drag),
            _ => None,
        };

        let children = visible
            .iter()
            .enumerate()
            .map(|(index, child)| {
                let rendered = self.render_node(child);
                match drag {
                    Some(drag) => RenderNode::Draggable {
                        index,
                        dragging: drag.is_dragging(index),
                        drag_over: drag.is_dragged_over(index),
                        child: Box::new(rendered),
                    },
                    None => rendered,
                }
            })
            .collect();

        RenderNode::Container {
            layout: layout.layout_type,
            direction: layout.direction,
            gap: layout.gap,
            columns: match layout.layout_type {
                LayoutType::Grid => layout.columns,
                LayoutType::Stack | LayoutType::Single => 1,
            },
            children,
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a widget through the closed kind → render function table
fn render_widget(widget: &WidgetNode) -> RenderNode {
    let component = match &widget.props {
        WidgetProps::WorkoutCard(p) => render_workout_card(p),
        WidgetProps::SetTracker(p) => render_set_tracker(p),
        WidgetProps::ProgressRing(p) => render_progress_ring(p),
        WidgetProps::WaterTracker(p) => render_water_tracker(p),
        WidgetProps::StatCard(p) => render_stat_card(p),
        WidgetProps::RestTimer(p) => render_rest_timer(p),
        WidgetProps::MacroBreakdown(p) => render_macro_breakdown(p),
        WidgetProps::HabitStreak(p) => render_habit_streak(p),
        WidgetProps::Insight(p) => render_insight(p),
        WidgetProps::Unrecognized { type_name, raw } => {
            return RenderNode::placeholder(
                format!("Nothing to show for unknown widget \"{}\"", type_name),
                &json!({ "type": type_name, "props": raw }),
            );
        }
    };
    RenderNode::Component(Component {
        thought: widget.thought.clone(),
        ..component
    })
}

fn component(kind: WidgetKind, heading: &str) -> Component {
    let heading = if heading.trim().is_empty() {
        kind.label().to_string()
    } else {
        heading.to_string()
    };
    Component {
        kind,
        heading,
        lines: Vec::new(),
        progress: None,
        actions: Vec::new(),
        thought: None,
    }
}

fn fmt_num(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{:.1}", n)
    }
}

fn render_workout_card(p: &WorkoutCardProps) -> Component {
    let mut c = component(WidgetKind::WorkoutCard, &p.title);
    if let Some(subtitle) = &p.subtitle {
        c.lines.push(subtitle.clone());
    }
    for exercise in &p.exercises {
        let load = exercise
            .weight
            .map(|w| format!(" @ {} kg", fmt_num(w)))
            .unwrap_or_default();
        c.lines.push(format!(
            "{}: {} x {}{}",
            exercise.name, exercise.sets, exercise.reps, load
        ));
    }
    let mut meta = Vec::new();
    if let Some(minutes) = p.duration_minutes {
        meta.push(format!("{} min", minutes));
    }
    if let Some(difficulty) = p.difficulty {
        meta.push(format!("{:?}", difficulty).to_lowercase());
    }
    let volume = p.total_volume();
    if volume > 0.0 {
        meta.push(format!("{} kg volume", fmt_num(volume)));
    }
    if !meta.is_empty() {
        c.lines.push(meta.join(" · "));
    }
    c.actions.push(ActionBinding::new(
        "start-workout",
        "Start workout",
        json!(p.title),
    ));
    c
}

fn render_set_tracker(p: &SetTrackerProps) -> Component {
    let mut c = component(WidgetKind::SetTracker, &p.exercise);
    for (i, set) in p.sets.iter().enumerate() {
        let load = set
            .weight
            .map(|w| format!(" @ {} kg", fmt_num(w)))
            .unwrap_or_default();
        let mark = if set.completed { "[x]" } else { "[ ]" };
        c.lines
            .push(format!("{} Set {}: {} reps{}", mark, i + 1, set.reps, load));
        if !set.completed {
            c.actions.push(ActionBinding::new(
                "complete-set",
                format!("Complete set {}", i + 1),
                json!(i),
            ));
        }
    }
    if !p.sets.is_empty() {
        c.progress = Some(p.completed_count() as f64 / p.sets.len() as f64);
    }
    c
}

fn render_progress_ring(p: &ProgressRingProps) -> Component {
    let mut c = component(WidgetKind::ProgressRing, &p.label);
    let unit = p.unit.as_deref().map(|u| format!(" {}", u)).unwrap_or_default();
    c.lines.push(format!(
        "{} / {}{}",
        fmt_num(p.value),
        fmt_num(p.goal),
        unit
    ));
    let fraction = p.fraction();
    c.lines.push(format!("{}%", (fraction * 100.0).round() as i64));
    c.progress = Some(fraction);
    c
}

fn render_water_tracker(p: &WaterTrackerProps) -> Component {
    let mut c = component(WidgetKind::WaterTracker, "Hydration");
    c.lines
        .push(format!("{} of {} glasses", p.consumed, p.goal));
    if let Some(size) = p.glass_size_ml {
        c.lines
            .push(format!("{} ml total", u64::from(p.consumed) * u64::from(size)));
    }
    if p.goal > 0 {
        c.progress = Some((f64::from(p.consumed) / f64::from(p.goal)).min(1.0));
    }
    c.actions
        .push(ActionBinding::new("add-water", "Add a glass", json!(1)));
    c
}

fn render_stat_card(p: &StatCardProps) -> Component {
    let mut c = component(WidgetKind::StatCard, &p.label);
    let unit = p.unit.as_deref().map(|u| format!(" {}", u)).unwrap_or_default();
    c.lines.push(format!("{}{}", p.value, unit));
    let arrow = match p.trend {
        Some(Trend::Up) => Some("▲"),
        Some(Trend::Down) => Some("▼"),
        Some(Trend::Flat) => Some("▬"),
        None => None,
    };
    match (arrow, &p.change) {
        (Some(arrow), Some(change)) => c.lines.push(format!("{} {}", arrow, change)),
        (Some(arrow), None) => c.lines.push(arrow.to_string()),
        (None, Some(change)) => c.lines.push(change.clone()),
        (None, None) => {}
    }
    c
}

fn render_rest_timer(p: &RestTimerProps) -> Component {
    let heading = p.label.as_deref().unwrap_or("Rest");
    let mut c = component(WidgetKind::RestTimer, heading);
    c.lines
        .push(format!("{}:{:02}", p.seconds / 60, p.seconds % 60));
    if p.auto_start {
        c.lines.push("Starts automatically".to_string());
    }
    c.actions
        .push(ActionBinding::new("start-timer", "Start", json!(p.seconds)));
    c.actions
        .push(ActionBinding::new("reset-timer", "Reset", Value::Null));
    c
}

fn render_macro_breakdown(p: &MacroBreakdownProps) -> Component {
    let mut c = component(WidgetKind::MacroBreakdown, "Macros");
    c.lines.push(format!("Protein {} g", fmt_num(p.protein)));
    c.lines.push(format!("Carbs {} g", fmt_num(p.carbs)));
    c.lines.push(format!("Fat {} g", fmt_num(p.fat)));
    let calories = p.total_calories();
    match p.goal_calories {
        Some(goal) if goal > 0.0 => {
            c.lines
                .push(format!("{} / {} kcal", fmt_num(calories), fmt_num(goal)));
            c.progress = Some((calories / goal).clamp(0.0, 1.0));
        }
        _ => c.lines.push(format!("{} kcal", fmt_num(calories))),
    }
    c
}

fn render_habit_streak(p: &HabitStreakProps) -> Component {
    let mut c = component(WidgetKind::HabitStreak, &p.habit);
    c.lines.push(format!("{} day streak", p.current_streak));
    if let Some(best) = p.best_streak {
        c.lines.push(format!("Best: {} days", best));
    }
    if !p.days.is_empty() {
        let week: String = p
            .days
            .iter()
            .map(|done| if *done { '●' } else { '○' })
            .collect();
        c.lines.push(week);
    }
    c.actions
        .push(ActionBinding::new("check-in", "Check in today", json!(true)));
    c
}

fn render_insight(p: &InsightProps) -> Component {
    let mut c = component(WidgetKind::Insight, &p.title);
    c.lines.push(p.message.clone());
    c.actions.push(ActionBinding::new(
        "dismiss-insight",
        "Dismiss",
        json!(format!("{:?}", p.tone).to_lowercase()),
    ));
    c
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingSink {
        seen: Mutex<Vec<(String, Value)>>,
    }

    impl ActionSink for RecordingSink {
        fn on_action(&self, id: &str, value: Value) {
            self.seen.lock().unwrap().push((id.to_string(), value));
        }
    }

    fn water() -> Value {
        json!({"type": "water-tracker", "props": {"consumed": 3, "goal": 8}})
    }

    fn timer() -> Value {
        json!({"type": "rest-timer", "props": {"seconds": 90}})
    }

    #[test]
    fn test_render_single_widget() {
        let tree = Renderer::new().render(&water());
        let components = tree.components();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].kind, WidgetKind::WaterTracker);
        assert_eq!(components[0].lines[0], "3 of 8 glasses");
        assert_eq!(components[0].progress, Some(0.375));
    }

    #[test]
    fn test_unknown_child_renders_placeholder() {
        let payload = json!({
            "type": "stack",
            "widgets": [water(), {"type": "totally-unknown", "props": {}}, timer()]
        });
        let tree = Renderer::new().render(&payload);
        let Some(RenderNode::Container { children, .. }) = &tree.root else {
            panic!("expected container");
        };
        assert_eq!(children.len(), 3);
        assert!(matches!(children[0], RenderNode::Component(_)));
        assert!(matches!(children[1], RenderNode::Placeholder { .. }));
        assert!(matches!(children[2], RenderNode::Component(_)));
        assert_eq!(tree.placeholder_count(), 1);
    }

    #[test]
    fn test_malformed_subtree_does_not_abort() {
        let payload = json!({
            "type": "grid",
            "columns": 2,
            "widgets": [
                {"type": "stack", "widgets": [{"type": "water-tracker", "props": {"consumed": "x"}}, timer()]},
                42,
                {"type": "insight"}
            ]
        });
        let tree = Renderer::new().render(&payload);
        assert_eq!(tree.components().len(), 1);
        assert_eq!(tree.placeholder_count(), 3);
    }

    #[test]
    fn test_grid_columns_and_single_layout() {
        let grid = Renderer::new().render(&json!({"type": "grid", "columns": 3, "widgets": [timer()]}));
        assert!(matches!(tree_root(&grid), RenderNode::Container { columns: 3, .. }));

        let single = Renderer::new().render(&json!({"type": "single", "widgets": [timer(), water()]}));
        let RenderNode::Container { children, .. } = tree_root(&single) else {
            panic!("expected container");
        };
        assert_eq!(children.len(), 1);
    }

    #[test]
    fn test_nesting_past_limit_renders_placeholder() {
        let mut payload = json!({"type": "stack", "widgets": [timer()]});
        for _ in 0..39 {
            payload = json!({"type": "stack", "widgets": [payload]});
        }
        let tree = Renderer::new().render(&payload);
        assert_eq!(tree.placeholder_count(), 1);
        assert!(tree.components().is_empty());

        let mut depth = 0;
        let mut node = tree_root(&tree);
        while let RenderNode::Container { children, .. } = node {
            depth += 1;
            node = &children[0];
        }
        assert_eq!(depth, crate::constants::limits::MAX_NESTING_DEPTH + 1);
        assert!(matches!(node, RenderNode::Placeholder { .. }));
    }

    fn tree_root(tree: &RenderTree) -> &RenderNode {
        tree.root.as_ref().expect("root")
    }

    #[test]
    fn test_edit_mode_wraps_root_children_only() {
        let mut drag = DragReorder::new();
        drag.drag_start(1);
        drag.drag_over(0);
        let payload = json!({
            "type": "stack",
            "widgets": [water(), {"type": "stack", "widgets": [timer()]}]
        });
        let tree = Renderer::new().with_edit_mode(drag).render(&payload);
        let RenderNode::Container { children, .. } = tree_root(&tree) else {
            panic!("expected container");
        };
        assert!(matches!(
            children[0],
            RenderNode::Draggable { index: 0, dragging: false, drag_over: true, .. }
        ));
        let RenderNode::Draggable { dragging: true, child, .. } = &children[1] else {
            panic!("expected dragged wrapper");
        };
        let RenderNode::Container { children: nested, .. } = &**child else {
            panic!("expected nested container");
        };
        assert!(matches!(nested[0], RenderNode::Component(_)));
    }

    #[test]
    fn test_actions_are_forwarded() {
        let sink = Arc::new(RecordingSink {
            seen: Mutex::new(Vec::new()),
        });
        let payload = json!({
            "type": "set-tracker",
            "props": {"exercise": "Squat", "sets": [{"reps": 5, "completed": true}, {"reps": 5}]}
        });
        let tree = Renderer::new().with_actions(sink.clone()).render(&payload);
        let component = tree.components()[0].clone();
        assert_eq!(component.actions.len(), 1);
        assert_eq!(component.actions[0].id, "complete-set");
        assert_eq!(component.progress, Some(0.5));

        let action = &component.actions[0];
        tree.dispatch(&action.id, action.value.clone());
        let seen = sink.seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &[("complete-set".to_string(), json!(1))]);
    }

    #[test]
    fn test_non_object_root_is_placeholder() {
        let tree = Renderer::new().render(&json!("hello"));
        assert!(matches!(tree_root(&tree), RenderNode::Placeholder { .. }));
        assert!(Renderer::new().render_nothing().is_empty());
    }

    #[test]
    fn test_thought_and_heading_fallback() {
        let payload = json!({
            "type": "stat-card",
            "props": {"label": "", "value": 62, "unit": "bpm", "trend": "down", "change": "-3"},
            "thought": "Resting HR trending down"
        });
        let tree = Renderer::new().render(&payload);
        let component = tree.components()[0];
        assert_eq!(component.heading, "Stat Card");
        assert_eq!(component.lines, vec!["62 bpm", "▼ -3"]);
        assert_eq!(component.thought.as_deref(), Some("Resting HR trending down"));
    }

    #[test]
    fn test_outline() {
        let tree = Renderer::new().render(&json!({"type": "stack", "widgets": [timer()]}));
        assert_eq!(tree.outline(), "[stack]\n  Rest (rest-timer)\n    - 1:30\n");
    }
}
