//! Editor session wiring the studio control flow
//!
//! A [`StudioSession`] owns the editor text and everything derived from it.
//! Every mutation (typing, template load, generation, undo/redo, reorder)
//! re-parses the text and refreshes diagnostics; the preview is rendered on
//! demand from the last successful parse.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use widget_engine::types::{reorderable_root_widgets, with_root_widgets};
use widget_engine::{
    parse_document, validate, ActionSink, DragReorder, EditBuffer, EngineError, NullActionSink,
    ParseError, RenderTree, Renderer, ValidationResult,
};

use crate::config::EditorConfig;
use crate::error::{Result, StudioError};
use crate::export::{self, ExportFormat};
use crate::generation::{ModelChoice, WidgetGenerator};
use crate::shortcuts::{command_for, EditorCommand, KeyChord};
use crate::storage::{KeyValueStore, SavedWidget, WidgetLibrary};
use crate::templates;

/// Diagnostics for the current editor text
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostics {
    /// The text is not JSON
    Parse(ParseError),
    /// The text parsed; these are its validation results
    Validated(ValidationResult),
}

impl Diagnostics {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Validated(result) if result.valid)
    }

    /// One copyable line per problem
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Parse(err) => vec![err.to_string()],
            Self::Validated(result) => result
                .errors
                .iter()
                .map(|e| e.to_string())
                .chain(result.warnings.iter().map(|w| format!("warning: {}", w)))
                .collect(),
        }
    }
}

/// One user's editing session
pub struct StudioSession {
    buffer: EditBuffer,
    drag: DragReorder,
    edit_mode: bool,
    generating: bool,
    actions: Arc<dyn ActionSink>,
    parsed: std::result::Result<Value, ParseError>,
    diagnostics: Diagnostics,
    model_label: String,
}

fn analyse(text: &str) -> (std::result::Result<Value, ParseError>, Diagnostics) {
    match parse_document(text) {
        Ok(value) => {
            let diagnostics = Diagnostics::Validated(validate(&value));
            (Ok(value), diagnostics)
        }
        Err(err) => {
            let diagnostics = Diagnostics::Parse(err.clone());
            (Err(err), diagnostics)
        }
    }
}

impl StudioSession {
    pub fn new(config: &EditorConfig, initial: impl Into<String>) -> Self {
        let buffer = EditBuffer::with_options(
            initial,
            Duration::from_millis(config.debounce_ms),
            config.history_limit,
        );
        let (parsed, diagnostics) = analyse(buffer.text());
        Self {
            buffer,
            drag: DragReorder::new(),
            edit_mode: config.edit_mode,
            generating: false,
            actions: Arc::new(NullActionSink),
            parsed,
            diagnostics,
            model_label: "manual".to_string(),
        }
    }

    /// Route widget interactions to `actions`
    pub fn with_actions(mut self, actions: Arc<dyn ActionSink>) -> Self {
        self.actions = actions;
        self
    }

    fn now() -> std::time::Instant {
        tokio::time::Instant::now().into_std()
    }

    fn refresh(&mut self) {
        (self.parsed, self.diagnostics) = analyse(self.buffer.text());
    }

    // Text mutations

    /// A keystroke: the text changes now, the undo step after the quiet period
    pub fn type_text(&mut self, text: impl Into<String>) {
        self.buffer.set_debounced(text, Self::now());
        self.refresh();
    }

    /// Replace the text as a single undo step
    pub fn load_text(&mut self, text: impl Into<String>) -> bool {
        let changed = self.buffer.set_immediate(text);
        self.refresh();
        changed
    }

    /// Replace the text with a pretty-printed payload
    pub fn load_payload(&mut self, payload: &Value) -> Result<bool> {
        let text = serde_json::to_string_pretty(payload).map_err(EngineError::from)?;
        Ok(self.load_text(text))
    }

    pub fn load_template(&mut self, name: &str) -> Result<bool> {
        let template =
            templates::find(name).ok_or_else(|| StudioError::UnknownTemplate(name.to_string()))?;
        log::info!("Loading template '{}'", template.name);
        self.model_label = "template".to_string();
        self.load_payload(&template.payload())
    }

    /// Fire the pending commit if its quiet period has elapsed
    pub fn poll(&mut self) -> bool {
        self.buffer.poll(Self::now())
    }

    /// Wait out the quiet period of a pending commit, then commit it
    pub async fn settle(&mut self) -> bool {
        match self.buffer.next_deadline() {
            Some(deadline) => {
                tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
                self.poll()
            }
            None => false,
        }
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.buffer.undo();
        if changed {
            self.refresh();
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.buffer.redo();
        if changed {
            self.refresh();
        }
        changed
    }

    /// Apply an editor shortcut; unbound chords and unavailable steps are no-ops
    pub fn handle_shortcut(&mut self, chord: &KeyChord) -> bool {
        match command_for(chord) {
            Some(EditorCommand::Undo) if self.can_undo() => self.undo(),
            Some(EditorCommand::Redo) if self.can_redo() => self.redo(),
            Some(_) | None => false,
        }
    }

    // Edit mode and drag-reorder

    pub fn set_edit_mode(&mut self, enabled: bool) {
        if !enabled {
            self.drag.drag_end();
        }
        self.edit_mode = enabled;
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn drag_start(&mut self, index: usize) {
        if self.edit_mode {
            self.drag.drag_start(index);
        }
    }

    pub fn drag_over(&mut self, index: usize) {
        self.drag.drag_over(index);
    }

    pub fn drag_enter(&mut self, index: usize) {
        self.drag.drag_enter(index);
    }

    pub fn drag_leave(&mut self, pointer_in_region: bool) {
        self.drag.drag_leave(pointer_in_region);
    }

    pub fn drag_end(&mut self) {
        self.drag.drag_end();
    }

    pub fn drag_state(&self) -> DragReorder {
        self.drag
    }

    /// Drop the dragged root child onto `target`, committing the new order
    ///
    /// Only children of a root `stack` or `grid` move, matching the drag
    /// handles the renderer shows. Returns whether the payload changed.
    pub fn drop(&mut self, target: usize) -> Result<bool> {
        let Ok(payload) = self.parsed.as_ref() else {
            self.drag.drag_end();
            return Ok(false);
        };
        let Some(widgets) = reorderable_root_widgets(payload) else {
            self.drag.drag_end();
            return Ok(false);
        };

        let mut reordered = None;
        self.drag
            .drop(target, widgets, |widgets| reordered = Some(widgets));
        let Some(widgets) = reordered else {
            return Ok(false);
        };

        let updated = with_root_widgets(payload, widgets)?;
        self.load_payload(&updated)
    }

    // Generation

    /// Mark a generation as in flight
    pub fn begin_generation(&mut self) -> Result<()> {
        if self.generating {
            log::warn!("Ignoring generation request while another is in flight");
            return Err(StudioError::GenerationInProgress);
        }
        self.generating = true;
        Ok(())
    }

    /// Load a generated payload and clear the in-flight flag
    pub fn finish_generation(&mut self, payload: &Value, model: ModelChoice) -> Result<bool> {
        self.generating = false;
        self.model_label = model.as_str().to_string();
        self.load_payload(payload)
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// Generate a widget from `prompt` and load it into the editor
    pub async fn generate(
        &mut self,
        generator: &dyn WidgetGenerator,
        prompt: &str,
        model: ModelChoice,
    ) -> Result<bool> {
        self.begin_generation()?;
        let payload = generator.generate(prompt, model).await;
        self.finish_generation(&payload, model)
    }

    // Outputs

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The last successfully parsed payload
    pub fn payload(&self) -> Option<&Value> {
        self.parsed.as_ref().ok()
    }

    pub fn can_undo(&self) -> bool {
        self.buffer.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.buffer.can_redo()
    }

    /// Render the current payload for the preview
    pub fn render(&self) -> RenderTree {
        let mut renderer = Renderer::new().with_actions(Arc::clone(&self.actions));
        if self.edit_mode {
            renderer = renderer.with_edit_mode(self.drag);
        }
        match &self.parsed {
            Ok(payload) => renderer.render(payload),
            Err(_) => renderer.render_nothing(),
        }
    }

    fn require_payload(&self) -> Result<&Value> {
        self.parsed
            .as_ref()
            .map_err(|err| EngineError::Parse(err.clone()).into())
    }

    pub async fn save<S: KeyValueStore>(&self, library: &WidgetLibrary<S>) -> Result<SavedWidget> {
        let payload = self.require_payload()?.clone();
        Ok(library.save(payload, self.model_label.clone()).await?)
    }

    /// Load a saved widget as a single undo step
    pub async fn open_saved<S: KeyValueStore>(
        &mut self,
        library: &WidgetLibrary<S>,
        id: &str,
    ) -> Result<bool> {
        let saved = library
            .get(id)
            .await
            .ok_or_else(|| StudioError::SavedWidgetNotFound(id.to_string()))?;
        self.model_label = saved.model.clone();
        self.load_payload(&saved.payload)
    }

    pub fn export(&self, format: ExportFormat) -> Result<Vec<u8>> {
        Ok(export::export(self.require_payload()?, format)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationError;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;
    use widget_engine::types::root_widgets;
    use widget_engine::RenderNode;

    fn session(initial: &str) -> StudioSession {
        StudioSession::new(&EditorConfig::default(), initial)
    }

    fn letters() -> String {
        json!({
            "type": "stack",
            "widgets": [
                {"type": "insight", "props": {"title": "A", "message": "a"}},
                {"type": "insight", "props": {"title": "B", "message": "b"}},
                {"type": "insight", "props": {"title": "C", "message": "c"}},
                {"type": "insight", "props": {"title": "D", "message": "d"}}
            ]
        })
        .to_string()
    }

    fn titles(session: &StudioSession) -> Vec<String> {
        root_widgets(session.payload().unwrap())
            .unwrap()
            .iter()
            .map(|w| w["props"]["title"].as_str().unwrap().to_string())
            .collect()
    }

    struct EchoGenerator;

    #[async_trait]
    impl WidgetGenerator for EchoGenerator {
        async fn try_generate(
            &self,
            prompt: &str,
            _model: ModelChoice,
        ) -> std::result::Result<Value, GenerationError> {
            Ok(json!({"type": "insight", "props": {"title": prompt, "message": "generated"}}))
        }
    }

    struct RecordingSink(Mutex<Vec<String>>);

    impl ActionSink for RecordingSink {
        fn on_action(&self, id: &str, _value: Value) {
            self.0.lock().push(id.to_string());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_is_debounced() {
        let mut s = session("{}");
        s.type_text("{\"a\"");
        tokio::time::advance(Duration::from_millis(200)).await;
        s.type_text("{\"a\": 1}");
        tokio::time::advance(Duration::from_millis(200)).await;
        assert!(!s.poll());
        assert_eq!(s.buffer().history().past().len(), 0);

        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(s.poll());
        assert_eq!(s.buffer().history().past().len(), 1);
        assert_eq!(s.text(), "{\"a\": 1}");
        assert!(s.diagnostics().lines().iter().any(|l| l.contains("INVALID_TYPE")
            || l.contains("MISSING_TYPE")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_commits_final_value() {
        let mut s = session("{}");
        s.type_text("[1");
        s.type_text("[1,");
        s.type_text("[1, 2]");
        assert!(s.settle().await);
        assert_eq!(s.buffer().history().past().len(), 1);
        assert!(!s.settle().await);

        assert!(s.undo());
        assert_eq!(s.text(), "{}");
    }

    #[tokio::test]
    async fn test_parse_errors_are_separate() {
        let mut s = session("{}");
        s.load_text("{\n  \"type\": \n}");
        match s.diagnostics() {
            Diagnostics::Parse(err) => assert_eq!(err.line, Some(3)),
            other => panic!("expected parse error, got {:?}", other),
        }
        assert!(s.payload().is_none());
        assert!(s.render().is_empty());
        assert!(s.export(ExportFormat::Json).is_err());
    }

    #[tokio::test]
    async fn test_template_and_undo_redo_shortcuts() {
        let mut s = session("{}");
        assert!(s.load_template("workout").unwrap());
        assert!(s.diagnostics().is_valid());

        assert!(s.handle_shortcut(&KeyChord::new("z").ctrl()));
        assert_eq!(s.text(), "{}");
        assert!(s.handle_shortcut(&"Cmd+Shift+Z".parse().unwrap()));
        assert!(s.text().contains("workout-card"));
        assert!(!s.handle_shortcut(&KeyChord::new("y").ctrl()));

        assert!(matches!(
            s.load_template("missing"),
            Err(StudioError::UnknownTemplate(_))
        ));
    }

    #[tokio::test]
    async fn test_drop_reorders_and_commits() {
        let mut s = session(&letters());
        s.set_edit_mode(true);
        s.drag_start(0);
        s.drag_over(2);
        assert!(s.drop(2).unwrap());
        assert_eq!(titles(&s), vec!["B", "C", "A", "D"]);
        assert!(!s.drag_state().is_active());

        assert!(s.undo());
        assert_eq!(titles(&s), vec!["A", "B", "C", "D"]);
    }

    #[tokio::test]
    async fn test_drop_on_own_index_is_noop() {
        let mut s = session(&letters());
        s.set_edit_mode(true);
        s.drag_start(1);
        assert!(!s.drop(1).unwrap());
        assert!(!s.can_undo());
    }

    #[tokio::test]
    async fn test_single_layout_is_not_reorderable() {
        let single = json!({
            "type": "single",
            "widgets": [
                {"type": "insight", "props": {"title": "A", "message": "a"}},
                {"type": "insight", "props": {"title": "B", "message": "b"}}
            ]
        });
        let mut s = session(&single.to_string());
        s.set_edit_mode(true);
        s.drag_start(0);
        assert!(!s.drop(1).unwrap());
        assert!(!s.drag_state().is_active());
        assert_eq!(titles(&s), vec!["A", "B"]);
        assert!(!s.can_undo());
        assert_eq!(s.render().components()[0].heading, "A");
    }

    #[tokio::test(start_paused = true)]
    async fn test_redo_shortcut_without_redo_keeps_draft() {
        let mut s = session("{}");
        s.type_text("{\"type\": \"stack\"");
        assert!(!s.can_redo());
        assert!(!s.handle_shortcut(&KeyChord::new("y").ctrl()));
        assert!(!s.handle_shortcut(&KeyChord::new("z").ctrl().shift()));
        assert!(s.buffer().is_pending());
        assert!(s.buffer().history().past().is_empty());
        assert_eq!(s.text(), "{\"type\": \"stack\"");
    }

    #[tokio::test]
    async fn test_drag_requires_edit_mode() {
        let mut s = session(&letters());
        s.drag_start(0);
        assert!(!s.drop(3).unwrap());
        assert_eq!(titles(&s), vec!["A", "B", "C", "D"]);
    }

    #[tokio::test]
    async fn test_edit_mode_render_wraps_children() {
        let mut s = session(&letters());
        s.set_edit_mode(true);
        s.drag_start(1);
        let tree = s.render();
        match tree.root.as_ref().unwrap() {
            RenderNode::Container { children, .. } => {
                assert_eq!(children.len(), 4);
                assert!(matches!(
                    children[1],
                    RenderNode::Draggable { dragging: true, .. }
                ));
            }
            other => panic!("expected container, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_loads_payload() {
        let mut s = session("{}");
        assert!(s
            .generate(&EchoGenerator, "Protein tip", ModelChoice::Thorough)
            .await
            .unwrap());
        assert_eq!(s.payload().unwrap()["props"]["title"], "Protein tip");
        assert!(!s.is_generating());
    }

    #[tokio::test]
    async fn test_generation_gate() {
        let mut s = session("{}");
        s.begin_generation().unwrap();
        assert!(matches!(
            s.generate(&EchoGenerator, "again", ModelChoice::Fast).await,
            Err(StudioError::GenerationInProgress)
        ));
        assert_eq!(s.text(), "{}");

        let payload = json!({"type": "rest-timer", "props": {"seconds": 60}});
        assert!(s.finish_generation(&payload, ModelChoice::Fast).unwrap());
        assert!(s.begin_generation().is_ok());
    }

    #[tokio::test]
    async fn test_save_and_reopen() {
        let library = WidgetLibrary::new(MemoryStore::new(), "test", 50);
        let mut s = session("{}");
        s.load_template("hydration").unwrap();
        let saved = s.save(&library).await.unwrap();
        assert_eq!(saved.model, "template");

        s.load_text("{}");
        assert!(s.open_saved(&library, &saved.id).await.unwrap());
        assert!(s.text().contains("water-tracker"));
        assert!(matches!(
            s.open_saved(&library, "nope").await,
            Err(StudioError::SavedWidgetNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_actions_reach_sink() {
        let sink = Arc::new(RecordingSink(Mutex::new(Vec::new())));
        let mut s = session("{}").with_actions(sink.clone());
        s.load_payload(&json!({"type": "water-tracker", "props": {"consumed": 1, "goal": 8}}))
            .unwrap();
        let tree = s.render();
        tree.dispatch("add-water", json!(1));
        assert_eq!(sink.0.lock().as_slice(), ["add-water".to_string()]);
    }
}
