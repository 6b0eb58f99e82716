//! Widget Engine - JSON-driven widget rendering for Widget Studio
//!
//! This crate takes an arbitrary, possibly malformed JSON document describing
//! a fitness-app widget (or a layout of widgets) and provides:
//!
//! - A closed catalog of widget kinds with one prop validator per kind
//! - Path-addressed validation of whole payload trees
//! - A tolerant renderer that maps payloads to a render tree
//! - An undo/redo history over the JSON source with debounced commits
//! - A drag-reorder coordinator for editing layout children
//!
//! # Architecture
//!
//! The raw JSON text lives in an [`EditBuffer`]. Every revision is parsed
//! with [`parse_document`], then handed independently to [`validate`] for
//! diagnostics and to [`Renderer`] for the live preview. Validation never
//! gates rendering: a bad subtree renders as a placeholder.
//!
//! # Example
//!
//! ```ignore
//! use widget_engine::{parse_document, validate, Renderer};
//!
//! let value = parse_document(r#"{"type":"progress-ring","props":{"label":"Steps","value":4200,"goal":10000}}"#)?;
//! let result = validate(&value);
//! assert!(result.valid);
//! let tree = Renderer::new().render(&value);
//! ```

pub mod catalog;
pub mod constants;
pub mod editor;
pub mod error;
pub mod history;
pub mod parse;
pub mod props;
pub mod render;
pub mod reorder;
pub mod types;
pub mod validation;

// Re-export key types
pub use catalog::{lookup, Schema};
pub use editor::EditBuffer;
pub use error::{EngineError, Result};
pub use history::HistoryState;
pub use parse::{parse_document, ParseError};
pub use props::{WidgetKind, WidgetProps};
pub use render::{
    ActionBinding, ActionSink, Component, NullActionSink, RenderNode, RenderTree, Renderer,
};
pub use reorder::DragReorder;
pub use types::{Direction, LayoutType, PayloadNode, WidgetLayout, WidgetNode, WidgetPayload};
pub use validation::{validate, ErrorCode, ValidationError, ValidationResult};
