//! Widget Studio host
//!
//! Everything around the [`widget_engine`] core that touches the outside
//! world: configuration on disk, LLM-backed widget generation, the saved
//! widget library, exports, starter templates and keyboard shortcuts.
//! [`StudioSession`] ties these to the engine's editor buffer.

pub mod config;
pub mod error;
pub mod export;
pub mod generation;
pub mod session;
pub mod shortcuts;
pub mod storage;
pub mod templates;

pub use config::{ConfigError, StudioConfig};
pub use error::{Result, StudioError};
pub use export::{ExportError, ExportFormat};
pub use generation::{GenerationError, HttpGenerator, ModelChoice, WidgetGenerator};
pub use session::{Diagnostics, StudioSession};
pub use shortcuts::{EditorCommand, KeyChord};
pub use storage::{FileStore, KeyValueStore, MemoryStore, SavedWidget, WidgetLibrary};
