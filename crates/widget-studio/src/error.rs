//! Error types for the studio host

use thiserror::Error;
use widget_engine::EngineError;

use crate::config::ConfigError;
use crate::export::ExportError;
use crate::generation::GenerationError;
use crate::storage::StorageError;

/// Result type alias using StudioError
pub type Result<T> = std::result::Result<T, StudioError>;

/// Errors surfaced by the studio session and CLI
#[derive(Debug, Error)]
pub enum StudioError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// A generation request is already outstanding
    #[error("A widget is already being generated")]
    GenerationInProgress,

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Saved widget not found: {0}")]
    SavedWidgetNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
