//! Error types for the widget engine

use thiserror::Error;

use crate::parse::ParseError;

/// Result type alias using EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur in the widget engine
///
/// Validation problems are not errors: they are reported as data through
/// [`crate::ValidationResult`]. These variants cover the cases where the
/// engine cannot produce a value at all.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The editor text is not valid JSON
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// The payload root is not a layout
    #[error("Payload is not a layout")]
    NotALayout,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
