//! Parsing of editor text into JSON values
//!
//! Parse errors are surfaced on their own channel, separate from
//! validation diagnostics, and carry a best-effort source location.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON syntax error in the editor text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseError {
    /// Parser message without the location suffix
    pub message: String,
    /// 1-based line of the error, if the parser reported one
    pub line: Option<usize>,
    /// 1-based column of the error, if the parser reported one
    pub column: Option<usize>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "JSON parse error on line {}: {}", line, self.message),
            None => write!(f, "JSON parse error: {}", self.message),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        let full = err.to_string();
        // serde_json appends " at line L column C"; keep the message itself
        let message = match full.rfind(" at line ") {
            Some(idx) => full[..idx].to_string(),
            None => full,
        };
        let line = (err.line() > 0).then(|| err.line());
        let column = (err.line() > 0).then(|| err.column().max(1));
        Self {
            message,
            line,
            column,
        }
    }
}

/// Parse editor text into a JSON value
pub fn parse_document(text: &str) -> Result<Value, ParseError> {
    serde_json::from_str(text).map_err(ParseError::from)
}
