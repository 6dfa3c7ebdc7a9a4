//! Error types for summarization

use std::fmt;

/// Errors that can escape a summarization run.
///
/// All of them are raised before any output is produced. Everything else (dangling references,
/// unknown tile types, handler failures) is recovered locally and rendered as degraded text.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryError {
    /// The input value could not be serialized to JSON
    InvalidInput(String),
    /// The input text is not valid JSON
    Parse(String),
    /// A rich-text tree has no recognizable root
    MalformedTree(String),
}

impl fmt::Display for SummaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryError::InvalidInput(msg) => write!(f, "Invalid input to summarizer: {msg}"),
            SummaryError::Parse(msg) => write!(f, "Failed to parse content in summarizer: {msg}"),
            SummaryError::MalformedTree(msg) => write!(f, "Malformed rich-text tree: {msg}"),
        }
    }
}

impl std::error::Error for SummaryError {}

/// Errors raised by tile handlers and handler lookups.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerError {
    /// No handler with this name exists
    UnknownHandler(String),
    /// A handler recognized the tile but could not decode its content
    InvalidContent(String),
    /// Nested tiles (questions inside questions) went deeper than allowed
    NestingTooDeep(usize),
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerError::UnknownHandler(name) => write!(f, "Tile handler '{name}' not found"),
            HandlerError::InvalidContent(msg) => write!(f, "Invalid tile content: {msg}"),
            HandlerError::NestingTooDeep(depth) => {
                write!(f, "Tile nesting exceeds the maximum depth of {depth}")
            }
        }
    }
}

impl std::error::Error for HandlerError {}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::InvalidContent(err.to_string())
    }
}
