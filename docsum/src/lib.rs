//! Markdown summaries of classroom document snapshots
//!
//!     A document snapshot is a loosely typed JSON tree: rows laid out in `rowOrder`/`rowMap`,
//!     tiles in `tileMap`, and shared data sets and variables in `sharedModelMap`. Any of these
//!     may be missing or point at ids that do not exist. This crate turns such a snapshot into a
//!     single deterministic Markdown report, meant to be read by a language model.
//!
//!     This is a pure lib: it powers docsum-cli but makes no shell assumptions, that is no code
//!     here prints, reads environment variables or touches files. Diagnostics go through
//!     `tracing` and it is up to the caller to install a subscriber.
//!
//! Pipeline
//!
//!     input       -> canonical `serde_json::Value` (stringify, then parse)
//!     normalize   -> `Normalized`: numbered sections, rows and tiles, data sets in a flat arena
//!     handlers    -> one Markdown fragment per tile, first handler to claim the tile wins
//!     report      -> headings, preamble, body and the data set / variable appendices
//!
//!     The file structure :
//!     .
//!     ├── error.rs            # SummaryError, HandlerError
//!     ├── input.rs            # canonicalization
//!     ├── model.rs            # normalized model
//!     ├── normalize.rs        # snapshot -> model, resolve-or-skip
//!     ├── options.rs          # SummarizerOptions
//!     ├── report.rs           # report assembler
//!     ├── curriculum.rs       # curriculum content and per-tile chunks
//!     ├── handlers            # TileHandler trait, registry and one file per tile type
//!     ├── formats             # slate, describe, graphviz, svg sub-serializers
//!     └── common              # markdown and value rendering helpers
//!
//! Errors
//!
//!     Only three conditions reach the caller (see [`SummaryError`]) and all are raised before
//!     any output is produced. Dangling references are skipped during normalization. Handler
//!     failures are replaced by a fixed sentence in the report.
//!
//! Testing
//!
//!     tests
//!     ├── lib.rs
//!     ├── common              # fixture loading
//!     ├── fixtures            # <name>.json snapshots
//!     └── <area>.rs
//!
//!     Note that rust does not by default discover tests in subdirectories, so tests/lib.rs
//!     includes them.

pub mod common;
pub mod curriculum;
pub mod error;
pub mod formats;
pub mod handlers;
pub mod input;
pub mod model;
pub mod normalize;
pub mod options;
pub mod report;

pub use error::{HandlerError, SummaryError};
pub use handlers::{TileContext, TileHandler, TileHandlers};
pub use model::Normalized;
pub use normalize::normalize;
pub use options::SummarizerOptions;

use input::{parse_content, stringify_content};
use serde::Serialize;
use serde_json::Value;

/// JSON text (a `&str`, `String` or `Value::String`) is parsed as the document itself.
fn canonicalize<T: Serialize + ?Sized>(content: &T) -> Result<Value, SummaryError> {
    match parse_content(&stringify_content(content)?)? {
        Value::String(text) => parse_content(&text),
        value => Ok(value),
    }
}

/// Summarize a document snapshot given as any serializable value.
pub fn summarize_document<T: Serialize + ?Sized>(
    content: &T,
    options: &SummarizerOptions,
) -> Result<String, SummaryError> {
    let snapshot = canonicalize(content)?;
    Ok(report::summarize(&normalize(&snapshot), options))
}

/// Summarize a document snapshot given as JSON text.
pub fn summarize_str(content: &str, options: &SummarizerOptions) -> Result<String, SummaryError> {
    let snapshot = parse_content(content)?;
    Ok(report::summarize(&normalize(&snapshot), options))
}

/// Summarize authored curriculum content. See [`curriculum::summarize_curriculum`].
pub fn summarize_curriculum<T: Serialize + ?Sized>(
    content: &T,
    options: &SummarizerOptions,
) -> Result<String, SummaryError> {
    let content = canonicalize(content)?;
    Ok(curriculum::summarize_curriculum(&content, &[], None, options))
}

/// Split a document snapshot into per-tile and per-data-set Markdown chunks.
pub fn summarize_tiles<T: Serialize + ?Sized>(
    content: &T,
    options: &SummarizerOptions,
) -> Result<Vec<String>, SummaryError> {
    let snapshot = canonicalize(content)?;
    Ok(curriculum::summarize_tiles(&normalize(&snapshot), options))
}
