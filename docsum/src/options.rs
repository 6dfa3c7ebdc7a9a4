//! Summarizer options

use crate::handlers::TileHandlers;
use std::sync::OnceLock;

/// Controls the style of a summary.
///
/// - `include_model`: append the raw tile JSON for tile types no handler recognizes
/// - `minimal`: drop the explanatory prose and the row headings
/// - `tile_handlers`: replace the default handler chain
#[derive(Debug, Clone, Default)]
pub struct SummarizerOptions {
    pub include_model: bool,
    pub minimal: bool,
    pub tile_handlers: Option<TileHandlers>,
}

impl SummarizerOptions {
    pub fn minimal() -> Self {
        Self {
            minimal: true,
            ..Self::default()
        }
    }

    /// The handler chain in effect: the override if one is set, else the defaults.
    pub fn handlers(&self) -> &TileHandlers {
        static DEFAULTS: OnceLock<TileHandlers> = OnceLock::new();
        self.tile_handlers
            .as_ref()
            .unwrap_or_else(|| DEFAULTS.get_or_init(TileHandlers::with_defaults))
    }

    /// Options for nested content that is always rendered minimally (question prompts,
    /// curriculum tiles). The handler chain is kept.
    pub fn as_minimal(&self) -> Self {
        Self {
            include_model: false,
            minimal: true,
            tile_handlers: self.tile_handlers.clone(),
        }
    }
}
