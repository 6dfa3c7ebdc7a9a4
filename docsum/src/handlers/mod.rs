//! Tile handlers
//!
//! A handler turns one tile into a Markdown fragment. Dispatch is a pure type-tag predicate: each
//! handler checks the tile's content kind and declines (`Ok(None)`) anything it does not own.
//! `Ok(Some(""))` means "mine, but emit nothing", which suppresses the tile entirely.
//!
//! Handlers are tried in chain order (see [`TileHandlers`]); the first `Some` wins. A tile that
//! nobody claims goes to the generic describer in [`crate::report::tile_summary`].

use crate::error::HandlerError;
use crate::model::{NormalizedDataSet, NormalizedTile, TileMap};
use crate::options::SummarizerOptions;

mod dataflow;
mod drawing;
mod graph;
mod image;
mod placeholder;
mod question;
mod registry;
mod simulator;
mod table;
mod text;

pub use dataflow::DataflowHandler;
pub use drawing::{DrawingHandler, DrawingSvgHandler};
pub use graph::GraphHandler;
pub use image::ImageHandler;
pub use placeholder::PlaceholderHandler;
pub use question::{QuestionHandler, MAX_NESTING_DEPTH};
pub use registry::{handler_by_name, TileHandlers, HANDLER_NAMES};
pub use simulator::SimulatorHandler;
pub use table::TableHandler;
pub use text::TextHandler;

/// Everything a handler may look at for one tile.
#[derive(Debug, Clone, Copy)]
pub struct TileContext<'a> {
    pub tile: &'a NormalizedTile,
    pub data_sets: &'a [NormalizedDataSet],
    /// Raw tiles by id, for content that nests other tiles
    pub tile_map: Option<&'a TileMap>,
    /// Level for headings the handler emits itself, one below the tile heading
    pub heading_level: usize,
    pub options: &'a SummarizerOptions,
    /// Number of enclosing nested renderings
    pub depth: usize,
}

impl<'a> TileContext<'a> {
    /// The data set attached to this tile, if any.
    pub fn data_set(&self) -> Option<&'a NormalizedDataSet> {
        self.tile
            .data_set
            .and_then(|index| self.data_sets.get(index))
    }
}

/// A handler for one tile content kind.
pub trait TileHandler: Send + Sync {
    /// Registry name, e.g. `"text"`
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Summarize the tile, or return `Ok(None)` if it is not this handler's kind.
    fn summarize(&self, ctx: &TileContext<'_>) -> Result<Option<String>, HandlerError>;
}
