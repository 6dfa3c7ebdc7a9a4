//! Ordered tile handler chain
//!
//! Unlike a lookup table, order matters here: handlers are tried front to back and the first one
//! that recognizes a tile wins. Handlers are shared behind `Arc`, so cloning a chain (for nested
//! rendering or per-request overrides) is cheap.

use super::{
    DataflowHandler, DrawingHandler, DrawingSvgHandler, GraphHandler, ImageHandler,
    PlaceholderHandler, QuestionHandler, SimulatorHandler, TableHandler, TextHandler, TileHandler,
};
use crate::error::HandlerError;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct TileHandlers {
    handlers: Vec<Arc<dyn TileHandler>>,
}

impl TileHandlers {
    /// Create an empty chain. Every tile falls through to the generic describer.
    pub fn new() -> Self {
        TileHandlers {
            handlers: Vec::new(),
        }
    }

    /// The default chain, in dispatch order.
    pub fn with_defaults() -> Self {
        let mut handlers = Self::new();
        handlers.push(DataflowHandler);
        handlers.push(DrawingHandler);
        handlers.push(GraphHandler);
        handlers.push(ImageHandler);
        handlers.push(PlaceholderHandler);
        handlers.push(QuestionHandler);
        handlers.push(SimulatorHandler);
        handlers.push(TableHandler);
        handlers.push(TextHandler);
        handlers
    }

    /// Build a chain from handler names, in the given order.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, HandlerError> {
        let mut handlers = Self::new();
        for name in names {
            handlers.handlers.push(handler_by_name(name.as_ref())?);
        }
        Ok(handlers)
    }

    /// Append a handler to the end of the chain.
    pub fn push<H: TileHandler + 'static>(&mut self, handler: H) {
        self.handlers.push(Arc::new(handler));
    }

    /// Put `handler` in the slot of the handler called `name`.
    pub fn replace<H: TileHandler + 'static>(
        &mut self,
        name: &str,
        handler: H,
    ) -> Result<(), HandlerError> {
        let slot = self
            .handlers
            .iter_mut()
            .find(|existing| existing.name() == name)
            .ok_or_else(|| HandlerError::UnknownHandler(name.to_string()))?;
        *slot = Arc::new(handler);
        Ok(())
    }

    /// Swap the sentence-only drawing handler for the SVG-rendering one.
    pub fn with_drawing_svg(mut self) -> Self {
        if let Err(err) = self.replace("drawing", DrawingSvgHandler) {
            warn!(error = %err, "drawing-svg requested but the chain has no drawing handler");
        }
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.handlers.iter().map(|handler| handler.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn TileHandler> {
        self.handlers.iter().map(|handler| handler.as_ref())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for TileHandlers {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for TileHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Names accepted by [`handler_by_name`].
pub const HANDLER_NAMES: &[&str] = &[
    "dataflow",
    "drawing",
    "drawing-svg",
    "graph",
    "image",
    "placeholder",
    "question",
    "simulator",
    "table",
    "text",
];

/// Look up a built-in handler by name (case-insensitive).
pub fn handler_by_name(name: &str) -> Result<Arc<dyn TileHandler>, HandlerError> {
    let handler: Arc<dyn TileHandler> = match name.trim().to_ascii_lowercase().as_str() {
        "dataflow" => Arc::new(DataflowHandler),
        "drawing" => Arc::new(DrawingHandler),
        "drawing-svg" => Arc::new(DrawingSvgHandler),
        "graph" => Arc::new(GraphHandler),
        "image" => Arc::new(ImageHandler),
        "placeholder" => Arc::new(PlaceholderHandler),
        "question" => Arc::new(QuestionHandler),
        "simulator" => Arc::new(SimulatorHandler),
        "table" => Arc::new(TableHandler),
        "text" => Arc::new(TextHandler),
        _ => return Err(HandlerError::UnknownHandler(name.to_string())),
    };
    Ok(handler)
}
