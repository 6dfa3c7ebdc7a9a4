use super::{TileContext, TileHandler};
use crate::error::HandlerError;
use crate::model::TileKind;

/// Placeholders hold a slot in the layout and contribute nothing.
pub struct PlaceholderHandler;

impl TileHandler for PlaceholderHandler {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn description(&self) -> &str {
        "placeholders, which produce no output"
    }

    fn summarize(&self, ctx: &TileContext<'_>) -> Result<Option<String>, HandlerError> {
        if ctx.tile.kind() != TileKind::Placeholder {
            return Ok(None);
        }
        Ok(Some(String::new()))
    }
}
