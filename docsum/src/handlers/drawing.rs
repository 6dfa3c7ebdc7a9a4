use super::{TileContext, TileHandler};
use crate::common::markdown::fenced;
use crate::error::HandlerError;
use crate::formats::svg::drawing_to_svg;
use crate::model::TileKind;

pub struct DrawingHandler;

impl TileHandler for DrawingHandler {
    fn name(&self) -> &str {
        "drawing"
    }

    fn description(&self) -> &str {
        "drawings as a fixed sentence"
    }

    fn summarize(&self, ctx: &TileContext<'_>) -> Result<Option<String>, HandlerError> {
        if ctx.tile.kind() != TileKind::Drawing {
            return Ok(None);
        }
        Ok(Some("This tile contains a drawing.".to_string()))
    }
}

/// Drawing variant that also renders the shapes as an `svg` fence.
pub struct DrawingSvgHandler;

impl TileHandler for DrawingSvgHandler {
    fn name(&self) -> &str {
        "drawing-svg"
    }

    fn description(&self) -> &str {
        "drawings rendered as inline SVG"
    }

    fn summarize(&self, ctx: &TileContext<'_>) -> Result<Option<String>, HandlerError> {
        if ctx.tile.kind() != TileKind::Drawing {
            return Ok(None);
        }
        let svg = ctx.tile.content().map(drawing_to_svg).unwrap_or_default();
        Ok(Some(format!(
            "This tile contains a drawing. The drawing is rendered below in an svg code fence:\n\n{}",
            fenced("svg", &svg)
        )))
    }
}
