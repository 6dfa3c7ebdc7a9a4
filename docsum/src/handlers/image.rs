use super::{TileContext, TileHandler};
use crate::error::HandlerError;
use crate::model::TileKind;

pub struct ImageHandler;

impl TileHandler for ImageHandler {
    fn name(&self) -> &str {
        "image"
    }

    fn description(&self) -> &str {
        "static images"
    }

    fn summarize(&self, ctx: &TileContext<'_>) -> Result<Option<String>, HandlerError> {
        if ctx.tile.kind() != TileKind::Image {
            return Ok(None);
        }
        if ctx.options.minimal {
            return Ok(Some(String::new()));
        }
        Ok(Some(
            "This tile contains a static image. No additional information is available."
                .to_string(),
        ))
    }
}
