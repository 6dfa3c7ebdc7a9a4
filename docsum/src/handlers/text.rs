use super::{TileContext, TileHandler};
use crate::common::markdown::fenced;
use crate::error::HandlerError;
use crate::formats::slate::slate_to_markdown;
use crate::model::TileKind;
use tracing::warn;

/// Text tiles in `slate`, `markdown` or plain format, shown in a `text` fence.
pub struct TextHandler;

impl TileHandler for TextHandler {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "text in slate, markdown or plain format"
    }

    fn summarize(&self, ctx: &TileContext<'_>) -> Result<Option<String>, HandlerError> {
        if ctx.tile.kind() != TileKind::Text {
            return Ok(None);
        }

        let raw = ctx.tile.content_str("text").unwrap_or_default();
        let format = ctx.tile.content_str("format");
        let (label, body) = match format {
            Some("slate") => {
                let body = slate_to_markdown(raw).unwrap_or_else(|err| {
                    warn!(tile = ctx.tile.id(), error = %err, "falling back to raw slate text");
                    raw.to_string()
                });
                ("Markdown", body)
            }
            Some("markdown") => ("Markdown", raw.to_string()),
            Some(other) if !other.is_empty() => (other, raw.to_string()),
            _ => ("plain", raw.to_string()),
        };

        let fence = fenced("text", &body);
        if ctx.options.minimal {
            return Ok(Some(fence));
        }
        Ok(Some(format!(
            "This tile contains the following {label} text content delimited below by a text code fence:\n\n{fence}"
        )))
    }
}
