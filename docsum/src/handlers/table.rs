use super::{TileContext, TileHandler};
use crate::error::HandlerError;
use crate::model::TileKind;

/// Table tiles. The cells themselves are listed in the data set appendix.
pub struct TableHandler;

impl TileHandler for TableHandler {
    fn name(&self) -> &str {
        "table"
    }

    fn description(&self) -> &str {
        "tables and their linked data set"
    }

    fn summarize(&self, ctx: &TileContext<'_>) -> Result<Option<String>, HandlerError> {
        if ctx.tile.kind() != TileKind::Table {
            return Ok(None);
        }
        let summary = match ctx.data_set() {
            Some(data_set) => format!(
                "This tile contains a table which uses the \"{}\" ({}) data set.",
                data_set.name, data_set.id
            ),
            None => "This tile contains a table.".to_string(),
        };
        Ok(Some(summary))
    }
}
