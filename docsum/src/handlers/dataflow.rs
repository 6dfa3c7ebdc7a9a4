use super::{TileContext, TileHandler};
use crate::common::markdown::fenced;
use crate::error::HandlerError;
use crate::formats::graphviz::program_to_graphviz;
use crate::model::TileKind;

/// Dataflow tiles, with the program rendered as a `dot` fence.
pub struct DataflowHandler;

impl TileHandler for DataflowHandler {
    fn name(&self) -> &str {
        "dataflow"
    }

    fn description(&self) -> &str {
        "dataflow programs as Graphviz DOT"
    }

    fn summarize(&self, ctx: &TileContext<'_>) -> Result<Option<String>, HandlerError> {
        if ctx.tile.kind() != TileKind::Dataflow {
            return Ok(None);
        }

        let mut summary = "This tile contains a dataflow diagram.".to_string();
        if let Some(data_set) = ctx.data_set() {
            summary.push_str(&format!(
                " It records its values to the \"{}\" ({}) data set.",
                data_set.name, data_set.id
            ));
        }

        let program = ctx
            .tile
            .content()
            .and_then(|content| content.get("program"))
            .filter(|program| program.is_object());
        if let Some(program) = program {
            summary.push('\n');
            summary.push_str(&fenced("dot", &program_to_graphviz(program)));
        }
        Ok(Some(summary))
    }
}
