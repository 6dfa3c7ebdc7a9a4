//! Question tiles
//!
//! A question is a small document of its own: `rowOrder`/`rowMap` inside the tile content, with
//! tile ids that resolve through the document's tile map. The first tile of the first row is the
//! prompt; every later row is a response row. Response rows go through the same row renderer
//! as the document body, one heading level deeper and prefixed `Response`.

use super::{TileContext, TileHandler};
use crate::common::markdown::heading;
use crate::common::values::scalar_text;
use crate::error::HandlerError;
use crate::model::{NormalizedRow, NormalizedTile, TileKind};
use crate::normalize::resolve_tiles;
use crate::report::{rows_summary, tile_summary, RenderScope};
use serde_json::Value;

/// Deepest allowed nesting of questions within questions.
pub const MAX_NESTING_DEPTH: usize = 8;

pub struct QuestionHandler;

impl TileHandler for QuestionHandler {
    fn name(&self) -> &str {
        "question"
    }

    fn description(&self) -> &str {
        "questions with their prompt and response rows"
    }

    fn summarize(&self, ctx: &TileContext<'_>) -> Result<Option<String>, HandlerError> {
        if ctx.tile.kind() != TileKind::Question {
            return Ok(None);
        }
        if ctx.depth >= MAX_NESTING_DEPTH {
            return Err(HandlerError::NestingTooDeep(MAX_NESTING_DEPTH));
        }
        let content = ctx.tile.content().unwrap_or(&Value::Null);

        let question_id = content
            .get("questionId")
            .and_then(scalar_text)
            .unwrap_or_default();
        let mut result = format!(
            "This is a question for students to answer. Its question id is `{question_id}`. \
             This question id can be used to match up student responses to the same question.\n\n"
        );

        let row_order: Vec<&str> = content
            .get("rowOrder")
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let row_map = content.get("rowMap").and_then(Value::as_object);
        let row = |id: &str| row_map.and_then(|rows| rows.get(id));

        if row_order.len() < 2 {
            result.push_str("This question does not contain any response tiles.\n\n");
        }

        let prompt = row_order
            .first()
            .and_then(|id| row(*id))
            .and_then(|row| row.get("tiles"))
            .and_then(|tiles| tiles.get(0))
            .and_then(|tile_ref| tile_ref.get("tileId"))
            .and_then(Value::as_str)
            .and_then(|id| ctx.tile_map?.get(id))
            .filter(|tile| tile.get("content").is_some());

        if let Some(prompt) = prompt {
            let prompt_tile = NormalizedTile::new(prompt.clone(), 0);
            let prompt_options = ctx.options.as_minimal();
            let prompt_ctx = TileContext {
                tile: &prompt_tile,
                data_sets: ctx.data_sets,
                tile_map: ctx.tile_map,
                heading_level: ctx.heading_level,
                options: &prompt_options,
                depth: ctx.depth + 1,
            };
            result.push_str(&heading(ctx.heading_level, "Question Prompt"));
            result.push_str(&tile_summary(&prompt_ctx));
            result.push_str("\n\n");
        }

        if row_order.len() < 2 {
            return Ok(Some(result));
        }

        let mut tile_number = 0;
        let responses: Vec<NormalizedRow> = row_order[1..]
            .iter()
            .filter_map(|id| row(*id))
            .enumerate()
            .map(|(index, row)| {
                let tile_refs = row
                    .get("tiles")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let tiles = ctx
                    .tile_map
                    .map(|tile_map| {
                        resolve_tiles(tile_refs, tile_map)
                            .map(|model| {
                                tile_number += 1;
                                NormalizedTile::new(model.clone(), tile_number)
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                NormalizedRow {
                    tiles,
                    number: index + 1,
                }
            })
            .collect();

        let scope = RenderScope {
            data_sets: ctx.data_sets,
            tile_map: ctx.tile_map,
            options: ctx.options,
            depth: ctx.depth + 1,
        };
        result.push_str(&heading(ctx.heading_level, "Question Response"));
        result.push_str(&rows_summary(
            &responses,
            "Response ",
            &scope,
            ctx.heading_level + 1,
        ));
        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::SummarizerOptions;
    use serde_json::json;

    fn question(id: &str, rows: Vec<(&str, Vec<&str>)>) -> Value {
        let row_order: Vec<&str> = rows.iter().map(|(row, _)| *row).collect();
        let mut row_map = serde_json::Map::new();
        for (row, tiles) in &rows {
            let refs: Vec<Value> = tiles.iter().map(|t| json!({"tileId": t})).collect();
            row_map.insert(row.to_string(), json!({"id": row, "tiles": refs}));
        }
        json!({"id": id, "content": {
            "type": "Question", "questionId": format!("q-{id}"),
            "rowOrder": row_order, "rowMap": row_map
        }})
    }

    fn text(id: &str, body: &str) -> Value {
        json!({"id": id, "content": {"type": "Text", "format": "markdown", "text": body}})
    }

    fn run(tile: Value, tile_map: &serde_json::Map<String, Value>, depth: usize) -> Result<Option<String>, HandlerError> {
        let tile = NormalizedTile::new(tile, 1);
        let options = SummarizerOptions::default();
        let ctx = TileContext {
            tile: &tile,
            data_sets: &[],
            tile_map: Some(tile_map),
            heading_level: 4,
            options: &options,
            depth,
        };
        QuestionHandler.summarize(&ctx)
    }

    #[test]
    fn test_prompt_and_responses() {
        let mut tile_map = serde_json::Map::new();
        tile_map.insert("p".to_string(), text("p", "What grows?"));
        tile_map.insert("r".to_string(), text("r", "Plants"));
        let out = run(question("q1", vec![("row1", vec!["p"]), ("row2", vec!["r", "missing"])]), &tile_map, 0)
            .unwrap()
            .unwrap();

        assert!(out.starts_with("This is a question for students to answer. Its question id is `q-q1`."));
        assert!(out.contains("#### Question Prompt\n\n```text\nWhat grows?\n```\n\n"));
        assert!(out.contains("#### Question Response\n\n##### Response Row 1\n\n###### Tile 1\n\n"));
        assert!(out.contains("```text\nPlants\n```"));
        assert!(!out.contains("does not contain any response tiles"));
    }

    #[test]
    fn test_prompt_only() {
        let mut tile_map = serde_json::Map::new();
        tile_map.insert("p".to_string(), text("p", "Explain."));
        let out = run(question("q1", vec![("row1", vec!["p"])]), &tile_map, 0)
            .unwrap()
            .unwrap();
        assert!(out.contains("This question does not contain any response tiles.\n\n"));
        assert!(out.ends_with("```text\nExplain.\n```\n\n"));
        assert!(!out.contains("Question Response"));
    }

    #[test]
    fn test_nesting_limit() {
        let tile_map = serde_json::Map::new();
        let err = run(question("q1", vec![]), &tile_map, MAX_NESTING_DEPTH).unwrap_err();
        assert_eq!(err, HandlerError::NestingTooDeep(MAX_NESTING_DEPTH));
    }

    #[test]
    fn test_self_referencing_question_terminates() {
        let mut tile_map = serde_json::Map::new();
        let looped = question("q1", vec![("row1", vec![]), ("row2", vec!["q1"])]);
        tile_map.insert("q1".to_string(), looped.clone());
        let out = run(looped, &tile_map, 0).unwrap().unwrap();
        assert!(out.contains("An error occurred while generating the description."));
    }
}
