//! Alternate entry points: authored curriculum content and per-tile chunks.

use crate::common::markdown::{generate_markdown_table, heading};
use crate::handlers::TileContext;
use crate::model::{Normalized, NormalizedDataSet, NormalizedTile, TileMap};
use crate::options::SummarizerOptions;
use crate::report::{tile_summary, RenderScope};
use serde_json::Value;
use tracing::warn;

/// Summarize authored curriculum content.
///
/// Accepts a `{ "tiles": ... }` wrapper, an array of items, or a single tile (anything with a
/// `content` key), recursively. Every tile is rendered minimally, without a heading. Items that
/// match none of these shapes are logged and skipped.
pub fn summarize_curriculum(
    content: &Value,
    data_sets: &[NormalizedDataSet],
    tile_map: Option<&TileMap>,
    options: &SummarizerOptions,
) -> String {
    if let Some(tiles) = content.get("tiles") {
        return summarize_curriculum(tiles, data_sets, tile_map, options);
    }

    if let Some(items) = content.as_array() {
        return items
            .iter()
            .map(|item| summarize_curriculum(item, data_sets, tile_map, options))
            .collect::<Vec<_>>()
            .join("\n\n");
    }

    if content.get("content").is_some() {
        let tile = NormalizedTile::new(content.clone(), 0);
        let minimal = options.as_minimal();
        return tile_summary(&TileContext {
            tile: &tile,
            data_sets,
            tile_map,
            heading_level: 1,
            options: &minimal,
            depth: 0,
        });
    }

    warn!(content = %content, "unparsable curriculum content");
    String::new()
}

/// One Markdown chunk per tile with output, followed by one chunk per data set.
pub fn summarize_tiles(normalized: &Normalized, options: &SummarizerOptions) -> Vec<String> {
    let chunk_options = SummarizerOptions {
        include_model: false,
        ..options.clone()
    };
    let scope = RenderScope::new(normalized, &chunk_options);

    let mut chunks: Vec<String> = normalized
        .model
        .tiles()
        .filter_map(|tile| {
            let summary = tile_summary(&TileContext {
                tile,
                data_sets: scope.data_sets,
                tile_map: scope.tile_map,
                heading_level: 3,
                options: scope.options,
                depth: 0,
            });
            if summary.is_empty() {
                return None;
            }
            let title = match tile.title() {
                Some(title) => format!("Tile {} ({title})", tile.number),
                None => format!("Tile {}", tile.number),
            };
            Some(heading(2, &title) + &summary)
        })
        .collect();

    chunks.extend(normalized.model.data_sets.iter().map(|data_set| {
        let names: Vec<&str> = data_set.attributes.iter().map(|a| a.name.as_str()).collect();
        heading(2, &format!("Dataset: {}", data_set.name))
            + &generate_markdown_table(&names, &data_set.data)
    }));

    chunks
}
