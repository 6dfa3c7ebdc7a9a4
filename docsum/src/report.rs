//! Report assembler
//!
//! Stitches the normalized model into one Markdown document. Heading depth depends on the
//! document shape:
//!
//!     shape                 section  row  tile
//!     unsectioned              -      2     3
//!     sectioned                2      3     4
//!
//! In minimal mode row headings are dropped and tiles move up one level. The document heading is
//! always level 1, and the data set and variable appendices sit at level 2.

use crate::common::markdown::{
    generate_attributes_markdown_table, generate_markdown_table,
    generate_variables_markdown_table, heading, pluralize,
};
use crate::formats::describe::describe_tile_content;
use crate::handlers::TileContext;
use crate::model::{
    Normalized, NormalizedDataSet, NormalizedModel, NormalizedRow, NormalizedTile,
    NormalizedVariable, TileMap,
};
use crate::options::SummarizerOptions;
use serde_json::{json, Value};
use tracing::warn;

pub const DOCUMENT_HEADING: &str = "Document Summary";
pub const END_HEADING: &str = "End of Document Summary";
pub const HANDLER_ERROR: &str = "An error occurred while generating the description.";

const EMPTY_PREAMBLE: &str = "This is an empty document with no content.";
const ROWS_PREAMBLE: &str =
    "The document consists of one or more rows, with one or more tiles within each row.";
const SECTIONS_PREAMBLE: &str = "The document consists of one or more sections containing one or more rows, with one or more tiles within each row.";

/// The document-wide state every tile rendering shares.
#[derive(Debug, Clone, Copy)]
pub struct RenderScope<'a> {
    pub data_sets: &'a [NormalizedDataSet],
    pub tile_map: Option<&'a TileMap>,
    pub options: &'a SummarizerOptions,
    /// Number of enclosing nested renderings
    pub depth: usize,
}

impl<'a> RenderScope<'a> {
    pub fn new(normalized: &'a Normalized, options: &'a SummarizerOptions) -> Self {
        RenderScope {
            data_sets: &normalized.model.data_sets,
            tile_map: normalized.tile_map.as_ref(),
            options,
            depth: 0,
        }
    }

    fn context<'t>(&self, tile: &'t NormalizedTile, heading_level: usize) -> TileContext<'t>
    where
        'a: 't,
    {
        TileContext {
            tile,
            data_sets: self.data_sets,
            tile_map: self.tile_map,
            heading_level,
            options: self.options,
            depth: self.depth,
        }
    }
}

/// Render a normalized document.
pub fn summarize(normalized: &Normalized, options: &SummarizerOptions) -> String {
    let model = &normalized.model;
    let scope = RenderScope::new(normalized, options);

    let (preamble, summary) = if model.sections.is_empty() {
        (EMPTY_PREAMBLE, String::new())
    } else if model.is_unsectioned() {
        (
            ROWS_PREAMBLE,
            rows_summary(&model.sections[0].rows, "", &scope, 2),
        )
    } else {
        (SECTIONS_PREAMBLE, sections_summary(model, &scope, 2))
    };

    document_summary(preamble, model, &summary, options, 1)
}

/// Wrap a rendered body with the document heading, preamble and appendices.
pub fn document_summary(
    preamble: &str,
    model: &NormalizedModel,
    summary: &str,
    options: &SummarizerOptions,
    heading_level: usize,
) -> String {
    let has_summary = !summary.is_empty();
    let data_sets = &model.data_sets;

    let extra = if options.minimal {
        String::new()
    } else if has_summary {
        let mut intro = format!(
            "The markdown below summarizes the document's structure and content.  {preamble} \
             Tiles are either static UI elements or interactive elements that students can use."
        );
        if !data_sets.is_empty() {
            intro.push_str(&format!(
                "  The document contains {} {} which {} listed at the end of this summary under the \"Data Sets\" heading.",
                data_sets.len(),
                pluralize(data_sets.len(), "data set", "data sets"),
                pluralize(data_sets.len(), "is", "are")
            ));
        }
        intro + "\n\n"
    } else {
        format!("{preamble}\n\n")
    };

    let data_sets_appendix = if has_summary && !data_sets.is_empty() {
        format!(
            "\n{}{}",
            heading(heading_level + 1, "Data Sets"),
            data_sets
                .iter()
                .map(|data_set| data_set_summary(data_set, heading_level + 2))
                .collect::<Vec<_>>()
                .join("\n\n")
        )
    } else {
        String::new()
    };

    let variables_appendix = if has_summary && !model.variables.is_empty() {
        variables_summary(&model.variables, heading_level + 1)
    } else {
        String::new()
    };

    format!(
        "{}{extra}{summary}\n{data_sets_appendix}\n{variables_appendix}\n{}",
        heading(heading_level, DOCUMENT_HEADING),
        heading(heading_level, END_HEADING)
    )
}

fn data_set_summary(data_set: &NormalizedDataSet, heading_level: usize) -> String {
    if data_set.tile_ids.is_empty() {
        return String::new();
    }

    let mut formulas = String::new();
    for attr in &data_set.attributes {
        if let Some(formula) = &attr.formula {
            formulas.push_str(&format!(
                "- Column \"{}\" is calculated by the formula `{formula}`.\n",
                attr.name
            ));
        }
    }
    if !formulas.is_empty() {
        formulas.push('\n');
    }

    let tiles = data_set.tile_ids.len();
    let attributes = data_set.attributes.len();
    let cases = data_set.num_cases;
    let names: Vec<&str> = data_set.attributes.iter().map(|a| a.name.as_str()).collect();

    format!(
        "{}This data set has an id of {} and is used in {tiles} {}.\n\
         It contains {attributes} {}, described in the following Markdown table.\n\n\
         {}\n\n\
         {formulas}\
         There are {cases} {} in this data set, shown below in a Markdown table.\n\n\
         {}\n",
        heading(heading_level, &data_set.name),
        data_set.id,
        pluralize(tiles, "tile", "tiles"),
        pluralize(attributes, "attribute", "attributes"),
        generate_attributes_markdown_table(&data_set.attributes),
        pluralize(cases, "case", "cases"),
        generate_markdown_table(&names, &data_set.data)
    )
}

fn variables_summary(variables: &[NormalizedVariable], heading_level: usize) -> String {
    format!(
        "\n{}The document contains {} {}:\n\n{}\n\n",
        heading(heading_level, "Shared Variables"),
        variables.len(),
        pluralize(variables.len(), "variable", "variables"),
        generate_variables_markdown_table(variables)
    )
}

pub fn sections_summary(model: &NormalizedModel, scope: &RenderScope, heading_level: usize) -> String {
    model
        .sections
        .iter()
        .enumerate()
        .map(|(index, section)| {
            let title = match &section.section_id {
                Some(id) => format!("Section {} ({id})", index + 1),
                None => format!("Section {}", index + 1),
            };
            heading(heading_level, &title)
                + &rows_summary(&section.rows, "", scope, heading_level + 1)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render rows. `prefix` goes in front of each row heading, e.g. `Response `.
pub fn rows_summary(
    rows: &[NormalizedRow],
    prefix: &str,
    scope: &RenderScope,
    heading_level: usize,
) -> String {
    rows.iter()
        .map(|row| {
            if scope.options.minimal {
                tiles_summary(&row.tiles, scope, heading_level)
            } else {
                heading(heading_level, &format!("{prefix}Row {}", row.number))
                    + &tiles_summary(&row.tiles, scope, heading_level + 1)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render tiles under `Tile N (title)` headings. Tiles with no output are left out entirely.
pub fn tiles_summary(tiles: &[NormalizedTile], scope: &RenderScope, heading_level: usize) -> String {
    tiles
        .iter()
        .filter_map(|tile| {
            let summary = tile_summary(&scope.context(tile, heading_level + 1));
            if summary.is_empty() {
                return None;
            }
            let title = match tile.title() {
                Some(title) => format!("Tile {} ({title})", tile.number),
                None => format!("Tile {}", tile.number),
            };
            Some(heading(heading_level, &title) + &summary)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Run the handler chain on one tile, falling back to the generic describer.
pub fn tile_summary(ctx: &TileContext<'_>) -> String {
    for handler in ctx.options.handlers().iter() {
        match handler.summarize(ctx) {
            Ok(Some(summary)) => return summary,
            Ok(None) => continue,
            Err(err) => {
                warn!(
                    handler = handler.name(),
                    tile = ctx.tile.id(),
                    error = %err,
                    "tile handler failed"
                );
                return HANDLER_ERROR.to_string();
            }
        }
    }
    generic_summary(ctx)
}

fn generic_summary(ctx: &TileContext<'_>) -> String {
    let content = ctx.tile.content().unwrap_or(&Value::Null);
    let description = match describe_tile_content(content) {
        Ok(described) if described.markdown.is_empty() => described.description,
        Ok(described) => format!("{}\n\n{}", described.description, described.markdown),
        Err(err) => {
            warn!(tile = ctx.tile.id(), error = %err, "could not describe tile content");
            HANDLER_ERROR.to_string()
        }
    };

    let mut summary = format!(
        "This tile contains {} content.\n\n{description}",
        ctx.tile.content_type().to_lowercase()
    );
    if ctx.options.include_model {
        let mut model = json!({"model": ctx.tile.model, "number": ctx.tile.number});
        if let Some(data_set) = ctx.data_set() {
            if let (Some(object), Ok(value)) = (model.as_object_mut(), serde_json::to_value(data_set)) {
                object.insert("sharedDataSet".to_string(), value);
            }
        }
        summary.push_str("\n\n");
        summary.push_str(&model.to_string());
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use serde_json::json;

    fn one_tile(content: Value) -> Normalized {
        normalize(&json!({
            "rowOrder": ["r1"],
            "rowMap": {"r1": {"tiles": [{"tileId": "t1"}]}},
            "tileMap": {"t1": {"id": "t1", "content": content}}
        }))
    }

    #[test]
    fn test_empty_document() {
        let out = summarize(&normalize(&json!({})), &SummarizerOptions::default());
        assert_eq!(
            out,
            "# Document Summary\n\nThis is an empty document with no content.\n\n\n\n\n# End of Document Summary\n\n"
        );

        let out = summarize(&normalize(&json!({})), &SummarizerOptions::minimal());
        assert_eq!(out, "# Document Summary\n\n\n\n\n# End of Document Summary\n\n");
    }

    #[test]
    fn test_unknown_type_falls_back_to_describer() {
        let normalized = one_tile(json!({"type": "Numberline", "min": 0, "visible": true}));
        let out = summarize(&normalized, &SummarizerOptions::default());
        assert!(out.contains(
            "### Tile 1\n\nThis tile contains numberline content.\n\nThe min is 0 and it is visible.\n\n- `min`: 0\n- `visible`: true"
        ));
        assert!(!out.contains("{\"model\""));
    }

    #[test]
    fn test_include_model_embeds_tile_json() {
        let normalized = one_tile(json!({"type": "Numberline"}));
        let options = SummarizerOptions {
            include_model: true,
            ..SummarizerOptions::default()
        };
        let out = summarize(&normalized, &options);
        assert!(out.contains(
            r#"{"model":{"id":"t1","content":{"type":"Numberline"}},"number":1}"#
        ));
    }

    #[test]
    fn test_include_model_ignored_for_handled_tiles() {
        let normalized = one_tile(json!({"type": "Image"}));
        let options = SummarizerOptions {
            include_model: true,
            ..SummarizerOptions::default()
        };
        assert!(!summarize(&normalized, &options).contains("\"model\""));
    }

    #[test]
    fn test_empty_tile_summaries_are_dropped() {
        let normalized = one_tile(json!({"type": "Placeholder"}));
        let out = summarize(&normalized, &SummarizerOptions::default());
        assert!(out.contains("## Row 1\n\n"));
        assert!(!out.contains("Tile 1"));
    }

    #[test]
    fn test_handler_errors_are_contained() {
        use crate::error::HandlerError;
        use crate::handlers::{TileHandler, TileHandlers};

        struct Broken;
        impl TileHandler for Broken {
            fn name(&self) -> &str {
                "broken"
            }
            fn summarize(&self, _ctx: &TileContext<'_>) -> Result<Option<String>, HandlerError> {
                Err(HandlerError::InvalidContent("boom".to_string()))
            }
        }

        let mut handlers = TileHandlers::new();
        handlers.push(Broken);
        let options = SummarizerOptions {
            tile_handlers: Some(handlers),
            ..SummarizerOptions::default()
        };
        let out = summarize(&one_tile(json!({"type": "Text", "text": "x"})), &options);
        assert!(out.contains("### Tile 1\n\nAn error occurred while generating the description."));
    }

    #[test]
    fn test_tile_title_in_heading() {
        let normalized = normalize(&json!({
            "rowOrder": ["r1"],
            "rowMap": {"r1": {"tiles": [{"tileId": "t1"}]}},
            "tileMap": {"t1": {"id": "t1", "title": "Notes", "content": {"type": "Drawing"}}}
        }));
        let out = summarize(&normalized, &SummarizerOptions::default());
        assert!(out.contains("### Tile 1 (Notes)\n\nThis tile contains a drawing."));
    }
}
