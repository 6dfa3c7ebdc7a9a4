//! Snapshot normalization.
//!
//! Walks a raw document snapshot (`rowOrder`, `rowMap`, `tileMap`, `sharedModelMap`) into a
//! [`NormalizedModel`]. Every id lookup is resolve-or-skip: a dangling row, tile or shared
//! model reference is dropped, never dereferenced.
//!
//! Steps:
//!     1. Walk `rowOrder`, opening a section at the first row and at every section header.
//!     2. Drop sections that ended up without rows.
//!     3. Number rows, then tiles, 1..N in traversal order across section boundaries.
//!     4. Build data sets and variables from `sharedModelMap` and link data sets to tiles.

use crate::common::values::{field_text, scalar_text};
use crate::model::{
    DataSetAttribute, Normalized, NormalizedDataSet, NormalizedModel, NormalizedRow,
    NormalizedSection, NormalizedTile, NormalizedVariable, TileMap,
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Normalize a parsed snapshot. Never fails: malformed parts degrade to "missing".
pub fn normalize(snapshot: &Value) -> Normalized {
    let row_order = snapshot.get("rowOrder").and_then(Value::as_array);
    let row_map = snapshot.get("rowMap").and_then(Value::as_object);
    let tile_map = snapshot.get("tileMap").and_then(Value::as_object);

    let mut sections = match (row_order, row_map, tile_map) {
        (Some(order), Some(rows), Some(tiles)) if !order.is_empty() => {
            collect_sections(order, rows, tiles)
        }
        _ => Vec::new(),
    };

    sections.retain(|section| !section.rows.is_empty());
    number_rows_and_tiles(&mut sections);

    let mut model = NormalizedModel {
        sections,
        data_sets: Vec::new(),
        variables: Vec::new(),
    };

    if let Some(shared_models) = snapshot.get("sharedModelMap").and_then(Value::as_object) {
        add_shared_models(&mut model, shared_models);
    }

    debug!(
        sections = model.sections.len(),
        tiles = model.tiles().count(),
        data_sets = model.data_sets.len(),
        variables = model.variables.len(),
        "normalized document snapshot"
    );

    Normalized {
        model,
        tile_map: tile_map.cloned(),
    }
}

fn collect_sections(
    row_order: &[Value],
    row_map: &Map<String, Value>,
    tile_map: &TileMap,
) -> Vec<NormalizedSection> {
    let mut sections: Vec<NormalizedSection> = Vec::new();

    for row_id in row_order {
        let Some(row) = row_id
            .as_str()
            .and_then(|id| row_map.get(id))
            .and_then(Value::as_object)
        else {
            continue;
        };

        let is_header = row
            .get("isSectionHeader")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if sections.is_empty() || is_header {
            sections.push(NormalizedSection {
                rows: Vec::new(),
                section_id: row
                    .get("sectionId")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            });
        }

        if is_header {
            continue;
        }
        let Some(tile_refs) = row.get("tiles").and_then(Value::as_array) else {
            continue;
        };

        let tiles = resolve_tiles(tile_refs, tile_map)
            .map(|model| NormalizedTile::new(model.clone(), 0))
            .collect();
        if let Some(section) = sections.last_mut() {
            section.rows.push(NormalizedRow { tiles, number: 0 });
        }
    }

    sections
}

/// Resolve `{ tileId }` references through the tile map, skipping dangling ones.
pub(crate) fn resolve_tiles<'a>(
    tile_refs: &'a [Value],
    tile_map: &'a TileMap,
) -> impl Iterator<Item = &'a Value> + 'a {
    tile_refs.iter().filter_map(move |tile_ref| {
        tile_ref
            .get("tileId")
            .and_then(Value::as_str)
            .and_then(|id| tile_map.get(id))
            .filter(|tile| tile.is_object())
    })
}

fn number_rows_and_tiles(sections: &mut [NormalizedSection]) {
    let mut row_number = 1;
    let mut tile_number = 1;
    for row in sections.iter_mut().flat_map(|section| section.rows.iter_mut()) {
        row.number = row_number;
        row_number += 1;
        for tile in row.tiles.iter_mut() {
            tile.number = tile_number;
            tile_number += 1;
        }
    }
}

fn add_shared_models(model: &mut NormalizedModel, shared_models: &Map<String, Value>) {
    for (id, entry) in shared_models {
        let Some(shared_model) = entry.get("sharedModel") else {
            continue;
        };
        match shared_model.get("type").and_then(Value::as_str) {
            Some("SharedDataSet") => {
                let data_set = build_data_set(id, entry, shared_model);
                let index = model.data_sets.len();
                link_tiles(model, &data_set, index);
                model.data_sets.push(data_set);
            }
            Some("SharedVariables") => {
                let variables = shared_model
                    .get("variables")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                model.variables.extend(variables.iter().map(build_variable));
            }
            _ => {}
        }
    }
}

fn build_data_set(id: &str, entry: &Value, shared_model: &Value) -> NormalizedDataSet {
    let data_set = shared_model.get("dataSet").unwrap_or(&Value::Null);

    let attributes: Vec<DataSetAttribute> = data_set
        .get("attributes")
        .and_then(Value::as_array)
        .map(|attrs| attrs.iter().map(build_attribute).collect())
        .unwrap_or_default();

    let num_cases = data_set
        .get("cases")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);

    let data = (0..num_cases)
        .map(|case| {
            attributes
                .iter()
                .map(|attr| attr.values.get(case).cloned().unwrap_or_default())
                .collect()
        })
        .collect();

    let tile_ids = entry
        .get("tiles")
        .and_then(Value::as_array)
        .map(|tiles| tiles.iter().filter_map(scalar_text).collect())
        .unwrap_or_default();

    NormalizedDataSet {
        id: id.to_string(),
        data_set_id: data_set.get("id").and_then(scalar_text),
        provider_id: shared_model.get("providerId").and_then(scalar_text),
        name: field_text(data_set, "name"),
        tile_ids,
        attributes,
        num_cases,
        data,
    }
}

fn build_attribute(attr: &Value) -> DataSetAttribute {
    let values = attr
        .get("values")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .map(|value| scalar_text(value).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();

    DataSetAttribute {
        id: field_text(attr, "id"),
        name: field_text(attr, "name"),
        values,
        formula: attr
            .get("formula")
            .and_then(|formula| formula.get("display"))
            .and_then(Value::as_str)
            .filter(|display| !display.is_empty())
            .map(str::to_string),
    }
}

fn build_variable(variable: &Value) -> NormalizedVariable {
    NormalizedVariable {
        id: field_text(variable, "id"),
        name: field_text(variable, "name"),
        display_name: field_text(variable, "displayName"),
        description: field_text(variable, "description"),
        expression: field_text(variable, "expression"),
        value: field_text(variable, "value"),
        unit: field_text(variable, "unit"),
    }
}

/// Attach the data set to every claimed tile. The first claim on a tile wins.
fn link_tiles(model: &mut NormalizedModel, data_set: &NormalizedDataSet, index: usize) {
    let data_sets = &model.data_sets;
    for tile in model
        .sections
        .iter_mut()
        .flat_map(|section| section.rows.iter_mut())
        .flat_map(|row| row.tiles.iter_mut())
    {
        let Some(tile_id) = tile.id() else {
            continue;
        };
        if !data_set.tile_ids.iter().any(|id| id == tile_id) {
            continue;
        }
        match tile.data_set {
            None => tile.data_set = Some(index),
            Some(existing) => warn!(
                tile = tile_id,
                kept = data_sets.get(existing).map_or("", |ds| ds.id.as_str()),
                ignored = data_set.id.as_str(),
                "tile is claimed by more than one data set"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text_tile(id: &str) -> Value {
        json!({"id": id, "content": {"type": "Text", "format": "markdown", "text": id}})
    }

    #[test]
    fn test_missing_maps_produce_empty_model() {
        assert!(normalize(&json!({})).model.sections.is_empty());
        assert!(normalize(&json!(null)).model.sections.is_empty());
        assert!(normalize(&json!({"rowOrder": ["r1"], "rowMap": {"r1": {}}}))
            .model
            .sections
            .is_empty());
        assert!(
            normalize(&json!({"rowOrder": [], "rowMap": {}, "tileMap": {}}))
                .model
                .sections
                .is_empty()
        );
    }

    #[test]
    fn test_sections_split_on_headers() {
        let snapshot = json!({
            "rowOrder": ["h1", "r1", "r2", "h2", "r3"],
            "rowMap": {
                "h1": {"isSectionHeader": true, "sectionId": "intro"},
                "r1": {"tiles": [{"tileId": "t1"}, {"tileId": "t2"}]},
                "r2": {"tiles": [{"tileId": "t3"}]},
                "h2": {"isSectionHeader": true, "sectionId": "next"},
                "r3": {"tiles": [{"tileId": "t4"}]}
            },
            "tileMap": {
                "t1": text_tile("t1"), "t2": text_tile("t2"),
                "t3": text_tile("t3"), "t4": text_tile("t4")
            }
        });
        let model = normalize(&snapshot).model;

        assert_eq!(model.sections.len(), 2);
        assert_eq!(model.sections[0].section_id.as_deref(), Some("intro"));
        assert_eq!(model.sections[1].section_id.as_deref(), Some("next"));

        let row_numbers: Vec<usize> = model
            .sections
            .iter()
            .flat_map(|s| s.rows.iter().map(|r| r.number))
            .collect();
        assert_eq!(row_numbers, vec![1, 2, 3]);

        let tile_numbers: Vec<usize> = model.tiles().map(|t| t.number).collect();
        assert_eq!(tile_numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_dangling_references_are_skipped() {
        let snapshot = json!({
            "rowOrder": ["missing", "r1", 42],
            "rowMap": {"r1": {"tiles": [{"tileId": "nope"}, {"tileId": "t1"}, {}]}},
            "tileMap": {"t1": text_tile("t1")}
        });
        let model = normalize(&snapshot).model;
        assert_eq!(model.sections.len(), 1);
        assert_eq!(model.sections[0].rows[0].tiles.len(), 1);
        assert_eq!(model.sections[0].rows[0].tiles[0].number, 1);
    }

    #[test]
    fn test_empty_sections_are_dropped() {
        let snapshot = json!({
            "rowOrder": ["h1", "h2", "r1"],
            "rowMap": {
                "h1": {"isSectionHeader": true, "sectionId": "empty"},
                "h2": {"isSectionHeader": true, "sectionId": "full"},
                "r1": {"tiles": []}
            },
            "tileMap": {}
        });
        let model = normalize(&snapshot).model;
        assert_eq!(model.sections.len(), 1);
        assert_eq!(model.sections[0].section_id.as_deref(), Some("full"));
        assert!(!model.is_unsectioned());
    }

    #[test]
    fn test_data_set_pivot_and_link() {
        let snapshot = json!({
            "rowOrder": ["r1"],
            "rowMap": {"r1": {"tiles": [{"tileId": "t1"}]}},
            "tileMap": {"t1": {"id": "t1", "content": {"type": "Table"}}},
            "sharedModelMap": {
                "shared1": {
                    "sharedModel": {
                        "type": "SharedDataSet",
                        "providerId": "t1",
                        "dataSet": {
                            "id": "ds1",
                            "name": "Sample",
                            "attributes": [
                                {"id": "a1", "name": "Name", "values": ["Alice", "Bob"]},
                                {"id": "a2", "name": "Age", "values": [25],
                                 "formula": {"display": "x + 1"}}
                            ],
                            "cases": [{"__id__": "c1"}, {"__id__": "c2"}]
                        }
                    },
                    "tiles": ["t1"]
                }
            }
        });
        let model = normalize(&snapshot).model;
        let data_set = &model.data_sets[0];

        assert_eq!(data_set.id, "shared1");
        assert_eq!(data_set.data_set_id.as_deref(), Some("ds1"));
        assert_eq!(data_set.num_cases, 2);
        assert_eq!(
            data_set.data,
            vec![
                vec!["Alice".to_string(), "25".to_string()],
                vec!["Bob".to_string(), String::new()],
            ]
        );
        assert_eq!(data_set.attributes[1].formula.as_deref(), Some("x + 1"));
        assert_eq!(model.sections[0].rows[0].tiles[0].data_set, Some(0));
    }

    #[test]
    fn test_first_data_set_claim_wins() {
        let shared = |name: &str| {
            json!({
                "sharedModel": {"type": "SharedDataSet", "dataSet": {"name": name, "cases": []}},
                "tiles": ["t1"]
            })
        };
        let snapshot = json!({
            "rowOrder": ["r1"],
            "rowMap": {"r1": {"tiles": [{"tileId": "t1"}]}},
            "tileMap": {"t1": {"id": "t1", "content": {"type": "Table"}}},
            "sharedModelMap": {"first": shared("First"), "second": shared("Second")}
        });
        let model = normalize(&snapshot).model;
        let tile = model.tiles().next().unwrap();
        assert_eq!(model.data_set_for(tile).unwrap().name, "First");
    }

    #[test]
    fn test_variables() {
        let snapshot = json!({
            "sharedModelMap": {
                "vars": {
                    "sharedModel": {
                        "type": "SharedVariables",
                        "variables": [
                            {"id": "v1", "name": "x", "value": 3.5, "unit": "m"}
                        ]
                    },
                    "tiles": []
                }
            }
        });
        let model = normalize(&snapshot).model;
        assert_eq!(model.variables.len(), 1);
        assert_eq!(model.variables[0].value, "3.5");
        assert_eq!(model.variables[0].unit, "m");
        assert_eq!(model.variables[0].description, "");
    }

    #[test]
    fn test_tile_map_passes_through() {
        let snapshot = json!({
            "rowOrder": ["r1"],
            "rowMap": {"r1": {"tiles": []}},
            "tileMap": {"hidden": text_tile("hidden")}
        });
        let normalized = normalize(&snapshot);
        assert!(normalized.tile_map.unwrap().contains_key("hidden"));
    }
}
