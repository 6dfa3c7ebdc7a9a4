//! Normalized document model.
//!
//! This is the only structure the report assembler consumes. It owns copies of everything it
//! needs and holds no references back into the raw snapshot. Data sets live in a flat arena
//! (`NormalizedModel::data_sets`) and tiles point at them by index.

use serde::Serialize;
use serde_json::{Map, Value};

/// Raw tile models keyed by tile id, passed through from the snapshot.
pub type TileMap = Map<String, Value>;

/// The closed set of tile content kinds the dispatch chain knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileKind {
    Text,
    Image,
    Table,
    Drawing,
    Graph,
    Dataflow,
    Question,
    Simulator,
    Placeholder,
    Other(String),
}

impl TileKind {
    /// Map a content `type` tag onto a kind. Unrecognized tags become `Other`.
    pub fn from_type(tag: &str) -> Self {
        match tag {
            "Text" => TileKind::Text,
            "Image" => TileKind::Image,
            "Table" => TileKind::Table,
            "Drawing" => TileKind::Drawing,
            "Graph" => TileKind::Graph,
            "Dataflow" => TileKind::Dataflow,
            "Question" => TileKind::Question,
            "Simulator" => TileKind::Simulator,
            "Placeholder" => TileKind::Placeholder,
            other => TileKind::Other(other.to_string()),
        }
    }
}

/// A tile resolved from the snapshot, numbered in document order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTile {
    pub model: Value,
    pub number: usize,
    /// Index into [`NormalizedModel::data_sets`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_set: Option<usize>,
}

impl NormalizedTile {
    pub fn new(model: Value, number: usize) -> Self {
        Self {
            model,
            number,
            data_set: None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.model.get("id").and_then(Value::as_str)
    }

    /// The tile title, if it has a non-empty one.
    pub fn title(&self) -> Option<&str> {
        self.model
            .get("title")
            .and_then(Value::as_str)
            .filter(|title| !title.is_empty())
    }

    pub fn content(&self) -> Option<&Value> {
        self.model.get("content")
    }

    /// The content `type` tag, or `"unknown"` when the tile has none.
    pub fn content_type(&self) -> &str {
        self.content()
            .and_then(|content| content.get("type"))
            .and_then(Value::as_str)
            .unwrap_or("unknown")
    }

    pub fn kind(&self) -> TileKind {
        TileKind::from_type(self.content_type())
    }

    /// Look up a string field of the tile content.
    pub fn content_str(&self, key: &str) -> Option<&str> {
        self.content()
            .and_then(|content| content.get(key))
            .and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRow {
    pub tiles: Vec<NormalizedTile>,
    pub number: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSection {
    pub rows: Vec<NormalizedRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSetAttribute {
    pub id: String,
    pub name: String,
    pub values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedDataSet {
    /// Key of the shared model entry; the canonical identity of the data set.
    pub id: String,
    /// The nested `dataSet.id`, which graph layers use to refer to the data set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_set_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    pub name: String,
    pub tile_ids: Vec<String>,
    pub attributes: Vec<DataSetAttribute>,
    pub num_cases: usize,
    /// Case-major table: `data[case][attribute]`
    pub data: Vec<Vec<String>>,
}

impl NormalizedDataSet {
    /// Whether `reference` names this data set, by either of its ids.
    pub fn is_referenced_by(&self, reference: &str) -> bool {
        self.id == reference || self.data_set_id.as_deref() == Some(reference)
    }

    pub fn attribute(&self, id: &str) -> Option<&DataSetAttribute> {
        self.attributes.iter().find(|attr| attr.id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedVariable {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub expression: String,
    pub value: String,
    pub unit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedModel {
    pub sections: Vec<NormalizedSection>,
    pub data_sets: Vec<NormalizedDataSet>,
    pub variables: Vec<NormalizedVariable>,
}

impl NormalizedModel {
    /// All tiles in traversal order.
    pub fn tiles(&self) -> impl Iterator<Item = &NormalizedTile> {
        self.sections
            .iter()
            .flat_map(|section| section.rows.iter())
            .flat_map(|row| row.tiles.iter())
    }

    pub fn data_set_for(&self, tile: &NormalizedTile) -> Option<&NormalizedDataSet> {
        tile.data_set.and_then(|index| self.data_sets.get(index))
    }

    /// True when the document was never split into explicit sections.
    pub fn is_unsectioned(&self) -> bool {
        self.sections.len() == 1 && self.sections[0].section_id.is_none()
    }
}

/// Result of normalization: the clean model plus the raw tile map, which the Question
/// handler needs to resolve tiles that are not reachable through the row tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub model: NormalizedModel,
    pub tile_map: Option<TileMap>,
}
