//! Graph tiles
//!
//! The description is assembled sentence by sentence from the graph content:
//!
//!     plotType                                  "This tile contains a scatter plot graph."
//!     axes.<place>.{min,max,label}              one sentence per axis, in place order
//!     layers[].config.dataset                   which data set each layer plots
//!     layers[].config._attributeDescriptions    which attribute sits on x and y
//!     adornments[type = "Movable Line"].lines   slope and intercept of each line

use super::{TileContext, TileHandler};
use crate::common::values::{format_number, scalar_text};
use crate::error::HandlerError;
use crate::model::{NormalizedDataSet, TileKind};
use serde_json::Value;
use std::collections::BTreeMap;

const MOVABLE_LINE: &str = "Movable Line";

pub struct GraphHandler;

impl TileHandler for GraphHandler {
    fn name(&self) -> &str {
        "graph"
    }

    fn description(&self) -> &str {
        "graph axes, layers and movable lines"
    }

    fn summarize(&self, ctx: &TileContext<'_>) -> Result<Option<String>, HandlerError> {
        if ctx.tile.kind() != TileKind::Graph {
            return Ok(None);
        }
        let Some(content) = ctx.tile.content() else {
            return Ok(None);
        };

        let plot_type = content
            .get("plotType")
            .and_then(Value::as_str)
            .unwrap_or("casePlot");
        let mut sentences = vec![format!(
            "This tile contains a {} graph.",
            humanize(plot_type)
        )];

        if let Some(axes) = content.get("axes").and_then(Value::as_object) {
            let ordered: BTreeMap<&String, &Value> = axes.iter().collect();
            sentences.extend(ordered.into_iter().map(|(place, axis)| axis_sentence(place, axis)));
        }

        if let Some(layers) = content.get("layers").and_then(Value::as_array) {
            sentences.extend(
                layers
                    .iter()
                    .enumerate()
                    .map(|(index, layer)| layer_sentence(index + 1, layer, ctx.data_sets)),
            );
        }

        let lines = content
            .get("adornments")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter(|adornment| adornment.get("type").and_then(Value::as_str) == Some(MOVABLE_LINE))
            .filter_map(|adornment| adornment.get("lines").and_then(Value::as_object))
            .flat_map(|lines| lines.values());
        for line in lines {
            sentences.push(format!(
                "A movable line has a slope of {} and an intercept of {}.",
                number_text(line.get("slope")),
                number_text(line.get("intercept"))
            ));
        }

        Ok(Some(sentences.join(" ")))
    }
}

/// `scatterPlot` -> `scatter plot`
fn humanize(tag: &str) -> String {
    let mut out = String::new();
    for ch in tag.chars() {
        if ch.is_uppercase() && !out.is_empty() {
            out.push(' ');
        }
        out.extend(ch.to_lowercase());
    }
    out
}

fn number_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::Number(number)) => format_number(number),
        Some(other) => scalar_text(other).unwrap_or_else(|| "unknown".to_string()),
        None => "unknown".to_string(),
    }
}

fn axis_sentence(place: &str, axis: &Value) -> String {
    let label = axis
        .get("label")
        .and_then(Value::as_str)
        .filter(|label| !label.is_empty())
        .map_or("shows an unknown variable".to_string(), |label| {
            format!("is labeled \"{label}\"")
        });

    match (axis.get("min"), axis.get("max")) {
        (Some(Value::Number(min)), Some(Value::Number(max))) => format!(
            "The {place} axis ranges from {} to {} and {label}.",
            format_number(min),
            format_number(max)
        ),
        _ => format!("The {place} axis {label}."),
    }
}

fn attribute_name(data_set: Option<&NormalizedDataSet>, description: Option<&Value>) -> Option<String> {
    let id = description?.get("attributeID")?.as_str()?;
    let name = data_set
        .and_then(|data_set| data_set.attribute(id))
        .map_or(id, |attr| attr.name.as_str());
    Some(name.to_string())
}

fn layer_sentence(number: usize, layer: &Value, data_sets: &[NormalizedDataSet]) -> String {
    let config = layer.get("config");
    let reference = config
        .and_then(|config| config.get("dataset"))
        .and_then(Value::as_str);
    let data_set = reference.and_then(|reference| {
        data_sets
            .iter()
            .find(|data_set| data_set.is_referenced_by(reference))
    });

    let mut sentence = match data_set {
        Some(data_set) => format!(
            "Layer {number} plots the \"{}\" ({}) data set",
            data_set.name, data_set.id
        ),
        None => format!("Layer {number} plots an unknown data set"),
    };

    let descriptions = config.and_then(|config| config.get("_attributeDescriptions"));
    let x = attribute_name(data_set, descriptions.and_then(|d| d.get("x")));
    let y = attribute_name(
        data_set,
        config
            .and_then(|config| config.get("_yAttributeDescriptions"))
            .and_then(|list| list.get(0))
            .or_else(|| descriptions.and_then(|d| d.get("y"))),
    );

    let bindings: Vec<String> = [("x", x), ("y", y)]
        .into_iter()
        .filter_map(|(axis, name)| name.map(|name| format!("\"{name}\" on the {axis} axis")))
        .collect();
    if !bindings.is_empty() {
        sentence.push_str(", with ");
        sentence.push_str(&bindings.join(" and "));
    }
    sentence.push('.');
    sentence
}
