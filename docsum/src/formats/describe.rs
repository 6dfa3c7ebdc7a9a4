//! Generic structured-data describer
//!
//! Fallback rendering for tile types no handler recognizes. The content is flattened to dotted
//! paths with one formatted value each, which yields two renderings:
//!
//!     - a Markdown bullet list of every path, sorted by path
//!     - a prose paragraph, one sentence per group of sibling paths
//!
//! Flattening rules: strings are quoted, `null` is the literal `null`, an array of scalars
//! collapses to one bracketed `[a, b]` value, an array holding objects is walked by index, and an
//! empty object is `{}`.

use crate::common::values::format_number;
use crate::error::HandlerError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Keys dropped from every tile content before describing it.
const UNIVERSAL_IGNORED_KEYS: &[&str] = &["id", "type"];

/// Extra keys dropped per content type: editor bookkeeping with no meaning to a reader.
const IGNORED_KEYS_BY_TYPE: &[(&str, &[&str])] = &[
    ("Drawing", &["stamps"]),
    ("Table", &["importedDataSet", "isImported", "columnWidths"]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub description: String,
    pub markdown: String,
}

/// Describe a tile's `content`, dropping the keys that are ignored for its type.
pub fn describe_tile_content(content: &Value) -> Result<Description, HandlerError> {
    let object = content.as_object().ok_or_else(|| {
        HandlerError::InvalidContent("tile content is not an object".to_string())
    })?;
    let content_type = object.get("type").and_then(Value::as_str).unwrap_or_default();
    let type_ignored = IGNORED_KEYS_BY_TYPE
        .iter()
        .find(|(tag, _)| *tag == content_type)
        .map_or(&[][..], |(_, keys)| *keys);

    let stripped: Map<String, Value> = object
        .iter()
        .filter(|(key, _)| {
            !UNIVERSAL_IGNORED_KEYS.contains(&key.as_str()) && !type_ignored.contains(&key.as_str())
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(describe(&Value::Object(stripped)))
}

/// Describe any value.
pub fn describe(value: &Value) -> Description {
    let mut entries = Vec::new();
    match value {
        Value::Object(_) | Value::Array(_) => flatten(value, "", &mut entries),
        scalar => entries.push(("value".to_string(), format_value(scalar))),
    }

    Description {
        description: describe_entries(&entries),
        markdown: markdown_list(&entries),
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(text) => format!("\"{text}\""),
        Value::Number(number) => format_number(number),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(items) => format!(
            "[{}]",
            items.iter().map(format_value).collect::<Vec<_>>().join(", ")
        ),
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(_) => value.to_string(),
    }
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn flatten(value: &Value, prefix: &str, entries: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) if map.is_empty() && !prefix.is_empty() => {
            entries.push((prefix.to_string(), "{}".to_string()));
        }
        Value::Object(map) => {
            for (key, child) in map {
                flatten(child, &join_path(prefix, key), entries);
            }
        }
        Value::Array(items) if items.iter().any(is_container) => {
            for (index, child) in items.iter().enumerate() {
                flatten(child, &join_path(prefix, &index.to_string()), entries);
            }
        }
        _ => {
            let path = if prefix.is_empty() { "value" } else { prefix };
            entries.push((path.to_string(), format_value(value)));
        }
    }
}

fn clause(key: &str, value: &str) -> String {
    match value {
        "true" => format!("it is {key}"),
        "false" => format!("it is not {key}"),
        "null" => format!("the {key} is not set"),
        list if list.len() > 2 && list.starts_with('[') && list.ends_with(']') => {
            format!("the {key} includes {}", &list[1..list.len() - 1])
        }
        quoted if quoted.starts_with('"') || quoted.parse::<f64>().is_ok() => {
            format!("the {key} is {quoted}")
        }
        other => format!("the {key} is \"{other}\""),
    }
}

/// `a`, `a and b`, `a, b, and c`
fn join_clauses(clauses: &[String]) -> String {
    match clauses {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [rest @ .., last] => format!("{}, and {last}", rest.join(", ")),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn describe_entries(entries: &[(String, String)]) -> String {
    if entries.is_empty() {
        return "There are no properties to describe.".to_string();
    }

    let mut top_level = Vec::new();
    let mut groups: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (path, value) in entries {
        match path.rsplit_once('.') {
            Some((group, key)) => groups.entry(group).or_default().push(clause(key, value)),
            None => top_level.push(clause(path, value)),
        }
    }

    let mut sentences = Vec::new();
    if !top_level.is_empty() {
        sentences.push(format!("{}.", capitalize(&join_clauses(&top_level))));
    }
    for (group, clauses) in groups {
        sentences.push(format!("Within {group}, {}.", join_clauses(&clauses)));
    }
    sentences.join(" ")
}

fn markdown_list(entries: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = entries.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    sorted
        .iter()
        .map(|(path, value)| format!("- `{path}`: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}
