//! Dataflow program to Graphviz DOT
//!
//! A program is a map of nodes plus a map of connections between named ports. Every node becomes
//! one `shape=plain` node whose label is an HTML table:
//!
//!     <table>
//!       <tr><td port="num1">Input</td><td>num1</td></tr>        one row per connected input
//!       <tr><td>mathOperator</td><td>Add</td></tr>               node data, current value, formula
//!       <tr><td>Output</td><td port="nodeValue">nodeValue</td></tr>
//!     </table>
//!
//! Nodes are named `type:name`. When several nodes share a name, the first keeps it and the rest
//! get `#1`, `#2`, ... suffixes. A node's current value is the value recorded against the last
//! entry of `recentTicks`.

use crate::common::values::{display_text, scalar_text};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Node data keys that never show up as label properties.
const HIDDEN_DATA_KEYS: &[&str] = &["type", "tickEntries", "orderedDisplayName"];

const MATH_OPERATORS: &[(&str, &str)] = &[
    ("Add", "+"),
    ("Subtract", "-"),
    ("Multiply", "×"),
    ("Divide", "÷"),
];

const LOGIC_OPERATORS: &[(&str, &str)] = &[
    ("Greater Than", ">"),
    ("Less Than", "<"),
    ("Greater Than Or Equal To", ">="),
    ("Less Than Or Equal To", "<="),
    ("Equal", "=="),
    ("Not Equal", "!="),
    ("And", "&&"),
    ("Or", "||"),
    ("Nand", "nand"),
    ("Xor", "xor"),
];

fn lookup<'a>(table: &[(&str, &'a str)], key: &str) -> Option<&'a str> {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, symbol)| *symbol)
}

/// Unary transform templates. The operand is substituted and the result follows.
fn transform_sentence(operator: &str, operand: &str) -> String {
    match operator {
        "Absolute Value" => format!("|{operand}| ="),
        "Negation" => format!("-({operand}) ="),
        "Not" => format!("!{operand} ⇒"),
        "Round" => format!("round({operand}) ="),
        "Floor" => format!("floor({operand}) ="),
        "Ceil" => format!("ceil({operand}) ="),
        "Ramp" => format!("{operand} →"),
        _ => format!("unknownTransform({operand}) ="),
    }
}

/// Escape text for an HTML-like label.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Escape text for a double-quoted DOT id.
pub fn escape_id(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

struct ProgramNode<'a> {
    id: &'a str,
    name: String,
    data: Option<&'a Map<String, Value>>,
    node_type: &'a str,
}

impl ProgramNode<'_> {
    fn field(&self, key: &str) -> Option<&Value> {
        self.data.and_then(|data| data.get(key))
    }
}

/// The node feeding an input port, with its current value.
struct NodeInput {
    node_name: String,
    value: Option<String>,
}

#[derive(Default)]
struct Ports<'a> {
    /// input port -> source node id; last writer wins, first position kept
    inputs: Vec<(&'a str, &'a str)>,
    /// output port -> target node ids
    outputs: Vec<(&'a str, Vec<&'a str>)>,
}

struct Connection<'a> {
    source: &'a str,
    source_output: &'a str,
    target: &'a str,
    target_input: &'a str,
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn collect_nodes(program: &Value) -> Vec<ProgramNode<'_>> {
    let Some(nodes) = program.get("nodes").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut collected: Vec<ProgramNode> = nodes
        .iter()
        .map(|(id, node)| {
            let data = node.get("data").and_then(Value::as_object);
            let node_type = data
                .and_then(|data| data.get("type"))
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            let display = data
                .and_then(|data| data.get("orderedDisplayName"))
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| str_field(node, "name"));
            ProgramNode {
                id,
                name: format!("{node_type}:{display}"),
                data,
                node_type,
            }
        })
        .collect();

    // Suffix every repeat of a base name after its first occurrence, skipping suffixed names
    // that another node already uses.
    let base_names: HashSet<String> = collected.iter().map(|node| node.name.clone()).collect();
    let mut taken: HashSet<String> = HashSet::new();
    let mut counters: HashMap<String, usize> = HashMap::new();
    for node in collected.iter_mut() {
        if taken.insert(node.name.clone()) {
            continue;
        }
        let count = counters.entry(node.name.clone()).or_insert(1);
        let mut candidate = format!("{}#{count}", node.name);
        while base_names.contains(&candidate) || taken.contains(&candidate) {
            *count += 1;
            candidate = format!("{}#{count}", node.name);
        }
        *count += 1;
        taken.insert(candidate.clone());
        node.name = candidate;
    }

    collected
}

fn collect_connections(program: &Value) -> Vec<Connection<'_>> {
    program
        .get("connections")
        .and_then(Value::as_object)
        .map(|connections| {
            connections
                .values()
                .map(|conn| Connection {
                    source: str_field(conn, "source"),
                    source_output: str_field(conn, "sourceOutput"),
                    target: str_field(conn, "target"),
                    target_input: str_field(conn, "targetInput"),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn current_value(node: &ProgramNode, last_tick: Option<&str>) -> Option<String> {
    let tick = last_tick?;
    node.field("tickEntries")
        .and_then(|entries| entries.get(tick))
        .and_then(|entry| entry.get("nodeValue"))
        .and_then(scalar_text)
}

fn binary_formula(
    inputs: &[(&str, NodeInput)],
    node_value: Option<&str>,
    operator: &str,
    result: &str,
) -> Vec<(String, String)> {
    let input = |port: &str| inputs.iter().find(|(name, _)| *name == port).map(|(_, i)| i);
    let name_of = |port: &str, unset: &str| {
        input(port).map_or(unset.to_string(), |i| i.node_name.clone())
    };
    let value_of = |port: &str, unset: &str| {
        input(port)
            .and_then(|i| i.value.clone())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| unset.to_string())
    };

    let formula = format!(
        "{} {operator} {} {result} nodeValue",
        name_of("num1", "unset_num1"),
        name_of("num2", "unset_num2")
    );
    let with_values = format!(
        "{} {operator} {} {result} {}",
        value_of("num1", "unset_num1"),
        value_of("num2", "unset_num2"),
        node_value.unwrap_or("unknown")
    );
    vec![
        ("formula".to_string(), formula),
        ("formulaWithValues".to_string(), with_values),
    ]
}

fn unary_formula(
    inputs: &[(&str, NodeInput)],
    node_value: Option<&str>,
    operator: &str,
) -> Vec<(String, String)> {
    let input = inputs
        .iter()
        .find(|(name, _)| *name == "num1")
        .map(|(_, i)| i);
    let name = input.map_or("unset_num1".to_string(), |i| i.node_name.clone());
    let value = input
        .and_then(|i| i.value.clone())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "unset_num1".to_string());

    vec![
        (
            "formula".to_string(),
            format!("{} nodeValue", transform_sentence(operator, &name)),
        ),
        (
            "formulaWithValues".to_string(),
            format!(
                "{} {}",
                transform_sentence(operator, &value),
                node_value.unwrap_or("unknown")
            ),
        ),
    ]
}

/// Operator-specific formula properties. Other node types have none.
fn formula_properties(
    node: &ProgramNode,
    inputs: &[(&str, NodeInput)],
    node_value: Option<&str>,
) -> Vec<(String, String)> {
    let operator = |key: &str| node.field(key).and_then(Value::as_str).unwrap_or("Unknown");
    match node.node_type {
        "Math" => {
            let symbol = lookup(MATH_OPERATORS, operator("mathOperator")).unwrap_or("?");
            binary_formula(inputs, node_value, symbol, "=")
        }
        "Logic" => {
            let symbol = lookup(LOGIC_OPERATORS, operator("logicOperator")).unwrap_or("?");
            binary_formula(inputs, node_value, symbol, "⇒")
        }
        "Transform" => unary_formula(inputs, node_value, operator("transformOperator")),
        _ => Vec::new(),
    }
}

fn upsert(properties: &mut Vec<(String, String)>, key: String, value: String) {
    match properties.iter_mut().find(|(existing, _)| *existing == key) {
        Some(entry) => entry.1 = value,
        None => properties.push((key, value)),
    }
}

/// Convert a dataflow program to a DOT digraph.
pub fn program_to_graphviz(program: &Value) -> String {
    let nodes = collect_nodes(program);
    let connections = collect_connections(program);
    let node_index = |id: &str| nodes.iter().position(|node| node.id == id);

    let mut ports: Vec<Ports> = nodes.iter().map(|_| Ports::default()).collect();
    for conn in &connections {
        let (Some(source), Some(target)) = (node_index(conn.source), node_index(conn.target))
        else {
            continue;
        };

        let outputs = &mut ports[source].outputs;
        match outputs.iter_mut().find(|(port, _)| *port == conn.source_output) {
            Some((_, targets)) => targets.push(conn.target),
            None => outputs.push((conn.source_output, vec![conn.target])),
        }

        let inputs = &mut ports[target].inputs;
        match inputs.iter_mut().find(|(port, _)| *port == conn.target_input) {
            Some(entry) => entry.1 = conn.source,
            None => inputs.push((conn.target_input, conn.source)),
        }
    }

    let last_tick = program
        .get("recentTicks")
        .and_then(Value::as_array)
        .and_then(|ticks| ticks.last())
        .and_then(Value::as_str);

    let mut lines = vec![
        "digraph dataflow {".to_string(),
        "  rankdir=LR;".to_string(),
        "  node [shape=plain];".to_string(),
        String::new(),
    ];

    for (node, node_ports) in nodes.iter().zip(&ports) {
        let inputs: Vec<(&str, NodeInput)> = node_ports
            .inputs
            .iter()
            .filter_map(|(port, source_id)| {
                let source = &nodes[node_index(*source_id)?];
                Some((
                    *port,
                    NodeInput {
                        node_name: source.name.clone(),
                        value: current_value(source, last_tick),
                    },
                ))
            })
            .collect();

        let node_value = current_value(node, last_tick);
        let mut properties: Vec<(String, String)> = node
            .data
            .into_iter()
            .flatten()
            .filter(|(key, _)| !HIDDEN_DATA_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), display_text(value)))
            .collect();
        if let Some(value) = &node_value {
            upsert(&mut properties, "nodeValue".to_string(), value.clone());
        }
        for (key, value) in formula_properties(node, &inputs, node_value.as_deref()) {
            upsert(&mut properties, key, value);
        }

        let mut label = vec!["    <table>".to_string()];
        for (port, _) in &inputs {
            let port = escape_html(port);
            label.push(format!(
                "      <tr><td port=\"{port}\">Input</td><td>{port}</td></tr>"
            ));
        }
        for (key, value) in &properties {
            label.push(format!(
                "      <tr><td>{}</td><td>{}</td></tr>",
                escape_html(key),
                escape_html(value)
            ));
        }
        for (port, _) in &node_ports.outputs {
            let port = escape_html(port);
            label.push(format!(
                "      <tr><td>Output</td><td port=\"{port}\">{port}</td></tr>"
            ));
        }
        label.push("    </table>".to_string());

        lines.push(format!(
            "  \"{}\" [label=<\n{}\n  >];",
            escape_id(&node.name),
            label.join("\n")
        ));
    }

    lines.push(String::new());

    for conn in &connections {
        let (Some(source), Some(target)) = (node_index(conn.source), node_index(conn.target))
        else {
            continue;
        };
        lines.push(format!(
            "  \"{}\":\"{}\" -> \"{}\":\"{}\";",
            escape_id(&nodes[source].name),
            escape_id(conn.source_output),
            escape_id(&nodes[target].name),
            escape_id(conn.target_input)
        ));
    }

    lines.push("}".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use serde_json::json;

    fn node(name: &str, data: Value) -> Value {
        json!({"id": name, "name": name, "x": 0, "y": 0, "data": data})
    }

    #[test]
    fn test_empty_program() {
        assert_snapshot!(program_to_graphviz(&json!({"nodes": {}, "connections": {}})), @r"
        digraph dataflow {
          rankdir=LR;
          node [shape=plain];


        }
        ");
    }

    #[test]
    fn test_unconnected_math_node() {
        let program = json!({
            "nodes": {"1": node("Math 1", json!({"type": "Math", "mathOperator": "Add"}))},
            "connections": {}
        });
        let dot = program_to_graphviz(&program);
        assert!(dot.contains("<td>formula</td><td>unset_num1 + unset_num2 = nodeValue</td>"));
        assert!(dot.contains("<td>formulaWithValues</td><td>unset_num1 + unset_num2 = unknown</td>"));
        assert!(dot.contains("<td>mathOperator</td><td>Add</td>"));
        assert!(!dot.contains("<td>type</td>"));
    }

    #[test]
    fn test_connected_program_with_ticks() {
        let program = json!({
            "nodes": {
                "1": node("Number 1", json!({
                    "type": "Number", "nodeValue": 5,
                    "tickEntries": {"t1": {"nodeValue": "4"}, "t2": {"nodeValue": "5"}}
                })),
                "2": node("Math 1", json!({
                    "type": "Math", "mathOperator": "Multiply",
                    "tickEntries": {"t2": {"nodeValue": "25"}}
                }))
            },
            "connections": {
                "c1": {"id": "c1", "source": "1", "sourceOutput": "num", "target": "2", "targetInput": "num1"},
                "c2": {"id": "c2", "source": "1", "sourceOutput": "num", "target": "2", "targetInput": "num2"}
            },
            "recentTicks": ["t1", "t2"]
        });
        assert_snapshot!(program_to_graphviz(&program), @r#"
        digraph dataflow {
          rankdir=LR;
          node [shape=plain];

          "Number:Number 1" [label=<
            <table>
              <tr><td>nodeValue</td><td>5</td></tr>
              <tr><td>Output</td><td port="num">num</td></tr>
            </table>
          >];
          "Math:Math 1" [label=<
            <table>
              <tr><td port="num1">Input</td><td>num1</td></tr>
              <tr><td port="num2">Input</td><td>num2</td></tr>
              <tr><td>mathOperator</td><td>Multiply</td></tr>
              <tr><td>nodeValue</td><td>25</td></tr>
              <tr><td>formula</td><td>Number:Number 1 × Number:Number 1 = nodeValue</td></tr>
              <tr><td>formulaWithValues</td><td>5 × 5 = 25</td></tr>
            </table>
          >];

          "Number:Number 1":"num" -> "Math:Math 1":"num1";
          "Number:Number 1":"num" -> "Math:Math 1":"num2";
        }
        "#);
    }

    #[test]
    fn test_duplicate_names_get_suffixes() {
        let program = json!({
            "nodes": {
                "a": node("Sensor", json!({"type": "Sensor"})),
                "b": node("Sensor", json!({"type": "Sensor"})),
                "c": node("Sensor", json!({"type": "Sensor"})),
                "d": node("Timer", json!({"type": "Timer"}))
            },
            "connections": {}
        });
        let dot = program_to_graphviz(&program);
        assert!(dot.contains("\"Sensor:Sensor\" [label"));
        assert!(dot.contains("\"Sensor:Sensor#1\" [label"));
        assert!(dot.contains("\"Sensor:Sensor#2\" [label"));
        assert!(dot.contains("\"Timer:Timer\" [label"));
        assert!(!dot.contains("Timer:Timer#"));
    }

    #[test]
    fn test_container_properties_render_as_json() {
        let program = json!({
            "nodes": {"1": node("Timer 1", json!({"type": "Timer", "phases": [1, 2], "unit": null}))},
            "connections": {}
        });
        let dot = program_to_graphviz(&program);
        assert!(dot.contains("<td>phases</td><td>[1,2]</td>"));
        assert!(dot.contains("<td>unit</td><td>null</td>"));
    }

    #[test]
    fn test_suffixes_skip_names_already_in_use() {
        let program = json!({
            "nodes": {
                "a": node("S", json!({"type": "Sensor"})),
                "b": node("S", json!({"type": "Sensor"})),
                "c": node("S#1", json!({"type": "Sensor"})),
                "d": node("S", json!({"type": "Sensor"}))
            },
            "connections": {}
        });
        let dot = program_to_graphviz(&program);
        assert_eq!(dot.matches("\"Sensor:S\" [label").count(), 1);
        assert_eq!(dot.matches("\"Sensor:S#1\" [label").count(), 1);
        assert_eq!(dot.matches("\"Sensor:S#2\" [label").count(), 1);
        assert_eq!(dot.matches("\"Sensor:S#3\" [label").count(), 1);
    }

    #[test]
    fn test_logic_and_transform_formulas() {
        let program = json!({
            "nodes": {
                "1": node("Logic 1", json!({"type": "Logic", "logicOperator": "Greater Than"})),
                "2": node("Transform 1", json!({"type": "Transform", "transformOperator": "Absolute Value"})),
                "3": node("Transform 2", json!({"type": "Transform", "transformOperator": "Wobble"}))
            },
            "connections": {
                "c1": {"source": "1", "sourceOutput": "nodeValue", "target": "2", "targetInput": "num1"}
            }
        });
        let dot = program_to_graphviz(&program);
        assert!(dot.contains("unset_num1 &gt; unset_num2 ⇒ nodeValue"));
        assert!(dot.contains("|Logic:Logic 1| = nodeValue"));
        assert!(dot.contains("unknownTransform(unset_num1) = nodeValue"));
    }

    #[test]
    fn test_last_connection_to_a_port_wins() {
        let program = json!({
            "nodes": {
                "1": node("A", json!({"type": "Number"})),
                "2": node("B", json!({"type": "Number"})),
                "3": node("Sum", json!({"type": "Math", "mathOperator": "Add"}))
            },
            "connections": {
                "c1": {"source": "1", "sourceOutput": "out", "target": "3", "targetInput": "num1"},
                "c2": {"source": "2", "sourceOutput": "out", "target": "3", "targetInput": "num1"}
            }
        });
        let dot = program_to_graphviz(&program);
        assert!(dot.contains("Number:B + unset_num2 = nodeValue"));
        assert_eq!(dot.matches("<td port=\"num1\">Input</td>").count(), 1);
    }

    #[test]
    fn test_dangling_connections_are_skipped() {
        let program = json!({
            "nodes": {"1": node("A", json!({"type": "Number"}))},
            "connections": {
                "c1": {"source": "1", "sourceOutput": "out", "target": "ghost", "targetInput": "num1"}
            }
        });
        let dot = program_to_graphviz(&program);
        assert!(!dot.contains("->"));
        assert!(!dot.contains("Output"));
    }
}
