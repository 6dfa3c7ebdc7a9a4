//! Drawing objects to inline SVG
//!
//! Supported object types and their elements:
//!
//!     rectangle  -> <rect x y width height>
//!     ellipse    -> <ellipse cx cy rx ry>
//!     vector     -> <line x1 y1 x2 y2>        end point is (x + dx, y + dy)
//!     line       -> <polyline points>         each delta point is relative to the previous one
//!
//! Other object types (images, groups, stamps) are skipped. Style attributes are carried through
//! verbatim.

use crate::common::values::{format_number, scalar_text};
use serde_json::Value;

/// (drawing object key, svg attribute)
const STYLE_ATTRIBUTES: &[(&str, &str)] = &[
    ("fill", "fill"),
    ("stroke", "stroke"),
    ("strokeWidth", "stroke-width"),
    ("strokeDashArray", "stroke-dasharray"),
];

fn escape_attr(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn number(object: &Value, key: &str) -> f64 {
    object.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn coordinate(value: f64) -> String {
    match serde_json::Number::from_f64(value) {
        Some(number) => format_number(&number),
        None => "0".to_string(),
    }
}

fn style(object: &Value, fill_override: Option<&str>) -> String {
    let mut attrs = String::new();
    for (key, attr) in STYLE_ATTRIBUTES {
        let value = match (*key, fill_override) {
            ("fill", Some(fill)) => Some(fill.to_string()),
            _ => object
                .get(*key)
                .and_then(scalar_text)
                .filter(|value| !value.is_empty()),
        };
        if let Some(value) = value {
            attrs.push_str(&format!(" {attr}=\"{}\"", escape_attr(&value)));
        }
    }
    attrs
}

fn render_object(object: &Value) -> Option<String> {
    let x = number(object, "x");
    let y = number(object, "y");
    let element = match object.get("type").and_then(Value::as_str)? {
        "rectangle" => format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"{} />",
            coordinate(x),
            coordinate(y),
            coordinate(number(object, "width")),
            coordinate(number(object, "height")),
            style(object, None)
        ),
        "ellipse" => format!(
            "<ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\"{} />",
            coordinate(x),
            coordinate(y),
            coordinate(number(object, "rx")),
            coordinate(number(object, "ry")),
            style(object, None)
        ),
        "vector" => format!(
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\"{} />",
            coordinate(x),
            coordinate(y),
            coordinate(x + number(object, "dx")),
            coordinate(y + number(object, "dy")),
            style(object, None)
        ),
        "line" => {
            let mut points = vec![format!("{},{}", coordinate(x), coordinate(y))];
            let (mut px, mut py) = (x, y);
            for delta in object
                .get("deltaPoints")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default()
            {
                px += number(delta, "dx");
                py += number(delta, "dy");
                points.push(format!("{},{}", coordinate(px), coordinate(py)));
            }
            format!(
                "<polyline points=\"{}\"{} />",
                points.join(" "),
                style(object, Some("none"))
            )
        }
        _ => return None,
    };
    Some(element)
}

/// Render a drawing's `objects` list as one `<svg>` element, one child per line.
pub fn drawing_to_svg(content: &Value) -> String {
    let elements: Vec<String> = content
        .get("objects")
        .and_then(Value::as_array)
        .map(|objects| objects.iter().filter_map(render_object).collect())
        .unwrap_or_default();

    if elements.is_empty() {
        return "<svg></svg>".to_string();
    }
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\">\n{}\n</svg>",
        elements
            .iter()
            .map(|element| format!("  {element}"))
            .collect::<Vec<_>>()
            .join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use serde_json::json;

    #[test]
    fn test_empty_drawing() {
        assert_eq!(drawing_to_svg(&json!({"type": "Drawing", "objects": []})), "<svg></svg>");
        assert_eq!(drawing_to_svg(&json!({"type": "Drawing"})), "<svg></svg>");
    }

    #[test]
    fn test_shapes() {
        let content = json!({
            "type": "Drawing",
            "objects": [
                {"type": "rectangle", "x": 10, "y": 20, "width": 30, "height": 40,
                 "fill": "#ff0000", "stroke": "#000000", "strokeWidth": 2, "strokeDashArray": "3,3"},
                {"type": "ellipse", "x": 50, "y": 50, "rx": 5, "ry": 7.5, "fill": "none"},
                {"type": "vector", "x": 10, "y": 10, "dx": 10, "dy": -5, "stroke": "#888888"},
                {"type": "line", "x": 1, "y": 1, "deltaPoints": [{"dx": 1, "dy": 1}, {"dx": 2, "dy": 2}],
                 "stroke": "#888888"},
                {"type": "image", "url": "cat.png", "x": 0, "y": 0}
            ]
        });
        assert_snapshot!(drawing_to_svg(&content), @r##"
        <svg xmlns="http://www.w3.org/2000/svg">
          <rect x="10" y="20" width="30" height="40" fill="#ff0000" stroke="#000000" stroke-width="2" stroke-dasharray="3,3" />
          <ellipse cx="50" cy="50" rx="5" ry="7.5" fill="none" />
          <line x1="10" y1="10" x2="20" y2="5" stroke="#888888" />
          <polyline points="1,1 2,2 4,4" fill="none" stroke="#888888" />
        </svg>
        "##);
    }

    #[test]
    fn test_attributes_are_escaped() {
        let content = json!({"objects": [{"type": "rectangle", "fill": "\"><script>"}]});
        let svg = drawing_to_svg(&content);
        assert!(svg.contains("fill=\"&quot;&gt;&lt;script&gt;\""));
    }
}
