//! Shared helpers for the integration tests: fixture loading and report inspection.

use comrak::nodes::{AstNode, NodeValue};
use comrak::{parse_document, Arena, ComrakOptions};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn load_fixture(name: &str) -> Value {
    let path = fixture_path(name);
    let text = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {e}", path.display()));
    serde_json::from_str(&text)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {e}", path.display()))
}

fn collect_text<'a>(node: &'a AstNode<'a>, output: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => output.push_str(text),
        NodeValue::Code(code) => output.push_str(&code.literal),
        _ => {
            for child in node.children() {
                collect_text(child, output);
            }
        }
    }
}

/// Every heading in a Markdown report as `(level, text)`, in document order.
pub fn headings(markdown: &str) -> Vec<(u8, String)> {
    let arena = Arena::new();
    let root = parse_document(&arena, markdown, &ComrakOptions::default());
    root.descendants()
        .filter_map(|node| {
            let level = match &node.data.borrow().value {
                NodeValue::Heading(heading) => heading.level,
                _ => return None,
            };
            let mut text = String::new();
            collect_text(node, &mut text);
            Some((level, text))
        })
        .collect()
}

/// Contents of every fenced code block tagged `info`.
pub fn fenced_blocks(markdown: &str, info: &str) -> Vec<String> {
    let arena = Arena::new();
    let root = parse_document(&arena, markdown, &ComrakOptions::default());
    root.descendants()
        .filter_map(|node| match &node.data.borrow().value {
            NodeValue::CodeBlock(block) if block.fenced && block.info == info => {
                Some(block.literal.clone())
            }
            _ => None,
        })
        .collect()
}
