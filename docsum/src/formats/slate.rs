//! Rich-text (slate) to Markdown
//!
//! Text tiles store their body as a JSON-encoded slate tree. Conversion is two-phased, the same
//! way every format here works:
//!
//!     JSON text -> RichNode tree -> Markdown
//!
//! Both the modern shape (`document.children`, boolean marks on leaves) and the legacy shape
//! (`document.nodes`, `leaves` with a `marks` list) are accepted.
//!
//! Marks nest in a fixed order, innermost first: code, bold, italic, underline. So a bold code
//! leaf is `**`x`**`.

use crate::common::markdown::fenced;
use crate::error::SummaryError;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub code: bool,
}

impl Marks {
    fn set(&mut self, mark: &str) {
        match mark {
            "bold" => self.bold = true,
            "italic" => self.italic = true,
            "underline" | "underlined" => self.underline = true,
            "code" => self.code = true,
            _ => {}
        }
    }

    fn from_leaf(leaf: &Value) -> Self {
        let mut marks = Marks::default();
        for mark in ["bold", "italic", "underline", "underlined", "code"] {
            if leaf.get(mark).and_then(Value::as_bool).unwrap_or(false) {
                marks.set(mark);
            }
        }
        if let Some(list) = leaf.get("marks").and_then(Value::as_array) {
            for mark in list {
                let name = mark
                    .as_str()
                    .or_else(|| mark.get("type").and_then(Value::as_str));
                if let Some(name) = name {
                    marks.set(name);
                }
            }
        }
        marks
    }

    fn apply(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let mut out = text.to_string();
        if self.code {
            out = format!("`{out}`");
        }
        if self.bold {
            out = format!("**{out}**");
        }
        if self.italic {
            out = format!("*{out}*");
        }
        if self.underline {
            out = format!("<u>{out}</u>");
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Paragraph,
    Heading(usize),
    BlockQuote,
    BulletedList,
    NumberedList,
    ListItem,
    CodeBlock,
    Link { href: String },
    Highlight,
    /// Legacy text node holding several differently-marked leaves
    Fragment,
    Other(String),
}

impl ElementKind {
    fn from_node(node: &Value) -> Self {
        let tag = node.get("type").and_then(Value::as_str).unwrap_or_default();
        match tag {
            "paragraph" | "line" => ElementKind::Paragraph,
            "heading1" | "heading-one" | "h1" => ElementKind::Heading(1),
            "heading2" | "heading-two" | "h2" => ElementKind::Heading(2),
            "heading3" | "heading-three" | "h3" => ElementKind::Heading(3),
            "heading4" | "heading-four" | "h4" => ElementKind::Heading(4),
            "heading5" | "heading-five" | "h5" => ElementKind::Heading(5),
            "heading6" | "heading-six" | "h6" => ElementKind::Heading(6),
            "block-quote" | "blockquote" => ElementKind::BlockQuote,
            "bulleted-list" | "ul" => ElementKind::BulletedList,
            "numbered-list" | "ol" => ElementKind::NumberedList,
            "list-item" | "li" => ElementKind::ListItem,
            "code-block" | "code" => ElementKind::CodeBlock,
            "link" => {
                let href = node
                    .get("href")
                    .or_else(|| node.get("url"))
                    .or_else(|| node.get("data").and_then(|data| data.get("href")))
                    .and_then(Value::as_str)
                    .filter(|href| !href.is_empty())
                    .unwrap_or("#");
                ElementKind::Link {
                    href: href.to_string(),
                }
            }
            "highlight" => ElementKind::Highlight,
            other => ElementKind::Other(other.to_string()),
        }
    }

    fn is_block(&self) -> bool {
        matches!(
            self,
            ElementKind::Paragraph
                | ElementKind::Heading(_)
                | ElementKind::BlockQuote
                | ElementKind::BulletedList
                | ElementKind::NumberedList
                | ElementKind::ListItem
                | ElementKind::CodeBlock
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RichNode {
    Text { text: String, marks: Marks },
    Element { kind: ElementKind, children: Vec<RichNode> },
}

impl RichNode {
    fn is_block(&self) -> bool {
        match self {
            RichNode::Text { .. } => false,
            RichNode::Element { kind, .. } => kind.is_block(),
        }
    }
}

/// Convert a JSON-encoded slate document to Markdown.
pub fn slate_to_markdown(source: &str) -> Result<String, SummaryError> {
    let value: Value = serde_json::from_str(source)
        .map_err(|e| SummaryError::MalformedTree(format!("not valid JSON: {e}")))?;
    let nodes = parse_tree(&value)?;
    Ok(serialize_blocks(&nodes, "\n\n").trim().to_string())
}

/// Build the node tree from a parsed slate value.
pub fn parse_tree(value: &Value) -> Result<Vec<RichNode>, SummaryError> {
    let root = value
        .get("document")
        .and_then(|document| {
            document
                .get("nodes")
                .or_else(|| document.get("children"))
                .and_then(Value::as_array)
        })
        .or_else(|| value.get("children").and_then(Value::as_array))
        .ok_or_else(|| {
            SummaryError::MalformedTree(
                "expected document.nodes, document.children or children".to_string(),
            )
        })?;

    Ok(root.iter().map(build_node).collect())
}

fn node_children(node: &Value) -> Option<&Vec<Value>> {
    node.get("children")
        .or_else(|| node.get("nodes"))
        .and_then(Value::as_array)
}

fn build_node(node: &Value) -> RichNode {
    if let Some(leaves) = node.get("leaves").and_then(Value::as_array) {
        return RichNode::Element {
            kind: ElementKind::Fragment,
            children: leaves.iter().map(build_leaf).collect(),
        };
    }

    match node_children(node) {
        Some(children) => RichNode::Element {
            kind: ElementKind::from_node(node),
            children: children.iter().map(build_node).collect(),
        },
        None => build_leaf(node),
    }
}

fn build_leaf(leaf: &Value) -> RichNode {
    RichNode::Text {
        text: leaf
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        marks: Marks::from_leaf(leaf),
    }
}

fn serialize_blocks(nodes: &[RichNode], separator: &str) -> String {
    nodes
        .iter()
        .map(serialize_node)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Children of a container: block children are separated by blank lines, inline ones run on.
fn serialize_children(children: &[RichNode]) -> String {
    if children.iter().any(RichNode::is_block) {
        serialize_blocks(children, "\n\n")
    } else {
        serialize_blocks(children, "")
    }
}

fn serialize_node(node: &RichNode) -> String {
    let (kind, children) = match node {
        RichNode::Text { text, marks } => return marks.apply(text),
        RichNode::Element { kind, children } => (kind, children),
    };

    match kind {
        ElementKind::Paragraph
        | ElementKind::ListItem
        | ElementKind::Fragment
        | ElementKind::Other(_) => serialize_children(children),
        ElementKind::Heading(level) => {
            format!("{} {}", "#".repeat(*level), serialize_children(children))
        }
        ElementKind::BlockQuote => serialize_children(children)
            .lines()
            .map(|line| format!("> {line}"))
            .collect::<Vec<_>>()
            .join("\n"),
        ElementKind::BulletedList => children
            .iter()
            .map(|item| format!("- {}", serialize_node(item)))
            .collect::<Vec<_>>()
            .join("\n"),
        ElementKind::NumberedList => children
            .iter()
            .enumerate()
            .map(|(index, item)| format!("{}. {}", index + 1, serialize_node(item)))
            .collect::<Vec<_>>()
            .join("\n"),
        ElementKind::CodeBlock => fenced("", &serialize_blocks(children, "\n")),
        ElementKind::Link { href } => format!("[{}]({href})", serialize_children(children)),
        ElementKind::Highlight => format!("=={}==", serialize_children(children)),
    }
}
