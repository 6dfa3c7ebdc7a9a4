use crate::common::{fenced_blocks, load_fixture};
use docsum::{summarize_document, SummarizerOptions, TileHandlers};

fn svg_options() -> SummarizerOptions {
    SummarizerOptions {
        tile_handlers: Some(TileHandlers::with_defaults().with_drawing_svg()),
        ..SummarizerOptions::default()
    }
}

#[test]
fn test_default_drawing_handler_is_a_sentence() {
    let out = summarize_document(&load_fixture("drawing.json"), &SummarizerOptions::default())
        .unwrap();
    assert!(out.contains("### Tile 1\n\nThis tile contains a drawing.\n"));
    assert!(fenced_blocks(&out, "svg").is_empty());
}

#[test]
fn test_svg_drawing_is_well_formed() {
    let out = summarize_document(&load_fixture("drawing.json"), &svg_options()).unwrap();
    assert!(out.contains(
        "This tile contains a drawing. The drawing is rendered below in an svg code fence:\n\n```svg\n"
    ));

    let blocks = fenced_blocks(&out, "svg");
    assert_eq!(blocks.len(), 1);
    let doc = roxmltree::Document::parse(&blocks[0]).expect("svg should be well-formed XML");

    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "svg");
    let tags: Vec<&str> = root
        .children()
        .filter(|node| node.is_element())
        .map(|node| node.tag_name().name())
        .collect();
    assert_eq!(tags, vec!["rect", "ellipse", "line", "polyline"]);

    let polyline = root
        .children()
        .find(|node| node.has_tag_name("polyline"))
        .unwrap();
    assert_eq!(polyline.attribute("points"), Some("5,5 10,5 10,10"));
    assert_eq!(polyline.attribute("fill"), Some("none"));

    let line = root.children().find(|node| node.has_tag_name("line")).unwrap();
    assert_eq!(line.attribute("x2"), Some("40"));
    assert_eq!(line.attribute("y2"), Some("40"));
}

#[test]
fn test_empty_drawing_renders_empty_svg() {
    let content = serde_json::json!({
        "rowOrder": ["r1"],
        "rowMap": {"r1": {"tiles": [{"tileId": "d1"}]}},
        "tileMap": {"d1": {"id": "d1", "content": {"type": "Drawing", "objects": []}}}
    });
    let out = summarize_document(&content, &svg_options()).unwrap();
    assert_eq!(fenced_blocks(&out, "svg"), vec!["<svg></svg>\n".to_string()]);
}
