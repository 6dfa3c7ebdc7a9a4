//! Markdown building blocks: headings, fences and pipe tables.
//!
//! Tables are emitted unpadded (`| a | b |`) so that cell text can be matched literally by
//! downstream consumers. Every `|` inside a cell is escaped, and rows shorter than the header
//! are padded with empty cells.

use crate::model::{DataSetAttribute, NormalizedVariable};

/// A heading line followed by a blank line. Level 0 yields nothing.
pub fn heading(level: usize, text: &str) -> String {
    if level == 0 {
        return String::new();
    }
    format!("{} {text}\n\n", "#".repeat(level))
}

pub fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}

/// Wrap `body` in a fenced code block tagged with `info`.
pub fn fenced(info: &str, body: &str) -> String {
    format!("```{info}\n{body}\n```")
}

fn escape_pipe(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Render a pipe table. An empty header list produces an empty string.
pub fn generate_markdown_table<S: AsRef<str>>(headers: &[S], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    let header_cells: Vec<String> = headers.iter().map(|h| escape_pipe(h.as_ref())).collect();
    lines.push(format!("| {} |", header_cells.join(" | ")));
    lines.push(format!("| {} |", vec!["---"; headers.len()].join(" | ")));

    for row in rows {
        let mut cells: Vec<String> = row.iter().map(|cell| escape_pipe(cell)).collect();
        while cells.len() < headers.len() {
            cells.push(String::new());
        }
        lines.push(format!("| {} |", cells.join(" | ")));
    }

    lines.join("\n")
}

/// Attribute table for a data set. The formula column only appears when some attribute has one.
pub fn generate_attributes_markdown_table(attributes: &[DataSetAttribute]) -> String {
    let has_formula = attributes.iter().any(|attr| attr.formula.is_some());
    let mut headers = vec!["Id", "Name"];
    if has_formula {
        headers.push("Formula");
    }

    let rows: Vec<Vec<String>> = attributes
        .iter()
        .map(|attr| {
            let mut row = vec![attr.id.clone(), attr.name.clone()];
            if has_formula {
                row.push(attr.formula.clone().unwrap_or_default());
            }
            row
        })
        .collect();

    generate_markdown_table(&headers, &rows)
}

pub fn generate_variables_markdown_table(variables: &[NormalizedVariable]) -> String {
    let headers = [
        "Id",
        "Name",
        "Display Name",
        "Description",
        "Expression",
        "Value",
        "Unit",
    ];
    let rows: Vec<Vec<String>> = variables
        .iter()
        .map(|v| {
            vec![
                v.id.clone(),
                v.name.clone(),
                v.display_name.clone(),
                v.description.clone(),
                v.expression.clone(),
                v.value.clone(),
                v.unit.clone(),
            ]
        })
        .collect();

    generate_markdown_table(&headers, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_heading_levels() {
        assert_eq!(heading(2, "Row 1"), "## Row 1\n\n");
        assert_eq!(heading(0, "Row 1"), "");
    }

    #[test]
    fn test_table_escapes_pipes_and_pads_rows() {
        let table = generate_markdown_table(
            &["Name", "Note"],
            &[
                vec!["a|b".to_string(), "x".to_string()],
                vec!["short".to_string()],
            ],
        );
        assert_snapshot!(table, @r"
        | Name | Note |
        | --- | --- |
        | a\|b | x |
        | short |  |
        ");
    }

    #[test]
    fn test_table_without_headers_is_empty() {
        let empty: [&str; 0] = [];
        assert_eq!(generate_markdown_table(&empty, &[vec!["x".to_string()]]), "");
    }

    #[test]
    fn test_attribute_table_formula_column() {
        let attrs = vec![
            DataSetAttribute {
                id: "a1".to_string(),
                name: "x".to_string(),
                values: vec![],
                formula: None,
            },
            DataSetAttribute {
                id: "a2".to_string(),
                name: "y".to_string(),
                values: vec![],
                formula: Some("2 * x".to_string()),
            },
        ];
        let table = generate_attributes_markdown_table(&attrs);
        assert!(table.starts_with("| Id | Name | Formula |"));
        assert!(table.contains("| a1 | x |  |"));
        assert!(table.contains("| a2 | y | 2 * x |"));
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(1, "case", "cases"), "case");
        assert_eq!(pluralize(0, "case", "cases"), "cases");
    }
}
