//! Markdown to Notion block conversion.
//!
//! Covers the subset of markdown the summarization model produces:
//! headings, bulleted and numbered lists, dividers, paragraphs.

use serde_json::{json, Value};

/// Convert a markdown document into Notion block objects.
#[must_use]
pub fn markdown_to_blocks(markdown: &str) -> Vec<Value> {
    let mut blocks = Vec::new();

    for line in markdown.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let block = if let Some(text) = trimmed.strip_prefix("### ") {
            heading_block("heading_3", text)
        } else if let Some(text) = trimmed.strip_prefix("## ") {
            heading_block("heading_2", text)
        } else if let Some(text) = trimmed.strip_prefix("# ") {
            heading_block("heading_1", text)
        } else if let Some(text) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* "))
        {
            text_block("bulleted_list_item", text)
        } else if let Some(text) = numbered_item(trimmed) {
            text_block("numbered_list_item", text)
        } else if matches!(trimmed, "---" | "***" | "___") {
            json!({ "object": "block", "type": "divider", "divider": {} })
        } else {
            text_block("paragraph", trimmed)
        };

        blocks.push(block);
    }

    blocks
}

/// Strip a `1. ` style prefix, returning the item text.
fn numbered_item(line: &str) -> Option<&str> {
    let dot = line.find(". ")?;
    if line[..dot].chars().all(|c| c.is_ascii_digit()) && dot > 0 {
        Some(line[dot + 2..].trim())
    } else {
        None
    }
}

fn heading_block(kind: &str, text: &str) -> Value {
    json!({
        "object": "block",
        "type": kind,
        kind: { "rich_text": [ { "type": "text", "text": { "content": text.trim() } } ] },
    })
}

fn text_block(kind: &str, text: &str) -> Value {
    json!({
        "object": "block",
        "type": kind,
        kind: { "rich_text": [ { "type": "text", "text": { "content": text.trim() } } ] },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(markdown: &str) -> Vec<String> {
        markdown_to_blocks(markdown)
            .iter()
            .map(|b| b["type"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_headings() {
        assert_eq!(
            kinds("# One\n## Two\n### Three"),
            vec!["heading_1", "heading_2", "heading_3"]
        );
    }

    #[test]
    fn test_lists_and_divider() {
        let md = "- first\n* second\n1. third\n---";
        assert_eq!(
            kinds(md),
            vec![
                "bulleted_list_item",
                "bulleted_list_item",
                "numbered_list_item",
                "divider"
            ]
        );
    }

    #[test]
    fn test_blank_lines_skipped() {
        assert_eq!(kinds("one\n\n\ntwo"), vec!["paragraph", "paragraph"]);
    }

    #[test]
    fn test_content_preserved() {
        let blocks = markdown_to_blocks("## Completed work\n- Fix bug A");
        assert_eq!(
            blocks[0]["heading_2"]["rich_text"][0]["text"]["content"],
            "Completed work"
        );
        assert_eq!(
            blocks[1]["bulleted_list_item"]["rich_text"][0]["text"]["content"],
            "Fix bug A"
        );
    }

    #[test]
    fn test_numbered_item_requires_digits() {
        assert_eq!(numbered_item("1. do it"), Some("do it"));
        assert_eq!(numbered_item("12. do it"), Some("do it"));
        assert_eq!(numbered_item("a. not a list"), None);
        assert_eq!(numbered_item("no dot here"), None);
    }
}
