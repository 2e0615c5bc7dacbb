// src/extract/xml.rs

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use roxmltree::Node;

/// First element at or below `node` whose local name is `tag`, in document
/// order. Namespace prefixes are ignored.
pub fn find_first<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == tag)
}

/// Every element at or below `node` whose local name is `tag`.
pub fn find_all<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.descendants()
        .filter(move |n| n.is_element() && n.tag_name().name() == tag)
}

/// Concatenated text of all descendant text nodes, untrimmed.
pub fn text_content(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// Text of the first `tag` element below `node`.
pub fn find_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    find_first(node, tag).map(text_content)
}

/// Year of an e-file date (`2020-01-01`, with or without a time part).
pub fn parse_tax_year(raw: &str) -> Option<i32> {
    let s = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.year());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.year());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.year());
    }
    // bare year
    if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) {
        return s.parse().ok();
    }
    None
}
