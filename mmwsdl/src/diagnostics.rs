//! Formatting of captured wire payloads and header blocks.

use indexmap::IndexMap;
use xmltree::{Element, EmitterConfig, ParserConfig, XMLNode};

/// Parses a captured payload. Whitespace-only text nodes are dropped so the
/// document can be re-indented.
///
/// External entities are never resolved.
pub fn parse_xml(raw: &str) -> Option<Element> {
    let config = ParserConfig::new()
        .trim_whitespace(true)
        .ignore_comments(true);

    let mut root = Element::parse_with_config(raw.as_bytes(), config).ok()?;
    strip_blank_text(&mut root);
    Some(root)
}

fn strip_blank_text(element: &mut Element) {
    element.children.retain(|node| match node {
        XMLNode::Text(text) => !text.trim().is_empty(),
        _ => true,
    });

    for child in element.children.iter_mut() {
        if let XMLNode::Element(child) = child {
            strip_blank_text(child);
        }
    }
}

/// Pretty-prints `raw`, or returns it unchanged when it is not XML.
pub fn format_xml(raw: &str) -> String {
    let Some(root) = parse_xml(raw) else {
        return raw.to_string();
    };

    let mut buf = Vec::new();
    let config = EmitterConfig::new()
        .write_document_declaration(true)
        .perform_indent(true)
        .indent_string("  ");

    match root.write_with_config(&mut buf, config) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => raw.to_string(),
    }
}

/// Splits a raw header block into a name → value map.
///
/// Lines without a colon (such as the status line) are skipped, values are
/// trimmed and a repeated name keeps its last value.
pub fn headers_to_map(raw: &str) -> IndexMap<String, String> {
    raw.lines()
        .filter_map(|line| line.split_once(':'))
        .filter(|(name, _)| !name.trim().is_empty())
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_reindents_documents() {
        let pretty = format_xml("<a><b>1</b>   <c/></a>");
        assert!(pretty.starts_with("<?xml"));
        assert!(pretty.contains("\n  <b>1</b>"));
        assert!(pretty.contains("\n  <c"));
    }

    #[test]
    fn format_falls_back_to_raw_text() {
        assert_eq!(format_xml("Service Unavailable"), "Service Unavailable");
    }

    #[test]
    fn parse_drops_blank_nodes() {
        let root = parse_xml("<a>\n  <b>x</b>\n</a>").unwrap();
        assert_eq!(root.children.len(), 1);
        assert!(parse_xml("<a>").is_none());
    }

    #[test]
    fn headers_split_on_first_colon() {
        let map = headers_to_map(
            "HTTP/1.1 200 OK\r\nContent-Type: text/xml; charset=utf-8\r\nLocation: http://host:80/x\r\n: orphan\r\nbroken line\r\n",
        );

        assert_eq!(map.len(), 2);
        assert_eq!(map["Content-Type"], "text/xml; charset=utf-8");
        assert_eq!(map["Location"], "http://host:80/x");
    }
}
