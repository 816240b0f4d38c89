//! XML helpers: namespace-agnostic tree navigation and escaped output
//! writing.
//!
//! Navigation works on local names only; directory responses and RegRep
//! documents arrive with varying namespace prefixes.

use roxmltree::Node;

/// Get the tag name of a node without its namespace prefix.
pub fn local_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Find the first child element with the given local name.
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && local_name(*child) == tag)
}

/// Find all child elements with the given local name.
pub fn find_children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && local_name(*child) == tag)
}

/// Get the text content of a node, trimmed.
pub fn text_of(node: Node<'_, '_>) -> String {
    node.text().map(|s| s.trim().to_string()).unwrap_or_default()
}

/// Get the trimmed text of the first child element with the given local
/// name; `None` when the child is absent or empty.
pub fn child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    find_child(node, tag)
        .map(text_of)
        .filter(|s| !s.is_empty())
}

/// Escape a string for use as XML text content.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a string for use inside a double-quoted attribute value.
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// A minimal push-based XML writer producing indented output.
///
/// Tag and attribute names are written verbatim; text and attribute
/// values are escaped. Callers are responsible for balancing
/// open/close pairs.
pub struct XmlWriter {
    buf: String,
    depth: usize,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self {
            buf: String::new(),
            depth: 0,
        }
    }

    /// Write the XML declaration. Call first.
    pub fn declaration(&mut self) {
        self.buf.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    }

    /// Open an element without attributes.
    pub fn open(&mut self, tag: &str) {
        self.open_with(tag, &[]);
    }

    /// Open an element with attributes.
    pub fn open_with(&mut self, tag: &str, attributes: &[(&str, &str)]) {
        self.indent();
        self.start_tag(tag, attributes);
        self.buf.push_str(">\n");
        self.depth += 1;
    }

    /// Close the element opened by the matching `open` call.
    pub fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push_str(">\n");
    }

    /// Write a childless element with text content.
    pub fn leaf(&mut self, tag: &str, text: &str) {
        self.leaf_with(tag, &[], text);
    }

    /// Write a childless element with attributes and text content.
    pub fn leaf_with(&mut self, tag: &str, attributes: &[(&str, &str)], text: &str) {
        self.indent();
        self.start_tag(tag, attributes);
        self.buf.push('>');
        self.buf.push_str(&escape_text(text));
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push_str(">\n");
    }

    /// Consume the writer and return the document.
    pub fn into_string(self) -> String {
        self.buf
    }

    fn start_tag(&mut self, tag: &str, attributes: &[(&str, &str)]) {
        self.buf.push('<');
        self.buf.push_str(tag);
        for (name, value) in attributes {
            self.buf.push(' ');
            self.buf.push_str(name);
            self.buf.push_str("=\"");
            self.buf.push_str(&escape_attribute(value));
            self.buf.push('"');
        }
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.buf.push_str("  ");
        }
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use roxmltree::Document;

    #[test]
    fn test_local_name_strips_namespace() {
        let xml = r#"<ns:root xmlns:ns="http://example.com"><ns:child/></ns:root>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(local_name(doc.root_element()), "root");
    }

    #[test]
    fn test_find_child() {
        let xml = r#"<root><a/><b/><c/></root>"#;
        let doc = Document::parse(xml).unwrap();
        let root = doc.root_element();

        assert!(find_child(root, "a").is_some());
        assert!(find_child(root, "d").is_none());
    }

    #[test]
    fn test_find_children() {
        let xml = r#"<root><item>1</item><other/><item>2</item></root>"#;
        let doc = Document::parse(xml).unwrap();
        let items: Vec<_> = find_children(doc.root_element(), "item").collect();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_child_text() {
        let xml = r#"<root><name>  Elonia  </name><empty></empty></root>"#;
        let doc = Document::parse(xml).unwrap();
        let root = doc.root_element();

        assert_eq!(child_text(root, "name"), Some("Elonia".to_string()));
        assert_eq!(child_text(root, "empty"), None);
        assert_eq!(child_text(root, "missing"), None);
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a < b & c > d"), "a &lt; b &amp; c &gt; d");
        assert_eq!(escape_text("plain"), "plain");
    }

    #[test]
    fn test_escape_attribute_quotes() {
        assert_eq!(escape_attribute(r#"say "hi""#), "say &quot;hi&quot;");
    }

    #[test]
    fn test_writer_produces_well_formed_output() {
        let mut w = XmlWriter::new();
        w.declaration();
        w.open_with("root", &[("id", "r&1")]);
        w.leaf("name", "a < b");
        w.open("nested");
        w.leaf_with("item", &[("n", "1")], "x");
        w.close("nested");
        w.close("root");

        let out = w.into_string();
        let doc = Document::parse(&out).unwrap();
        let root = doc.root_element();
        assert_eq!(root.attribute("id"), Some("r&1"));
        assert_eq!(child_text(root, "name"), Some("a < b".to_string()));
    }
}
