//! Owned Document Tree
//!
//! A small owned tree of element and text nodes. Fragments are parsed with
//! `dom_query` (html5ever, so tag soup is repaired the way a browser would)
//! and then copied into [`Node`] values that the sanitizer passes can consume
//! and rebuild without touching shared state.
//!
//! ```rust
//! use oj_scrape::tree;
//!
//! let root = tree::parse("<p>a &lt; b<br>c");
//! assert_eq!(root.to_html(), "<p>a &lt; b<br>c</p>");
//! assert_eq!(root.text(), "a < bc");
//! ```

use crate::dom::{self, NodeRef};

/// Name of the synthetic element that holds a parsed fragment.
pub const ROOT: &str = "#root";

/// Elements that never have children or an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose text is emitted without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// A parsed node: an element or a run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Element with a tag name, attributes and children.
    Element(Element),
    /// Text content, entities already decoded.
    Text(String),
}

/// An element node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name.
    pub name: String,
    /// Attributes in source order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes in document order.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element without attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children,
        }
    }

    /// Create the synthetic fragment root.
    #[must_use]
    pub fn root(children: Vec<Node>) -> Self {
        Self::new(ROOT, children)
    }

    /// Check the tag name.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Get an attribute value.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether any descendant element satisfies `pred`.
    pub fn has_descendant(&self, pred: &impl Fn(&Element) -> bool) -> bool {
        self.children.iter().any(|child| match child {
            Node::Element(el) => pred(el) || el.has_descendant(pred),
            Node::Text(_) => false,
        })
    }

    /// Whether this is a void element.
    #[must_use]
    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }
}

impl Node {
    /// Borrow the element, if this is one.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) => None,
        }
    }

    /// Whether this is an element with the given tag name.
    #[must_use]
    pub fn is_element(&self, name: &str) -> bool {
        self.as_element().is_some_and(|el| el.is(name))
    }

    /// Whether this is a text node made only of whitespace.
    #[must_use]
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }

    /// Child nodes (empty for text).
    #[must_use]
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Element(el) => &el.children,
            Self::Text(_) => &[],
        }
    }

    /// All text of this node and its descendants, concatenated.
    #[must_use]
    pub fn text(&self) -> String {
        self.text_fragments().concat()
    }

    /// Every text node below (and including) this node, in document order.
    #[must_use]
    pub fn text_fragments(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_text(self, &mut out);
        out
    }

    /// Text nodes joined with `separator`, like a soup `get_text(separator)`.
    #[must_use]
    pub fn joined_text(&self, separator: &str) -> String {
        self.text_fragments().join(separator)
    }

    /// Stripped, non-empty text fragments joined with `separator`.
    #[must_use]
    pub fn stripped_text(&self, separator: &str) -> String {
        self.text_fragments()
            .into_iter()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Serialize to HTML. The fragment root emits only its children.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_html(self, false, &mut out);
        out
    }
}

fn collect_text<'a>(node: &'a Node, out: &mut Vec<&'a str>) {
    match node {
        Node::Text(text) => out.push(text),
        Node::Element(el) => {
            for child in &el.children {
                collect_text(child, out);
            }
        }
    }
}

fn write_html(node: &Node, raw_text: bool, out: &mut String) {
    match node {
        Node::Text(text) if raw_text => out.push_str(text),
        Node::Text(text) => escape_into(text, false, out),
        Node::Element(el) if el.is(ROOT) => {
            for child in &el.children {
                write_html(child, false, out);
            }
        }
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.name);
            for (key, value) in &el.attrs {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                escape_into(value, true, out);
                out.push('"');
            }
            out.push('>');
            if el.is_void() {
                return;
            }
            // The parser swallows one newline right after <pre>; emit a spare.
            if matches!(el.name.as_str(), "pre" | "textarea" | "listing")
                && matches!(el.children.first(), Some(Node::Text(t)) if t.starts_with('\n'))
            {
                out.push('\n');
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&el.name.as_str());
            for child in &el.children {
                write_html(child, raw, out);
            }
            out.push_str("</");
            out.push_str(&el.name);
            out.push('>');
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

/// Copy a `dom_query` node (and its subtree) into an owned [`Node`].
///
/// Comments, doctypes and processing instructions yield `None`.
#[must_use]
pub fn from_node(node: &NodeRef) -> Option<Node> {
    if node.is_text() {
        return Some(Node::Text(node.text().to_string()));
    }
    if !node.is_element() {
        return None;
    }
    let name = dom::node_tag_name(node)?;
    let attrs = node
        .attrs()
        .iter()
        .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
        .collect();
    let children = node.children().iter().filter_map(from_node).collect();
    Some(Node::Element(Element {
        name,
        attrs,
        children,
    }))
}

/// Stripped text fragments of a page node joined with `separator`.
#[must_use]
pub fn stripped_text(node: &NodeRef, separator: &str) -> String {
    from_node(node)
        .map(|owned| owned.stripped_text(separator))
        .unwrap_or_default()
}

/// Parse an HTML fragment into a [`ROOT`] element.
///
/// Never fails. Content the HTML parser moves into `<head>` (stray `<style>`,
/// `<title>`, `<meta>`) is not part of the fragment.
#[must_use]
pub fn parse(html: &str) -> Node {
    let doc = dom::parse(html);
    let body = doc.select("body");
    let children = body
        .nodes()
        .first()
        .map(|node| node.children().iter().filter_map(from_node).collect())
        .unwrap_or_default();
    Node::Element(Element::root(children))
}
