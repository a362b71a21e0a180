//! DOM Operations Adapter
//!
//! Thin helpers over the `dom_query` crate for whole judge pages. Page-level
//! work (locating headings, labels, notices, tables and forms, rewriting image
//! sources) goes through these functions; fragment sanitization works on the
//! owned tree in [`crate::tree`] instead.

// Re-export core types for external use
pub use dom_query::{Document, NodeRef, Selection};

// Re-export StrTendril for external use
pub use tendril::StrTendril;

// === Attribute Operations ===

/// Get any attribute value
#[inline]
#[must_use]
pub fn get_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|s| s.to_string())
}

/// Get a non-blank attribute value
#[must_use]
pub fn non_empty_attribute(sel: &Selection, name: &str) -> Option<String> {
    get_attribute(sel, name).filter(|value| !value.trim().is_empty())
}

/// Set an attribute value
#[inline]
pub fn set_attribute(sel: &Selection, name: &str, value: &str) {
    sel.set_attr(name, value);
}

/// Check if attribute exists
#[inline]
#[must_use]
pub fn has_attribute(sel: &Selection, name: &str) -> bool {
    sel.has_attr(name)
}

/// Remove an attribute
#[inline]
pub fn remove_attribute(sel: &Selection, name: &str) {
    sel.remove_attr(name);
}

/// Check that the element carries every class in `classes`
#[must_use]
pub fn has_all_classes(node: &NodeRef, classes: &[&str]) -> bool {
    classes.iter().all(|class| node.has_class(class))
}

// === Tag/Node Information ===

/// Get tag name of a single node (lowercase)
#[must_use]
pub fn node_tag_name(node: &NodeRef) -> Option<String> {
    node.node_name().map(|t| t.to_string())
}

// === Text Content ===

/// Get all text content of node and descendants
///
/// Returns `StrTendril` for zero-copy passing. Use `.to_string()` only when
/// you need owned storage.
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> StrTendril {
    sel.text()
}

/// Get inner HTML content
#[inline]
#[must_use]
pub fn inner_html(sel: &Selection) -> StrTendril {
    sel.inner_html()
}

/// Get outer HTML content
#[inline]
#[must_use]
pub fn outer_html(sel: &Selection) -> StrTendril {
    sel.html()
}

// === Iteration ===

/// Iterate the matched nodes as single-node selections
pub fn each<'a, 'b>(sel: &'b Selection<'a>) -> impl Iterator<Item = Selection<'a>> + 'b {
    sel.nodes().iter().map(|node| Selection::from(*node))
}

// === Parsing ===

/// Parse HTML string into document
///
/// Never fails: html5ever repairs tag soup the way browsers do.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_select() {
        let doc = parse(r#"<div id="main" class="padding">content</div>"#);
        let div = doc.select("div");

        assert_eq!(get_attribute(&div, "id"), Some("main".to_string()));
        assert_eq!(get_attribute(&div, "class"), Some("padding".to_string()));
    }

    #[test]
    fn test_parse_tolerates_tag_soup() {
        let doc = parse("<div><p>one<p>two</b></div></span>");
        assert_eq!(doc.select("p").length(), 2);
        assert_eq!(text_content(&doc.select("div")), "onetwo".into());
    }

    #[test]
    fn test_attribute_modification() {
        let doc = parse(r#"<img src="/old.png" data-src="/lazy.png">"#);
        let img = doc.select("img");

        set_attribute(&img, "src", "/new.png");
        remove_attribute(&img, "data-src");

        assert_eq!(get_attribute(&img, "src"), Some("/new.png".to_string()));
        assert!(!has_attribute(&img, "data-src"));
    }

    #[test]
    fn test_non_empty_attribute() {
        let doc = parse(r#"<img src="  "><img src="a.png">"#);
        let imgs: Vec<_> = each(&doc.select("img")).collect();

        assert_eq!(non_empty_attribute(&imgs[0], "src"), None);
        assert_eq!(non_empty_attribute(&imgs[1], "src"), Some("a.png".to_string()));
    }

    #[test]
    fn test_has_all_classes() {
        let doc = parse(r#"<div class="ui bottom attached segment font-content">x</div>"#);
        let div = doc.select("div");
        let node = div.nodes()[0];

        assert!(has_all_classes(&node, &["ui", "bottom", "attached", "segment"]));
        assert!(!has_all_classes(&node, &["ui", "top", "attached", "segment"]));
    }

    #[test]
    fn test_operations_on_empty_selection() {
        let doc = parse(r#"<div>content</div>"#);
        let empty = doc.select("span");

        set_attribute(&empty, "class", "test");
        remove_attribute(&empty, "id");

        assert_eq!(text_content(&empty), "".into());
        assert!(inner_html(&empty).is_empty());
    }

    #[test]
    fn test_text_and_html_content() {
        let doc = parse(r#"<div>text <span>nested</span> more</div>"#);
        let div = doc.select("div");

        assert_eq!(text_content(&div), "text nested more".into());
        assert!(inner_html(&div).contains("<span>"));
        assert!(outer_html(&div).contains("<div>"));
        assert_eq!(node_tag_name(&div.nodes()[0]), Some("div".to_string()));
    }
}
