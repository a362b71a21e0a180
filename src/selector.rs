//! Selector Infrastructure
//!
//! Section lookup pairs a heading with the block that follows it, which is
//! expressed here as an explicit walk over an ordered sibling sequence. A
//! match predicate picks the block and a boundary predicate ends the search
//! early. The walk itself knows nothing about the tree library that produced
//! the siblings.

use crate::dom::{self, NodeRef};

/// Find the first sibling satisfying `is_match`, stopping at a boundary.
///
/// Siblings are examined in order. A sibling that satisfies `is_boundary`
/// (and not `is_match`) ends the search with `None`, as does running out of
/// siblings. Everything else, such as whitespace text, is skipped.
///
/// # Example
///
/// ```rust
/// use oj_scrape::selector::next_sibling_where;
///
/// let siblings = ["ws", "note", "block", "heading"];
/// let found = next_sibling_where(siblings, |s| *s == "block", |s| *s == "heading");
/// assert_eq!(found, Some("block"));
///
/// let siblings = ["ws", "heading", "block"];
/// let found = next_sibling_where(siblings, |s| *s == "block", |s| *s == "heading");
/// assert_eq!(found, None);
/// ```
pub fn next_sibling_where<T>(
    siblings: impl IntoIterator<Item = T>,
    is_match: impl Fn(&T) -> bool,
    is_boundary: impl Fn(&T) -> bool,
) -> Option<T> {
    for sibling in siblings {
        if is_match(&sibling) {
            return Some(sibling);
        }
        if is_boundary(&sibling) {
            return None;
        }
    }
    None
}

/// Iterate the siblings that follow `node`, text nodes included.
pub fn following_siblings<'a>(node: &NodeRef<'a>) -> impl Iterator<Item = NodeRef<'a>> {
    std::iter::successors(node.next_sibling(), NodeRef::next_sibling)
}

/// Check a node's tag name.
#[must_use]
pub fn is_tag(node: &NodeRef, tag: &str) -> bool {
    dom::node_tag_name(node).is_some_and(|name| name == tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_segment(node: &NodeRef) -> bool {
        is_tag(node, "div") && dom::has_all_classes(node, &["segment"])
    }

    fn is_heading(node: &NodeRef) -> bool {
        is_tag(node, "h4")
    }

    #[test]
    fn test_walk_skips_text_and_unrelated_blocks() {
        let doc = dom::parse(
            r#"<div><h4 id="h">Title</h4>
                text <p>aside</p>
                <div class="segment">body</div></div>"#,
        );
        let heading = doc.select("#h").nodes()[0];

        let found = next_sibling_where(following_siblings(&heading), is_segment, is_heading);
        assert_eq!(found.map(|n| n.text().to_string()), Some("body".to_string()));
    }

    #[test]
    fn test_walk_stops_at_next_heading() {
        let doc = dom::parse(
            r#"<div><h4 id="h">Empty</h4><h4>Next</h4><div class="segment">x</div></div>"#,
        );
        let heading = doc.select("#h").nodes()[0];

        let found = next_sibling_where(following_siblings(&heading), is_segment, is_heading);
        assert!(found.is_none());
    }

    #[test]
    fn test_walk_ends_with_container() {
        let doc = dom::parse(r#"<div><h4 id="h">Last</h4> </div><div class="segment">x</div>"#);
        let heading = doc.select("#h").nodes()[0];

        let found = next_sibling_where(following_siblings(&heading), is_segment, is_heading);
        assert!(found.is_none());
    }
}
