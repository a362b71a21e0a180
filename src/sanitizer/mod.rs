//! Rich-Content Sanitizer
//!
//! Turns an untrusted markup fragment into a small, safe one. The allow-list in
//! [`policy`] is the security boundary: anything it does not name is unwrapped
//! or dropped. Structural cleanup runs as a pipeline of pure passes over an
//! owned tree (see [`passes`]), so each step can be checked on its own.
//!
//! ```rust
//! use oj_scrape::sanitizer::sanitize;
//!
//! let html = r#"<div class="x"><font color="red">2<sup>10</sup></font></div><script>x()</script>"#;
//! assert_eq!(sanitize(html), "<p>2<sup>10</sup></p>");
//! ```

pub mod passes;
pub mod policy;

pub use policy::{SanitizationPolicy, DEFAULT_POLICY};

use crate::tree::{self, Element, Node};

/// Upper bound on paragraph/container/break cleanup rounds.
///
/// Each round can only remove nodes or retype a `div`, so the loop settles
/// quickly; the bound keeps a pathological input from spinning.
const MAX_CLEANUP_ROUNDS: usize = 8;

/// Upper bound on whole-pipeline runs over serialized output.
const MAX_REPARSE_ROUNDS: usize = 4;

/// Sanitize with the default allow-list.
#[must_use]
pub fn sanitize(markup: &str) -> String {
    sanitize_with(markup, &DEFAULT_POLICY)
}

/// Sanitize with a caller-supplied allow-list.
///
/// Output is trimmed serialized markup. Sanitizing the output again yields the
/// same string: the pipeline is re-run on its own output until parsing it back
/// no longer changes anything.
#[must_use]
pub fn sanitize_with(markup: &str, policy: &SanitizationPolicy) -> String {
    let mut output = sanitize_once(markup, policy);
    for _ in 1..MAX_REPARSE_ROUNDS {
        let again = sanitize_once(&output, policy);
        if again == output {
            break;
        }
        output = again;
    }
    output
}

/// One parse, pass pipeline and serialization.
fn sanitize_once(markup: &str, policy: &SanitizationPolicy) -> String {
    let nodes = match tree::parse(markup) {
        Node::Element(root) => root.children,
        Node::Text(text) => vec![Node::Text(text)],
    };

    let nodes = passes::drop_scripts(nodes);
    let nodes = passes::filter_elements(nodes, policy);
    let nodes = passes::retype_containers(nodes);
    let mut nodes = passes::replace_nbsp(nodes);

    // Dropping an empty paragraph can leave its `div` without structure, which
    // then retypes to a paragraph that may itself be empty.
    for _ in 0..MAX_CLEANUP_ROUNDS {
        let cleaned = passes::collapse_breaks(passes::retype_containers(
            passes::clean_paragraphs(nodes.clone()),
        ));
        if cleaned == nodes {
            break;
        }
        nodes = cleaned;
    }
    let nodes = passes::collapse_blank_lines(nodes);

    Node::Element(Element::root(nodes))
        .to_html()
        .trim()
        .to_string()
}
