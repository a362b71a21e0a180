//! Sanitizer passes.
//!
//! Each pass consumes the children of a fragment root and returns a rebuilt
//! list. Passes never share state, so each can be tested in isolation and
//! their order is visible in [`crate::sanitizer::sanitize_with`].

use crate::patterns::{BLANK_LINE_RUN, SCRIPT_SCHEME};
use crate::sanitizer::policy::{
    SanitizationPolicy, DELETED_TAGS, INLINE_WRAPPER_TAGS, LEGACY_FONT_TAGS, STRUCTURAL_TAGS,
    URL_ATTRIBUTES,
};
use crate::tree::{Element, Node};

/// Rebuild `el` with transformed children, keeping its name and attributes.
fn map_children(el: Element, f: impl FnOnce(Vec<Node>) -> Vec<Node>) -> Element {
    let Element {
        name,
        attrs,
        children,
    } = el;
    Element {
        name,
        attrs,
        children: f(children),
    }
}

// === Pass 1: script/style removal ===

/// Delete `script` and `style` subtrees, content included.
#[must_use]
pub fn drop_scripts(nodes: Vec<Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .filter(|node| !DELETED_TAGS.iter().any(|tag| node.is_element(tag)))
        .map(|node| match node {
            Node::Element(el) => Node::Element(map_children(el, drop_scripts)),
            text @ Node::Text(_) => text,
        })
        .collect()
}

// === Pass 2: allow-list filtering ===

/// Apply the allow-list.
///
/// Legacy font tags and tags outside the policy are unwrapped (children
/// promoted). Allowed tags keep only their permitted attributes. Images
/// without a usable `src` are removed, and attribute-less inline wrappers are
/// unwrapped.
#[must_use]
pub fn filter_elements(nodes: Vec<Node>, policy: &SanitizationPolicy) -> Vec<Node> {
    nodes
        .into_iter()
        .flat_map(|node| filter_node(node, policy))
        .collect()
}

fn filter_node(node: Node, policy: &SanitizationPolicy) -> Vec<Node> {
    let el = match node {
        Node::Element(el) => el,
        text @ Node::Text(_) => return vec![text],
    };
    let name = el.name.to_ascii_lowercase();
    let children = filter_elements(el.children, policy);

    if LEGACY_FONT_TAGS.contains(&name.as_str()) || !policy.allows_tag(&name) {
        return children;
    }

    let attrs: Vec<(String, String)> = el
        .attrs
        .into_iter()
        .filter(|(key, value)| policy.allows_attr(&name, key) && is_safe_value(&name, key, value))
        .collect();

    if name == "img" && !attrs.iter().any(|(k, v)| k == "src" && !v.trim().is_empty()) {
        return Vec::new();
    }
    if INLINE_WRAPPER_TAGS.contains(&name.as_str()) && attrs.is_empty() {
        return children;
    }

    let filtered = Element {
        name,
        attrs,
        children,
    };
    if filtered.is("table") {
        return foster_table(filtered);
    }
    vec![Node::Element(filtered)]
}

/// Reject URL values that would run script or smuggle documents.
fn is_safe_value(tag: &str, key: &str, value: &str) -> bool {
    if !URL_ATTRIBUTES.contains(&key) {
        return true;
    }
    let compact: String = value.chars().filter(|c| !c.is_ascii_control()).collect();
    if SCRIPT_SCHEME.is_match(&compact) {
        return false;
    }
    let lower = compact.trim_start().to_ascii_lowercase();
    if lower.starts_with("data:") {
        return tag == "img" && lower.starts_with("data:image/");
    }
    true
}

/// Move content that cannot live inside table structure in front of the table.
///
/// Unwrapping a `<caption>` or a stray wrapper can leave text directly inside
/// `<table>`/`<tr>`; a parser would relocate it in front of the table, so the
/// sanitizer does the same to keep its output stable when parsed again.
fn foster_table(table: Element) -> Vec<Node> {
    let mut hoisted = Vec::new();
    let table = foster_children(table, &mut hoisted);
    hoisted.push(Node::Element(table));
    hoisted
}

fn foster_children(el: Element, hoisted: &mut Vec<Node>) -> Element {
    let fits: fn(&str) -> bool = match el.name.as_str() {
        "table" => |child| matches!(child, "thead" | "tbody" | "tfoot" | "tr"),
        "thead" | "tbody" | "tfoot" => |child| child == "tr",
        "tr" => |child| matches!(child, "td" | "th"),
        _ => return el,
    };
    let mut kept = Vec::with_capacity(el.children.len());
    for child in el.children {
        match child {
            blank if blank.is_blank_text() => kept.push(blank),
            Node::Element(inner) if fits(&inner.name) => {
                kept.push(Node::Element(foster_children(inner, hoisted)));
            }
            other => hoisted.push(other),
        }
    }
    Element {
        name: el.name,
        attrs: el.attrs,
        children: kept,
    }
}

// === Pass 3: generic container retyping ===

/// Retype attribute-free `div`s without structural descendants to `p`.
///
/// Containers that do hold structure keep their role but lose every attribute.
#[must_use]
pub fn retype_containers(nodes: Vec<Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .map(|node| match node {
            Node::Element(el) => {
                let structural =
                    el.has_descendant(&|child: &Element| STRUCTURAL_TAGS.contains(child.name.as_str()));
                let is_div = el.is("div");
                let mut rebuilt = Element {
                    name: el.name,
                    attrs: el.attrs,
                    children: retype_containers(el.children),
                };
                if is_div {
                    rebuilt.attrs.clear();
                    if !structural {
                        rebuilt.name = "p".to_string();
                    }
                }
                Node::Element(rebuilt)
            }
            text @ Node::Text(_) => text,
        })
        .collect()
}

// === Pass 4: non-breaking spaces ===

/// Replace NBSP characters with regular spaces in every text node.
#[must_use]
pub fn replace_nbsp(nodes: Vec<Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .map(|node| match node {
            Node::Text(text) => Node::Text(text.replace('\u{a0}', " ")),
            Node::Element(el) => Node::Element(map_children(el, replace_nbsp)),
        })
        .collect()
}

// === Pass 5: paragraphs ===

fn has_image(el: &Element) -> bool {
    el.has_descendant(&|child: &Element| child.is("img"))
}

/// Drop empty paragraphs and unwrap image-only paragraphs.
///
/// A paragraph is empty with neither visible text nor an image. One whose
/// meaningful children are all images is replaced by those images.
#[must_use]
pub fn clean_paragraphs(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        let el = match node {
            Node::Element(el) => el,
            text @ Node::Text(_) => {
                out.push(text);
                continue;
            }
        };
        let el = map_children(el, clean_paragraphs);
        if !el.is("p") {
            out.push(Node::Element(el));
            continue;
        }

        let node = Node::Element(el);
        let visible = !node.text().trim().is_empty();
        let image = node.as_element().is_some_and(has_image);
        if !visible && !image {
            continue;
        }
        if image {
            let meaningful: Vec<&Node> =
                node.children().iter().filter(|c| !c.is_blank_text()).collect();
            if !meaningful.is_empty() && meaningful.iter().all(|c| c.is_element("img")) {
                out.extend(meaningful.into_iter().cloned());
                continue;
            }
        }
        out.push(node);
    }
    out
}

// === Pass 6: line breaks ===

/// Maximum consecutive `<br>` elements kept.
const MAX_BREAK_RUN: usize = 2;

/// Collapse runs of three or more `<br>` to two and drop dangling breaks.
///
/// Whitespace-only text between breaks does not end a run. Breaks at the very
/// start or end of a container (ignoring whitespace) separate nothing and are
/// removed.
#[must_use]
pub fn collapse_breaks(nodes: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    let mut run = 0;
    for node in nodes {
        let node = match node {
            Node::Element(el) => Node::Element(map_children(el, collapse_breaks)),
            text @ Node::Text(_) => text,
        };
        if node.is_element("br") {
            run += 1;
            if run > MAX_BREAK_RUN {
                continue;
            }
        } else if !node.is_blank_text() {
            run = 0;
        }
        out.push(node);
    }
    trim_dangling_breaks(out)
}

fn trim_dangling_breaks(mut nodes: Vec<Node>) -> Vec<Node> {
    let leading = nodes
        .iter()
        .position(|n| !n.is_blank_text() && !n.is_element("br"))
        .unwrap_or(nodes.len());
    let trailing = nodes
        .iter()
        .rposition(|n| !n.is_blank_text() && !n.is_element("br"))
        .map_or(0, |idx| idx + 1);

    let mut index = 0;
    nodes.retain(|node| {
        let keep = !(node.is_element("br") && (index < leading || index >= trailing));
        index += 1;
        keep
    });
    nodes
}

// === Pass 7: text runs ===

/// Merge adjacent text nodes and reduce 3+ newlines to exactly 2.
#[must_use]
pub fn collapse_blank_lines(nodes: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(text) => {
                if let Some(Node::Text(prev)) = out.last_mut() {
                    prev.push_str(&text);
                } else {
                    out.push(Node::Text(text));
                }
            }
            Node::Element(el) => out.push(Node::Element(map_children(el, collapse_blank_lines))),
        }
    }
    for node in &mut out {
        if let Node::Text(text) = node {
            if BLANK_LINE_RUN.is_match(text) {
                *text = BLANK_LINE_RUN.replace_all(text, "\n\n").into_owned();
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitizer::policy::DEFAULT_POLICY;
    use crate::tree;

    fn fragment(html: &str) -> Vec<Node> {
        match tree::parse(html) {
            Node::Element(root) => root.children,
            Node::Text(_) => unreachable!(),
        }
    }

    fn render(nodes: Vec<Node>) -> String {
        Node::Element(Element::root(nodes)).to_html()
    }

    #[test]
    fn test_drop_scripts_removes_content() {
        let nodes = drop_scripts(fragment("<p>a<script>steal()</script>b</p><style>p{}</style>"));
        assert_eq!(render(nodes), "<p>ab</p>");
    }

    #[test]
    fn test_filter_unwraps_unknown_and_font() {
        let nodes = filter_elements(
            fragment(r#"<h2 id="t"><font color="red">Big</font> title</h2>"#),
            &DEFAULT_POLICY,
        );
        assert_eq!(render(nodes), "Big title");
    }

    #[test]
    fn test_filter_strips_disallowed_attributes() {
        let nodes = filter_elements(
            fragment(r#"<img src="a.png" onerror="x()" width="5" alt="A"><a href="/p" onclick="y" class="c">l</a>"#),
            &DEFAULT_POLICY,
        );
        assert_eq!(render(nodes), r#"<img src="a.png" alt="A"><a href="/p">l</a>"#);
    }

    #[test]
    fn test_filter_removes_image_without_source() {
        let nodes = filter_elements(fragment(r#"<p>x<img data-src="a.png"><img src=" "></p>"#), &DEFAULT_POLICY);
        assert_eq!(render(nodes), "<p>x</p>");
    }

    #[test]
    fn test_filter_drops_script_urls() {
        let nodes = filter_elements(
            fragment(r#"<a href="java&#x09;script:alert(1)">a</a><img src="data:text/html,x"><img src="data:image/png;base64,AA==">"#),
            &DEFAULT_POLICY,
        );
        assert_eq!(render(nodes), r#"<a>a</a><img src="data:image/png;base64,AA==">"#);
    }

    #[test]
    fn test_filter_unwraps_bare_span() {
        let nodes = filter_elements(fragment(r#"<p><span style="x">in</span>line</p>"#), &DEFAULT_POLICY);
        assert_eq!(render(nodes), "<p>inline</p>");
    }

    #[test]
    fn test_filter_fosters_caption_out_of_table() {
        let nodes = filter_elements(
            fragment("<table><caption>Cap</caption><tr><td>1</td></tr></table>"),
            &DEFAULT_POLICY,
        );
        assert_eq!(render(nodes), "Cap<table><tbody><tr><td>1</td></tr></tbody></table>");
    }

    #[test]
    fn test_retype_plain_div_to_paragraph() {
        let nodes = retype_containers(fragment(r#"<div class="x">text <b>bold</b></div>"#));
        assert_eq!(render(nodes), "<p>text <b>bold</b></p>");
    }

    #[test]
    fn test_retype_keeps_structural_div() {
        let nodes = retype_containers(fragment(r#"<div class="x"><div>inner</div><ul><li>i</li></ul></div>"#));
        assert_eq!(render(nodes), "<div><p>inner</p><ul><li>i</li></ul></div>");
    }

    #[test]
    fn test_replace_nbsp() {
        let nodes = replace_nbsp(fragment("<p>a&nbsp;b&nbsp;&nbsp;c</p>"));
        assert_eq!(render(nodes), "<p>a b  c</p>");
    }

    #[test]
    fn test_clean_paragraphs() {
        let nodes = clean_paragraphs(fragment(
            r#"<p> </p><p><br></p><p> <img src="a.png"> </p><p>cap <img src="b.png"></p>"#,
        ));
        assert_eq!(render(nodes), r#"<img src="a.png"><p>cap <img src="b.png"></p>"#);
    }

    #[test]
    fn test_collapse_break_runs() {
        let nodes = collapse_breaks(fragment("a<br><br> <br><br>b<br>c"));
        assert_eq!(render(nodes), "a<br><br> b<br>c");
    }

    #[test]
    fn test_collapse_dangling_breaks() {
        let nodes = collapse_breaks(fragment("<p><br> text<br><br></p><br>"));
        assert_eq!(render(nodes), "<p> text</p>");
    }

    #[test]
    fn test_collapse_blank_lines_merges_text() {
        let nodes = collapse_blank_lines(vec![
            Node::Text("a\n\n".into()),
            Node::Text("\n\nb".into()),
            Node::Element(Element::new("pre", vec![Node::Text("1\n\n\n\n2".into())])),
        ]);
        assert_eq!(render(nodes), "a\n\nb<pre>1\n\n2</pre>");
    }
}
