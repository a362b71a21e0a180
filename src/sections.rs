//! Section Extraction
//!
//! A problem page lists its parts as `<h4 class="ui ...">` headings, each
//! followed by a `div.ui.bottom.attached.segment` holding the content. This
//! module pairs headings with their blocks, resolves locale aliases to
//! canonical keys and reads the labels, title and tags around them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dom::{self, Document, NodeRef, Selection};
use crate::normalize::Mode;
use crate::selector::{self, following_siblings, next_sibling_where};
use crate::tree;

/// Full-width colon separating label keys from values and decorating headings.
pub const FULLWIDTH_COLON: char = '：';

/// Heading tokens added by "copy to clipboard" buttons.
const NOISE_TOKENS: &[&str] = &["复制", "Copy"];

/// Classes that mark a section body.
const SEGMENT_CLASSES: &[&str] = &["ui", "bottom", "attached", "segment"];

const HEADING_SELECTOR: &str = "div.padding h4.ui";
const LABEL_SELECTOR: &str = "div.padding span.ui.label";
const TITLE_SELECTOR: &str = "div.padding .ui.center.aligned.grid h1.ui.header";
const TAG_SELECTOR: &str = "#show_tag_div a";

/// Canonical, locale-independent section key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    Description,
    Input,
    Output,
    SampleInput,
    SampleOutput,
    Hint,
    Source,
}

impl SectionKey {
    /// Every key, in page order.
    pub const ALL: [SectionKey; 7] = [
        Self::Description,
        Self::Input,
        Self::Output,
        Self::SampleInput,
        Self::SampleOutput,
        Self::Hint,
        Self::Source,
    ];

    /// Snake-case name used in serialized records.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Input => "input",
            Self::Output => "output",
            Self::SampleInput => "sample_input",
            Self::SampleOutput => "sample_output",
            Self::Hint => "hint",
            Self::Source => "source",
        }
    }

    /// Heading spellings for this key, tried in order.
    #[must_use]
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Description => &["题目描述", "Description"],
            Self::Input => &["输入", "Input"],
            Self::Output => &["输出", "Output"],
            Self::SampleInput => &["样例输入", "Sample Input", "Sample Inputs", "Sample"],
            Self::SampleOutput => &["样例输出", "Sample Output", "Sample Outputs", "Samples"],
            Self::Hint => &["提示", "Hint", "HINT"],
            Self::Source => &["来源/分类", "Source/Category", "Source"],
        }
    }

    /// Normalization mode for the key's content.
    #[must_use]
    pub fn mode(self) -> Mode {
        match self {
            Self::SampleInput | Self::SampleOutput => Mode::Sample,
            _ => Mode::Prose,
        }
    }

    /// Raw markup of the first alias with non-empty content.
    #[must_use]
    pub fn resolve(self, sections: &Sections) -> Option<&str> {
        self.aliases()
            .iter()
            .filter_map(|alias| sections.get(alias))
            .find(|markup| !markup.is_empty())
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A heading paired with the inner markup of its block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Canonical heading text.
    pub title: String,
    /// Inner HTML of the section block.
    pub raw_markup: String,
}

/// Sections in document order, at most one per title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    entries: Vec<Section>,
}

impl Sections {
    /// Add a section unless its title is already present.
    ///
    /// Returns `false` when an earlier section with the same title wins.
    pub fn insert(&mut self, section: Section) -> bool {
        if self.get(&section.title).is_some() {
            return false;
        }
        self.entries.push(section);
        true
    }

    /// Raw markup for a canonical title.
    #[must_use]
    pub fn get(&self, title: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|section| section.title == title)
            .map(|section| section.raw_markup.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Canonical heading title.
///
/// Full-width colons become spaces and copy-button tokens are dropped. When
/// nothing is left the trimmed raw text is used.
///
/// ```rust
/// use oj_scrape::sections::canonical_title;
///
/// assert_eq!(canonical_title("样例输入 复制"), "样例输入");
/// assert_eq!(canonical_title("Sample Input： Copy"), "Sample Input");
/// assert_eq!(canonical_title(" Copy "), "Copy");
/// ```
#[must_use]
pub fn canonical_title(raw: &str) -> String {
    let cleaned = raw.replace(FULLWIDTH_COLON, " ");
    let tokens: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|token| !NOISE_TOKENS.contains(token))
        .collect();
    if tokens.is_empty() {
        raw.trim().to_string()
    } else {
        tokens.join(" ")
    }
}

fn is_segment(node: &NodeRef) -> bool {
    selector::is_tag(node, "div") && dom::has_all_classes(node, SEGMENT_CLASSES)
}

fn is_heading(node: &NodeRef) -> bool {
    selector::is_tag(node, "h4")
}

/// Pair every problem heading with the block that follows it.
///
/// A heading whose next sibling element is another heading, or that has no
/// segment before the end of its container, yields nothing.
#[must_use]
pub fn collect_sections(doc: &Document) -> Sections {
    let mut sections = Sections::default();
    for heading in doc.select(HEADING_SELECTOR).nodes() {
        let title = canonical_title(&tree::stripped_text(heading, " "));
        if title.is_empty() {
            continue;
        }
        let Some(segment) = next_sibling_where(following_siblings(heading), is_segment, is_heading)
        else {
            continue;
        };
        sections.insert(Section {
            title,
            raw_markup: dom::inner_html(&Selection::from(segment)).to_string(),
        });
    }
    sections
}

/// Read `key：value` labels. A later label with the same key replaces an earlier one.
#[must_use]
pub fn collect_labeled_metadata(doc: &Document) -> BTreeMap<String, String> {
    doc.select(LABEL_SELECTOR)
        .nodes()
        .iter()
        .filter_map(|label| {
            let text = tree::stripped_text(label, "");
            let (key, value) = text.split_once(FULLWIDTH_COLON)?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Problem heading split into id and title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Title {
    /// Text before the first `:`, when present.
    pub id: Option<String>,
    /// Text after the first `:`, or the whole heading.
    pub title: String,
    /// The heading as shown.
    pub raw: String,
}

/// Read the page heading, e.g. `1000: A+B Problem`.
#[must_use]
pub fn extract_title(doc: &Document) -> Title {
    let raw = doc
        .select(TITLE_SELECTOR)
        .nodes()
        .first()
        .map(|header| tree::stripped_text(header, ""))
        .unwrap_or_default();
    match raw.split_once(':') {
        Some((id, title)) => Title {
            id: Some(id.trim().to_string()),
            title: title.trim().to_string(),
            raw,
        },
        None => Title {
            id: None,
            title: raw.clone(),
            raw,
        },
    }
}

/// Tag labels in page order.
#[must_use]
pub fn collect_tags(doc: &Document) -> Vec<String> {
    doc.select(TAG_SELECTOR)
        .nodes()
        .iter()
        .map(|link| tree::stripped_text(link, ""))
        .filter(|tag| !tag.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body><div class="padding">
        <div class="ui center aligned grid"><div class="row">
          <h1 class="ui header">1000: A+B Problem</h1>
        </div>
        <span class="ui label">时间限制：1 Sec</span>
        <span class="ui label">内存限制：128 MB</span>
        <span class="ui label">no separator</span></div>
        <h4 class="ui top attached block header">题目描述</h4>
        <div class="ui bottom attached segment"><p>Add two numbers.</p></div>
        <h4 class="ui top attached block header">样例输入 <a class="copy">复制</a></h4>
        <div class="ui bottom attached segment"><pre>1 2</pre></div>
        <h4 class="ui top attached block header">提示</h4>
        <h4 class="ui top attached block header">来源/分类</h4>
        text between
        <div class="ui bottom attached segment">contest</div>
        <h4 class="ui top attached block header">题目描述</h4>
        <div class="ui bottom attached segment">duplicate</div>
        <div id="show_tag_div"><a>math</a> <a> easy </a></div>
    </div></body></html>"#;

    #[test]
    fn test_collect_sections() {
        let doc = dom::parse(PAGE);
        let sections = collect_sections(&doc);
        assert_eq!(sections.get("题目描述"), Some("<p>Add two numbers.</p>"));
        assert_eq!(sections.get("样例输入"), Some("<pre>1 2</pre>"));
        assert_eq!(sections.get("来源/分类"), Some("contest"));
        assert_eq!(sections.get("提示"), None);
        assert_eq!(sections.len(), 3);
    }

    #[test]
    fn test_resolve_uses_aliases_in_order() {
        let mut sections = Sections::default();
        sections.insert(Section {
            title: "Sample".into(),
            raw_markup: "fallback".into(),
        });
        sections.insert(Section {
            title: "样例输入".into(),
            raw_markup: String::new(),
        });
        assert_eq!(SectionKey::SampleInput.resolve(&sections), Some("fallback"));
        assert_eq!(SectionKey::Hint.resolve(&sections), None);
    }

    #[test]
    fn test_first_section_wins() {
        let mut sections = Sections::default();
        assert!(sections.insert(Section {
            title: "Input".into(),
            raw_markup: "first".into(),
        }));
        assert!(!sections.insert(Section {
            title: "Input".into(),
            raw_markup: "second".into(),
        }));
        assert_eq!(sections.get("Input"), Some("first"));
    }

    #[test]
    fn test_collect_labeled_metadata() {
        let doc = dom::parse(PAGE);
        let metadata = collect_labeled_metadata(&doc);
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata["时间限制"], "1 Sec");
        assert_eq!(metadata["内存限制"], "128 MB");
    }

    #[test]
    fn test_extract_title_and_tags() {
        let doc = dom::parse(PAGE);
        let title = extract_title(&doc);
        assert_eq!(title.id.as_deref(), Some("1000"));
        assert_eq!(title.title, "A+B Problem");
        assert_eq!(collect_tags(&doc), vec!["math", "easy"]);
    }

    #[test]
    fn test_title_without_colon() {
        let doc = dom::parse(
            r#"<div class="padding"><div class="ui center aligned grid"><h1 class="ui header">Untitled</h1></div></div>"#,
        );
        let title = extract_title(&doc);
        assert_eq!(title.id, None);
        assert_eq!(title.title, "Untitled");
    }

    #[test]
    fn test_key_modes() {
        assert_eq!(SectionKey::SampleOutput.mode(), Mode::Sample);
        assert_eq!(SectionKey::Hint.mode(), Mode::Prose);
        assert_eq!(SectionKey::SampleInput.to_string(), "sample_input");
    }
}
