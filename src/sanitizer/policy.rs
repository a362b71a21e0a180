//! Allow-list policy and tag catalogs for the sanitizer.
//!
//! The policy is default-deny: a tag missing from the map is unwrapped and an
//! attribute missing from its tag's set is dropped.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Tags removed together with their content.
pub static DELETED_TAGS: [&str; 2] = ["script", "style"];

/// Legacy font-styling tags, always unwrapped.
pub static LEGACY_FONT_TAGS: [&str; 1] = ["font"];

/// Inline wrappers that carry no meaning once their attributes are gone.
pub static INLINE_WRAPPER_TAGS: [&str; 1] = ["span"];

/// Tags that keep a generic container from being retyped to a paragraph.
///
/// Besides nested blocks, tables, lists, code blocks and quotes this holds
/// every tag that would implicitly close a `<p>` when the output is parsed
/// again.
pub static STRUCTURAL_TAGS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    ["div", "p", "table", "ul", "ol", "li", "pre", "blockquote", "hr"]
        .into_iter()
        .collect()
});

/// Attributes holding URLs.
pub static URL_ATTRIBUTES: [&str; 2] = ["href", "src"];

/// Allowed tags with their permitted attributes.
const DEFAULT_ALLOW_LIST: &[(&str, &[&str])] = &[
    ("img", &["src", "alt", "title"]),
    ("a", &["href", "title", "target", "rel"]),
    ("table", &["border"]),
    ("th", &["colspan", "rowspan", "scope"]),
    ("td", &["colspan", "rowspan", "scope"]),
    ("tr", &[]),
    ("thead", &[]),
    ("tbody", &[]),
    ("tfoot", &[]),
    ("code", &[]),
    ("pre", &[]),
    ("p", &[]),
    ("br", &[]),
    ("hr", &[]),
    ("div", &[]),
    ("span", &[]),
    ("ul", &[]),
    ("ol", &[]),
    ("li", &[]),
    ("strong", &[]),
    ("em", &[]),
    ("b", &[]),
    ("i", &[]),
    ("u", &[]),
    ("blockquote", &[]),
    ("sup", &[]),
    ("sub", &[]),
];

/// Mapping from tag name to the attributes it may keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizationPolicy {
    allowed: HashMap<String, HashSet<String>>,
}

impl SanitizationPolicy {
    /// A policy that allows nothing.
    #[must_use]
    pub fn deny_all() -> Self {
        Self {
            allowed: HashMap::new(),
        }
    }

    /// Allow `tag` with exactly `attrs`.
    #[must_use]
    pub fn allow(mut self, tag: &str, attrs: &[&str]) -> Self {
        self.allowed.insert(
            tag.to_string(),
            attrs.iter().map(|a| (*a).to_string()).collect(),
        );
        self
    }

    /// Whether `tag` survives sanitization.
    #[must_use]
    pub fn allows_tag(&self, tag: &str) -> bool {
        self.allowed.contains_key(tag)
    }

    /// Whether `attr` may stay on `tag`.
    #[must_use]
    pub fn allows_attr(&self, tag: &str, attr: &str) -> bool {
        self.allowed
            .get(tag)
            .is_some_and(|attrs| attrs.contains(attr))
    }

    /// Allowed tag names, in no particular order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.allowed.keys().map(String::as_str)
    }
}

impl Default for SanitizationPolicy {
    fn default() -> Self {
        DEFAULT_ALLOW_LIST
            .iter()
            .fold(Self::deny_all(), |policy, (tag, attrs)| policy.allow(tag, attrs))
    }
}

/// The policy used by [`crate::sanitizer::sanitize`].
pub static DEFAULT_POLICY: LazyLock<SanitizationPolicy> = LazyLock::new(SanitizationPolicy::default);
