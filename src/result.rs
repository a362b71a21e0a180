//! Result types for problem extraction.
//!
//! A problem page yields exactly one [`ProblemRecord`]: either the full
//! public statement or, when the judge restricts access, the notice shown in
//! its place. The two shapes never mix, so callers match on the variant.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sections::SectionKey;

/// Structured result of scraping one problem page.
///
/// Serialized with an internal `kind` tag:
///
/// ```rust
/// use oj_scrape::{PrivateProblem, ProblemRecord};
///
/// let record = ProblemRecord::Private(PrivateProblem {
///     id: "1001".into(),
///     url: "https://oj.example/problem.php?id=1001".into(),
///     notice_markup: "<p>Contest only</p>".into(),
///     notice_text: "Contest only".into(),
///     related_links: Vec::new(),
/// });
/// let json = serde_json::to_value(&record).unwrap();
/// assert_eq!(json["kind"], "private");
/// assert!(record.is_private());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProblemRecord {
    /// The full statement.
    Public(Problem),
    /// The page only showed an access-restriction notice.
    Private(PrivateProblem),
}

impl ProblemRecord {
    /// Whether the page was access-restricted.
    #[must_use]
    pub fn is_private(&self) -> bool {
        matches!(self, Self::Private(_))
    }

    /// Problem id of either variant.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Public(problem) => &problem.id,
            Self::Private(problem) => &problem.id,
        }
    }

    /// Page URL of either variant.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Public(problem) => &problem.url,
            Self::Private(problem) => &problem.url,
        }
    }
}

/// A publicly readable problem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// Id from the page heading, or the requested id.
    pub id: String,

    /// Heading text after the id.
    pub title: String,

    /// Heading as shown on the page.
    pub raw_title: String,

    /// Labels such as time and memory limits.
    pub metadata: BTreeMap<String, String>,

    /// Cleaned content per canonical section.
    ///
    /// Rich sections hold sanitized markup, the rest normalized text.
    pub sections: BTreeMap<SectionKey, String>,

    /// Every section found on the page, keyed by heading, cleaned as prose.
    pub raw_sections: BTreeMap<String, String>,

    /// Tag labels in page order.
    pub tags: Vec<String>,

    /// Whether any section referenced an image.
    pub has_external_resources: bool,

    /// Absolute page URL.
    pub url: String,
}

impl Problem {
    /// Cleaned content of one section.
    #[must_use]
    pub fn section(&self, key: SectionKey) -> Option<&str> {
        self.sections.get(&key).map(String::as_str)
    }
}

/// An access-restricted problem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateProblem {
    /// The requested id.
    pub id: String,

    /// Absolute page URL.
    pub url: String,

    /// Sanitized markup of the notice.
    pub notice_markup: String,

    /// Notice heading as normalized text.
    pub notice_text: String,

    /// Contest pages linked from the notice.
    pub related_links: Vec<RelatedLink>,
}

/// A link found in a restriction notice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedLink {
    /// Link text, or the raw href when the text is empty.
    pub name: String,
    /// Absolute URL.
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_record_serialization() {
        let mut problem = Problem {
            id: "1000".into(),
            title: "A+B".into(),
            url: "https://oj.example/problem.php?id=1000".into(),
            ..Problem::default()
        };
        problem.sections.insert(SectionKey::SampleInput, "1 2".into());

        let record = ProblemRecord::Public(problem);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "public");
        assert_eq!(json["sections"]["sample_input"], "1 2");
        assert_eq!(json["has_external_resources"], false);
        assert!(json.get("notice_text").is_none());

        let back: ProblemRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
        assert!(!back.is_private());
        assert_eq!(back.id(), "1000");
    }

    #[test]
    fn test_private_record_has_no_sections() {
        let record = ProblemRecord::Private(PrivateProblem {
            id: "7".into(),
            notice_text: "Locked".into(),
            ..PrivateProblem::default()
        });
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "private");
        assert!(json.get("sections").is_none());
        assert_eq!(json["related_links"], serde_json::json!([]));
    }
}
