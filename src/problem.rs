//! Problem Assembly
//!
//! Builds a [`ProblemRecord`] from a fetched problem page. A page showing the
//! restriction notice becomes a [`PrivateProblem`] and nothing else is read
//! from it. Otherwise images are resolved and embedded first, so every
//! section that is sanitized afterwards already carries its final sources.

use url::Url;

use crate::dom::{self, NodeRef, Selection};
use crate::embed::{self, ImageCache, ImageFetcher};
use crate::normalize::{clean_block, normalize_prose, Mode};
use crate::options::Options;
use crate::result::{PrivateProblem, Problem, ProblemRecord, RelatedLink};
use crate::sanitizer;
use crate::sections::{self, SectionKey};
use crate::tree;
use crate::url_utils::create_absolute_url;

/// Access-restriction notice shown instead of the statement.
pub const RESTRICTION_NOTICE_SELECTOR: &str = "div.ui.negative.icon.message";

/// Links from a restriction notice to the contests that contain the problem.
const CONTEST_LINK_SELECTOR: &str = r#"a[href*="contest.php"]"#;

const IMAGE_MARKER: &str = "<img";

/// A fetched problem page.
#[derive(Debug, Clone)]
pub struct ProblemPage {
    /// Page HTML, already decoded.
    pub html: String,
    /// The page's own absolute URL; relative links resolve against it.
    pub url: Url,
    /// Id the caller asked for, used when the heading carries none.
    pub requested_id: String,
}

impl ProblemPage {
    #[must_use]
    pub fn new(html: impl Into<String>, url: Url, requested_id: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            url,
            requested_id: requested_id.into(),
        }
    }
}

/// Extract the problem record from a page.
///
/// Never fails: missing pieces leave fields empty and image problems leave
/// images unembedded.
#[must_use]
pub fn assemble(
    page: &ProblemPage,
    fetcher: &dyn ImageFetcher,
    cache: &ImageCache,
    options: &Options,
) -> ProblemRecord {
    let doc = dom::parse(&page.html);

    if let Some(notice) = doc.select(RESTRICTION_NOTICE_SELECTOR).nodes().first() {
        tracing::debug!(id = %page.requested_id, "problem is access-restricted");
        return ProblemRecord::Private(private_problem(notice, page));
    }

    embed::absolutize(&doc, &page.url);
    if options.embed_images {
        let embedded = embed::embed_protected(
            &doc,
            fetcher,
            cache,
            &page.url,
            options.max_embed_image_size,
        );
        tracing::debug!(id = %page.requested_id, embedded, "embedded images");
    }

    let title = sections::extract_title(&doc);
    let found = sections::collect_sections(&doc);

    let section_content = SectionKey::ALL
        .into_iter()
        .filter_map(|key| {
            key.resolve(&found)
                .map(|raw| (key, clean_block(raw, key.mode())))
        })
        .collect();
    let raw_sections = found
        .iter()
        .map(|section| {
            (
                section.title.clone(),
                clean_block(&section.raw_markup, Mode::Prose),
            )
        })
        .collect();
    let has_external_resources = found
        .iter()
        .any(|section| section.raw_markup.to_lowercase().contains(IMAGE_MARKER));

    ProblemRecord::Public(Problem {
        id: title.id.unwrap_or_else(|| page.requested_id.clone()),
        title: title.title,
        raw_title: title.raw,
        metadata: sections::collect_labeled_metadata(&doc),
        sections: section_content,
        raw_sections,
        tags: sections::collect_tags(&doc),
        has_external_resources,
        url: page.url.to_string(),
    })
}

fn private_problem(notice: &NodeRef, page: &ProblemPage) -> PrivateProblem {
    let notice_sel = Selection::from(*notice);

    let heading = notice_sel
        .select(".header")
        .nodes()
        .first()
        .map(|header| tree::stripped_text(header, "\n"))
        .unwrap_or_else(|| tree::stripped_text(notice, "\n"));

    let related_links = notice_sel
        .select(CONTEST_LINK_SELECTOR)
        .nodes()
        .iter()
        .filter_map(|link| {
            let href = dom::non_empty_attribute(&Selection::from(*link), "href")?;
            let text = tree::stripped_text(link, "");
            Some(RelatedLink {
                name: if text.is_empty() { href.clone() } else { text },
                url: create_absolute_url(&href, &page.url),
            })
        })
        .collect();

    PrivateProblem {
        id: page.requested_id.clone(),
        url: page.url.to_string(),
        notice_markup: sanitizer::sanitize(&dom::outer_html(&notice_sel)),
        notice_text: normalize_prose(&heading),
        related_links,
    }
}
