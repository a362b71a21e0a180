//! Content Normalization
//!
//! Plain-text sections are canonicalized in one of two modes. Prose keeps
//! paragraphs but drops trailing whitespace; sample input/output is verbatim
//! data, so only line-ending artifacts are removed from each line.

use crate::sanitizer;
use crate::tree;

/// Markers that make a section keep (sanitized) markup instead of plain text.
pub const RICH_CONTENT_MARKERS: &[&str] = &[
    "<img", "<table", "<iframe", "<sup", "<sub", "<math", "<svg",
];

/// Marker that prose normalization must not touch.
const IMAGE_MARKER: &str = "<img";

/// How a plain-text block is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Description, input, output, hint, source.
    Prose,
    /// Sample input and sample output.
    Sample,
}

/// Convert `\r\n` and lone `\r` to `\n`.
#[must_use]
pub fn normalize_newlines(value: &str) -> String {
    value.replace("\r\n", "\n").replace('\r', "\n")
}

/// Normalize a prose block.
///
/// NBSP becomes a space, lines are right-trimmed, runs of blank lines collapse
/// to one and leading/trailing blank lines disappear. Text carrying an image
/// marker only has its newlines normalized.
#[must_use]
pub fn normalize_prose(value: &str) -> String {
    let text = normalize_newlines(value);
    if text.contains(IMAGE_MARKER) {
        return text;
    }
    collapse_lines(text.split('\n').map(|line| line.replace('\u{a0}', " ").trim_end().to_string()))
}

/// Normalize a sample input/output block.
///
/// Like [`normalize_prose`], but significant trailing spaces inside a line are
/// kept; only stray carriage returns are trimmed.
///
/// ```rust
/// use oj_scrape::normalize::normalize_sample;
///
/// assert_eq!(normalize_sample("3 4 \n5 6\n\n\n"), "3 4 \n5 6");
/// ```
#[must_use]
pub fn normalize_sample(value: &str) -> String {
    let text = normalize_newlines(value);
    collapse_lines(
        text.split('\n')
            .map(|line| line.replace('\u{a0}', " ").trim_end_matches('\r').to_string()),
    )
}

/// Normalize according to `mode`.
#[must_use]
pub fn normalize(value: &str, mode: Mode) -> String {
    match mode {
        Mode::Prose => normalize_prose(value),
        Mode::Sample => normalize_sample(value),
    }
}

/// Keep non-empty lines, allow one blank line between them, drop blank edges.
fn collapse_lines(lines: impl Iterator<Item = String>) -> String {
    let mut normalized: Vec<String> = Vec::new();
    let mut blank_pending = false;
    for line in lines {
        if !line.is_empty() {
            normalized.push(line);
            blank_pending = false;
        } else if !normalized.is_empty() && !blank_pending {
            normalized.push(String::new());
            blank_pending = true;
        }
    }
    while normalized.last().is_some_and(String::is_empty) {
        normalized.pop();
    }
    normalized.join("\n")
}

/// Whether the markup carries any rich-content marker (case-insensitive).
#[must_use]
pub fn is_rich(markup: &str) -> bool {
    let lower = markup.to_lowercase();
    RICH_CONTENT_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Plain text of a markup fragment, one text node per line.
#[must_use]
pub fn plain_text(markup: &str) -> String {
    tree::parse(markup).joined_text("\n")
}

/// Clean a raw section block.
///
/// Samples always become normalized plain text. Prose keeps sanitized markup
/// when it is rich, otherwise it becomes normalized plain text.
#[must_use]
pub fn clean_block(markup: &str, mode: Mode) -> String {
    match mode {
        Mode::Sample => normalize_sample(&plain_text(markup)),
        Mode::Prose if is_rich(markup) => sanitizer::sanitize(markup),
        Mode::Prose => normalize_prose(&plain_text(markup)),
    }
}
