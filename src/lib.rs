//! # oj-scrape
//!
//! Scraper for a HUSTOJ-style online judge.
//!
//! The crate turns judge pages into structured records and tracks
//! submissions through to a verdict:
//!
//! - **Problem extraction**: sections, labels, tags and title from a problem
//!   page, with protected images inlined as `data:` URIs
//! - **Rich content sanitization**: allow-list based cleanup of statement
//!   markup that is safe to render elsewhere
//! - **Submission tracking**: pairing a fresh submission with its status row
//!   and polling the verdict with exponential backoff
//!
//! HTTP is left to the caller through the [`judge::Session`] trait; every
//! parsing step is also usable on its own.
//!
//! ## Quick Start
//!
//! ```rust
//! use oj_scrape::{assemble, ImageCache, Options, ProblemPage, ProblemRecord, SectionKey};
//! use oj_scrape::embed::FetchedImage;
//!
//! let html = r#"<div class="padding">
//!   <h4 class="ui top attached block header">题目描述</h4>
//!   <div class="ui bottom attached segment"><p>Add two numbers.</p></div>
//! </div>"#;
//! let page = ProblemPage::new(html, url::Url::parse("https://oj.example/problem.php?id=1000")?, "1000");
//! let offline = |_: &str| -> oj_scrape::Result<FetchedImage> {
//!     Err(oj_scrape::Error::Transport("offline".into()))
//! };
//!
//! let ProblemRecord::Public(problem) = assemble(&page, &offline, &ImageCache::new(), &Options::default()) else {
//!     unreachable!();
//! };
//! assert_eq!(problem.section(SectionKey::Description), Some("Add two numbers."));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod options;
mod patterns;
mod result;

/// DOM operations adapter over `dom_query`.
pub mod dom;

/// Owned element tree used by the sanitizer passes.
pub mod tree;

/// Sibling walking and selector helpers.
pub mod selector;

/// Problem section, label, title and tag extraction.
pub mod sections;

/// Text and markup normalization for section content.
pub mod normalize;

/// Allow-list HTML sanitizer.
pub mod sanitizer;

/// Image source rewriting and `data:` URI embedding.
pub mod embed;

/// URL utilities for validation and resolution.
pub mod url_utils;

/// Character encoding detection and transcoding.
pub mod encoding;

/// Problem record assembly.
pub mod problem;

/// Status tables, verdict codes and single-solution records.
pub mod status;

/// Submit form scraping.
pub mod form;

/// Matching a submission to its status row.
pub mod reconcile;

/// Verdict polling with exponential backoff.
pub mod poll;

/// Pausing between retries.
pub mod clock;

/// Session-backed facade over the judge.
pub mod judge;

/// Command line interface.
pub mod cli;

/// `tracing` subscriber setup for binaries.
pub mod logging;

// Public API - re-exports
pub use embed::{ImageCache, ImageFetcher};
pub use error::{Error, ErrorEnvelope, Result};
pub use judge::{Judge, Response, Session, Site};
pub use options::{BackoffPolicy, Options, ReconcilePolicy};
pub use problem::{assemble, ProblemPage};
pub use reconcile::{Reconciler, Submission, SubmissionBackend};
pub use result::{PrivateProblem, Problem, ProblemRecord, RelatedLink};
pub use sanitizer::{sanitize, sanitize_with, SanitizationPolicy};
pub use sections::SectionKey;
pub use status::{JudgeResult, SolutionStatus, StatusEntry};
