//! Compiled regex patterns.
//!
//! All patterns are compiled once at first use using `LazyLock`.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Sanitizer Patterns
// =============================================================================

/// Three or more consecutive newlines.
pub static BLANK_LINE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("BLANK_LINE_RUN regex"));

/// URL schemes that execute script when followed.
///
/// Browsers ignore embedded tabs/newlines inside the scheme, so those are
/// stripped by the caller before matching.
pub static SCRIPT_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:javascript|vbscript|livescript)\s*:").expect("SCRIPT_SCHEME regex")
});

// =============================================================================
// Status Table Patterns
// =============================================================================

/// Solution id carried by a result-cell link, e.g. `reinfo.php?sid=1234`.
///
/// Only this judge's link layout is known to use the `sid` parameter.
pub static SOLUTION_ID_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sid=\s*(\d+)").expect("SOLUTION_ID_LINK regex"));
