//! Configuration options for scraping and submission tracking.
//!
//! The `Options` struct controls the site layout, image embedding and the
//! retry/backoff policies. Policies are plain data injected into the
//! reconciler and poller, so callers can substitute their own schedule.

use std::time::Duration;

use serde::Deserialize;

/// Default judge base URL.
pub const DEFAULT_BASE_URL: &str = "https://2024.jdoj.tech/";

/// Largest image body inlined as a data URI (about 2 MiB).
pub const DEFAULT_MAX_EMBED_IMAGE_SIZE: usize = 2 * 1024 * 1024;

/// Configuration options for a judge session.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use oj_scrape::Options;
///
/// let options = Options {
///     embed_images: false,
///     ..Options::default()
/// };
/// assert_eq!(options.poll.max_attempts, 12);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Base URL every judge page is resolved against.
    ///
    /// Default: `https://2024.jdoj.tech/`
    pub base_url: String,

    /// Fetch protected images and inline them as data URIs.
    ///
    /// When disabled, image sources are still made absolute.
    ///
    /// Default: `true`
    pub embed_images: bool,

    /// Maximum image body size (bytes) that will be embedded.
    ///
    /// Default: `2097152` (2 MiB)
    pub max_embed_image_size: usize,

    /// Retry schedule for spotting a fresh submission in the status table.
    pub reconcile: ReconcilePolicy,

    /// Backoff schedule for polling a single submission.
    pub poll: BackoffPolicy,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            embed_images: true,
            max_embed_image_size: DEFAULT_MAX_EMBED_IMAGE_SIZE,
            reconcile: ReconcilePolicy::default(),
            poll: BackoffPolicy::default(),
        }
    }
}

/// Retry schedule used by the submission reconciler.
///
/// Pauses grow in fixed steps: `step`, `2 * step`, `3 * step`, ...
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReconcilePolicy {
    /// Rows captured before submitting.
    ///
    /// Default: `20`
    pub snapshot_limit: usize,

    /// Rows read from the response to the submission itself.
    ///
    /// Default: `5`
    pub post_submit_limit: usize,

    /// Rows read on every re-fetch.
    ///
    /// Default: `20`
    pub recheck_limit: usize,

    /// Number of re-fetch attempts before giving up.
    ///
    /// Default: `20`
    pub attempts: u32,

    /// Pause increment between re-fetches, in milliseconds.
    ///
    /// Default: `500`
    pub step_ms: u64,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            snapshot_limit: 20,
            post_submit_limit: 5,
            recheck_limit: 20,
            attempts: 20,
            step_ms: 500,
        }
    }
}

impl ReconcilePolicy {
    /// Pause before re-fetch number `attempt` (zero-based).
    #[must_use]
    pub fn pause(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.step_ms.saturating_mul(u64::from(attempt) + 1))
    }
}

/// Exponential backoff schedule used by the result poller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BackoffPolicy {
    /// Maximum number of status lookups. Zero is treated as one.
    ///
    /// Default: `12`
    pub max_attempts: u32,

    /// Delay after the first pending observation, in milliseconds.
    ///
    /// Default: `1000`
    pub initial_delay_ms: u64,

    /// Multiplier applied to the delay after every pending observation.
    ///
    /// Default: `1.5`
    pub factor: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 12,
            initial_delay_ms: 1000,
            factor: 1.5,
        }
    }
}

impl BackoffPolicy {
    /// First delay as a `Duration`.
    #[must_use]
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.base_url, DEFAULT_BASE_URL);
        assert!(options.embed_images);
        assert_eq!(options.max_embed_image_size, 2 * 1024 * 1024);
        assert_eq!(options.reconcile.attempts, 20);
        assert_eq!(options.poll.initial_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_reconcile_pause_grows_in_fixed_steps() {
        let policy = ReconcilePolicy::default();
        assert_eq!(policy.pause(0), Duration::from_millis(500));
        assert_eq!(policy.pause(1), Duration::from_millis(1000));
        assert_eq!(policy.pause(3), Duration::from_millis(2000));
    }

    #[test]
    fn test_partial_json_config_keeps_defaults() {
        let options: Options =
            serde_json::from_str(r#"{"embed_images": false, "poll": {"factor": 2.0}}"#)
                .unwrap();
        assert!(!options.embed_images);
        assert!((options.poll.factor - 2.0).abs() < f64::EPSILON);
        assert_eq!(options.poll.max_attempts, 12);
        assert_eq!(options.reconcile, ReconcilePolicy::default());
    }
}
