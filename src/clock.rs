//! Pausing between retries.
//!
//! The reconciler and poller never call `std::thread::sleep` themselves; they
//! pause through a [`Sleeper`] so callers can schedule waits differently and
//! tests can record them instead of waiting.

use std::sync::Mutex;
use std::time::Duration;

/// Something that can wait for a duration.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Blocks the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        tracing::trace!(?duration, "sleeping");
        std::thread::sleep(duration);
    }
}

/// Records requested pauses without waiting.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    pauses: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pauses requested so far, in order.
    #[must_use]
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses
            .lock()
            .map(|pauses| pauses.clone())
            .unwrap_or_default()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        if let Ok(mut pauses) = self.pauses.lock() {
            pauses.push(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sleeper_keeps_order() {
        let sleeper = RecordingSleeper::new();
        sleeper.sleep(Duration::from_millis(5));
        sleeper.sleep(Duration::from_millis(1));
        assert_eq!(
            sleeper.pauses(),
            vec![Duration::from_millis(5), Duration::from_millis(1)]
        );
    }

    #[test]
    fn test_thread_sleeper_zero_duration() {
        ThreadSleeper.sleep(Duration::ZERO);
    }
}
