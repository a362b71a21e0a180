//! Result Polling
//!
//! Polls the single-solution endpoint until the verdict is terminal or the
//! attempt budget is spent. Running out of attempts is not an error: the last
//! (pending) status is returned and the caller decides what it means.

use std::time::Duration;

use crate::clock::Sleeper;
use crate::error::Result;
use crate::options::BackoffPolicy;
use crate::status::{JudgeResult, SolutionStatus};

/// Single-solution status lookup.
pub trait StatusLookup {
    fn lookup(&self, solution_id: u64) -> Result<SolutionStatus>;
}

impl<F> StatusLookup for F
where
    F: Fn(u64) -> Result<SolutionStatus>,
{
    fn lookup(&self, solution_id: u64) -> Result<SolutionStatus> {
        self(solution_id)
    }
}

/// Progress of one polling loop.
#[derive(Debug, Clone, PartialEq)]
pub struct PollState {
    pub solution_id: u64,
    pub attempts_remaining: u32,
    pub current_delay: Duration,
    pub backoff_factor: f64,
}

impl PollState {
    /// Fresh state; a zero attempt budget still allows one lookup.
    #[must_use]
    pub fn new(solution_id: u64, policy: &BackoffPolicy) -> Self {
        let backoff_factor = if policy.factor.is_finite() && policy.factor > 0.0 {
            policy.factor
        } else {
            1.0
        };
        Self {
            solution_id,
            attempts_remaining: policy.max_attempts.max(1),
            current_delay: policy.initial_delay(),
            backoff_factor,
        }
    }

    /// Account for one observed status.
    ///
    /// Returns the pause before the next lookup, or `None` when the status is
    /// terminal or no attempts remain.
    pub fn observe(&mut self, status: &SolutionStatus) -> Option<Duration> {
        self.attempts_remaining = self.attempts_remaining.saturating_sub(1);
        if status.is_terminal() || self.attempts_remaining == 0 {
            return None;
        }
        let pause = self.current_delay;
        self.current_delay =
            Duration::try_from_secs_f64(pause.as_secs_f64() * self.backoff_factor)
                .unwrap_or(Duration::MAX);
        Some(pause)
    }
}

/// Poll until the verdict is terminal, sleeping with exponential backoff.
///
/// Lookup errors end the loop immediately.
pub fn poll<L, S>(
    lookup: &L,
    sleeper: &S,
    solution_id: u64,
    policy: &BackoffPolicy,
) -> Result<SolutionStatus>
where
    L: StatusLookup + ?Sized,
    S: Sleeper + ?Sized,
{
    let mut state = PollState::new(solution_id, policy);
    loop {
        let status = lookup.lookup(solution_id)?;
        match state.observe(&status) {
            Some(pause) => {
                tracing::debug!(
                    solution_id,
                    code = status.result_code,
                    ?pause,
                    remaining = state.attempts_remaining,
                    "verdict pending"
                );
                sleeper.sleep(pause);
            }
            None => {
                if status.is_terminal() {
                    let verdict = JudgeResult::from_code(status.result_code)
                        .map_or(status.result_text.as_str(), |r| -> &str { r.label() });
                    tracing::info!(solution_id, code = status.result_code, verdict, "verdict final");
                } else {
                    tracing::warn!(solution_id, code = status.result_code, "poll budget exhausted");
                }
                return Ok(status);
            }
        }
    }
}
