//! Submission Reconciliation
//!
//! After a submission is posted the judge gives back no id, only a status
//! table that may already hold rows from other sessions. The reconciler
//! snapshots the table before submitting and afterwards picks the newest row
//! whose [`DedupKey`] was not in the snapshot. Counting rows would be fooled
//! by unrelated submissions landing at the same time; set difference is not.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::clock::Sleeper;
use crate::error::{Error, Result};
use crate::options::ReconcilePolicy;
use crate::status::{sort_newest_first, DedupKey, StatusEntry};

/// Source code to submit for one problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Problem id as used by `submitpage.php?id=`.
    pub problem_id: String,
    /// Judge language identifier, e.g. `"6"`.
    pub language: String,
    /// Source text.
    pub source: String,
    /// Problem index inside a contest, for contest-scoped submissions.
    #[serde(default)]
    pub contest_problem_id: Option<String>,
}

/// Access to the judge's submission endpoints.
pub trait SubmissionBackend {
    /// Most recent `limit` status rows, in page order.
    fn list_status(&self, limit: usize) -> Result<Vec<StatusEntry>>;

    /// Post the submission and return the status rows shown in the response.
    fn submit(&self, submission: &Submission) -> Result<Vec<StatusEntry>>;
}

/// Dedup keys of rows already accounted for.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    keys: HashSet<DedupKey>,
}

impl SeenSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seen set holding the keys of `entries`.
    #[must_use]
    pub fn from_entries(entries: &[StatusEntry]) -> Self {
        Self {
            keys: entries.iter().map(StatusEntry::dedup_key).collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, entry: &StatusEntry) -> bool {
        self.keys.contains(&entry.dedup_key())
    }

    /// Mark an entry as seen. Returns `false` if it already was.
    pub fn insert(&mut self, entry: &StatusEntry) -> bool {
        self.keys.insert(entry.dedup_key())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Newest entry not seen yet, which becomes seen.
    ///
    /// Candidates are ranked by solution id (numeric ids outrank missing
    /// ones), then by submission time, both descending.
    pub fn take_newest(&mut self, mut candidates: Vec<StatusEntry>) -> Option<StatusEntry> {
        sort_newest_first(&mut candidates);
        let fresh = candidates
            .into_iter()
            .find(|entry| !self.contains(entry))?;
        self.insert(&fresh);
        Some(fresh)
    }
}

/// Correlates a submission with its new status row.
pub struct Reconciler<'a, B: SubmissionBackend + ?Sized, S: Sleeper + ?Sized> {
    backend: &'a B,
    sleeper: &'a S,
    policy: ReconcilePolicy,
}

impl<'a, B: SubmissionBackend + ?Sized, S: Sleeper + ?Sized> Reconciler<'a, B, S> {
    pub fn new(backend: &'a B, sleeper: &'a S, policy: ReconcilePolicy) -> Self {
        Self {
            backend,
            sleeper,
            policy,
        }
    }

    /// Submit and return the status row the submission produced.
    ///
    /// The response to the submission is checked first, then the status
    /// table is re-read with growing pauses. When the attempts run out the
    /// submission may still have been accepted, which the
    /// [`Error::ReconciliationTimeout`] message says.
    pub fn reconcile(&self, submission: &Submission) -> Result<StatusEntry> {
        let snapshot = self.backend.list_status(self.policy.snapshot_limit)?;
        let mut seen = SeenSet::from_entries(&snapshot);
        tracing::debug!(
            problem = %submission.problem_id,
            rows = snapshot.len(),
            "status snapshot taken"
        );

        let mut visible = self.backend.submit(submission)?;
        visible.truncate(self.policy.post_submit_limit);
        if let Some(entry) = seen.take_newest(visible) {
            tracing::debug!(solution_id = ?entry.solution_id, "new row in submit response");
            return Ok(entry);
        }

        for attempt in 0..self.policy.attempts {
            self.sleeper.sleep(self.policy.pause(attempt));
            let rows = self.backend.list_status(self.policy.recheck_limit)?;
            if let Some(entry) = seen.take_newest(rows) {
                tracing::debug!(solution_id = ?entry.solution_id, attempt, "new row found");
                return Ok(entry);
            }
        }

        tracing::warn!(
            problem = %submission.problem_id,
            attempts = self.policy.attempts,
            "no new status row after submitting"
        );
        Err(Error::ReconciliationTimeout {
            attempts: self.policy.attempts,
        })
    }
}
