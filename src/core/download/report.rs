//! Run report
//!
//! Aggregates the outcome of every dispatched descriptor plus the terminal
//! status of the run. Only the coordinator builds a report; once returned it
//! is read-only.

use crate::domain::ids::DescriptorId;
use crate::domain::outcome::{DownloadOutcome, OutcomeKind};
use crate::domain::errors::TripdataError;
use crate::domain::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Terminal status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every planned descriptor was dispatched and finalized
    Completed,
    /// Dispatch stopped after too many consecutive failures
    AbortedByCircuitBreaker,
    /// Dispatch stopped on a shutdown signal
    Interrupted,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunStatus::Completed => "completed",
            RunStatus::AbortedByCircuitBreaker => "aborted by circuit breaker",
            RunStatus::Interrupted => "interrupted",
        })
    }
}

/// Aggregate result of one download run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    status: RunStatus,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    planned: usize,
    breaker_threshold: usize,
    consecutive_failures: usize,
    outcomes: Vec<DownloadOutcome>,
    not_dispatched: Vec<DescriptorId>,
}

impl RunReport {
    pub(super) fn start(planned: usize, breaker_threshold: usize) -> Self {
        let now = Utc::now();
        Self {
            status: RunStatus::Completed,
            started_at: now,
            finished_at: now,
            planned,
            breaker_threshold,
            consecutive_failures: 0,
            outcomes: Vec::with_capacity(planned),
            not_dispatched: Vec::new(),
        }
    }

    pub(super) fn record(&mut self, outcome: DownloadOutcome) {
        self.outcomes.push(outcome);
    }

    pub(super) fn finish(
        mut self,
        status: RunStatus,
        not_dispatched: Vec<DescriptorId>,
        consecutive_failures: usize,
    ) -> Self {
        self.status = status;
        self.not_dispatched = not_dispatched;
        self.consecutive_failures = consecutive_failures;
        self.finished_at = Utc::now();
        self
    }

    /// Terminal status
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Outcomes in completion order
    pub fn outcomes(&self) -> &[DownloadOutcome] {
        &self.outcomes
    }

    /// Outcome for one identity, if it was dispatched
    pub fn outcome_for(&self, id: &DescriptorId) -> Option<&DownloadOutcome> {
        self.outcomes.iter().find(|o| &o.id() == id)
    }

    /// Planned descriptors that were never dispatched
    pub fn not_dispatched(&self) -> &[DescriptorId] {
        &self.not_dispatched
    }

    /// Size of the plan the run was given
    pub fn planned(&self) -> usize {
        self.planned
    }

    /// Number of descriptors dispatched
    pub fn dispatched(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of skipped outcomes
    pub fn skipped(&self) -> usize {
        self.count(|k| matches!(k, OutcomeKind::Skipped))
    }

    /// Number of succeeded outcomes
    pub fn succeeded(&self) -> usize {
        self.count(|k| matches!(k, OutcomeKind::Succeeded))
    }

    /// Number of failed outcomes
    pub fn failed(&self) -> usize {
        self.count(OutcomeKind::is_failed)
    }

    /// Failed outcomes only
    pub fn failures(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }

    /// Total rows written by the load stage
    pub fn rows_loaded(&self) -> u64 {
        self.outcomes.iter().filter_map(|o| o.rows_loaded()).sum()
    }

    /// Consecutive failures when the run ended
    pub fn consecutive_failures(&self) -> usize {
        self.consecutive_failures
    }

    /// Circuit breaker threshold used for the run
    pub fn breaker_threshold(&self) -> usize {
        self.breaker_threshold
    }

    /// Wall-clock duration of the run
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Completed without any failed outcome
    pub fn is_successful(&self) -> bool {
        self.status == RunStatus::Completed && self.failed() == 0
    }

    /// The run-level error for a breaker abort, `None` otherwise
    pub fn abort_error(&self) -> Option<TripdataError> {
        match self.status {
            RunStatus::AbortedByCircuitBreaker => Some(TripdataError::CircuitBreakerAborted {
                consecutive_failures: self.consecutive_failures,
            }),
            RunStatus::Completed | RunStatus::Interrupted => None,
        }
    }

    fn count(&self, predicate: impl Fn(&OutcomeKind) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(o.kind())).count()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            status = %self.status,
            planned = self.planned,
            dispatched = self.dispatched(),
            succeeded = self.succeeded(),
            skipped = self.skipped(),
            failed = self.failed(),
            rows_loaded = self.rows_loaded(),
            duration_secs = self.duration().num_seconds(),
            "Download run finished"
        );

        if let Some(error) = self.abort_error() {
            tracing::error!(error = %error, "Download run aborted");
        }

        for outcome in self.failures() {
            if let OutcomeKind::Failed { stage, reason } = outcome.kind() {
                tracing::warn!(
                    descriptor = %outcome.id(),
                    stage = %stage,
                    reason = %reason,
                    "Descriptor failed"
                );
            }
        }
    }

    /// Write the report as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the file write fails.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{Category, Month, Year};
    use crate::domain::outcome::Stage;

    fn id(month: i64) -> DescriptorId {
        DescriptorId::new(
            Category::Yellow,
            Year::new(2019).unwrap(),
            Month::new(month).unwrap(),
        )
    }

    #[test]
    fn test_counts_and_lookup() {
        let mut report = RunReport::start(4, 5);
        report.record(DownloadOutcome::succeeded(id(1)).with_rows_loaded(10));
        report.record(DownloadOutcome::skipped(id(2)).with_rows_loaded(5));
        report.record(DownloadOutcome::failed(id(3), Stage::Convert, "bad gzip"));
        let report = report.finish(RunStatus::Completed, vec![id(4)], 1);

        assert_eq!(report.dispatched(), 3);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.rows_loaded(), 15);
        assert_eq!(report.not_dispatched(), &[id(4)]);
        assert!(report.outcome_for(&id(3)).unwrap().is_failed());
        assert!(!report.is_successful());
    }

    #[test]
    fn test_abort_error_only_for_breaker_abort() {
        let mut report = RunReport::start(3, 2);
        report.record(DownloadOutcome::failed(id(1), Stage::Fetch, "HTTP 503"));
        report.record(DownloadOutcome::failed(id(2), Stage::Fetch, "HTTP 503"));
        let aborted = report.finish(RunStatus::AbortedByCircuitBreaker, vec![id(3)], 2);

        match aborted.abort_error() {
            Some(TripdataError::CircuitBreakerAborted {
                consecutive_failures,
            }) => assert_eq!(consecutive_failures, 2),
            other => panic!("unexpected abort error: {other:?}"),
        }

        let mut report = RunReport::start(1, 2);
        report.record(DownloadOutcome::failed(id(1), Stage::Load, "locked"));
        let completed = report.finish(RunStatus::Completed, vec![], 1);
        assert!(completed.abort_error().is_none());
    }

    #[test]
    fn test_write_json() {
        let mut report = RunReport::start(1, 3);
        report.record(DownloadOutcome::succeeded(id(1)));
        let report = report.finish(RunStatus::AbortedByCircuitBreaker, vec![], 0);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        report.write_json(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["status"], "aborted_by_circuit_breaker");
        assert_eq!(json["outcomes"][0]["status"], "succeeded");
        assert_eq!(json["outcomes"][0]["id"]["category"], "yellow");
    }
}
