//! Per-descriptor pipeline outcomes
//!
//! Every dispatched descriptor ends in exactly one [`DownloadOutcome`]. An
//! outcome is assembled by the worker that ran the pipeline and is never
//! changed once it has been handed to the coordinator.

use super::ids::DescriptorId;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Pipeline stage a descriptor passes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Remote transfer of the raw artifact
    Fetch,
    /// Raw to columnar conversion
    Convert,
    /// Merge into the analytical store
    Load,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Fetch => "fetch",
            Stage::Convert => "convert",
            Stage::Load => "load",
        })
    }
}

/// Result of one successful stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    /// The stage's output was already present and nothing was done
    Skipped,
    /// The stage did its work
    Completed,
}

impl StageStatus {
    /// True when the stage had nothing to do
    pub fn is_skipped(&self) -> bool {
        matches!(self, StageStatus::Skipped)
    }
}

/// Final state of one descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Artifacts were already present locally
    Skipped,
    /// Fetched and/or converted during this run
    Succeeded,
    /// A stage failed
    Failed {
        /// Stage that failed
        stage: Stage,
        /// Human-readable cause
        reason: String,
    },
}

impl OutcomeKind {
    /// True for the failed variant
    pub fn is_failed(&self) -> bool {
        matches!(self, OutcomeKind::Failed { .. })
    }

    /// Short label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            OutcomeKind::Skipped => "SKIPPED",
            OutcomeKind::Succeeded => "OK",
            OutcomeKind::Failed { .. } => "FAILED",
        }
    }
}

/// Finalized outcome for one descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadOutcome {
    id: DescriptorId,
    #[serde(flatten)]
    kind: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    rows_loaded: Option<u64>,
    duration_ms: u64,
}

impl DownloadOutcome {
    /// Artifacts already present
    pub fn skipped(id: DescriptorId) -> Self {
        Self::with_kind(id, OutcomeKind::Skipped)
    }

    /// Pipeline did work and finished
    pub fn succeeded(id: DescriptorId) -> Self {
        Self::with_kind(id, OutcomeKind::Succeeded)
    }

    /// Pipeline failed at `stage`
    pub fn failed(id: DescriptorId, stage: Stage, reason: impl Into<String>) -> Self {
        Self::with_kind(
            id,
            OutcomeKind::Failed {
                stage,
                reason: reason.into(),
            },
        )
    }

    fn with_kind(id: DescriptorId, kind: OutcomeKind) -> Self {
        Self {
            id,
            kind,
            rows_loaded: None,
            duration_ms: 0,
        }
    }

    /// Record how many rows the load stage wrote
    pub fn with_rows_loaded(mut self, rows: u64) -> Self {
        self.rows_loaded = Some(rows);
        self
    }

    /// Record the wall-clock time spent on this descriptor
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_millis() as u64;
        self
    }

    /// Identity of the descriptor
    pub fn id(&self) -> DescriptorId {
        self.id
    }

    /// Final state
    pub fn kind(&self) -> &OutcomeKind {
        &self.kind
    }

    /// Rows written by the load stage, if it ran
    pub fn rows_loaded(&self) -> Option<u64> {
        self.rows_loaded
    }

    /// Wall-clock milliseconds spent on this descriptor
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// True for failed outcomes
    pub fn is_failed(&self) -> bool {
        self.kind.is_failed()
    }
}
