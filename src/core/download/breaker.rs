//! Consecutive-failure circuit breaker

use crate::domain::outcome::OutcomeKind;

/// Trips after `threshold` failed outcomes in a row
///
/// Outcomes are recorded in completion order. A failure increments the
/// counter; a success or a skip resets it. Once tripped the breaker stays
/// tripped for the rest of the run.
#[derive(Debug, Clone)]
pub struct ConsecutiveFailureBreaker {
    threshold: usize,
    consecutive: usize,
    tripped_at: Option<usize>,
}

impl ConsecutiveFailureBreaker {
    /// Create a breaker; a threshold of zero is treated as one
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold: threshold.max(1),
            consecutive: 0,
            tripped_at: None,
        }
    }

    /// Record one finalized outcome
    ///
    /// Returns `true` if this outcome tripped the breaker.
    pub fn record(&mut self, outcome: &OutcomeKind) -> bool {
        if outcome.is_failed() {
            self.consecutive += 1;
        } else {
            self.consecutive = 0;
        }

        if self.tripped_at.is_none() && self.consecutive >= self.threshold {
            self.tripped_at = Some(self.consecutive);
            return true;
        }
        false
    }

    /// Whether the threshold has been reached at any point
    pub fn is_tripped(&self) -> bool {
        self.tripped_at.is_some()
    }

    /// Current run of consecutive failures
    pub fn consecutive_failures(&self) -> usize {
        self.consecutive
    }

    /// Configured threshold
    pub fn threshold(&self) -> usize {
        self.threshold
    }
}
