//! Download orchestration
//!
//! - [`coordinator`] - Bounded-concurrency fetch, convert and load
//! - [`breaker`] - Consecutive-failure circuit breaker
//! - [`report`] - Aggregated run report

pub mod breaker;
pub mod coordinator;
pub mod report;

pub use breaker::ConsecutiveFailureBreaker;
pub use coordinator::{CoordinatorOptions, DownloadCoordinator};
pub use report::{RunReport, RunStatus};
