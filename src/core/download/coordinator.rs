//! Download coordinator - drives fetch, convert and load across the plan
//!
//! A single task owns the dispatch loop. It keeps at most `concurrency`
//! pipelines in flight, records each finalized outcome in completion order,
//! and feeds the consecutive-failure breaker. No other task touches the
//! breaker or the report.

use super::breaker::ConsecutiveFailureBreaker;
use super::report::{RunReport, RunStatus};
use crate::adapters::archive::ArtifactFetcher;
use crate::adapters::warehouse::LoadTarget;
use crate::config::schema::DownloadConfig;
use crate::core::convert::ArtifactConverter;
use crate::domain::descriptor::FileDescriptor;
use crate::domain::errors::TripdataError;
use crate::domain::outcome::{DownloadOutcome, OutcomeKind, Stage};
use crate::domain::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Run-time knobs for one coordinator run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorOptions {
    /// Maximum pipelines in flight
    pub concurrency: usize,

    /// Re-fetch and re-convert even when artifacts exist
    pub force: bool,

    /// Run the load stage
    pub load: bool,

    /// Consecutive failures that stop dispatch
    pub max_consecutive_failures: usize,
}

impl CoordinatorOptions {
    /// Options from the download section, loading enabled, no force
    pub fn from_config(config: &DownloadConfig) -> Self {
        Self {
            concurrency: config.concurrency,
            force: false,
            load: true,
            max_consecutive_failures: config.max_consecutive_failures,
        }
    }
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self::from_config(&DownloadConfig::default())
    }
}

/// Download coordinator
pub struct DownloadCoordinator {
    fetcher: Arc<dyn ArtifactFetcher>,
    converter: Arc<dyn ArtifactConverter>,
    loader: Option<Arc<dyn LoadTarget>>,
    options: CoordinatorOptions,
    shutdown: watch::Receiver<bool>,
}

impl DownloadCoordinator {
    /// Create a new download coordinator
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Fetch stage
    /// * `converter` - Convert stage
    /// * `loader` - Load stage; required when `options.load` is set
    /// * `options` - Concurrency, force, load and breaker settings
    /// * `shutdown` - Receiver that flips to `true` when the run should stop
    ///
    /// # Errors
    ///
    /// Returns [`TripdataError::Initialization`] if loading is requested
    /// without a load target.
    pub fn new(
        fetcher: Arc<dyn ArtifactFetcher>,
        converter: Arc<dyn ArtifactConverter>,
        loader: Option<Arc<dyn LoadTarget>>,
        options: CoordinatorOptions,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        if options.load && loader.is_none() {
            return Err(TripdataError::Initialization(
                "Loading was requested but no load target is configured".to_string(),
            ));
        }

        Ok(Self {
            fetcher,
            converter,
            loader: if options.load { loader } else { None },
            options,
            shutdown,
        })
    }

    /// Run the pipeline for every descriptor of `plan`
    ///
    /// Dispatch stops early when the breaker trips or a shutdown is signalled;
    /// in both cases pipelines already in flight run to completion. The
    /// returned report lists every dispatched outcome and every descriptor
    /// that was never dispatched.
    pub async fn run(&self, plan: Vec<FileDescriptor>) -> RunReport {
        let concurrency = self.options.concurrency.max(1);
        let mut breaker = ConsecutiveFailureBreaker::new(self.options.max_consecutive_failures);
        let mut report = RunReport::start(plan.len(), breaker.threshold());
        let mut shutdown = self.shutdown.clone();
        let mut shutdown_open = true;
        let mut stop: Option<RunStatus> = None;
        let mut pending = plan.into_iter();
        let mut in_flight = FuturesUnordered::new();

        tracing::info!(
            planned = report.planned(),
            concurrency = concurrency,
            force = self.options.force,
            load = self.loader.is_some(),
            max_consecutive_failures = breaker.threshold(),
            "Starting download run"
        );

        loop {
            while stop.is_none() && in_flight.len() < concurrency {
                if *shutdown.borrow() {
                    tracing::warn!("Shutdown requested, no further files will be dispatched");
                    stop = Some(RunStatus::Interrupted);
                    break;
                }
                match pending.next() {
                    Some(descriptor) => in_flight.push(self.process(descriptor)),
                    None => break,
                }
            }

            if in_flight.is_empty() {
                break;
            }

            tokio::select! {
                Some(outcome) = in_flight.next() => {
                    log_outcome(&outcome);
                    if breaker.record(outcome.kind()) && stop.is_none() {
                        tracing::error!(
                            consecutive_failures = breaker.consecutive_failures(),
                            in_flight = in_flight.len(),
                            "Circuit breaker tripped, draining in-flight work"
                        );
                        stop = Some(RunStatus::AbortedByCircuitBreaker);
                    }
                    report.record(outcome);
                }
                changed = shutdown.changed(), if shutdown_open && stop.is_none() => {
                    if changed.is_err() {
                        shutdown_open = false;
                    }
                }
            }
        }

        let not_dispatched: Vec<_> = pending.map(|descriptor| descriptor.id).collect();
        let report = report.finish(
            stop.unwrap_or(RunStatus::Completed),
            not_dispatched,
            breaker.consecutive_failures(),
        );
        report.log_summary();
        report
    }

    /// Run the three stages for one descriptor and time them
    async fn process(&self, descriptor: FileDescriptor) -> DownloadOutcome {
        let started = Instant::now();
        self.pipeline(&descriptor).await.with_duration(started.elapsed())
    }

    async fn pipeline(&self, descriptor: &FileDescriptor) -> DownloadOutcome {
        let force = self.options.force;

        let fetched = match self.fetcher.fetch(descriptor, force).await {
            Ok(status) => status,
            Err(e) => {
                return DownloadOutcome::failed(descriptor.id, Stage::Fetch, e.cause.to_string())
            }
        };

        let converted = match self.converter.convert(descriptor, force).await {
            Ok(status) => status,
            Err(e) => {
                return DownloadOutcome::failed(descriptor.id, Stage::Convert, e.cause.to_string())
            }
        };

        let outcome = if fetched.is_skipped() && converted.is_skipped() {
            DownloadOutcome::skipped(descriptor.id)
        } else {
            DownloadOutcome::succeeded(descriptor.id)
        };

        match &self.loader {
            None => outcome,
            Some(loader) => match loader.load(descriptor).await {
                Ok(rows) => outcome.with_rows_loaded(rows),
                Err(e) => DownloadOutcome::failed(descriptor.id, Stage::Load, e.cause.to_string()),
            },
        }
    }
}

fn log_outcome(outcome: &DownloadOutcome) {
    let id = outcome.id();
    match outcome.kind() {
        OutcomeKind::Failed { stage, reason } => tracing::warn!(
            category = %id.category,
            year = %id.year,
            month = %id.month,
            stage = %stage,
            reason = %reason,
            "File failed"
        ),
        kind => tracing::info!(
            category = %id.category,
            year = %id.year,
            month = %id.month,
            status = kind.label(),
            duration_ms = outcome.duration_ms(),
            "File finished"
        ),
    }
}
