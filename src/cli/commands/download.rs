//! Download command implementation
//!
//! This module implements the `download` command: it expands the configured
//! dataset groups, applies the selector flags and runs the fetch, convert and
//! load pipeline over the resulting plan.

use super::{EXIT_ABORTED, EXIT_CONFIG, EXIT_INIT, EXIT_INTERRUPTED, EXIT_OK};
use crate::adapters::archive::{resolve_token, HttpArchiveFetcher};
use crate::adapters::warehouse::{DuckDbWarehouse, LoadTarget};
use crate::config::load_config;
use crate::core::convert::DuckDbConverter;
use crate::core::download::{CoordinatorOptions, DownloadCoordinator, RunReport, RunStatus};
use crate::core::plan::{expand, filter_plan, preview, PlannedAction};
use crate::core::workspace::{ensure_ignored, ignore_entry};
use crate::domain::descriptor::FileDescriptor;
use crate::domain::outcome::OutcomeKind;
use crate::domain::{Category, Month, Selector, Year};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the download command
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Download only this taxi type (yellow, green, fhv, fhvhv)
    #[arg(long)]
    pub taxi_type: Option<Category>,

    /// Download only this year
    #[arg(long)]
    pub year: Option<Year>,

    /// Download only this month (1-12)
    #[arg(long)]
    pub month: Option<Month>,

    /// Re-download and re-convert files that already exist
    #[arg(long)]
    pub force: bool,

    /// Skip loading into the warehouse
    #[arg(long)]
    pub no_load: bool,

    /// Show the files that would be processed, without touching anything
    #[arg(long)]
    pub dry_run: bool,

    /// Override the number of concurrent downloads
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=64))]
    pub concurrency: Option<u16>,

    /// Override the consecutive-failure threshold of the circuit breaker
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_consecutive_failures: Option<u32>,

    /// Write the run report as JSON to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

impl DownloadArgs {
    /// Selector built from the filter flags
    pub fn selector(&self) -> Selector {
        let mut selector = Selector::new();
        if let Some(category) = self.taxi_type {
            selector = selector.with_category(category);
        }
        if let Some(year) = self.year {
            selector = selector.with_year(year);
        }
        if let Some(month) = self.month {
            selector = selector.with_month(month);
        }
        selector
    }

    /// Execute the download command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Starting download command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };
        let mut settings = config.settings;

        if let Some(concurrency) = self.concurrency {
            tracing::info!(concurrency = concurrency, "Overriding concurrency from CLI");
            settings.download.concurrency = usize::from(concurrency);
        }
        if let Some(threshold) = self.max_consecutive_failures {
            tracing::info!(
                max_consecutive_failures = threshold,
                "Overriding circuit breaker threshold from CLI"
            );
            settings.download.max_consecutive_failures = threshold as usize;
        }

        let layout = settings.layout();
        let plan = filter_plan(expand(&config.groups, &layout), &self.selector());

        if plan.is_empty() {
            println!("No files to download with the given filters.");
            return Ok(EXIT_OK);
        }

        if self.dry_run {
            print_dry_run(&plan, self.force);
            return Ok(EXIT_OK);
        }

        let ignore_file = &settings.download.ignore_file;
        match ignore_entry(layout.data_dir(), ignore_file) {
            Some(entry) => {
                if let Err(e) = ensure_ignored(ignore_file, &entry) {
                    tracing::warn!(error = %e, "Could not update ignore file");
                }
            }
            None => tracing::warn!(
                data_dir = %layout.data_dir().display(),
                ignore_file = %ignore_file.display(),
                "Data directory is not below the ignore file's directory, not adding an entry"
            ),
        }

        let warehouse = if self.no_load {
            None
        } else {
            match DuckDbWarehouse::open(&settings.warehouse) {
                Ok(w) => Some(Arc::new(w)),
                Err(e) => {
                    println!("❌ Failed to open warehouse");
                    println!("   Error: {e}");
                    return Ok(EXIT_INIT);
                }
            }
        };

        let token = resolve_token(
            &settings.download.token_env_var,
            &settings.download.secrets_file,
        );
        let fetcher = match HttpArchiveFetcher::new(&settings.download, token) {
            Ok(f) => f,
            Err(e) => {
                println!("❌ Failed to initialize HTTP client");
                println!("   Error: {e}");
                return Ok(EXIT_INIT);
            }
        };
        let converter = DuckDbConverter::new(settings.download.remove_raw_after_convert);

        let options = CoordinatorOptions {
            force: self.force,
            load: warehouse.is_some(),
            ..CoordinatorOptions::from_config(&settings.download)
        };

        println!(
            "📥 Processing {} files ({} at a time)",
            plan.len(),
            options.concurrency
        );
        println!();

        let coordinator = match DownloadCoordinator::new(
            Arc::new(fetcher),
            Arc::new(converter),
            warehouse.clone().map(|w| w as Arc<dyn LoadTarget>),
            options,
            shutdown_signal,
        ) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to initialize download coordinator");
                println!("   Error: {e}");
                return Ok(EXIT_INIT);
            }
        };

        let report = coordinator.run(plan).await;

        print_summary(&report);

        if let Some(warehouse) = &warehouse {
            print_table_counts(warehouse.as_ref()).await;
        }

        if let Some(path) = &self.report {
            match report.write_json(path) {
                Ok(()) => println!("📝 Report written to {}", path.display()),
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Failed to write report");
                    println!("❌ Failed to write report to {}: {e}", path.display());
                }
            }
        }

        Ok(exit_code(&report))
    }
}

/// Map a finished run to the process exit code
///
/// A completed run succeeds even when individual files failed; those are
/// listed in the summary. Only a breaker abort or an interrupt is non-zero.
pub fn exit_code(report: &RunReport) -> i32 {
    match report.status() {
        RunStatus::AbortedByCircuitBreaker => EXIT_ABORTED,
        RunStatus::Interrupted => EXIT_INTERRUPTED,
        RunStatus::Completed => EXIT_OK,
    }
}

fn print_dry_run(plan: &[FileDescriptor], force: bool) {
    let labelled = preview(plan, force);
    let new_count = labelled
        .iter()
        .filter(|(_, action)| *action == PlannedAction::New)
        .count();

    println!(
        "🔍 Would download {} files ({} new, {} already exist):",
        plan.len(),
        new_count,
        plan.len() - new_count
    );
    for (descriptor, action) in labelled {
        let note = match action {
            PlannedAction::New => "",
            PlannedAction::Skip => "  (already exists, use --force to re-download)",
            PlannedAction::Redownload => "  (will re-download)",
        };
        println!("  {:<5} {}{}", action, descriptor.raw_file_name(), note);
    }
}

fn print_summary(report: &RunReport) {
    println!();
    match report.status() {
        RunStatus::Completed if report.failed() == 0 => println!("✅ Download completed"),
        RunStatus::Completed => println!("⚠️  Download completed with failures"),
        RunStatus::AbortedByCircuitBreaker => {
            if let Some(error) = report.abort_error() {
                println!("🛑 {error}");
            }
        }
        RunStatus::Interrupted => println!("⚠️  Download interrupted"),
    }
    println!();
    println!("Summary:");
    println!("  Planned: {}", report.planned());
    println!("  Succeeded: {}", report.succeeded());
    println!("  Skipped: {}", report.skipped());
    println!("  Failed: {}", report.failed());
    if !report.not_dispatched().is_empty() {
        println!("  Not started: {}", report.not_dispatched().len());
    }
    println!("  Rows loaded: {}", report.rows_loaded());
    println!("  Duration: {}s", report.duration().num_seconds());

    let mut failures = report.failures().peekable();
    if failures.peek().is_some() {
        println!();
        println!("Failures:");
        for outcome in failures {
            if let OutcomeKind::Failed { stage, reason } = outcome.kind() {
                println!("  ❌ {} ({stage}): {reason}", outcome.id());
            }
        }
    }
}

async fn print_table_counts(warehouse: &DuckDbWarehouse) {
    match warehouse.table_row_counts().await {
        Ok(counts) if !counts.is_empty() => {
            println!();
            println!("Warehouse tables:");
            for count in counts {
                println!("  {}: {} rows", count.table, count.rows);
            }
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "Could not read warehouse row counts"),
    }
}
