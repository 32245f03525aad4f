pub mod cli;
pub mod config;
pub mod copier;
pub mod dedupe;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod report;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, PathConfig, RecordConfig, RunConfig};
pub use error::{FilterError, Result, UserFriendlyError};

// Core functionality re-exports
pub use copier::{FilePair, PairCopier, RecordProcessor};
pub use dedupe::{DedupeSummary, Deduplicator, DuplicateGroup};
pub use manifest::{Identifier, ManifestEntry, ManifestReader, ManifestRecords, ManifestRow};
pub use report::{RecordOutcome, RunProgress, RunReport, RunSummary};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use chrono::Utc;
use indicatif::ProgressBar;
use std::borrow::Borrow;
use std::fs::File;
use std::io::BufReader;
use tokio::task;
use tracing::{debug, info};

/// Main library interface: reads the manifest and copies the selected pairs.
#[derive(Clone)]
pub struct LtlfFilter {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl LtlfFilter {
    /// Create a new instance. No Ctrl+C handler is attached; see [`LtlfFilter::with_shutdown`].
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(output_mode == OutputMode::Human && !quiet);

        Self {
            config,
            output_formatter,
            progress_manager,
            shutdown: GracefulShutdown::detached(),
        }
    }

    /// Create an instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(config, output_mode, cli_args.verbose, cli_args.quiet))
    }

    pub fn with_shutdown(mut self, shutdown: GracefulShutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Run the filter on tokio's blocking pool.
    pub async fn run(&self) -> Result<RunReport> {
        let filter = self.clone();
        task::spawn_blocking(move || filter.run_blocking())
            .await
            .map_err(|e| FilterError::Config {
                message: format!("Filter task failed: {}", e),
            })?
    }

    /// Run the filter on the current thread.
    pub fn run_blocking(&self) -> Result<RunReport> {
        let started_at = Utc::now();
        self.shutdown.check_shutdown()?;

        if self.config.run.dry_run {
            self.output_formatter
                .info("DRY RUN MODE - no files will be copied");
        }

        let processor = self.build_processor();

        // The destination exists before the manifest is even opened.
        processor.copier().ensure_output_dir()?;
        processor.check_directories()?;

        let records = self.open_manifest()?;
        self.shutdown.check_shutdown()?;

        let (progress, outcomes) = self.process_records(&processor, records)?;
        let mut report = RunReport::new(&progress, outcomes, started_at, &self.config);

        if self.config.run.dedupe {
            self.shutdown.check_shutdown()?;
            report = report.with_dedupe(self.remove_duplicates()?);
        }

        if let Some(ref report_path) = self.config.run.report_path {
            report.save_json(report_path)?;
            self.output_formatter
                .success(&format!("Run report written to {}", report_path.display()));
        }

        info!(
            copied = report.summary.copied,
            missing = report.summary.missing,
            malformed = report.summary.malformed,
            duplicates = report.summary.duplicates,
            "run finished"
        );
        self.output_formatter
            .print_run_summary(&report.summary, self.config.run.dry_run);

        Ok(report)
    }

    fn build_processor(&self) -> RecordProcessor {
        let copier = PairCopier::new(&self.config.paths.dest_dir)
            .with_dry_run(self.config.run.dry_run);

        RecordProcessor::new(
            &self.config.paths.source_dir,
            self.config.records.clone(),
            copier,
        )
    }

    fn open_manifest(&self) -> Result<ManifestRecords<BufReader<File>>> {
        let manifest = &self.config.paths.manifest;
        self.output_formatter
            .start_operation(&format!("Reading manifest {}", manifest.display()));

        ManifestReader::new(&self.config.records).open(manifest)
    }

    fn process_records(
        &self,
        processor: &RecordProcessor,
        records: ManifestRecords<BufReader<File>>,
    ) -> Result<(RunProgress, Vec<RecordOutcome>)> {
        self.output_formatter.start_operation(&format!(
            "Copying pairs from {} to {}",
            self.config.paths.source_dir.display(),
            self.config.paths.dest_dir.display()
        ));

        let mut progress = RunProgress::new();

        let outcomes = if self.config.run.parallel {
            let spinner = self.progress_manager.create_spinner("Reading manifest...");
            let rows = records.collect::<Result<Vec<_>>>();
            spinner.finish_and_clear();
            let rows = rows?;
            self.output_formatter
                .info(&format!("Found {} manifest records", rows.len()));

            let pb = self
                .progress_manager
                .create_record_progress(Some(rows.len() as u64));
            let outcomes = self.process_parallel(processor, &rows, &pb, &mut progress);
            self.finish_progress(&pb, &progress, &outcomes);
            outcomes?
        } else {
            let pb = self.progress_manager.create_record_progress(None);
            let outcomes = self.process_sequential(processor, records, &pb, &mut progress);
            self.finish_progress(&pb, &progress, &outcomes);
            outcomes?
        };

        Ok((progress, outcomes))
    }

    fn finish_progress(
        &self,
        pb: &ProgressBar,
        progress: &RunProgress,
        outcomes: &Result<Vec<RecordOutcome>>,
    ) {
        match outcomes {
            Ok(_) => ui::progress::finish_progress_with_summary(
                pb,
                &format!("Processed {} records", progress.records_processed),
                progress.elapsed(),
            ),
            Err(FilterError::Cancelled) => pb.abandon_with_message("Cancelled"),
            Err(_) => pb.abandon_with_message("Failed"),
        }
        self.progress_manager.clear();
    }

    /// Records are handled as they are read, so a read error partway through
    /// the manifest leaves earlier pairs copied.
    fn process_sequential<I, R>(
        &self,
        processor: &RecordProcessor,
        records: I,
        pb: &ProgressBar,
        progress: &mut RunProgress,
    ) -> Result<Vec<RecordOutcome>>
    where
        I: Iterator<Item = Result<R>>,
        R: Borrow<ManifestRow>,
    {
        let mut outcomes = Vec::new();

        for row in records {
            self.shutdown.check_shutdown()?;

            let outcome = processor.process(row?.borrow());
            self.emit(&outcome, pb, progress);
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    /// Records are evaluated on the rayon pool, then reported in manifest
    /// order so console lines never interleave.
    #[cfg(feature = "parallel")]
    fn process_parallel(
        &self,
        processor: &RecordProcessor,
        rows: &[ManifestRow],
        pb: &ProgressBar,
        progress: &mut RunProgress,
    ) -> Result<Vec<RecordOutcome>> {
        use rayon::prelude::*;

        let shutdown = &self.shutdown;
        debug!(threads = rayon::current_num_threads(), "processing records in parallel");

        let outcomes: Vec<RecordOutcome> = rows
            .par_iter()
            .map(|row| {
                shutdown.check_shutdown()?;
                Ok(processor.process(row))
            })
            .collect::<Result<Vec<_>>>()?;

        for outcome in &outcomes {
            self.emit(outcome, pb, progress);
        }

        Ok(outcomes)
    }

    #[cfg(not(feature = "parallel"))]
    fn process_parallel(
        &self,
        processor: &RecordProcessor,
        rows: &[ManifestRow],
        pb: &ProgressBar,
        progress: &mut RunProgress,
    ) -> Result<Vec<RecordOutcome>> {
        debug!("parallel feature not compiled in, processing sequentially");
        self.process_sequential(processor, rows.iter().map(Ok), pb, progress)
    }

    fn remove_duplicates(&self) -> Result<DedupeSummary> {
        let dest = &self.config.paths.dest_dir;
        self.output_formatter
            .start_operation(&format!("Removing duplicate formulas in {}", dest.display()));

        let summary = Deduplicator::new(dest, self.config.backup_dir())
            .with_dry_run(self.config.run.dry_run)
            .run()?;

        if let Some(ref backup) = summary.backup_created {
            self.output_formatter
                .success(&format!("Created backup in {}", backup.display()));
        }
        for group in &summary.groups {
            self.output_formatter.duplicate_group(group, summary.dry_run);
        }

        Ok(summary)
    }

    fn emit(&self, outcome: &RecordOutcome, pb: &ProgressBar, progress: &mut RunProgress) {
        progress.record(outcome);
        self.progress_manager
            .suspend(|| self.output_formatter.record_outcome(outcome));
        ui::progress::update_record_progress(pb, progress);
    }

    /// Get configuration reference
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get output formatter reference
    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Check if shutdown has been requested
    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    /// Request graceful shutdown
    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &FilterError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
