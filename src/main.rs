use clap::Parser;
use ltlf_filter::{
    logging, Cli, FilterError, GracefulShutdown, LtlfFilter, OutputFormatter, OutputMode,
    RunReport, UserFriendlyError,
};
use std::process;

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    let cli = Cli::parse();
    logging::init_cli_logger(cli.verbosity_level(), cli.quiet);
    tracing::debug!(version = ltlf_filter::version_info(), "starting");

    let filter = match LtlfFilter::from_cli(&cli) {
        Ok(filter) => filter,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };

    let filter = match GracefulShutdown::new() {
        Ok(shutdown) => filter.with_shutdown(shutdown),
        Err(e) => {
            filter
                .output_formatter()
                .warning(&format!("Ctrl+C handling unavailable: {}", e.user_message()));
            filter
        }
    };

    match filter.run().await {
        Ok(report) => success_exit_code(&report, filter.config().run.strict),
        Err(e) => {
            filter.handle_error(&e);
            error_exit_code(&e)
        }
    }
}

fn success_exit_code(report: &RunReport, strict: bool) -> i32 {
    if strict && report.has_warnings() {
        2 // Completed with warnings
    } else {
        0
    }
}

fn error_exit_code(error: &FilterError) -> i32 {
    match error {
        FilterError::Cancelled => 130, // Interrupted (SIGINT)
        FilterError::ManifestNotFound { .. } => 3,
        FilterError::OutputDirectory { .. } => 4,
        FilterError::Permission { .. } => 7,
        _ => 1,
    }
}

fn print_startup_error(error: &FilterError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ltlf_filter::{Config, Identifier, RecordOutcome, RunProgress};
    use std::path::PathBuf;

    fn report_with(outcomes: Vec<RecordOutcome>) -> RunReport {
        let mut progress = RunProgress::new();
        for outcome in &outcomes {
            progress.record(outcome);
        }
        RunReport::new(&progress, outcomes, Utc::now(), &Config::default())
    }

    #[test]
    fn test_clean_run_exits_zero() {
        let report = report_with(vec![RecordOutcome::Copied {
            line: 1,
            id: Identifier::parse("7", 3).unwrap(),
            bytes: 10,
        }]);

        assert_eq!(success_exit_code(&report, false), 0);
        assert_eq!(success_exit_code(&report, true), 0);
    }

    #[test]
    fn test_warnings_only_fail_in_strict_mode() {
        let report = report_with(vec![RecordOutcome::Missing {
            line: 1,
            id: Identifier::parse("42", 3).unwrap(),
            missing: vec![PathBuf::from("syft_1/042.part")],
        }]);

        assert_eq!(success_exit_code(&report, false), 0);
        assert_eq!(success_exit_code(&report, true), 2);
    }

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(error_exit_code(&FilterError::Cancelled), 130);
        assert_eq!(
            error_exit_code(&FilterError::ManifestNotFound {
                path: "m.csv".into()
            }),
            3
        );
        assert_eq!(
            error_exit_code(&FilterError::OutputDirectory {
                path: "out".into(),
                message: "read-only".to_string(),
            }),
            4
        );
        assert_eq!(
            error_exit_code(&FilterError::Permission { path: "out".into() }),
            7
        );
        assert_eq!(
            error_exit_code(&FilterError::Config {
                message: "bad".to_string()
            }),
            1
        );
    }
}
