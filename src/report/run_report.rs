use crate::config::Config;
use crate::dedupe::DedupeSummary;
use crate::error::{FilterError, Result};
use crate::report::{RecordOutcome, RunProgress};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub summary: RunSummary,
    pub outcomes: Vec<RecordOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    pub config_used: Config,
    pub dedupe: Option<DedupeSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub records: usize,
    pub copied: usize,
    pub missing: usize,
    pub copy_failures: usize,
    pub malformed: usize,
    pub skipped: usize,
    pub bytes_copied: u64,
    pub duration_ms: u64,
    pub duplicates: usize,
}

impl RunSummary {
    pub fn from_progress(progress: &RunProgress) -> Self {
        Self {
            records: progress.records_processed,
            copied: progress.pairs_copied,
            missing: progress.pairs_missing,
            copy_failures: progress.copy_failures,
            malformed: progress.malformed,
            skipped: progress.skipped,
            bytes_copied: progress.bytes_copied,
            duration_ms: progress.elapsed().as_millis() as u64,
            duplicates: 0,
        }
    }

    pub fn warnings(&self) -> usize {
        self.missing + self.copy_failures + self.malformed
    }
}

impl RunReport {
    pub fn new(
        progress: &RunProgress,
        outcomes: Vec<RecordOutcome>,
        started_at: DateTime<Utc>,
        config: &Config,
    ) -> Self {
        Self {
            summary: RunSummary::from_progress(progress),
            outcomes,
            started_at,
            finished_at: Utc::now(),
            dry_run: config.run.dry_run,
            config_used: config.clone(),
            dedupe: None,
        }
    }

    pub fn with_dedupe(mut self, dedupe: DedupeSummary) -> Self {
        self.summary.duplicates = dedupe.duplicates();
        self.dedupe = Some(dedupe);
        self
    }

    pub fn has_warnings(&self) -> bool {
        self.summary.warnings() > 0
    }

    /// Messages for every row that produced a warning, in manifest order.
    pub fn warning_messages(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| o.is_warning())
            .filter_map(|o| o.console_message())
            .collect()
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(FilterError::Io)?;
            }
        }

        let json_content = serde_json::to_string_pretty(self).map_err(|e| FilterError::Config {
            message: format!("Failed to serialize run report to JSON: {}", e),
        })?;

        fs::write(path, json_content).map_err(FilterError::Io)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Identifier;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn sample_outcomes() -> Vec<RecordOutcome> {
        vec![
            RecordOutcome::Copied {
                line: 1,
                id: Identifier::from_value(7, 3),
                bytes: 12,
            },
            RecordOutcome::Missing {
                line: 2,
                id: Identifier::from_value(42, 3),
                missing: vec![PathBuf::from("syft_1/042.part")],
            },
        ]
    }

    fn sample_report() -> RunReport {
        let outcomes = sample_outcomes();
        let mut progress = RunProgress::new();
        for outcome in &outcomes {
            progress.record(outcome);
        }
        RunReport::new(&progress, outcomes, Utc::now(), &Config::default())
    }

    #[test]
    fn test_report_summary() {
        let report = sample_report();

        assert_eq!(report.summary.records, 2);
        assert_eq!(report.summary.copied, 1);
        assert_eq!(report.summary.missing, 1);
        assert_eq!(report.summary.bytes_copied, 12);
        assert!(report.has_warnings());
        assert_eq!(
            report.warning_messages(),
            vec!["Warning: Files for number 042 not found".to_string()]
        );
    }

    #[test]
    fn test_save_json_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reports").join("run.json");

        sample_report().save_json(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["summary"]["copied"], 1);
        assert_eq!(parsed["outcomes"][1]["status"], "missing");
        assert_eq!(parsed["config_used"]["records"]["pad_width"], 3);
    }

    #[test]
    fn test_dedupe_summary_is_attached() {
        let dedupe = DedupeSummary {
            groups: vec![crate::dedupe::DuplicateGroup {
                kept: PathBuf::from("out/001.ltlf"),
                removed: vec![PathBuf::from("out/004.ltlf")],
            }],
            files_removed: 2,
            backup_created: None,
            dry_run: false,
        };

        let report = sample_report().with_dedupe(dedupe);

        assert_eq!(report.summary.duplicates, 1);
        assert_eq!(report.dedupe.as_ref().unwrap().files_removed, 2);
    }
}
