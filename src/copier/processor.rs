use crate::config::RecordConfig;
use crate::copier::{is_same_file, FilePair, PairCopier};
use crate::error::{FilterError, Result, UserFriendlyError};
use crate::manifest::{strip_whitespace, Identifier, ManifestEntry, ManifestRow};
use crate::report::RecordOutcome;
use std::path::PathBuf;
use tracing::debug;

/// Turns one manifest row into a [`RecordOutcome`], copying the pair when
/// both files are present. Never fails: every per-record problem becomes an
/// outcome so the run can continue.
pub struct RecordProcessor {
    source_dir: PathBuf,
    records: RecordConfig,
    copier: PairCopier,
}

impl RecordProcessor {
    pub fn new<P: Into<PathBuf>>(source_dir: P, records: RecordConfig, copier: PairCopier) -> Self {
        Self {
            source_dir: source_dir.into(),
            records,
            copier,
        }
    }

    /// Fails when the source and destination resolve to the same directory,
    /// however they were spelled. A destination that does not exist yet
    /// cannot alias anything.
    pub fn check_directories(&self) -> Result<()> {
        if is_same_file(&self.source_dir, self.copier.dest_dir()) {
            return Err(FilterError::Config {
                message: format!(
                    "Source and destination directories are the same: {} and {}",
                    self.source_dir.display(),
                    self.copier.dest_dir().display()
                ),
            });
        }
        Ok(())
    }

    pub fn copier(&self) -> &PairCopier {
        &self.copier
    }

    pub fn process(&self, row: &ManifestRow) -> RecordOutcome {
        match row {
            Ok(entry) => self.process_entry(entry),
            Err(error) => {
                let line = match error {
                    FilterError::MalformedRecord { line, .. } => *line,
                    _ => 0,
                };
                RecordOutcome::Malformed {
                    line,
                    message: error.user_message(),
                }
            }
        }
    }

    pub fn process_entry(&self, entry: &ManifestEntry) -> RecordOutcome {
        if let Some(ref wanted) = self.records.status_filter {
            if !entry.matches_status(wanted) {
                debug!(line = entry.line, status = ?entry.status, "status filtered out");
                return RecordOutcome::Skipped {
                    line: entry.line,
                    reason: format!("status is not {}", wanted),
                };
            }
        }

        if strip_whitespace(&entry.number).is_empty() {
            debug!(line = entry.line, "empty number field");
            return RecordOutcome::Skipped {
                line: entry.line,
                reason: "number field is empty".to_string(),
            };
        }

        let id = match Identifier::parse(&entry.number, self.records.pad_width) {
            Ok(id) => id,
            Err(reason) => {
                let error = FilterError::MalformedRecord {
                    line: entry.line,
                    raw: strip_whitespace(&entry.number),
                    reason,
                };
                return RecordOutcome::Malformed {
                    line: entry.line,
                    message: error.user_message(),
                };
            }
        };

        let pair = FilePair::locate(&self.source_dir, &id);
        if !pair.is_complete() {
            let missing = pair.missing();
            debug!(id = %id, missing = ?missing, "pair incomplete");
            return RecordOutcome::Missing {
                line: entry.line,
                id,
                missing,
            };
        }

        match self.copier.copy_pair(&pair) {
            Ok(bytes) => RecordOutcome::Copied {
                line: entry.line,
                id,
                bytes,
            },
            Err(e) => RecordOutcome::CopyFailed {
                line: entry.line,
                id,
                message: copy_failure_message(&e),
            },
        }
    }
}

fn copy_failure_message(error: &FilterError) -> String {
    match error {
        FilterError::Copy { message, .. } => message.clone(),
        other => other.user_message(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        source: TempDir,
        dest: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                source: TempDir::new().unwrap(),
                dest: TempDir::new().unwrap(),
            }
        }

        fn add(&self, name: &str, content: &str) {
            fs::write(self.source.path().join(name), content).unwrap();
        }

        fn processor(&self, records: RecordConfig) -> RecordProcessor {
            RecordProcessor::new(
                self.source.path(),
                records,
                PairCopier::new(self.dest.path()),
            )
        }
    }

    fn entry(line: u64, number: &str, status: &str) -> ManifestEntry {
        ManifestEntry {
            line,
            folder: "syft_1".to_string(),
            number: number.to_string(),
            status: Some(status.to_string()),
        }
    }

    #[test]
    fn test_complete_pair_is_copied() {
        let fixture = Fixture::new();
        fixture.add("007.ltlf", "G(a -> F b)");
        fixture.add("007.part", ".inputs: a\n.outputs: b\n");

        let outcome = fixture
            .processor(RecordConfig::default())
            .process_entry(&entry(1, " 7 ", "ok"));

        assert!(matches!(outcome, RecordOutcome::Copied { ref id, .. } if id.as_str() == "007"));
        assert!(fixture.dest.path().join("007.ltlf").exists());
        assert!(fixture.dest.path().join("007.part").exists());
    }

    #[test]
    fn test_half_pair_copies_nothing() {
        let fixture = Fixture::new();
        fixture.add("042.ltlf", "F a");

        let outcome = fixture
            .processor(RecordConfig::default())
            .process_entry(&entry(2, "42", "ok"));

        match outcome {
            RecordOutcome::Missing { id, missing, .. } => {
                assert_eq!(id.as_str(), "042");
                assert_eq!(missing, vec![fixture.source.path().join("042.part")]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(!fixture.dest.path().join("042.ltlf").exists());
    }

    #[test]
    fn test_non_numeric_number_is_malformed() {
        let fixture = Fixture::new();
        let outcome = fixture
            .processor(RecordConfig::default())
            .process_entry(&entry(1, "number", "status"));

        assert_eq!(
            outcome,
            RecordOutcome::Malformed {
                line: 1,
                message: "Invalid number format: number".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_number_is_skipped() {
        let fixture = Fixture::new();
        let outcome = fixture
            .processor(RecordConfig::default())
            .process_entry(&entry(3, "  ", "ok"));

        assert!(matches!(outcome, RecordOutcome::Skipped { line: 3, .. }));
    }

    #[test]
    fn test_status_filter() {
        let fixture = Fixture::new();
        fixture.add("001.ltlf", "a");
        fixture.add("001.part", "b");

        let records = RecordConfig {
            status_filter: Some("Realizable".to_string()),
            ..RecordConfig::default()
        };
        let processor = fixture.processor(records);

        assert!(matches!(
            processor.process_entry(&entry(1, "1", "Unrealizable")),
            RecordOutcome::Skipped { .. }
        ));
        assert!(matches!(
            processor.process_entry(&entry(2, "1", "Realizable")),
            RecordOutcome::Copied { .. }
        ));
    }

    #[test]
    fn test_malformed_row_passes_through() {
        let fixture = Fixture::new();
        let row: ManifestRow = Err(FilterError::MalformedRecord {
            line: 9,
            raw: String::new(),
            reason: "expected at least 2 fields, found 1".to_string(),
        });

        let outcome = fixture.processor(RecordConfig::default()).process(&row);
        assert_eq!(
            outcome,
            RecordOutcome::Malformed {
                line: 9,
                message: "Malformed record at line 9: expected at least 2 fields, found 1"
                    .to_string(),
            }
        );
    }

    #[test]
    fn test_copy_failure_is_reported_and_next_record_continues() {
        let fixture = Fixture::new();
        fixture.add("007.ltlf", "G(a)");
        fixture.add("007.part", ".inputs: a\n.outputs: b\n");
        fixture.add("008.ltlf", "F(b)");
        fixture.add("008.part", ".inputs: b\n.outputs: c\n");
        fs::create_dir(fixture.dest.path().join("007.part")).unwrap();

        let processor = fixture.processor(RecordConfig::default());
        let failed = processor.process(&Ok(entry(1, "7", "ok")));
        let copied = processor.process(&Ok(entry(2, "8", "ok")));

        match &failed {
            RecordOutcome::CopyFailed { line, id, .. } => {
                assert_eq!(*line, 1);
                assert_eq!(id.as_str(), "007");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(failed.is_warning());
        assert!(failed
            .console_message()
            .unwrap()
            .starts_with("Warning: Failed to copy files for number 007: "));

        assert_eq!(
            copied.console_message().as_deref(),
            Some("Copied files for number 008")
        );
        assert!(fixture.dest.path().join("008.part").is_file());
    }

    #[test]
    fn test_check_directories_sees_through_aliases() {
        let fixture = Fixture::new();
        let aliased = RecordProcessor::new(
            fixture.source.path(),
            RecordConfig::default(),
            PairCopier::new(fixture.source.path().join(".")),
        );
        assert!(matches!(
            aliased.check_directories(),
            Err(FilterError::Config { .. })
        ));

        let distinct = fixture.processor(RecordConfig::default());
        assert!(distinct.check_directories().is_ok());

        let not_created = RecordProcessor::new(
            fixture.source.path(),
            RecordConfig::default(),
            PairCopier::new(fixture.dest.path().join("later")),
        );
        assert!(not_created.check_directories().is_ok());
    }
}
