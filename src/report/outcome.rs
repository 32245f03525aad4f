use crate::manifest::Identifier;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// What happened to a single manifest row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    Copied {
        line: u64,
        id: Identifier,
        bytes: u64,
    },
    Missing {
        line: u64,
        id: Identifier,
        missing: Vec<PathBuf>,
    },
    CopyFailed {
        line: u64,
        id: Identifier,
        message: String,
    },
    Malformed {
        line: u64,
        message: String,
    },
    Skipped {
        line: u64,
        reason: String,
    },
}

impl RecordOutcome {
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            RecordOutcome::Missing { .. }
                | RecordOutcome::CopyFailed { .. }
                | RecordOutcome::Malformed { .. }
        )
    }

    /// The console line for this outcome, or `None` for silently skipped rows.
    pub fn console_message(&self) -> Option<String> {
        match self {
            RecordOutcome::Copied { id, .. } => Some(format!("Copied files for number {}", id)),
            RecordOutcome::Missing { id, .. } => {
                Some(format!("Warning: Files for number {} not found", id))
            }
            RecordOutcome::CopyFailed { id, message, .. } => Some(format!(
                "Warning: Failed to copy files for number {}: {}",
                id, message
            )),
            RecordOutcome::Malformed { message, .. } => Some(format!("Warning: {}", message)),
            RecordOutcome::Skipped { .. } => None,
        }
    }
}

/// Running tally kept while records are processed.
#[derive(Debug, Clone)]
pub struct RunProgress {
    pub records_processed: usize,
    pub pairs_copied: usize,
    pub pairs_missing: usize,
    pub copy_failures: usize,
    pub malformed: usize,
    pub skipped: usize,
    pub bytes_copied: u64,
    pub current_id: Option<String>,
    pub start_time: Instant,
}

impl RunProgress {
    pub fn new() -> Self {
        Self {
            records_processed: 0,
            pairs_copied: 0,
            pairs_missing: 0,
            copy_failures: 0,
            malformed: 0,
            skipped: 0,
            bytes_copied: 0,
            current_id: None,
            start_time: Instant::now(),
        }
    }

    pub fn record(&mut self, outcome: &RecordOutcome) {
        self.records_processed += 1;
        match outcome {
            RecordOutcome::Copied { id, bytes, .. } => {
                self.pairs_copied += 1;
                self.bytes_copied += bytes;
                self.current_id = Some(id.to_string());
            }
            RecordOutcome::Missing { id, .. } => {
                self.pairs_missing += 1;
                self.current_id = Some(id.to_string());
            }
            RecordOutcome::CopyFailed { id, .. } => {
                self.copy_failures += 1;
                self.current_id = Some(id.to_string());
            }
            RecordOutcome::Malformed { .. } => self.malformed += 1,
            RecordOutcome::Skipped { .. } => self.skipped += 1,
        }
    }

    pub fn warnings(&self) -> usize {
        self.pairs_missing + self.copy_failures + self.malformed
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}
