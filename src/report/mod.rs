pub mod outcome;
pub mod run_report;

pub use outcome::{RecordOutcome, RunProgress};
pub use run_report::{RunReport, RunSummary};
