pub mod deduplicator;

pub use deduplicator::{DedupeSummary, Deduplicator, DuplicateGroup};
