pub mod file_pair;
pub mod pair_copier;
pub mod processor;

pub use file_pair::FilePair;
pub use pair_copier::{is_same_file, PairCopier};
pub use processor::RecordProcessor;
