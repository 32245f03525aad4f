pub mod identifier;
pub mod reader;

pub use identifier::{strip_whitespace, Identifier};
pub use reader::{ManifestEntry, ManifestReader, ManifestRecords, ManifestRow};
