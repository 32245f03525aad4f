use crate::manifest::Identifier;
use std::path::{Path, PathBuf};

pub const LTLF_EXTENSION: &str = "ltlf";
pub const PART_EXTENSION: &str = "part";

/// The `.ltlf` formula file and its `.part` partition file for one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub id: Identifier,
    pub ltlf: PathBuf,
    pub part: PathBuf,
}

impl FilePair {
    pub fn locate(source_dir: &Path, id: &Identifier) -> Self {
        Self {
            id: id.clone(),
            ltlf: source_dir.join(id.file_name(LTLF_EXTENSION)),
            part: source_dir.join(id.file_name(PART_EXTENSION)),
        }
    }

    pub fn paths(&self) -> [&Path; 2] {
        [&self.ltlf, &self.part]
    }

    pub fn missing(&self) -> Vec<PathBuf> {
        self.paths()
            .into_iter()
            .filter(|p| !p.exists())
            .map(Path::to_path_buf)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.paths().iter().all(|p| p.exists())
    }
}
