use crate::copier::file_pair::{LTLF_EXTENSION, PART_EXTENSION};
use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// `.ltlf` files with identical contents. `kept` is the lowest-numbered one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub kept: PathBuf,
    pub removed: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// `.part` companions of the removed formulas, whether or not they exist.
    pub fn removed_parts(&self) -> Vec<PathBuf> {
        self.removed
            .iter()
            .map(|p| p.with_extension(PART_EXTENSION))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupeSummary {
    pub groups: Vec<DuplicateGroup>,
    pub files_removed: usize,
    /// Set when this run created the backup.
    pub backup_created: Option<PathBuf>,
    pub dry_run: bool,
}

impl DedupeSummary {
    pub fn duplicates(&self) -> usize {
        self.groups.iter().map(|g| g.removed.len()).sum()
    }
}

/// Removes content-identical `.ltlf` files (and their `.part` files) from a
/// directory, keeping the lowest-numbered copy of each formula.
pub struct Deduplicator {
    dir: PathBuf,
    backup_dir: PathBuf,
    dry_run: bool,
}

impl Deduplicator {
    pub fn new<P: Into<PathBuf>, B: Into<PathBuf>>(dir: P, backup_dir: B) -> Self {
        Self {
            dir: dir.into(),
            backup_dir: backup_dir.into(),
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Groups the directory's `.ltlf` files by exact contents. Only groups
    /// with more than one member are returned, ordered by kept file.
    pub fn find_duplicates(&self) -> Result<Vec<DuplicateGroup>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut by_content: BTreeMap<Vec<u8>, Vec<PathBuf>> = BTreeMap::new();

        let walker = WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false);

        for entry in walker {
            let entry = entry.map_err(|e| FilterError::Dedupe {
                path: self.dir.display().to_string(),
                message: e.to_string(),
            })?;

            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(LTLF_EXTENSION)
            {
                continue;
            }

            let content = fs::read(path).map_err(|e| dedupe_error(path, e))?;
            trace!(file = %path.display(), bytes = content.len(), "formula read");
            by_content.entry(content).or_default().push(path.to_path_buf());
        }

        let mut groups: Vec<DuplicateGroup> = by_content
            .into_values()
            .filter(|paths| paths.len() > 1)
            .map(|mut paths| {
                paths.sort_by_cached_key(|p| numeric_order(p));
                let kept = paths.remove(0);
                DuplicateGroup {
                    kept,
                    removed: paths,
                }
            })
            .collect();

        groups.sort_by_cached_key(|g| numeric_order(&g.kept));
        debug!(groups = groups.len(), dir = %self.dir.display(), "duplicate scan finished");
        Ok(groups)
    }

    /// Copies the directory to the backup location unless a backup already
    /// exists. Returns the backup path when one was created.
    pub fn backup(&self) -> Result<Option<PathBuf>> {
        if self.backup_dir.exists() {
            debug!(backup = %self.backup_dir.display(), "backup already present");
            return Ok(None);
        }

        for entry in WalkDir::new(&self.dir).follow_links(false) {
            let entry = entry.map_err(|e| FilterError::Dedupe {
                path: self.dir.display().to_string(),
                message: e.to_string(),
            })?;

            let relative = entry
                .path()
                .strip_prefix(&self.dir)
                .map_err(|e| FilterError::Dedupe {
                    path: entry.path().display().to_string(),
                    message: e.to_string(),
                })?;
            let target = self.backup_dir.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target).map_err(|e| dedupe_error(&target, e))?;
            } else if entry.file_type().is_file() {
                fs::copy(entry.path(), &target).map_err(|e| dedupe_error(entry.path(), e))?;
            }
        }

        Ok(Some(self.backup_dir.clone()))
    }

    /// Backs up the directory, then deletes every duplicate and its `.part`.
    /// In dry-run mode only the scan runs.
    pub fn run(&self) -> Result<DedupeSummary> {
        let groups = self.find_duplicates()?;

        let mut summary = DedupeSummary {
            dry_run: self.dry_run,
            ..DedupeSummary::default()
        };

        if groups.is_empty() || self.dry_run {
            summary.groups = groups;
            return Ok(summary);
        }

        summary.backup_created = self.backup()?;

        for group in &groups {
            for (ltlf, part) in group.removed.iter().zip(group.removed_parts()) {
                fs::remove_file(ltlf).map_err(|e| dedupe_error(ltlf, e))?;
                summary.files_removed += 1;

                match fs::remove_file(&part) {
                    Ok(()) => summary.files_removed += 1,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(dedupe_error(&part, e)),
                }
                debug!(
                    removed = %ltlf.display(),
                    kept = %group.kept.display(),
                    "duplicate removed"
                );
            }
        }

        summary.groups = groups;
        Ok(summary)
    }
}

// Numeric stems first in numeric order, anything else after by name.
fn numeric_order(path: &Path) -> (bool, u64, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    match stem.parse::<u64>() {
        Ok(n) => (false, n, stem),
        Err(_) => (true, 0, stem),
    }
}

fn dedupe_error(path: &Path, error: io::Error) -> FilterError {
    FilterError::Dedupe {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}
