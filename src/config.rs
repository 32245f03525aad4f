use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_MANIFEST: &str = "syft_1_ok.csv";
pub const DEFAULT_SOURCE_DIR: &str = "syft_1";
pub const DEFAULT_DEST_DIR: &str = "syft_1_filtered";
pub const DEFAULT_PAD_WIDTH: usize = 3;
pub const MAX_PAD_WIDTH: usize = 20;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub paths: PathConfig,
    pub records: RecordConfig,
    pub run: RunConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathConfig {
    pub manifest: PathBuf,
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordConfig {
    pub pad_width: usize,
    pub skip_header: bool,
    /// Only records whose status column equals this value are processed.
    pub status_filter: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunConfig {
    pub dry_run: bool,
    pub strict: bool,
    pub parallel: bool,
    pub report_path: Option<PathBuf>,
    /// Remove content-identical `.ltlf` files from the destination after copying.
    pub dedupe: bool,
    /// Where the destination is backed up before duplicates are removed.
    pub backup_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathConfig::default(),
            records: RecordConfig::default(),
            run: RunConfig::default(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            dest_dir: PathBuf::from(DEFAULT_DEST_DIR),
        }
    }
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            pad_width: DEFAULT_PAD_WIDTH,
            skip_header: false, // every line is data unless told otherwise
            status_filter: None,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            strict: false,
            parallel: false,
            report_path: None,
            dedupe: false,
            backup_dir: None,
        }
    }
}

impl Config {
    /// The backup directory, defaulting to a `<dest>_backup` sibling of the destination.
    pub fn backup_dir(&self) -> PathBuf {
        if let Some(ref backup_dir) = self.run.backup_dir {
            return backup_dir.clone();
        }

        let mut name = self
            .paths
            .dest_dir
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_DEST_DIR.into());
        name.push("_backup");
        self.paths.dest_dir.with_file_name(name)
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref manifest) = cli_args.manifest {
            self.paths.manifest = manifest.clone();
        }

        if let Some(ref source_dir) = cli_args.source_dir {
            self.paths.source_dir = source_dir.clone();
        }

        if let Some(ref dest_dir) = cli_args.dest_dir {
            self.paths.dest_dir = dest_dir.clone();
        }

        if let Some(width) = cli_args.pad_width {
            self.records.pad_width = width;
        }

        if let Some(skip_header) = cli_args.skip_header {
            self.records.skip_header = skip_header;
        }

        if let Some(ref status) = cli_args.status_filter {
            let status = status.trim();
            self.records.status_filter = if status.is_empty() {
                None
            } else {
                Some(status.to_string())
            };
        }

        if let Some(dry_run) = cli_args.dry_run {
            self.run.dry_run = dry_run;
        }

        if let Some(strict) = cli_args.strict {
            self.run.strict = strict;
        }

        if let Some(parallel) = cli_args.parallel {
            self.run.parallel = parallel;
        }

        if let Some(ref report_path) = cli_args.report_path {
            self.run.report_path = Some(report_path.clone());
        }

        if let Some(dedupe) = cli_args.dedupe {
            self.run.dedupe = dedupe;
        }

        if let Some(ref backup_dir) = cli_args.backup_dir {
            self.run.backup_dir = Some(backup_dir.clone());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.records.pad_width == 0 || self.records.pad_width > MAX_PAD_WIDTH {
            return Err(FilterError::Config {
                message: format!(
                    "Pad width must be between 1 and {} (got {})",
                    MAX_PAD_WIDTH, self.records.pad_width
                ),
            });
        }

        if self.paths.manifest.as_os_str().is_empty() {
            return Err(FilterError::Config {
                message: "Manifest path must not be empty".to_string(),
            });
        }

        if self.paths.source_dir.as_os_str().is_empty() {
            return Err(FilterError::Config {
                message: "Source directory must not be empty".to_string(),
            });
        }

        if self.paths.dest_dir.as_os_str().is_empty() {
            return Err(FilterError::Config {
                message: "Destination directory must not be empty".to_string(),
            });
        }

        // Copying a directory onto itself would truncate every source file.
        if self.paths.source_dir == self.paths.dest_dir {
            return Err(FilterError::Config {
                message: format!(
                    "Source and destination directories are the same: {}",
                    self.paths.source_dir.display()
                ),
            });
        }

        if self.run.dedupe && self.backup_dir() == self.paths.dest_dir {
            return Err(FilterError::Config {
                message: format!(
                    "Backup directory must differ from the destination: {}",
                    self.paths.dest_dir.display()
                ),
            });
        }

        if self.run.parallel && !cfg!(feature = "parallel") {
            return Err(FilterError::Config {
                message: "--parallel requires building with the `parallel` feature".to_string(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub manifest: Option<PathBuf>,
    pub source_dir: Option<PathBuf>,
    pub dest_dir: Option<PathBuf>,
    pub pad_width: Option<usize>,
    pub skip_header: Option<bool>,
    pub status_filter: Option<String>,
    pub dry_run: Option<bool>,
    pub strict: Option<bool>,
    pub parallel: Option<bool>,
    pub report_path: Option<PathBuf>,
    pub dedupe: Option<bool>,
    pub backup_dir: Option<PathBuf>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manifest(mut self, manifest: Option<PathBuf>) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn with_source_dir(mut self, source_dir: Option<PathBuf>) -> Self {
        self.source_dir = source_dir;
        self
    }

    pub fn with_dest_dir(mut self, dest_dir: Option<PathBuf>) -> Self {
        self.dest_dir = dest_dir;
        self
    }

    pub fn with_pad_width(mut self, width: Option<usize>) -> Self {
        self.pad_width = width;
        self
    }

    pub fn with_skip_header(mut self, skip: Option<bool>) -> Self {
        self.skip_header = skip;
        self
    }

    pub fn with_status_filter(mut self, status: Option<String>) -> Self {
        self.status_filter = status;
        self
    }

    pub fn with_dry_run(mut self, dry_run: Option<bool>) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_strict(mut self, strict: Option<bool>) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_parallel(mut self, parallel: Option<bool>) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_report_path(mut self, path: Option<PathBuf>) -> Self {
        self.report_path = path;
        self
    }

    pub fn with_dedupe(mut self, dedupe: Option<bool>) -> Self {
        self.dedupe = dedupe;
        self
    }

    pub fn with_backup_dir(mut self, backup_dir: Option<PathBuf>) -> Self {
        self.backup_dir = backup_dir;
        self
    }
}
