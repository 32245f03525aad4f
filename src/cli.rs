use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ltlf-filter")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Copy .ltlf/.part pairs listed in a CSV manifest")]
#[command(
    long_about = "ltlf-filter reads a folder,number,status manifest, pads each number to a \
                  fixed-width identifier and copies the matching <id>.ltlf and <id>.part \
                  files from the source directory into the destination directory. A pair is \
                  copied only when both files exist."
)]
#[command(after_help = "EXAMPLES:\n  \
    ltlf-filter\n  \
    ltlf-filter --manifest syft_2_ok.csv --source syft_2 --dest syft_2_filtered\n  \
    ltlf-filter --status Realizable --skip-header --report run.json\n  \
    ltlf-filter --dry-run --output-format plain\n  \
    ltlf-filter --dedupe --backup-dir syft_1_filtered.orig")]
pub struct Cli {
    /// Manifest CSV with folder,number,status rows [default: syft_1_ok.csv]
    #[arg(short, long, env = "LTLF_FILTER_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Directory holding the <id>.ltlf and <id>.part files [default: syft_1]
    #[arg(short, long, env = "LTLF_FILTER_SOURCE")]
    pub source: Option<PathBuf>,

    /// Directory the pairs are copied into, created if missing [default: syft_1_filtered]
    #[arg(short, long, env = "LTLF_FILTER_DEST")]
    pub dest: Option<PathBuf>,

    /// Minimum number of digits in an identifier [default: 3]
    #[arg(long)]
    pub width: Option<usize>,

    /// Treat the first manifest line as a header instead of data
    #[arg(long)]
    pub skip_header: bool,

    /// Only process records whose status column equals this value
    #[arg(long, value_name = "STATUS")]
    pub status: Option<String>,

    /// Exit with status 2 when any record produced a warning
    #[arg(long)]
    pub strict: bool,

    /// Check every record without copying anything
    #[arg(long, help = "Show what would be copied without actually doing it")]
    pub dry_run: bool,

    /// Process records on a thread pool (requires the `parallel` feature)
    #[arg(long)]
    pub parallel: bool,

    /// Write a JSON run report to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// After copying, remove .ltlf files in the destination whose contents
    /// duplicate a lower-numbered one, together with their .part files
    #[arg(long)]
    pub dedupe: bool,

    /// Backup location used by --dedupe [default: <DEST>_backup]
    #[arg(long, value_name = "DIR", requires = "dedupe")]
    pub backup_dir: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only per-record lines and errors)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON lines output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::default();

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_manifest(self.manifest.clone())
            .with_source_dir(self.source.clone())
            .with_dest_dir(self.dest.clone())
            .with_pad_width(self.width)
            .with_skip_header(flag(self.skip_header))
            .with_status_filter(self.status.clone())
            .with_dry_run(flag(self.dry_run))
            .with_strict(flag(self.strict))
            .with_parallel(flag(self.parallel))
            .with_report_path(self.report.clone())
            .with_dedupe(flag(self.dedupe))
            .with_backup_dir(self.backup_dir.clone())
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

// Unset switches leave the configured default alone.
fn flag(set: bool) -> Option<bool> {
    set.then_some(true)
}
