use crate::copier::FilePair;
use crate::error::{FilterError, Result};
use std::fs;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

const BUFFER_SIZE: usize = 64 * 1024;

pub struct PairCopier {
    dest_dir: PathBuf,
    dry_run: bool,
}

impl PairCopier {
    pub fn new<P: Into<PathBuf>>(dest_dir: P) -> Self {
        Self {
            dest_dir: dest_dir.into(),
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    /// Creates the destination directory and any missing parents.
    pub fn ensure_output_dir(&self) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }

        fs::create_dir_all(&self.dest_dir).map_err(|e| match e.kind() {
            io::ErrorKind::PermissionDenied => FilterError::Permission {
                path: self.dest_dir.display().to_string(),
            },
            _ => FilterError::OutputDirectory {
                path: self.dest_dir.display().to_string(),
                message: e.to_string(),
            },
        })?;

        debug!(dest = %self.dest_dir.display(), "output directory ready");
        Ok(())
    }

    /// Copies both files of a complete pair, `.ltlf` first.
    ///
    /// Returns the number of bytes written. A failure on the second file
    /// leaves the first one in place.
    pub fn copy_pair(&self, pair: &FilePair) -> Result<u64> {
        let mut total_bytes = 0u64;

        for source in pair.paths() {
            total_bytes += self.copy_into_dest(source)?;
        }

        Ok(total_bytes)
    }

    fn copy_into_dest(&self, source: &Path) -> Result<u64> {
        let file_name = source.file_name().ok_or_else(|| FilterError::Copy {
            path: source.display().to_string(),
            message: "source path has no file name".to_string(),
        })?;
        let dest = self.dest_dir.join(file_name);

        // Opening the destination for writing would truncate the source.
        if is_same_file(source, &dest) {
            return Err(FilterError::Copy {
                path: source.display().to_string(),
                message: "source and destination are the same file".to_string(),
            });
        }

        if self.dry_run {
            let metadata = fs::metadata(source).map_err(|e| copy_error(source, e))?;
            trace!(source = %source.display(), "dry run, not copying");
            return Ok(metadata.len());
        }

        if !source.is_file() {
            return Err(FilterError::Copy {
                path: source.display().to_string(),
                message: "source is not a regular file".to_string(),
            });
        }

        let bytes = self
            .copy_file_with_buffer(source, &dest)
            .map_err(|e| copy_error(source, e))?;

        trace!(source = %source.display(), dest = %dest.display(), bytes, "copied");
        Ok(bytes)
    }

    fn copy_file_with_buffer(&self, source: &Path, dest: &Path) -> io::Result<u64> {
        let source_file = fs::File::open(source)?;
        let dest_file = fs::File::create(dest)?;

        let mut reader = BufReader::with_capacity(BUFFER_SIZE, source_file);
        let mut writer = BufWriter::with_capacity(BUFFER_SIZE, dest_file);

        let mut total_bytes = 0u64;
        let mut buffer = vec![0u8; 8192]; // 8KB chunks

        loop {
            let bytes_read = reader.read(&mut buffer)?;

            if bytes_read == 0 {
                break; // End of file
            }

            writer.write_all(&buffer[..bytes_read])?;
            total_bytes += bytes_read as u64;
        }

        writer.flush()?;

        if let Ok(source_metadata) = fs::metadata(source) {
            if let Ok(modified_time) = source_metadata.modified() {
                let _ = filetime::set_file_mtime(
                    dest,
                    filetime::FileTime::from_system_time(modified_time),
                );
            }
        }

        Ok(total_bytes)
    }
}

/// True when both paths resolve to the same existing file or directory.
pub fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn copy_error(source: &Path, error: io::Error) -> FilterError {
    FilterError::Copy {
        path: source.display().to_string(),
        message: error.to_string(),
    }
}
