use crate::config::RecordConfig;
use crate::error::{FilterError, Result};
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::{debug, trace};

/// One data row of the manifest: `folder,number,status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub line: u64,
    pub folder: String,
    pub number: String,
    pub status: Option<String>,
}

impl ManifestEntry {
    pub fn matches_status(&self, wanted: &str) -> bool {
        self.status.as_deref().map(str::trim) == Some(wanted)
    }
}

/// A manifest row, or the reason it could not be read as one.
pub type ManifestRow = std::result::Result<ManifestEntry, FilterError>;

pub struct ManifestReader {
    skip_header: bool,
}

impl ManifestReader {
    pub fn new(config: &RecordConfig) -> Self {
        Self {
            skip_header: config.skip_header,
        }
    }

    pub fn with_skip_header(mut self, skip: bool) -> Self {
        self.skip_header = skip;
        self
    }

    /// Opens the manifest at `path` for streaming.
    ///
    /// A missing or unopenable file is fatal here; read errors surface later
    /// from the iterator.
    pub fn open(&self, path: &Path) -> Result<ManifestRecords<BufReader<File>>> {
        if !path.exists() {
            return Err(FilterError::ManifestNotFound {
                path: path.display().to_string(),
            });
        }

        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::PermissionDenied => FilterError::Permission {
                path: path.display().to_string(),
            },
            _ => FilterError::Manifest {
                path: path.display().to_string(),
                message: e.to_string(),
            },
        })?;

        debug!(manifest = %path.display(), skip_header = self.skip_header, "reading manifest");
        Ok(self.records(BufReader::new(file), path.display().to_string()))
    }

    /// Reads every row of the manifest at `path`.
    ///
    /// Failing to open or read the file is fatal. Rows that cannot be
    /// interpreted come back as `Err(MalformedRecord)` so the caller can
    /// report them and keep going.
    pub fn read_path(&self, path: &Path) -> Result<Vec<ManifestRow>> {
        self.open(path)?.collect()
    }

    pub fn read_from<R: Read>(&self, reader: R) -> Result<Vec<ManifestRow>> {
        self.records(reader, "manifest".to_string()).collect()
    }

    fn records<R: Read>(&self, reader: R, source: String) -> ManifestRecords<R> {
        let records = ReaderBuilder::new()
            .has_headers(self.skip_header)
            .flexible(true)
            .from_reader(reader)
            .into_records();

        ManifestRecords {
            records,
            source,
            index: 0,
        }
    }
}

/// Streams manifest rows in file order.
///
/// The outer `Result` is fatal (the manifest itself could not be read); the
/// inner [`ManifestRow`] carries per-record problems.
pub struct ManifestRecords<R> {
    records: StringRecordsIntoIter<R>,
    source: String,
    index: u64,
}

impl<R: Read> Iterator for ManifestRecords<R> {
    type Item = Result<ManifestRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.records.next()?;
        self.index += 1;

        match result {
            Ok(record) => {
                let line = record
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(self.index);
                Some(Ok(entry_from_record(&record, line)))
            }
            Err(e) if e.is_io_error() => Some(Err(FilterError::Manifest {
                path: self.source.clone(),
                message: e.to_string(),
            })),
            Err(e) => Some(Ok(Err(FilterError::from(e)))),
        }
    }
}

fn entry_from_record(record: &StringRecord, line: u64) -> ManifestRow {
    trace!(line, fields = record.len(), "manifest record");

    if record.len() < 2 {
        return Err(FilterError::MalformedRecord {
            line,
            raw: String::new(),
            reason: format!("expected at least 2 fields, found {}", record.len()),
        });
    }

    Ok(ManifestEntry {
        line,
        folder: record.get(0).unwrap_or_default().to_string(),
        number: record.get(1).unwrap_or_default().to_string(),
        status: record.get(2).map(|s| s.to_string()),
    })
}
