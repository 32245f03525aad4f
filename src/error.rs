use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Manifest not found: {path}")]
    ManifestNotFound { path: String },

    #[error("Failed to read manifest {path}: {message}")]
    Manifest { path: String, message: String },

    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord {
        line: u64,
        raw: String,
        reason: String,
    },

    #[error("Failed to copy {path}: {message}")]
    Copy { path: String, message: String },

    #[error("Cannot create output directory {path}: {message}")]
    OutputDirectory { path: String, message: String },

    #[error("Duplicate removal failed at {path}: {message}")]
    Dedupe { path: String, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Permission denied: {path}")]
    Permission { path: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for FilterError {
    fn user_message(&self) -> String {
        match self {
            FilterError::ManifestNotFound { path } => {
                format!("Manifest file not found: {}", path)
            }
            FilterError::Manifest { path, message } => {
                format!("Error reading CSV file {}: {}", path, message)
            }
            FilterError::MalformedRecord { line, raw, reason } => {
                if raw.is_empty() {
                    format!("Malformed record at line {}: {}", line, reason)
                } else {
                    format!("Invalid number format: {}", raw)
                }
            }
            FilterError::Copy { path, message } => {
                format!("Failed to copy {}: {}", path, message)
            }
            FilterError::OutputDirectory { path, message } => {
                format!("Cannot create output directory {}: {}", path, message)
            }
            FilterError::Dedupe { path, message } => {
                format!("Duplicate removal failed at {}: {}", path, message)
            }
            FilterError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            FilterError::Permission { path } => {
                format!("Permission denied accessing: {}", path)
            }
            FilterError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            FilterError::ManifestNotFound { .. } => Some(
                "Pass the manifest path with --manifest or set LTLF_FILTER_MANIFEST.".to_string()
            ),
            FilterError::Manifest { .. } => Some(
                "Check that the manifest is a UTF-8 CSV file with folder,number,status columns.".to_string()
            ),
            FilterError::OutputDirectory { .. } => Some(
                "Check that the parent of --dest exists and that you can write to it.".to_string()
            ),
            FilterError::Dedupe { .. } => Some(
                "The backup directory holds the destination as it was before duplicates were removed.".to_string()
            ),
            FilterError::Config { .. } => Some(
                "Run with --help to see the accepted options and their ranges.".to_string()
            ),
            FilterError::Permission { .. } => Some(
                "Ensure you have read access to the source directory and write access to the destination.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<csv::Error> for FilterError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|p| p.line()).unwrap_or(0);
        match error.kind() {
            csv::ErrorKind::Io(_) => FilterError::Manifest {
                path: "manifest".to_string(),
                message: error.to_string(),
            },
            _ => FilterError::MalformedRecord {
                line,
                raw: String::new(),
                reason: error.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_friendly_messages() {
        let error = FilterError::ManifestNotFound {
            path: "syft_1_ok.csv".to_string(),
        };
        assert!(error.user_message().contains("syft_1_ok.csv"));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_malformed_message_names_raw_value() {
        let error = FilterError::MalformedRecord {
            line: 4,
            raw: "abc".to_string(),
            reason: "not a number".to_string(),
        };
        assert_eq!(error.user_message(), "Invalid number format: abc");
        assert!(error.suggestion().is_none());
    }

    #[test]
    fn test_csv_io_error_becomes_manifest_error() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let error = FilterError::from(csv::Error::from(io));
        assert!(matches!(error, FilterError::Manifest { .. }));
        assert!(error.suggestion().is_some());
    }
}
