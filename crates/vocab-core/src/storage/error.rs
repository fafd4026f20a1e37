//! Storage error handling
//!
//! Every failure the core can produce is a [`StorageError`]. Callers that
//! only care about the category (for exit codes, retries or tests) match on
//! [`StorageError::kind`] instead of the individual variants.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error categories surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong shape of an input (blank key, unknown mode, ...)
    InvalidArgument,
    /// Missing key, value, database or file
    NotFound,
    /// An add would duplicate a value inside one record
    DuplicateValue,
    /// Attach collision on a database name
    AlreadyExists,
    /// Unlink without a matching edge
    NoSuchEdge,
    /// Malformed backing file
    DecodeError,
    /// Unsupported parameters
    NotImplemented,
    /// Filesystem failure other than a missing file
    Io,
}

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Word '{key}' not found in database '{database}'")]
    KeyNotFound { database: String, key: String },

    #[error("Value '{value}' not found under '{key}' in database '{database}'")]
    ValueNotFound {
        database: String,
        key: String,
        value: String,
    },

    #[error("Database '{0}' is not attached")]
    DatabaseNotFound(String),

    /// File not found (when expected to exist)
    #[error("File not found: '{path}'")]
    FileNotFound { path: PathBuf },

    #[error("'{value}' is already stored under '{key}' in database '{database}'")]
    DuplicateValue {
        database: String,
        key: String,
        value: String,
    },

    #[error("Database '{0}' is already attached")]
    AlreadyExists(String),

    #[error("No link from '{from}' to '{to}'")]
    NoSuchEdge { from: String, to: String },

    /// Backing file could not be parsed
    #[error("Malformed database file '{path}': {details}")]
    Decode { path: PathBuf, details: String },

    /// Database could not be turned into bytes
    #[error("Failed to encode database '{name}': {details}")]
    Encode { name: String, details: String },

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// A batch update stopped part-way through
    #[error(
        "Update of '{key}' in '{database}' stopped at '{failed}' after applying {applied:?}: {source}"
    )]
    PartialUpdate {
        database: String,
        key: String,
        applied: Vec<String>,
        failed: String,
        #[source]
        source: Box<StorageError>,
    },

    /// One or more databases failed to flush during a registry dump
    #[error("Failed to flush {} database(s): {}", .failures.len(), flush_summary(.failures))]
    Flush { failures: Vec<FlushFailure> },

    /// Failed to create data directory
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error(
        "Disk full or quota exceeded while writing to '{path}'. Free up disk space and try again."
    )]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read file
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write file
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Atomic write failed during rename
    #[error("Atomic write failed: could not rename '{from}' to '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A database that could not be written during [`crate::DatabasesView::dump`]
#[derive(Debug)]
pub struct FlushFailure {
    pub database: String,
    pub error: StorageError,
}

fn flush_summary(failures: &[FlushFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.database, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

impl StorageError {
    /// Create an error from a failed write with path context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match classify(error, path) {
            Ok(err) => err,
            Err((error, path)) => StorageError::WriteError {
                path,
                source: error,
            },
        }
    }

    /// Same as [`StorageError::from_io`] but for failed reads
    pub fn from_read_io(error: io::Error, path: PathBuf) -> Self {
        match classify(error, path) {
            Ok(err) => err,
            Err((error, path)) => StorageError::ReadError {
                path,
                source: error,
            },
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            StorageError::KeyNotFound { .. }
            | StorageError::ValueNotFound { .. }
            | StorageError::DatabaseNotFound(_)
            | StorageError::FileNotFound { .. } => ErrorKind::NotFound,
            StorageError::DuplicateValue { .. } => ErrorKind::DuplicateValue,
            StorageError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            StorageError::NoSuchEdge { .. } => ErrorKind::NoSuchEdge,
            StorageError::Decode { .. } => ErrorKind::DecodeError,
            StorageError::NotImplemented(_) => ErrorKind::NotImplemented,
            StorageError::PartialUpdate { source, .. } => source.kind(),
            StorageError::Flush { failures } => failures
                .first()
                .map(|f| f.error.kind())
                .unwrap_or(ErrorKind::Io),
            StorageError::Encode { .. }
            | StorageError::CreateDirectory { .. }
            | StorageError::PermissionDenied { .. }
            | StorageError::DiskFull { .. }
            | StorageError::ReadError { .. }
            | StorageError::WriteError { .. }
            | StorageError::AtomicWriteFailed { .. } => ErrorKind::Io,
        }
    }

    /// Shorthand for `self.kind() == ErrorKind::NotFound`
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Map the io error kinds that get their own variant; hand the rest back
fn classify(error: io::Error, path: PathBuf) -> Result<StorageError, (io::Error, PathBuf)> {
    match error.kind() {
        io::ErrorKind::PermissionDenied => Ok(StorageError::PermissionDenied {
            path,
            source: error,
        }),
        io::ErrorKind::NotFound => Ok(StorageError::FileNotFound { path }),
        // StorageFull is not stable on every toolchain, so also check the message
        _ if is_disk_full_error(&error) => Ok(StorageError::DiskFull {
            path,
            source: error,
        }),
        _ => Err((error, path)),
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_classification() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = StorageError::from_io(io_err, PathBuf::from("/test/path"));

        assert!(matches!(err, StorageError::PermissionDenied { .. }));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_not_found_classification() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = StorageError::from_read_io(io_err, PathBuf::from("/missing/file"));

        assert!(matches!(err, StorageError::FileNotFound { .. }));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_disk_full_detection() {
        let io_err = io::Error::new(io::ErrorKind::Other, "No space left on device");
        let err = StorageError::from_io(io_err, PathBuf::from("/full/disk"));

        assert!(matches!(err, StorageError::DiskFull { .. }));
    }

    #[test]
    fn test_unclassified_read_and_write() {
        let read = StorageError::from_read_io(
            io::Error::new(io::ErrorKind::Other, "boom"),
            PathBuf::from("/a"),
        );
        let write = StorageError::from_io(
            io::Error::new(io::ErrorKind::Other, "boom"),
            PathBuf::from("/a"),
        );

        assert!(matches!(read, StorageError::ReadError { .. }));
        assert!(matches!(write, StorageError::WriteError { .. }));
    }

    #[test]
    fn test_partial_update_keeps_source_kind() {
        let err = StorageError::PartialUpdate {
            database: "es".to_string(),
            key: "cat".to_string(),
            applied: vec!["gato".to_string()],
            failed: "gata".to_string(),
            source: Box::new(StorageError::DuplicateValue {
                database: "es".to_string(),
                key: "cat".to_string(),
                value: "gata".to_string(),
            }),
        };

        assert_eq!(err.kind(), ErrorKind::DuplicateValue);
        let msg = err.to_string();
        assert!(msg.contains("gato"));
        assert!(msg.contains("gata"));
    }

    #[test]
    fn test_flush_display_lists_every_database() {
        let err = StorageError::Flush {
            failures: vec![
                FlushFailure {
                    database: "fr".to_string(),
                    error: StorageError::InvalidArgument("x".to_string()),
                },
                FlushFailure {
                    database: "de".to_string(),
                    error: StorageError::InvalidArgument("y".to_string()),
                },
            ],
        };

        let msg = err.to_string();
        assert!(msg.contains("2 database(s)"));
        assert!(msg.contains("fr"));
        assert!(msg.contains("de"));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_error_display() {
        let err = StorageError::PermissionDenied {
            path: PathBuf::from("/test/file"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };

        let msg = err.to_string();
        assert!(msg.contains("Permission denied"));
        assert!(msg.contains("/test/file"));
    }
}
