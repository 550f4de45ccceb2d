//! Error handling
//!
//! Typed errors for store, codec and file transfer operations, with
//! descriptive messages and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in bibman operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite connectivity or statement failure
    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// No entry with this id
    #[error("Entry not found: {id}")]
    NotFound { id: i64 },

    /// Caller passed a value that cannot be used (non-numeric id, bad table name)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Import file does not carry the `.bib` extension
    #[error("Unsupported file type: '{path}'. Only .bib files can be imported.")]
    UnsupportedFileType { path: PathBuf },

    /// Failed to create a directory
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

    /// File not found (when expected to exist)
    #[error("File not found: '{path}'")]
    FileNotFound { path: PathBuf },

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
}

/// Which side of a file transfer an I/O error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    Read,
    Write,
}

impl StoreError {
    /// Create an error from an I/O error with path context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(error: io::Error, path: PathBuf, op: IoOp) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StoreError::PermissionDenied {
                path,
                source: error,
            },
            io::ErrorKind::NotFound => StoreError::FileNotFound { path },
            _ if is_disk_full_error(&error) => StoreError::DiskFull {
                path,
                source: error,
            },
            _ => match op {
                IoOp::Read => StoreError::ReadError {
                    path,
                    source: error,
                },
                IoOp::Write => StoreError::WriteError {
                    path,
                    source: error,
                },
            },
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StoreError::DiskFull { .. } => Some("Free up disk space and try again."),
            StoreError::PermissionDenied { .. } => {
                Some("Check file and directory permissions. You may need to run with different permissions or change ownership.")
            }
            StoreError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            StoreError::UnsupportedFileType { .. } => {
                Some("Rename the file with a .bib extension if it contains a BibTeX entry.")
            }
            StoreError::NotFound { .. } => Some("Run `bibman list` to see existing entry ids."),
            _ => None,
        }
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

/// Result type for bibman operations
pub type StoreResult<T> = Result<T, StoreError>;
