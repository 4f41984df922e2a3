//! Error types for audioscan
//!
//! Per-file errors are contained at the unit boundary and surfaced as data on
//! the `ScanResult`; only root-path validation may abort a whole operation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a scan before any work is dispatched
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified root path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Root path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-unit extraction errors, never propagated across unit boundaries
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Container unreadable or corrupt; the whole Metadata degrades to empty
    #[error("Unreadable container: {0}")]
    Fatal(String),

    /// Operation exceeded its configured deadline
    #[error("Extraction timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Background extraction task aborted before producing a value
    #[error("Extraction task failed: {0}")]
    TaskFailed(String),
}

/// Result type for extraction operations
pub type ExtractResult<T> = Result<T, ExtractError>;
