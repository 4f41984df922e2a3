//! audioscan - directory-tree audio metadata extraction and tag writing
//!
//! Walks a directory tree of audio files, classifies each file's container
//! format, extracts a normalized metadata record plus embedded cover art
//! through a format-dispatch pipeline, and can write a subset of those fields
//! back into formats with a writable tag container.
//!
//! Scans run on a bounded worker pool with independent timeouts for metadata
//! and duration extraction; per-file failures are contained and surfaced as
//! flags on the result record, never as batch aborts.

pub mod config;
pub mod error;
pub mod formats;
pub mod human;
pub mod models;
pub mod services;

pub use crate::config::ScanOptions;
pub use crate::error::{ExtractError, ScanError};
pub use crate::formats::{classify, FormatVariant};
pub use crate::models::{
    CoverArt, Metadata, ScanResult, ScanSummary, WriteOutcome, WriteRequest, WriteSummary,
};
pub use crate::services::orchestrator::ScanOrchestrator;

use std::path::Path;

/// Scan a directory tree with the given options
///
/// Results are ordered by discovery order, deterministic for a fixed
/// directory snapshot.
pub async fn scan_directory(
    root: &Path,
    options: &ScanOptions,
) -> Result<Vec<ScanResult>, ScanError> {
    ScanOrchestrator::new(options.clone()).scan(root).await
}

/// Apply a write request to every candidate file under the root
pub async fn write_directory(
    root: &Path,
    request: &WriteRequest,
    options: &ScanOptions,
) -> Result<(Vec<(std::path::PathBuf, WriteOutcome)>, WriteSummary), ScanError> {
    services::writer::write_directory(root, request, options).await
}
