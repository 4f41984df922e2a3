//! Data model for scan and write operations
//!
//! All records are immutable once produced. Absence of a metadata field is a
//! valid, common state, not an error.

use serde::Serialize;
use std::path::PathBuf;

use crate::formats::FormatVariant;

/// A file discovered by the path filter, awaiting dispatch
#[derive(Debug, Clone)]
pub struct CandidateFile {
    /// Absolute path
    pub path: PathBuf,
    /// Lowercase extension (no leading dot)
    pub extension: String,
    /// File size in bytes
    pub size: u64,
}

/// Normalized metadata record
///
/// Attributable to exactly one file and one format variant. Technical fields
/// (sample rate, channels, bit depth, bitrate) are format-dependent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<u32>,
    pub genre: Option<String>,
    pub comment: Option<String>,
    /// Duration in seconds
    pub duration: Option<f64>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u8>,
    pub bits_per_sample: Option<u8>,
    /// Bitrate in kbps
    pub bitrate: Option<u32>,
}

impl Metadata {
    /// True when no tag field carries a value (technical fields ignored)
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.year.is_none()
            && self.genre.is_none()
            && self.comment.is_none()
    }
}

/// Binary cover art payload with its MIME type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverArt {
    /// Image bytes, base64-encoded on the wire
    #[serde(serialize_with = "serialize_base64")]
    pub data: Vec<u8>,
    pub mime_type: String,
}

fn serialize_base64<S>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use base64::prelude::*;
    serializer.serialize_str(&BASE64_STANDARD.encode(data))
}

impl CoverArt {
    /// Build from raw bytes, sniffing the MIME type from the payload
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let mime_type = infer::get(&data)
            .map(|t| t.mime_type().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        Self { data, mime_type }
    }
}

/// Per-file scan outcome
///
/// The aggregate scan output is ordered by discovery order, regardless of
/// completion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    pub format: FormatVariant,
    pub metadata: Metadata,
    /// Duration in seconds, extracted independently of the tag fields
    pub duration: Option<f64>,
    pub cover_art: Option<CoverArt>,
    /// Metadata extraction failed catastrophically or timed out
    pub metadata_error: bool,
    /// Duration extraction failed or timed out
    pub duration_error: bool,
}

impl ScanResult {
    /// True when any extraction stage failed for this file
    pub fn is_degraded(&self) -> bool {
        self.metadata_error || self.duration_error
    }
}

/// Aggregate scan statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanSummary {
    pub total_files: usize,
    pub total_size: u64,
    /// Results with at least one failed extraction stage
    pub degraded_files: usize,
    /// File counts by extension
    pub by_format: std::collections::HashMap<String, usize>,
}

impl ScanSummary {
    pub fn from_results(results: &[ScanResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.total_files += 1;
            summary.total_size += result.size;
            if result.is_degraded() {
                summary.degraded_files += 1;
            }
            if let Some(ext) = result.path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                *summary.by_format.entry(ext).or_insert(0) += 1;
            }
        }
        summary
    }
}

/// Tag fields to apply in a write operation
///
/// Fields left as `None` are untouched in the underlying file. The year is
/// carried as a string and coerced to an integer at write time.
#[derive(Debug, Clone, Default)]
pub struct WriteRequest {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<String>,
    pub genre: Option<String>,
    pub comment: Option<String>,
}

impl WriteRequest {
    /// True when no field carries a value; an empty request is a no-op
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.year.is_none()
            && self.genre.is_none()
            && self.comment.is_none()
    }
}

/// Per-file write outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "reason")]
pub enum WriteOutcome {
    /// Tag fields applied and persisted
    Updated,
    /// Format has no writable tag container
    Unsupported,
    /// Persistence failed
    Failed(String),
}

/// Aggregate write counts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WriteSummary {
    pub updated: usize,
    pub unsupported: usize,
    pub failed: usize,
}

impl WriteSummary {
    pub fn record(&mut self, outcome: &WriteOutcome) {
        match outcome {
            WriteOutcome::Updated => self.updated += 1,
            WriteOutcome::Unsupported => self.unsupported += 1,
            WriteOutcome::Failed(_) => self.failed += 1,
        }
    }
}
