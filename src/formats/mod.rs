//! Format classification and per-format strategy dispatch
//!
//! `FormatVariant` is the single source of truth consumed by both the
//! extraction and write paths, so the two cannot diverge. One strategy
//! implementation exists per variant; adding a format means adding a variant
//! and a strategy, not a new dispatch mechanism.

mod mpeg;
mod riff;
mod tagged;

use serde::Serialize;
use std::path::Path;

use crate::error::ExtractResult;
use crate::models::{CoverArt, Metadata, WriteOutcome, WriteRequest};

/// Closed set of supported audio container/tag formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FormatVariant {
    #[serde(rename = "MP3")]
    Mp3,
    #[serde(rename = "WAV")]
    Wav,
    #[serde(rename = "FLAC")]
    Flac,
    #[serde(rename = "M4A")]
    M4a,
    #[serde(rename = "OGG")]
    Ogg,
    Unsupported,
}

/// Map a file extension (case-insensitive) to its format variant
///
/// Pure function, no I/O. Unknown extensions map to `Unsupported`; the path
/// filter restricts the extension set upstream, so that arm is not reached in
/// normal operation.
pub fn classify(extension: &str) -> FormatVariant {
    match extension.to_lowercase().as_str() {
        "mp3" => FormatVariant::Mp3,
        "wav" => FormatVariant::Wav,
        "flac" => FormatVariant::Flac,
        "m4a" => FormatVariant::M4a,
        "ogg" => FormatVariant::Ogg,
        _ => FormatVariant::Unsupported,
    }
}

/// Capability set implemented once per format variant
///
/// Failure policy: a per-field read failure degrades that field to absent; a
/// catastrophic read failure returns `ExtractError::Fatal` and the caller
/// degrades the whole record. Strategies never panic on malformed input.
pub trait FormatStrategy: Send + Sync {
    /// Extract the normalized tag and technical fields
    fn extract_metadata(&self, path: &Path) -> ExtractResult<Metadata>;

    /// Extract the duration in seconds, independent of tag presence
    fn extract_duration(&self, path: &Path) -> ExtractResult<Option<f64>>;

    /// Extract the embedded attached picture, if the container carries one
    fn extract_picture(&self, path: &Path) -> Option<CoverArt>;

    /// Apply present request fields to the file's tag container and persist
    fn write(&self, path: &Path, request: &WriteRequest) -> WriteOutcome;
}

/// Formats with no strategy of their own
struct UnsupportedStrategy;

impl FormatStrategy for UnsupportedStrategy {
    fn extract_metadata(&self, _path: &Path) -> ExtractResult<Metadata> {
        Ok(Metadata::default())
    }

    fn extract_duration(&self, _path: &Path) -> ExtractResult<Option<f64>> {
        Ok(None)
    }

    fn extract_picture(&self, _path: &Path) -> Option<CoverArt> {
        None
    }

    fn write(&self, _path: &Path, _request: &WriteRequest) -> WriteOutcome {
        WriteOutcome::Unsupported
    }
}

static MPEG: mpeg::MpegStrategy = mpeg::MpegStrategy;
static RIFF: riff::RiffStrategy = riff::RiffStrategy;
static FLAC: tagged::TaggedStrategy = tagged::TaggedStrategy::flac();
static M4A: tagged::TaggedStrategy = tagged::TaggedStrategy::m4a();
static OGG: tagged::TaggedStrategy = tagged::TaggedStrategy::ogg();
static UNSUPPORTED: UnsupportedStrategy = UnsupportedStrategy;

/// Select the strategy for a format variant
pub fn strategy_for(variant: FormatVariant) -> &'static dyn FormatStrategy {
    match variant {
        FormatVariant::Mp3 => &MPEG,
        FormatVariant::Wav => &RIFF,
        FormatVariant::Flac => &FLAC,
        FormatVariant::M4a => &M4A,
        FormatVariant::Ogg => &OGG,
        FormatVariant::Unsupported => &UNSUPPORTED,
    }
}
