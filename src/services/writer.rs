//! Metadata write-back
//!
//! Per-file dispatch through the same format classifier the extraction path
//! uses. Formats without a writable tag container report unsupported rather
//! than failing; persistence errors are reported per file and never abort the
//! batch. An empty write payload is a no-op returning zero counts.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::ScanOptions;
use crate::error::ScanError;
use crate::formats::{classify, strategy_for};
use crate::models::{WriteOutcome, WriteRequest, WriteSummary};
use crate::services::file_scanner::FileScanner;

/// Apply the request's present fields to one file's tag container
pub fn write_file(path: &Path, request: &WriteRequest) -> WriteOutcome {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let format = classify(&extension);
    let outcome = strategy_for(format).write(path, request);
    match &outcome {
        WriteOutcome::Updated => info!(file = %path.display(), "Tags updated"),
        WriteOutcome::Unsupported => {
            info!(file = %path.display(), format = ?format, "Format has no writable tag container")
        }
        WriteOutcome::Failed(reason) => {
            warn!(file = %path.display(), reason = %reason, "Tag write failed")
        }
    }
    outcome
}

/// Apply the request to every candidate file under the root
///
/// Returns per-file outcomes in discovery order plus aggregate counts.
pub async fn write_directory(
    root: &Path,
    request: &WriteRequest,
    options: &ScanOptions,
) -> Result<(Vec<(PathBuf, WriteOutcome)>, WriteSummary), ScanError> {
    if request.is_empty() {
        info!("Empty write payload, nothing to do");
        return Ok((Vec::new(), WriteSummary::default()));
    }

    let scanner = FileScanner::new(options.clone());
    let candidates = scanner.scan(root)?;

    let mut outcomes = Vec::with_capacity(candidates.len());
    let mut summary = WriteSummary::default();
    for candidate in candidates {
        let path = candidate.path.clone();
        let req = request.clone();
        let outcome = tokio::task::spawn_blocking(move || write_file(&path, &req))
            .await
            .unwrap_or_else(|e| WriteOutcome::Failed(e.to_string()));
        summary.record(&outcome);
        outcomes.push((candidate.path, outcome));
    }

    info!(
        updated = summary.updated,
        unsupported = summary.unsupported,
        failed = summary.failed,
        "Write batch complete"
    );
    Ok((outcomes, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use id3::TagLike;

    #[tokio::test]
    async fn empty_payload_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"x").unwrap();

        let (outcomes, summary) =
            write_directory(dir.path(), &WriteRequest::default(), &ScanOptions::default())
                .await
                .unwrap();
        assert!(outcomes.is_empty());
        assert_eq!(summary, WriteSummary::default());
    }

    #[tokio::test]
    async fn mixed_batch_counts_each_outcome() {
        let dir = tempfile::tempdir().unwrap();

        // Writable: empty MP3 grows a fresh tag
        std::fs::File::create(dir.path().join("a.mp3")).unwrap();
        // Unsupported: WAV has no writable container
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(dir.path().join("b.wav"), spec).unwrap();
        writer.write_sample(0i16).unwrap();
        writer.finalize().unwrap();
        // Failed: corrupt FLAC cannot be parsed for writing
        std::fs::write(dir.path().join("c.flac"), b"garbage").unwrap();

        let request = WriteRequest {
            title: Some("X".into()),
            ..WriteRequest::default()
        };
        let (outcomes, summary) = write_directory(dir.path(), &request, &ScanOptions::default())
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.unsupported, 1);
        assert_eq!(summary.failed, 1);

        // Round-trip through the extraction path
        let tag = id3::Tag::read_from_path(dir.path().join("a.mp3")).unwrap();
        assert_eq!(tag.title(), Some("X"));
    }
}
