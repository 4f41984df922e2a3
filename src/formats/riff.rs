//! WAV strategy
//!
//! WAV has no writable tag container in this design. Duration, channels,
//! sample rate, and bit depth come from the stream header; the title falls
//! back to the filename stem. Every write request reports unsupported.

use std::path::Path;

use crate::error::ExtractResult;
use crate::models::{CoverArt, Metadata, WriteOutcome, WriteRequest};

use super::tagged::read_stream_props;

pub(crate) struct RiffStrategy;

fn filename_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().to_string())
}

impl super::FormatStrategy for RiffStrategy {
    fn extract_metadata(&self, path: &Path) -> ExtractResult<Metadata> {
        let props = read_stream_props(path)?;
        Ok(Metadata {
            title: filename_stem(path),
            duration: Some(props.duration),
            sample_rate: props.sample_rate,
            channels: props.channels,
            bits_per_sample: props.bits_per_sample,
            bitrate: props.bitrate,
            ..Metadata::default()
        })
    }

    fn extract_duration(&self, path: &Path) -> ExtractResult<Option<f64>> {
        read_stream_props(path).map(|props| Some(props.duration))
    }

    fn extract_picture(&self, _path: &Path) -> Option<CoverArt> {
        None
    }

    fn write(&self, _path: &Path, _request: &WriteRequest) -> WriteOutcome {
        WriteOutcome::Unsupported
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::FormatStrategy;

    fn wav_fixture(dir: &Path, name: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..4_410 {
            writer.write_sample(0i16).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
        path
    }

    #[test]
    fn header_fields_and_stem_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = wav_fixture(dir.path(), "b.wav");

        let metadata = RiffStrategy.extract_metadata(&path).unwrap();
        assert_eq!(metadata.title.as_deref(), Some("b"));
        assert_eq!(metadata.sample_rate, Some(44_100));
        assert_eq!(metadata.channels, Some(2));
        assert_eq!(metadata.bits_per_sample, Some(16));
        let duration = metadata.duration.unwrap();
        assert!(duration > 0.05 && duration < 0.2, "duration = {duration}");
    }

    #[test]
    fn every_write_reports_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = wav_fixture(dir.path(), "untouchable.wav");

        let request = WriteRequest {
            title: Some("X".into()),
            year: Some("1999".into()),
            ..WriteRequest::default()
        };
        assert_eq!(RiffStrategy.write(&path, &request), WriteOutcome::Unsupported);
        assert_eq!(
            RiffStrategy.write(&path, &WriteRequest::default()),
            WriteOutcome::Unsupported
        );
    }

    #[test]
    fn corrupt_header_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, b"RIFFxxxx").unwrap();
        assert!(RiffStrategy.extract_metadata(&path).is_err());
    }
}
