//! End-to-end write behavior through the public API

use std::path::Path;

use audioscan::{scan_directory, write_directory, ScanOptions, WriteOutcome, WriteRequest};

fn write_wav(path: &Path) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    writer.write_sample(0i16).unwrap();
    writer.finalize().unwrap();
}

#[tokio::test]
async fn wav_writes_are_unsupported_never_failed() {
    let dir = tempfile::tempdir().unwrap();
    write_wav(&dir.path().join("one.wav"));
    write_wav(&dir.path().join("two.wav"));

    let request = WriteRequest {
        title: Some("X".into()),
        year: Some("2001".into()),
        ..WriteRequest::default()
    };
    let (outcomes, summary) = write_directory(dir.path(), &request, &ScanOptions::default())
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 2);
    for (_, outcome) in &outcomes {
        assert_eq!(*outcome, WriteOutcome::Unsupported);
    }
    assert_eq!(summary.unsupported, 2);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn write_then_rescan_round_trips_title() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("song.mp3");
    std::fs::File::create(&path).unwrap();
    {
        use id3::TagLike;
        let mut tag = id3::Tag::new();
        tag.set_title("Before");
        tag.set_artist("Same Artist");
        tag.write_to_path(&path, id3::Version::Id3v24).unwrap();
    }

    let request = WriteRequest {
        title: Some("X".into()),
        ..WriteRequest::default()
    };
    let (_, summary) = write_directory(dir.path(), &request, &ScanOptions::default())
        .await
        .unwrap();
    assert_eq!(summary.updated, 1);

    let mut options = ScanOptions::default();
    options.extract_cover_art = false;
    let results = scan_directory(dir.path(), &options).await.unwrap();
    assert_eq!(results[0].metadata.title.as_deref(), Some("X"));
    // Untouched fields keep their previous values
    assert_eq!(results[0].metadata.artist.as_deref(), Some("Same Artist"));
}
