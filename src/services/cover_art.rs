//! Cover art resolution
//!
//! Ordered fallback chain, short-circuiting on first success:
//! 1. embedded picture via the format strategy,
//! 2. sidecar image discovery near the audio file,
//! 3. `ffmpeg` demux of an attached image stream into a temp file,
//! 4. `exiftool` binary dump of well-known cover tags into a temp file.
//!
//! External tools are best-effort: a missing binary, non-zero exit, or empty
//! output all mean "no cover art found". Temp files are uniquely named and
//! removed on every exit path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::ScanOptions;
use crate::formats::{strategy_for, FormatVariant};
use crate::models::CoverArt;

/// Canonical sidecar base names, tried in order
const SIDECAR_NAMES: [&str; 4] = ["cover", "folder", "front", "album"];
const SIDECAR_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Alternative ffmpeg stream-selection argument sets
const FFMPEG_STRATEGIES: [&[&str]; 2] = [
    &["-an", "-codec:v", "copy", "-f", "image2"],
    &["-map", "0:v:0", "-frames:v", "1", "-f", "image2"],
];

/// Cover tag names requested from exiftool, tried in order
const EXIFTOOL_TAGS: [&str; 3] = ["Picture", "CoverArt", "APIC"];

/// Resolve cover art for one audio file
pub async fn resolve(path: &Path, format: FormatVariant, options: &ScanOptions) -> Option<CoverArt> {
    // Stage 1: embedded picture
    let embedded_path = path.to_path_buf();
    let embedded = tokio::task::spawn_blocking(move || {
        strategy_for(format).extract_picture(&embedded_path)
    })
    .await
    .ok()
    .flatten();
    if let Some(art) = embedded {
        debug!(file = %path.display(), "Cover art: embedded picture");
        return Some(art);
    }

    // Stage 2: sidecar image
    if let Some(art) = sidecar_cover(path) {
        debug!(file = %path.display(), "Cover art: sidecar file");
        return Some(art);
    }

    // Stage 3: ffmpeg demux
    if let Some(art) = ffmpeg_cover(path, options).await {
        debug!(file = %path.display(), "Cover art: ffmpeg demux");
        return Some(art);
    }

    // Stage 4: exiftool tag dump
    if let Some(art) = exiftool_cover(path, options).await {
        debug!(file = %path.display(), "Cover art: exiftool tag");
        return Some(art);
    }

    None
}

/// Directories searched for sidecar images, in order
fn sidecar_dirs(path: &Path) -> Vec<PathBuf> {
    let Some(parent) = path.parent() else {
        return Vec::new();
    };
    let mut dirs = vec![
        parent.to_path_buf(),
        parent.join("covers"),
        parent.join("artwork"),
    ];
    if let Some(grandparent) = parent.parent() {
        dirs.push(grandparent.to_path_buf());
    }
    dirs
}

/// Look for a canonical cover image near the audio file (case-insensitive)
fn sidecar_cover(path: &Path) -> Option<CoverArt> {
    let mut names: Vec<String> = SIDECAR_NAMES.iter().map(|n| n.to_string()).collect();
    if let Some(dir_name) = path.parent().and_then(|p| p.file_name()) {
        names.push(dir_name.to_string_lossy().to_lowercase());
    }

    for dir in sidecar_dirs(path) {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        // Lowercased file name -> actual path, for case-insensitive lookup
        let by_name: HashMap<String, PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| (e.file_name().to_string_lossy().to_lowercase(), e.path()))
            .collect();

        for name in &names {
            for ext in SIDECAR_EXTENSIONS {
                let Some(candidate) = by_name.get(&format!("{name}.{ext}")) else {
                    continue;
                };
                match std::fs::read(candidate) {
                    Ok(data) if !data.is_empty() => {
                        debug!(sidecar = %candidate.display(), "Found sidecar cover");
                        return Some(CoverArt::from_bytes(data));
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(sidecar = %candidate.display(), error = %e, "Cannot read sidecar cover");
                    }
                }
            }
        }
    }
    None
}

/// Demux an attached image stream with ffmpeg, trying each stream-selection
/// strategy until one produces a non-empty output file
async fn ffmpeg_cover(path: &Path, options: &ScanOptions) -> Option<CoverArt> {
    for args in FFMPEG_STRATEGIES {
        // Dropped on every exit path, deleting the file
        let tmp = tempfile::Builder::new()
            .prefix("audioscan-art-")
            .suffix(".jpg")
            .tempfile()
            .ok()?;

        let mut cmd = Command::new("ffmpeg");
        cmd.arg("-y")
            .arg("-v")
            .arg("quiet")
            .arg("-i")
            .arg(path)
            .args(args)
            .arg(tmp.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        match run_tool(cmd, "ffmpeg", options).await {
            ToolRun::Success => {
                if let Some(art) = read_nonempty(tmp.path()) {
                    return Some(art);
                }
            }
            ToolRun::Failed => continue,
            ToolRun::Unavailable => return None,
        }
    }
    None
}

/// Dump well-known binary cover tags with exiftool, stdout captured into a
/// temp file inspected the same way as the ffmpeg stage
async fn exiftool_cover(path: &Path, options: &ScanOptions) -> Option<CoverArt> {
    for tag in EXIFTOOL_TAGS {
        let tmp = tempfile::Builder::new()
            .prefix("audioscan-art-")
            .suffix(".bin")
            .tempfile()
            .ok()?;
        let stdout = tmp.reopen().ok()?;

        let mut cmd = Command::new("exiftool");
        cmd.arg("-b")
            .arg(format!("-{tag}"))
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::null())
            .kill_on_drop(true);

        match run_tool(cmd, "exiftool", options).await {
            ToolRun::Success => {
                if let Some(art) = read_nonempty(tmp.path()) {
                    return Some(art);
                }
            }
            ToolRun::Failed => continue,
            ToolRun::Unavailable => return None,
        }
    }
    None
}

enum ToolRun {
    Success,
    Failed,
    /// Tool not installed; skip the whole stage
    Unavailable,
}

async fn run_tool(mut cmd: Command, tool: &str, options: &ScanOptions) -> ToolRun {
    match tokio::time::timeout(options.tool_timeout(), cmd.status()).await {
        Ok(Ok(status)) if status.success() => ToolRun::Success,
        Ok(Ok(status)) => {
            debug!(tool, code = ?status.code(), "Tool exited without cover art");
            ToolRun::Failed
        }
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(tool, "Tool not installed, skipping stage");
            ToolRun::Unavailable
        }
        Ok(Err(e)) => {
            warn!(tool, error = %e, "Tool invocation failed");
            ToolRun::Failed
        }
        Err(_) => {
            warn!(tool, timeout = ?options.tool_timeout(), "Tool timed out");
            ToolRun::Failed
        }
    }
}

fn read_nonempty(path: &Path) -> Option<CoverArt> {
    let data = std::fs::read(path).ok()?;
    if data.is_empty() {
        None
    } else {
        Some(CoverArt::from_bytes(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    // Minimal JFIF header so MIME sniffing resolves to image/jpeg
    const JPEG_MAGIC: [u8; 11] = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];

    #[test]
    fn sidecar_found_in_own_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cover.jpg"), JPEG_MAGIC).unwrap();
        fs::write(dir.path().join("track.mp3"), b"x").unwrap();

        let art = sidecar_cover(&dir.path().join("track.mp3")).unwrap();
        assert_eq!(art.mime_type, "image/jpeg");
    }

    #[test]
    fn sidecar_lookup_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Folder.JPG"), JPEG_MAGIC).unwrap();
        fs::write(dir.path().join("track.mp3"), b"x").unwrap();

        assert!(sidecar_cover(&dir.path().join("track.mp3")).is_some());
    }

    #[test]
    fn sidecar_found_in_artwork_subdirectory_and_parent() {
        let root = tempfile::tempdir().unwrap();
        let album = root.path().join("album");
        fs::create_dir_all(album.join("covers")).unwrap();
        fs::write(album.join("covers/front.png"), [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]).unwrap();
        fs::write(album.join("track.flac"), b"x").unwrap();

        let art = sidecar_cover(&album.join("track.flac")).unwrap();
        assert_eq!(art.mime_type, "image/png");

        // Parent directory is searched when nothing closer matches
        fs::remove_file(album.join("covers/front.png")).unwrap();
        fs::write(root.path().join("cover.jpg"), JPEG_MAGIC).unwrap();
        assert!(sidecar_cover(&album.join("track.flac")).is_some());
    }

    #[test]
    fn directory_named_sidecar_matches() {
        let root = tempfile::tempdir().unwrap();
        let album = root.path().join("Greatest Hits");
        fs::create_dir_all(&album).unwrap();
        fs::write(album.join("greatest hits.jpg"), JPEG_MAGIC).unwrap();
        fs::write(album.join("track.ogg"), b"x").unwrap();

        assert!(sidecar_cover(&album.join("track.ogg")).is_some());
    }

    #[test]
    fn empty_sidecar_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cover.jpg"), b"").unwrap();
        fs::write(dir.path().join("track.mp3"), b"x").unwrap();

        assert!(sidecar_cover(&dir.path().join("track.mp3")).is_none());
    }

    #[tokio::test]
    async fn embedded_picture_precedes_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        // Sidecar jpeg that would match at stage 2
        fs::write(dir.path().join("cover.jpg"), JPEG_MAGIC).unwrap();

        // MP3 with an embedded PNG front cover
        let path = dir.path().join("track.mp3");
        fs::File::create(&path).unwrap();
        let mut tag = id3::Tag::new();
        use id3::TagLike;
        tag.add_frame(id3::frame::Picture {
            mime_type: "image/png".to_string(),
            picture_type: id3::frame::PictureType::CoverFront,
            description: String::new(),
            data: vec![0x89, b'P', b'N', b'G'],
        });
        tag.write_to_path(&path, id3::Version::Id3v24).unwrap();

        let options = ScanOptions::default();
        let art = resolve(&path, FormatVariant::Mp3, &options).await.unwrap();
        assert_eq!(art.mime_type, "image/png");
    }

    #[tokio::test]
    async fn absence_after_all_stages_is_normal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.wav");
        fs::write(&path, b"RIFF").unwrap();

        let mut options = ScanOptions::default();
        options.tool_timeout_secs = 1;
        let art = resolve(&path, FormatVariant::Wav, &options).await;
        assert!(art.is_none());
    }
}
