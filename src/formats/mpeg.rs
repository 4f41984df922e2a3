//! MP3 strategy
//!
//! Duration and bitrate come from MPEG frame-header scanning and are
//! independent of tag presence. Tag fields come from the embedded ID3
//! container, read and written with the `id3` crate.

use id3::{Tag, TagLike, Version};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{ExtractError, ExtractResult};
use crate::models::{CoverArt, Metadata, WriteOutcome, WriteRequest};

use super::tagged::read_stream_props;

pub(crate) struct MpegStrategy;

/// Read the ID3 tag, treating an absent tag as a valid empty state
fn read_tag(path: &Path) -> ExtractResult<Option<Tag>> {
    match Tag::read_from_path(path) {
        Ok(tag) => Ok(Some(tag)),
        Err(e) if matches!(e.kind, id3::ErrorKind::NoTag) => Ok(None),
        Err(e) => Err(ExtractError::Fatal(e.to_string())),
    }
}

impl super::FormatStrategy for MpegStrategy {
    fn extract_metadata(&self, path: &Path) -> ExtractResult<Metadata> {
        let tag = read_tag(path)?;

        let mut metadata = Metadata::default();
        if let Some(tag) = &tag {
            metadata.title = tag.title().map(|s| s.to_string());
            metadata.artist = tag.artist().map(|s| s.to_string());
            metadata.album = tag.album().map(|s| s.to_string());
            metadata.year = tag.year().and_then(|y| u32::try_from(y).ok());
            metadata.genre = tag.genre_parsed().map(|g| g.into_owned());
            metadata.comment = tag.comments().next().map(|c| c.text.clone());
        } else {
            debug!(file = %path.display(), "No ID3 tag found");
        }

        // Frame-header properties; a failed read degrades only these fields
        match read_stream_props(path) {
            Ok(props) => {
                metadata.duration = Some(props.duration);
                metadata.sample_rate = props.sample_rate;
                metadata.channels = props.channels;
                metadata.bitrate = props.bitrate;
            }
            Err(e) if tag.is_none() => {
                // Neither tag nor frame headers readable: the container is unusable
                return Err(ExtractError::Fatal(e.to_string()));
            }
            Err(e) => {
                debug!(file = %path.display(), error = %e, "Frame header scan failed");
            }
        }

        Ok(metadata)
    }

    fn extract_duration(&self, path: &Path) -> ExtractResult<Option<f64>> {
        read_stream_props(path).map(|props| Some(props.duration))
    }

    fn extract_picture(&self, path: &Path) -> Option<CoverArt> {
        let tag = read_tag(path).ok()??;
        let picture = tag
            .pictures()
            .find(|p| p.picture_type == id3::frame::PictureType::CoverFront)
            .or_else(|| tag.pictures().next())?;
        if picture.data.is_empty() {
            return None;
        }
        if picture.mime_type.is_empty() {
            Some(CoverArt::from_bytes(picture.data.clone()))
        } else {
            Some(CoverArt {
                data: picture.data.clone(),
                mime_type: picture.mime_type.clone(),
            })
        }
    }

    fn write(&self, path: &Path, request: &WriteRequest) -> WriteOutcome {
        if !path.exists() {
            return WriteOutcome::Failed(format!("File not found: {}", path.display()));
        }
        // An unreadable existing tag is replaced rather than failing the write
        let mut tag = match read_tag(path) {
            Ok(Some(tag)) => tag,
            Ok(None) => Tag::new(),
            Err(e) => {
                debug!(file = %path.display(), error = %e, "Existing tag unreadable, starting fresh");
                Tag::new()
            }
        };

        if let Some(title) = &request.title {
            tag.set_title(title.clone());
        }
        if let Some(artist) = &request.artist {
            tag.set_artist(artist.clone());
        }
        if let Some(album) = &request.album {
            tag.set_album(album.clone());
        }
        if let Some(genre) = &request.genre {
            tag.set_genre(genre.clone());
        }
        if let Some(comment) = &request.comment {
            tag.remove("COMM");
            tag.add_frame(id3::frame::Comment {
                lang: "eng".to_string(),
                description: String::new(),
                text: comment.clone(),
            });
        }
        if let Some(year) = &request.year {
            match year.parse::<i32>() {
                Ok(year) => tag.set_year(year),
                // Unparsable year fails only this field
                Err(_) => warn!(file = %path.display(), year = %year, "Skipping unparsable year"),
            }
        }

        match tag.write_to_path(path, Version::Id3v24) {
            Ok(()) => WriteOutcome::Updated,
            Err(e) => WriteOutcome::Failed(e.to_string()),
        }
    }
}
