//! Strategy for formats with native lofty tag support (FLAC, M4A, OGG)
//!
//! Tag fields, duration, and technical audio properties all come from the
//! container's native tag/stream-info blocks. An absent tag block yields an
//! all-absent metadata record; only an unreadable container is fatal.

use lofty::config::WriteOptions;
use lofty::file::TaggedFile;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::{Tag, TagType};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{ExtractError, ExtractResult};
use crate::models::{CoverArt, Metadata, WriteOutcome, WriteRequest};

/// Technical stream properties shared across strategies
pub(crate) struct StreamProps {
    pub duration: f64,
    pub sample_rate: Option<u32>,
    pub channels: Option<u8>,
    pub bits_per_sample: Option<u8>,
    pub bitrate: Option<u32>,
}

pub(crate) fn probe(path: &Path) -> ExtractResult<TaggedFile> {
    Probe::open(path)
        .map_err(|e| ExtractError::Fatal(e.to_string()))?
        .read()
        .map_err(|e| ExtractError::Fatal(e.to_string()))
}

/// Read stream properties from the container's stream-info block
pub(crate) fn read_stream_props(path: &Path) -> ExtractResult<StreamProps> {
    let tagged_file = probe(path)?;
    let properties = tagged_file.properties();
    Ok(StreamProps {
        duration: properties.duration().as_secs_f64(),
        sample_rate: properties.sample_rate(),
        channels: properties.channels(),
        bits_per_sample: properties.bit_depth(),
        bitrate: properties.audio_bitrate(),
    })
}

/// Extract the attached front-cover picture from a lofty tag
pub(crate) fn picture_from_tag(tagged_file: &TaggedFile) -> Option<CoverArt> {
    let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag())?;
    let pictures = tag.pictures();
    let picture = pictures
        .iter()
        .find(|p| p.pic_type() == lofty::picture::PictureType::CoverFront)
        .or_else(|| pictures.first())?;
    let data = picture.data().to_vec();
    if data.is_empty() {
        return None;
    }
    match picture.mime_type() {
        Some(mime) => Some(CoverArt {
            data,
            mime_type: mime.as_str().to_string(),
        }),
        None => Some(CoverArt::from_bytes(data)),
    }
}

/// One instance per variant, differing only in the tag type created when a
/// file has no tag block yet
pub(crate) struct TaggedStrategy {
    tag_type: TagType,
}

impl TaggedStrategy {
    pub(crate) const fn flac() -> Self {
        Self {
            tag_type: TagType::VorbisComments,
        }
    }

    pub(crate) const fn ogg() -> Self {
        Self {
            tag_type: TagType::VorbisComments,
        }
    }

    pub(crate) const fn m4a() -> Self {
        Self {
            tag_type: TagType::Mp4Ilst,
        }
    }
}

impl super::FormatStrategy for TaggedStrategy {
    fn extract_metadata(&self, path: &Path) -> ExtractResult<Metadata> {
        let tagged_file = probe(path)?;
        let properties = tagged_file.properties();

        let mut metadata = Metadata {
            duration: Some(properties.duration().as_secs_f64()),
            sample_rate: properties.sample_rate(),
            channels: properties.channels(),
            bits_per_sample: properties.bit_depth(),
            bitrate: properties.audio_bitrate(),
            ..Metadata::default()
        };

        let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());
        if let Some(tag) = tag {
            metadata.title = tag.title().map(|s| s.to_string());
            metadata.artist = tag.artist().map(|s| s.to_string());
            metadata.album = tag.album().map(|s| s.to_string());
            metadata.year = tag.year();
            metadata.genre = tag.genre().map(|s| s.to_string());
            metadata.comment = tag.comment().map(|s| s.to_string());
        } else {
            debug!(file = %path.display(), "No tag block found");
        }

        Ok(metadata)
    }

    fn extract_duration(&self, path: &Path) -> ExtractResult<Option<f64>> {
        read_stream_props(path).map(|props| Some(props.duration))
    }

    fn extract_picture(&self, path: &Path) -> Option<CoverArt> {
        let tagged_file = probe(path).ok()?;
        picture_from_tag(&tagged_file)
    }

    fn write(&self, path: &Path, request: &WriteRequest) -> WriteOutcome {
        let mut tag = match probe(path) {
            Ok(tagged_file) => tagged_file
                .primary_tag()
                .or_else(|| tagged_file.first_tag())
                .cloned()
                .unwrap_or_else(|| Tag::new(self.tag_type)),
            Err(e) => return WriteOutcome::Failed(e.to_string()),
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
            tag.set_comment(comment.clone());
        }
        if let Some(year) = &request.year {
            match year.parse::<u32>() {
                Ok(year) => tag.set_year(year),
                // Unparsable year fails only this field
                Err(_) => warn!(file = %path.display(), year = %year, "Skipping unparsable year"),
            }
        }

        match tag.save_to_path(path, WriteOptions::default()) {
            Ok(()) => WriteOutcome::Updated,
            Err(e) => WriteOutcome::Failed(e.to_string()),
        }
    }
}
