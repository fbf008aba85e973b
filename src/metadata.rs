//! Metadata provider: durations, tags and cover art.
//!
//! The engine and library only see the `MetadataProvider` trait; `LoftyMetadata`
//! is the real implementation.

use std::path::Path;

use lofty::config::WriteOptions;
use lofty::picture::{Picture, PictureType};
use lofty::prelude::*;
use lofty::tag::Tag;
use tracing::{debug, warn};

use crate::audio::Transcoder;
use crate::error::{PlayerError, Result};
use crate::format::probe_duration;

/// Descriptive tags. Absent values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    pub artist: String,
    pub album: String,
    pub year: String,
    pub genre: String,
}

pub trait MetadataProvider: Send + Sync {
    /// Whole seconds; `0` when unknown or unreadable.
    fn probe_duration(&self, path: &Path) -> u64;

    fn get_metadata(&self, path: &Path) -> TrackMetadata;

    /// Front cover if present, otherwise the first embedded picture.
    fn get_album_art(&self, path: &Path) -> Option<Vec<u8>>;

    /// Replace the front cover with `image`. Returns false on any failure.
    fn embed_album_art(&self, path: &Path, image: &[u8], mime: &str) -> bool;
}

#[derive(Debug, Clone)]
pub struct LoftyMetadata {
    transcoder: Transcoder,
}

impl LoftyMetadata {
    pub fn new(transcoder: Transcoder) -> Self {
        Self { transcoder }
    }

    fn read_metadata(path: &Path) -> Result<TrackMetadata> {
        let tagged = lofty::read_from_path(path)?;
        let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
            return Ok(TrackMetadata::default());
        };

        let text = |v: Option<std::borrow::Cow<'_, str>>| {
            v.map(|s| s.trim().to_string()).unwrap_or_default()
        };
        Ok(TrackMetadata {
            artist: text(tag.artist()),
            album: text(tag.album()),
            year: tag.year().map(|y| y.to_string()).unwrap_or_default(),
            genre: text(tag.genre()),
        })
    }

    fn read_album_art(path: &Path) -> Result<Option<Vec<u8>>> {
        let tagged = lofty::read_from_path(path)?;
        let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
            return Ok(None);
        };
        let pictures = tag.pictures();
        let picture = pictures
            .iter()
            .find(|p| matches!(p.pic_type(), PictureType::CoverFront))
            .or_else(|| pictures.first());
        Ok(picture.map(|p| p.data().to_vec()))
    }

    fn write_album_art(path: &Path, image: &[u8], mime: &str) -> Result<()> {
        if !path.is_file() {
            return Err(PlayerError::NotFound(path.to_path_buf()));
        }
        let mut tagged = lofty::read_from_path(path)?;
        let mut picture = Picture::from_reader(&mut &image[..])?;
        picture.set_pic_type(PictureType::CoverFront);

        let detected = picture.mime_type().map(|m| m.as_str().to_string());
        if detected.as_deref() != Some(mime) {
            debug!(?detected, requested = mime, "image type differs from requested mime");
        }

        if tagged.primary_tag().is_none() {
            let tag_type = tagged.primary_tag_type();
            tagged.insert_tag(Tag::new(tag_type));
        }
        let Some(tag) = tagged.primary_tag_mut() else {
            return Err(PlayerError::InvalidState("file cannot hold tags"));
        };
        tag.remove_picture_type(PictureType::CoverFront);
        tag.push_picture(picture);

        tagged.save_to_path(path, WriteOptions::default())?;
        Ok(())
    }
}

impl MetadataProvider for LoftyMetadata {
    fn probe_duration(&self, path: &Path) -> u64 {
        probe_duration(self.transcoder.formats(), &self.transcoder, path)
    }

    fn get_metadata(&self, path: &Path) -> TrackMetadata {
        Self::read_metadata(path).unwrap_or_else(|e| {
            debug!(path = %path.display(), error = %e, "no metadata");
            TrackMetadata::default()
        })
    }

    fn get_album_art(&self, path: &Path) -> Option<Vec<u8>> {
        Self::read_album_art(path).unwrap_or_else(|e| {
            debug!(path = %path.display(), error = %e, "no album art");
            None
        })
    }

    fn embed_album_art(&self, path: &Path, image: &[u8], mime: &str) -> bool {
        match Self::write_album_art(path, image, mime) {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "embedding album art failed");
                false
            }
        }
    }
}
