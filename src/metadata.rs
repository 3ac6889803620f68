use crate::error::{PlayerError, Result};
use lofty::file::{AudioFile, FileType, TaggedFileExt};
use lofty::prelude::{Accessor, ItemKey, TagExt};
use lofty::probe::Probe;
use lofty::tag::Tag;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SUMMARY_RULE: &str = "---------------------------------------------------";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub track: Option<String>,
    pub tempo: Option<String>,
    pub duration: Option<Duration>,
}

impl TrackMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.track.is_none()
            && self.tempo.is_none()
    }

    pub fn summary(&self) -> String {
        let field = |value: &Option<String>| value.as_deref().unwrap_or("-").to_string();
        format!(
            "{SUMMARY_RULE}\n TITLE:\t{}\n ARTIST:\t{}\n ALBUM:\t{}\n TRACK:\t{}\n TEMPO:\t{}\n{SUMMARY_RULE}",
            field(&self.title),
            field(&self.artist),
            field(&self.album),
            field(&self.track),
            field(&self.tempo),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTrack {
    pub path: PathBuf,
    pub metadata: TrackMetadata,
}

impl LoadedTrack {
    pub fn new(path: impl Into<PathBuf>, metadata: TrackMetadata) -> Self {
        Self {
            path: path.into(),
            metadata,
        }
    }

    pub fn untagged(path: impl Into<PathBuf>) -> Self {
        Self::new(path, TrackMetadata::default())
    }

    pub fn display_title(&self) -> String {
        self.metadata.title.clone().unwrap_or_else(|| {
            self.path
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_else(|| self.path.display().to_string())
        })
    }
}

pub fn load_track(path: &Path) -> Result<LoadedTrack> {
    let metadata = read_metadata(path)?;
    tracing::debug!(path = %path.display(), "loaded tags\n{}", metadata.summary());
    Ok(LoadedTrack::new(path, metadata))
}

pub fn read_metadata(path: &Path) -> Result<TrackMetadata> {
    // Opened by hand so a missing path maps to Io; the extension stays as the
    // fallback type when the content cannot be sniffed.
    let file = File::open(path).map_err(|source| PlayerError::io(path, source))?;
    let mut probe = Probe::new(file);
    if let Some(file_type) = FileType::from_path(path) {
        probe = probe.set_file_type(file_type);
    }

    let tagged_file = probe
        .guess_file_type()
        .map_err(|source| PlayerError::io(path, source))?
        .read()
        .map_err(|source| PlayerError::Tag {
            path: path.to_path_buf(),
            source,
        })?;

    let duration = Some(tagged_file.properties().duration()).filter(|value| !value.is_zero());

    let tag = tagged_file
        .primary_tag()
        .filter(|tag| !tag.is_empty())
        .or_else(|| tagged_file.tags().iter().find(|tag| !tag.is_empty()));

    let mut metadata = tag.map(metadata_from_tag).unwrap_or_default();
    metadata.duration = duration;
    Ok(metadata)
}

fn metadata_from_tag(tag: &Tag) -> TrackMetadata {
    TrackMetadata {
        title: tag.title().as_deref().and_then(clean_metadata_value),
        artist: tag.artist().as_deref().and_then(clean_metadata_value),
        album: tag.album().as_deref().and_then(clean_metadata_value),
        track: tag.track().map(|number| number.to_string()),
        tempo: tempo_from_tag(tag),
        duration: None,
    }
}

fn tempo_from_tag(tag: &Tag) -> Option<String> {
    tag.items()
        .filter(|item| matches!(item.key(), ItemKey::IntegerBpm | ItemKey::Bpm))
        .find_map(|item| item.value().text().and_then(clean_metadata_value))
}

fn clean_metadata_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
