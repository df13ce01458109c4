use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use id3::frame::{Content, ExtendedText};
use id3::Tag;
use lofty::config::ParseOptions;
use lofty::file::AudioFile;
use lofty::flac::FlacFile;
use lofty::ogg::{OggPictureStorage, OpusFile, VorbisComments, VorbisFile};

use crate::tags::RawFrame;

pub const SIDECAR_SUFFIX: &str = "frames.json";

/// Embedded tag family read for a file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSource {
    Id3v2,
    Flac,
    OggVorbis,
    OggOpus,
}

impl TagSource {
    pub fn for_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match ext.as_deref() {
            Some("flac") => Self::Flac,
            Some("ogg" | "oga") => Self::OggVorbis,
            Some("opus") => Self::OggOpus,
            _ => Self::Id3v2,
        }
    }
}

/// Reads the embedded tag of `path` as raw frames. A file without a tag yields none.
pub fn read_embedded(path: &Path) -> Result<Vec<RawFrame>> {
    match TagSource::for_path(path) {
        TagSource::Id3v2 => read_id3(path),
        TagSource::Flac => {
            let flac: FlacFile = read_lofty(path)?;
            Ok(flac
                .vorbis_comments()
                .map(from_vorbis_comments)
                .unwrap_or_default())
        }
        TagSource::OggVorbis => {
            let vorbis: VorbisFile = read_lofty(path)?;
            Ok(from_vorbis_comments(vorbis.vorbis_comments()))
        }
        TagSource::OggOpus => {
            let opus: OpusFile = read_lofty(path)?;
            Ok(from_vorbis_comments(opus.vorbis_comments()))
        }
    }
}

fn read_id3(path: &Path) -> Result<Vec<RawFrame>> {
    match Tag::read_from_path(path) {
        Ok(tag) => Ok(from_id3_tag(&tag)),
        Err(error) if matches!(error.kind, id3::ErrorKind::NoTag) => {
            log::debug!("No ID3v2 tag in '{}'", path.display());
            Ok(Vec::new())
        }
        Err(error) => Err(anyhow::Error::new(error)
            .context(format!("failed to read ID3 tags from '{}'", path.display()))),
    }
}

fn read_lofty<F: AudioFile>(path: &Path) -> Result<F> {
    let mut file =
        File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;
    F::read_from(&mut file, ParseOptions::new().read_properties(false))
        .with_context(|| format!("failed to read Vorbis comments from '{}'", path.display()))
}

/// Comments in stored order, followed by one opaque frame per embedded picture.
pub fn from_vorbis_comments(comments: &VorbisComments) -> Vec<RawFrame> {
    let text = comments
        .items()
        .map(|(field_name, value)| RawFrame::VorbisComment {
            field_name: field_name.to_owned(),
            value: value.to_owned(),
        });
    let pictures = comments
        .pictures()
        .iter()
        .map(|_| RawFrame::PictureFrame {
            label: "METADATA_BLOCK_PICTURE".to_owned(),
        });

    text.chain(pictures).collect()
}

/// Flattens an ID3v2 tag into raw frames, preserving tag order.
pub fn from_id3_tag(tag: &Tag) -> Vec<RawFrame> {
    tag.frames()
        .map(|frame| match frame.content() {
            Content::Text(text) => RawFrame::TextFrame {
                id: frame.id().to_owned(),
                description: None,
                values: split_values(text),
            },
            Content::ExtendedText(ExtendedText { description, value }) => RawFrame::TextFrame {
                id: frame.id().to_owned(),
                description: Some(description.clone()),
                values: split_values(value),
            },
            Content::Picture(_) => RawFrame::PictureFrame {
                label: frame.id().to_owned(),
            },
            _ => RawFrame::Other {
                label: frame.id().to_owned(),
            },
        })
        .collect()
}

// ID3v2.4 separates multiple values inside one frame with NUL.
fn split_values(text: &str) -> Vec<String> {
    text.split('\0').map(str::to_owned).collect()
}

/// `song.flac` -> `song.flac.frames.json`
pub fn sidecar_path(audio: &Path) -> PathBuf {
    let mut name = audio.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(SIDECAR_SUFFIX);
    audio.with_file_name(name)
}

pub fn read_sidecar(path: &Path) -> Result<Vec<RawFrame>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open sidecar '{}'", path.display()))?;
    let frames: Vec<RawFrame> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse raw frames from '{}'", path.display()))?;
    log::debug!("Loaded {} frames from '{}'", frames.len(), path.display());
    Ok(frames)
}
