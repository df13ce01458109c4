use std::collections::HashMap;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// A single metadata entry as handed over by a tag reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawFrame {
    VorbisComment {
        field_name: String,
        value: String,
    },
    TextFrame {
        id: String,
        #[serde(default)]
        description: Option<String>,
        values: Vec<String>,
    },
    /// Embedded artwork. Never contributes text.
    PictureFrame {
        #[serde(default)]
        label: String,
    },
    Other {
        #[serde(default)]
        label: String,
    },
}

/// Normalization switches. The default keeps every value verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Skip values that are blank after trimming.
    pub drop_empty_values: bool,
}

/// Insertion-ordered map from key to the values collected for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagMultimap {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl TagMultimap {
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.index
            .get(key)
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    fn extend_key<I>(&mut self, key: String, values: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut values = values.into_iter().peekable();
        if values.peek().is_none() {
            return;
        }

        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1.extend(values),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, values.collect()));
            }
        }
    }
}

impl Serialize for TagMultimap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, values) in &self.entries {
            map.serialize_entry(key, values)?;
        }
        map.end()
    }
}

/// Text metadata of one file, split by tag family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextTags {
    vorbis: TagMultimap,
    id3v2: TagMultimap,
}

impl TextTags {
    /// Vorbis comments keyed by lowercase field name.
    pub fn vorbis(&self) -> &TagMultimap {
        &self.vorbis
    }

    /// ID3v2-shaped frames keyed by frame id or `ID:description`.
    pub fn id3v2(&self) -> &TagMultimap {
        &self.id3v2
    }

    pub fn is_empty(&self) -> bool {
        self.vorbis.is_empty() && self.id3v2.is_empty()
    }
}

pub fn vorbis_key(field_name: &str) -> String {
    field_name.to_lowercase()
}

pub fn id3v2_key(id: &str, description: Option<&str>) -> String {
    match description {
        Some(description) => format!("{id}:{}", description.to_lowercase()),
        None => id.to_owned(),
    }
}

pub fn normalize<I>(frames: I) -> TextTags
where
    I: IntoIterator<Item = RawFrame>,
{
    normalize_with(frames, &NormalizeOptions::default())
}

pub fn normalize_with<I>(frames: I, options: &NormalizeOptions) -> TextTags
where
    I: IntoIterator<Item = RawFrame>,
{
    let mut tags = TextTags::default();
    let keep = |value: &String| !options.drop_empty_values || !value.trim().is_empty();

    for frame in frames {
        match frame {
            RawFrame::VorbisComment { field_name, value } => {
                tags.vorbis
                    .extend_key(vorbis_key(&field_name), Some(value).into_iter().filter(keep));
            }
            RawFrame::TextFrame {
                id,
                description,
                values,
            } => {
                let key = id3v2_key(&id, description.as_deref());
                tags.id3v2.extend_key(key, values.into_iter().filter(keep));
            }
            RawFrame::PictureFrame { .. } | RawFrame::Other { .. } => {}
        }
    }

    tags
}

/// Layers `secondary` underneath `primary`; per key, primary values come first.
pub fn merge(primary: &TextTags, secondary: &TextTags) -> TextTags {
    TextTags {
        vorbis: merge_maps(&primary.vorbis, &secondary.vorbis),
        id3v2: merge_maps(&primary.id3v2, &secondary.id3v2),
    }
}

fn merge_maps(primary: &TagMultimap, secondary: &TagMultimap) -> TagMultimap {
    let mut merged = primary.clone();
    for (key, values) in secondary.iter() {
        merged.extend_key(key.to_owned(), values.iter().cloned());
    }
    merged
}
