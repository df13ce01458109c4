use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::tags::{TagMultimap, TextTags};

/// One normalized file as it appears in the output.
#[derive(Debug, Serialize)]
pub struct TagEntry<'a> {
    pub path: &'a Path,
    #[serde(flatten)]
    pub tags: &'a TextTags,
}

pub struct OutputWriter {
    writer: Option<BufWriter<File>>,
    format: OutputFormat,
}

impl OutputWriter {
    pub fn create(path: &Path, format: OutputFormat, dry_run: bool) -> Result<Self> {
        if dry_run {
            return Ok(Self {
                writer: None,
                format,
            });
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create directories for output '{}'", parent.display())
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open output file '{}'", path.display()))?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            format,
        })
    }

    /// Renders one entry without touching the output, so a failed entry leaves no partial bytes.
    pub fn render(&self, entry: &TagEntry<'_>) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(format_block(entry)),
            OutputFormat::Json => {
                let mut line = serde_json::to_string(entry).with_context(|| {
                    format!(
                        "failed to serialize normalized tags of '{}' as JSON",
                        entry.path.display()
                    )
                })?;
                line.push('\n');
                Ok(line)
            }
        }
    }

    pub fn write_rendered(&mut self, rendered: &str) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer
                .write_all(rendered.as_bytes())
                .context("failed to append normalized tags to output file")?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer
                .flush()
                .context("failed to flush buffered tags to output file")?;
        }
        Ok(())
    }
}

pub fn format_block(entry: &TagEntry<'_>) -> String {
    let path = entry.path.display().to_string();
    let mut block = format!("=== {} ===\n", escape_line(&path));
    push_section(&mut block, "vorbis", entry.tags.vorbis());
    push_section(&mut block, "id3v2", entry.tags.id3v2());
    block.push('\n');
    block
}

fn push_section(block: &mut String, name: &str, map: &TagMultimap) {
    if map.is_empty() {
        return;
    }

    block.push_str(&format!("[{name}]\n"));
    for (key, values) in map.iter() {
        for value in values {
            block.push_str(&format!("{} = {}\n", escape_line(key), escape_line(value)));
        }
    }
}

/// Keeps every key, value and path on a single output line.
fn escape_line(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['\\', '\n', '\r']) {
        return Cow::Borrowed(raw);
    }

    let mut escaped = String::with_capacity(raw.len() + 2);
    for ch in raw.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}
