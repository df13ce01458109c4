use std::path::{Path, PathBuf};

use walkdir::{DirEntry, IntoIter, WalkDir};

use crate::frames;

/// An audio file picked up by the walk, with its frame dump if one exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFile {
    pub path: PathBuf,
    pub sidecar: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub max_depth: Option<usize>,
    pub follow_symlinks: bool,
    pub extensions: Vec<String>,
    pub sidecars: bool,
}

pub struct Scanner {
    inner: IntoIter,
    options: ScanOptions,
    depth_skips: Vec<PathBuf>,
}

impl Scanner {
    pub fn new(root: &Path, options: ScanOptions) -> Self {
        let inner = WalkDir::new(root)
            .follow_links(options.follow_symlinks)
            .sort_by_file_name()
            .into_iter();

        Self {
            inner,
            options,
            depth_skips: Vec::new(),
        }
    }

    /// Directories that sat at the depth limit and were not entered.
    pub fn depth_skips(&self) -> &[PathBuf] {
        &self.depth_skips
    }

    fn at_depth_limit(&self, entry: &DirEntry) -> bool {
        matches!(self.options.max_depth, Some(limit) if entry.depth() >= limit)
    }

    fn audio_file(&self, entry: DirEntry) -> AudioFile {
        let path = entry.into_path();
        let sidecar = if self.options.sidecars {
            Some(frames::sidecar_path(&path)).filter(|candidate| candidate.is_file())
        } else {
            None
        };
        AudioFile { path, sidecar }
    }
}

impl Iterator for Scanner {
    type Item = Result<AudioFile, walkdir::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(error) => return Some(Err(error)),
            };

            if entry.file_type().is_dir() {
                if entry.depth() > 0 && self.at_depth_limit(&entry) {
                    self.depth_skips.push(entry.path().to_path_buf());
                    self.inner.skip_current_dir();
                }
                continue;
            }

            if matches!(self.options.max_depth, Some(limit) if entry.depth() > limit) {
                continue;
            }

            if entry.file_type().is_file()
                && has_allowed_extension(entry.path(), &self.options.extensions)
            {
                return Some(Ok(self.audio_file(entry)));
            }
        }
    }
}

fn has_allowed_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| extensions.iter().any(|allowed| *allowed == ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::TempDir;

    fn options(max_depth: Option<usize>, extensions: &[&str]) -> ScanOptions {
        ScanOptions {
            max_depth,
            follow_symlinks: false,
            extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
            sidecars: true,
        }
    }

    fn paths(scanner: Scanner) -> Vec<PathBuf> {
        let mut collected: Vec<PathBuf> = scanner
            .map(|res| res.expect("entry").path)
            .collect();
        collected.sort();
        collected
    }

    #[test]
    fn collects_matching_files_recursively() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("sub");
        fs::create_dir(&nested).unwrap();

        let song1 = temp.path().join("song1.mp3");
        let song2 = nested.join("song2.MP3");
        fs::write(&song1, b"fake").unwrap();
        fs::write(&song2, b"fake").unwrap();
        fs::write(temp.path().join("readme.txt"), b"ignore").unwrap();
        fs::create_dir(temp.path().join("not_audio.mp3")).unwrap();

        let scanner = Scanner::new(temp.path(), options(None, &["mp3"]));

        assert_eq!(paths(scanner), vec![song1, song2]);
    }

    #[test]
    fn stops_at_depth_limit_and_records_skipped_dirs() {
        let temp = TempDir::new().unwrap();
        let child = temp.path().join("sub");
        let grandchild = child.join("deep");
        fs::create_dir_all(&grandchild).unwrap();

        let shallow = temp.path().join("root.mp3");
        let mid = child.join("mid.mp3");
        fs::write(&shallow, b"fake").unwrap();
        fs::write(&mid, b"fake").unwrap();
        fs::write(grandchild.join("deep.mp3"), b"fake").unwrap();

        let mut scanner = Scanner::new(temp.path(), options(Some(2), &["mp3"]));
        let mut collected: Vec<PathBuf> = scanner
            .by_ref()
            .map(|res| res.expect("entry").path)
            .collect();
        collected.sort();

        assert_eq!(collected, vec![shallow, mid]);
        assert_eq!(scanner.depth_skips(), &[grandchild][..]);
    }

    #[test]
    fn attaches_existing_sidecars() {
        let temp = TempDir::new().unwrap();
        let with_dump = temp.path().join("wheel.flac");
        let without_dump = temp.path().join("paraglow.flac");
        fs::write(&with_dump, b"fake").unwrap();
        fs::write(&without_dump, b"fake").unwrap();
        fs::write(temp.path().join("wheel.flac.frames.json"), b"[]").unwrap();

        let files: Vec<AudioFile> = Scanner::new(temp.path(), options(None, &["flac"]))
            .map(|res| res.expect("entry"))
            .collect();

        assert_eq!(
            files,
            vec![
                AudioFile {
                    path: without_dump,
                    sidecar: None,
                },
                AudioFile {
                    path: with_dump.clone(),
                    sidecar: Some(temp.path().join("wheel.flac.frames.json")),
                },
            ]
        );

        let mut no_sidecars = options(None, &["flac"]);
        no_sidecars.sidecars = false;
        let files: Vec<AudioFile> = Scanner::new(temp.path(), no_sidecars)
            .map(|res| res.expect("entry"))
            .collect();
        assert!(files.iter().all(|file| file.sidecar.is_none()));
    }

    #[test]
    fn propagates_walkdir_errors() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().to_path_buf();
        fs::write(root.join("music.mp3"), b"fake").unwrap();
        drop(temp);

        let mut scanner = Scanner::new(&root, options(None, &["mp3"]));
        assert!(scanner.next().unwrap().is_err());
    }

    #[test]
    fn filters_multiple_extensions() {
        let temp = TempDir::new().unwrap();
        let mp3 = temp.path().join("song.mp3");
        let flac = temp.path().join("track.flac");
        fs::write(&mp3, b"fake").unwrap();
        fs::write(&flac, b"fake").unwrap();
        fs::write(temp.path().join("notes.txt"), b"fake").unwrap();

        let scanner = Scanner::new(temp.path(), options(None, &["mp3", "flac"]));

        assert_eq!(paths(scanner), vec![mp3, flac]);
    }
}
