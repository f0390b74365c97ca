//! Listing the audio files of a source folder

use levelr_core::{LevelError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions picked up from category folders
pub const CATEGORY_EXTENSIONS: &[&str] = &["wav", "flac", "mp3"];

/// Extensions picked up from a track folder
pub const TRACK_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "m4a", "aac"];

/// Non-recursive scanner for audio files in one folder
#[derive(Debug, Clone, Copy)]
pub struct FileScanner {
    extensions: &'static [&'static str],
}

impl FileScanner {
    /// Scanner accepting the given extensions (case-insensitive)
    pub fn new(extensions: &'static [&'static str]) -> Self {
        Self { extensions }
    }

    pub fn for_categories() -> Self {
        Self::new(CATEGORY_EXTENSIONS)
    }

    pub fn for_tracks() -> Self {
        Self::new(TRACK_EXTENSIONS)
    }

    /// Check whether a path carries one of the accepted extensions
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|accepted| accepted.eq_ignore_ascii_case(ext))
            })
    }

    /// Files directly inside `dir` with an accepted extension, sorted by name
    ///
    /// Subfolders are not descended into.
    pub fn scan_directory(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(LevelError::configuration(format!(
                "{} is not a readable folder",
                dir.display()
            )));
        }

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            if entry.file_type().is_file() && self.is_supported(entry.path()) {
                files.push(entry.into_path());
            }
        }

        tracing::debug!("Found {} audio files in {}", files.len(), dir.display());
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn extensions_match_case_insensitively() {
        let scanner = FileScanner::for_categories();
        assert!(scanner.is_supported(Path::new("kick.WAV")));
        assert!(scanner.is_supported(Path::new("bass.Flac")));
        assert!(!scanner.is_supported(Path::new("notes.txt")));
        assert!(!scanner.is_supported(Path::new("loop.m4a")));
        assert!(!scanner.is_supported(Path::new("README")));

        assert!(FileScanner::for_tracks().is_supported(Path::new("song.m4a")));
        assert!(FileScanner::for_tracks().is_supported(Path::new("song.AAC")));
    }

    #[test]
    fn scan_is_flat_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.wav"), b"").unwrap();
        fs::write(dir.path().join("a.mp3"), b"").unwrap();
        fs::write(dir.path().join("cover.jpg"), b"").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.wav"), b"").unwrap();

        let files = FileScanner::for_categories()
            .scan_directory(dir.path())
            .unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.mp3", "b.wav"]);
    }

    #[test]
    fn directory_named_like_audio_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("folder.wav")).unwrap();

        let files = FileScanner::for_tracks().scan_directory(dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn missing_folder_is_a_configuration_error() {
        let err = FileScanner::for_tracks()
            .scan_directory(Path::new("/nonexistent/levelr/source"))
            .unwrap_err();
        assert!(matches!(err, LevelError::Configuration(_)));
    }
}
