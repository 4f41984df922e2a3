//! Audio file discovery
//!
//! Recursive, depth-unbounded walk that prunes excluded directories from
//! descent entirely, skips hidden/system files, and yields only files whose
//! extension is in the configured set. Symlinks and unreadable entries are
//! skipped with a warning, never fatal to the walk.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::ScanOptions;
use crate::error::ScanError;
use crate::models::CandidateFile;

pub struct FileScanner {
    options: ScanOptions,
}

impl FileScanner {
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    /// Scan a directory tree for candidate audio files
    ///
    /// Results are sorted by file name within each directory, so the same
    /// snapshot always yields the same sequence.
    pub fn scan(&self, root: &Path) -> Result<Vec<CandidateFile>, ScanError> {
        if !root.exists() {
            return Err(ScanError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let mut symlink_visited = HashSet::new();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| self.should_descend(e, &mut symlink_visited));

        let mut candidates = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Error accessing entry, skipping");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(extension) = entry
                .path()
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
            else {
                continue;
            };
            if !self.options.matches_extension(&extension) {
                continue;
            }
            let size = match entry.metadata() {
                Ok(meta) => meta.len(),
                Err(e) => {
                    warn!(file = %entry.path().display(), error = %e, "Cannot stat file, skipping");
                    continue;
                }
            };
            candidates.push(CandidateFile {
                path: entry.path().to_path_buf(),
                extension,
                size,
            });
        }

        debug!(root = %root.display(), count = candidates.len(), "Discovery complete");
        Ok(candidates)
    }

    /// Prune excluded directories from descent and drop hidden/system files
    fn should_descend(&self, entry: &DirEntry, symlink_visited: &mut HashSet<PathBuf>) -> bool {
        let file_name = entry.file_name().to_string_lossy();

        if entry.file_type().is_dir() && self.options.exclude_dirs.iter().any(|d| d == &*file_name) {
            debug!(dir = %entry.path().display(), "Pruning excluded directory");
            return false;
        }

        // macOS resource forks and configured system files
        if file_name.starts_with("._") || self.options.exclude_files.iter().any(|f| f == &*file_name) {
            return false;
        }

        if entry.file_type().is_symlink() {
            if let Ok(canonical) = entry.path().canonicalize() {
                if !symlink_visited.insert(canonical) {
                    warn!(path = %entry.path().display(), "Symlink loop detected, skipping");
                    return false;
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scanner() -> FileScanner {
        FileScanner::new(ScanOptions::default())
    }

    #[test]
    fn nonexistent_root_is_rejected() {
        match scanner().scan(Path::new("/nonexistent/music")) {
            Err(ScanError::PathNotFound(_)) => {}
            other => panic!("Expected PathNotFound, got {:?}", other),
        }
    }

    #[test]
    fn file_root_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        match scanner().scan(file.path()) {
            Err(ScanError::NotADirectory(_)) => {}
            other => panic!("Expected NotADirectory, got {:?}", other),
        }
    }

    #[test]
    fn matches_extensions_recursively_and_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("album/disc2")).unwrap();
        fs::write(dir.path().join("a.mp3"), b"x").unwrap();
        fs::write(dir.path().join("album/b.FLAC"), b"x").unwrap();
        fs::write(dir.path().join("album/disc2/c.Ogg"), b"x").unwrap();
        fs::write(dir.path().join("album/notes.txt"), b"x").unwrap();

        let candidates = scanner().scan(dir.path()).unwrap();
        let names: Vec<_> = candidates
            .iter()
            .map(|c| c.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.mp3", "b.FLAC", "c.Ogg"]);
        assert_eq!(candidates[1].extension, "flac");
    }

    #[test]
    fn excluded_directories_are_pruned_from_descent() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".git/objects")).unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join(".git/objects/fake.mp3"), b"x").unwrap();
        fs::write(dir.path().join("node_modules/pkg/fake.mp3"), b"x").unwrap();
        fs::write(dir.path().join("real.mp3"), b"x").unwrap();

        let candidates = scanner().scan(dir.path()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].path.ends_with("real.mp3"));
    }

    #[test]
    fn system_files_are_excluded() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("._ghost.mp3"), b"x").unwrap();
        fs::write(dir.path().join("song.mp3"), b"x").unwrap();

        let candidates = scanner().scan(dir.path()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].path.ends_with("song.mp3"));
    }

    #[test]
    fn two_scans_of_an_unchanged_tree_are_identical() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["z.mp3", "a.mp3", "m.wav", "k.flac"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let first: Vec<_> = scanner().scan(dir.path()).unwrap().iter().map(|c| c.path.clone()).collect();
        let second: Vec<_> = scanner().scan(dir.path()).unwrap().iter().map(|c| c.path.clone()).collect();
        assert_eq!(first, second);
    }
}
