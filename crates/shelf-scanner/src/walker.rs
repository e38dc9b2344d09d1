//! Directory traversal for indexable score files.
//!
//! This module provides [`ScoreWalker`], which uses the `ignore` crate to
//! walk the library root, filtering for the configured extensions.
//!
//! # Features
//!
//! - Skips hidden files and directories (dotfiles are never indexed)
//! - Filters by extension, case-insensitively (`.pdf` and `.PDF` match)
//! - Never follows symbolic links - defense in depth alongside the path
//!   guard, so a link pointing outside the root cannot widen the scan
//! - Converts paths to UTF-8 [`Utf8PathBuf`](camino::Utf8PathBuf),
//!   skipping the rare filename that is not valid UTF-8

use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;
use tracing::warn;

use crate::error::ScanError;

/// A file walker that discovers indexable files in the library tree.
///
/// # Design
///
/// The walker uses a "collect-then-reconcile" pattern: all matching paths
/// are collected first (single-threaded, I/O bound), then consumed
/// synchronously by the reconciliation primitive. Traversal order is
/// unspecified but exhaustive.
#[derive(Debug)]
pub struct ScoreWalker {
    /// The root directory to walk.
    root: Utf8PathBuf,
    /// Extensions to match, lowercase without the dot.
    extensions: Vec<String>,
}

impl ScoreWalker {
    /// Creates a new walker for the given root directory.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if the root path doesn't exist or
    /// isn't a directory.
    pub fn new(root: &Utf8Path, extensions: &[String]) -> Result<Self, ScanError> {
        if !root.exists() {
            return Err(ScanError::config(format!(
                "root path does not exist: {root}"
            )));
        }
        if !root.is_dir() {
            return Err(ScanError::config(format!(
                "root path is not a directory: {root}"
            )));
        }

        Ok(Self {
            root: root.to_owned(),
            extensions: extensions.to_vec(),
        })
    }

    /// Collects all matching file paths in the library tree.
    ///
    /// Non-UTF-8 filenames cannot be stored in the catalog; they are
    /// logged and skipped so the rest of the tree still gets indexed.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Walk`] if directory traversal fails.
    pub fn collect_paths(&self) -> Result<Vec<Utf8PathBuf>, ScanError> {
        let mut paths = Vec::new();

        for result in self.build_walker() {
            let entry = result?;

            // Skip directories and non-files
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            let Some(utf8_path) = Utf8Path::from_path(path) else {
                warn!(path = %path.display(), "Skipping non-UTF-8 path");
                continue;
            };

            if !self.matches_extension(utf8_path) {
                continue;
            }

            paths.push(utf8_path.to_owned());
        }

        Ok(paths)
    }

    /// Builds the ignore walker with fixed settings.
    fn build_walker(&self) -> ignore::Walk {
        WalkBuilder::new(&self.root)
            // Standard filters hide dotfiles and honor ignore files
            .standard_filters(true)
            // Symlinks are never followed; the path guard is the backstop
            .follow_links(false)
            // Single-threaded walk; reconciliation is the expensive part
            .threads(1)
            // A music library is not a git repository
            .require_git(false)
            .build()
    }

    /// Checks whether a path carries one of the indexed extensions.
    fn matches_extension(&self, path: &Utf8Path) -> bool {
        path.extension()
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Returns the root directory being walked.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn pdf_extensions() -> Vec<String> {
        vec!["pdf".to_owned()]
    }

    fn fixture_tree() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 root");
        fs::create_dir_all(root.join("sub/deep")).expect("mkdir");
        fs::create_dir_all(root.join(".hidden")).expect("mkdir");
        fs::write(root.join("a.pdf"), b"pdf").expect("write");
        fs::write(root.join("B.PDF"), b"pdf").expect("write");
        fs::write(root.join("notes.txt"), b"text").expect("write");
        fs::write(root.join("sub/b.pdf"), b"pdf").expect("write");
        fs::write(root.join("sub/deep/c.pdf"), b"pdf").expect("write");
        fs::write(root.join(".hidden/d.pdf"), b"pdf").expect("write");
        fs::write(root.join(".dotfile.pdf"), b"pdf").expect("write");
        (dir, root)
    }

    #[test]
    fn test_collect_paths_matches_extension_case_insensitively() {
        let (_dir, root) = fixture_tree();
        let walker = ScoreWalker::new(&root, &pdf_extensions()).expect("walker");
        let mut paths = walker.collect_paths().expect("collect");
        paths.sort();

        let names: Vec<&str> = paths
            .iter()
            .filter_map(|p| p.strip_prefix(&root).ok())
            .map(camino::Utf8Path::as_str)
            .collect();
        assert_eq!(names, vec!["B.PDF", "a.pdf", "sub/b.pdf", "sub/deep/c.pdf"]);
    }

    #[test]
    fn test_collect_paths_skips_hidden_entries() {
        let (_dir, root) = fixture_tree();
        let walker = ScoreWalker::new(&root, &pdf_extensions()).expect("walker");
        let paths = walker.collect_paths().expect("collect");

        assert!(!paths.iter().any(|p| p.as_str().contains(".hidden")));
        assert!(!paths.iter().any(|p| p.as_str().contains(".dotfile")));
    }

    #[test]
    fn test_collect_paths_skips_non_matching_extensions() {
        let (_dir, root) = fixture_tree();
        let walker = ScoreWalker::new(&root, &pdf_extensions()).expect("walker");
        let paths = walker.collect_paths().expect("collect");

        assert!(!paths.iter().any(|p| p.as_str().ends_with(".txt")));
    }

    #[test]
    fn test_walker_rejects_missing_root() {
        let result = ScoreWalker::new(
            Utf8Path::new("/nonexistent/path/that/does/not/exist"),
            &pdf_extensions(),
        );
        assert!(matches!(result, Err(ScanError::Config(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_paths_skips_non_utf8_filenames() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (_dir, root) = fixture_tree();
        let bad = root.as_std_path().join(OsStr::from_bytes(b"b\xFFad.pdf"));
        fs::write(&bad, b"pdf").expect("write non-utf8 name");

        let walker = ScoreWalker::new(&root, &pdf_extensions()).expect("walker");
        let mut paths = walker.collect_paths().expect("collect");
        paths.sort();

        let names: Vec<&str> = paths
            .iter()
            .filter_map(|p| p.strip_prefix(&root).ok())
            .map(camino::Utf8Path::as_str)
            .collect();
        assert_eq!(names, vec!["B.PDF", "a.pdf", "sub/b.pdf", "sub/deep/c.pdf"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_walker_does_not_follow_symlinked_directories() {
        let (_dir, root) = fixture_tree();
        let outside = TempDir::new().expect("outside dir");
        fs::write(outside.path().join("x.pdf"), b"pdf").expect("write outside");
        std::os::unix::fs::symlink(outside.path(), root.join("linked")).expect("symlink");

        let walker = ScoreWalker::new(&root, &pdf_extensions()).expect("walker");
        let paths = walker.collect_paths().expect("collect");
        assert!(!paths.iter().any(|p| p.as_str().contains("linked")));
    }
}
