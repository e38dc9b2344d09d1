//! Path guard: confines catalog-relative paths to the library root.
//!
//! Catalog ids are user-suppliable strings and the catalog itself may be
//! stale, so every serve-by-id request (not only scan-time reconciliation)
//! must re-validate that the stored relative path still resolves inside the
//! root. Canonicalization resolves `..` sequences and symlinks before the
//! containment check, so a symlink pointing outside the root is rejected
//! the same way a literal `../` escape is.

use camino::{Utf8Path, Utf8PathBuf};

/// Errors produced by the path guard.
#[derive(Debug, thiserror::Error)]
pub enum PathGuardError {
    /// The path resolves outside the library root.
    #[error("path escapes the library root: {0}")]
    Traversal(Utf8PathBuf),

    /// The path (or the root) could not be canonicalized.
    ///
    /// Covers missing files: a catalog record whose file has vanished
    /// surfaces here and is treated as "not found" by callers.
    #[error("failed to resolve path: {0}")]
    Io(#[from] std::io::Error),

    /// Canonicalization produced a non-UTF-8 path.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),
}

/// Resolves a root-relative path to a canonical absolute path inside `root`.
///
/// Leading path separators are stripped so an "absolute" relative path
/// cannot re-anchor the join. The joined path is canonicalized and checked
/// for containment against the canonicalized root.
///
/// # Errors
///
/// Returns [`PathGuardError::Traversal`] when the canonical result is not
/// prefixed by the canonical root, and [`PathGuardError::Io`] when either
/// path cannot be canonicalized (typically because the file no longer
/// exists).
///
/// # Examples
///
/// ```no_run
/// use shelf_core::paths::resolve_within;
/// use camino::Utf8Path;
///
/// let root = Utf8Path::new("/music/scores");
/// let absolute = resolve_within(root, "bach/invention_01.pdf")?;
/// assert!(absolute.starts_with(root));
/// # Ok::<(), shelf_core::PathGuardError>(())
/// ```
pub fn resolve_within(root: &Utf8Path, relative: &str) -> Result<Utf8PathBuf, PathGuardError> {
    let trimmed = relative.trim_start_matches(['/', '\\']);
    let joined = root.join(trimmed);
    confine(root, &joined)
}

/// Canonicalizes `path` and verifies it is contained within `root`.
///
/// Used directly by the scanner for absolute paths coming from the walker
/// and the watcher; [`resolve_within`] is the relative-path front door.
///
/// # Errors
///
/// Same contract as [`resolve_within`].
pub fn confine(root: &Utf8Path, path: &Utf8Path) -> Result<Utf8PathBuf, PathGuardError> {
    let canonical_root = canonicalize_utf8(root)?;
    let canonical = canonicalize_utf8(path)?;

    if !canonical.starts_with(&canonical_root) {
        return Err(PathGuardError::Traversal(canonical));
    }

    Ok(canonical)
}

fn canonicalize_utf8(path: &Utf8Path) -> Result<Utf8PathBuf, PathGuardError> {
    let canonical = path.as_std_path().canonicalize()?;
    Utf8PathBuf::from_path_buf(canonical).map_err(PathGuardError::NonUtf8Path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture_root() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir");
        fs::create_dir_all(root.join("sub")).expect("mkdir");
        fs::write(root.join("a.pdf"), b"pdf").expect("write");
        fs::write(root.join("sub/b.pdf"), b"pdf").expect("write");
        (dir, root)
    }

    #[test]
    fn test_resolve_within_root_level_file() {
        let (_dir, root) = fixture_root();
        let resolved = resolve_within(&root, "a.pdf").expect("in-root path resolves");
        let canonical_root = root.as_std_path().canonicalize().expect("canonical root");
        assert!(resolved.as_std_path().starts_with(&canonical_root));
    }

    #[test]
    fn test_resolve_within_nested_file() {
        let (_dir, root) = fixture_root();
        let resolved = resolve_within(&root, "sub/b.pdf").expect("nested path resolves");
        assert!(resolved.as_str().ends_with("b.pdf"));
    }

    #[test]
    fn test_resolve_within_strips_leading_separators() {
        let (_dir, root) = fixture_root();
        let resolved = resolve_within(&root, "/a.pdf").expect("leading slash stripped");
        assert!(resolved.as_str().ends_with("a.pdf"));
    }

    #[test]
    fn test_resolve_within_rejects_parent_escape() {
        let (_dir, root) = fixture_root();
        // /etc/passwd exists on every test machine, so canonicalization
        // succeeds and containment is what must reject it.
        let result = resolve_within(&root, "../../../../../../etc/passwd");
        assert!(matches!(
            result,
            Err(PathGuardError::Traversal(_) | PathGuardError::Io(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_within_rejects_symlink_escape() {
        let (_dir, root) = fixture_root();
        let outside = TempDir::new().expect("outside dir");
        let target = outside.path().join("secret.pdf");
        fs::write(&target, b"outside").expect("write outside");
        std::os::unix::fs::symlink(&target, root.join("link.pdf")).expect("symlink");

        let result = resolve_within(&root, "link.pdf");
        assert!(matches!(result, Err(PathGuardError::Traversal(_))));
    }

    #[test]
    fn test_resolve_within_missing_file_is_io() {
        let (_dir, root) = fixture_root();
        let result = resolve_within(&root, "no-such-file.pdf");
        assert!(matches!(result, Err(PathGuardError::Io(_))));
    }
}
