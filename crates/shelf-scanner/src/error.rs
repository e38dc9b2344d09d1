//! Error types for the shelf-scanner crate.
//!
//! This module provides the [`ScanError`] type for errors that can occur
//! during directory traversal and reconciliation.

use camino::Utf8PathBuf;
use shelf_core::PathGuardError;
use shelf_store::CatalogError;

/// Errors that can occur during scanning and reconciliation.
///
/// # Error Recovery Strategy
///
/// - **Already scanning** ([`ScanError::AlreadyScanning`]): surfaced to the
///   caller as a conflict; never queued or retried internally
/// - **Walker errors** ([`ScanError::Walk`]): fatal for the scan
/// - **Stat errors** ([`ScanError::Stat`]): log warning, skip file,
///   continue scan
/// - **Guard rejections** ([`ScanError::Guard`]): log warning, skip file -
///   a path escaping the root is never indexed
/// - **Non-UTF-8 paths** ([`ScanError::NonUtf8Path`]): log warning, skip
///   file - the catalog stores UTF-8 paths only
/// - **Catalog errors** ([`ScanError::Store`]): fatal, the shared resource
///   is broken
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// A full scan was requested while one is already in flight.
    ///
    /// Callers must retry later; requests are never queued.
    #[error("a scan is already running")]
    AlreadyScanning,

    /// Failed to walk a directory.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// Failed to stat a file during reconciliation.
    ///
    /// The file likely vanished between discovery and stat; scanning
    /// continues with the next file.
    #[error("failed to stat file {path}: {source}")]
    Stat {
        /// The path that could not be stat'ed.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A path failed the containment check against the library root.
    #[error(transparent)]
    Guard(#[from] PathGuardError),

    /// A catalog operation failed.
    #[error(transparent)]
    Store(#[from] CatalogError),

    /// Invalid scanner configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A path is not valid UTF-8.
    ///
    /// This workspace uses UTF-8 paths throughout. If a non-UTF-8 path is
    /// encountered, it cannot be indexed.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),
}

impl ScanError {
    /// Creates a new [`ScanError::Stat`] error.
    #[inline]
    pub fn stat(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Stat {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ScanError::Config`] error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns `true` when the error only affects one file and the
    /// enclosing scan can continue.
    #[inline]
    #[must_use]
    pub const fn is_per_file(&self) -> bool {
        matches!(self, Self::Stat { .. } | Self::Guard(_) | Self::NonUtf8Path(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_scanning_display() {
        let err = ScanError::AlreadyScanning;
        assert_eq!(err.to_string(), "a scan is already running");
        assert!(!err.is_per_file());
    }

    #[test]
    fn test_stat_error_is_per_file() {
        let err = ScanError::stat(
            "sub/b.pdf",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.is_per_file());
        assert!(err.to_string().contains("sub/b.pdf"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ScanError::config("root path does not exist: /missing");
        assert!(err.to_string().contains("/missing"));
    }
}
