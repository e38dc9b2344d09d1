//! Error types for the shelf-watcher crate.
//!
//! This module provides the [`WatchError`] type for errors that can occur
//! while watching the library tree.

use camino::Utf8PathBuf;

/// Errors that can occur during file watching operations.
///
/// # Error Recovery Strategy
///
/// - **Notify errors** ([`WatchError::Notify`]): fatal, propagate immediately
/// - **Path not found** ([`WatchError::PathNotFound`]): fatal, the watched
///   root must exist
/// - **Channel closed** ([`WatchError::ChannelClosed`]): fatal, the consumer
///   is gone
/// - **Non-UTF-8 path** ([`WatchError::NonUtf8Path`]): recoverable, the
///   event is skipped
/// - **I/O errors** ([`WatchError::Io`]): fatal, propagate immediately
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Failed to initialize or operate the notify watcher.
    #[error("notify watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// The watched root does not exist.
    #[error("path does not exist: {0}")]
    PathNotFound(Utf8PathBuf),

    /// The event channel was closed unexpectedly.
    #[error("event channel closed unexpectedly")]
    ChannelClosed,

    /// A path is not valid UTF-8.
    ///
    /// This workspace uses UTF-8 paths throughout; non-UTF-8 events are
    /// logged and skipped.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// An I/O error occurred while validating the watched root.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatchError {
    /// Creates a new [`WatchError::PathNotFound`] error.
    #[inline]
    pub fn path_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::PathNotFound(path.into())
    }

    /// Returns `true` if this error only affects one event and watching
    /// can continue.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::NonUtf8Path(_))
    }

    /// Returns `true` if this error is fatal (watching should stop).
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_not_found_display() {
        let err = WatchError::path_not_found("/missing/scores");
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "path does not exist: /missing/scores");
    }

    #[test]
    fn test_non_utf8_is_recoverable() {
        let err = WatchError::NonUtf8Path(std::path::PathBuf::from("x"));
        assert!(err.is_recoverable());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_channel_closed_display() {
        let err = WatchError::ChannelClosed;
        assert!(err.to_string().contains("channel closed"));
    }
}
