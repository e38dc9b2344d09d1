//! Error types for the shelf-core crate.
//!
//! This module provides the [`ConfigError`] type for configuration-related
//! errors that can occur across the workspace.

use camino::Utf8PathBuf;

/// Errors that can occur during configuration loading and validation.
///
/// This error type covers all configuration-related failures including
/// path validation, unreadable or uncreatable directories, and parsing
/// errors. A failure here is an unrecoverable startup condition: the
/// process cannot index anything without a readable root.
///
/// # Examples
///
/// ```
/// use shelf_core::ConfigError;
/// use camino::Utf8PathBuf;
///
/// let error = ConfigError::NotADirectory(Utf8PathBuf::from("/some/file.pdf"));
/// assert!(error.to_string().contains("/some/file.pdf"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The provided path is invalid or malformed.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// The invalid path.
        path: Utf8PathBuf,
        /// Explanation of why the path is invalid.
        reason: String,
    },

    /// The library root exists but is not a directory.
    #[error("library root is not a directory: {0}")]
    NotADirectory(Utf8PathBuf),

    /// The library root is missing and could not be created.
    #[error("failed to create library root {path}: {source}")]
    RootUncreatable {
        /// The root that could not be created.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The library root exists but cannot be read.
    #[error("library root is not readable {path}: {source}")]
    RootUnreadable {
        /// The unreadable root.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An I/O error occurred while reading configuration.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
