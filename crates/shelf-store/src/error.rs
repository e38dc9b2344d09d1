//! Error types for the shelf-store crate.

use camino::Utf8PathBuf;

/// Errors that can occur during catalog operations.
///
/// Most variants wrap rusqlite errors; the I/O variant covers preparing
/// the directory the database file lives in.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// An underlying SQLite operation failed.
    #[error("catalog query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The directory for the database file could not be created.
    #[error("failed to prepare catalog directory {path}: {source}")]
    Prepare {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_error_display() {
        let err = CatalogError::Prepare {
            path: Utf8PathBuf::from("/data"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/data"));
    }
}
