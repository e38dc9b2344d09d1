//! Configuration structures for the scoreshelf server.
//!
//! This module provides configuration types for all components of the
//! application:
//!
//! - [`LibraryConfig`] - indexed root, catalog path, matched extensions
//! - [`WatchConfig`] - file watcher settings (quiet period, recursion)
//! - [`ServerConfig`] - HTTP bind settings and the admin token
//! - [`Config`] - root configuration combining all settings
//!
//! All configuration types implement [`Default`] with values suitable
//! for a local single-user deployment.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for the indexed library.
///
/// # Examples
///
/// ```
/// use shelf_core::LibraryConfig;
///
/// let config = LibraryConfig::default();
/// assert_eq!(config.file_extensions, vec!["pdf"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Root directory containing the score files. Nothing outside this
    /// directory is ever indexed or served.
    pub root_path: Utf8PathBuf,

    /// Location of the SQLite catalog file.
    pub db_path: Utf8PathBuf,

    /// File extensions to index, lowercase without the dot.
    pub file_extensions: Vec<String>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root_path: Utf8PathBuf::from("./scores"),
            db_path: Utf8PathBuf::from("./data/scores.db"),
            file_extensions: vec!["pdf".to_owned()],
        }
    }
}

impl LibraryConfig {
    /// Ensures the library root exists and is a readable directory.
    ///
    /// A missing root is created (the deployment may mount it later); an
    /// existing non-directory or unreadable root is a fatal startup error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RootUncreatable`] when creation fails,
    /// [`ConfigError::NotADirectory`] when the path exists but is a file,
    /// and [`ConfigError::RootUnreadable`] when listing the directory fails.
    pub fn prepare_root(&self) -> Result<(), ConfigError> {
        if !self.root_path.exists() {
            std::fs::create_dir_all(&self.root_path).map_err(|source| {
                ConfigError::RootUncreatable {
                    path: self.root_path.clone(),
                    source,
                }
            })?;
        }

        if !self.root_path.is_dir() {
            return Err(ConfigError::NotADirectory(self.root_path.clone()));
        }

        self.root_path
            .read_dir_utf8()
            .map_err(|source| ConfigError::RootUnreadable {
                path: self.root_path.clone(),
                source,
            })?;

        Ok(())
    }

    /// Returns `true` if `extension` (without dot) is indexable.
    #[must_use]
    pub fn matches_extension(&self, extension: &str) -> bool {
        self.file_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }
}

/// Configuration for the file watcher.
///
/// The debounce window is the "quiet period": a changed file must stop
/// changing for this long before it is reconciled, so partially written
/// files are not indexed mid-write.
///
/// # Examples
///
/// ```
/// use shelf_core::WatchConfig;
///
/// let config = WatchConfig::default();
/// assert_eq!(config.debounce_ms, 2000);
/// assert!(config.recursive);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Whether the watcher runs at all.
    pub enabled: bool,

    /// Quiet period in milliseconds before a change event is acted on.
    pub debounce_ms: u64,

    /// Whether to watch subdirectories recursively.
    pub recursive: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 2000,
            recursive: true,
        }
    }
}

/// Configuration for the HTTP boundary.
///
/// # Examples
///
/// ```
/// use shelf_core::ServerConfig;
///
/// let config = ServerConfig::default();
/// assert_eq!(config.bind_addr(), "0.0.0.0:3000");
/// assert!(config.admin_token.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind; empty means all interfaces.
    pub host: String,

    /// TCP port to listen on.
    pub port: u16,

    /// Shared secret required on the scan-trigger endpoint. `None`
    /// disables the check (local deployments).
    pub admin_token: Option<String>,
}

impl ServerConfig {
    /// Returns the bind address for the listener.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        let host = if self.host.is_empty() {
            "0.0.0.0"
        } else {
            &self.host
        };
        format!("{host}:{port}", port = self.effective_port())
    }

    fn effective_port(&self) -> u16 {
        if self.port == 0 { 3000 } else { self.port }
    }
}

/// Root configuration for the scoreshelf server.
///
/// # Examples
///
/// ```
/// use shelf_core::Config;
///
/// let config = Config::default();
/// let json = serde_json::to_string_pretty(&config).unwrap();
/// assert!(json.contains("debounce_ms"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Library (root + catalog) configuration.
    pub library: LibraryConfig,

    /// File watcher configuration.
    pub watch: WatchConfig,

    /// HTTP server configuration.
    pub server: ServerConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_library_config_defaults() {
        let config = LibraryConfig::default();
        assert_eq!(config.file_extensions, vec!["pdf"]);
        assert_eq!(config.db_path.as_str(), "./data/scores.db");
    }

    #[test]
    fn test_matches_extension_is_case_insensitive() {
        let config = LibraryConfig::default();
        assert!(config.matches_extension("pdf"));
        assert!(config.matches_extension("PDF"));
        assert!(!config.matches_extension("txt"));
    }

    #[test]
    fn test_watch_config_defaults() {
        let config = WatchConfig::default();
        assert!(config.enabled);
        assert_eq!(config.debounce_ms, 2000);
        assert!(config.recursive);
    }

    #[test]
    fn test_server_bind_addr_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");

        let custom = ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            admin_token: None,
        };
        assert_eq!(custom.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_prepare_root_creates_missing_directory() {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().join("notes")).expect("utf8 path");
        let config = LibraryConfig {
            root_path: root.clone(),
            ..LibraryConfig::default()
        };

        config.prepare_root().expect("root created");
        assert!(root.is_dir());
    }

    #[test]
    fn test_prepare_root_rejects_file() {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().join("not-a-dir")).expect("utf8 path");
        std::fs::write(&root, b"file").expect("write");

        let config = LibraryConfig {
            root_path: root,
            ..LibraryConfig::default()
        };
        assert!(matches!(
            config.prepare_root(),
            Err(ConfigError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"watch": {"debounce_ms": 500}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.watch.debounce_ms, 500);
        // Other fields should have defaults
        assert!(config.watch.recursive);
        assert_eq!(config.library.file_extensions, vec!["pdf"]);
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }
}
