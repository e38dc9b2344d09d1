//! Domain types for indexed scores.
//!
//! This module provides the catalog record types shared by the scanner,
//! store, watcher, and server crates.

use std::time::{SystemTime, UNIX_EPOCH};

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// A stable identifier for an indexed score.
///
/// Derived deterministically from the score's path relative to the library
/// root: the same path always yields the same id across restarts and
/// re-scans. The id is the first 16 hex characters of the blake3 hash of
/// the relative path, giving 64 bits of output; the chance of two distinct
/// paths colliding is about 2^-64 per pair, negligible for any realistic
/// library size.
///
/// # Examples
///
/// ```
/// use shelf_core::ScoreId;
/// use camino::Utf8Path;
///
/// let a = ScoreId::from_relative_path(Utf8Path::new("sub/b.pdf"));
/// let b = ScoreId::from_relative_path(Utf8Path::new("sub/b.pdf"));
/// let c = ScoreId::from_relative_path(Utf8Path::new("a.pdf"));
///
/// assert_eq!(a, b);
/// assert_ne!(a, c);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreId(String);

/// Number of hex characters kept from the blake3 digest.
const ID_HEX_LEN: usize = 16;

impl ScoreId {
    /// Derives the identifier for the given root-relative path.
    #[must_use]
    pub fn from_relative_path(relative_path: &Utf8Path) -> Self {
        let digest = blake3::hash(relative_path.as_str().as_bytes());
        let mut hex = digest.to_hex().to_string();
        hex.truncate(ID_HEX_LEN);
        Self(hex)
    }

    /// Wraps an already-derived identifier string.
    ///
    /// Used when reading records back from the catalog; no validation is
    /// performed beyond ownership.
    #[inline]
    #[must_use]
    pub fn from_raw(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScoreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ScoreId> for String {
    #[inline]
    fn from(id: ScoreId) -> Self {
        id.0
    }
}

/// A score record as stored in the catalog.
///
/// The catalog is a cache of filesystem state, not a ledger: a record's
/// presence claims the file existed at `indexed_at`, but callers must
/// tolerate staleness and re-check existence at serve time.
///
/// Timestamps are unix epoch milliseconds. `modified_at` mirrors the
/// filesystem mtime and is the change-detection key: an unchanged mtime
/// means the stored page count is still valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    /// Stable identifier derived from `relative_path`.
    pub id: ScoreId,

    /// File name without directory components.
    pub filename: String,

    /// Path relative to the library root.
    pub relative_path: Utf8PathBuf,

    /// Parent folder relative to the root; empty string for root-level files.
    pub folder: String,

    /// File size in bytes at index time.
    pub file_size: u64,

    /// Filesystem mtime in unix milliseconds (source of truth for change
    /// detection).
    pub modified_at: i64,

    /// Extracted page count; `None` when extraction failed or has not run.
    pub pages: Option<u32>,

    /// When this record was last written by the catalog, unix milliseconds.
    pub indexed_at: i64,
}

/// A score observed on disk, ready to be upserted into the catalog.
///
/// The store derives `id` and `indexed_at` itself; everything else comes
/// from the reconciliation primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScore {
    /// File name without directory components.
    pub filename: String,

    /// Path relative to the library root.
    pub relative_path: Utf8PathBuf,

    /// Parent folder relative to the root; empty string for root-level files.
    pub folder: String,

    /// File size in bytes.
    pub file_size: u64,

    /// Filesystem mtime in unix milliseconds.
    pub modified_at: i64,

    /// Extracted page count, if extraction succeeded.
    pub pages: Option<u32>,
}

/// Counters reported by a completed full scan.
///
/// `scanned` counts every matching file the walk visited, including files
/// whose records were already up to date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Matching files visited by the walk.
    pub scanned: u64,

    /// Files indexed for the first time.
    pub added: u64,

    /// Files whose records were rewritten because their mtime changed.
    pub updated: u64,

    /// Catalogued files the walk no longer observed, removed from the catalog.
    pub removed: u64,
}

/// Returns the current wall-clock time as unix epoch milliseconds.
#[must_use]
pub fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

/// Converts a filesystem timestamp to unix epoch milliseconds.
///
/// Timestamps before the epoch collapse to 0; they do not occur on the
/// filesystems this tool targets.
#[must_use]
pub fn system_time_millis(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_id_is_deterministic() {
        let a = ScoreId::from_relative_path(Utf8Path::new("bach/invention_01.pdf"));
        let b = ScoreId::from_relative_path(Utf8Path::new("bach/invention_01.pdf"));
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), ID_HEX_LEN);
    }

    #[test]
    fn test_score_id_differs_per_path() {
        let a = ScoreId::from_relative_path(Utf8Path::new("a.pdf"));
        let b = ScoreId::from_relative_path(Utf8Path::new("b.pdf"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_score_id_is_lowercase_hex() {
        let id = ScoreId::from_relative_path(Utf8Path::new("sub/b.pdf"));
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!id.as_str().chars().any(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_score_serializes_camel_case() {
        let score = Score {
            id: ScoreId::from_relative_path(Utf8Path::new("a.pdf")),
            filename: "a.pdf".to_owned(),
            relative_path: Utf8PathBuf::from("a.pdf"),
            folder: String::new(),
            file_size: 512,
            modified_at: 1_700_000_000_000,
            pages: Some(3),
            indexed_at: 1_700_000_000_500,
        };

        let json = serde_json::to_value(&score).unwrap();
        assert!(json.get("relativePath").is_some());
        assert!(json.get("fileSize").is_some());
        assert!(json.get("modifiedAt").is_some());
        assert!(json.get("indexedAt").is_some());
    }

    #[test]
    fn test_unix_millis_is_recent() {
        // Any plausible "now" is far past 2020-01-01.
        assert!(unix_millis() > 1_577_836_800_000);
    }

    #[test]
    fn test_system_time_millis_epoch() {
        assert_eq!(system_time_millis(UNIX_EPOCH), 0);
    }
}
