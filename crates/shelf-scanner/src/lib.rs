//! Directory scanning and catalog reconciliation for scoreshelf.
//!
//! This crate owns the write path of the catalog. A [`Library`] wraps the
//! root directory and the shared [`Catalog`](shelf_store::Catalog) and
//! exposes two entry points that both funnel into one reconciliation
//! primitive:
//!
//! - [`Library::scan`]: full recursive walk, reconciling every matching
//!   file and removing records for files the walk no longer observed
//! - [`Library::reconcile_file`] / [`Library::remove_file`]: targeted
//!   single-file updates driven by filesystem watch events
//!
//! At most one full scan runs at a time; a second request fails fast with
//! [`ScanError::AlreadyScanning`] instead of queueing.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use camino::Utf8Path;
//! use shelf_scanner::Library;
//! use shelf_store::Catalog;
//!
//! let catalog = Arc::new(Catalog::open(Utf8Path::new("./data/scores.db"))?);
//! let library = Library::new(Utf8Path::new("./scores"), catalog, &["pdf".to_owned()])?;
//! let report = library.scan()?;
//! println!("indexed {} files", report.scanned);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod pages;
pub mod walker;

pub use error::ScanError;
pub use pages::extract_page_count;
pub use walker::ScoreWalker;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info, warn};

use shelf_core::{FxHashSet, NewScore, ScanReport, paths, system_time_millis};
use shelf_store::Catalog;

/// What a single-file reconciliation did to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The file was not in the catalog; a record was inserted.
    Added,
    /// The file's mtime changed; its record was rewritten.
    Updated,
    /// The stored mtime matches the filesystem; nothing was written.
    Unchanged,
}

/// The indexed score library: a root directory plus the shared catalog.
///
/// The root is canonicalized at construction so every subsequent
/// containment check compares against a stable absolute path. Cloning is
/// cheap via the shared [`Catalog`] handle; the scan-in-flight flag is
/// per-instance, so clones that must share mutual exclusion should share
/// the `Library` behind an `Arc` instead.
#[derive(Debug)]
pub struct Library {
    /// Canonical absolute root of the library tree.
    root: Utf8PathBuf,
    /// Shared catalog handle.
    catalog: Arc<Catalog>,
    /// Extensions to index, without the leading dot.
    extensions: Vec<String>,
    /// Set while a full scan is in flight.
    scanning: AtomicBool,
}

/// Resets the scan-in-flight flag when a scan exits, on any path.
struct ScanGuard<'a>(&'a AtomicBool);

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Library {
    /// Creates a library over `root` backed by `catalog`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] when the root does not exist, is not
    /// a directory, or cannot be canonicalized.
    pub fn new(
        root: &Utf8Path,
        catalog: Arc<Catalog>,
        extensions: &[String],
    ) -> Result<Self, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::config(format!(
                "library root is not a directory: {root}"
            )));
        }

        let canonical = root
            .as_std_path()
            .canonicalize()
            .map_err(|source| ScanError::stat(root, source))?;
        let root = Utf8PathBuf::from_path_buf(canonical).map_err(ScanError::NonUtf8Path)?;

        Ok(Self {
            root,
            catalog,
            extensions: extensions.to_vec(),
            scanning: AtomicBool::new(false),
        })
    }

    /// Returns the canonical library root.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Returns the shared catalog handle.
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Returns `true` while a full scan is in flight.
    #[inline]
    #[must_use]
    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::Acquire)
    }

    /// Runs a full scan of the library tree.
    ///
    /// The walk reconciles every matching file, then removes catalog
    /// records whose files the walk did not observe. The removal diff is
    /// computed against a snapshot of the catalog taken *before* the walk
    /// starts: a file indexed concurrently by a watch event during the
    /// walk is absent from the snapshot and therefore never removed.
    ///
    /// Per-file failures (vanished files, guard rejections, non-UTF-8
    /// paths) are logged and skipped; the scan keeps going.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::AlreadyScanning`] when a scan is already in
    /// flight, [`ScanError::Walk`] when traversal fails, and
    /// [`ScanError::Store`] when the catalog fails.
    pub fn scan(&self) -> Result<ScanReport, ScanError> {
        if self
            .scanning
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ScanError::AlreadyScanning);
        }
        let _guard = ScanGuard(&self.scanning);

        info!(root = %self.root, "Starting full scan");

        // Snapshot before walking; see the method docs for why.
        let known: FxHashSet<Utf8PathBuf> = self.catalog.relative_paths()?;

        let walker = ScoreWalker::new(&self.root, &self.extensions)?;
        let paths = walker.collect_paths()?;

        let mut report = ScanReport::default();
        let mut observed: FxHashSet<Utf8PathBuf> = FxHashSet::default();

        for path in &paths {
            match self.reconcile_path(path) {
                Ok((relative, outcome)) => {
                    report.scanned += 1;
                    match outcome {
                        ReconcileOutcome::Added => report.added += 1,
                        ReconcileOutcome::Updated => report.updated += 1,
                        ReconcileOutcome::Unchanged => {}
                    }
                    observed.insert(relative);
                }
                Err(error) if error.is_per_file() => {
                    warn!(path = %path, error = %error, "Skipping file");
                }
                Err(error) => return Err(error),
            }
        }

        for stale in known.difference(&observed) {
            if self.catalog.delete(stale)? {
                debug!(path = %stale, "Removed vanished score");
                report.removed += 1;
            }
        }

        info!(
            scanned = report.scanned,
            added = report.added,
            updated = report.updated,
            removed = report.removed,
            "Scan complete"
        );
        Ok(report)
    }

    /// Reconciles a single file, typically in response to a watch event.
    ///
    /// `path` may be absolute (as delivered by the watcher) or relative to
    /// the root. The path is confined to the root before any catalog
    /// access.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Guard`] when the path escapes the root or no
    /// longer exists, [`ScanError::Stat`] when metadata cannot be read,
    /// and [`ScanError::Store`] when the catalog fails.
    pub fn reconcile_file(&self, path: &Utf8Path) -> Result<ReconcileOutcome, ScanError> {
        let absolute = if path.is_absolute() {
            path.to_owned()
        } else {
            self.root.join(path)
        };
        let (_, outcome) = self.reconcile_path(&absolute)?;
        Ok(outcome)
    }

    /// Removes the catalog record for a file that no longer exists.
    ///
    /// Returns `true` when a record was removed. The path is not confined
    /// (the file is gone, so canonicalization would fail); the catalog
    /// lookup by relative path is harmless for paths never indexed.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Store`] when the catalog fails.
    pub fn remove_file(&self, path: &Utf8Path) -> Result<bool, ScanError> {
        let relative = match path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_owned(),
            Err(_) => path.to_owned(),
        };

        let removed = self.catalog.delete(&relative)?;
        if removed {
            info!(path = %relative, "Removed score");
        }
        Ok(removed)
    }

    /// The shared reconciliation primitive.
    ///
    /// Confines the path, stats it, short-circuits on an unchanged mtime,
    /// extracts the page count (with no catalog lock held), and upserts.
    fn reconcile_path(
        &self,
        path: &Utf8Path,
    ) -> Result<(Utf8PathBuf, ReconcileOutcome), ScanError> {
        let canonical = paths::confine(&self.root, path)?;
        let relative = canonical
            .strip_prefix(&self.root)
            .map_or_else(|_| canonical.clone(), camino::Utf8Path::to_owned);

        let metadata =
            std::fs::metadata(&canonical).map_err(|source| ScanError::stat(&canonical, source))?;
        let modified_at = metadata
            .modified()
            .map(system_time_millis)
            .map_err(|source| ScanError::stat(&canonical, source))?;

        let existing = self.catalog.get_by_path(&relative)?;
        if let Some(score) = &existing {
            if score.modified_at == modified_at {
                debug!(path = %relative, "Score unchanged");
                return Ok((relative, ReconcileOutcome::Unchanged));
            }
        }

        let pages = pages::extract_page_count(&canonical);

        let filename = relative
            .file_name()
            .map_or_else(|| relative.to_string(), ToOwned::to_owned);
        let folder = relative
            .parent()
            .map_or_else(String::new, |p| p.to_string());

        self.catalog.upsert(&NewScore {
            filename,
            relative_path: relative.clone(),
            folder,
            file_size: metadata.len(),
            modified_at,
            pages,
        })?;

        let outcome = if existing.is_some() {
            ReconcileOutcome::Updated
        } else {
            ReconcileOutcome::Added
        };
        debug!(path = %relative, ?outcome, "Reconciled score");
        Ok((relative, outcome))
    }
}
