//! Event types for library change notifications.
//!
//! Events are emitted by the watcher after debouncing. The debouncer
//! collapses rapid successive changes (a PDF being written in chunks, a
//! network copy in flight) into one event per path per window.

use camino::Utf8PathBuf;
use smallvec::SmallVec;
use std::time::Instant;

/// What happened to the file, as far as the debounced watcher can tell.
///
/// The debouncer intentionally abstracts create/modify/rename details, so
/// the kind is derived from whether the path still exists when the
/// debounce window closes. A file created and deleted within one window
/// therefore surfaces as [`WatchKind::Removed`], which is the correct
/// final state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchKind {
    /// The file exists; it was created or modified.
    Changed,
    /// The file no longer exists.
    Removed,
}

/// A debounced library change event with a UTF-8 path guarantee.
///
/// # Examples
///
/// ```
/// use shelf_watcher::{WatchEvent, WatchKind};
/// use camino::Utf8PathBuf;
///
/// let event = WatchEvent::new(Utf8PathBuf::from("/scores/a.pdf"), WatchKind::Changed);
/// assert_eq!(event.path.as_str(), "/scores/a.pdf");
/// assert_eq!(event.kind, WatchKind::Changed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    /// Absolute path of the affected file.
    pub path: Utf8PathBuf,

    /// Whether the file exists after the debounce window.
    pub kind: WatchKind,

    /// When this event was emitted. Monotonic, for elapsed-time measures.
    pub timestamp: Instant,
}

impl WatchEvent {
    /// Creates a new event for the given path.
    #[inline]
    #[must_use]
    pub fn new(path: Utf8PathBuf, kind: WatchKind) -> Self {
        Self {
            path,
            kind,
            timestamp: Instant::now(),
        }
    }

    /// Returns the file extension, if any.
    #[inline]
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.path.extension()
    }

    /// Returns the file name without directory components.
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name()
    }
}

/// A batch of watch events drained together.
///
/// The consumer drains the channel between reconciliations; a bulk copy
/// into the library can emit many events in one debounce window. Inline
/// storage covers the common small batch without a heap allocation.
#[derive(Debug, Clone, Default)]
pub struct WatchEventBatch {
    /// The events in this batch.
    pub events: SmallVec<[WatchEvent; 8]>,
}

impl WatchEventBatch {
    /// Creates a new empty batch.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an event to the batch.
    #[inline]
    pub fn push(&mut self, event: WatchEvent) {
        self.events.push(event);
    }

    /// Returns the number of events in this batch.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if the batch contains no events.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the events deduplicated by path, keeping the last event
    /// per path.
    ///
    /// A file changed and then removed within one drain must reconcile as
    /// removed, so later events win.
    #[must_use]
    pub fn coalesced(&self) -> Vec<&WatchEvent> {
        let mut latest: Vec<&WatchEvent> = Vec::with_capacity(self.events.len());
        for event in &self.events {
            if let Some(slot) = latest.iter_mut().find(|e| e.path == event.path) {
                *slot = event;
            } else {
                latest.push(event);
            }
        }
        latest
    }
}

impl FromIterator<WatchEvent> for WatchEventBatch {
    fn from_iter<T: IntoIterator<Item = WatchEvent>>(iter: T) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for WatchEventBatch {
    type Item = WatchEvent;
    type IntoIter = smallvec::IntoIter<[WatchEvent; 8]>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}
