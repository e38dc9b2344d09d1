//! Event filtering for watch events.
//!
//! Events are filtered in the blocking watcher thread, before they reach
//! the channel. Editor lock files, temp files from in-flight copies, and
//! the database's own WAL files all generate notify events that must
//! never reach the reconciler.

use camino::{Utf8Path, Utf8PathBuf};
use smallvec::SmallVec;

/// A predicate deciding which watch events reach the event channel.
///
/// Filters run on the blocking watcher thread, so they must be [`Send`],
/// [`Sync`], and `'static`.
pub trait WatchFilter: Send + Sync + 'static {
    /// Returns `true` if an event for `path` should be forwarded.
    fn should_process(&self, path: &Utf8Path) -> bool;
}

/// A filter that accepts every event. Used by tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllFilter;

impl WatchFilter for AcceptAllFilter {
    #[inline]
    fn should_process(&self, _path: &Utf8Path) -> bool {
        true
    }
}

/// The library filter: indexed extensions only, no hidden files.
///
/// Mirrors the scan-time rules so the watcher and the full scan agree on
/// what counts as a score:
///
/// - the extension must match one of the configured extensions,
///   case-insensitively
/// - no path component below the watched root may start with a dot
///
/// Events arrive with absolute paths, so the hidden-component check only
/// applies to the part under the root; a library living inside a hidden
/// directory (say `~/.local/share/scores`) is not filtered away.
///
/// # Examples
///
/// ```
/// use shelf_watcher::{ScoreFilter, WatchFilter};
/// use camino::{Utf8Path, Utf8PathBuf};
///
/// let filter = ScoreFilter::new(&["pdf".to_owned()])
///     .scoped_to(Utf8PathBuf::from("/scores"));
/// assert!(filter.should_process(Utf8Path::new("/scores/bach/a.pdf")));
/// assert!(filter.should_process(Utf8Path::new("/scores/B.PDF")));
/// assert!(!filter.should_process(Utf8Path::new("/scores/notes.txt")));
/// assert!(!filter.should_process(Utf8Path::new("/scores/.hidden/a.pdf")));
/// ```
#[derive(Debug, Clone)]
pub struct ScoreFilter {
    /// Accepted extensions, without the leading dot.
    extensions: SmallVec<[String; 4]>,

    /// Root whose prefix is exempt from the hidden-component check.
    root: Option<Utf8PathBuf>,
}

impl ScoreFilter {
    /// Creates a filter accepting the given extensions.
    #[must_use]
    pub fn new(extensions: &[String]) -> Self {
        Self {
            extensions: extensions.iter().cloned().collect(),
            root: None,
        }
    }

    /// Restricts the hidden-component check to the part of the path
    /// below `root`.
    #[must_use]
    pub fn scoped_to(mut self, root: Utf8PathBuf) -> Self {
        self.root = Some(root);
        self
    }

    fn has_indexed_extension(&self, path: &Utf8Path) -> bool {
        path.extension()
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    fn has_hidden_component(&self, path: &Utf8Path) -> bool {
        let scoped = self
            .root
            .as_deref()
            .and_then(|root| path.strip_prefix(root).ok())
            .unwrap_or(path);

        scoped.components().any(|c| {
            let name = c.as_str();
            name.starts_with('.') && name != "." && name != ".."
        })
    }
}

impl WatchFilter for ScoreFilter {
    fn should_process(&self, path: &Utf8Path) -> bool {
        self.has_indexed_extension(path) && !self.has_hidden_component(path)
    }
}

impl<F: WatchFilter + ?Sized> WatchFilter for Box<F> {
    fn should_process(&self, path: &Utf8Path) -> bool {
        (**self).should_process(path)
    }
}

impl<F: WatchFilter + ?Sized> WatchFilter for std::sync::Arc<F> {
    fn should_process(&self, path: &Utf8Path) -> bool {
        (**self).should_process(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf_filter() -> ScoreFilter {
        ScoreFilter::new(&["pdf".to_owned()])
    }

    #[test]
    fn test_accept_all_filter() {
        assert!(AcceptAllFilter.should_process(Utf8Path::new("anything.tmp")));
    }

    #[test]
    fn test_score_filter_accepts_indexed_extensions() {
        let filter = pdf_filter();
        assert!(filter.should_process(Utf8Path::new("/scores/a.pdf")));
        assert!(filter.should_process(Utf8Path::new("/scores/sub/B.PDF")));
    }

    #[test]
    fn test_score_filter_rejects_other_extensions() {
        let filter = pdf_filter();
        assert!(!filter.should_process(Utf8Path::new("/scores/a.pdf.tmp")));
        assert!(!filter.should_process(Utf8Path::new("/scores/notes.txt")));
        assert!(!filter.should_process(Utf8Path::new("/scores/Makefile")));
    }

    #[test]
    fn test_score_filter_rejects_hidden_paths() {
        let filter = pdf_filter();
        assert!(!filter.should_process(Utf8Path::new("/scores/.trash/a.pdf")));
        assert!(!filter.should_process(Utf8Path::new("/scores/.a.pdf")));
    }

    #[test]
    fn test_score_filter_allows_relative_dot_components() {
        let filter = pdf_filter();
        assert!(filter.should_process(Utf8Path::new("./scores/a.pdf")));
    }

    #[test]
    fn test_score_filter_exempts_hidden_root_prefix() {
        let filter = pdf_filter().scoped_to(Utf8PathBuf::from("/home/u/.local/scores"));
        assert!(filter.should_process(Utf8Path::new("/home/u/.local/scores/bach/a.pdf")));
        assert!(!filter.should_process(Utf8Path::new("/home/u/.local/scores/.trash/a.pdf")));
    }

    #[test]
    fn test_boxed_and_arc_filters() {
        let boxed: Box<dyn WatchFilter> = Box::new(pdf_filter());
        assert!(boxed.should_process(Utf8Path::new("a.pdf")));

        let shared = std::sync::Arc::new(pdf_filter());
        assert!(shared.should_process(Utf8Path::new("a.pdf")));
    }
}
