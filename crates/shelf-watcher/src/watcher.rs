//! Library watcher with async event streaming.
//!
//! This module provides the [`LibraryWatcher`] type that bridges the
//! synchronous `notify` file watching crate to the async tokio runtime.
//!
//! # Architecture
//!
//! The `notify` debouncer runs on a blocking thread (via `spawn_blocking`)
//! and pushes filtered [`WatchEvent`]s into a bounded tokio mpsc channel.
//! The async side consumes events with [`LibraryWatcher::recv`] and shuts
//! the blocking thread down through a oneshot signal.
//!
//! The debounce window (2 seconds by default) doubles as write
//! stabilization: a PDF still being copied keeps resetting the window, so
//! the event only fires once the file has been quiet for the full window.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use notify::RecursiveMode;
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use shelf_core::WatchConfig;

use crate::error::WatchError;
use crate::events::{WatchEvent, WatchKind};
use crate::filter::WatchFilter;

/// Default channel capacity for watch events.
const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// A library watcher that streams debounced events to an async context.
///
/// # Lifecycle
///
/// 1. [`LibraryWatcher::new`] validates the root, creates channels, and
///    spawns the blocking notify task.
/// 2. [`LibraryWatcher::recv`] yields filtered events.
/// 3. [`LibraryWatcher::shutdown`] signals the blocking task and awaits
///    it; dropping the watcher signals without awaiting.
///
/// # Examples
///
/// ```no_run
/// use shelf_watcher::{LibraryWatcher, ScoreFilter, WatchKind};
/// use shelf_core::WatchConfig;
/// use camino::Utf8Path;
///
/// # async fn example() -> Result<(), shelf_watcher::WatchError> {
/// let config = WatchConfig::default();
/// let filter = ScoreFilter::new(&["pdf".to_owned()]);
/// let mut watcher = LibraryWatcher::new(Utf8Path::new("./scores"), &config, filter).await?;
///
/// while let Some(event) = watcher.recv().await {
///     match event.kind {
///         WatchKind::Changed => println!("changed: {}", event.path),
///         WatchKind::Removed => println!("removed: {}", event.path),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct LibraryWatcher {
    /// Shutdown signal sender; `None` once shutdown is initiated.
    shutdown_tx: Option<oneshot::Sender<()>>,

    /// Handle to the blocking watcher task, awaited during shutdown.
    task_handle: Option<JoinHandle<Result<(), WatchError>>>,

    /// Event receiver for async consumption.
    event_rx: mpsc::Receiver<WatchEvent>,

    /// The root being watched.
    watch_path: Utf8PathBuf,
}

impl std::fmt::Debug for LibraryWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryWatcher")
            .field("watch_path", &self.watch_path)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl LibraryWatcher {
    /// Creates a new watcher over `path`.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PathNotFound`] if the path doesn't exist and
    /// [`WatchError::Notify`] if the watcher fails to initialize.
    #[allow(clippy::unused_async)] // Async for API consistency with shutdown()
    pub async fn new<F: WatchFilter>(
        path: &Utf8Path,
        config: &WatchConfig,
        filter: F,
    ) -> Result<Self, WatchError> {
        Self::with_capacity(path, config, filter, DEFAULT_CHANNEL_CAPACITY).await
    }

    /// Creates a watcher with a custom event channel capacity.
    ///
    /// A larger capacity absorbs bulk library copies without the blocking
    /// thread stalling on a full channel.
    ///
    /// # Errors
    ///
    /// Same contract as [`LibraryWatcher::new`].
    #[allow(clippy::unused_async)] // Async for API consistency with shutdown()
    pub async fn with_capacity<F: WatchFilter>(
        path: &Utf8Path,
        config: &WatchConfig,
        filter: F,
        channel_capacity: usize,
    ) -> Result<Self, WatchError> {
        if !path.exists() {
            return Err(WatchError::path_not_found(path));
        }

        let watch_path = path.canonicalize_utf8().map_err(WatchError::Io)?;

        let (event_tx, event_rx) = mpsc::channel(channel_capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task_path = watch_path.clone();
        let debounce_ms = config.debounce_ms;
        let recursive = config.recursive;

        let task_handle = tokio::task::spawn_blocking(move || {
            run_watcher_loop(
                task_path,
                debounce_ms,
                recursive,
                event_tx,
                shutdown_rx,
                filter,
            )
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            task_handle: Some(task_handle),
            event_rx,
            watch_path,
        })
    }

    /// Receives the next watch event.
    ///
    /// Returns `None` when the watcher has been shut down or the channel
    /// is closed.
    pub async fn recv(&mut self) -> Option<WatchEvent> {
        self.event_rx.recv().await
    }

    /// Tries to receive a watch event without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`mpsc::error::TryRecvError::Empty`] when no event is
    /// queued and [`mpsc::error::TryRecvError::Disconnected`] when the
    /// watcher has stopped.
    pub fn try_recv(&mut self) -> Result<WatchEvent, mpsc::error::TryRecvError> {
        self.event_rx.try_recv()
    }

    /// Returns a mutable reference to the event receiver, for use with
    /// `tokio::select!`.
    pub fn events(&mut self) -> &mut mpsc::Receiver<WatchEvent> {
        &mut self.event_rx
    }

    /// Returns the canonical root being watched.
    #[must_use]
    pub fn watch_path(&self) -> &Utf8Path {
        &self.watch_path
    }

    /// Returns `true` if the watcher is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some() && self.task_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Gracefully shuts down the watcher and awaits the blocking task.
    ///
    /// # Errors
    ///
    /// Returns any error the watcher thread hit, or
    /// [`WatchError::ChannelClosed`] if the task panicked.
    pub async fn shutdown(mut self) -> Result<(), WatchError> {
        if let Some(tx) = self.shutdown_tx.take() {
            // Ignore error if receiver is already dropped
            let _ = tx.send(());
        }

        if let Some(handle) = self.task_handle.take() {
            match handle.await {
                Ok(result) => result?,
                Err(_join_error) => return Err(WatchError::ChannelClosed),
            }
        }

        Ok(())
    }
}

impl Drop for LibraryWatcher {
    fn drop(&mut self) {
        // Signal shutdown; the task stops on its own since Drop is sync.
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Runs the notify debouncer in a blocking context, forwarding filtered
/// events to the async channel until the shutdown signal arrives.
#[allow(clippy::needless_pass_by_value)] // Path must be owned for the blocking task lifetime
fn run_watcher_loop<F: WatchFilter>(
    path: Utf8PathBuf,
    debounce_ms: u64,
    recursive: bool,
    event_tx: mpsc::Sender<WatchEvent>,
    shutdown_rx: oneshot::Receiver<()>,
    filter: F,
) -> Result<(), WatchError> {
    let timeout = Duration::from_millis(debounce_ms);

    let tx = event_tx;
    let debouncer_result: Result<Debouncer<notify::RecommendedWatcher>, notify::Error> =
        new_debouncer(timeout, move |res: DebounceEventResult| match res {
            Ok(events) => {
                for event in events {
                    let utf8_path = match Utf8PathBuf::try_from(event.path) {
                        Ok(p) => p,
                        Err(e) => {
                            let invalid_path = e.into_path_buf();
                            tracing::warn!(
                                path = %invalid_path.display(),
                                "Skipping non-UTF-8 path in watch event"
                            );
                            continue;
                        }
                    };

                    if !filter.should_process(&utf8_path) {
                        tracing::trace!(path = %utf8_path, "Filtered out watch event");
                        continue;
                    }

                    // The debouncer does not report what happened, only
                    // that something did; existence after the window
                    // decides between changed and removed.
                    let kind = if utf8_path.exists() {
                        WatchKind::Changed
                    } else {
                        WatchKind::Removed
                    };

                    if tx.blocking_send(WatchEvent::new(utf8_path, kind)).is_err() {
                        tracing::debug!("Event channel closed, stopping watcher");
                        break;
                    }
                }
            }
            Err(error) => {
                tracing::warn!(error = %error, "Debouncer error");
            }
        });

    let mut debouncer = debouncer_result?;

    let mode = if recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };

    debouncer.watcher().watch(path.as_std_path(), mode)?;

    tracing::info!(path = %path, recursive, debounce_ms, "Library watcher started");

    // Block until the shutdown signal arrives (or the sender drops).
    let _ = shutdown_rx.blocking_recv();

    tracing::info!(path = %path, "Library watcher stopped");

    Ok(())
}
