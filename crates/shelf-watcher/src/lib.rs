//! Debounced library watching with async event streaming.
//!
//! This crate detects changes in the score library via the `notify` crate,
//! debounced through `notify-debouncer-mini` and bridged to an async tokio
//! context for the server's live-update loop.
//!
//! The debounce window (2 seconds by default) serves as write
//! stabilization: large PDFs copied over the network keep resetting the
//! window while bytes are still arriving, so the reconciler only sees the
//! file once it has settled.
//!
//! # Usage
//!
//! ```no_run
//! use shelf_watcher::{LibraryWatcher, ScoreFilter, WatchKind};
//! use shelf_core::WatchConfig;
//! use camino::Utf8Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = WatchConfig::default();
//!     let filter = ScoreFilter::new(&["pdf".to_owned()]);
//!     let mut watcher = LibraryWatcher::new(Utf8Path::new("./scores"), &config, filter).await?;
//!
//!     while let Some(event) = watcher.recv().await {
//!         match event.kind {
//!             WatchKind::Changed => println!("reconcile: {}", event.path),
//!             WatchKind::Removed => println!("remove: {}", event.path),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod filter;
pub mod watcher;

pub use error::WatchError;
pub use events::{WatchEvent, WatchEventBatch, WatchKind};
pub use filter::{AcceptAllFilter, ScoreFilter, WatchFilter};
pub use watcher::LibraryWatcher;
