//! SQLite-backed catalog of indexed scores.
//!
//! This crate owns identity, lookup, and search for the score catalog.
//! The catalog is the single shared mutable resource in the system: the
//! scanner, the watcher worker, and the HTTP layer all read and write it
//! concurrently, so every mutation funnels through one serialized
//! connection.
//!
//! # Overview
//!
//! The main entry point is [`Catalog`]:
//!
//! - [`Catalog::open`] / [`Catalog::open_in_memory`]: connection + schema
//! - [`Catalog::upsert`]: insert-or-update keyed on the relative path
//! - [`Catalog::list`]: filtered, ordered listings for the API
//! - [`Catalog::relative_paths`]: consistent snapshot for the scanner's
//!   vanished-file diff
//!
//! # Concurrency
//!
//! The rusqlite connection sits behind a [`parking_lot::Mutex`]; writers
//! are serialized (no lost updates on the same path) and readers take the
//! same lock for simplicity. The database runs in WAL mode with a busy
//! timeout so a second process inspecting the file does not wedge the
//! server. Callers must not hold the lock across slow work: page-count
//! extraction happens entirely outside this crate.

#![deny(clippy::all)]
#![warn(missing_docs)]

mod catalog;
mod error;

pub use catalog::Catalog;
pub use error::CatalogError;
