//! Core types, errors, and utilities for the scoreshelf library server.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - Configuration structures for the library, watcher, and server
//! - Domain types ([`Score`], [`ScoreId`], [`ScanReport`])
//! - The path guard ([`paths::resolve_within`]) that confines every
//!   catalog-relative path to the indexed root
//! - Type aliases for `FxHashMap`/`FxHashSet` (faster than std)

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod paths;
pub mod types;

pub use config::{Config, LibraryConfig, ServerConfig, WatchConfig};
pub use error::ConfigError;
pub use hash::{FxHashMap, FxHashSet};
pub use paths::{PathGuardError, resolve_within};
pub use types::{NewScore, ScanReport, Score, ScoreId, system_time_millis, unix_millis};
