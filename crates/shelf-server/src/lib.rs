//! HTTP API for browsing and streaming indexed scores.
//!
//! This crate is the read boundary of the system plus one guarded write
//! operation (the scan trigger). It never touches the filesystem except
//! through the path guard: every file request re-validates the stored
//! relative path against the library root before a byte is read.
//!
//! # Routes
//!
//! | Method | Path                   | Purpose                            |
//! |--------|------------------------|------------------------------------|
//! | GET    | `/api/scores`          | list, with `search`/`folder` filters |
//! | GET    | `/api/scores/:id`      | one record plus an `exists` flag   |
//! | GET    | `/api/scores/:id/file` | file bytes, `Range` honored        |
//! | POST   | `/api/scores/scan`     | full scan, admin token guarded     |
//! | GET    | `/api/folders`         | distinct folders                   |
//! | GET    | `/api/health`          | root accessibility + score count   |

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod handlers;
pub mod range;
pub mod routes;

pub use error::ApiError;
pub use routes::create_router;

use std::sync::Arc;

use shelf_scanner::Library;
use shelf_store::Catalog;

/// Shared state for the API server.
#[derive(Clone)]
pub struct AppState {
    /// The scanned library (root, reconciliation, scan guard).
    pub library: Arc<Library>,

    /// Direct catalog handle for the read path.
    pub catalog: Arc<Catalog>,

    /// Shared secret required by mutating endpoints; `None` disables the
    /// check (local single-user deployments).
    pub admin_token: Option<String>,
}

impl AppState {
    /// Creates server state over an existing library.
    #[must_use]
    pub fn new(library: Arc<Library>, admin_token: Option<String>) -> Self {
        let catalog = Arc::clone(library.catalog());
        Self {
            library,
            catalog,
            admin_token,
        }
    }
}
