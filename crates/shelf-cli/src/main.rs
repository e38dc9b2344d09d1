//! CLI entry point for the scoreshelf library server.
//!
//! # Usage
//!
//! ```bash
//! scoreshelf [OPTIONS] <COMMAND>
//!
//! # One-shot index of the library
//! scoreshelf scan --root ./scores --db ./data/scores.db
//!
//! # Index, watch, and serve the API
//! scoreshelf serve --root ./scores --port 3000
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use shelf_core::Config;
use shelf_scanner::Library;
use shelf_server::AppState;
use shelf_store::Catalog;
use shelf_watcher::{LibraryWatcher, ScoreFilter, WatchKind};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Index a directory of sheet-music PDFs and serve them over HTTP.
#[derive(Parser)]
#[command(name = "scoreshelf", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Root directory containing score files.
    ///
    /// Created if missing. Defaults to `./scores`.
    #[arg(short, long, global = true, env = "SCORESHELF_ROOT")]
    root: Option<Utf8PathBuf>,

    /// Location of the SQLite catalog file.
    ///
    /// Defaults to `./data/scores.db`.
    #[arg(long, global = true, env = "SCORESHELF_DB")]
    db: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Run one full scan and print the report.
    Scan {
        /// Print the report as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },

    /// Scan, watch for changes, and serve the HTTP API.
    Serve {
        /// Address to bind.
        #[arg(long, env = "SCORESHELF_HOST")]
        host: Option<String>,

        /// Port to listen on.
        #[arg(short, long, env = "SCORESHELF_PORT")]
        port: Option<u16>,

        /// Shared secret required by `POST /api/scores/scan`.
        ///
        /// When unset, the scan endpoint is open.
        #[arg(long, env = "SCORESHELF_ADMIN_TOKEN")]
        admin_token: Option<String>,

        /// Disable the filesystem watcher (catalog updates only on scan).
        #[arg(long)]
        no_watch: bool,
    },
}

// =============================================================================
// INITIALIZATION
// =============================================================================

/// Initializes the tracing subscriber.
///
/// Respects `RUST_LOG` when set; otherwise `debug` with `--verbose`, else
/// `info`. Noisy dependencies are pinned to `warn`.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},hyper=warn,mio=warn,notify=warn,lopdf=warn"))
    });

    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_ansi(use_ansi))
        .with(filter)
        .init();
}

/// Builds the configuration from CLI arguments and prepares the root.
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::default();

    if let Some(root) = &cli.root {
        config.library.root_path.clone_from(root);
    }
    if let Some(db) = &cli.db {
        config.library.db_path.clone_from(db);
    }

    config
        .library
        .prepare_root()
        .with_context(|| format!("failed to prepare library root {}", config.library.root_path))?;

    Ok(config)
}

/// Opens the catalog and builds the library facade.
fn open_library(config: &Config) -> anyhow::Result<Arc<Library>> {
    let catalog = Catalog::open(&config.library.db_path)
        .with_context(|| format!("failed to open catalog at {}", config.library.db_path))?;

    let library = Library::new(
        &config.library.root_path,
        Arc::new(catalog),
        &config.library.file_extensions,
    )
    .context("failed to open library")?;

    Ok(Arc::new(library))
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Runs a one-shot scan and prints the report.
fn run_scan(config: &Config, json: bool) -> anyhow::Result<()> {
    let library = open_library(config)?;
    let report = library.scan().context("scan failed")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        writeln!(out, "Scanned {} files", report.scanned)?;
        writeln!(out, "  added:   {}", report.added)?;
        writeln!(out, "  updated: {}", report.updated)?;
        writeln!(out, "  removed: {}", report.removed)?;
    }

    Ok(())
}

/// Scans, starts the watcher worker, and serves the API until shutdown.
async fn run_serve(config: Config, no_watch: bool, admin_token: Option<String>) -> anyhow::Result<()> {
    let library = open_library(&config)?;

    // Initial scan so the catalog is warm before the first request.
    let scan_library = Arc::clone(&library);
    let report = tokio::task::spawn_blocking(move || scan_library.scan())
        .await
        .context("scan task panicked")?
        .context("initial scan failed")?;
    info!(
        scanned = report.scanned,
        added = report.added,
        updated = report.updated,
        removed = report.removed,
        "Initial scan complete"
    );

    // Watcher worker, unless disabled.
    let watch_enabled = config.watch.enabled && !no_watch;
    let (watcher_stop_tx, watcher_handle) = if watch_enabled {
        let watcher = LibraryWatcher::new(
            library.root(),
            &config.watch,
            ScoreFilter::new(&config.library.file_extensions).scoped_to(library.root().to_owned()),
        )
        .await
        .context("failed to start watcher")?;

        let (stop_tx, stop_rx) = oneshot::channel();
        let worker_library = Arc::clone(&library);
        let handle = tokio::spawn(watch_worker(watcher, worker_library, stop_rx));
        (Some(stop_tx), Some(handle))
    } else {
        info!("Watcher disabled");
        (None, None)
    };

    // HTTP server.
    let state = AppState::new(Arc::clone(&library), admin_token);
    let router = shelf_server::create_router(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, root = %library.root(), "Serving score library");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // Stop the watcher worker after the server drains.
    if let Some(stop_tx) = watcher_stop_tx {
        let _ = stop_tx.send(());
    }
    if let Some(handle) = watcher_handle {
        let _ = handle.await;
    }

    info!("Shutdown complete");
    Ok(())
}

/// Consumes watch events and reconciles the catalog, one file at a time.
async fn watch_worker(
    mut watcher: LibraryWatcher,
    library: Arc<Library>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            event = watcher.recv() => {
                let Some(event) = event else { break };
                let library = Arc::clone(&library);
                let result = tokio::task::spawn_blocking(move || match event.kind {
                    WatchKind::Changed => library.reconcile_file(&event.path).map(|outcome| {
                        info!(path = %event.path, ?outcome, "Reconciled change");
                    }),
                    // remove_file logs the removal itself.
                    WatchKind::Removed => library.remove_file(&event.path).map(|_| ()),
                })
                .await;

                match result {
                    Ok(Ok(())) => {}
                    Ok(Err(error)) => warn!(error = %error, "Watch reconciliation failed"),
                    Err(error) => warn!(error = %error, "Watch task panicked"),
                }
            }
            _ = &mut stop_rx => break,
        }
    }

    if let Err(error) = watcher.shutdown().await {
        warn!(error = %error, "Watcher shutdown failed");
    }
}

/// Resolves on ctrl-c, or SIGTERM on Unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(error) => {
                warn!(error = %error, "Failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.no_color);

    let config = build_config(&cli)?;

    match cli.command {
        Commands::Scan { json } => run_scan(&config, json),
        Commands::Serve {
            host,
            port,
            admin_token,
            no_watch,
        } => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let admin_token = admin_token.or_else(|| config.server.admin_token.clone());
            run_serve(config, no_watch, admin_token).await
        }
    }
}
