//! Request handlers for the score API.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

use shelf_core::{Score, ScoreId, paths};

use crate::AppState;
use crate::error::ApiError;
use crate::range;

/// Header carrying the shared admin secret for mutating endpoints.
const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Query parameters for score listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive substring match on filename or relative path.
    pub search: Option<String>,
    /// Folder prefix filter.
    pub folder: Option<String>,
}

/// Response body for `GET /api/scores`.
#[derive(Debug, Serialize)]
pub struct ScoreList {
    /// Matching scores, ordered by folder then filename.
    pub scores: Vec<Score>,
    /// Number of scores in `scores`.
    pub total: usize,
}

/// Response body for `GET /api/scores/:id`.
#[derive(Debug, Serialize)]
pub struct ScoreDetail {
    /// The catalog record.
    #[serde(flatten)]
    pub score: Score,
    /// Whether the file currently resolves inside the library root. The
    /// catalog may be stale; `false` means the record will disappear on
    /// the next scan.
    pub exists: bool,
}

/// Response body for `GET /api/folders`.
#[derive(Debug, Serialize)]
pub struct FolderList {
    /// Distinct non-empty folders, sorted.
    pub folders: Vec<String>,
}

/// Response body for `GET /api/health`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    /// `"ok"` when the library root is readable, `"degraded"` otherwise.
    pub status: &'static str,
    /// Number of indexed scores.
    pub scores: u64,
    /// Whether the library root is currently a readable directory.
    pub root_accessible: bool,
}

/// `GET /api/scores` - lists indexed scores with optional filters.
pub async fn list_scores(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ScoreList>, ApiError> {
    let scores = state
        .catalog
        .list(query.search.as_deref(), query.folder.as_deref())?;
    let total = scores.len();
    Ok(Json(ScoreList { scores, total }))
}

/// `GET /api/scores/:id` - returns one score plus a freshness flag.
pub async fn get_score(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ScoreDetail>, ApiError> {
    let id = ScoreId::from_raw(id);
    let score = state.catalog.get(&id)?.ok_or(ApiError::NotFound)?;

    let exists =
        paths::resolve_within(state.library.root(), score.relative_path.as_str()).is_ok();

    Ok(Json(ScoreDetail { score, exists }))
}

/// `GET /api/scores/:id/file` - streams file bytes, honoring `Range`.
///
/// The stored relative path is re-validated through the path guard on
/// every request; a record pointing outside the root (or at a vanished
/// file) is a 404, never a file read.
pub async fn get_score_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let id = ScoreId::from_raw(id);
    let score = state.catalog.get(&id)?.ok_or(ApiError::NotFound)?;

    let absolute = paths::resolve_within(state.library.root(), score.relative_path.as_str())
        .map_err(|error| {
            warn!(id = %id, path = %score.relative_path, error = %error, "File lookup rejected");
            ApiError::NotFound
        })?;

    let mut file = tokio::fs::File::open(&absolute)
        .await
        .map_err(|_| ApiError::NotFound)?;
    let file_size = file
        .metadata()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .len();

    let content_type = mime_guess::from_path(absolute.as_std_path())
        .first_or_octet_stream()
        .to_string();
    let disposition = format!("inline; filename=\"{}\"", score.filename);

    let requested = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(range::parse);

    let builder = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::ACCEPT_RANGES, "bytes");

    let response = match requested {
        Some(byte_range) => {
            let (start, end) = byte_range
                .resolve(file_size)
                .ok_or(ApiError::RangeNotSatisfiable { file_size })?;
            let len = end - start + 1;

            file.seek(SeekFrom::Start(start))
                .await
                .map_err(|e| ApiError::Internal(e.to_string()))?;
            let stream = ReaderStream::new(file.take(len));

            builder
                .status(StatusCode::PARTIAL_CONTENT)
                .header(
                    header::CONTENT_RANGE,
                    format!("bytes {start}-{end}/{file_size}"),
                )
                .header(header::CONTENT_LENGTH, len)
                .body(Body::from_stream(stream))
        }
        None => builder
            .status(StatusCode::OK)
            .header(header::CONTENT_LENGTH, file_size)
            .body(Body::from_stream(ReaderStream::new(file))),
    };

    response.map_err(|e| ApiError::Internal(e.to_string()))
}

/// `POST /api/scores/scan` - triggers a full scan.
///
/// Guarded by the shared admin token when one is configured. The scan
/// runs on the blocking pool; a concurrent request gets 409 immediately
/// rather than queueing behind the running scan.
pub async fn trigger_scan(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<shelf_core::ScanReport>, ApiError> {
    if let Some(expected) = &state.admin_token {
        let provided = headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());
        if provided != Some(expected.as_str()) {
            return Err(ApiError::Unauthorized);
        }
    }

    let library = std::sync::Arc::clone(&state.library);
    let report = tokio::task::spawn_blocking(move || library.scan())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    info!(
        scanned = report.scanned,
        added = report.added,
        updated = report.updated,
        removed = report.removed,
        "Scan triggered via API"
    );
    Ok(Json(report))
}

/// `GET /api/folders` - lists distinct folders.
pub async fn list_folders(State(state): State<AppState>) -> Result<Json<FolderList>, ApiError> {
    let folders = state.catalog.folders()?;
    Ok(Json(FolderList { folders }))
}

/// `GET /api/health` - root accessibility and score count.
pub async fn health(State(state): State<AppState>) -> Result<Json<Health>, ApiError> {
    let root_accessible = state.library.root().is_dir();
    let scores = state.catalog.count()?;

    Ok(Json(Health {
        status: if root_accessible { "ok" } else { "degraded" },
        scores,
        root_accessible,
    }))
}

/// Fallback for unknown routes.
pub async fn not_found() -> impl IntoResponse {
    ApiError::NotFound
}
