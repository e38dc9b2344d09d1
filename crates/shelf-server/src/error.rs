//! API error responses.
//!
//! Every failure leaving a handler becomes a JSON body of the shape
//! `{ "error": ..., "message": ..., "statusCode": ... }`. Internal detail
//! is logged, not leaked; the client sees a generic message for 500s.

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use shelf_scanner::ScanError;
use shelf_store::CatalogError;

/// Errors surfaced by API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested score does not exist, or its file is gone or
    /// outside the library root. All three collapse to 404 so the
    /// response never reveals whether a guarded path exists.
    #[error("score not found")]
    NotFound,

    /// The admin token header is missing or wrong.
    #[error("invalid admin token")]
    Unauthorized,

    /// A scan is already running.
    #[error("a scan is already in progress")]
    ScanInProgress,

    /// The requested byte range cannot be satisfied.
    #[error("requested range not satisfiable")]
    RangeNotSatisfiable {
        /// Total size of the file, reported in `Content-Range`.
        file_size: u64,
    },

    /// Catalog or filesystem failure; details are logged server-side.
    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    /// The HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::ScanInProgress => StatusCode::CONFLICT,
            Self::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: &'static str,
    message: String,
    status_code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let Self::Internal(detail) = &self {
            tracing::error!(error = %detail, "Request failed");
        }

        let body = Json(ErrorBody {
            error: status.canonical_reason().unwrap_or("Error"),
            message: self.to_string(),
            status_code: status.as_u16(),
        });

        if let Self::RangeNotSatisfiable { file_size } = self {
            let content_range = format!("bytes */{file_size}");
            return (status, [(header::CONTENT_RANGE, content_range)], body).into_response();
        }

        (status, body).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(error: CatalogError) -> Self {
        Self::Internal(error.to_string())
    }
}

impl From<ScanError> for ApiError {
    fn from(error: ScanError) -> Self {
        match error {
            ScanError::AlreadyScanning => Self::ScanInProgress,
            ScanError::Guard(_) => Self::NotFound,
            other => Self::Internal(other.to_string()),
        }
    }
}
