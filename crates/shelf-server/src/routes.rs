//! Router configuration for the score API.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::AppState;
use crate::handlers;

/// Creates the API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/scores", get(handlers::list_scores))
        .route("/api/scores/scan", post(handlers::trigger_scan))
        .route("/api/scores/:id", get(handlers::get_score))
        .route("/api/scores/:id/file", get(handlers::get_score_file))
        .route("/api/folders", get(handlers::list_folders))
        .route("/api/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use camino::{Utf8Path, Utf8PathBuf};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use shelf_core::ScoreId;
    use shelf_scanner::{Library, pages};
    use shelf_store::Catalog;

    struct TestApp {
        router: Router,
        root: Utf8PathBuf,
        _dir: TempDir,
    }

    fn setup(admin_token: Option<&str>) -> TestApp {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 root");
        std::fs::create_dir_all(root.join("sub")).expect("mkdir");
        pages::write_fixture_pdf(&root.join("a.pdf"), 2);
        pages::write_fixture_pdf(&root.join("sub/b.pdf"), 5);

        let catalog = Arc::new(Catalog::open_in_memory().expect("catalog"));
        let library = Arc::new(
            Library::new(&root, Arc::clone(&catalog), &["pdf".to_owned()]).expect("library"),
        );
        library.scan().expect("initial scan");

        let state = AppState {
            library,
            catalog,
            admin_token: admin_token.map(ToOwned::to_owned),
        };
        TestApp {
            router: create_router(state),
            root,
            _dir: dir,
        }
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, json)
    }

    fn id_for(path: &str) -> String {
        ScoreId::from_relative_path(Utf8Path::new(path)).to_string()
    }

    #[tokio::test]
    async fn test_list_scores_ordered_by_folder_then_filename() {
        let app = setup(None);
        let (status, json) = get_json(app.router, "/api/scores").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 2);
        let names: Vec<&str> = json["scores"]
            .as_array()
            .expect("array")
            .iter()
            .map(|s| s["relativePath"].as_str().expect("path"))
            .collect();
        assert_eq!(names, vec!["a.pdf", "sub/b.pdf"]);
    }

    #[tokio::test]
    async fn test_list_scores_search_filter() {
        let app = setup(None);
        let (status, json) = get_json(app.router, "/api/scores?search=b.pdf").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 1);
        assert_eq!(json["scores"][0]["filename"], "b.pdf");
    }

    #[tokio::test]
    async fn test_list_scores_folder_filter() {
        let app = setup(None);
        let (status, json) = get_json(app.router, "/api/scores?folder=sub").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 1);
        assert_eq!(json["scores"][0]["folder"], "sub");
    }

    #[tokio::test]
    async fn test_get_score_detail() {
        let app = setup(None);
        let uri = format!("/api/scores/{}", id_for("sub/b.pdf"));
        let (status, json) = get_json(app.router, &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["relativePath"], "sub/b.pdf");
        assert_eq!(json["pages"], 5);
        assert_eq!(json["exists"], true);
    }

    #[tokio::test]
    async fn test_get_score_unknown_id_is_404() {
        let app = setup(None);
        let (status, json) = get_json(app.router, "/api/scores/ffffffffffffffff").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["statusCode"], 404);
    }

    #[tokio::test]
    async fn test_get_score_reports_missing_file() {
        let app = setup(None);
        std::fs::remove_file(app.root.join("a.pdf")).expect("remove");

        let uri = format!("/api/scores/{}", id_for("a.pdf"));
        let (status, json) = get_json(app.router, &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["exists"], false);
    }

    #[tokio::test]
    async fn test_file_endpoint_serves_whole_file() {
        let app = setup(None);
        let size = std::fs::metadata(app.root.join("a.pdf")).expect("stat").len();

        let uri = format!("/api/scores/{}/file", id_for("a.pdf"));
        let response = app
            .router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        assert_eq!(response.headers()[header::ACCEPT_RANGES], "bytes");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        assert_eq!(bytes.len() as u64, size);
    }

    #[tokio::test]
    async fn test_file_endpoint_serves_byte_range() {
        let app = setup(None);
        std::fs::write(app.root.join("raw.pdf"), vec![7u8; 500]).expect("write");

        // Index the new file through the API scan path.
        let scan = Request::builder()
            .method("POST")
            .uri("/api/scores/scan")
            .body(Body::empty())
            .expect("request");
        let response = app.router.clone().oneshot(scan).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let uri = format!("/api/scores/{}/file", id_for("raw.pdf"));
        let request = Request::builder()
            .uri(uri)
            .header(header::RANGE, "bytes=0-99")
            .body(Body::empty())
            .expect("request");
        let response = app.router.oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 0-99/500");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "100");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        assert_eq!(bytes.len(), 100);
    }

    #[tokio::test]
    async fn test_file_endpoint_unsatisfiable_range_is_416() {
        let app = setup(None);
        let size = std::fs::metadata(app.root.join("a.pdf")).expect("stat").len();

        let uri = format!("/api/scores/{}/file", id_for("a.pdf"));
        let request = Request::builder()
            .uri(uri)
            .header(header::RANGE, format!("bytes={size}-"))
            .body(Body::empty())
            .expect("request");
        let response = app.router.oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(
            response.headers()[header::CONTENT_RANGE],
            format!("bytes */{size}")
        );
    }

    #[tokio::test]
    async fn test_file_endpoint_vanished_file_is_404() {
        let app = setup(None);
        std::fs::remove_file(app.root.join("a.pdf")).expect("remove");

        let uri = format!("/api/scores/{}/file", id_for("a.pdf"));
        let (status, _) = get_json(app.router, &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_scan_requires_admin_token_when_configured() {
        let app = setup(Some("secret"));

        let unauthorized = Request::builder()
            .method("POST")
            .uri("/api/scores/scan")
            .body(Body::empty())
            .expect("request");
        let response = app
            .router
            .clone()
            .oneshot(unauthorized)
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let authorized = Request::builder()
            .method("POST")
            .uri("/api/scores/scan")
            .header("x-admin-token", "secret")
            .body(Body::empty())
            .expect("request");
        let response = app.router.oneshot(authorized).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_scan_returns_report() {
        let app = setup(None);
        let request = Request::builder()
            .method("POST")
            .uri("/api/scores/scan")
            .body(Body::empty())
            .expect("request");
        let response = app.router.oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        // Nothing changed since setup's scan.
        assert_eq!(json["scanned"], 2);
        assert_eq!(json["added"], 0);
    }

    #[tokio::test]
    async fn test_folders_endpoint() {
        let app = setup(None);
        let (status, json) = get_json(app.router, "/api/folders").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["folders"], serde_json::json!(["sub"]));
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = setup(None);
        let (status, json) = get_json(app.router, "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["scores"], 2);
        assert_eq!(json["rootAccessible"], true);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = setup(None);
        let (status, _) = get_json(app.router, "/api/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
