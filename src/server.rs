//! HTTP surface for the analysis pipeline.

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::pipeline::Pipeline;
use crate::report::AnalysisReport;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    repo_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    result: AnalysisReport,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// `POST /api/analyze` with `{ "repoUrl": "..." }`.
///
/// The body is read as raw bytes so a missing or malformed payload gets the
/// same 400 response as a blank `repoUrl`.
async fn analyze(State(state): State<AppState>, body: Bytes) -> Response {
    let repo_url = serde_json::from_slice::<AnalyzeRequest>(&body)
        .ok()
        .and_then(|request| request.repo_url)
        .filter(|url| !url.trim().is_empty());

    let Some(repo_url) = repo_url else {
        return error_response(StatusCode::BAD_REQUEST, "Missing repoUrl");
    };

    match state.pipeline.analyze(repo_url.trim()).await {
        Ok(result) => (StatusCode::OK, Json(AnalyzeResponse { result })).into_response(),
        Err(e) => {
            error!("Analysis of {repo_url} failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Serves the HTTP surface on `bind` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn serve(bind: SocketAddr, pipeline: Pipeline) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(AppState::new(pipeline)))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("HTTP server failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{MetadataSource, RemoteMetadataSet};
    use crate::pipeline::PipelineSettings;
    use crate::reference::RepositoryRef;
    use crate::snapshot::{Snapshot, SnapshotProvider};
    use crate::synthesis::{GenerationRequest, SynthesisError, TextGenerator};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct ReadmeOnly;

    #[async_trait]
    impl MetadataSource for ReadmeOnly {
        async fn fetch_readme(&self, _repo: &RepositoryRef) -> Option<String> {
            Some("# Widgets".to_string())
        }

        async fn fetch_metadata(&self, _repo: &RepositoryRef) -> RemoteMetadataSet {
            RemoteMetadataSet::default()
        }
    }

    struct SingleFileSnapshots(TempDir);

    #[async_trait]
    impl SnapshotProvider for SingleFileSnapshots {
        async fn acquire(&self, repo: &RepositoryRef) -> crate::error::Result<Snapshot> {
            let root = self.0.path().join(&repo.name);
            std::fs::create_dir_all(&root)?;
            std::fs::write(root.join("index.js"), "console.log('hi');\n")?;
            Ok(Snapshot::adopt(root))
        }
    }

    struct FixedText;

    #[async_trait]
    impl TextGenerator for FixedText {
        async fn generate(&self, _request: GenerationRequest) -> Result<String, SynthesisError> {
            Ok("A widget toolkit.".to_string())
        }
    }

    fn app() -> Router {
        let pipeline = Pipeline::new(
            Arc::new(ReadmeOnly),
            Arc::new(SingleFileSnapshots(TempDir::new().unwrap())),
            Arc::new(FixedText),
            PipelineSettings::default(),
        );
        create_router(AppState::new(pipeline))
    }

    async fn post_analyze(body: impl Into<Body>) -> (StatusCode, Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/analyze")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn test_missing_repo_url_is_bad_request() {
        for body in ["", "{}", r#"{"repoUrl": "   "}"#, "not json"] {
            let (status, value) = post_analyze(body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body:?}");
            assert_eq!(value, json!({"error": "Missing repoUrl"}));
        }
    }

    #[tokio::test]
    async fn test_invalid_reference_is_server_error() {
        let (status, value) = post_analyze(json!({"repoUrl": "gitlab.com/acme/widgets"}).to_string()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(value["error"]
            .as_str()
            .unwrap()
            .contains("Invalid GitHub repository reference"));
    }

    #[tokio::test]
    async fn test_successful_analysis_wraps_result() {
        let (status, value) =
            post_analyze(json!({"repoUrl": "https://github.com/acme/widgets"}).to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["result"]["summary"], "A widget toolkit.");
        assert_eq!(value["result"]["repoInfo"], Value::Null);
        assert_eq!(
            value["result"]["plagiarismResults"],
            json!([{"file": "index.js", "result": "A widget toolkit."}])
        );
    }
}
