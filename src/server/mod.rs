//! HTTP server
//!
//! Exposes the forge pipeline to the browser UI through a small JSON
//! contract. Instructions are serialized end-to-end: the orchestrator sits
//! behind an async mutex, so session memory and the output directory are
//! never touched by two requests at once (packaging and the compatibility
//! save path take the same lock).

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::bundle::ExtensionBundle;
use crate::error::ForgeError;
use crate::launcher;
use crate::llm::ModelTier;
use crate::orchestrator::{prompts, Orchestrator};
use crate::packaging;

/// Shared server state
#[derive(Clone)]
pub struct AppState {
    /// The forge pipeline; the mutex is the single logical queue that
    /// serializes instruction handling
    orchestrator: Arc<Mutex<Orchestrator>>,

    /// Output directory, for packaging and launch
    output_dir: PathBuf,

    /// Stable model identifier, for mapping a selector onto a tier
    stable_model: String,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, output_dir: PathBuf, stable_model: String) -> Self {
        Self {
            orchestrator: Arc::new(Mutex::new(orchestrator)),
            output_dir,
            stable_model,
        }
    }
}

/// Inbound forge request
#[derive(Debug, Deserialize)]
struct ForgeRequest {
    /// Free-text instruction describing the extension or the refinement
    #[serde(alias = "prompt")]
    instruction: String,

    /// Optional model selector; the configured stable identifier selects the
    /// stable tier, anything else runs at the frontier tier with fallback
    #[serde(default)]
    model: Option<String>,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/forge", post(forge_handler))
        .route("/save", post(save_handler))
        .route("/download", get(download_handler))
        .route("/launch", post(launch_handler))
        .route("/status", get(status_handler))
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(bind: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("ChromeForge listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Classify a pipeline error into an HTTP status and the single structured
/// error shape the UI understands
fn error_response(err: ForgeError) -> Response {
    error!("Request failed: {}", err);
    let status = match &err {
        ForgeError::Validation(_) => StatusCode::BAD_REQUEST,
        ForgeError::Packaging(_) | ForgeError::Launch(_) => StatusCode::BAD_REQUEST,
        ForgeError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(json!({ "status": "error", "message": err.to_string() })),
    )
        .into_response()
}

async fn forge_handler(
    State(state): State<AppState>,
    Json(request): Json<ForgeRequest>,
) -> Response {
    let tier = ModelTier::from_selector(request.model.as_deref(), &state.stable_model);

    let result = {
        let mut orchestrator = state.orchestrator.lock().await;
        orchestrator.forge(&request.instruction, tier).await
    };

    match result {
        Ok(outcome) => Json(json!({
            "status": "success",
            "analysis": outcome.analysis,
            "files": outcome.files,
            "path": outcome.path,
            "tip": prompts::NEXT_STEP_TIP,
        }))
        .into_response(),
        Err(err) => error_response(err),
    }
}

/// Compatibility path: materialize a caller-supplied bundle without running
/// the model passes or touching session memory
async fn save_handler(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Response {
    let bundle = match ExtensionBundle::from_value(payload) {
        Ok(bundle) => bundle,
        Err(msg) => return error_response(ForgeError::Validation(msg)),
    };

    let result = {
        let orchestrator = state.orchestrator.lock().await;
        orchestrator.materialize_bundle(&bundle).await
    };

    match result {
        Ok(materialized) => Json(json!({
            "status": "success",
            "path": materialized.path,
            "files": materialized.files,
        }))
        .into_response(),
        Err(err) => error_response(err),
    }
}

async fn download_handler(State(state): State<AppState>) -> Response {
    // Hold the pipeline lock so a packaging read never overlaps a rebuild
    let _guard = state.orchestrator.lock().await;

    match packaging::archive_directory(&state.output_dir) {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/zip"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"generated_extension.zip\"",
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

async fn launch_handler(State(state): State<AppState>) -> Response {
    // Same lock as /download: never probe the output dir mid-build
    let _guard = state.orchestrator.lock().await;

    match launcher::launch_with_extension(&state.output_dir) {
        Ok(()) => Json(json!({ "status": "success" })).into_response(),
        Err(err) => error_response(err),
    }
}

async fn status_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Minimal embedded page documenting the JSON contract; the real UI is an
/// external collaborator
async fn index_handler() -> Response {
    let html = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>ChromeForge</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 800px;
            margin: 50px auto;
            padding: 20px;
            background: #f5f5f5;
        }
        .container {
            background: white;
            padding: 30px;
            border-radius: 8px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }
        .status { color: #28a745; font-weight: bold; }
        code {
            background: #e9ecef;
            padding: 2px 6px;
            border-radius: 3px;
            font-family: 'Courier New', monospace;
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>ChromeForge</h1>
        <p class="status">&#10003; Server is running</p>
        <p>Drafts, audits, and materializes Manifest V3 browser extensions.</p>
        <ul>
            <li><code>POST /forge</code> &mdash; {"instruction": "...", "model": "..."} &rarr; build an extension</li>
            <li><code>POST /save</code> &mdash; materialize a raw bundle</li>
            <li><code>GET /download</code> &mdash; zip of the current extension</li>
            <li><code>POST /launch</code> &mdash; open the browser with the extension loaded</li>
            <li><code>GET /status</code> &mdash; liveness and version</li>
        </ul>
    </div>
</body>
</html>"#;

    (StatusCode::OK, [(header::CONTENT_TYPE, "text/html")], html).into_response()
}
