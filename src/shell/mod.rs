//! Presentation shell: upload a CSV, get the prediction table back.
//!
//! Runs on a current-thread runtime, so uploads are scored one at a time
//! against the shared, read-only pipeline.

mod render;

use crate::config::ServerConfig;
use crate::error::ChurnError;
use crate::inference::{ChurnPipeline, ScoredBatch};
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

pub struct AppState {
    pub pipeline: ChurnPipeline,
}

pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/predict", post(predict_html))
        .route("/api/predict", post(predict_json))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, config: &ServerConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!(bind = %config.bind, "upload form listening");
    axum::serve(listener, router(state, config.max_upload_bytes)).await
}

fn status_for(err: &ChurnError) -> StatusCode {
    match err {
        ChurnError::Input(_) | ChurnError::Csv(_) => StatusCode::BAD_REQUEST,
        ChurnError::Transform(_) | ChurnError::Prediction(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Bytes of the `file` form field.
async fn read_upload(mut multipart: Multipart) -> Result<Bytes, ChurnError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ChurnError::Input(format!("malformed upload: {}", e)))?
    {
        if field.name() == Some("file") {
            return field
                .bytes()
                .await
                .map_err(|e| ChurnError::Input(format!("malformed upload: {}", e)));
        }
    }
    Err(ChurnError::Input(
        "input batch is empty or not provided".to_string(),
    ))
}

fn score_upload(
    state: &AppState,
    upload: Result<Bytes, ChurnError>,
) -> Result<ScoredBatch, ChurnError> {
    let bytes = upload?;
    state.pipeline.score_csv(&bytes[..]).map_err(|e| {
        warn!(error = %e, "upload rejected");
        e
    })
}

async fn index() -> Html<String> {
    Html(render::index())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn predict_html(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let upload = read_upload(multipart).await;
    match score_upload(&state, upload) {
        Ok(scored) => Html(render::results(&scored)).into_response(),
        Err(e) => (status_for(&e), Html(render::error(&e.to_string()))).into_response(),
    }
}

async fn predict_json(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let upload = read_upload(multipart).await;
    match score_upload(&state, upload) {
        Ok(scored) => Json(scored).into_response(),
        Err(e) => (status_for(&e), Json(json!({ "error": e.to_string() }))).into_response(),
    }
}
