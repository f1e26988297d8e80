//! HTTP front end

pub mod api;
pub mod download;
pub mod error;
pub mod pages;

pub use error::ApiError;

use crate::extractor::{Extractor, YtDlpExtractor};
use crate::streaming::StreamingResponder;
use crate::utils::AppSettings;
use anyhow::Context;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn Extractor>,
    pub responder: StreamingResponder,
    pub settings: Arc<AppSettings>,
}

impl AppState {
    pub fn new(extractor: Arc<dyn Extractor>, settings: AppSettings) -> Self {
        Self {
            responder: StreamingResponder::new(extractor.clone()),
            extractor,
            settings: Arc::new(settings),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api", get(api::api_handler))
        .route("/download", get(download::download_handler))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Locate yt-dlp, bind and serve until Ctrl-C
pub async fn serve(settings: AppSettings) -> anyhow::Result<()> {
    let extractor = YtDlpExtractor::new(&settings).context("yt-dlp is required")?;
    info!(
        "Using {} extractor at {}",
        extractor.id(),
        extractor.ytdlp_path().display()
    );

    let bind_addr = settings.bind_addr;
    let app = router(AppState::new(Arc::new(extractor), settings));

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}
