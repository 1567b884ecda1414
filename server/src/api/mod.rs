use axum::{extract::OriginalUri, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::metrics::{HistoryService, MetricStore};
use crate::probe::HostProbe;

pub mod error;
pub mod metrics;
pub mod system;

use error::AppError;

/// Shared application state available to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub history: HistoryService,
    pub probe: Arc<dyn HostProbe>,
    pub config: AppConfig,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: MetricStore, probe: Arc<dyn HostProbe>, config: AppConfig) -> Self {
        Self {
            history: HistoryService::new(store),
            probe,
            config,
            started_at: Instant::now(),
        }
    }
}

/// Build the main application router with all API routes.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let timeout = TimeoutLayer::new(Duration::from_secs(state.config.request_timeout_secs));
    let static_dir = state.config.static_dir.clone();

    let api = Router::new()
        .route("/metrics/history", get(metrics::history))
        .route("/metrics/status", get(metrics::status))
        .route("/system-info", get(system::info))
        .fallback(not_found);

    let app = Router::new()
        .route("/health", get(health))
        .nest("/api", api);

    // Everything outside /api is the dashboard when a build is configured.
    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app.fallback(not_found),
    };

    app.layer(timeout)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
