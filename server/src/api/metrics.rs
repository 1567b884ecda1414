use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::metrics::{HistoryRange, MetricSample};

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub range: Option<String>,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    /// Process uptime in seconds.
    pub uptime: f64,
}

/// GET /api/metrics/history?range=1h|24h
///
/// A missing, unknown or malformed range falls back to `1h`. Storage errors
/// produce an empty array, never an error status.
pub async fn history(
    State(state): State<AppState>,
    query: Option<Query<HistoryQuery>>,
) -> Json<Vec<MetricSample>> {
    let range = HistoryRange::parse(query.as_ref().and_then(|Query(q)| q.range.as_deref()));
    Json(state.history.get_history(range).await)
}

/// GET /api/metrics/status
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}
